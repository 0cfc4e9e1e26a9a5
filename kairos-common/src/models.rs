//! Room analysis value types
//!
//! All of these live for a single request: built by the pipeline, serialized
//! into the JSON response, then dropped.

use serde::{Deserialize, Serialize};

/// An object "detected" in the room photo
///
/// Serialized as `{"label": "...", "box": [x1, y1, x2, y2]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedObject {
    /// Object label (e.g. "empty wall", "corner")
    pub label: String,
    /// Bounding box in pixel coordinates: x1, y1, x2, y2
    #[serde(rename = "box")]
    pub bounding_box: [i32; 4],
}

impl DetectedObject {
    pub fn new(label: impl Into<String>, bounding_box: [i32; 4]) -> Self {
        Self {
            label: label.into(),
            bounding_box,
        }
    }
}

/// An actionable decorating recommendation tied to a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Verb ("hang", "place")
    pub action: String,
    /// What to hang or place ("framed art", "floor lamp")
    pub item: String,
    /// Bounding box the suggestion applies to
    pub location: Vec<i32>,
}

impl Suggestion {
    pub fn new(action: impl Into<String>, item: impl Into<String>, location: &[i32]) -> Self {
        Self {
            action: action.into(),
            item: item.into(),
            location: location.to_vec(),
        }
    }
}

/// A shopping result for a suggested item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub price: String,
    pub thumbnail: String,
    pub link: String,
}

/// Layout analysis result returned by the assisted pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomLayout {
    /// Room classification ("living room")
    pub room_type: String,
    /// Objects found in the room
    pub objects: Vec<DetectedObject>,
}

impl RoomLayout {
    /// First object with the given label, if any
    pub fn find(&self, label: &str) -> Option<&DetectedObject> {
        self.objects.iter().find(|obj| obj.label == label)
    }
}
