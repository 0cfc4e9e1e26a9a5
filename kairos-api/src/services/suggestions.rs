//! Decorating suggestion rules

use kairos_common::{DetectedObject, RoomLayout, Suggestion};

use super::detection::{CORNER, CORNER_BOX, EMPTY_WALL, EMPTY_WALL_BOX};

fn hang_art(location: &[i32]) -> Suggestion {
    Suggestion::new("hang", "framed art", location)
}

fn place_lamp(location: &[i32]) -> Suggestion {
    Suggestion::new("place", "floor lamp", location)
}

/// Match detected objects against the rule table
///
/// Objects are visited in order. An empty wall gets framed art when the vibe
/// calls for "art"; a corner gets a floor lamp when it calls for
/// "warm lighting". Anything else produces nothing.
pub fn generate_suggestions(layout: &[DetectedObject], vibe_tags: &[String]) -> Vec<Suggestion> {
    let has_tag = |tag: &str| vibe_tags.iter().any(|t| t == tag);

    let mut suggestions = Vec::new();
    for obj in layout {
        if obj.label == EMPTY_WALL && has_tag("art") {
            suggestions.push(hang_art(&obj.bounding_box));
        }
        if obj.label == CORNER && has_tag("warm lighting") {
            suggestions.push(place_lamp(&obj.bounding_box));
        }
    }

    tracing::debug!(
        objects = layout.len(),
        suggestions = suggestions.len(),
        "Generated rule-based suggestions"
    );
    suggestions
}

/// Suggestions for the assisted pipeline: always framed art then floor lamp
pub fn fixed_suggestions(layout: &RoomLayout) -> Vec<Suggestion> {
    let wall = layout
        .find(EMPTY_WALL)
        .map(|o| o.bounding_box)
        .unwrap_or(EMPTY_WALL_BOX);
    let corner = layout
        .find(CORNER)
        .map(|o| o.bounding_box)
        .unwrap_or(CORNER_BOX);

    vec![hang_art(&wall), place_lamp(&corner)]
}
