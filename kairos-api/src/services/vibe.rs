//! Vibe text to style tags

const COZY_TAGS: &[&str] = &["warm lighting", "wood", "plants"];
const MINIMAL_TAGS: &[&str] = &["neutral tones", "clean lines", "negative space"];
const DEFAULT_TAGS: &[&str] = &["art", "decor"];

/// Translate a free-text vibe into style tags
///
/// Case-insensitive substring match; the first keyword found wins and tag
/// sets are never combined.
pub fn parse_vibe(vibe: &str) -> Vec<String> {
    let lowered = vibe.to_lowercase();

    let tags = if lowered.contains("cozy") {
        COZY_TAGS
    } else if lowered.contains("minimal") {
        MINIMAL_TAGS
    } else {
        DEFAULT_TAGS
    };

    tags.iter().map(|t| t.to_string()).collect()
}
