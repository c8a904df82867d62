/// Color used for events without a known category
pub const DEFAULT_FALLBACK_COLOR: &str = "#6366f1";

/// Text color drawn on top of a category color
pub const ON_COLOR_TEXT: &str = "#ffffff";

/// Alpha suffix for the unselected (faded) state of a category
pub const FADED_ALPHA: &str = "20";

/// Check for a `#rrggbb` color
pub fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Same hue at reduced opacity.
///
/// Only `#rrggbb` colors can carry an alpha suffix; anything else is returned
/// unchanged.
pub fn faded(color: &str) -> String {
    if is_hex_color(color) {
        format!("{}{}", color, FADED_ALPHA)
    } else {
        color.to_string()
    }
}
