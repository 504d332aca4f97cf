//! Label colors
//!
//! Labels without a color get one derived from their name, so repeated
//! imports paint the same label the same way.

/// Normalizes an explicit color to `#rrggbb` form (adds the `#` if missing)
pub fn normalize_color(color: &str) -> Option<String> {
    let color = color.trim();
    if color.is_empty() {
        return None;
    }
    if color.starts_with('#') {
        Some(color.to_string())
    } else {
        Some(format!("#{}", color))
    }
}

/// Derives a color from the first 6 hex digits of the BLAKE3 hash of a title
pub fn color_from_title(title: &str) -> String {
    let hash = blake3::hash(title.as_bytes());
    let hex = hash.to_hex();
    format!("#{}", &hex[..6])
}

/// Returns the explicit color if usable, otherwise one derived from the title
pub fn label_color(explicit: Option<&str>, title: &str) -> String {
    explicit
        .and_then(normalize_color)
        .unwrap_or_else(|| color_from_title(title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn explicit_colors_get_a_hash_prefix() {
        assert_eq!(normalize_color("ff0000"), Some("#ff0000".to_string()));
        assert_eq!(normalize_color(" #00ff00 "), Some("#00ff00".to_string()));
        assert_eq!(normalize_color("  "), None);
    }

    #[test]
    fn derived_color_shape() {
        let color = color_from_title("backend");
        assert_eq!(color.len(), 7);
        assert!(color.starts_with('#'));
        assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_titles_usually_differ() {
        assert_ne!(color_from_title("backend"), color_from_title("frontend"));
    }

    #[test]
    fn label_color_prefers_explicit() {
        assert_eq!(label_color(Some("abcdef"), "x"), "#abcdef");
        assert_eq!(label_color(Some(""), "x"), color_from_title("x"));
        assert_eq!(label_color(None, "x"), color_from_title("x"));
    }

    proptest! {
        #[test]
        fn derived_color_is_deterministic(title in ".{0,40}") {
            prop_assert_eq!(color_from_title(&title), color_from_title(&title));
        }
    }
}
