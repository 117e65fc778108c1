//! Slug helpers shared by discovery, the store and the snapshot cache.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("invalid slug regex"));

/// Trim and lowercase a slug without altering its characters.
pub fn normalize_slug(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Turn arbitrary text (usually a directory name) into a slug.
///
/// Runs of characters outside `[a-z0-9]` collapse to a single `-` and
/// leading or trailing dashes are dropped.
pub fn slugify(input: &str) -> String {
    let lowered = normalize_slug(input);
    NON_SLUG_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// True when `input` is already a normalised slug.
pub fn is_slug(input: &str) -> bool {
    !input.is_empty() && slugify(input) == input
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Harbor Hunt!! 2 "), "harbor-hunt-2");
        assert_eq!(slugify("__draft__"), "draft");
        assert_eq!(slugify("Ünïcode"), "n-code");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn normalize_keeps_inner_characters() {
        assert_eq!(normalize_slug(" My_Game "), "my_game");
    }

    #[test]
    fn recognises_slugs() {
        assert!(is_slug("city-tour-2"));
        assert!(!is_slug("City Tour"));
        assert!(!is_slug(""));
    }
}
