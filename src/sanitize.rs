//! Path segment cleanup for category and game names

use crate::constants::catalog::UNSAFE_FILENAME_CHARS;

/// Remove every filesystem-unsafe character from `name`.
///
/// Nothing else is touched: whitespace, dots and non-ASCII text pass through,
/// and two names that differ only in removed characters map to the same
/// directory.
///
/// ```
/// use html5games_toolkit::sanitize::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Sn:ake?"), "Snake");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !UNSAFE_FILENAME_CHARS.contains(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_all_unsafe_chars() {
        assert_eq!(sanitize_filename(r#"a<b>c:d"e/f\g|h?i*j"#), "abcdefghij");
    }

    #[test]
    fn test_game_name_example() {
        assert_eq!(sanitize_filename("Sn:ake?"), "Snake");
    }

    #[test]
    fn test_safe_name_unchanged() {
        assert_eq!(sanitize_filename("Puzzle & Logic 2"), "Puzzle & Logic 2");
        assert_eq!(sanitize_filename("益智游戏"), "益智游戏");
    }

    #[test]
    fn test_idempotent() {
        for name in ["Sn:ake?", "<<>>", "a/b\\c", "", "plain", "**Star**"] {
            let once = sanitize_filename(name);
            assert_eq!(sanitize_filename(&once), once);
            assert!(!once.contains(UNSAFE_FILENAME_CHARS));
        }
    }

    #[test]
    fn test_only_unsafe_chars_becomes_empty() {
        assert_eq!(sanitize_filename("?*|"), "");
        assert!("?*|".contains(UNSAFE_FILENAME_CHARS));
    }
}
