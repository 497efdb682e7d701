//! Filesystem-safe names for post directories and image files.

use serde::{Deserialize, Serialize};

/// Upper bound for a single sanitized name, leaving room for the
/// `_NNN.ext` suffix under the usual 255-byte NAME_MAX.
pub const MAX_NAME_BYTES: usize = 200;

/// Characters Windows refuses in file names.
const WINDOWS_RESERVED: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// How aggressively names are cleaned before they touch the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingMode {
    /// Strip everything Windows rejects so the tree can be copied anywhere.
    #[default]
    Strict,
    /// Only strip what would break the path itself (`/`, NUL, control chars).
    Permissive,
}

impl NamingMode {
    pub fn from_windows_safe(windows_safe: bool) -> Self {
        if windows_safe {
            NamingMode::Strict
        } else {
            NamingMode::Permissive
        }
    }
}

/// Sanitizes a single path component.
///
/// Total and idempotent: `sanitize_filename(sanitize_filename(x, m), m)`
/// equals `sanitize_filename(x, m)` for every input.
pub fn sanitize_filename(name: &str, mode: NamingMode) -> String {
    let cleaned: String = name
        .chars()
        .filter(|&c| !is_rejected(c, mode))
        .collect();

    let trimmed = trim(&cleaned, mode);
    if trimmed.len() <= MAX_NAME_BYTES {
        return trimmed.to_string();
    }

    let mut take = MAX_NAME_BYTES;
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trim(&trimmed[..take], mode).to_string()
}

fn is_rejected(c: char, mode: NamingMode) -> bool {
    if c == '\0' || c == '/' || c.is_control() {
        return true;
    }
    match mode {
        NamingMode::Strict => WINDOWS_RESERVED.contains(&c),
        NamingMode::Permissive => false,
    }
}

fn trim(s: &str, mode: NamingMode) -> &str {
    match mode {
        NamingMode::Strict => s
            .trim_start()
            .trim_end_matches(|c: char| c == '.' || c.is_whitespace()),
        NamingMode::Permissive => s.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_removes_windows_reserved() {
        let out = sanitize_filename(r#"a\b/c:d*e?f"g<h>i|j"#, NamingMode::Strict);
        assert_eq!(out, "abcdefghij");
    }

    #[test]
    fn test_strict_trims_trailing_dots_and_spaces() {
        assert_eq!(sanitize_filename("  title. . ", NamingMode::Strict), "title");
        assert_eq!(sanitize_filename("...", NamingMode::Strict), "");
    }

    #[test]
    fn test_permissive_keeps_reserved_but_not_slash() {
        let out = sanitize_filename("Q&A: who? a/b", NamingMode::Permissive);
        assert_eq!(out, "Q&A: who? ab");
    }

    #[test]
    fn test_control_characters_removed_in_both_modes() {
        assert_eq!(sanitize_filename("a\tb\u{0}c", NamingMode::Strict), "abc");
        assert_eq!(sanitize_filename("a\tb\u{0}c", NamingMode::Permissive), "abc");
    }

    #[test]
    fn test_long_names_cut_on_char_boundary() {
        let long = "가".repeat(150);
        let out = sanitize_filename(&long, NamingMode::Strict);
        assert!(out.len() <= MAX_NAME_BYTES);
        assert!(out.chars().all(|c| c == '가'));
    }

    #[test]
    fn test_idempotent() {
        let samples = vec![
            "  hello world.  ".to_string(),
            "화보: \"봄\" <특집> | 2024...".to_string(),
            "x".repeat(300) + " .",
            "trailing . . . .".to_string(),
            String::new(),
        ];
        for s in &samples {
            for mode in [NamingMode::Strict, NamingMode::Permissive] {
                let once = sanitize_filename(s, mode);
                assert_eq!(sanitize_filename(&once, mode), once, "input {s:?}");
            }
        }
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(NamingMode::from_windows_safe(true), NamingMode::Strict);
        assert_eq!(NamingMode::from_windows_safe(false), NamingMode::Permissive);
    }
}
