use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Result, TubescribeError};

// Matches watch URLs, path-form URLs, and youtu.be short links
static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/(?:watch\?v=|.*/)|youtu\.be/)([\w-]+)")
        .expect("Invalid video id regex")
});

/// Normalize a video title into a filesystem-safe slug.
///
/// Lowercases the title, maps spaces to underscores and pipes to hyphens,
/// and replaces everything outside the word/underscore/hyphen set with an
/// underscore. Separator runs collapse to a single character (a hyphen wins
/// over underscores) and the result never starts or ends with a separator,
/// which makes the function idempotent.
pub fn normalize_title(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());

    for c in title.to_lowercase().chars() {
        let mapped = match c {
            ' ' => '_',
            '|' => '-',
            c if c.is_alphanumeric() || c == '_' || c == '-' => c,
            _ => '_',
        };

        if mapped == '_' || mapped == '-' {
            match slug.pop() {
                None => {} // drop leading separators
                Some(prev) if prev == '_' || prev == '-' => {
                    slug.push(if prev == '-' || mapped == '-' { '-' } else { '_' });
                }
                Some(prev) => {
                    slug.push(prev);
                    slug.push(mapped);
                }
            }
        } else {
            slug.push(mapped);
        }
    }

    while slug.ends_with(['_', '-']) {
        slug.pop();
    }

    slug
}

/// Extract the canonical video identifier from a full video URL.
pub fn extract_video_id(url: &str) -> Result<String> {
    VIDEO_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| TubescribeError::InvalidInput(format!("Invalid video URL: {}", url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_example() {
        assert_eq!(normalize_title("Hello World | Part 2!"), "hello_world-part_2");
    }

    #[test]
    fn test_normalize_idempotent() {
        for title in [
            "Hello World | Part 2!",
            "  weird -- title __ here  ",
            "ALL CAPS",
            "уже нормально",
            "",
        ] {
            let once = normalize_title(title);
            assert_eq!(normalize_title(&once), once, "not idempotent for {:?}", title);
        }
    }

    #[test]
    fn test_normalize_no_stray_separators() {
        for title in ["!!leading", "trailing??", "a   b", "a |-| b", "___"] {
            let slug = normalize_title(title);
            assert!(!slug.starts_with(['_', '-']), "leading separator in {:?}", slug);
            assert!(!slug.ends_with(['_', '-']), "trailing separator in {:?}", slug);
            assert!(!slug.contains("__"), "doubled underscore in {:?}", slug);
            assert!(!slug.contains("--"), "doubled hyphen in {:?}", slug);
            assert!(!slug.contains("_-"), "mixed separator run in {:?}", slug);
            assert!(!slug.contains("-_"), "mixed separator run in {:?}", slug);
        }
    }

    #[test]
    fn test_normalize_keeps_unicode_words() {
        assert_eq!(normalize_title("Любов и още"), "любов_и_още");
    }

    #[test]
    fn test_extract_video_id_shapes() {
        assert_eq!(extract_video_id("https://youtu.be/abc123").unwrap(), "abc123");
        assert_eq!(
            extract_video_id("https://youtube.com/watch?v=abc123").unwrap(),
            "abc123"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_extract_video_id_invalid() {
        let err = extract_video_id("not a url").unwrap_err();
        assert!(matches!(err, TubescribeError::InvalidInput(_)));
    }
}
