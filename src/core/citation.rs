//! Citation text format: exactly `[<chapter>.<verse>]`, e.g. `[2.47]`.
//!
//! Downstream validators pattern-match on this literal form, so it is part
//! of the observable contract.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CITATION_RE: Regex = Regex::new(r"\[(\d+)\.(\d+)\]").unwrap();
}

/// Build a citation string, e.g. `build_citation(2, 47)` -> `"[2.47]"`.
pub fn build_citation(chapter: u32, verse: u32) -> String {
    format!("[{}.{}]", chapter, verse)
}

/// Extract every `[chapter.verse]` substring in order of appearance.
/// Malformed shapes like `[2.x]` or `[247]` never match.
pub fn extract_citations_from_text(text: &str) -> Vec<String> {
    CITATION_RE
        .captures_iter(text)
        .map(|caps| format!("[{}.{}]", &caps[1], &caps[2]))
        .collect()
}

/// Parse a single citation string into (chapter, verse).
/// Returns `None` for any malformed shape rather than erroring.
pub fn parse_citation(citation: &str) -> Option<(u32, u32)> {
    let inner = citation.trim().strip_prefix('[')?.strip_suffix(']')?;
    let (chapter, verse) = inner.split_once('.')?;
    Some((chapter.parse().ok()?, verse.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_citation() {
        assert_eq!(build_citation(2, 47), "[2.47]");
        assert_eq!(build_citation(18, 78), "[18.78]");
    }

    #[test]
    fn test_extract_citations_in_order() {
        let text = "Act without attachment [2.47] and with equanimity [18.78].";
        assert_eq!(extract_citations_from_text(text), vec!["[2.47]", "[18.78]"]);
    }

    #[test]
    fn test_extract_rejects_malformed() {
        let text = "bad: [2.x] [247] [.5] [2.] plain 2.47";
        assert!(extract_citations_from_text(text).is_empty());
    }

    #[test]
    fn test_parse_citation() {
        assert_eq!(parse_citation("[2.47]"), Some((2, 47)));
        assert_eq!(parse_citation(" [18.78] "), Some((18, 78)));
        assert_eq!(parse_citation("[2.x]"), None);
        assert_eq!(parse_citation("[247]"), None);
        assert_eq!(parse_citation("2.47"), None);
        assert_eq!(parse_citation("[2.47"), None);
        assert_eq!(parse_citation(""), None);
    }
}
