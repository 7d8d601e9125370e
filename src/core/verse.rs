use serde::{Deserialize, Serialize};

/// Chapter bounds of the Bhagavad Gita.
pub const MIN_CHAPTER: u32 = 1;
pub const MAX_CHAPTER: u32 = 18;

/// A single verse, the atomic unit of the corpus.
///
/// `text` is the composed display block (chapter/verse header, optional
/// Sanskrit, translated passage). The store is read-only once built, so a
/// `Verse` is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    pub id: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub sanskrit: Option<String>,
}

impl Verse {
    /// Assemble a verse from its cleaned translation and optional Sanskrit.
    pub fn new(chapter: u32, verse: u32, translation: &str, sanskrit: Option<String>) -> Self {
        let text = compose_canonical_text(chapter, verse, sanskrit.as_deref(), translation);
        Self {
            id: create_verse_id(chapter, verse),
            chapter,
            verse,
            text,
            sanskrit,
        }
    }
}

/// Stable verse identifier: zero-padded chapter and verse joined by a period.
pub fn create_verse_id(chapter: u32, verse: u32) -> String {
    format!("{:02}.{:02}", chapter, verse)
}

/// Canonical display text for a verse.
///
/// With Sanskrit: `"Chapter {c}, Verse {v}\n{sanskrit}\n\n{text}"`.
/// Without: `"Chapter {c}, Verse {v}\n\n{text}"`.
pub fn compose_canonical_text(
    chapter: u32,
    verse: u32,
    sanskrit: Option<&str>,
    translation: &str,
) -> String {
    match sanskrit {
        Some(sa) if !sa.is_empty() => {
            format!("Chapter {}, Verse {}\n{}\n\n{}", chapter, verse, sa, translation)
        }
        _ => format!("Chapter {}, Verse {}\n\n{}", chapter, verse, translation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verse_id_zero_padding() {
        assert_eq!(create_verse_id(2, 47), "02.47");
        assert_eq!(create_verse_id(18, 78), "18.78");
        assert_eq!(create_verse_id(1, 1), "01.01");
    }

    #[test]
    fn test_canonical_text_with_sanskrit() {
        let text = compose_canonical_text(2, 47, Some("karmany evadhikaras te"), "Do your duty.");
        assert_eq!(
            text,
            "Chapter 2, Verse 47\nkarmany evadhikaras te\n\nDo your duty."
        );
    }

    #[test]
    fn test_canonical_text_without_sanskrit() {
        let text = compose_canonical_text(2, 47, None, "Do your duty.");
        assert_eq!(text, "Chapter 2, Verse 47\n\nDo your duty.");

        // Empty Sanskrit is treated the same as absent
        let text = compose_canonical_text(2, 47, Some(""), "Do your duty.");
        assert_eq!(text, "Chapter 2, Verse 47\n\nDo your duty.");
    }

    #[test]
    fn test_verse_new() {
        let v = Verse::new(3, 5, "No one can remain without action.", None);
        assert_eq!(v.id, "03.05");
        assert_eq!(v.chapter, 3);
        assert_eq!(v.verse, 5);
        assert!(v.text.starts_with("Chapter 3, Verse 5"));
        assert!(v.sanskrit.is_none());
    }
}
