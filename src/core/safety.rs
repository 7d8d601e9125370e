//! Safety filter for medical and legal advice requests.
//!
//! Checked before retrieval; an unsafe query short-circuits the whole
//! pipeline and gets the fixed deflection message with zero sources.

const MEDICAL_KEYWORDS: &[&str] = &[
    "medical",
    "medicine",
    "doctor",
    "treatment",
    "diagnosis",
    "symptoms",
    "prescription",
    "drug",
    "therapy",
    "cure",
    "illness",
    "disease",
];

const LEGAL_KEYWORDS: &[&str] = &[
    "legal",
    "lawyer",
    "court",
    "lawsuit",
    "legal advice",
    "attorney",
    "litigation",
    "contract",
    "legal opinion",
    "jurisdiction",
];

/// Response returned for queries that fail the safety check.
pub const DEFLECTION_MESSAGE: &str = "I can help you with questions about life, \
spirituality, and personal growth based on the Bhagavad Gita.";

/// Returns true if the query is safe to answer.
/// Case-insensitive substring match against the keyword lists; any hit fails.
pub fn safety_check(query: &str) -> bool {
    let query_lower = query.to_lowercase();

    !MEDICAL_KEYWORDS
        .iter()
        .chain(LEGAL_KEYWORDS.iter())
        .any(|keyword| query_lower.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medical_queries_rejected() {
        assert!(!safety_check("What medicine should I take?"));
        assert!(!safety_check("Tell me about my DIAGNOSIS"));
        assert!(!safety_check("symptoms of stress"));
    }

    #[test]
    fn test_legal_queries_rejected() {
        assert!(!safety_check("Should I talk to a lawyer?"));
        assert!(!safety_check("How do I win a LAWSUIT"));
    }

    #[test]
    fn test_life_questions_allowed() {
        assert!(safety_check("How do I focus on my duty?"));
        assert!(safety_check("How can I find peace in life?"));
        assert!(safety_check(""));
    }
}
