//! Keyword extraction for topic search and retrieval queries.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex_lite::Regex;

/// Upper bound on keywords sent to the topic store and retrieval service.
pub const MAX_KEYWORDS: usize = 12;

const MIN_KEYWORD_LEN: usize = 3;

const STOP_WORDS: &[&str] = &[
    "about", "after", "all", "also", "and", "any", "are", "because", "been", "before", "being",
    "between", "both", "but", "can", "could", "did", "does", "doing", "each", "for", "from",
    "further", "get", "had", "has", "have", "having", "help", "her", "here", "him", "his", "how",
    "into", "its", "just", "like", "make", "more", "most", "need", "needs", "not", "now", "off",
    "once", "only", "other", "our", "out", "over", "own", "same", "she", "should", "some",
    "such", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "those", "through", "too", "under", "until", "very", "want", "was", "way", "were", "what",
    "when", "where", "which", "while", "who", "why", "will", "with", "would", "you", "your",
];

// Literal pattern; compiling it cannot fail.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("valid regex"));

/// Lowercase alphanumeric tokens minus stop words, first-seen order, de-duplicated.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();

    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| token.len() >= MIN_KEYWORD_LEN)
        .filter(|token| !STOP_WORDS.contains(token))
        .filter(|token| seen.insert(token.to_string()))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_short_tokens_and_stop_words() {
        assert_eq!(
            extract_keywords("Build TRUST with the new team, so they can delegate"),
            vec!["build", "trust", "new", "team", "delegate"]
        );
    }

    #[test]
    fn deduplicates_in_first_seen_order() {
        assert_eq!(
            extract_keywords("feedback loops; Feedback culture & loops"),
            vec!["feedback", "loops", "culture"]
        );
    }

    #[test]
    fn caps_keyword_count() {
        let text = (0..30).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
        assert_eq!(extract_keywords(&text).len(), MAX_KEYWORDS);
    }

    #[test]
    fn empty_text_has_no_keywords() {
        assert!(extract_keywords("   ").is_empty());
    }
}
