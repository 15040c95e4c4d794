//! Word counts and frequency-ranked keywords.

use std::collections::HashMap;

use super::text::keyword_tokens;

/// Token statistics for one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexicalStats {
    /// Number of words of length four or more.
    pub word_count: usize,
    /// Most frequent distinct words, most frequent first.
    pub top_keywords: Vec<String>,
}

/// Count words and rank the `limit` most frequent ones.
pub fn analyze(text: &str, limit: usize) -> LexicalStats {
    let tokens = keyword_tokens(text);
    let top_keywords = most_common(&tokens, limit)
        .into_iter()
        .map(|(word, _)| word)
        .collect();

    LexicalStats {
        word_count: tokens.len(),
        top_keywords,
    }
}

/// The `n` most frequent tokens with their counts.
///
/// Ties keep first-occurrence order.
pub fn most_common(tokens: &[String], n: usize) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for token in tokens {
        match index.get(token.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(token.as_str(), counts.len());
                counts.push((token.as_str(), 1));
            }
        }
    }

    // Stable sort: equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(n)
        .map(|(t, c)| (t.to_string(), c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_counts_and_ranks() {
        let stats = analyze(
            "Rust code. Rust tests and more rust code; code review for the team.",
            10,
        );
        assert_eq!(stats.word_count, 10);
        assert_eq!(stats.top_keywords, vec!["rust", "code", "tests", "more", "review", "team"]);
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        let tokens: Vec<String> = ["beta", "alpha", "gamma", "alpha", "beta", "delta"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let ranked = most_common(&tokens, 3);
        assert_eq!(
            ranked,
            vec![("beta".to_string(), 2), ("alpha".to_string(), 2), ("gamma".to_string(), 1)]
        );
    }

    #[test]
    fn test_limit_and_case() {
        let text = (0..15)
            .map(|i| format!("Word{i:02}"))
            .collect::<Vec<_>>()
            .join(" ");
        let stats = analyze(&text, 10);
        assert_eq!(stats.top_keywords.len(), 10);
        assert!(stats
            .top_keywords
            .iter()
            .all(|k| k.chars().count() >= 4 && *k == k.to_lowercase()));
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(analyze("", 10), LexicalStats::default());
    }
}
