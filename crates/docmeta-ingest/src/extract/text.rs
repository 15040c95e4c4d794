//! Sentence splitting and word tokenization shared by the analyzers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of at least four word characters.
static KEYWORD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w{4,}\b").unwrap());

/// Runs of at least two word characters (vectorizer vocabulary).
static TERM_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Split text into sentences on whitespace following `.`, `!` or `?`.
///
/// Sentences are trimmed and empty ones dropped, so empty text yields no
/// sentences at all.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_whitespace() {
                    let end = i + c.len_utf8();
                    push_trimmed(&mut sentences, &text[start..end]);
                    start = end;
                }
            }
        }
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, s: &'a str) {
    let s = s.trim();
    if !s.is_empty() {
        out.push(s);
    }
}

/// Lower-cased words of length four or more, in text order.
pub fn keyword_tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    KEYWORD_TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lower-cased terms of length two or more, in text order.
pub fn term_tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TERM_TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let s = split_sentences("First one. Second one!  Third?\nFourth without end");
        assert_eq!(s, vec!["First one.", "Second one!", "Third?", "Fourth without end"]);
    }

    #[test]
    fn test_split_requires_whitespace_after_punctuation() {
        let s = split_sentences("Version 2.5 shipped. See example.com for details.");
        assert_eq!(s, vec!["Version 2.5 shipped.", "See example.com for details."]);
    }

    #[test]
    fn test_split_empty_and_blank() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n\t ").is_empty());
    }

    #[test]
    fn test_split_multibyte() {
        let s = split_sentences("Café ouvert. Très bien… Fin.");
        assert_eq!(s, vec!["Café ouvert.", "Très bien… Fin."]);
    }

    #[test]
    fn test_keyword_tokens() {
        let t = keyword_tokens("The Quick brown fox_jumps over 2024 lazy dogs.");
        assert_eq!(t, vec!["quick", "brown", "fox_jumps", "over", "2024", "lazy", "dogs"]);
    }

    #[test]
    fn test_term_tokens() {
        let t = term_tokens("A cat, an Owl.");
        assert_eq!(t, vec!["cat", "an", "owl"]);
    }
}
