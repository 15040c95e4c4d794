//! Contact details: e-mail addresses and the issuing institution.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

/// Distinct e-mail addresses in `text`, sorted.
pub fn email_ids(text: &str) -> Vec<String> {
    EMAIL
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// First of `known` that occurs verbatim in `text`.
pub fn find_institution(text: &str, known: &[String]) -> Option<String> {
    known
        .iter()
        .map(|name| name.trim())
        .find(|name| !name.is_empty() && text.contains(name))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_ids_sorted_and_distinct() {
        let text = "Contact zoe@example.org or adam.smith+docs@mail.example.com. \
                    Again: zoe@example.org";
        assert_eq!(
            email_ids(text),
            vec!["adam.smith+docs@mail.example.com", "zoe@example.org"]
        );
    }

    #[test]
    fn test_no_emails() {
        assert!(email_ids("reach us at example dot com").is_empty());
        assert!(email_ids("user@localhost").is_empty());
    }

    #[test]
    fn test_find_institution_prefers_list_order() {
        let known = vec![
            "".to_string(),
            "Institute of Technology".to_string(),
            "Example University".to_string(),
        ];
        let text = "Submitted to Example University, Institute of Technology campus.";
        assert_eq!(
            find_institution(text, &known).as_deref(),
            Some("Institute of Technology")
        );
        assert_eq!(find_institution("nothing here", &known), None);
        assert_eq!(find_institution(text, &[]), None);
    }
}
