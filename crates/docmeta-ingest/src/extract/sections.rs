//! Heading detection and section body accumulation.
//!
//! A line is a heading when its lower-cased text contains one of
//! [`HEADING_KEYWORDS`] anywhere, so "Reintroduction" also opens a section.
//! Inline labels such as `Summary: text` open a section at the start of a
//! line or sentence and the text after the colon becomes its body.

use once_cell::sync::Lazy;
use regex::Regex;

pub const HEADING_KEYWORDS: &[&str] = &[
    "abstract",
    "introduction",
    "objective",
    "problem",
    "conclusion",
    "summary",
    "results",
    "discussion",
];

static ENUMERATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]?\s*").unwrap());

/// A short label ending in a colon, at line start or after a sentence end.
static INLINE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[.!?][ \t]+)((?:\d+[.)]?[ \t]*)?[A-Za-z][A-Za-z ]{0,40}?)[ \t]*:").unwrap()
});

/// Detected sections in the order their headings first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    entries: Vec<(String, String)>,
}

impl SectionMap {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Section keys in order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, body)| body.as_str())
    }

    /// Body of the first section whose key contains `needle`, ignoring case.
    pub fn find(&self, needle: &str) -> Option<&str> {
        let needle = needle.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| k.to_lowercase().contains(&needle))
            .map(|(_, body)| body.as_str())
    }
}

/// Accumulates body parts per heading while scanning.
#[derive(Default)]
struct Builder {
    sections: Vec<(String, Vec<String>)>,
    current: Option<usize>,
}

impl Builder {
    fn open(&mut self, key: String) {
        let idx = match self.sections.iter().position(|(k, _)| *k == key) {
            Some(i) => i,
            None => {
                self.sections.push((key, Vec::new()));
                self.sections.len() - 1
            }
        };
        self.current = Some(idx);
    }

    fn push(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if let Some(i) = self.current {
            self.sections[i].1.push(text.to_string());
        }
    }

    fn finish(self) -> SectionMap {
        let entries = self
            .sections
            .into_iter()
            .filter_map(|(key, parts)| {
                let body = parts.join(" ").trim().to_string();
                (!body.is_empty()).then_some((key, body))
            })
            .collect();
        SectionMap { entries }
    }
}

fn is_heading(text: &str) -> bool {
    let lower = text.to_lowercase();
    HEADING_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn section_key(heading: &str) -> String {
    ENUMERATION.replace(heading.trim(), "").trim().to_string()
}

/// Inline heading labels in `line` as (label, label start, body start).
fn inline_labels(line: &str) -> Vec<(&str, usize, usize)> {
    INLINE_LABEL
        .captures_iter(line)
        .filter_map(|cap| {
            let label = cap.get(1)?;
            let whole = cap.get(0)?;
            is_heading(label.as_str()).then_some((label.as_str(), label.start(), whole.end()))
        })
        .collect()
}

/// Scan `text` line by line and collect the body under each heading.
///
/// Text before the first heading is discarded, a repeated heading keeps
/// adding to its first entry, and sections with an empty body are dropped.
pub fn detect_sections(text: &str) -> SectionMap {
    let mut builder = Builder::default();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let labels = inline_labels(line);
        if !labels.is_empty() {
            builder.push(&line[..labels[0].1]);
            for (i, (label, _, body_start)) in labels.iter().enumerate() {
                builder.open(section_key(label));
                let body_end = labels.get(i + 1).map_or(line.len(), |next| next.1);
                builder.push(&line[*body_start..body_end]);
            }
            continue;
        }

        if is_heading(line) {
            let key = section_key(line);
            if !key.is_empty() {
                builder.open(key);
            }
        } else {
            builder.push(line);
        }
    }

    builder.finish()
}
