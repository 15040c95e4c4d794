//! Named entity tagging and grouping.
//!
//! The `EntityTagger` trait abstracts span tagging. Implementations:
//! - `HeuristicTagger`: regex and gazetteer rules for people, organizations,
//!   places and dates, compiled once per process
//!
//! Tagged spans are grouped into the `people`, `organizations`, `locations`
//! and `dates` buckets by `group_entities`.

use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Entity categories a tagger may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityLabel {
    Person,
    Org,
    Gpe,
    Date,
    Other,
}

impl EntityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Person => "PERSON",
            EntityLabel::Org => "ORG",
            EntityLabel::Gpe => "GPE",
            EntityLabel::Date => "DATE",
            EntityLabel::Other => "OTHER",
        }
    }
}

/// One tagged span of the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSpan {
    pub text: String,
    pub label: EntityLabel,
    /// Byte offset of the span in the tagged text.
    pub start: usize,
}

/// Trait for entity tagging backends.
pub trait EntityTagger: Send + Sync {
    /// Tag entity spans in `text`, in text order.
    fn tag(&self, text: &str) -> Vec<TaggedSpan>;

    /// Backend name for logs and health output.
    fn name(&self) -> &str;
}

/// Entity names grouped by bucket. Empty buckets are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntities {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub people: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub organizations: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub locations: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub dates: BTreeSet<String>,
}

impl NamedEntities {
    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
            && self.organizations.is_empty()
            && self.locations.is_empty()
            && self.dates.is_empty()
    }

    pub fn total(&self) -> usize {
        self.people.len() + self.organizations.len() + self.locations.len() + self.dates.len()
    }
}

/// Bucket tagged spans. Labels outside the four buckets are ignored.
pub fn group_entities(spans: &[TaggedSpan]) -> NamedEntities {
    let mut grouped = NamedEntities::default();
    for span in spans {
        let name = span.text.trim();
        if name.is_empty() {
            continue;
        }
        let bucket = match span.label {
            EntityLabel::Person => &mut grouped.people,
            EntityLabel::Org => &mut grouped.organizations,
            EntityLabel::Gpe => &mut grouped.locations,
            EntityLabel::Date => &mut grouped.dates,
            EntityLabel::Other => continue,
        };
        bucket.insert(name.to_string());
    }
    grouped
}

const MONTHS: &str = "January|February|March|April|May|June|July|August|September|October|November|December";
const MONTHS_SHORT: &str = "Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec";

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        format!(r"\b(?:{MONTHS})\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s*\d{{4}}\b"),
        format!(r"\b\d{{1,2}}(?:st|nd|rd|th)?\s+(?:of\s+)?(?:{MONTHS}),?\s+\d{{4}}\b"),
        format!(r"\b(?:{MONTHS_SHORT})\.?\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s*\d{{4}}\b"),
        format!(r"\b(?:{MONTHS}),?\s+\d{{4}}\b"),
        r"\b\d{4}[-/]\d{1,2}[-/]\d{1,2}\b".to_string(),
        r"\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b".to_string(),
        r"\bQ[1-4]\s*\d{4}\b".to_string(),
        r"\b(?:19|20)\d{2}\b".to_string(),
    ])
});

static ORG_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b[A-Z][A-Za-z&]*(?:[ \t]+[A-Z][A-Za-z&]*)*[ \t]+(?:Inc\.?|Corp\.?|Corporation|LLC|Ltd\.?|Co\.|Company|Group|GmbH)".to_string(),
        r"\b(?:University|Institute|College|Ministry|Department|Bank|Academy)[ \t]+of[ \t]+(?:the[ \t]+)?[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*".to_string(),
        r"\b(?:[A-Z][A-Za-z]+[ \t]+)+(?:University|Institute|College|Foundation|Association|Agency|Council|Laboratory|Laboratories|Labs|Society|Hospital|School|Committee)\b".to_string(),
    ])
});

static TITLED_PERSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:Mr|Mrs|Ms|Dr|Prof)\.?[ \t]+([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)?)").unwrap()
});

static ACRONYM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{2,5}\b").unwrap());

static CAPITALIZED_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+){1,3}\b").unwrap());

static CAPITALIZED_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z][a-z]+").unwrap());

const PLACES: &[&str] = &[
    "Afghanistan", "Argentina", "Australia", "Austria", "Bangladesh", "Belgium", "Brazil",
    "Canada", "Chile", "China", "Colombia", "Denmark", "Egypt", "England", "Ethiopia",
    "Finland", "France", "Germany", "Ghana", "Greece", "India", "Indonesia", "Iran", "Iraq",
    "Ireland", "Israel", "Italy", "Japan", "Kenya", "Malaysia", "Mexico", "Morocco", "Nepal",
    "Netherlands", "New Zealand", "Nigeria", "Norway", "Pakistan", "Peru", "Philippines",
    "Poland", "Portugal", "Russia", "Saudi Arabia", "Scotland", "Singapore", "South Africa",
    "South Korea", "Spain", "Sri Lanka", "Sweden", "Switzerland", "Thailand", "Turkey",
    "Uganda", "Ukraine", "United Arab Emirates", "United Kingdom", "United States",
    "United States of America", "Vietnam", "Wales", "America", "Europe", "Asia", "Africa",
    "USA", "UK", "UAE", "Amsterdam", "Athens", "Bangkok", "Beijing", "Bengaluru", "Berlin",
    "Boston", "Brussels", "Cairo", "Chennai", "Chicago", "Delhi", "New Delhi", "Dubai",
    "Dublin", "Geneva", "Hong Kong", "Istanbul", "Jakarta", "Karachi", "Kolkata", "Lagos",
    "Lisbon", "London", "Los Angeles", "Madrid", "Manila", "Melbourne", "Mexico City",
    "Moscow", "Mumbai", "Nairobi", "New York", "Oslo", "Oxford", "Cambridge", "Paris",
    "Prague", "Rome", "San Francisco", "Seattle", "Seoul", "Shanghai", "Stockholm",
    "Sydney", "Tokyo", "Toronto", "Vancouver", "Vienna", "Warsaw", "Washington", "Zurich",
    "California", "Texas", "Florida", "Ontario", "Bavaria", "Kerala", "Karnataka",
    "Tamil Nadu", "Maharashtra",
];

static GAZETTEER: Lazy<Regex> = Lazy::new(|| {
    let mut names: Vec<&str> = PLACES.to_vec();
    // Longest first so "New York" wins over a shorter prefix entry.
    names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alternation = names
        .iter()
        .map(|n| regex::escape(n).replace(' ', r"[ \t]+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).unwrap()
});

/// Upper-case tokens that are formats, units or roman numerals, not organizations.
const ACRONYM_STOPLIST: &[&str] = &[
    "PDF", "DOCX", "DOC", "TXT", "OCR", "JSON", "HTML", "XML", "CSV", "URL", "HTTP", "API",
    "FAQ", "TBD", "NA", "AM", "PM", "OK", "ID", "II", "III", "IV", "VI", "VII", "VIII", "IX",
    "XI", "XII", "NB", "PS", "RE", "CC", "BCC", "ETC", "IE", "EG", "AND", "THE", "FOR", "NOT",
    "ALL", "NEW", "NOTE", "TODO", "DATE", "NAME", "PAGE", "TITLE",
];

/// Capitalized words that begin sentences or headings rather than names.
const NON_NAME_WORDS: &[&str] = &[
    "A", "An", "The", "This", "That", "These", "Those", "There", "Here", "It", "Its", "We",
    "Our", "Us", "You", "Your", "They", "Their", "He", "She", "His", "Her", "In", "On", "At",
    "For", "From", "By", "With", "Of", "To", "And", "But", "Or", "If", "As", "When", "While",
    "After", "Before", "During", "Since", "Dear", "Regards", "Sincerely", "Thanks", "Thank",
    "Abstract", "Introduction", "Objective", "Objectives", "Problem", "Conclusion",
    "Conclusions", "Summary", "Results", "Result", "Discussion", "Method", "Methods",
    "Methodology", "Background", "References", "Appendix", "Chapter", "Section", "Table",
    "Figure", "Key", "Findings", "Overview", "Report", "Project", "Page", "Monday", "Tuesday",
    "Wednesday", "Thursday", "Friday", "Saturday", "Sunday", "January", "February", "March",
    "April", "May", "June", "July", "August", "September", "October", "November",
    "December", "University", "Institute", "College", "Department", "School",
];

static NON_NAME_SET: Lazy<BTreeSet<&'static str>> =
    Lazy::new(|| NON_NAME_WORDS.iter().copied().collect());

fn compile(patterns: &[String]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

/// Rule-based tagger for PERSON, ORG, GPE and DATE spans.
///
/// Passes run from most to least specific; a span is dropped when it
/// overlaps one accepted by an earlier pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicTagger;

impl HeuristicTagger {
    pub fn new() -> Self {
        Self
    }
}

struct SpanSet {
    spans: Vec<TaggedSpan>,
}

impl SpanSet {
    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.spans
            .iter()
            .any(|s| start < s.start + s.text.len() && s.start < end)
    }

    fn offer(&mut self, text: &str, start: usize, label: EntityLabel) {
        let end = start + text.len();
        if text.trim().is_empty() || self.overlaps(start, end) {
            return;
        }
        self.spans.push(TaggedSpan {
            text: text.to_string(),
            label,
            start,
        });
    }
}

impl EntityTagger for HeuristicTagger {
    fn tag(&self, text: &str) -> Vec<TaggedSpan> {
        let mut found = SpanSet { spans: Vec::new() };

        for re in DATE_PATTERNS.iter() {
            for m in re.find_iter(text) {
                found.offer(m.as_str(), m.start(), EntityLabel::Date);
            }
        }

        for re in ORG_PATTERNS.iter() {
            for m in re.find_iter(text) {
                found.offer(m.as_str(), m.start(), EntityLabel::Org);
            }
        }

        for m in GAZETTEER.find_iter(text) {
            found.offer(m.as_str(), m.start(), EntityLabel::Gpe);
        }

        for cap in TITLED_PERSON.captures_iter(text) {
            if let Some(name) = cap.get(1) {
                found.offer(name.as_str(), name.start(), EntityLabel::Person);
            }
        }

        for m in ACRONYM.find_iter(text) {
            if !ACRONYM_STOPLIST.contains(&m.as_str()) {
                found.offer(m.as_str(), m.start(), EntityLabel::Org);
            }
        }

        for m in CAPITALIZED_RUN.find_iter(text) {
            if let Some((offset, name)) = trim_non_names(m.as_str()) {
                found.offer(name, m.start() + offset, EntityLabel::Person);
            }
        }

        found.spans.sort_by_key(|s| s.start);
        found.spans
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// Drop leading sentence-start words from a capitalized run.
///
/// Returns the byte offset and text of the remaining name when it is at
/// least two words long and contains no other non-name word.
fn trim_non_names(run: &str) -> Option<(usize, &str)> {
    let words: Vec<regex::Match> = CAPITALIZED_WORD.find_iter(run).collect();
    let first = words
        .iter()
        .position(|w| !NON_NAME_SET.contains(w.as_str()))?;
    let rest = &words[first..];
    if rest.len() < 2 || rest.iter().any(|w| NON_NAME_SET.contains(w.as_str())) {
        return None;
    }
    let start = rest[0].start();
    let end = rest[rest.len() - 1].end();
    Some((start, &run[start..end]))
}

/// Create the entity tagger shared by all extractions.
pub fn create_tagger() -> Arc<dyn EntityTagger> {
    Lazy::force(&GAZETTEER);
    info!("Using heuristic entity tagger ({} places)", PLACES.len());
    Arc::new(HeuristicTagger::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(text: &str) -> NamedEntities {
        group_entities(&HeuristicTagger::new().tag(text))
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tags_all_four_buckets() {
        let e = tag("Dr. Alice Johnson joined Acme Corp. in Paris on March 3, 2021.");
        assert_eq!(e.people, set(&["Alice Johnson"]));
        assert_eq!(e.organizations, set(&["Acme Corp."]));
        assert_eq!(e.locations, set(&["Paris"]));
        assert_eq!(e.dates, set(&["March 3, 2021"]));
    }

    #[test]
    fn test_institution_names() {
        let e = tag("Researchers at the University of Oxford and Stanford University met in New York.");
        assert!(e.organizations.contains("University of Oxford"));
        assert!(e.organizations.contains("Stanford University"));
        assert_eq!(e.locations, set(&["New York"]));
        assert!(e.people.is_empty());
    }

    #[test]
    fn test_acronyms_skip_formats() {
        let e = tag("The report for NASA was exported as PDF and DOCX.");
        assert_eq!(e.organizations, set(&["NASA"]));
    }

    #[test]
    fn test_sentence_start_words_are_not_names() {
        let e = tag("The Project Report was written by Maria Garcia last week.");
        assert_eq!(e.people, set(&["Maria Garcia"]));
    }

    #[test]
    fn test_numeric_dates_and_years() {
        let e = tag("Filed 2023-04-01, revised 12/05/2023 and archived in 1999.");
        assert_eq!(e.dates, set(&["2023-04-01", "12/05/2023", "1999"]));
    }

    #[test]
    fn test_plain_headings_yield_nothing() {
        let e = tag(
            "Summary: Tests pass. Introduction: This explains objectives. \
             Extra filler sentence here. Another filler sentence follows.",
        );
        assert!(e.is_empty());
    }

    #[test]
    fn test_spans_in_text_order_without_overlap() {
        let spans = HeuristicTagger::new().tag("In 2020 Acme Inc opened offices in London and Tokyo.");
        let starts: Vec<usize> = spans.iter().map(|s| s.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        for pair in spans.windows(2) {
            assert!(pair[0].start + pair[0].text.len() <= pair[1].start);
        }
    }

    #[test]
    fn test_grouping_dedups_and_drops_other() {
        let spans = vec![
            TaggedSpan { text: "Ada Lovelace".into(), label: EntityLabel::Person, start: 0 },
            TaggedSpan { text: "Ada Lovelace".into(), label: EntityLabel::Person, start: 40 },
            TaggedSpan { text: "42".into(), label: EntityLabel::Other, start: 60 },
            TaggedSpan { text: " ".into(), label: EntityLabel::Gpe, start: 70 },
        ];
        let grouped = group_entities(&spans);
        assert_eq!(grouped.people, set(&["Ada Lovelace"]));
        assert_eq!(grouped.total(), 1);
        let json = serde_json::to_value(&grouped).unwrap();
        assert_eq!(json, serde_json::json!({ "people": ["Ada Lovelace"] }));
    }

    #[test]
    fn test_label_names() {
        assert_eq!(EntityLabel::Gpe.as_str(), "GPE");
        assert_eq!(create_tagger().name(), "heuristic");
    }
}
