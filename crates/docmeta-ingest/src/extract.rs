//! Text analysis stages.
//!
//! Every stage reads the same document text and is independent of the
//! others: keyword counting, key sentence ranking, entity tagging, section
//! detection and contact details.

pub mod contacts;
pub mod entities;
pub mod lexical;
pub mod salience;
pub mod sections;
pub mod stopwords;
pub mod text;
pub mod tfidf;

pub use entities::{
    create_tagger, group_entities, EntityLabel, EntityTagger, HeuristicTagger, NamedEntities,
    TaggedSpan,
};
pub use lexical::{analyze, LexicalStats};
pub use salience::key_sentences;
pub use sections::{detect_sections, SectionMap};
