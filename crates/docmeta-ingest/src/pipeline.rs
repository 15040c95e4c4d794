//! The end-to-end extraction pipeline: load, analyze, compose.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use docmeta_core::PipelineOptions;
use tracing::{debug, info, warn};

use crate::compose::{compose, DocumentFeatures, ErrorRecord, MetadataRecord, MetadataResponse};
use crate::document::{base_name, Document};
use crate::extract::{contacts, create_tagger, group_entities, EntityTagger, NamedEntities};
use crate::extract::{analyze, detect_sections, key_sentences, SectionMap};
use crate::file::load_document;
use crate::ocr::{create_ocr_engine, NoopOcr, OcrEngine};

/// Shared, read-only extraction pipeline.
///
/// The tagger and OCR backend are created once and reused by every call.
pub struct MetadataPipeline {
    options: PipelineOptions,
    tagger: Arc<dyn EntityTagger>,
    ocr: Arc<dyn OcrEngine>,
}

impl MetadataPipeline {
    pub fn new(
        options: PipelineOptions,
        tagger: Arc<dyn EntityTagger>,
        ocr: Arc<dyn OcrEngine>,
    ) -> Self {
        Self {
            options,
            tagger,
            ocr,
        }
    }

    /// Build the pipeline with the default tagger and the best OCR backend.
    pub fn from_options(options: PipelineOptions) -> Self {
        let ocr: Arc<dyn OcrEngine> = if options.ocr_fallback {
            create_ocr_engine(&options.ocr)
        } else {
            Arc::new(NoopOcr)
        };
        Self::new(options, create_tagger(), ocr)
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn tagger_name(&self) -> &str {
        self.tagger.name()
    }

    pub fn ocr_available(&self) -> bool {
        self.options.ocr_fallback && self.ocr.is_available()
    }

    /// Extract metadata from the file at `path`, typed by `filename`.
    ///
    /// Never fails: unsupported types give an error record and unreadable
    /// files give a record built from an error text.
    pub fn extract_path(&self, path: &Path, filename: &str) -> MetadataResponse {
        let ocr = self.options.ocr_fallback.then_some(self.ocr.as_ref());

        let doc = match load_document(path, filename, ocr) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Skipping {}: {}", filename, e);
                return MetadataResponse::Unsupported(ErrorRecord::unsupported(base_name(filename)));
            }
        };
        MetadataResponse::Metadata(self.extract_document(&doc))
    }

    /// Run every enabled analysis stage on a loaded document.
    pub fn extract_document(&self, doc: &Document) -> MetadataRecord {
        let start = Instant::now();
        let text = doc.raw_text.as_str();

        let lexical = analyze(text, self.options.keyword_limit);
        let key_sentences = key_sentences(text, self.options.key_sentence_limit);

        let entities = if self.options.entities {
            group_entities(&self.tagger.tag(text))
        } else {
            NamedEntities::default()
        };

        let sections = if self.options.sections {
            detect_sections(text)
        } else {
            SectionMap::default()
        };

        let features = DocumentFeatures {
            lexical,
            key_sentences,
            entities,
            sections,
            email_ids: contacts::email_ids(text),
            institution: contacts::find_institution(text, &self.options.known_institutions),
        };

        debug!(
            "{}: {} entities, {} emails",
            doc.filename,
            features.entities.total(),
            features.email_ids.len()
        );
        info!(
            "Extracted {} ({}): words={}, sentences={}, sections={} in {:?}",
            doc.filename,
            doc.kind.label(),
            features.lexical.word_count,
            features.key_sentences.len(),
            features.sections.len(),
            start.elapsed()
        );

        compose(doc, features, self.options.title_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FileType;
    use crate::extract::{EntityLabel, TaggedSpan};
    use docmeta_core::TitlePolicy;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTagger {
        calls: AtomicUsize,
    }

    impl EntityTagger for FixedTagger {
        fn tag(&self, _text: &str) -> Vec<TaggedSpan> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            vec![
                TaggedSpan { text: "Grace Hopper".into(), label: EntityLabel::Person, start: 0 },
                TaggedSpan { text: "Navy".into(), label: EntityLabel::Org, start: 20 },
            ]
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn pipeline(options: PipelineOptions) -> MetadataPipeline {
        MetadataPipeline::new(options, create_tagger(), Arc::new(NoopOcr))
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path
    }

    fn write_docx(dir: &tempfile::TempDir, name: &str, paragraphs: &[&str]) -> std::path::PathBuf {
        use docx_rs::{Docx, Paragraph, Run};

        let path = dir.path().join(name);
        let mut docx = Docx::new();
        for p in paragraphs {
            let mut para = Paragraph::new();
            if !p.is_empty() {
                para = para.add_run(Run::new().add_text(*p));
            }
            docx = docx.add_paragraph(para);
        }
        let file = std::fs::File::create(&path).unwrap();
        docx.build().pack(file).unwrap();
        path
    }

    #[test]
    fn test_docx_blank_first_paragraph_has_no_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_docx(&dir, "a.docx", &["", "Body text here."]);

        let json = pipeline(PipelineOptions::default())
            .extract_path(&path, "a.docx")
            .to_json()
            .unwrap();
        assert!(json.get("title").is_none());
        assert_eq!(json["filename"], "a.docx");
        assert_eq!(json["key_sentences"], serde_json::json!(["Body text here."]));
    }

    #[test]
    fn test_docx_title_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let options = PipelineOptions {
            title_policy: TitlePolicy::OmitUntitled,
            ..PipelineOptions::default()
        };
        let p = pipeline(options);

        let path = write_docx(&dir, "plan.docx", &["Quarterly Plan", "Targets rise."]);
        let json = p.extract_path(&path, "plan.docx").to_json().unwrap();
        assert_eq!(json["title"], "Quarterly Plan");

        let path = write_docx(&dir, "literal.docx", &["Untitled", "Draft notes."]);
        let json = p.extract_path(&path, "literal.docx").to_json().unwrap();
        assert_eq!(json["title"], "Untitled");

        let path = write_docx(&dir, "empty.docx", &[]);
        let json = p.extract_path(&path, "empty.docx").to_json().unwrap();
        assert!(json.get("title").is_none());
    }

    #[test]
    fn test_docx_hyperlinked_email_is_found() {
        use docx_rs::{Docx, Hyperlink, HyperlinkType, Paragraph, Run};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contact.docx");
        let para = Paragraph::new()
            .add_run(Run::new().add_text("Contact "))
            .add_hyperlink(
                Hyperlink::new("mailto:alice@example.org", HyperlinkType::External)
                    .add_run(Run::new().add_text("alice@example.org")),
            );
        let file = std::fs::File::create(&path).unwrap();
        Docx::new().add_paragraph(para).build().pack(file).unwrap();

        let response = pipeline(PipelineOptions::default()).extract_path(&path, "contact.docx");
        assert_eq!(response.metadata().unwrap().email_ids, vec!["alice@example.org"]);
    }

    #[test]
    fn test_inline_sections_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let text = "Summary: Tests pass. Introduction: This explains objectives. \
                    Extra filler sentence here. Another filler sentence follows.";
        let path = write_file(&dir, "report.txt", text.as_bytes());

        let response = pipeline(PipelineOptions::default()).extract_path(&path, "report.txt");
        let record = response.metadata().unwrap();

        assert_eq!(record.filename, "report.txt");
        assert!(record.sections_found.iter().any(|k| k.contains("Summary")));
        assert!(record.sections_found.iter().any(|k| k.contains("Introduction")));
        assert_eq!(record.summary.as_deref(), Some("Tests pass."));
        assert!(record
            .purpose
            .as_deref()
            .unwrap()
            .starts_with("This explains objectives."));
        // summary tests pass introduction this explains objectives extra filler
        // sentence here another filler sentence follows
        assert_eq!(record.word_count, 15);
        assert_eq!(record.key_sentences.len(), 4);
        assert!(record.named_entities.is_none());
    }

    #[test]
    fn test_empty_txt() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "empty.txt", b"");

        let response = pipeline(PipelineOptions::default()).extract_path(&path, "empty.txt");
        let json = response.to_json().unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "filename": "empty.txt", "word_count": 0, "character_count": 0 })
        );
    }

    #[test]
    fn test_unsupported_type_short_circuits() {
        let tagger = Arc::new(FixedTagger { calls: AtomicUsize::new(0) });
        let p = MetadataPipeline::new(PipelineOptions::default(), tagger.clone(), Arc::new(NoopOcr));
        let response = p.extract_path(Path::new("/nonexistent/photo.png"), "photo.png");
        assert_eq!(
            response,
            MetadataResponse::Unsupported(ErrorRecord::unsupported("photo.png"))
        );
        assert_eq!(tagger.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_corrupt_pdf_yields_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "broken.pdf", b"not a pdf at all");

        let response = pipeline(PipelineOptions::default()).extract_path(&path, "broken.pdf");
        let record = response.metadata().unwrap();
        assert!(record.key_sentences[0].starts_with("Error reading PDF:"));
        assert!(record.top_keywords.contains(&"error".to_string()));
    }

    #[test]
    fn test_entities_switch() {
        let doc = Document::from_text("a.txt", FileType::PlainText, "Anything at all.");
        let tagger = Arc::new(FixedTagger { calls: AtomicUsize::new(0) });

        let on = MetadataPipeline::new(PipelineOptions::default(), tagger.clone(), Arc::new(NoopOcr));
        let entities = on.extract_document(&doc).named_entities.unwrap();
        assert!(entities.people.contains("Grace Hopper"));
        assert!(entities.organizations.contains("Navy"));

        let options = PipelineOptions {
            entities: false,
            ..PipelineOptions::default()
        };
        let off = MetadataPipeline::new(options, tagger.clone(), Arc::new(NoopOcr));
        assert!(off.extract_document(&doc).named_entities.is_none());
        assert_eq!(tagger.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sections_switch() {
        let doc = Document::from_text("a.txt", FileType::PlainText, "Summary\nShort.");
        let options = PipelineOptions {
            sections: false,
            ..PipelineOptions::default()
        };
        let record = pipeline(options).extract_document(&doc);
        assert!(record.sections_found.is_empty());
        assert_eq!(record.summary.as_deref(), Some("Summary\nShort."));
    }

    #[test]
    fn test_contacts_and_institution() {
        let options = PipelineOptions {
            known_institutions: vec!["Example Polytechnic".into()],
            ..PipelineOptions::default()
        };
        let doc = Document::from_text(
            "a.txt",
            FileType::PlainText,
            "Prepared at Example Polytechnic. Mail ops@example.edu for copies.",
        );
        let record = pipeline(options).extract_document(&doc);
        assert_eq!(record.email_ids, vec!["ops@example.edu"]);
        assert_eq!(record.institution.as_deref(), Some("Example Polytechnic"));
    }

    #[test]
    fn test_repeatable() {
        let doc = Document::from_text(
            "a.txt",
            FileType::PlainText,
            "Alpha beta. Gamma delta. Alpha gamma. Beta delta. Epsilon zeta. Alpha zeta. Eta theta.",
        );
        let p = pipeline(PipelineOptions::default());
        assert_eq!(p.extract_document(&doc), p.extract_document(&doc));
        assert_eq!(p.extract_document(&doc).key_sentences.len(), 5);
    }
}
