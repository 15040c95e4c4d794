//! OCR backends for image-only PDFs.
//!
//! The `OcrEngine` trait abstracts page recognition. Implementations:
//! - `TesseractOcr`: renders a page with poppler's `pdftoppm`, then runs
//!   the `tesseract` CLI on the image
//! - `NoopOcr`: used when the binaries are missing or OCR is switched off

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use docmeta_core::{Error, OcrSettings, Result};
use tracing::{debug, info, warn};

/// Trait for OCR backends.
pub trait OcrEngine: Send + Sync {
    /// Recognize the text of one page (1-based) of a PDF.
    fn recognize_page(&self, pdf: &Path, page: u32) -> Result<String>;

    /// Check if the backend can run.
    fn is_available(&self) -> bool;

    /// Backend name for logs and health output.
    fn name(&self) -> &str;
}

/// Backend that never recognizes anything.
pub struct NoopOcr;

impl OcrEngine for NoopOcr {
    fn recognize_page(&self, _pdf: &Path, _page: u32) -> Result<String> {
        Err(Error::Ocr("no OCR backend available".into()))
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Tesseract CLI backend.
pub struct TesseractOcr {
    settings: OcrSettings,
}

impl TesseractOcr {
    pub fn new(settings: OcrSettings) -> Self {
        Self { settings }
    }

    /// Check that both `pdftoppm` and `tesseract` can be executed.
    pub fn probe(&self) -> bool {
        binary_runs(&self.settings.pdftoppm_path, "-v")
            && binary_runs(&self.settings.tesseract_path, "--version")
    }

    fn render_page(&self, pdf: &Path, page: u32, out_prefix: &Path) -> Result<()> {
        let page_arg = page.to_string();
        let dpi = self.settings.dpi.to_string();
        let output = Command::new(&self.settings.pdftoppm_path)
            .args(["-f", page_arg.as_str(), "-l", page_arg.as_str()])
            .args(["-r", dpi.as_str()])
            .args(["-png", "-singlefile"])
            .arg(pdf)
            .arg(out_prefix)
            .output()
            .map_err(|e| {
                Error::Ocr(format!(
                    "failed to run pdftoppm (path='{}'): {}",
                    self.settings.pdftoppm_path, e
                ))
            })?;

        if !output.status.success() {
            return Err(Error::Ocr(format!(
                "pdftoppm failed on page {} (exit code {}): {}",
                page,
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize_page(&self, pdf: &Path, page: u32) -> Result<String> {
        let scratch = tempfile::tempdir()?;
        let prefix = scratch.path().join("page");
        self.render_page(pdf, page, &prefix)?;
        let image = prefix.with_extension("png");

        // tesseract <image> stdout -l <lang>
        let output = Command::new(&self.settings.tesseract_path)
            .arg(&image)
            .arg("stdout")
            .args(["-l", self.settings.language.as_str()])
            .output()
            .map_err(|e| {
                Error::Ocr(format!(
                    "failed to run tesseract (path='{}'): {}",
                    self.settings.tesseract_path, e
                ))
            })?;

        if !output.status.success() {
            return Err(Error::Ocr(format!(
                "tesseract failed on page {} (exit code {}): {}",
                page,
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("OCR page {} of {}: {} chars", page, pdf.display(), text.len());
        Ok(text)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

fn binary_runs(program: &str, version_flag: &str) -> bool {
    Command::new(program)
        .arg(version_flag)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Create the best available OCR backend.
///
/// Tries tesseract + pdftoppm, falls back to `NoopOcr`.
pub fn create_ocr_engine(settings: &OcrSettings) -> Arc<dyn OcrEngine> {
    let engine = TesseractOcr::new(settings.clone());
    if engine.probe() {
        info!("Using tesseract OCR (lang={}, dpi={})", settings.language, settings.dpi);
        return Arc::new(engine);
    }
    warn!(
        "OCR unavailable: '{}' or '{}' not runnable. Image-only PDFs will yield no text.",
        settings.pdftoppm_path, settings.tesseract_path
    );
    Arc::new(NoopOcr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_is_unavailable() {
        let ocr = NoopOcr;
        assert!(!ocr.is_available());
        assert!(ocr.recognize_page(Path::new("x.pdf"), 1).is_err());
    }

    #[test]
    fn test_missing_binaries_fall_back_to_noop() {
        let settings = OcrSettings {
            tesseract_path: "/nonexistent/tesseract".into(),
            pdftoppm_path: "/nonexistent/pdftoppm".into(),
            ..OcrSettings::default()
        };
        let engine = create_ocr_engine(&settings);
        assert!(!engine.is_available());
        assert_eq!(engine.name(), "none");
    }

    #[test]
    fn test_render_failure_is_ocr_error() {
        let engine = TesseractOcr::new(OcrSettings {
            pdftoppm_path: "/nonexistent/pdftoppm".into(),
            ..OcrSettings::default()
        });
        let err = engine.recognize_page(Path::new("scan.pdf"), 1).unwrap_err();
        assert!(matches!(err, Error::Ocr(m) if m.contains("pdftoppm")));
    }
}
