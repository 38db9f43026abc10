//! FRD text extraction: PDF → one newline-joined string, page order preserved.
//!
//! pdfium wraps a C++ library with thread-local state, so the blocking work
//! runs inside `spawn_blocking`. The text source sits behind
//! [`PageTextSource`] so the driver can be exercised without a pdfium build.
//!
//! A page whose text cannot be read contributes an empty segment; it never
//! fails the whole document. Failing to open the document does.

use crate::error::HelpGenError;
use pdfium_render::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit pdfium library file.
pub const ENV_PDFIUM_LIB_PATH: &str = "PDFIUM_LIB_PATH";

/// Produces the text of every page of a PDF, in page order.
///
/// `None` marks a page with no extractable text.
pub trait PageTextSource: Send + Sync {
    fn page_texts(&self, pdf_path: &Path) -> Result<Vec<Option<String>>, HelpGenError>;
}

/// The FRD as handed to the generator: read once, reused for every screen.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub text: String,
    pub page_count: usize,
    /// Pages that yielded no text.
    pub empty_pages: usize,
}

/// Join page texts with `\n`, substituting `""` for pages without text.
pub fn join_page_texts(pages: Vec<Option<String>>) -> String {
    pages
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract the whole document through `source` on the blocking pool.
pub async fn extract_document(
    source: Arc<dyn PageTextSource>,
    pdf_path: &Path,
) -> Result<ExtractedDocument, HelpGenError> {
    let path = pdf_path.to_path_buf();

    let pages = tokio::task::spawn_blocking(move || source.page_texts(&path))
        .await
        .map_err(|e| HelpGenError::Internal(format!("Extraction task panicked: {}", e)))??;

    let page_count = pages.len();
    let empty_pages = pages
        .iter()
        .filter(|p| p.as_deref().map_or(true, str::is_empty))
        .count();
    let text = join_page_texts(pages);

    info!(
        "Extracted {} chars from {} pages ({} without text)",
        text.chars().count(),
        page_count,
        empty_pages
    );

    Ok(ExtractedDocument {
        text,
        page_count,
        empty_pages,
    })
}

/// Page text from pdfium.
///
/// The library is bound on each call: `PDFIUM_LIB_PATH` when set, the system
/// library otherwise.
#[derive(Debug, Clone, Default)]
pub struct PdfiumTextSource {
    library_path: Option<PathBuf>,
}

impl PdfiumTextSource {
    /// Bind to the library file at `path` instead of consulting the environment.
    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium, HelpGenError> {
        let explicit = self
            .library_path
            .clone()
            .or_else(|| std::env::var_os(ENV_PDFIUM_LIB_PATH).map(PathBuf::from));

        let bindings = match explicit {
            Some(path) => {
                debug!("Binding pdfium from {}", path.display());
                Pdfium::bind_to_library(&path).map_err(|e| {
                    HelpGenError::PdfiumBindingFailed(format!("{}: {}", path.display(), e))
                })?
            }
            None => Pdfium::bind_to_system_library()
                .map_err(|e| HelpGenError::PdfiumBindingFailed(e.to_string()))?,
        };

        Ok(Pdfium::new(bindings))
    }
}

impl PageTextSource for PdfiumTextSource {
    fn page_texts(&self, pdf_path: &Path) -> Result<Vec<Option<String>>, HelpGenError> {
        let pdfium = self.bind()?;

        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| HelpGenError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("{:?}", e),
            })?;

        let pages = document.pages();
        info!("PDF loaded: {} pages", pages.len());

        let texts = pages
            .iter()
            .enumerate()
            .map(|(idx, page)| match page.text() {
                Ok(text) => Some(text.all()),
                Err(e) => {
                    warn!("Page {}: no extractable text ({:?})", idx + 1, e);
                    None
                }
            })
            .collect();

        Ok(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPages(Vec<Option<String>>);

    impl PageTextSource for FixedPages {
        fn page_texts(&self, _pdf_path: &Path) -> Result<Vec<Option<String>>, HelpGenError> {
            Ok(self.0.clone())
        }
    }

    struct Unreadable;

    impl PageTextSource for Unreadable {
        fn page_texts(&self, pdf_path: &Path) -> Result<Vec<Option<String>>, HelpGenError> {
            Err(HelpGenError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: "xref".into(),
            })
        }
    }

    #[test]
    fn explicit_library_path_is_bound_before_reading() {
        let source = PdfiumTextSource::with_library("/nonexistent/libpdfium.so");
        match source.page_texts(Path::new("frd.pdf")) {
            Err(HelpGenError::PdfiumBindingFailed(msg)) => {
                assert!(msg.contains("/nonexistent/libpdfium.so"));
            }
            other => panic!("expected PdfiumBindingFailed, got {other:?}"),
        }
    }

    #[test]
    fn join_preserves_page_order() {
        let joined = join_page_texts(vec![
            Some("first".into()),
            Some("second".into()),
            Some("third".into()),
        ]);
        assert_eq!(joined, "first\nsecond\nthird");
    }

    #[test]
    fn join_substitutes_empty_segments() {
        let joined = join_page_texts(vec![Some("a".into()), None, Some("c".into()), None]);
        assert_eq!(joined, "a\n\nc\n");
    }

    #[test]
    fn join_of_no_pages_is_empty() {
        assert_eq!(join_page_texts(Vec::new()), "");
    }

    #[tokio::test]
    async fn extract_counts_pages_and_empty_pages() {
        let source = Arc::new(FixedPages(vec![
            Some("Hello".into()),
            None,
            Some(String::new()),
            Some("World".into()),
        ]));
        let doc = extract_document(source, Path::new("frd.pdf")).await.unwrap();
        assert_eq!(doc.text, "Hello\n\n\nWorld");
        assert_eq!(doc.page_count, 4);
        assert_eq!(doc.empty_pages, 2);
    }

    #[tokio::test]
    async fn extract_propagates_open_failure() {
        let err = extract_document(Arc::new(Unreadable), Path::new("bad.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, HelpGenError::CorruptPdf { .. }));
    }
}
