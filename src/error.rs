//! Error types for the frd2help library.
//!
//! Every failure is fatal. The pipeline has no retry loop and no per-screen
//! error boundary: the first error surfaces from [`crate::run::run`] and the
//! run stops. The single local recovery happens inside text extraction, where
//! a page whose text cannot be read contributes an empty segment instead of an
//! error.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the frd2help library.
#[derive(Debug, Error)]
pub enum HelpGenError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// A required setting is absent from the environment.
    #[error("{what} is not configured: set {vars}")]
    MissingConfig { what: &'static str, vars: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The screenshot directory does not exist or is not a directory.
    #[error("Screenshot directory not found: '{path}'")]
    DirectoryNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, or install pdfium\n\
where the system loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Image errors ──────────────────────────────────────────────────────
    /// Screenshot could not be read from disk.
    #[error("Failed to read image '{path}': {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Model errors ──────────────────────────────────────────────────────
    /// Transport-level failure talking to the model endpoint.
    #[error("Model request failed: {0}")]
    ModelRequest(#[source] reqwest::Error),

    /// The model endpoint answered with a non-success status.
    #[error("Model API error: HTTP {status}: {body}")]
    ModelApi { status: u16, body: String },

    /// The model answered but produced no text.
    #[error("Model returned no completion text for screen '{screen}'")]
    EmptyCompletion { screen: String },

    // ── Wiki errors ───────────────────────────────────────────────────────
    /// Transport-level failure talking to the wiki (connect, timeout, TLS).
    #[error("Confluence request failed: {0}")]
    WikiRequest(#[source] reqwest::Error),

    /// The wiki answered with a non-success status.
    #[error("Confluence HTTP error: {status} - {body}")]
    WikiHttp { status: u16, body: String },

    /// The wiki answered 2xx but the body was not the expected JSON.
    #[error("Unexpected Confluence response: {0}")]
    WikiResponse(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write a saved HTML file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_names_variables() {
        let e = HelpGenError::MissingConfig {
            what: "Groq model access",
            vars: "GROQ_API_KEY".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("GROQ_API_KEY"), "got: {msg}");
        assert!(msg.contains("Groq model access"), "got: {msg}");
    }

    #[test]
    fn wiki_http_display_includes_status_and_body() {
        let e = HelpGenError::WikiHttp {
            status: 400,
            body: r#"{"message":"space does not exist"}"#.into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("space does not exist"));
    }

    #[test]
    fn model_api_display() {
        let e = HelpGenError::ModelApi {
            status: 429,
            body: "rate limited".into(),
        };
        assert!(e.to_string().contains("429"));
        assert!(e.to_string().contains("rate limited"));
    }

    #[test]
    fn not_a_pdf_display() {
        let e = HelpGenError::NotAPdf {
            path: PathBuf::from("frd.pdf"),
            magic: *b"PK\x03\x04",
        };
        assert!(e.to_string().contains("frd.pdf"));
    }
}
