//! Pipeline stages for one help-generation run.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ encode ──▶ llm
//! (paths)   (pdfium)    (base64)   (Groq)
//! ```
//!
//! 1. [`input`]   — validate the PDF and screenshot directory, list screens
//! 2. [`extract`] — FRD text, page by page; runs in `spawn_blocking` because
//!    pdfium is synchronous
//! 3. [`encode`]  — screenshot bytes to a base64 data URL
//! 4. [`llm`]     — build the chat request and call the model; the only stage
//!    here with network I/O
//!
//! Publishing lives in [`crate::confluence`].

pub mod encode;
pub mod extract;
pub mod input;
pub mod llm;
