//! Résumé text extraction: turns an uploaded PDF into one undifferentiated text blob.
//!
//! Extraction is best-effort per page: a page that fails to decode is skipped,
//! and only a document where *no* page yields text is rejected. The per-page
//! outcomes are folded explicitly by `combine_pages`.

use std::fmt::Display;

use bytes::Bytes;
use pdf_extract::Document;
use thiserror::Error;
use tracing::{debug, warn};

mod pdf;

/// Why a document could not be turned into text. Each variant maps to a user-facing message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("This PDF is password-protected. Please upload an unencrypted resume.")]
    PasswordProtected,

    #[error("Could not extract text from this PDF. It might be a scanned image.")]
    NoExtractableText,

    #[error("Invalid or corrupted PDF file. Please check the file and try again.")]
    Corrupt,

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl ExtractionError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::PasswordProtected => "password_protected",
            ExtractionError::NoExtractableText => "no_extractable_text",
            ExtractionError::Corrupt => "corrupt",
            ExtractionError::Unexpected(_) => "unexpected",
        }
    }
}

/// Extracts text from a PDF held in memory.
///
/// Encryption is checked before any page is touched. Page texts are joined
/// with a single space in page order.
pub fn extract_text(document: &[u8]) -> Result<String, ExtractionError> {
    let doc = match Document::load_mem(document) {
        Ok(doc) => doc,
        Err(e) => {
            // Some encrypted files fail to load at all; report them as encrypted, not broken.
            if pdf::declares_encryption(document) {
                return Err(ExtractionError::PasswordProtected);
            }
            debug!("PDF failed to parse: {e}");
            return Err(ExtractionError::Corrupt);
        }
    };

    if pdf::is_encrypted(&doc) {
        return Err(ExtractionError::PasswordProtected);
    }

    let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();
    debug!("Extracting text from {} page(s)", page_numbers.len());

    combine_pages(
        page_numbers
            .into_iter()
            .map(|page_number| (page_number, pdf::page_text(&doc, page_number))),
    )
}

/// Runs `extract_text` on the blocking pool. A panic inside the parser surfaces as `Unexpected`.
pub async fn extract_text_blocking(document: Bytes) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_text(&document))
        .await
        .map_err(|e| ExtractionError::Unexpected(e.to_string()))?
}

/// Folds per-page outcomes into the combined text.
///
/// Failed pages and pages without text are dropped; at least one page must
/// contribute text or the whole document is `NoExtractableText`.
pub fn combine_pages<I, E>(pages: I) -> Result<String, ExtractionError>
where
    I: IntoIterator<Item = (u32, Result<String, E>)>,
    E: Display,
{
    let texts = pages
        .into_iter()
        .fold(Vec::new(), |mut texts, (page_number, outcome)| {
            match outcome {
                Ok(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        texts.push(text.to_string());
                    }
                }
                Err(e) => warn!("Skipping page {page_number}: {e}"),
            }
            texts
        });

    if texts.is_empty() {
        return Err(ExtractionError::NoExtractableText);
    }

    Ok(texts.join(" "))
}
