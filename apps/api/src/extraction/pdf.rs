//! Page-level helpers over pdf-extract: encryption detection and per-page text.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use pdf_extract::{Document, OutputError, PlainTextOutput};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("text output failed: {0}")]
    Output(#[from] OutputError),

    #[error("text decoder panicked: {0}")]
    Panicked(String),
}

/// True when the trailer carries an `/Encrypt` dictionary.
pub fn is_encrypted(doc: &Document) -> bool {
    doc.is_encrypted()
}

/// Raw-byte check for an `/Encrypt` entry, used when the parser rejects the file outright.
pub fn declares_encryption(bytes: &[u8]) -> bool {
    bytes.windows(8).any(|w| w == b"/Encrypt")
}

/// Renders one page (1-based) to plain text.
///
/// Font decoding (simple encodings, CID fonts, ToUnicode CMaps) is done by
/// pdf-extract. It panics on fonts it cannot handle, so the panic is caught
/// here and reported as a failed page.
pub fn page_text(doc: &Document, page_number: u32) -> Result<String, PageError> {
    let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut text = String::new();
        {
            let mut output = PlainTextOutput::new(&mut text);
            pdf_extract::output_doc_page(doc, &mut output, page_number)?;
        }
        Ok::<_, OutputError>(text)
    }));

    match rendered {
        Ok(result) => Ok(result?),
        Err(payload) => Err(PageError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
