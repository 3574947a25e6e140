//! Input resolution: read the ZPL document and decode it when text is needed.
//!
//! The pipeline prefers raw bytes: splitting and batching never decode, so a
//! document is sent to the service exactly as read. Decoding only happens
//! when the column offset must rewrite `^FO` commands. Label files in the
//! wild are either UTF-8 (`^CI28`) or a single-byte code page, so decoding
//! tries UTF-8 first and falls back to Latin-1, which accepts every byte.

use crate::error::Zpl2PdfError;
use std::borrow::Cow;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Marker for reading the document from standard input.
pub const STDIN_MARKER: &str = "-";

/// Decode a document: UTF-8 when valid, otherwise Latin-1 (never fails).
pub fn decode_document(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!("Input is not valid UTF-8; decoding as Latin-1");
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

/// Read a document from a file path, or from stdin when `input` is `-`.
pub async fn read_input(input: &str) -> Result<Vec<u8>, Zpl2PdfError> {
    let bytes = if input == STDIN_MARKER {
        read_stdin().await?
    } else {
        read_file(Path::new(input)).await?
    };

    if bytes.is_empty() {
        return Err(Zpl2PdfError::EmptyInput {
            input: input.to_string(),
        });
    }

    debug!("Read {} bytes from {}", bytes.len(), input);
    Ok(bytes)
}

async fn read_file(path: &Path) -> Result<Vec<u8>, Zpl2PdfError> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Zpl2PdfError::FileNotFound {
            path: PathBuf::from(path),
        },
        std::io::ErrorKind::PermissionDenied => Zpl2PdfError::PermissionDenied {
            path: PathBuf::from(path),
        },
        _ => Zpl2PdfError::InputReadFailed {
            input: path.display().to_string(),
            source: e,
        },
    })
}

async fn read_stdin() -> Result<Vec<u8>, Zpl2PdfError> {
    tokio::task::spawn_blocking(|| {
        let mut buf = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .map(|_| buf)
    })
    .await
    .map_err(|e| Zpl2PdfError::Internal(format!("stdin task panicked: {e}")))?
    .map_err(|e| Zpl2PdfError::InputReadFailed {
        input: "<stdin>".to_string(),
        source: e,
    })
}
