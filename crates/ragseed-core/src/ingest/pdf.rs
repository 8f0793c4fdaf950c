//! PDF text extraction

use crate::error::{RagseedError, Result};
use std::fs;
use std::path::Path;

/// Extract text from a PDF file.
///
/// Image-only PDFs with no extractable text are an error rather than an
/// empty document.
pub fn extract_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| {
        RagseedError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read PDF file {:?}: {}", path, e),
        ))
    })?;

    let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
        RagseedError::Parse(format!("Failed to extract text from PDF {:?}: {}", path, e))
    })?;

    if text.trim().is_empty() {
        return Err(RagseedError::Parse(format!(
            "PDF file {:?} contains no extractable text (may be image-based)",
            path
        )));
    }

    Ok(text)
}

/// Derive a display title from extracted content, falling back to the
/// file stem.
pub fn extract_title(content: &str, filename: &str) -> String {
    let first_line = content
        .lines()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .unwrap_or("");

    if !first_line.is_empty() && first_line.len() < 200 {
        return first_line.to_string();
    }

    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.replace('_', " ").replace('-', " "))
        .unwrap_or_else(|| "Untitled PDF".to_string())
}
