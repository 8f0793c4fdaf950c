//! Document ingestion
//!
//! Loads seed documents from a local PDF file or a directory of PDFs.

pub mod pdf;

use crate::db::hash_content;
use crate::error::{RagseedError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default glob for directory ingestion.
pub const DEFAULT_PDF_PATTERN: &str = "**/*.pdf";

/// A document ready for chunking and embedding.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Source path of the document.
    pub uri: String,

    /// Display title.
    pub title: String,

    /// Full extracted text.
    pub text: String,

    /// SHA-256 of the extracted text.
    pub hash: String,
}

/// Load documents from a path.
///
/// A single `.pdf` file loads as one document; a directory is walked
/// recursively for PDFs matching `pattern`. PDFs that fail extraction are
/// skipped with a warning rather than failing the whole load.
pub fn load_path(path: &Path, pattern: &str) -> Result<Vec<SourceDocument>> {
    if !path.exists() {
        return Err(RagseedError::InvalidInput(format!(
            "Path does not exist: {}",
            path.display()
        )));
    }

    let pdf_files = if path.is_file() {
        if path.extension().and_then(|e| e.to_str()) == Some("pdf") {
            vec![path.to_path_buf()]
        } else {
            return Err(RagseedError::InvalidInput(format!(
                "File is not a PDF: {}",
                path.display()
            )));
        }
    } else {
        scan_directory(path, pattern)?
    };

    let mut documents = Vec::new();
    for pdf_path in pdf_files {
        match load_pdf(&pdf_path) {
            Ok(doc) => documents.push(doc),
            Err(e) => {
                tracing::warn!("Skipping PDF {:?}: {}", pdf_path, e);
            }
        }
    }

    Ok(documents)
}

fn load_pdf(path: &Path) -> Result<SourceDocument> {
    let text = pdf::extract_text(path)?;
    let uri = path.to_string_lossy().to_string();
    let title = pdf::extract_title(&text, &uri);
    let hash = hash_content(&text);

    Ok(SourceDocument {
        uri,
        title,
        text,
        hash,
    })
}

/// Scan a directory for PDF files matching the glob pattern.
fn scan_directory(base_path: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let glob_pattern = glob::Pattern::new(pattern)?;
    let mut pdf_files = Vec::new();

    for entry in WalkDir::new(base_path)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.')
                && !matches!(
                    name.as_ref(),
                    "node_modules" | ".git" | ".cache" | "target" | "dist" | "build"
                )
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if let Some(ext) = path.extension() {
            if ext.eq_ignore_ascii_case("pdf") {
                if let Ok(relative) = path.strip_prefix(base_path) {
                    if glob_pattern.matches(&relative.to_string_lossy()) {
                        pdf_files.push(path.to_path_buf());
                    }
                }
            }
        }
    }

    pdf_files.sort();
    Ok(pdf_files)
}
