//! Text chunking for embedding
//!
//! Character windows with overlap, preferring to break at paragraph,
//! sentence, line, or word boundaries near the end of each window.

/// Chunking defaults, matching the corpus splitter settings.
pub const CHUNK_SIZE_CHARS: usize = 512;
pub const CHUNK_OVERLAP_CHARS: usize = 50;

/// One chunk of a document, with its byte offset into the source text.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,
    pub position: usize,
}

/// Find a valid char boundary at or before the given byte index
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Find a valid char boundary at or after the given byte index
fn ceil_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Split content into overlapping character windows.
///
/// Content no larger than one window yields exactly one chunk.
pub fn chunk_by_chars(content: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    if content.len() <= chunk_size {
        return vec![Chunk {
            text: content.to_string(),
            position: 0,
        }];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < content.len() {
        let raw_end = (start + chunk_size).min(content.len());
        let end = floor_char_boundary(content, raw_end);
        let mut chunk_end = end;

        // Look for a natural break in the last 30% of the window
        if end < content.len() {
            let search_start = ceil_char_boundary(content, start + (chunk_size * 70 / 100));

            if search_start < end {
                let search_region = &content[search_start..end];

                if let Some(pos) = search_region.rfind("\n\n") {
                    chunk_end = search_start + pos + 2;
                } else if let Some(pos) = search_region.rfind(". ") {
                    chunk_end = search_start + pos + 2;
                } else if let Some(pos) = search_region.rfind('\n') {
                    chunk_end = search_start + pos + 1;
                } else if let Some(pos) = search_region.rfind(' ') {
                    chunk_end = search_start + pos + 1;
                }
            }
        }

        chunk_end = floor_char_boundary(content, chunk_end);

        chunks.push(Chunk {
            text: content[start..chunk_end].to_string(),
            position: start,
        });

        if chunk_end >= content.len() {
            break;
        }

        start = ceil_char_boundary(content, chunk_end.saturating_sub(overlap));
    }

    chunks
}
