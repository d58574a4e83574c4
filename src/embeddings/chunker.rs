// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Recursive text chunker
//!
//! Splits one input text into bounded, overlapping pieces so that long
//! documents fit a model's sequence limit. Sizes are counted in characters.
//!
//! Each step looks at the next `chunk_size` characters. If the remainder of the
//! text fits, it becomes the last chunk. Otherwise the window is cut at the
//! right-most occurrence of the highest-priority separator that appears in it,
//! or hard-cut at `chunk_size` when no separator does. The next window starts
//! `chunk_overlap` characters before the end of the cut. When that would not
//! move past the previous start, it starts right after the cut instead.
//!
//! A split point is only accepted past the end of the previous cut, so every
//! chunk reaches further into the text than the one before it and no chunk is
//! a tail of its predecessor.

use crate::errors::ServeError;

/// Separators tried in priority order; the empty separator means "hard cut"
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Default window size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between consecutive chunks in characters
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// One chunk of an input text, tagged with the position of its source input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub source_index: usize,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextChunker {
    /// Creates a chunker with the default separators
    ///
    /// # Errors
    /// Returns `InvalidRequest` if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ServeError> {
        if chunk_size == 0 {
            return Err(ServeError::InvalidRequest(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(ServeError::InvalidRequest(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits `text` into trimmed, non-empty chunks in reading order
    ///
    /// An empty (or whitespace-only) text yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        // Byte offset of every char start, plus the end of the text
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        let total_chars = bounds.len() - 1;

        let mut chunks = Vec::new();
        let mut position = 0;
        // End of the previous cut, separator included
        let mut consumed = 0;

        while position < total_chars {
            let window_end = position + self.chunk_size;
            let fresh_start = bounds[consumed.max(position)];

            if window_end >= total_chars {
                if !text[fresh_start..].trim().is_empty() {
                    push_trimmed(&mut chunks, &text[bounds[position]..]);
                }
                break;
            }

            let window_start_byte = bounds[position];
            let window = &text[window_start_byte..bounds[window_end]];

            let (split, resume) = match self.find_split(window, fresh_start - window_start_byte) {
                Some((offset, separator)) => {
                    let split = char_index(&bounds, window_start_byte + offset);
                    (split, split + separator.chars().count())
                }
                None => (window_end, window_end),
            };

            if !text[fresh_start..bounds[split]].trim().is_empty() {
                push_trimmed(&mut chunks, &text[window_start_byte..bounds[split]]);
            }
            consumed = resume;

            let overlapped = resume.saturating_sub(self.chunk_overlap);
            position = if overlapped <= position { resume } else { overlapped };
        }

        chunks
    }

    /// Chunks every input in order and flattens the result
    pub fn chunk_all(&self, inputs: &[String]) -> Vec<Chunk> {
        inputs
            .iter()
            .enumerate()
            .flat_map(|(source_index, text)| {
                self.chunk(text)
                    .into_iter()
                    .map(move |text| Chunk { source_index, text })
            })
            .collect()
    }

    /// Finds the right-most occurrence of the first separator present in the
    /// window after byte offset `floor`. A match at the very start of the window
    /// is never a split point.
    fn find_split<'a>(&'a self, window: &str, floor: usize) -> Option<(usize, &'a str)> {
        self.separators
            .iter()
            .filter(|separator| !separator.is_empty())
            .find_map(|separator| {
                window
                    .rfind(separator.as_str())
                    .filter(|&offset| offset > floor)
                    .map(|offset| (offset, separator.as_str()))
            })
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn push_trimmed(chunks: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        chunks.push(piece.to_string());
    }
}

fn char_index(bounds: &[usize], byte_offset: usize) -> usize {
    bounds
        .binary_search(&byte_offset)
        .unwrap_or_else(|insert_at| insert_at)
}
