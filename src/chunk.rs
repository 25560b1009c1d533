//! Sentence-aware overlapping text chunker.
//!
//! Splits the corpus into bounded-length segments sized for model input
//! limits. Cuts prefer the nearest preceding `.` inside the window so
//! sentences are not severed; adjacent chunks share exactly `overlap`
//! characters of text. Pure function of its input, fully materialized.
//!
//! Boundaries are computed in characters, never bytes, so multi-byte
//! text cannot be split mid-character.

/// Split `text` into chunks of at most `size` characters with `overlap`
/// characters shared between neighbors.
///
/// `overlap` must be strictly less than `size`; the configuration layer
/// enforces this, and it is what guarantees forward progress. An empty
/// input produces no chunks.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(size > 0 && overlap < size);

    if text.is_empty() {
        return Vec::new();
    }

    let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let char_count = offsets.len();
    let byte_at = |c: usize| {
        if c == char_count {
            text.len()
        } else {
            offsets[c]
        }
    };

    if char_count <= size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;
    loop {
        let window_end = (start + size).min(char_count);
        let mut cut = window_end;

        if window_end < char_count {
            // Prefer the last '.' in the window, but only where the cut
            // still lands beyond the overlap region.
            let window = &text[byte_at(start)..byte_at(window_end)];
            if let Some(dot) = window.rfind('.') {
                let cut_chars = window[..=dot].chars().count();
                if cut_chars > overlap {
                    cut = start + cut_chars;
                }
            }
        }

        chunks.push(text[byte_at(start)..byte_at(cut)].to_string());
        if cut == char_count {
            break;
        }
        start = cut - overlap;
    }

    chunks
}
