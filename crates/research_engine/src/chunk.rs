/// A slice of page text tagged with the URL it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    /// Position of the chunk within its source.
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSettings {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Characters repeated at the start of the following chunk.
    pub chunk_overlap: usize,
}

impl Default for ChunkSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Split text into overlapping chunks, preferring to cut after a sentence end.
pub fn split_into_chunks(text: &str, source: &str, settings: ChunkSettings) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let size = settings.chunk_size.max(1);
    let overlap = settings.chunk_overlap.min(size - 1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < total {
        let end = (start + size).min(total);
        let taken = if end < total {
            sentence_cut(&chars[start..end])
        } else {
            end - start
        };

        let piece: String = chars[start..start + taken].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(Chunk {
                text: piece.to_string(),
                source: source.to_string(),
                index: chunks.len(),
            });
        }

        if start + taken >= total {
            break;
        }
        start += taken.saturating_sub(overlap).max(1);
    }

    chunks
}

/// Number of chars to keep from `window`: up to the last sentence end in its
/// final fifth, or the whole window when there is none.
fn sentence_cut(window: &[char]) -> usize {
    let len = window.len();
    let search_start = len * 4 / 5;
    (search_start..len.saturating_sub(1))
        .rev()
        .find(|&i| matches!(window[i], '.' | '!' | '?') && window[i + 1].is_whitespace())
        .map(|i| i + 2)
        .unwrap_or(len)
}
