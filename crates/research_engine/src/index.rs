use std::collections::{HashMap, HashSet};

use crate::{Chunk, ChunkSettings};

const STOP_WORDS: &[&str] = &[
    "an", "and", "are", "as", "at", "be", "by", "do", "does", "for", "from", "has", "have", "how",
    "in", "is", "it", "its", "me", "of", "on", "or", "the", "that", "this", "to", "was", "were",
    "what", "when", "where", "which", "who", "why", "with", "you", "your",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSettings {
    pub chunking: ChunkSettings,
    /// Chunks considered when answering.
    pub top_k: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            chunking: ChunkSettings::default(),
            top_k: 3,
        }
    }
}

/// Lowercased ASCII-alphanumeric terms; single letters and stop words dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .filter(|word| word.len() >= 2 || word.chars().all(|c| c.is_ascii_digit()))
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .collect()
}

#[derive(Debug, Clone)]
struct IndexedChunk {
    chunk: Chunk,
    term_counts: HashMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: f64,
}

/// In-memory lexical index over page chunks.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    chunks: Vec<IndexedChunk>,
    doc_freq: HashMap<String, usize>,
}

impl CorpusIndex {
    pub fn build(chunks: Vec<Chunk>) -> Self {
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let chunks = chunks
            .into_iter()
            .map(|chunk| {
                let mut term_counts: HashMap<String, usize> = HashMap::new();
                for term in tokenize(&chunk.text) {
                    *term_counts.entry(term).or_default() += 1;
                }
                for term in term_counts.keys() {
                    *doc_freq.entry(term.clone()).or_default() += 1;
                }
                IndexedChunk { chunk, term_counts }
            })
            .collect();
        Self { chunks, doc_freq }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Top `top_k` chunks sharing at least one term with `query`, best first.
    /// Ties keep ingestion order.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<ScoredChunk<'_>> {
        let terms: HashSet<String> = tokenize(query).into_iter().collect();
        if terms.is_empty() {
            return Vec::new();
        }
        let total = self.chunks.len() as f64;

        let mut scored: Vec<ScoredChunk<'_>> = self
            .chunks
            .iter()
            .filter_map(|indexed| {
                let score: f64 = terms
                    .iter()
                    .filter_map(|term| {
                        let tf = *indexed.term_counts.get(term)? as f64;
                        let df = *self.doc_freq.get(term)? as f64;
                        let idf = (1.0 + total / df).ln();
                        Some(idf * (1.0 + tf.ln()))
                    })
                    .sum();
                (score > 0.0).then_some(ScoredChunk {
                    chunk: &indexed.chunk,
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        scored
    }
}
