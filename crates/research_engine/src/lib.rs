//! Research engine: collaborator interfaces and the reference RAG pipeline.
mod chunk;
mod collaborator;
mod decode;
mod engine;
mod extract;
mod fetch;
mod index;

pub use chunk::{split_into_chunks, Chunk, ChunkSettings};
pub use collaborator::{Answer, AnswerError, Answerer, IngestError, Ingestor, StatusStream};
pub use decode::{decode_page, DecodedPage};
pub use engine::{RagEngine, NO_ANSWER};
pub use extract::{ExtractedText, Extractor, MainTextExtractor};
pub use fetch::{FetchError, FetchSettings, FetchedPage, Fetcher, ReqwestFetcher};
pub use index::{tokenize, CorpusIndex, IndexSettings, ScoredChunk};
