use std::sync::{Arc, PoisonError, RwLock};

use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use research_logging::{research_debug, research_info, research_warn};

use crate::{
    decode_page, split_into_chunks, Answer, AnswerError, Answerer, CorpusIndex, ExtractedText,
    Extractor, FetchError, FetchSettings, Fetcher, IndexSettings, IngestError, Ingestor,
    MainTextExtractor, ReqwestFetcher, StatusStream,
};

/// Answer given when no indexed chunk shares a term with the question.
pub const NO_ANSWER: &str = "I could not find an answer in the processed pages.";

/// Reference collaborator: fetches pages, indexes their text and answers
/// questions with the best-matching passage.
#[derive(Clone)]
pub struct RagEngine {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    settings: IndexSettings,
    index: Arc<RwLock<Option<CorpusIndex>>>,
}

impl RagEngine {
    pub fn new(fetch: FetchSettings, settings: IndexSettings) -> Result<Self, FetchError> {
        Ok(Self::with_components(
            Arc::new(ReqwestFetcher::new(fetch)?),
            Arc::new(MainTextExtractor),
            settings,
        ))
    }

    pub fn with_components(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        settings: IndexSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            settings,
            index: Arc::new(RwLock::new(None)),
        }
    }

    /// An engine sharing this one's fetcher and extractor over its own,
    /// still empty, corpus.
    pub fn with_fresh_corpus(&self) -> Self {
        Self::with_components(self.fetcher.clone(), self.extractor.clone(), self.settings)
    }

    /// Number of chunks in the current index, `None` before the first run.
    pub fn indexed_chunks(&self) -> Option<usize> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(CorpusIndex::len)
    }
}

impl Ingestor for RagEngine {
    fn process_urls(&self, urls: Vec<String>) -> StatusStream {
        ingest(self.clone(), urls).boxed()
    }
}

fn ingest(engine: RagEngine, urls: Vec<String>) -> impl Stream<Item = Result<String, IngestError>> {
    try_stream! {
        yield "Initializing components...".to_string();

        let mut pages: Vec<(String, ExtractedText)> = Vec::with_capacity(urls.len());
        for url in urls {
            yield format!("Loading data from {url}...");
            let (fetched, page) =
                load_page(engine.fetcher.as_ref(), engine.extractor.as_ref(), &url).await?;
            yield fetched;
            pages.push((url, page));
        }

        yield "Splitting text into chunks...".to_string();
        let chunks: Vec<_> = pages
            .iter()
            .flat_map(|(url, page)| split_into_chunks(&page.text, url, engine.settings.chunking))
            .collect();

        yield format!("Adding {} chunks to the index...", chunks.len());
        let index = CorpusIndex::build(chunks);
        research_info!("Indexed {} chunks from {} page(s)", index.len(), pages.len());

        // Every page loaded; only now does the previous corpus go away.
        yield "Resetting document index...".to_string();
        *engine.index.write().unwrap_or_else(PoisonError::into_inner) = Some(index);

        yield "Done adding documents to the index.".to_string();
    }
}

/// Fetches, decodes and extracts one page. Also returns the fetch report.
async fn load_page(
    fetcher: &dyn Fetcher,
    extractor: &dyn Extractor,
    url: &str,
) -> Result<(String, ExtractedText), IngestError> {
    let fetched = fetcher
        .fetch(url)
        .await
        .map_err(|err| IngestError::new(format!("{url}: {err}")))?;

    let decoded = decode_page(&fetched.body, fetched.content_type.as_deref());
    if decoded.lossy {
        research_warn!(
            "Page {} had malformed {} bytes; replaced",
            fetched.url,
            decoded.encoding_label
        );
    }

    let page = extractor.extract(&decoded.html);
    if page.text.is_empty() {
        return Err(IngestError::new(format!("{url}: page has no readable text")));
    }
    research_debug!(
        "Loaded {} (title {:?}, {} chars)",
        fetched.url,
        page.title,
        page.text.len()
    );
    Ok((fetched.summary(), page))
}

#[async_trait::async_trait]
impl Answerer for RagEngine {
    async fn generate_answer(&self, question: &str) -> Result<Answer, AnswerError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AnswerError::Failed("question is empty".to_string()));
        }

        let guard = self.index.read().unwrap_or_else(PoisonError::into_inner);
        let index = guard.as_ref().ok_or(AnswerError::NotProcessed)?;
        let hits = index.search(question, self.settings.top_k.max(1));

        let Some(best) = hits.first() else {
            research_debug!("No indexed chunk matched {:?}", question);
            return Ok(Answer {
                answer: NO_ANSWER.to_string(),
                sources: String::new(),
            });
        };

        let mut sources: Vec<&str> = Vec::with_capacity(hits.len());
        for hit in &hits {
            if !sources.contains(&hit.chunk.source.as_str()) {
                sources.push(&hit.chunk.source);
            }
        }

        Ok(Answer {
            answer: best.chunk.text.clone(),
            sources: sources.join("\n"),
        })
    }
}
