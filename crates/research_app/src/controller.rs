use std::collections::VecDeque;
use std::sync::Arc;

use futures_util::StreamExt;
use research_core::{update, AppState, Effect, Msg, QueryFailure};
use research_engine::{Answer, AnswerError, Answerer, Ingestor};
use research_logging::{research_debug, research_info, research_warn};

/// Runs messages through the core state machine and executes the resulting
/// effects against the collaborators, one interaction at a time.
pub struct WorkflowController {
    ingestor: Arc<dyn Ingestor>,
    answerer: Arc<dyn Answerer>,
}

impl WorkflowController {
    pub fn new(ingestor: Arc<dyn Ingestor>, answerer: Arc<dyn Answerer>) -> Self {
        Self { ingestor, answerer }
    }

    pub async fn dispatch_all(&self, mut state: AppState, msgs: Vec<Msg>) -> AppState {
        for msg in msgs {
            state = self.dispatch(state, msg).await;
        }
        state
    }

    /// Applies `msg` and every follow-up message its effects produce.
    pub async fn dispatch(&self, mut state: AppState, msg: Msg) -> AppState {
        let mut inbox = VecDeque::from([msg]);
        while let Some(msg) = inbox.pop_front() {
            research_debug!("dispatch {:?}", msg);
            let (next, effects) = update(state, msg);
            state = next;
            for effect in effects {
                let (next, outcome) = self.execute(state, effect).await;
                state = next;
                inbox.push_back(outcome);
            }
        }
        state
    }

    async fn execute(&self, state: AppState, effect: Effect) -> (AppState, Msg) {
        match effect {
            Effect::ProcessUrls { urls } => self.ingest(state, urls).await,
            Effect::GenerateAnswer { question } => (state, self.answer(&question).await),
        }
    }

    async fn ingest(&self, mut state: AppState, urls: Vec<String>) -> (AppState, Msg) {
        research_info!("Processing {} url(s): {:?}", urls.len(), urls);
        let mut statuses = self.ingestor.process_urls(urls);
        while let Some(item) = statuses.next().await {
            match item {
                Ok(status) => {
                    research_info!("Ingestion: {}", status);
                    // Each status is shown before the next one is polled.
                    let (next, _) = update(state, Msg::IngestionStatus(status));
                    state = next;
                }
                Err(err) => {
                    research_warn!("Ingestion failed: {}", err);
                    return (state, Msg::IngestionFailed(err.to_string()));
                }
            }
        }
        research_info!("Ingestion finished");
        (state, Msg::IngestionSucceeded)
    }

    async fn answer(&self, question: &str) -> Msg {
        research_info!("Answering {:?}", question);
        match self.answerer.generate_answer(question).await {
            Ok(Answer { answer, sources }) => Msg::AnswerReceived { answer, sources },
            Err(AnswerError::NotProcessed) => {
                research_warn!("Question asked before any ingestion");
                Msg::AnswerFailed(QueryFailure::NotProcessed)
            }
            Err(AnswerError::Failed(message)) => {
                research_warn!("Answer generation failed: {}", message);
                Msg::AnswerFailed(QueryFailure::Failed(message))
            }
        }
    }
}
