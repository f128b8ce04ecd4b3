use crate::intake::{collect_urls, validate};
use crate::{AppState, Effect, Msg, Notice, QueryFailure, QueryGate};

/// Shown when a question arrives before any successful ingestion.
pub const NOT_PROCESSED_MESSAGE: &str = "You must process urls first";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PresetsSelected(labels) => {
            state.select_presets(labels);
            Vec::new()
        }
        Msg::CustomUrlEdited { slot, text } => {
            state.set_custom_url(slot, text);
            Vec::new()
        }
        Msg::ProcessClicked => {
            let batch = collect_urls(state.catalog(), state.selected_presets(), state.custom_urls());
            match validate(&batch) {
                Ok(()) => {
                    let urls = batch.urls();
                    state.begin_ingestion(batch);
                    vec![Effect::ProcessUrls { urls }]
                }
                Err(err) => {
                    state.clear_display();
                    state.set_notice(Notice::error(err.to_string()));
                    Vec::new()
                }
            }
        }
        Msg::IngestionStatus(status) => {
            state.push_status(status);
            Vec::new()
        }
        Msg::IngestionSucceeded => {
            if state.complete_ingestion() {
                let count = state.workflow().selected_predefined_urls.len()
                    + state.workflow().last_urls.len();
                state.set_notice(Notice::info(format!(
                    "Processed {count} URL(s). You can now ask questions."
                )));
            }
            Vec::new()
        }
        Msg::IngestionFailed(message) => {
            // Workflow flags stay as they were, including an earlier success.
            state.fail_ingestion(Notice::error(format!("Failed to process URLs: {message}")));
            Vec::new()
        }
        Msg::QuestionSubmitted(raw) => {
            let question = raw.trim().to_string();
            state.set_question(raw);
            if question.is_empty() {
                Vec::new()
            } else if state.query_gate() == QueryGate::Disabled {
                state.set_notice(Notice::error(NOT_PROCESSED_MESSAGE));
                Vec::new()
            } else {
                state.clear_display();
                vec![Effect::GenerateAnswer { question }]
            }
        }
        Msg::AnswerReceived { answer, sources } => {
            state.set_answer(answer, sources);
            Vec::new()
        }
        Msg::AnswerFailed(failure) => {
            state.clear_answer();
            let text = match failure {
                QueryFailure::NotProcessed => NOT_PROCESSED_MESSAGE.to_string(),
                QueryFailure::Failed(message) => format!("Failed to generate answer: {message}"),
            };
            state.set_notice(Notice::error(text));
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
