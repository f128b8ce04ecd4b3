//! Research core: pure URL-intake and query workflow state machine.
mod catalog;
mod effect;
mod intake;
mod msg;
mod state;
mod update;
mod view_model;

pub use catalog::{Preset, PresetCatalog};
pub use effect::Effect;
pub use intake::{collect_urls, is_well_formed, validate, IntakeError, UrlBatch, CUSTOM_URL_SLOTS};
pub use msg::{Msg, QueryFailure};
pub use state::{AnswerResult, AppState, Notice, QueryGate, Severity, WorkflowState};
pub use update::{update, NOT_PROCESSED_MESSAGE};
pub use view_model::{split_citations, AnswerView, AppViewModel, PresetOptionView};
