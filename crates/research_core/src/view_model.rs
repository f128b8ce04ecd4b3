use crate::{Notice, QueryGate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetOptionView {
    pub label: String,
    pub url: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerView {
    pub question: String,
    pub answer: String,
    pub citations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub presets: Vec<PresetOptionView>,
    pub custom_urls: Vec<String>,
    pub status_lines: Vec<String>,
    pub notice: Option<Notice>,
    pub query_gate: QueryGate,
    pub question: String,
    pub answer: Option<AnswerView>,
}

/// One citation per non-blank line of the collaborator's source string.
pub fn split_citations(sources: &str) -> Vec<String> {
    sources
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
