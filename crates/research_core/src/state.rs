use crate::view_model::{split_citations, AnswerView, AppViewModel, PresetOptionView};
use crate::{PresetCatalog, UrlBatch, CUSTOM_URL_SLOTS};

/// Per-session record of the last successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkflowState {
    /// True only once an ingestion run completed without error.
    pub urls_processed: bool,
    /// Custom URLs of the last successful ingestion.
    pub last_urls: Vec<String>,
    /// Preset labels of the last successful ingestion.
    pub selected_predefined_urls: Vec<String>,
}

/// Whether the question input accepts submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryGate {
    #[default]
    Disabled,
    Enabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub question: String,
    pub answer: String,
    pub sources: String,
}

/// Session context: workflow flags, form fields and the display regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    catalog: PresetCatalog,
    workflow: WorkflowState,
    selected_presets: Vec<String>,
    custom_urls: Vec<String>,
    pending: Option<UrlBatch>,
    status_lines: Vec<String>,
    notice: Option<Notice>,
    question: String,
    answer: Option<AnswerResult>,
}

impl AppState {
    pub fn new(catalog: PresetCatalog) -> Self {
        Self {
            catalog,
            workflow: WorkflowState::default(),
            selected_presets: Vec::new(),
            custom_urls: vec![String::new(); CUSTOM_URL_SLOTS],
            pending: None,
            status_lines: Vec::new(),
            notice: None,
            question: String::new(),
            answer: None,
        }
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    pub fn workflow(&self) -> &WorkflowState {
        &self.workflow
    }

    /// Enabled once any ingestion in this session has succeeded; never reverts.
    pub fn query_gate(&self) -> QueryGate {
        if self.workflow.urls_processed {
            QueryGate::Enabled
        } else {
            QueryGate::Disabled
        }
    }

    pub fn is_ingesting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn view(&self) -> AppViewModel {
        let presets = self
            .catalog
            .presets()
            .iter()
            .map(|preset| PresetOptionView {
                label: preset.label.clone(),
                url: preset.url.clone(),
                selected: self.selected_presets.contains(&preset.label),
            })
            .collect();

        let answer = self.answer.as_ref().map(|result| AnswerView {
            question: result.question.clone(),
            answer: result.answer.clone(),
            citations: split_citations(&result.sources),
        });

        AppViewModel {
            presets,
            custom_urls: self.custom_urls.clone(),
            status_lines: self.status_lines.clone(),
            notice: self.notice.clone(),
            query_gate: self.query_gate(),
            question: self.question.clone(),
            answer,
        }
    }

    pub(crate) fn selected_presets(&self) -> &[String] {
        &self.selected_presets
    }

    pub(crate) fn custom_urls(&self) -> &[String] {
        &self.custom_urls
    }

    pub(crate) fn select_presets(&mut self, labels: Vec<String>) {
        let mut unique: Vec<String> = Vec::with_capacity(labels.len());
        for label in labels {
            if !unique.contains(&label) {
                unique.push(label);
            }
        }
        self.selected_presets = unique;
    }

    pub(crate) fn set_custom_url(&mut self, slot: usize, text: String) -> bool {
        match self.custom_urls.get_mut(slot) {
            Some(field) => {
                *field = text;
                true
            }
            None => false,
        }
    }

    pub(crate) fn begin_ingestion(&mut self, batch: UrlBatch) {
        self.status_lines.clear();
        self.notice = None;
        self.pending = Some(batch);
    }

    pub(crate) fn clear_display(&mut self) {
        self.status_lines.clear();
        self.notice = None;
    }

    pub(crate) fn push_status(&mut self, status: String) -> bool {
        if self.pending.is_none() {
            return false;
        }
        self.status_lines.push(status);
        true
    }

    /// Commits the pending batch into the workflow record and re-fills the fields.
    pub(crate) fn complete_ingestion(&mut self) -> bool {
        let Some(batch) = self.pending.take() else {
            return false;
        };
        self.workflow.urls_processed = true;
        self.workflow.last_urls = batch.custom.clone();
        self.workflow.selected_predefined_urls = batch.labels();

        let mut fields = batch.custom;
        fields.resize(CUSTOM_URL_SLOTS.max(fields.len()), String::new());
        self.custom_urls = fields;
        self.selected_presets = self.workflow.selected_predefined_urls.clone();
        true
    }

    pub(crate) fn fail_ingestion(&mut self, notice: Notice) -> bool {
        if self.pending.take().is_none() {
            return false;
        }
        self.notice = Some(notice);
        true
    }

    pub(crate) fn set_question(&mut self, question: String) {
        self.question = question;
    }

    pub(crate) fn set_answer(&mut self, answer: String, sources: String) {
        self.answer = Some(AnswerResult {
            question: self.question.trim().to_string(),
            answer,
            sources,
        });
    }

    pub(crate) fn clear_answer(&mut self) {
        self.answer = None;
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(PresetCatalog::default())
    }
}
