#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User changed the predefined-URL selection (labels, in order).
    PresetsSelected(Vec<String>),
    /// User edited one of the custom URL fields.
    CustomUrlEdited { slot: usize, text: String },
    /// User clicked "Process URLs".
    ProcessClicked,
    /// Ingestion collaborator produced a status line.
    IngestionStatus(String),
    /// Ingestion stream was driven to exhaustion without error.
    IngestionSucceeded,
    /// Ingestion stream reported an error.
    IngestionFailed(String),
    /// User submitted the question field.
    QuestionSubmitted(String),
    /// Answer collaborator returned.
    AnswerReceived { answer: String, sources: String },
    /// Answer collaborator failed.
    AnswerFailed(QueryFailure),
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFailure {
    NotProcessed,
    Failed(String),
}
