#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the ingestion collaborator over a validated, non-empty batch.
    ProcessUrls { urls: Vec<String> },
    /// Ask the answer collaborator a trimmed, non-empty question.
    GenerateAnswer { question: String },
}
