use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report")]
    Json(#[from] serde_json::Error),
}
