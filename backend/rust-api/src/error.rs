use thiserror::Error;

/// Failure classes of the submission pipeline. Every variant except
/// `Notification` aborts the request; notification failures are logged and
/// the response still reports success, since the submission and its
/// document are already durably stored by then.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("unknown question \"{0}\"")]
    UnknownQuestion(String),

    #[error("failed to render results document: {0}")]
    Render(anyhow::Error),

    #[error("failed to upload results document: {0}")]
    Upload(anyhow::Error),

    #[error("datastore write failed: {0}")]
    Persistence(anyhow::Error),

    #[error("failed to send results email: {0}")]
    Notification(anyhow::Error),
}

impl SubmitError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SubmitError::Notification(_))
    }
}
