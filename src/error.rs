use thiserror::Error;

/// Rejected form input. The display text is what the user is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please add a task!")]
    MissingTitle,
    #[error("Please select a category!")]
    MissingCategory,
    #[error("Please select a date in the future")]
    PastDeadline,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stored tasks under `{key}` are unreadable: {source}")]
    CorruptState {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize tasks: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("storage i/o failed for `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
