use thiserror::Error;

/// Errors returned by try-on operations.
#[derive(Error, Debug)]
pub enum TryOnError {
    /// A required input was missing or empty before any network traffic.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The image could not be read or encoded.
    #[error("failed to encode image: {0}")]
    Encoding(String),

    /// The create-prediction call failed: non-success HTTP response or a
    /// transport-level failure (`status` is `None` for the latter).
    #[error("prediction request failed: {detail}")]
    Request { status: Option<u16>, detail: String },

    /// The status-check call failed, same contract as [`TryOnError::Request`].
    #[error("status check failed: {detail}")]
    StatusCheck { status: Option<u16>, detail: String },

    /// The service reported the prediction as terminally failed.
    #[error("prediction failed: {0}")]
    PredictionFailed(String),

    /// The prediction never reached a terminal state within the attempt ceiling.
    #[error("prediction timed out after {attempts} status checks")]
    Timeout { attempts: u32 },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TryOnError>;
