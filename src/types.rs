use serde::Deserialize;
use serde_json::Value;

/// Status of a remote prediction as reported by the service.
///
/// The client only cares about three classes: terminal success, terminal
/// failure, and everything else (still in progress). Statuses the service
/// adds later land in `Unknown` and are treated as in-progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl PredictionStatus {
    /// Whether the prediction has finished, successfully or not.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// One remote inference request, as returned by the create and status calls.
///
/// The `id` is assigned by the service and is the handle for status polling.
/// `output` is only present once the prediction has succeeded; `error`
/// carries the service's failure description when the prediction failed.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Prediction {
    /// Extract the generated image URL from `output`.
    ///
    /// The service emits either a bare URL string or an array of URLs
    /// depending on the model; for array outputs the first entry is the
    /// composite image.
    pub fn output_url(&self) -> Option<&str> {
        match self.output.as_ref()? {
            Value::String(s) => Some(s.as_str()),
            Value::Array(items) => items.first().and_then(|v| v.as_str()),
            _ => None,
        }
    }
}
