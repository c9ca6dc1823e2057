use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;

use crate::config::{PayloadForm, TryOnConfig};
use crate::encode::EncodedImage;
use crate::error::{Result, TryOnError};
use crate::types::Prediction;

/// The remote prediction API, reduced to the two calls the workflow needs.
///
/// [`PredictionClient`] is the HTTP implementation; tests substitute stubs.
#[async_trait]
pub trait PredictionApi {
    /// Submit a try-on job. Returns the service-assigned prediction.
    async fn create_prediction(
        &self,
        person: &EncodedImage,
        garment: &EncodedImage,
        api_key: &str,
    ) -> Result<Prediction>;

    /// Fetch the current state of a prediction by id.
    async fn prediction_status(&self, id: &str, api_key: &str) -> Result<Prediction>;
}

/// HTTP client for the hosted try-on service.
///
/// Owns the wire format: the pinned model version, the named input fields,
/// and whether calls go direct or through a pass-through relay — all taken
/// from [`TryOnConfig`], none of it hardcoded here.
///
/// # Example
/// ```no_run
/// use tryon_rs::{PredictionClient, TryOnConfig};
///
/// let client = PredictionClient::new(TryOnConfig::default());
/// ```
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: Client,
    config: TryOnConfig,
}

impl PredictionClient {
    /// Create a client for the given deployment configuration.
    pub fn new(config: TryOnConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Use a custom `reqwest::Client` (for connection pooling, timeouts, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// The deployment configuration this client was built with.
    pub fn config(&self) -> &TryOnConfig {
        &self.config
    }

    fn build_url(&self, path: &str) -> std::result::Result<reqwest::Url, String> {
        let target = format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path);
        match &self.config.relay {
            // The relay takes the real target as a query parameter.
            Some(relay) => {
                reqwest::Url::parse_with_params(&relay.base, &[("url", target.as_str())])
                    .map_err(|e| format!("bad relay URL: {}", e))
            }
            None => reqwest::Url::parse(&target).map_err(|e| format!("bad endpoint URL: {}", e)),
        }
    }

    fn payload(&self, image: &EncodedImage) -> String {
        match self.config.payload_form {
            PayloadForm::DataUri => image.to_data_uri(),
            PayloadForm::Bare => image.as_base64().to_string(),
        }
    }

    fn request_body(&self, person: &EncodedImage, garment: &EncodedImage) -> Value {
        let schema = &self.config.schema;
        let mut input = schema.extra.clone();
        input.insert(
            schema.person_field.clone(),
            Value::String(self.payload(person)),
        );
        input.insert(
            schema.garment_field.clone(),
            Value::String(self.payload(garment)),
        );
        serde_json::json!({
            "version": schema.version,
            "input": input,
        })
    }
}

/// Pull the service's `detail` field out of an error body, falling back to
/// a generic message when the body is not JSON or has no such field.
fn error_detail(body: &str, fallback: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or_else(|| fallback.to_string())
}

#[async_trait]
impl PredictionApi for PredictionClient {
    async fn create_prediction(
        &self,
        person: &EncodedImage,
        garment: &EncodedImage,
        api_key: &str,
    ) -> Result<Prediction> {
        let url = self
            .build_url("predictions")
            .map_err(|detail| TryOnError::Request {
                status: None,
                detail,
            })?;
        let body = self.request_body(person, garment);
        let schema = &self.config.schema;
        debug!(
            "creating prediction: endpoint={} version={} input_fields=[{}, {}]",
            self.config.endpoint, schema.version, schema.person_field, schema.garment_field
        );

        let mut req = self
            .http
            .post(url)
            .timeout(Duration::from_secs(30))
            .header("Authorization", format!("Token {}", api_key))
            .json(&body);
        if let Some(origin) = self.config.relay.as_ref().and_then(|r| r.origin.as_ref()) {
            req = req.header("Origin", origin);
        }

        let resp = req.send().await.map_err(|e| TryOnError::Request {
            status: None,
            detail: format!("cannot reach the try-on service: {}", e),
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(TryOnError::Request {
                status: Some(status),
                detail: error_detail(&body_text, "failed to start prediction"),
            });
        }

        resp.json::<Prediction>()
            .await
            .map_err(|e| TryOnError::Request {
                status: None,
                detail: format!("failed to parse prediction response: {}", e),
            })
    }

    async fn prediction_status(&self, id: &str, api_key: &str) -> Result<Prediction> {
        let url = self
            .build_url(&format!("predictions/{}", id))
            .map_err(|detail| TryOnError::StatusCheck {
                status: None,
                detail,
            })?;
        debug!("checking prediction status: id={}", id);

        let mut req = self
            .http
            .get(url)
            .timeout(Duration::from_secs(10))
            .header("Authorization", format!("Token {}", api_key));
        if let Some(origin) = self.config.relay.as_ref().and_then(|r| r.origin.as_ref()) {
            req = req.header("Origin", origin);
        }

        let resp = req.send().await.map_err(|e| TryOnError::StatusCheck {
            status: None,
            detail: format!("cannot reach the try-on service: {}", e),
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(TryOnError::StatusCheck {
                status: Some(status),
                detail: error_detail(&body_text, "failed to check prediction status"),
            });
        }

        resp.json::<Prediction>()
            .await
            .map_err(|e| TryOnError::StatusCheck {
                status: None,
                detail: format!("failed to parse status response: {}", e),
            })
    }
}
