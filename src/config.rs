use std::time::Duration;

use serde_json::{Map, Value};

/// Default prediction API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.replicate.com/v1";

/// Wire schema for one try-on model deployment.
///
/// The hosted service pins a model by an opaque version hash and names its
/// input fields per model, so the schema is configuration injected into the
/// client rather than anything the client decides. The default targets the
/// IDM-VTON deployment (`human_img` / `garm_img`).
#[derive(Debug, Clone)]
pub struct ModelSchema {
    /// Opaque model version hash understood by the service.
    pub version: String,
    /// Input field name carrying the person photo.
    pub person_field: String,
    /// Input field name carrying the garment photo.
    pub garment_field: String,
    /// Additional fixed input fields sent verbatim with every request.
    pub extra: Map<String, Value>,
}

impl ModelSchema {
    /// Define a schema for a specific model deployment.
    pub fn new(
        version: impl Into<String>,
        person_field: impl Into<String>,
        garment_field: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            person_field: person_field.into(),
            garment_field: garment_field.into(),
            extra: Map::new(),
        }
    }

    /// Add a fixed extra input field (e.g. a garment description).
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl Default for ModelSchema {
    fn default() -> Self {
        Self::new(
            "c871bb9b046607b680449ecbae55fd8c6d945e0a1948644bf2361b3d021d3ff4",
            "human_img",
            "garm_img",
        )
        .with_extra("garment_des", Value::String("clothing item".into()))
    }
}

/// How encoded images are placed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadForm {
    /// Full `data:image/<subtype>;base64,` URI (what the service documents).
    #[default]
    DataUri,
    /// Bare base64 payload with no prefix.
    Bare,
}

/// Optional pass-through relay for deployments where the service cannot be
/// reached directly (e.g. a browser-style CORS intermediary).
///
/// The relay receives the target URL as a `url` query parameter. Direct and
/// relayed transport are interchangeable; nothing else in the request
/// changes.
#[derive(Debug, Clone)]
pub struct Relay {
    /// Relay endpoint, e.g. `https://api.allorigins.win/raw`.
    pub base: String,
    /// Value for an `Origin` header override, when the relay requires one.
    pub origin: Option<String>,
}

impl Relay {
    /// Relay through the given pass-through endpoint.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            origin: None,
        }
    }

    /// Send an `Origin` header with relayed requests.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// Configuration for the try-on client and session.
///
/// Use [`TryOnConfig::builder()`] for ergonomic construction, or
/// [`TryOnConfig::default()`] for the stock deployment (direct transport,
/// IDM-VTON schema, 5-second polling with a 60-attempt ceiling).
#[derive(Debug, Clone)]
pub struct TryOnConfig {
    /// Base URL of the prediction API.
    pub endpoint: String,
    /// Wire schema of the target model deployment.
    pub schema: ModelSchema,
    /// Optional relay transport. `None` = direct.
    pub relay: Option<Relay>,
    /// Form in which encoded images are transmitted.
    pub payload_form: PayloadForm,
    /// Delay between consecutive status checks.
    pub poll_interval: Duration,
    /// Maximum number of status checks before giving up.
    pub max_poll_attempts: u32,
}

impl Default for TryOnConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            schema: ModelSchema::default(),
            relay: None,
            payload_form: PayloadForm::default(),
            poll_interval: Duration::from_secs(5),
            max_poll_attempts: 60,
        }
    }
}

impl TryOnConfig {
    /// Start building a config with the builder pattern.
    pub fn builder() -> TryOnConfigBuilder {
        TryOnConfigBuilder::default()
    }
}

/// Builder for [`TryOnConfig`].
#[derive(Default)]
pub struct TryOnConfigBuilder {
    config: TryOnConfig,
}

impl TryOnConfigBuilder {
    /// Set the base API endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Set the model wire schema.
    pub fn with_schema(mut self, schema: ModelSchema) -> Self {
        self.config.schema = schema;
        self
    }

    /// Route all calls through a pass-through relay.
    pub fn with_relay(mut self, relay: Relay) -> Self {
        self.config.relay = Some(relay);
        self
    }

    /// Set how image payloads are transmitted.
    pub fn with_payload_form(mut self, form: PayloadForm) -> Self {
        self.config.payload_form = form;
        self
    }

    /// Set the delay between status checks.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the maximum number of status checks.
    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.config.max_poll_attempts = attempts;
        self
    }

    /// Build the final [`TryOnConfig`].
    pub fn build(self) -> TryOnConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TryOnConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.max_poll_attempts, 60);
        assert!(config.relay.is_none());
        assert_eq!(config.payload_form, PayloadForm::DataUri);
    }

    #[test]
    fn test_default_schema_targets_idm_vton() {
        let schema = ModelSchema::default();
        assert_eq!(schema.person_field, "human_img");
        assert_eq!(schema.garment_field, "garm_img");
        assert_eq!(
            schema.extra.get("garment_des").and_then(|v| v.as_str()),
            Some("clothing item")
        );
    }

    #[test]
    fn test_builder() {
        let config = TryOnConfig::builder()
            .with_endpoint("https://proxy.internal/v1")
            .with_schema(
                ModelSchema::new("deadbeef", "person", "cloth")
                    .with_extra("category", Value::String("upper_body".into())),
            )
            .with_relay(Relay::new("https://relay.example/raw").with_origin("https://app.example"))
            .with_payload_form(PayloadForm::Bare)
            .with_poll_interval(Duration::from_secs(2))
            .with_max_poll_attempts(10)
            .build();

        assert_eq!(config.endpoint, "https://proxy.internal/v1");
        assert_eq!(config.schema.version, "deadbeef");
        assert_eq!(config.schema.person_field, "person");
        let relay = config.relay.unwrap();
        assert_eq!(relay.origin.as_deref(), Some("https://app.example"));
        assert_eq!(config.max_poll_attempts, 10);
    }
}
