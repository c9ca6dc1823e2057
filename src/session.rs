use std::time::Duration;

use crate::client::{PredictionApi, PredictionClient};
use crate::config::TryOnConfig;
use crate::encode::{EncodedImage, ImageInput};
use crate::error::{Result, TryOnError};
use crate::types::{Prediction, PredictionStatus};

/// Poll a prediction's status until it reaches a terminal state.
///
/// Performs at most `max_attempts` status checks, suspending for
/// `interval` between consecutive checks. Returns the prediction once the
/// service reports `succeeded`. A terminal failure from the service aborts
/// immediately with [`TryOnError::PredictionFailed`] — that is the remote
/// computation failing, not a transient fault, so it is never retried.
/// Transport or HTTP errors from the status call propagate as-is and also
/// abort polling. Exhausting the ceiling yields [`TryOnError::Timeout`].
pub async fn poll_until_terminal<A: PredictionApi + ?Sized>(
    api: &A,
    id: &str,
    api_key: &str,
    interval: Duration,
    max_attempts: u32,
) -> Result<Prediction> {
    for attempt in 1..=max_attempts {
        let prediction = api.prediction_status(id, api_key).await?;
        match prediction.status {
            PredictionStatus::Succeeded => return Ok(prediction),
            PredictionStatus::Failed | PredictionStatus::Canceled => {
                return Err(TryOnError::PredictionFailed(
                    prediction
                        .error
                        .unwrap_or_else(|| "the service reported a failed prediction".into()),
                ));
            }
            // Anything else is still in progress, including statuses the
            // service introduces after this client was written.
            _ => {}
        }
        if attempt < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }
    Err(TryOnError::Timeout {
        attempts: max_attempts,
    })
}

/// High-level try-on workflow: select two images, call
/// [`generate`](TryOnSession::generate), observe the outcome.
///
/// Owns the three fields a presentation layer watches: a busy flag that is
/// set while a generation is in flight and cleared exactly once on every
/// exit path, the URL of the last successful result, and the message of the
/// last failure. A failed run never disturbs a previously successful
/// result. Overlapping `generate` calls cannot be expressed — the method
/// takes `&mut self`, so callers are serialized by the borrow checker.
///
/// # Example
/// ```no_run
/// use tryon_rs::{ImageInput, TryOnConfig, TryOnSession};
///
/// # async fn example() -> tryon_rs::Result<()> {
/// let mut session = TryOnSession::new(TryOnConfig::default());
/// session.select_person_image(ImageInput::from_file("person.jpg")?);
/// session.select_garment_image(ImageInput::from_file("garment.jpg")?);
///
/// let url = session.generate("r8_my_api_token").await?;
/// println!("composite image: {}", url);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TryOnSession<A: PredictionApi = PredictionClient> {
    api: A,
    poll_interval: Duration,
    max_poll_attempts: u32,
    person: Option<ImageInput>,
    garment: Option<ImageInput>,
    busy: bool,
    result_image_url: Option<String>,
    last_error: Option<String>,
}

impl TryOnSession<PredictionClient> {
    /// Create a session backed by the HTTP client for the given config.
    pub fn new(config: TryOnConfig) -> Self {
        let poll_interval = config.poll_interval;
        let max_poll_attempts = config.max_poll_attempts;
        Self::with_api(PredictionClient::new(config), poll_interval, max_poll_attempts)
    }
}

impl<A: PredictionApi> TryOnSession<A> {
    /// Create a session over any [`PredictionApi`] implementation.
    pub fn with_api(api: A, poll_interval: Duration, max_poll_attempts: u32) -> Self {
        Self {
            api,
            poll_interval,
            max_poll_attempts,
            person: None,
            garment: None,
            busy: false,
            result_image_url: None,
            last_error: None,
        }
    }

    /// Select the person photo. Replaces any previous selection.
    pub fn select_person_image(&mut self, image: ImageInput) {
        self.person = Some(image);
    }

    /// Select the garment photo. Replaces any previous selection.
    pub fn select_garment_image(&mut self, image: ImageInput) {
        self.garment = Some(image);
    }

    /// Discard both selections.
    pub fn clear_images(&mut self) {
        self.person = None;
        self.garment = None;
    }

    /// Whether a person photo is currently selected.
    pub fn has_person_image(&self) -> bool {
        self.person.is_some()
    }

    /// Whether a garment photo is currently selected.
    pub fn has_garment_image(&self) -> bool {
        self.garment.is_some()
    }

    /// Whether a generation is currently in flight.
    pub fn busy(&self) -> bool {
        self.busy
    }

    /// URL of the most recent successful composite image, if any.
    pub fn result_image_url(&self) -> Option<&str> {
        self.result_image_url.as_deref()
    }

    /// Message of the most recent failure, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Run one full try-on cycle: encode both selected images, create a
    /// prediction, poll it to a terminal state, and return the composite
    /// image URL.
    ///
    /// Preconditions (both images selected, non-empty API key) are checked
    /// before any network traffic; a violation returns
    /// [`TryOnError::InvalidInput`] without touching the busy flag. On
    /// success the observable result is replaced and the last error
    /// cleared; on failure the error message is recorded and any prior
    /// result is left untouched. Starting a new generation abandons
    /// tracking of any previous prediction — the service offers no way to
    /// cancel it remotely.
    pub async fn generate(&mut self, api_key: &str) -> Result<String> {
        let person = match &self.person {
            Some(image) => image.encode(),
            None => return Err(self.invalid_input("no person image selected")),
        };
        let garment = match &self.garment {
            Some(image) => image.encode(),
            None => return Err(self.invalid_input("no garment image selected")),
        };
        if api_key.trim().is_empty() {
            return Err(self.invalid_input("API key is empty"));
        }

        self.busy = true;
        let outcome = run_workflow(
            &self.api,
            &person,
            &garment,
            api_key,
            self.poll_interval,
            self.max_poll_attempts,
        )
        .await;
        self.busy = false;

        match outcome {
            Ok(url) => {
                self.result_image_url = Some(url.clone());
                self.last_error = None;
                Ok(url)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    // Precondition failures surface through `last_error` like every other
    // failure, but never assert the busy flag or touch the network.
    fn invalid_input(&mut self, message: &str) -> TryOnError {
        let err = TryOnError::InvalidInput(message.into());
        self.last_error = Some(err.to_string());
        err
    }
}

async fn run_workflow<A: PredictionApi>(
    api: &A,
    person: &EncodedImage,
    garment: &EncodedImage,
    api_key: &str,
    interval: Duration,
    max_attempts: u32,
) -> Result<String> {
    let prediction = api.create_prediction(person, garment, api_key).await?;
    let done = poll_until_terminal(api, &prediction.id, api_key, interval, max_attempts).await?;
    done.output_url().map(String::from).ok_or_else(|| {
        TryOnError::PredictionFailed("prediction succeeded but returned no output image".into())
    })
}
