use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tryon_rs::*;

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_ATTEMPTS: u32 = 60;

/// One scripted response from the stub service's status endpoint.
enum Step {
    Status(&'static str, Option<&'static str>),
    TransportError,
}

/// Scripted stand-in for the remote prediction service.
///
/// `create_prediction` always hands back a fresh `starting` prediction;
/// each `prediction_status` call pops the next scripted step. An empty
/// script reports `processing` forever.
#[derive(Clone)]
struct StubApi {
    inner: Arc<StubInner>,
}

struct StubInner {
    steps: Mutex<VecDeque<Step>>,
    create_calls: AtomicU32,
    status_calls: AtomicU32,
}

impl StubApi {
    fn with_steps(steps: Vec<Step>) -> Self {
        Self {
            inner: Arc::new(StubInner {
                steps: Mutex::new(steps.into()),
                create_calls: AtomicU32::new(0),
                status_calls: AtomicU32::new(0),
            }),
        }
    }

    fn never_terminal() -> Self {
        Self::with_steps(Vec::new())
    }

    fn create_calls(&self) -> u32 {
        self.inner.create_calls.load(Ordering::SeqCst)
    }

    fn status_calls(&self) -> u32 {
        self.inner.status_calls.load(Ordering::SeqCst)
    }
}

fn prediction(status: &str, output: Option<&str>) -> Prediction {
    serde_json::from_value(serde_json::json!({
        "id": "pred-1",
        "status": status,
        "output": output,
    }))
    .unwrap()
}

#[async_trait]
impl PredictionApi for StubApi {
    async fn create_prediction(
        &self,
        _person: &EncodedImage,
        _garment: &EncodedImage,
        _api_key: &str,
    ) -> Result<Prediction> {
        self.inner.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(prediction("starting", None))
    }

    async fn prediction_status(&self, _id: &str, _api_key: &str) -> Result<Prediction> {
        self.inner.status_calls.fetch_add(1, Ordering::SeqCst);
        match self.inner.steps.lock().unwrap().pop_front() {
            Some(Step::Status(status, output)) => Ok(prediction(status, output)),
            Some(Step::TransportError) => Err(TryOnError::StatusCheck {
                status: None,
                detail: "connection refused".into(),
            }),
            None => Ok(prediction("processing", None)),
        }
    }
}

fn session_with(stub: &StubApi) -> TryOnSession<StubApi> {
    let mut session = TryOnSession::with_api(stub.clone(), POLL_INTERVAL, MAX_ATTEMPTS);
    session.select_person_image(ImageInput::from_bytes(vec![1, 2, 3], "image/jpeg").unwrap());
    session.select_garment_image(ImageInput::from_bytes(vec![4, 5, 6], "image/png").unwrap());
    session
}

// --- Workflow outcome tests ---

#[tokio::test(start_paused = true)]
async fn test_successful_generation() {
    let stub = StubApi::with_steps(vec![
        Step::Status("processing", None),
        Step::Status("succeeded", Some("https://cdn.example.com/result.png")),
    ]);
    let mut session = session_with(&stub);

    let url = session.generate("r8_test_token").await.unwrap();

    assert_eq!(url, "https://cdn.example.com/result.png");
    assert!(!session.busy());
    assert_eq!(
        session.result_image_url(),
        Some("https://cdn.example.com/result.png")
    );
    assert!(session.last_error().is_none());
    assert_eq!(stub.create_calls(), 1);
    assert_eq!(stub.status_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_prediction_sets_error() {
    let stub = StubApi::with_steps(vec![Step::Status("failed", None)]);
    let mut session = session_with(&stub);

    let err = session.generate("r8_test_token").await.unwrap_err();

    assert!(matches!(err, TryOnError::PredictionFailed(_)));
    assert!(!session.busy());
    assert!(session.result_image_url().is_none());
    assert!(session.last_error().is_some());
    assert_eq!(stub.status_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_run_preserves_prior_result() {
    let stub = StubApi::with_steps(vec![
        Step::Status("succeeded", Some("https://cdn.example.com/first.png")),
        Step::Status("failed", None),
    ]);
    let mut session = session_with(&stub);

    session.generate("r8_test_token").await.unwrap();
    assert_eq!(
        session.result_image_url(),
        Some("https://cdn.example.com/first.png")
    );

    let err = session.generate("r8_test_token").await.unwrap_err();
    assert!(matches!(err, TryOnError::PredictionFailed(_)));

    // The earlier successful result stays visible alongside the new error.
    assert_eq!(
        session.result_image_url(),
        Some("https://cdn.example.com/first.png")
    );
    assert!(session.last_error().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_success_clears_previous_error() {
    let stub = StubApi::with_steps(vec![
        Step::Status("failed", None),
        Step::Status("succeeded", Some("https://cdn.example.com/second.png")),
    ]);
    let mut session = session_with(&stub);

    session.generate("r8_test_token").await.unwrap_err();
    assert!(session.last_error().is_some());

    session.generate("r8_test_token").await.unwrap();
    assert!(session.last_error().is_none());
    assert_eq!(
        session.result_image_url(),
        Some("https://cdn.example.com/second.png")
    );
}

// --- Precondition tests ---

#[tokio::test]
async fn test_missing_garment_never_hits_network() {
    let stub = StubApi::never_terminal();
    let mut session = TryOnSession::with_api(stub.clone(), POLL_INTERVAL, MAX_ATTEMPTS);
    session.select_person_image(ImageInput::from_bytes(vec![1], "image/jpeg").unwrap());

    let err = session.generate("r8_test_token").await.unwrap_err();

    assert!(matches!(err, TryOnError::InvalidInput(_)));
    assert!(!session.busy());
    assert_eq!(stub.create_calls(), 0);
    assert_eq!(stub.status_calls(), 0);
    assert!(session.last_error().is_some());
}

#[tokio::test]
async fn test_empty_api_key_rejected() {
    let stub = StubApi::never_terminal();
    let mut session = session_with(&stub);

    let err = session.generate("   ").await.unwrap_err();

    assert!(matches!(err, TryOnError::InvalidInput(_)));
    assert_eq!(stub.create_calls(), 0);
}

// --- Poll loop tests ---

#[tokio::test(start_paused = true)]
async fn test_poll_timeout_after_exact_attempt_ceiling() {
    let stub = StubApi::never_terminal();
    let start = tokio::time::Instant::now();

    let err = poll_until_terminal(&stub, "pred-1", "r8_test_token", POLL_INTERVAL, MAX_ATTEMPTS)
        .await
        .unwrap_err();

    assert!(matches!(err, TryOnError::Timeout { attempts: 60 }));
    assert_eq!(stub.status_calls(), 60);
    // 60 checks with 5-second spacing between them = 295s of virtual time.
    assert_eq!(start.elapsed(), Duration::from_secs(295));
}

#[tokio::test(start_paused = true)]
async fn test_poll_stops_on_first_success() {
    let stub = StubApi::with_steps(vec![
        Step::Status("starting", None),
        Step::Status("processing", None),
        Step::Status("succeeded", Some("https://cdn.example.com/result.png")),
    ]);

    let done = poll_until_terminal(&stub, "pred-1", "r8_test_token", POLL_INTERVAL, MAX_ATTEMPTS)
        .await
        .unwrap();

    assert_eq!(done.status, PredictionStatus::Succeeded);
    assert_eq!(stub.status_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_aborts_polling() {
    let stub = StubApi::with_steps(vec![Step::TransportError]);

    let err = poll_until_terminal(&stub, "pred-1", "r8_test_token", POLL_INTERVAL, MAX_ATTEMPTS)
        .await
        .unwrap_err();

    // Transport failures are not retried; polling aborts on the spot.
    assert!(matches!(err, TryOnError::StatusCheck { status: None, .. }));
    assert_eq!(stub.status_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_succeeded_without_output_is_a_failure() {
    let stub = StubApi::with_steps(vec![Step::Status("succeeded", None)]);
    let mut session = session_with(&stub);

    let err = session.generate("r8_test_token").await.unwrap_err();

    assert!(matches!(err, TryOnError::PredictionFailed(_)));
    assert!(session.result_image_url().is_none());
}
