//! # tryon-rs
//!
//! Async Rust client for hosted virtual try-on: submit a person photo and a
//! garment photo to a Replicate-style prediction API, poll until the
//! generation finishes, and get back the composite image URL.
//!
//! The wire format (model version hash, input field names, direct vs
//! relayed transport, data-URI vs bare base64 payloads) is deployment
//! configuration injected through [`TryOnConfig`], not logic — switching
//! model deployments never means forking code.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tryon_rs::{ImageInput, TryOnConfig, TryOnSession};
//!
//! # async fn example() -> tryon_rs::Result<()> {
//! let mut session = TryOnSession::new(TryOnConfig::default());
//!
//! session.select_person_image(ImageInput::from_file("person.jpg")?);
//! session.select_garment_image(ImageInput::from_file("garment.jpg")?);
//!
//! match session.generate("r8_my_api_token").await {
//!     Ok(url) => println!("composite image: {}", url),
//!     Err(e) => eprintln!("try-on failed: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! For lower-level control, use [`PredictionClient`] and
//! [`poll_until_terminal`] directly; both are parametric over the
//! [`PredictionApi`] trait so tests can substitute stubs.

pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod session;
pub mod types;

pub use client::{PredictionApi, PredictionClient};
pub use config::{ModelSchema, PayloadForm, Relay, TryOnConfig, TryOnConfigBuilder};
pub use encode::{EncodedImage, ImageInput};
pub use error::{Result, TryOnError};
pub use session::{poll_until_terminal, TryOnSession};
pub use types::{Prediction, PredictionStatus};
