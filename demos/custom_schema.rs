//! Targeting a different model deployment and routing through a CORS relay.
//!
//! Field names and the version hash belong to the deployment, not the
//! client — swapping models is a config change here, nothing else.

use std::time::Duration;

use serde_json::Value;
use tryon_rs::{ImageInput, ModelSchema, PayloadForm, Relay, TryOnConfig, TryOnSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let schema = ModelSchema::new(
        "0513734a452173b8173e907e3a59d19a36266e55b48528559432bd21c7d7e985",
        "human_img",
        "garm_img",
    )
    .with_extra("garment_des", Value::String("short sleeve t-shirt".into()))
    .with_extra("category", Value::String("upper_body".into()));

    let config = TryOnConfig::builder()
        .with_schema(schema)
        .with_relay(
            Relay::new("https://api.allorigins.win/raw").with_origin("https://app.example.com"),
        )
        .with_payload_form(PayloadForm::Bare)
        .with_poll_interval(Duration::from_secs(3))
        .with_max_poll_attempts(100)
        .build();

    let api_key = std::env::var("REPLICATE_API_TOKEN").expect("REPLICATE_API_TOKEN not set");

    let mut session = TryOnSession::new(config);
    session.select_person_image(ImageInput::from_file("person.jpg")?);
    session.select_garment_image(ImageInput::from_file("garment.jpg")?);

    match session.generate(&api_key).await {
        Ok(url) => println!("Composite image: {}", url),
        Err(e) => eprintln!("Try-on failed: {}", e),
    }

    Ok(())
}
