//! Minimal end-to-end run against the stock deployment.
//!
//! ```sh
//! REPLICATE_API_TOKEN=r8_... cargo run --example simple_tryon person.jpg garment.jpg
//! ```

use std::env;

use tryon_rs::{ImageInput, TryOnConfig, TryOnSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let person_path = args.next().expect("usage: simple_tryon <person> <garment>");
    let garment_path = args.next().expect("usage: simple_tryon <person> <garment>");
    let api_key = env::var("REPLICATE_API_TOKEN").expect("REPLICATE_API_TOKEN not set");

    let mut session = TryOnSession::new(TryOnConfig::default());
    session.select_person_image(ImageInput::from_file(&person_path)?);
    session.select_garment_image(ImageInput::from_file(&garment_path)?);

    println!("Submitting try-on, this can take a few minutes...");
    match session.generate(&api_key).await {
        Ok(url) => println!("Composite image: {}", url),
        Err(e) => eprintln!("Try-on failed: {}", e),
    }

    Ok(())
}
