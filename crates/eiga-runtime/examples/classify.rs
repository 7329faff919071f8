//! Run with: cargo run -p eiga-runtime --example classify -- <filename>
//!
//! Classifies a single filename against the configured metadata provider
//! and prints the reply a transport would render.

use std::time::Duration;

use eiga_api::tmdb::TmdbClient;
use eiga_core::config::AppConfig;
use eiga_runtime::events::FileUploadEvent;
use eiga_runtime::Runtime;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("eiga=debug")
        .init();

    let filename = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "The.Matrix.1999.mkv".into());

    let config = AppConfig::load()?;
    let provider = TmdbClient::with_timeout(
        config.provider.api_key.clone(),
        Duration::from_secs(config.provider.timeout_secs),
    )?;
    let runtime = Runtime::open(config, provider).await?;

    let reply = runtime
        .handle_upload(FileUploadEvent {
            filename,
            caption: None,
            file_ref: "local-demo".into(),
            sender_id: 0,
            chat_id: 0,
        })
        .await;

    match reply {
        Some(outbound) => println!("{outbound:#?}"),
        None => println!("Upload ignored: chat not in the allow-list."),
    }
    Ok(())
}
