//! AiHubMix Shim CLI
//!
//! Sends a prompt, optionally with an image, through the patched Gemini client

use aihubmix_shim::genai::{ContentItem, ContentsInput, FileSource, UploadFileConfig};
use aihubmix_shim::utils::logging::init_logging;
use aihubmix_shim::{ClientOptions, GenAiLibrary, Settings};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "aihubmix-shim", version, about = "Query Gemini through the AiHubMix relay")]
struct Cli {
    /// Prompt text
    #[arg(short, long)]
    prompt: String,

    /// Image to attach (uploaded, then referenced in the request)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Model override (defaults to GEMINI_MODEL)
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::new().context("Failed to load settings")?;
    init_logging(&settings.logging);
    info!("{}", aihubmix_shim::version_info());

    let installation = aihubmix_shim::install(&settings, GenAiLibrary::http());
    if !installation.capabilities.construction_redirect {
        warn!("Relay redirect is not active, requests go to the default Gemini endpoint");
    }

    let mut options = ClientOptions::default();
    options.http_options.timeout = Some(settings.timeout());
    let client = installation
        .library
        .create_client(options)
        .context("Failed to create Gemini client")?;

    let contents = match &cli.file {
        Some(path) => {
            let file = client
                .files()
                .upload(
                    FileSource::Path(path.clone()),
                    Some(UploadFileConfig {
                        mime_type: Some("image/png".to_string()),
                        display_name: None,
                    }),
                )
                .await
                .with_context(|| format!("Failed to upload {:?}", path))?;
            ContentsInput::Mixed(vec![ContentItem::File(file), ContentItem::Text(cli.prompt.clone())])
        }
        None => ContentsInput::Text(cli.prompt.clone()),
    };

    let model = cli.model.unwrap_or_else(|| settings.gemini.model.clone());
    let response = client
        .models()
        .generate_content(&model, contents, None)
        .await
        .context("generateContent failed")?;

    match response.text() {
        Some(text) => println!("{}", text),
        None => warn!("Response contained no text"),
    }

    Ok(())
}
