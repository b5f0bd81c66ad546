use anyhow::Context;
use clap::{Parser, Subcommand};
use pinmint_core::prelude::*;
use pinmint_pinata::{DEFAULT_API_URL, PinataClient, PinataConfig};
use pinmint_pipeline::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pinmint")]
#[command(about = "Publish assets and their metadata to IPFS through Pinata")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pinata API key
    #[arg(long, env = "PINATA_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Pinata secret API key
    #[arg(long, env = "PINATA_SECRET_API_KEY", default_value = "", hide_env_values = true)]
    secret_key: String,

    /// Pinata API URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// IPFS gateway used to build URIs
    #[arg(short, long, env = "PINMINT_GATEWAY", default_value = DEFAULT_GATEWAY)]
    gateway: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Pin a single file
    Pin {
        path: PathBuf,

        /// Content type, guessed from the extension if omitted
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Pin an image, then a metadata document pointing at it
    Publish {
        image: PathBuf,

        /// JSON file with the asset details (name, symbol, description, royalties, attributes)
        #[arg(long)]
        details: Option<PathBuf>,
    },
    /// Print the metadata document for an already pinned image
    Metadata {
        image_cid: String,

        #[arg(long, default_value = "image/png")]
        image_type: String,

        #[arg(long)]
        details: Option<PathBuf>,
    },
    /// Check the Pinata credentials
    Auth,
    /// Print the address of a keypair file
    Address { wallet: PathBuf },
}

async fn load_details(path: Option<&Path>) -> anyhow::Result<AssetDetails> {
    let Some(path) = path else {
        return Ok(AssetDetails::default());
    };

    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {path:?}"))?;
    serde_json::from_slice(&data).with_context(|| format!("Invalid asset details in {path:?}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let credentials = PinningCredentials::new(cli.api_key.clone(), cli.secret_key.clone());
    let client =
        PinataClient::new(PinataConfig::new(credentials).with_api_url(cli.api_url.clone()));

    match cli.command {
        Commands::Pin { path, content_type } => {
            let content_type = content_type.unwrap_or_else(|| {
                mime_guess::from_path(&path)
                    .first_or_octet_stream()
                    .to_string()
            });
            let file = GenericFile::from_path(&path, Some(content_type)).await?;

            println!("📌 Pinning {} ({} bytes)...", file.file_name(), file.len());
            let cid = client.pin(file).await?;

            println!("✅ Pinned! CID: {cid}");
            println!("{}", cid.gateway_uri(&cli.gateway));
        }
        Commands::Publish { image, details } => {
            let details = load_details(details.as_deref()).await?;
            let publisher = Publisher::new(client, cli.gateway.clone(), details);

            println!("🚀 Publishing {image:?}...");
            let metadata = publisher.publish(&image).await?;

            println!("✅ Image:    {}", metadata.image().uri());
            println!("✅ Metadata: {}", metadata.uri());
        }
        Commands::Metadata {
            image_cid,
            image_type,
            details,
        } => {
            let details = load_details(details.as_deref()).await?;
            let image_uri = ContentId::new(image_cid).gateway_uri(&cli.gateway);
            let document = details.metadata_document(&image_uri, &image_type);

            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Commands::Auth => {
            let message = client.test_authentication().await?;
            println!("✅ {message}");
        }
        Commands::Address { wallet } => {
            let identity = SigningIdentity::from_keypair_file(&wallet).await?;
            println!("{}", identity.address());
        }
    }

    Ok(())
}
