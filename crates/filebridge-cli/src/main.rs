//! FileBridge CLI: command-line client for the FileBridge API.
//!
//! Set FILEBRIDGE_API_URL (or API_URL); defaults to http://localhost:8080.

use anyhow::Context;
use clap::{Parser, Subcommand};
use filebridge_api_client::{BridgeSessionResponse, FileBridgeClient, TranscodeRequest};
use filebridge_cli::{
    format_table, init_tracing, parse_source_encoding, parse_target_encoding, validate_name,
};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "filebridge", about = "FileBridge API CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored files, oldest first
    List {
        /// Output format: json or table
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Upload a local file
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Store under this name instead of the file's own name
        #[arg(long)]
        name: Option<String>,
    },
    /// Rename a file
    Rename {
        /// File UUID
        id: Uuid,
        /// New name
        name: String,
    },
    /// Delete a file
    Delete {
        /// File UUID
        id: Uuid,
    },
    /// Re-encode a text file
    Transcode {
        /// File UUID
        id: Uuid,
        /// Target encoding
        #[arg(long)]
        to: String,
        /// Source encoding, or "auto" to detect it
        #[arg(long, default_value = "auto")]
        from: String,
        /// Fail instead of replacing unrepresentable characters with '?'
        #[arg(long)]
        strict: bool,
    },
    /// Download a file through a single-use link
    Download {
        /// File UUID
        id: Uuid,
        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Open an upload session for a second device
    BridgeUpload {
        /// Save the session's QR code as PNG
        #[arg(long)]
        qr_out: Option<PathBuf>,
        /// Act as the second device and upload this file through the session
        #[arg(long)]
        send: Option<PathBuf>,
    },
    /// Open a download session handing one file to a second device
    BridgeDownload {
        /// File UUID
        id: Uuid,
        /// Save the session's QR code as PNG
        #[arg(long)]
        qr_out: Option<PathBuf>,
    },
    /// List supported encodings
    Encodings,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn save_qr(
    client: &FileBridgeClient,
    session: &BridgeSessionResponse,
    path: &Path,
) -> anyhow::Result<()> {
    let png = client.bridge_qrcode(&session.token).await?;
    std::fs::write(path, &png)
        .with_context(|| format!("Failed to write QR code to {}", path.display()))?;
    eprintln!("QR code written to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client = FileBridgeClient::from_env()
        .context("Failed to create API client. Set FILEBRIDGE_API_URL (or API_URL)")?;

    match cli.command {
        Commands::List { format } => {
            let files = client.list_files().await?;
            if format == "json" {
                print_json(&files)?;
            } else {
                print!("{}", format_table(&files));
            }
        }
        Commands::Upload { file, name } => {
            let name = name.as_deref().map(validate_name).transpose()?;
            let response = client.upload_file(&file, name).await?;
            print_json(&response)?;
        }
        Commands::Rename { id, name } => {
            let name = validate_name(&name)?;
            let response = client.rename_file(id, name).await?;
            print_json(&response)?;
        }
        Commands::Delete { id } => {
            client.delete_file(id).await?;
            print_json(
                &serde_json::json!({ "success": true, "message": format!("File {} deleted", id) }),
            )?;
        }
        Commands::Transcode {
            id,
            to,
            from,
            strict,
        } => {
            let target = parse_target_encoding(&to)?;
            let source = parse_source_encoding(&from)?;
            let request = TranscodeRequest {
                source_encoding: source.to_string(),
                target_encoding: target.to_string(),
                allow_lossy: !strict,
            };
            let response = client.transcode_file(id, &request).await?;
            print_json(&response)?;
        }
        Commands::Download { id, output } => {
            let data = client.download_file(id).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &data)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("Wrote {} bytes to {}", data.len(), path.display());
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&data).context("Failed to write to stdout")?;
                    stdout.flush().context("Failed to flush stdout")?;
                }
            }
        }
        Commands::BridgeUpload { qr_out, send } => {
            let session = client.create_upload_bridge().await?;
            print_json(&session)?;
            if let Some(path) = qr_out {
                save_qr(&client, &session, &path).await?;
            }
            if let Some(file) = send {
                let record = client.bridge_upload(&session.token, &file, None).await?;
                print_json(&record)?;
            }
        }
        Commands::BridgeDownload { id, qr_out } => {
            let session = client.create_download_bridge(id).await?;
            print_json(&session)?;
            if let Some(path) = qr_out {
                save_qr(&client, &session, &path).await?;
            }
        }
        Commands::Encodings => {
            let response = client.list_encodings().await?;
            print_json(&response)?;
        }
    }

    Ok(())
}
