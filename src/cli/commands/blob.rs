use anyhow::Context;
use clap::Subcommand;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_object, output_records, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum BlobCommands {
    #[command(about = "List stored files")]
    List,

    #[command(about = "Upload a file")]
    Upload {
        #[arg(help = "Local file to upload")]
        path: PathBuf,
        #[arg(long, help = "Store under this name instead of the local file name")]
        name: Option<String>,
        #[arg(long, help = "Append a random suffix to the stored name")]
        suffix: bool,
    },

    #[command(about = "Delete a file by its public URL")]
    Delete {
        #[arg(help = "Public URL returned by upload or list")]
        url: String,
    },
}

pub async fn handle(client: &ApiClient, cmd: BlobCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        BlobCommands::List => {
            let body = client.get("/api/blob").await?;
            let files = body.get("files").cloned().unwrap_or(Value::Array(Vec::new()));
            output_records(&output_format, &files, "No files stored")
        }
        BlobCommands::Upload { path, name, suffix } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());

            let mut form = Form::new()
                .part("file", Part::bytes(bytes).file_name(file_name))
                .text("addSuffix", suffix.to_string());
            if let Some(name) = name {
                form = form.text("customFileName", name);
            }

            let uploaded = client
                .send(client.request(Method::POST, "/api/blob").multipart(form))
                .await?;
            output_object(&output_format, &uploaded)
        }
        BlobCommands::Delete { url } => {
            client.delete_with("/api/blob", &json!({ "url": url })).await?;
            output_success(&output_format, &format!("Deleted {}", url), None)
        }
    }
}
