use serde_json::Value;

use crate::cli::client::{unwrap_data, ApiClient};
use crate::cli::utils::output_object;
use crate::cli::OutputFormat;

pub async fn activity(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let entries = unwrap_data(client.get("/api/activity").await?);

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            let entries = entries.as_array().cloned().unwrap_or_default();
            if entries.is_empty() {
                println!("No recent activity");
            }
            for entry in entries {
                let text = |key: &str| entry.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
                println!("{}  [{}] {} - {}", text("timestamp"), text("type"), text("title"), text("description"));
            }
        }
    }
    Ok(())
}

pub async fn stats(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let stats = unwrap_data(client.get("/api/dashboard/stats").await?);
    output_object(&output_format, &stats)
}
