use std::time::Duration;

use reqwest::Method;

use crate::cli::client::{unwrap_data, ApiClient};
use crate::cli::utils::output_object;
use crate::cli::OutputFormat;

pub async fn health(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let request = client
        .request(Method::GET, "/health")
        .timeout(Duration::from_secs(5));
    let status = unwrap_data(client.send(request).await?);
    output_object(&output_format, &status)
}
