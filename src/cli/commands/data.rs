use crate::cli::client::{unwrap_data, ApiClient};
use crate::cli::utils::{output_records, output_success};
use crate::cli::{Collection, OutputFormat};

pub async fn list(client: &ApiClient, collection: Collection, output_format: OutputFormat) -> anyhow::Result<()> {
    let records = unwrap_data(client.get(&format!("/api/{}", collection.path())).await?);
    output_records(&output_format, &records, &format!("No {} yet", collection.path()))
}

pub async fn remove(
    client: &ApiClient,
    collection: Collection,
    id: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    client
        .delete(&format!("/api/{}/{}", collection.path(), id))
        .await?;
    output_success(&output_format, &format!("Removed '{}' from {}", id, collection.path()), None)
}
