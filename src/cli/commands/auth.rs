use anyhow::Context;
use serde_json::{json, Value};

use crate::cli::client::{unwrap_data, ApiClient};
use crate::cli::config::{clear_session, save_session, SessionConfig};
use crate::cli::utils::{output_object, output_success};
use crate::cli::OutputFormat;

pub async fn login(client: &ApiClient, email: &str, password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let body = client
        .post("/auth/login", &json!({ "email": email, "password": password }))
        .await?;
    let session = unwrap_data(body);
    let token = session
        .get("token")
        .and_then(Value::as_str)
        .context("login response carried no token")?;

    save_session(&SessionConfig::new(
        client.base_url().to_string(),
        email.to_string(),
        token.to_string(),
    ))?;

    output_success(
        &output_format,
        &format!("Signed in as {} on {}", email, client.base_url()),
        Some(json!({ "expires_in": session.get("expires_in") })),
    )
}

pub async fn whoami(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let identity = unwrap_data(client.get("/api/auth/whoami").await?);
    output_object(&output_format, &identity)
}

pub async fn logout(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    // The saved session goes even when the server no longer accepts the token
    let result = client.delete("/api/auth/session").await;
    clear_session()?;
    result?;
    output_success(&output_format, "Signed out", None)
}
