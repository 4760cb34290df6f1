//! `/api/blob` answers with bare bodies (`{url, pathname}`, `{files}`,
//! `{success}`) and `{error, details?}` on failure, not the API envelope.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::blob::{BlobAccess, BlobError, UploadOptions};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub url: String,
}

fn failure(status: StatusCode, message: &str, details: Option<String>) -> Response {
    let body = match details {
        Some(details) => json!({ "error": message, "details": details }),
        None => json!({ "error": message }),
    };
    (status, Json(body)).into_response()
}

struct UploadForm {
    bytes: Option<Vec<u8>>,
    file_name: Option<String>,
    custom_file_name: Option<String>,
    add_suffix: bool,
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, axum::extract::multipart::MultipartError> {
    let mut form = UploadForm {
        bytes: None,
        file_name: None,
        custom_file_name: None,
        add_suffix: false,
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                form.file_name = field.file_name().map(str::to_string);
                form.bytes = Some(field.bytes().await?.to_vec());
            }
            "customFileName" => {
                form.custom_file_name = Some(field.text().await?).filter(|name| !name.trim().is_empty());
            }
            "addSuffix" => form.add_suffix = field.text().await? == "true",
            _ => {}
        }
    }
    Ok(form)
}

/// POST /api/blob - multipart `file`, optional `customFileName` and `addSuffix`
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let form = match read_form(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            warn!("Unreadable upload form: {}", e);
            return failure(StatusCode::BAD_REQUEST, "Invalid form data", Some(e.to_string()));
        }
    };

    let Some(bytes) = form.bytes else {
        warn!("No file provided in upload request");
        return failure(StatusCode::BAD_REQUEST, "No file provided", None);
    };

    if bytes.len() > state.config.api.max_upload_bytes {
        warn!("File too large: {} bytes", bytes.len());
        return failure(StatusCode::BAD_REQUEST, "File too large", None);
    }

    let name = form
        .custom_file_name
        .or(form.file_name)
        .unwrap_or_else(|| "upload".to_string());
    info!("Uploading blob '{}' ({} bytes)", name, bytes.len());

    let options = UploadOptions {
        access: BlobAccess::Public,
        add_random_suffix: form.add_suffix,
    };
    match state.blobs.upload(bytes, &name, options).await {
        Ok(uploaded) => {
            info!("Upload successful: {}", uploaded.url);
            Json(uploaded).into_response()
        }
        Err(e @ BlobError::InvalidName(_)) => failure(StatusCode::BAD_REQUEST, "Upload failed", Some(e.to_string())),
        Err(e) => {
            error!("Upload error: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Upload failed", Some(e.to_string()))
        }
    }
}

/// GET /api/blob
pub async fn list(State(state): State<AppState>) -> Response {
    match state.blobs.list().await {
        Ok(files) => Json(json!({ "files": files })).into_response(),
        Err(e) => {
            error!("Failed to list blobs: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list files", None)
        }
    }
}

/// DELETE /api/blob - `{url}`
pub async fn delete(State(state): State<AppState>, body: Option<Json<DeleteRequest>>) -> Response {
    let url = body.map(|Json(request)| request.url).unwrap_or_default();
    if url.trim().is_empty() {
        warn!("No URL provided for deletion");
        return failure(StatusCode::BAD_REQUEST, "No URL provided", None);
    }

    info!("Deleting blob {}", url);
    match state.blobs.delete(&url).await {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(e) => {
            error!("Delete error: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Delete failed", Some(e.to_string()))
        }
    }
}
