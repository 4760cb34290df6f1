#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use folio_api::auth::password_digest;
use folio_api::blob::LocalBlobStore;
use folio_api::config::AppConfig;
use folio_api::store::MemoryDocumentStore;
use folio_api::{app, AppState};

pub const OWNER_EMAIL: &str = "owner@example.com";
pub const OWNER_PASSWORD: &str = "correct horse battery staple";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub documents: MemoryDocumentStore,
    pub blob_dir: PathBuf,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub fn test_config(blob_dir: &PathBuf) -> AppConfig {
    let mut config = AppConfig::development();
    config.api.enable_request_logging = false;
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.security.owner_email = OWNER_EMAIL.to_string();
    config.security.owner_password_sha256 = password_digest(OWNER_PASSWORD);
    config.storage.database_url = None;
    config.storage.blob_dir = blob_dir.to_string_lossy().into_owned();
    config.storage.blob_base_url = "http://localhost:3000/files".to_string();
    config.github.repository = None;
    config
}

/// Router over an in-memory document store and a fresh blob directory
pub fn spawn_app() -> TestApp {
    let blob_dir = std::env::temp_dir().join(format!("folio-it-{}", Uuid::new_v4().simple()));
    let config = test_config(&blob_dir);

    let documents = MemoryDocumentStore::new();
    let blobs = Arc::new(LocalBlobStore::new(&blob_dir, &config.storage.blob_base_url));
    let state = AppState::new(config, Arc::new(documents.clone()), blobs);

    TestApp {
        router: app(state.clone()),
        state,
        documents,
        blob_dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body for status {}", status))?
        };
        Ok(TestResponse { status, headers, body })
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn login(&self) -> Result<String> {
        let response = self
            .call(
                Method::POST,
                "/auth/login",
                None,
                Some(serde_json::json!({ "email": OWNER_EMAIL, "password": OWNER_PASSWORD })),
            )
            .await?;
        anyhow::ensure!(response.status == StatusCode::OK, "login failed: {}", response.body);
        response.body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login returned no token")
    }

    pub async fn upload(&self, token: &str, fields: &[MultipartField<'_>]) -> Result<TestResponse> {
        let (content_type, body) = multipart_body(fields);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/blob")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))?;
        self.send(request).await
    }
}

pub struct MultipartField<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub data: &'a [u8],
}

const BOUNDARY: &str = "folio-test-boundary";

pub fn multipart_body(fields: &[MultipartField<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for field in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match field.file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    field.name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", field.name).as_bytes(),
            ),
        }
        body.extend_from_slice(field.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
