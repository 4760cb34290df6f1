mod common;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = common::spawn_app();
    let res = app.call(Method::GET, "/health", None, None).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn protected_route_without_session_redirects_to_login() -> Result<()> {
    let app = common::spawn_app();
    let res = app.call(Method::GET, "/api/projects", None, None).await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers[header::LOCATION], "/login");
    assert_eq!(res.body["redirect"], "/login");
    assert_eq!(res.body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_treated_as_signed_out() -> Result<()> {
    let app = common::spawn_app();
    let res = app
        .call(Method::GET, "/api/auth/whoami", Some("not-a-token"), None)
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_rejected() -> Result<()> {
    let app = common::spawn_app();
    let res = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": common::OWNER_EMAIL, "password": "wrong" })),
        )
        .await?;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Invalid email or password");
    Ok(())
}

#[tokio::test]
async fn login_whoami_logout_cycle() -> Result<()> {
    let app = common::spawn_app();
    let token = app.login().await?;

    let me = app.call(Method::GET, "/api/auth/whoami", Some(&token), None).await?;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["email"], common::OWNER_EMAIL);
    assert!(me.body["data"].get("session_id").is_none());

    let out = app.call(Method::DELETE, "/api/auth/session", Some(&token), None).await?;
    assert_eq!(out.status, StatusCode::OK);

    let again = app.call(Method::GET, "/api/auth/whoami", Some(&token), None).await?;
    assert_eq!(again.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn password_reset_answers_success_for_any_address() -> Result<()> {
    let app = common::spawn_app();
    for email in [common::OWNER_EMAIL, "stranger@example.com"] {
        let res = app
            .call(Method::POST, "/auth/password-reset", None, Some(json!({ "email": email })))
            .await?;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["success"], true);
    }

    let bad = app
        .call(Method::POST, "/auth/password-reset", None, Some(json!({ "email": "" })))
        .await?;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    Ok(())
}
