mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use folio_api::models::PROJECTS;
use folio_api::store::DocumentStore;

#[tokio::test]
async fn project_create_list_patch_delete() -> Result<()> {
    let app = common::spawn_app();
    let token = app.login().await?;

    let created = app
        .call(
            Method::POST,
            "/api/projects",
            Some(&token),
            Some(json!({ "title": "Portfolio", "description": "This site", "link": "https://example.com" })),
        )
        .await?;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["data"]["id"].as_str().unwrap_or_default().to_string();
    assert!(!id.is_empty());

    let list = app.call(Method::GET, "/api/projects", Some(&token), None).await?;
    assert_eq!(list.body["data"].as_array().map(Vec::len), Some(1));

    let patched = app
        .call(
            Method::PATCH,
            &format!("/api/projects/{}", id),
            Some(&token),
            Some(json!({ "description": "Rebuilt", "id": "hijack" })),
        )
        .await?;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.body["data"]["id"], id.as_str());
    assert_eq!(patched.body["data"]["title"], "Portfolio");
    assert_eq!(patched.body["data"]["description"], "Rebuilt");

    let removed = app
        .call(Method::DELETE, &format!("/api/projects/{}", id), Some(&token), None)
        .await?;
    assert_eq!(removed.status, StatusCode::OK);

    let again = app
        .call(Method::DELETE, &format!("/api/projects/{}", id), Some(&token), None)
        .await?;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let remote = app.documents.get_document(&PROJECTS.doc_ref()).await?;
    assert_eq!(remote.array(PROJECTS.field).map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn invalid_record_is_rejected_without_writing() -> Result<()> {
    let app = common::spawn_app();
    let token = app.login().await?;

    let res = app
        .call(Method::POST, "/api/projects", Some(&token), Some(json!({ "title": "  " })))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert!(res.body["field_errors"]["title"].is_string());

    let remote = app.documents.get_document(&PROJECTS.doc_ref()).await?;
    assert!(!remote.exists);
    Ok(())
}

#[tokio::test]
async fn patch_of_unknown_record_is_not_found() -> Result<()> {
    let app = common::spawn_app();
    let token = app.login().await?;

    let res = app
        .call(Method::PATCH, "/api/certifications/nope", Some(&token), Some(json!({ "title": "X" })))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn timeline_lists_newest_year_first() -> Result<()> {
    let app = common::spawn_app();
    let token = app.login().await?;

    for (year, title) in [(2015, "Graduated"), (2021, "Joined startup"), (2018, "First job")] {
        let res = app
            .call(
                Method::POST,
                "/api/timeline",
                Some(&token),
                Some(json!({ "year": year, "title": title, "description": "Something worth noting" })),
            )
            .await?;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    }

    let list = app.call(Method::GET, "/api/timeline", Some(&token), None).await?;
    let years: Vec<i64> = list.body["data"]
        .as_array()
        .map(|events| events.iter().filter_map(|e| e["year"].as_i64()).collect())
        .unwrap_or_default();
    assert_eq!(years, vec![2021, 2018, 2015]);
    Ok(())
}

#[tokio::test]
async fn remove_many_skips_unknown_ids() -> Result<()> {
    let app = common::spawn_app();
    let token = app.login().await?;

    let mut ids = Vec::new();
    for name in ["Leadership", "Mentoring"] {
        let res = app
            .call(Method::POST, "/api/key-skills", Some(&token), Some(json!({ "name": name })))
            .await?;
        ids.push(res.body["data"]["id"].as_str().unwrap_or_default().to_string());
    }
    ids.push("missing".to_string());

    let res = app
        .call(Method::POST, "/api/key-skills/remove", Some(&token), Some(json!({ "ids": ids })))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["removed"], 2);
    assert_eq!(res.body["data"]["requested"], 3);

    let list = app.call(Method::GET, "/api/key-skills", Some(&token), None).await?;
    assert_eq!(list.body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn duplicate_key_skill_conflicts() -> Result<()> {
    let app = common::spawn_app();
    let token = app.login().await?;

    let body = json!({ "name": "Rust" });
    app.call(Method::POST, "/api/key-skills", Some(&token), Some(body.clone())).await?;
    let res = app.call(Method::POST, "/api/key-skills", Some(&token), Some(body)).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn reload_picks_up_records_written_elsewhere() -> Result<()> {
    let app = common::spawn_app();
    let token = app.login().await?;

    let empty = app.call(Method::GET, "/api/projects", Some(&token), None).await?;
    assert_eq!(empty.body["data"], json!([]));

    app.documents
        .array_union(
            &PROJECTS.doc_ref(),
            PROJECTS.field,
            json!({ "id": "external-1", "title": "Written by another editor" }),
        )
        .await?;
    let stale = app.call(Method::GET, "/api/projects", Some(&token), None).await?;
    assert_eq!(stale.body["data"], json!([]));

    let reloaded = app.call(Method::POST, "/api/projects/reload", Some(&token), None).await?;
    assert_eq!(reloaded.status, StatusCode::OK);
    assert_eq!(reloaded.body["data"][0]["id"], "external-1");

    let shown = app
        .call(Method::GET, "/api/projects/external-1", Some(&token), None)
        .await?;
    assert_eq!(shown.status, StatusCode::OK);
    Ok(())
}
