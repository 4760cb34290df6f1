mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn stats_count_every_collection() -> Result<()> {
    let app = common::spawn_app();
    let token = app.login().await?;

    let empty = app.call(Method::GET, "/api/dashboard/stats", Some(&token), None).await?;
    assert_eq!(
        empty.body["data"],
        json!({ "totalProjects": 0, "totalSkills": 0, "totalCertifications": 0, "totalTimelineEvents": 0 })
    );

    app.call(Method::POST, "/api/projects", Some(&token), Some(json!({ "title": "Site" })))
        .await?;
    app.call(
        Method::POST,
        "/api/certifications",
        Some(&token),
        Some(json!({ "title": "Foo", "issuer": "Bar", "date": "2024-01-01" })),
    )
    .await?;

    let stats = app.call(Method::GET, "/api/dashboard/stats", Some(&token), None).await?;
    assert_eq!(stats.body["data"]["totalProjects"], 1);
    assert_eq!(stats.body["data"]["totalCertifications"], 1);
    Ok(())
}

#[tokio::test]
async fn activity_feed_lists_newest_first() -> Result<()> {
    let app = common::spawn_app();
    let token = app.login().await?;

    app.call(Method::POST, "/api/projects", Some(&token), Some(json!({ "title": "Older" })))
        .await?;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    app.call(
        Method::POST,
        "/api/certifications",
        Some(&token),
        Some(json!({ "title": "Newer", "issuer": "Issuer" })),
    )
    .await?;

    let res = app.call(Method::GET, "/api/activity", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    let feed = res.body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0]["type"], "certification");
    assert_eq!(feed[0]["title"], "Newer");
    assert_eq!(feed[1]["type"], "project");
    Ok(())
}

#[tokio::test]
async fn activity_feed_is_capped() -> Result<()> {
    let app = common::spawn_app();
    let token = app.login().await?;

    for i in 0..12 {
        app.call(
            Method::POST,
            "/api/key-skills",
            Some(&token),
            Some(json!({ "name": format!("unused {}", i) })),
        )
        .await?;
        app.call(
            Method::POST,
            "/api/projects",
            Some(&token),
            Some(json!({ "title": format!("Project {}", i) })),
        )
        .await?;
    }

    let res = app.call(Method::GET, "/api/activity", Some(&token), None).await?;
    assert_eq!(res.body["data"].as_array().map(Vec::len), Some(10));
    Ok(())
}
