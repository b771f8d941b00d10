mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use common::TestServer;

#[tokio::test]
async fn space_image_is_public() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.client.get(server.url("/api/space-image")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["title"], "Pillars of Creation");
    assert_eq!(body["data"]["media_type"], "image");
    assert!(body["data"]["date"].is_string());
    Ok(())
}

#[tokio::test]
async fn space_image_ignores_an_invalid_token() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .get(server.url("/api/space-image"))
        .bearer_auth("not-a-token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
