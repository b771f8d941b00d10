mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{terra, TestServer};

fn member_ids(body: &Value) -> Vec<i64> {
    body["data"]["celestial_objects"]
        .as_array()
        .map(|objects| objects.iter().filter_map(|o| o["id"].as_i64()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn alpha_terra_scenario() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, ada_token) = server.signup("ada").await?;
    let (_, bob_token) = server.signup("bob").await?;

    let alpha = server.create_map(&ada_token, "alpha", false).await?;
    let terra_id = server.create_object(&ada_token, terra(false)).await?;

    let res = server
        .client
        .post(server.url(&format!("/api/maps/{}/celestial-objects/{}", alpha, terra_id)))
        .bearer_auth(&ada_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["name"], "Alpha");
    assert_eq!(member_ids(&body), vec![terra_id]);

    let res = server
        .client
        .get(server.url(&format!("/api/maps/{}", alpha)))
        .bearer_auth(&bob_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .get(server.url(&format!("/api/maps/{}", alpha)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn public_maps_prune_private_members() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, ada_token) = server.signup("ada").await?;
    let (_, bob_token) = server.signup("bob").await?;

    let shared = server.create_map(&ada_token, "Shared", true).await?;
    let hidden = server.create_object(&ada_token, terra(false)).await?;
    let shown = server.create_object(&ada_token, terra(true)).await?;
    for id in [hidden, shown] {
        let res = server
            .client
            .post(server.url(&format!("/api/maps/{}/celestial-objects/{}", shared, id)))
            .bearer_auth(&ada_token)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let owner_view: Value = server
        .client
        .get(server.url(&format!("/api/maps/{}", shared)))
        .bearer_auth(&ada_token)
        .send()
        .await?
        .json()
        .await?;
    let mut owner_members = member_ids(&owner_view);
    owner_members.sort();
    assert_eq!(owner_members, vec![hidden, shown]);

    let stranger_view: Value = server
        .client
        .get(server.url(&format!("/api/maps/{}", shared)))
        .bearer_auth(&bob_token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(member_ids(&stranger_view), vec![shown]);

    let res = server.client.get(server.url("/api/maps/public")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-total-count"], "1");
    let listing: Value = res.json().await?;
    assert_eq!(listing["data"][0]["celestial_objects"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn linkage_conflicts_are_reported() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, token) = server.signup("ada").await?;
    let alpha = server.create_map(&token, "Alpha", false).await?;
    let beta = server.create_map(&token, "Beta", false).await?;
    let terra_id = server.create_object(&token, terra(false)).await?;

    let res = server
        .client
        .delete(server.url(&format!("/api/maps/{}/celestial-objects/{}", alpha, terra_id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "NOT_LINKED");

    let link = server.url(&format!("/api/maps/{}/celestial-objects/{}", alpha, terra_id));
    assert_eq!(
        server.client.post(&link).bearer_auth(&token).send().await?.status(),
        StatusCode::OK
    );

    let res = server
        .client
        .post(server.url(&format!("/api/maps/{}/celestial-objects/{}", beta, terra_id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "ALREADY_LINKED");

    let res = server
        .client
        .post(server.url(&format!("/api/maps/{}/celestial-objects/9999", alpha)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn linked_objects_accept_a_position_until_unlinked() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, token) = server.signup("ada").await?;
    let alpha = server.create_map(&token, "Alpha", false).await?;
    let terra_id = server.create_object(&token, terra(false)).await?;
    let link = server.url(&format!("/api/maps/{}/celestial-objects/{}", alpha, terra_id));
    server.client.post(&link).bearer_auth(&token).send().await?;

    let mut placed = terra(false);
    placed["position"] = json!({ "x": 3, "y": 4, "z": 5 });
    let res = server
        .client
        .put(server.url(&format!("/api/celestial-objects/{}", terra_id)))
        .bearer_auth(&token)
        .json(&placed)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["position"]["z"], 5);
    assert_eq!(body["data"]["map_id"], alpha);

    let res = server.client.delete(&link).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert!(member_ids(&body).is_empty());

    let object: Value = server
        .client
        .get(server.url(&format!("/api/celestial-objects/{}", terra_id)))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert!(object["data"]["map_id"].is_null());
    assert!(object["data"]["position"].is_null());
    Ok(())
}

#[tokio::test]
async fn update_checks_the_declared_owner() -> Result<()> {
    let server = TestServer::start().await?;
    let (ada, ada_token) = server.signup("ada").await?;
    let (_, bob_token) = server.signup("bob").await?;
    let alpha = server.create_map(&ada_token, "Alpha", false).await?;
    let path = server.url(&format!("/api/maps/{}", alpha));

    let res = server
        .client
        .put(&path)
        .bearer_auth(&ada_token)
        .json(&json!({ "name": "renamed", "is_public": true, "owner_id": ada }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["name"], "Renamed");
    assert_eq!(body["data"]["is_public"], true);

    let res = server
        .client
        .put(&path)
        .bearer_auth(&bob_token)
        .json(&json!({ "name": "Stolen", "is_public": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .put(&path)
        .bearer_auth(&ada_token)
        .json(&json!({ "name": "", "is_public": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn delete_requires_ownership_and_keeps_members() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, ada_token) = server.signup("ada").await?;
    let (_, bob_token) = server.signup("bob").await?;
    let alpha = server.create_map(&ada_token, "Alpha", true).await?;
    let terra_id = server.create_object(&ada_token, terra(false)).await?;
    server
        .client
        .post(server.url(&format!("/api/maps/{}/celestial-objects/{}", alpha, terra_id)))
        .bearer_auth(&ada_token)
        .send()
        .await?;
    let path = server.url(&format!("/api/maps/{}", alpha));

    let res = server.client.delete(&path).bearer_auth(&bob_token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.client.delete(&path).bearer_auth(&ada_token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.client.get(&path).bearer_auth(&ada_token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let object: Value = server
        .client
        .get(server.url(&format!("/api/celestial-objects/{}", terra_id)))
        .bearer_auth(&ada_token)
        .send()
        .await?
        .json()
        .await?;
    assert!(object["data"]["map_id"].is_null());
    Ok(())
}

#[tokio::test]
async fn own_listing_counts_only_the_callers_maps() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, ada_token) = server.signup("ada").await?;
    let (_, bob_token) = server.signup("bob").await?;
    server.create_map(&ada_token, "One", false).await?;
    server.create_map(&ada_token, "Two", true).await?;
    server.create_map(&bob_token, "Three", true).await?;

    let res = server
        .client
        .get(server.url("/api/maps?page_size=1"))
        .bearer_auth(&ada_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-total-count"], "2");
    assert_eq!(res.headers()["x-total-pages"], "2");

    let res = server.client.get(server.url("/api/maps")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    server.store.set_available(false);
    let res = server
        .client
        .get(server.url("/api/maps"))
        .bearer_auth(&ada_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}
