mod helpers;
use helpers::{spawn_app, VERSION};
use moodlog_common::api::{ErrorMessage, HealthCheckResponse};

#[tokio::test]
async fn health_check() {
    let server = spawn_app().await.unwrap();
    let response = moodlog_client::api_client::health_check(&server.address())
        .await
        .unwrap();

    assert_eq!(
        HealthCheckResponse {
            status: "Ok".into(),
            version: VERSION.into()
        },
        response
    );
}

#[tokio::test]
async fn private_routes_need_a_bearer_token() {
    let server = spawn_app().await.unwrap();
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/entries", server.address()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/profile", server.address()))
        .bearer_auth("not-a-session")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn storage_reads_are_public_but_writes_are_not() {
    let server = spawn_app().await.unwrap();
    let client = reqwest::Client::new();
    let url = format!("{}/storage/avatars/someone/a.png", server.address());

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
    let err: ErrorMessage = res.json().await.unwrap();
    assert_eq!(err.value, "object");

    let res = client.put(&url).body(vec![1, 2, 3]).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/storage/secrets/someone/a.png", server.address()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn manifest_describes_the_app_shell() {
    let server = spawn_app().await.unwrap();
    let res = reqwest::get(format!("{}/manifest.webmanifest", server.address()))
        .await
        .unwrap();

    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert_eq!(
        res.headers()[reqwest::header::CONTENT_TYPE],
        "application/manifest+json"
    );
    let manifest: serde_json::Value = res.json().await.unwrap();
    assert_eq!(manifest["name"], "Moodlog");
    assert_eq!(manifest["start_url"], "/#/(tabs)/home");
    assert_eq!(manifest["display"], "standalone");
}
