mod helpers;
use helpers::{signed_in, spawn_app, Credentials, TestClient};
use moodlog_client::account::{avatar_url, fetch_profile, upload_avatar};

#[tokio::test]
async fn avatar_upload_updates_the_profile() {
    let server = spawn_app().await.unwrap();
    let client = TestClient::build(&server.address()).unwrap();
    let creds = Credentials::fake();
    let mut app = signed_in(&client, &creds).await.unwrap();
    let ctx = app.context().clone();

    let profile = fetch_profile(&ctx).await.unwrap().unwrap();
    assert_eq!(profile.email, creds.email);
    assert_eq!(profile.first_name.as_deref(), Some(creds.first_name.as_str()));
    assert!(profile.avatar_path.is_none());

    let path = upload_avatar(&ctx, "Me.PNG", vec![0x89, 0x50, 0x4e, 0x47])
        .await
        .unwrap();
    assert!(path.starts_with(&format!("{}/", profile.id)));
    assert!(path.ends_with(".png"));

    let profile = fetch_profile(&ctx).await.unwrap().unwrap();
    assert_eq!(profile.avatar_path.as_deref(), Some(path.as_str()));

    let url = avatar_url(&ctx, Some(&profile)).unwrap();
    let res = reqwest::get(&url).await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert_eq!(res.headers()[reqwest::header::CONTENT_TYPE], "image/png");

    app.refresh().await.unwrap();
    let screen = ctx.screen.content();
    assert!(screen.contains(&format!("/storage/avatars/{}/", profile.id)), "{screen}");
}

#[tokio::test]
async fn avatar_upload_is_rejected_offline() {
    let server = spawn_app().await.unwrap();
    let mut client = TestClient::build(&server.address()).unwrap();
    signed_in(&client, &Credentials::fake()).await.unwrap();
    client.offline(true);

    let ctx = client.context().await.unwrap();
    let err = upload_avatar(&ctx, "me.jpg", vec![1, 2, 3]).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "No internet connection: avatar upload is unavailable offline."
    );
}
