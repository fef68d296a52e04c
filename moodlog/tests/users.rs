mod helpers;
use helpers::{signed_in, spawn_app, Credentials, TestClient};
use moodlog_client::account;
use moodlog_client::cache::LAST_EMAIL_KEY;
use moodlog_client::guard::{HOME, LOGIN, REGISTER};
use moodlog_client::session::SessionStatus;

#[tokio::test]
async fn registration_then_login_lands_on_home() {
    let server = spawn_app().await.unwrap();
    let client = TestClient::build(&server.address()).unwrap();
    let creds = Credentials::fake();

    let app = signed_in(&client, &creds).await.unwrap();
    let ctx = app.context();

    assert_eq!(ctx.location.path(), HOME);
    assert_eq!(ctx.session.status(), SessionStatus::Authenticated);
    assert!(ctx.screen.header().logout);

    let screen = ctx.screen.content();
    assert!(screen.contains(&format!("Hello, {}!", creds.first_name)), "{screen}");
    assert!(screen.contains(&format!("Logged in as: {}", creds.email)));

    let last: String = ctx.cache.get(LAST_EMAIL_KEY, String::new()).await;
    assert_eq!(last, creds.email);
}

#[tokio::test]
async fn sign_up_goes_to_login_without_a_session() {
    let server = spawn_app().await.unwrap();
    let client = TestClient::build(&server.address()).unwrap();
    let creds = Credentials::fake();

    let mut app = client.open(REGISTER).await.unwrap();
    let ctx = app.context().clone();
    let user = account::sign_up(&ctx, creds.form()).await.unwrap();
    app.pump().await.unwrap();

    assert_eq!(user.email, creds.email);
    assert_eq!(user.first_name.as_deref(), Some(creds.first_name.as_str()));
    assert!(ctx.backend.session().is_none());
    assert_eq!(ctx.location.path(), LOGIN);
    assert!(ctx.screen.content().starts_with("Log in"));
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let server = spawn_app().await.unwrap();
    let client = TestClient::build(&server.address()).unwrap();
    let creds = Credentials::fake();

    let app = client.open(REGISTER).await.unwrap();
    let ctx = app.context().clone();
    account::sign_up(&ctx, creds.form()).await.unwrap();

    let err = account::sign_up(&ctx, creds.form()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Registration failed: User already registered"
    );
}

#[tokio::test]
async fn short_password_is_rejected() {
    let server = spawn_app().await.unwrap();
    let client = TestClient::build(&server.address()).unwrap();
    let mut creds = Credentials::fake();
    creds.password = "12345".into();

    let app = client.open(REGISTER).await.unwrap();
    let err = account::sign_up(app.context(), creds.form())
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Registration failed:"));
}

#[tokio::test]
async fn wrong_password_fails_login() {
    let server = spawn_app().await.unwrap();
    let client = TestClient::build(&server.address()).unwrap();
    let creds = Credentials::fake();

    let mut app = client.open(REGISTER).await.unwrap();
    let ctx = app.context().clone();
    account::sign_up(&ctx, creds.form()).await.unwrap();
    app.pump().await.unwrap();

    let err = account::sign_in(&ctx, &creds.email, "definitely wrong")
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Login failed:"), "{err}");
    assert_eq!(ctx.location.path(), LOGIN);
    assert!(ctx.backend.session().is_none());
}

#[tokio::test]
async fn session_survives_restart() {
    let server = spawn_app().await.unwrap();
    let client = TestClient::build(&server.address()).unwrap();
    let creds = Credentials::fake();
    signed_in(&client, &creds).await.unwrap();

    // Logged in users are sent away from the public only pages.
    let app = client.open(LOGIN).await.unwrap();
    assert_eq!(app.context().location.path(), HOME);

    let app = client.open("/").await.unwrap();
    assert_eq!(app.context().location.path(), HOME);
}

#[tokio::test]
async fn logout_clears_session_and_goes_to_login() {
    let server = spawn_app().await.unwrap();
    let client = TestClient::build(&server.address()).unwrap();
    let creds = Credentials::fake();

    let mut app = signed_in(&client, &creds).await.unwrap();
    let ctx = app.context().clone();
    account::sign_out(&ctx).await.unwrap();
    app.pump().await.unwrap();

    assert_eq!(ctx.location.path(), LOGIN);
    assert_eq!(ctx.session.status(), SessionStatus::Unauthenticated);
    assert!(ctx.screen.header().guest_nav);
    assert!(!std::path::Path::new(&client.settings.session_path).exists());

    let app = client.open(HOME).await.unwrap();
    assert_eq!(app.context().location.path(), LOGIN);
}

#[tokio::test]
async fn login_is_rejected_offline() {
    let server = spawn_app().await.unwrap();
    let mut client = TestClient::build(&server.address()).unwrap();
    client.offline(true);

    let app = client.open(LOGIN).await.unwrap();
    let err = account::sign_in(app.context(), "a@b.pl", "secret")
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "No internet connection: logging in is unavailable offline."
    );
}
