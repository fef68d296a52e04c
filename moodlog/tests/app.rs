mod helpers;
use helpers::{signed_in, spawn_app, Credentials, TestClient};
use moodlog_client::guard::{HISTORY, HOME, INDEX, LOGIN, NEW_ENTRY};
use moodlog_client::session::SessionStatus;

#[tokio::test]
async fn logged_out_private_paths_go_to_login() {
    let server = spawn_app().await.unwrap();
    let client = TestClient::build(&server.address()).unwrap();

    for path in [HOME, NEW_ENTRY, HISTORY] {
        let app = client.open(path).await.unwrap();
        let ctx = app.context();
        assert_eq!(ctx.location.path(), LOGIN);
        assert_eq!(ctx.session.status(), SessionStatus::Unauthenticated);
        assert!(ctx.screen.content().starts_with("Log in"));
        assert!(ctx.screen.header().guest_nav);
    }
}

#[tokio::test]
async fn index_and_unknown_paths() {
    let server = spawn_app().await.unwrap();
    let client = TestClient::build(&server.address()).unwrap();

    let app = client.open(INDEX).await.unwrap();
    assert!(app.context().screen.content().starts_with("Moodlog"));

    let app = client.open("").await.unwrap();
    assert_eq!(app.context().location.path(), "/");

    let app = client.open("/nowhere").await.unwrap();
    assert!(app.context().screen.content().starts_with("404"));
}

#[tokio::test]
async fn tabs_render_inside_the_shell() {
    let server = spawn_app().await.unwrap();
    let client = TestClient::build(&server.address()).unwrap();
    let creds = Credentials::fake();
    let mut app = signed_in(&client, &creds).await.unwrap();

    app.context().location.navigate(NEW_ENTRY);
    app.pump().await.unwrap();
    let screen = app.context().screen.content();
    assert!(screen.starts_with("== New entry =="), "{screen}");
    assert!(screen.contains("[*New entry*]"));
    assert!(screen.contains(&format!("[History #{HISTORY}]")));

    app.context().location.navigate("(tabs)/history");
    app.pump().await.unwrap();
    let screen = app.context().screen.content();
    assert!(screen.starts_with("== History =="), "{screen}");
    assert!(screen.contains("No entries."));
}

#[tokio::test]
async fn a_later_route_registration_replaces_the_view() {
    let server = spawn_app().await.unwrap();
    let client = TestClient::build(&server.address()).unwrap();
    let mut app = client.open(INDEX).await.unwrap();

    app.router_mut()
        .register_route("/about", |ctx: moodlog_client::context::AppContext| async move {
            ctx.screen.render("first");
            Ok(())
        });
    app.router_mut()
        .register_route("/about", |ctx: moodlog_client::context::AppContext| async move {
            ctx.screen.render("second");
            Ok(())
        });

    app.context().location.navigate("/about");
    app.pump().await.unwrap();
    assert_eq!(app.context().screen.content(), "second");
}
