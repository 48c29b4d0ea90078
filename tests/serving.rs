//! End-to-end request resolution over a real socket.

mod common;

use common::{client, start, Site, INDEX};

#[tokio::test]
async fn serves_mapped_files_with_content_type() {
    let site = Site::new(&[("app/main.js", "boot()"), ("css/site.css", "body{}")]);
    let server = start(site.config()).await;

    let res = client().get(server.url("/css/site.css")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/css");
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "body{}");

    server.stop().await;
}

#[tokio::test]
async fn longest_prefix_wins() {
    let site = Site::new(&[("a/b/file", "from a"), ("deep/file", "from deep")]);
    let mut config = site.config();
    config
        .site
        .map
        .insert("a/b".into(), site.path().join("deep"));
    let server = start(config).await;

    let body = client()
        .get(server.url("/a/b/file"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "from deep");

    server.stop().await;
}

#[tokio::test]
async fn unknown_routes_get_index_verbatim() {
    let site = Site::new(&[]);
    let server = start(site.config()).await;

    let res = client()
        .get(server.url("/some/random/route"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), INDEX);

    // Missing file under a mapped directory falls back too.
    site.write("app/present.js", "x");
    let res = client()
        .get(server.url("/app/absent.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), INDEX);

    server.stop().await;
}

#[tokio::test]
async fn push_state_off_is_404() {
    let site = Site::new(&[]);
    let mut config = site.config();
    config.site.push_state = false;
    let server = start(config).await;

    let res = client()
        .get(server.url("/some/random/route"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn query_string_is_ignored() {
    let site = Site::new(&[("app/file.css", "p{}")]);
    let server = start(site.config()).await;

    let plain = client().get(server.url("/app/file.css")).send().await.unwrap();
    let query = client()
        .get(server.url("/app/file.css?x=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(plain.status(), query.status());
    assert_eq!(plain.text().await.unwrap(), query.text().await.unwrap());

    server.stop().await;
}

#[tokio::test]
async fn stylesheets_compile_on_read() {
    let site = Site::new(&[
        ("styles/main.styl", "@import \"vars\"\nbody { color: red }\n"),
        ("styles/vars.styl", "$accent = blue\n"),
        ("styles/broken.styl", "@import \"nowhere\"\n"),
    ]);
    let server = start(site.config()).await;

    let res = client()
        .get(server.url("/styles/main.styl"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/css"));
    let css = res.text().await.unwrap();
    assert!(css.contains("$accent = blue"));
    assert!(css.contains("body { color: red }"));

    let res = client()
        .get(server.url("/styles/broken.styl"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);

    // No source on disk: the compiler is skipped and the fallback answers.
    let res = client()
        .get(server.url("/styles/ghost.styl"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), INDEX);

    server.stop().await;
}

#[tokio::test]
async fn non_get_requests_get_fallback() {
    let site = Site::new(&[("app/main.js", "boot()")]);
    let server = start(site.config()).await;

    let res = client()
        .post(server.url("/app/main.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), INDEX);

    server.stop().await;
}

#[tokio::test]
async fn traversal_never_leaves_mappings() {
    let outside = tempfile::tempdir().unwrap();
    std::fs::write(outside.path().join("secret.txt"), "secret").unwrap();
    let site = Site::new(&[("app/main.js", "boot()")]);
    let server = start(site.config()).await;

    let name = outside.path().file_name().unwrap().to_string_lossy();
    let path = format!("/app/..%2F..%2F{}/secret.txt", name);
    let res = client().get(server.url(&path)).send().await.unwrap();
    assert_ne!(res.text().await.unwrap(), "secret");

    server.stop().await;
}

#[tokio::test]
async fn favicon_is_served_from_configured_path() {
    let site = Site::new(&[("assets/icon.ico", "ICON")]);
    let mut config = site.config();
    config.site.favicon = Some(site.path().join("assets/icon.ico"));
    let server = start(config).await;

    let res = client().get(server.url("/favicon.ico")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "ICON");

    server.stop().await;
}

#[tokio::test]
async fn site_under_a_root_prefix() {
    let site = Site::new(&[("app/main.js", "boot()")]);
    let mut config = site.config();
    config.site.root = "/spa/".into();
    let server = start(config).await;

    let body = client()
        .get(server.url("/spa/app/main.js"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "boot()");

    // Outside the root only the fallback applies.
    let body = client()
        .get(server.url("/app/main.js"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, INDEX);

    server.stop().await;
}
