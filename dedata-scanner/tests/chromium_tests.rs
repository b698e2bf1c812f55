// End-to-end capture against a local page. Needs a Chromium install.

use dedata_scanner::{ChromiumLauncher, ChromiumOptions, ResourceFilter, SessionInterceptor};
use std::sync::Arc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn mount(server: &MockServer, route: &str, content_type: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", content_type)
                .set_body_bytes(body.into_bytes()),
        )
        .mount(server)
        .await;
}

#[tokio::test]
#[ignore] // Requires Chromium to be installed
async fn test_chromium_captures_fetch_and_xhr_only() {
    let server = MockServer::start().await;
    let base = server.uri();

    let page = format!(
        r#"<html><head><script src="{base}/app.js"></script></head>
           <body><img src="{base}/logo.png"></body></html>"#
    );
    let script = format!(
        r#"fetch("{base}/api/pairs?page=1");
           const xhr = new XMLHttpRequest();
           xhr.open("GET", "{base}/api/tokens");
           xhr.send();
           fetch("{base}/banner.png");"#
    );

    mount(&server, "/", "text/html", page).await;
    mount(&server, "/app.js", "application/javascript", script).await;
    mount(&server, "/api/pairs", "application/json", "[]".to_string()).await;
    mount(&server, "/api/tokens", "application/json", "[]".to_string()).await;

    let launcher = ChromiumLauncher::new(ChromiumOptions {
        no_sandbox: true,
        ..ChromiumOptions::default()
    });
    let interceptor = SessionInterceptor::new(
        Arc::new(launcher),
        ResourceFilter::new([".png", ".jpg", ".css", ".svg", ".ico"]),
    );

    let capture = interceptor
        .capture(&format!("{}/", base))
        .await
        .expect("capture failed");

    let urls: Vec<&str> = capture.captured.iter().collect();
    assert!(urls.contains(&format!("{}/api/pairs?page=1", base).as_str()));
    assert!(urls.contains(&format!("{}/api/tokens", base).as_str()));
    assert!(urls.iter().all(|u| !u.ends_with(".png")));
    assert!(urls.iter().all(|u| !u.ends_with("app.js")));
}
