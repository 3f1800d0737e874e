//! Integration tests for `BrowserlessClient` using wiremock HTTP mocks.

use browserless_client::{
    BrowserlessClient, ContentOptions, SessionCookie, WaitUntil,
};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn content_posts_goto_options_and_returns_html() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/content"))
        .and(body_partial_json(serde_json::json!({
            "url": "https://example.com/about",
            "gotoOptions": { "waitUntil": "domcontentloaded" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><p>hi</p></html>"))
        .mount(&server)
        .await;

    let client = BrowserlessClient::new(&server.uri(), None);
    let html = client
        .content("https://example.com/about", &ContentOptions::default())
        .await
        .unwrap();

    assert_eq!(html, "<html><p>hi</p></html>");
}

#[tokio::test]
async fn token_is_sent_as_query_param() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/content"))
        .and(query_param("token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = BrowserlessClient::new(&server.uri(), Some("secret"));
    let html = client
        .content("https://example.com", &ContentOptions::default())
        .await
        .unwrap();

    assert_eq!(html, "ok");
}

#[tokio::test]
async fn cookies_are_forwarded_when_present() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/content"))
        .and(body_partial_json(serde_json::json!({
            "cookies": [{ "name": "li_at", "value": "secret" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let cookies = vec![SessionCookie {
        name: "li_at".to_string(),
        value: "secret".to_string(),
        domain: None,
        path: None,
        expires: None,
        http_only: None,
        secure: None,
        same_site: None,
    }];

    let client = BrowserlessClient::new(&server.uri(), None);
    let options = ContentOptions::default().cookies(cookies);
    client.content("https://example.com", &options).await.unwrap();
}

#[tokio::test]
async fn network_idle_fallback_uses_laxer_wait() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "gotoOptions": { "waitUntil": "networkidle2" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("rendered"))
        .mount(&server)
        .await;

    let client = BrowserlessClient::new(&server.uri(), None);
    let options = ContentOptions::default().wait_until(WaitUntil::NetworkIdle);
    let html = client.content("https://example.com", &options).await.unwrap();

    assert_eq!(html, "rendered");
}

#[tokio::test]
async fn api_error_carries_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("browser crashed"))
        .mount(&server)
        .await;

    let client = BrowserlessClient::new(&server.uri(), None);
    let err = client
        .content("https://example.com", &ContentOptions::default())
        .await
        .unwrap_err();

    match err {
        browserless_client::BrowserlessError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "browser crashed");
        }
        other => panic!("unexpected error: {other}"),
    }
}
