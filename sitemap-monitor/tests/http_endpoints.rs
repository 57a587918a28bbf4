//! HTTP implementations against a local axum server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use sitemap_monitor::Error;
use sitemap_monitor::monitor::{HttpProber, LivenessProbe};
use sitemap_monitor::notification::{
    NotificationChannel, NotificationEvent, Notifier, ProductLink, WebhookChannel, WebhookConfig,
};
use sitemap_monitor::sitemap::{HttpSitemapFetcher, SitemapSource};
use sitemap_monitor::utils::http_client::{DEFAULT_USER_AGENT, build_client};

const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
  <url>
    <loc>https://shop.example.com/us/item/N0001</loc>
    <image:image><image:loc>https://cdn.example.com/n0001.jpg</image:loc></image:image>
  </url>
  <url>
    <loc>https://shop.example.com/us/item/N0002</loc>
  </url>
</urlset>"#;

const ETAG: &str = "\"sitemap-v1\"";

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn sitemap(headers: HeaderMap) -> Response {
    let validator = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    if validator == Some(ETAG) {
        return StatusCode::NOT_MODIFIED.into_response();
    }
    (
        [(header::ETAG, ETAG), (header::CONTENT_TYPE, "application/xml")],
        SITEMAP,
    )
        .into_response()
}

async fn requires_browser_agent(headers: HeaderMap) -> StatusCode {
    let agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if agent.starts_with("Mozilla/") {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    }
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(3)).await;
    "late"
}

fn sitemap_router() -> Router {
    Router::new()
        .route("/us/sitemap.xml", get(sitemap))
        .route("/no-etag.xml", get(|| async { SITEMAP }))
        .route(
            "/broken.xml",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route("/garbage.xml", get(|| async { "<urlset><url></urlset>" }))
        .route("/img/live.jpg", get(|| async { "jpeg" }))
        .route("/img/agent.jpg", get(requires_browser_agent))
        .route("/img/slow.jpg", get(slow))
}

fn client() -> reqwest::Client {
    build_client(DEFAULT_USER_AGENT, Duration::from_secs(1)).unwrap()
}

#[tokio::test]
async fn fetcher_uses_etag_for_conditional_requests() {
    let base = serve(sitemap_router()).await;
    let fetcher = HttpSitemapFetcher::new(client(), format!("{base}/us/sitemap.xml"), "item");

    let first = fetcher.fetch("").await.unwrap();
    assert!(first.changed);
    assert_eq!(first.token, ETAG);
    let found: Vec<_> = first.products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(found, ["N0001", "N0002"]);
    assert_eq!(
        first.products[0].probe_url.as_deref(),
        Some("https://cdn.example.com/n0001.jpg")
    );

    let second = fetcher.fetch(&first.token).await.unwrap();
    assert!(!second.changed);
    assert_eq!(second.token, ETAG);
    assert!(second.products.is_empty());
}

#[tokio::test]
async fn fetcher_returns_empty_token_without_etag() {
    let base = serve(sitemap_router()).await;
    let fetcher = HttpSitemapFetcher::new(client(), format!("{base}/no-etag.xml"), "item");

    let fetch = fetcher.fetch("\"stale\"").await.unwrap();
    assert!(fetch.changed);
    assert_eq!(fetch.token, "");
    assert_eq!(fetch.products.len(), 2);
}

#[tokio::test]
async fn fetcher_ignores_token_that_is_not_a_header_value() {
    let base = serve(sitemap_router()).await;
    let fetcher = HttpSitemapFetcher::new(client(), format!("{base}/us/sitemap.xml"), "item");

    let fetch = fetcher.fetch("\"sitemap-v1\"\r\nX-Injected: 1").await.unwrap();
    assert!(fetch.changed);
    assert_eq!(fetch.token, ETAG);
    assert_eq!(fetch.products.len(), 2);
}

#[tokio::test]
async fn fetcher_treats_error_status_as_failure() {
    let base = serve(sitemap_router()).await;
    let fetcher = HttpSitemapFetcher::new(client(), format!("{base}/broken.xml"), "item");

    let err = fetcher.fetch("\"v0\"").await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedStatus { status: 500, .. }));
}

#[tokio::test]
async fn fetcher_rejects_malformed_xml() {
    let base = serve(sitemap_router()).await;
    let fetcher = HttpSitemapFetcher::new(client(), format!("{base}/garbage.xml"), "item");

    assert!(matches!(
        fetcher.fetch("").await,
        Err(Error::SitemapParse(_))
    ));
}

#[tokio::test]
async fn fetcher_reports_unreachable_host() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = HttpSitemapFetcher::new(client(), format!("http://{addr}/sitemap.xml"), "item");
    assert!(matches!(fetcher.fetch("").await, Err(Error::Http(_))));
}

#[tokio::test]
async fn prober_checks_status_agent_and_timeout() {
    let base = serve(sitemap_router()).await;
    let prober = HttpProber::new(client());
    let url = |path: &str| format!("{base}{path}");

    assert!(prober.is_live(Some(url("/img/live.jpg").as_str())).await);
    assert!(prober.is_live(Some(url("/img/agent.jpg").as_str())).await);
    assert!(!prober.is_live(Some(url("/img/missing.jpg").as_str())).await);
    assert!(!prober.is_live(Some(url("/img/slow.jpg").as_str())).await);
    assert!(!prober.is_live(None).await);

    let bare = HttpProber::new(build_client("curl/8.0", Duration::from_secs(1)).unwrap());
    assert!(!bare.is_live(Some(url("/img/agent.jpg").as_str())).await);
}

type Received = Arc<Mutex<Vec<serde_json::Value>>>;

async fn receive(State(received): State<Received>, Json(body): Json<serde_json::Value>) -> StatusCode {
    received.lock().unwrap().push(body);
    StatusCode::NO_CONTENT
}

#[tokio::test]
async fn webhook_posts_single_text_field() {
    let received: Received = Arc::default();
    let router = Router::new()
        .route("/hook", post(receive))
        .route("/down", post(|| async { StatusCode::BAD_GATEWAY }))
        .with_state(received.clone());
    let base = serve(router).await;

    let event = NotificationEvent::products_live(vec![ProductLink::new(
        "N0001",
        "https://shop.example.com/us/item/N0001",
    )]);

    let channel = WebhookChannel::with_client(
        WebhookConfig::new(format!("{base}/hook"), "content"),
        client(),
    );
    channel.send(&event).await.unwrap();

    let bodies = received.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0], serde_json::json!({ "content": event.message() }));

    let down = WebhookChannel::with_client(
        WebhookConfig::new(format!("{base}/down"), "content"),
        client(),
    );
    assert!(down.send(&event).await.is_err());

    // The notifier swallows the failure
    Notifier::new(Arc::new(down)).notify(&event).await;
}
