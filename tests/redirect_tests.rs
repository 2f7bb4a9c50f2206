//! Redirect tests
//!
//! GET /r/{token} → decode → one background notification → 302.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{App, HttpServer};
use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Notify;

use linktrkr::api::AppState;
use linktrkr::api::services::LandingPage;
use linktrkr::services::{
    BotRouter, ClickEvent, NotificationDispatcher, Notifier, NotifyError, RedirectOutcome,
    RedirectResolver, RequestMeta,
};
use linktrkr::token::{OwnerId, TokenCodec, TrackingClaim};

const SECRET: &[u8] = b"redirect-test-secret";
const WEBHOOK_SECRET: &str = "hook-secret";

// =============================================================================
// Test Setup
// =============================================================================

/// 记录每次投递尝试的 Notifier
#[derive(Default)]
struct CountingNotifier {
    attempts: AtomicUsize,
    seen: Mutex<Vec<(OwnerId, ClickEvent)>>,
    fail: bool,
}

#[async_trait]
impl Notifier for CountingNotifier {
    async fn notify(&self, owner: &OwnerId, click: &ClickEvent) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((owner.clone(), click.clone()));
        if self.fail {
            Err(NotifyError::Rejected("chat not found".into()))
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

/// 放行前一直挂起的 Notifier
#[derive(Default)]
struct GatedNotifier {
    gate: Notify,
    completed: AtomicUsize,
}

#[async_trait]
impl Notifier for GatedNotifier {
    async fn notify(&self, _owner: &OwnerId, _click: &ClickEvent) -> Result<(), NotifyError> {
        self.gate.notified().await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

fn gated_state(notifier: Arc<GatedNotifier>) -> (AppState, Arc<NotificationDispatcher>, String) {
    let codec = Arc::new(TokenCodec::new(SECRET));
    let dispatcher = Arc::new(NotificationDispatcher::new(
        notifier,
        8,
        Duration::from_secs(30),
    ));
    let token = codec
        .issue(&TrackingClaim::new("https://dest.example/page", 42i64))
        .unwrap();
    let state = AppState::new(
        BotRouter::new(codec.clone(), "LinkTrkrBot"),
        RedirectResolver::new(codec.clone(), dispatcher.clone()),
        LandingPage::new(codec, "LinkTrkrBot", None),
        WEBHOOK_SECRET,
    );
    (state, dispatcher, token)
}

fn expired_token() -> String {
    TokenCodec::new(SECRET)
        .encode(&TrackingClaim::new("https://dest.example/page", 42i64), Some(0))
        .unwrap()
}

struct Harness {
    codec: Arc<TokenCodec>,
    notifier: Arc<CountingNotifier>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl Harness {
    fn new(fail: bool) -> Self {
        let notifier = Arc::new(CountingNotifier {
            fail,
            ..CountingNotifier::default()
        });
        let dispatcher = Arc::new(NotificationDispatcher::new(
            notifier.clone(),
            8,
            Duration::from_secs(5),
        ));
        Self {
            codec: Arc::new(TokenCodec::new(SECRET)),
            notifier,
            dispatcher,
        }
    }

    fn resolver(&self) -> RedirectResolver {
        RedirectResolver::new(self.codec.clone(), self.dispatcher.clone())
    }

    fn state(&self) -> AppState {
        AppState::new(
            BotRouter::new(self.codec.clone(), "LinkTrkrBot"),
            self.resolver(),
            LandingPage::new(self.codec.clone(), "LinkTrkrBot", None),
            WEBHOOK_SECRET,
        )
    }

    fn token_for(&self, url: &str, owner: i64) -> String {
        self.codec.issue(&TrackingClaim::new(url, owner)).unwrap()
    }

    async fn settle(&self) -> usize {
        assert!(self.dispatcher.drain(Duration::from_secs(5)).await);
        self.notifier.attempts.load(Ordering::SeqCst)
    }
}

macro_rules! redirect_app {
    ($harness:expr) => {{
        let state = $harness.state();
        test::init_service(App::new().configure(move |cfg| state.configure(cfg))).await
    }};
}

// =============================================================================
// Resolver
// =============================================================================

#[actix_rt::test]
async fn test_resolve_valid_token_notifies_once() {
    let h = Harness::new(false);
    let token = h.token_for("https://dest.example/page", 42);

    let outcome = h.resolver().resolve(&token, &RequestMeta::default());
    assert_eq!(
        outcome,
        RedirectOutcome::RedirectTo("https://dest.example/page".into())
    );
    assert_eq!(h.settle().await, 1);

    let seen = h.notifier.seen.lock().unwrap();
    assert_eq!(seen[0].0, OwnerId::Id(42));
    assert_eq!(seen[0].1.ip, "Unknown");
    assert_eq!(seen[0].1.user_agent, "Unknown");
    assert_eq!(seen[0].1.referer, "");
}

#[actix_rt::test]
async fn test_resolve_invalid_tokens_do_not_notify() {
    let h = Harness::new(false);
    let foreign = TokenCodec::new(b"another-key")
        .issue(&TrackingClaim::new("https://dest.example/page", 42i64))
        .unwrap();

    let expired = expired_token();

    for token in ["", "garbage", foreign.as_str(), expired.as_str()] {
        let outcome = h.resolver().resolve(token, &RequestMeta::default());
        assert_eq!(
            outcome,
            RedirectOutcome::Reject {
                status: 400,
                message: "Invalid link"
            },
            "{:?}",
            token
        );
    }
    assert_eq!(h.settle().await, 0);
}

#[actix_rt::test]
async fn test_same_link_clicked_twice() {
    let h = Harness::new(false);
    let token = h.token_for("https://dest.example/page", 42);

    for _ in 0..2 {
        assert!(matches!(
            h.resolver().resolve(&token, &RequestMeta::default()),
            RedirectOutcome::RedirectTo(_)
        ));
    }
    assert_eq!(h.settle().await, 2);
}

#[actix_rt::test]
async fn test_notify_failure_does_not_change_outcome() {
    let h = Harness::new(true);
    let token = h.token_for("https://dest.example/page", 42);

    assert_eq!(
        h.resolver().resolve(&token, &RequestMeta::default()),
        RedirectOutcome::RedirectTo("https://dest.example/page".into())
    );
    assert_eq!(h.settle().await, 1);
}

// =============================================================================
// HTTP
// =============================================================================

#[actix_rt::test]
async fn test_redirect_http_found() {
    let h = Harness::new(false);
    let app = redirect_app!(h);
    let token = h.token_for("https://dest.example/page", 42);

    let req = TestRequest::get()
        .uri(&format!("/r/{}", token))
        .insert_header(("cf-connecting-ip", "198.51.100.4"))
        .insert_header(("x-forwarded-for", "203.0.113.9, 10.0.0.1"))
        .insert_header((header::USER_AGENT, "TestAgent/1.0"))
        .insert_header(("referrer", "https://ref.example/"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "https://dest.example/page"
    );
    assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");

    assert_eq!(h.settle().await, 1);
    let seen = h.notifier.seen.lock().unwrap();
    let click = &seen[0].1;
    assert_eq!(click.url, "https://dest.example/page");
    assert_eq!(click.ip, "198.51.100.4");
    assert_eq!(click.user_agent, "TestAgent/1.0");
    assert_eq!(click.referer, "https://ref.example/");
}

#[actix_rt::test]
async fn test_redirect_http_forwarded_for_fallback() {
    let h = Harness::new(false);
    let app = redirect_app!(h);
    let token = h.token_for("https://dest.example/page", 42);

    let req = TestRequest::get()
        .uri(&format!("/r/{}", token))
        .insert_header(("x-forwarded-for", "203.0.113.9, 10.0.0.1"))
        .insert_header(("x-real-ip", "192.0.2.1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    assert_eq!(h.settle().await, 1);
    assert_eq!(h.notifier.seen.lock().unwrap()[0].1.ip, "203.0.113.9");
}

#[actix_rt::test]
async fn test_redirect_http_invalid_link() {
    let h = Harness::new(false);
    let app = redirect_app!(h);

    let expired = format!("/r/{}", expired_token());

    for uri in ["/r/not-a-token", "/r/", "/r/a.b.c", expired.as_str()] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert!(
            resp.headers()
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );
        let body = test::read_body(resp).await;
        assert_eq!(body, "Invalid link");
    }
    assert_eq!(h.settle().await, 0);
}

#[actix_rt::test]
async fn test_redirect_other_method_not_found() {
    let h = Harness::new(false);
    let app = redirect_app!(h);
    let token = h.token_for("https://dest.example/page", 42);

    let req = TestRequest::post()
        .uri(&format!("/r/{}", token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(h.settle().await, 0);
}

#[actix_rt::test]
async fn test_redirect_does_not_wait_for_notification() {
    let notifier = Arc::new(GatedNotifier::default());
    let (state, dispatcher, token) = gated_state(notifier.clone());
    let app = test::init_service(App::new().configure(move |cfg| state.configure(cfg))).await;

    let req = TestRequest::get()
        .uri(&format!("/r/{}", token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // 通知仍挂起时 302 已经返回
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(dispatcher.pending(), 1);
    assert_eq!(notifier.completed.load(Ordering::SeqCst), 0);

    notifier.gate.notify_one();
    assert!(dispatcher.drain(Duration::from_secs(5)).await);
    assert_eq!(notifier.completed.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Shutdown
// =============================================================================

#[actix_rt::test]
async fn test_server_stop_keeps_pending_notifications() {
    let notifier = Arc::new(GatedNotifier::default());
    let (state, dispatcher, token) = gated_state(notifier.clone());

    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new().configure(move |cfg| state.configure(cfg))
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_rt::spawn(server);

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET /r/{} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        token
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    assert!(String::from_utf8_lossy(&response).starts_with("HTTP/1.1 302"));

    // worker runtime 已经停掉，通知仍在等待
    handle.stop(true).await;
    assert_eq!(dispatcher.pending(), 1);

    notifier.gate.notify_one();
    assert!(dispatcher.drain(Duration::from_secs(5)).await);
    assert_eq!(notifier.completed.load(Ordering::SeqCst), 1);
}
