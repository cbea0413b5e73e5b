#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use herald_core::gateway::{NotificationGateway, SendConfirmation};
use herald_core::template::MessageTemplate;
use herald_db::{DbPool, SqlRecordStore};
use herald_pipeline::{DispatchConfig, Dispatcher};
use http_body_util::BodyExt;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use herald_api::config::ServerConfig;
use herald_api::router::build_app_router;
use herald_api::state::AppState;

/// Gateway accepting every address except the listed ones.
#[derive(Default)]
pub struct StubGateway {
    rejected: HashSet<String>,
}

impl StubGateway {
    pub fn rejecting(addresses: &[&str]) -> Self {
        Self {
            rejected: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[async_trait]
impl NotificationGateway for StubGateway {
    async fn send(&self, destination_address: &str, _message_body: &str) -> SendConfirmation {
        if self.rejected.contains(destination_address) {
            SendConfirmation::rejected("Invalid Number")
        } else {
            SendConfirmation::succeeded()
        }
    }
}

/// Gateway that signals `entered` and then waits for `release`.
#[derive(Default)]
pub struct BlockingGateway {
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl NotificationGateway for BlockingGateway {
    async fn send(&self, _destination_address: &str, _message_body: &str) -> SendConfirmation {
        self.entered.notify_one();
        self.release.notified().await;
        SendConfirmation::succeeded()
    }
}

/// Gateway that accepts every message after `delay`.
pub struct SlowGateway {
    pub delay: Duration,
    pub entered: Notify,
    pub finished: AtomicUsize,
}

impl SlowGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            entered: Notify::new(),
            finished: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl NotificationGateway for SlowGateway {
    async fn send(&self, _destination_address: &str, _message_body: &str) -> SendConfirmation {
        self.entered.notify_one();
        tokio::time::sleep(self.delay).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        SendConfirmation::succeeded()
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
    }
}

/// Build the full application router over `pool`, sending through `gateway`.
pub fn build_test_app(pool: DbPool, gateway: Arc<dyn NotificationGateway>) -> Router {
    build_test_app_with_config(pool, gateway, test_config())
}

pub fn build_test_app_with_config(
    pool: DbPool,
    gateway: Arc<dyn NotificationGateway>,
    config: ServerConfig,
) -> Router {
    let store = SqlRecordStore::new(pool.clone(), MessageTemplate::default());
    let dispatcher = Dispatcher::new(Arc::new(store), gateway, DispatchConfig::default());
    let state = AppState::new(pool, dispatcher, config.clone(), CancellationToken::new());
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri).await
}

async fn send(app: Router, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
