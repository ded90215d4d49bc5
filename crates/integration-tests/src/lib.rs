//! Integration test harness for the boutique admin.
//!
//! Everything runs in-process: the memory product store, in-memory sessions,
//! and the real router driven with `tower::ServiceExt::oneshot`. No database
//! or running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p boutique-integration-tests
//! ```

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, BodyDataStream, to_bytes};
use axum::http::{HeaderValue, Request, StatusCode, header};
use futures::StreamExt;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use boutique_admin::config::AdminConfig;
use boutique_admin::db::{MemoryProductStore, ProductStore};
use boutique_admin::middleware::create_session_layer;
use boutique_admin::routes;
use boutique_admin::services::FeedState;
use boutique_admin::state::AppState;

/// Gate password used by every test context.
pub const TEST_PASSWORD: &str = "ashvi@77";

/// A response with its body already collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub cookie: Option<String>,
    pub body: String,
}

/// An open `text/event-stream` response.
pub struct EventStream {
    pub status: StatusCode,
    pub content_type: Option<String>,
    data: BodyDataStream,
    buffer: String,
}

impl EventStream {
    /// Read the next event as `(event name, data)`, skipping keep-alive comments.
    pub async fn next_event(&mut self) -> (String, String) {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let frame: String = self.buffer.drain(..end + 2).collect();
                let mut event = String::new();
                let mut data = String::new();
                for line in frame.lines() {
                    if let Some(value) = line.strip_prefix("event:") {
                        event = value.trim_start().to_string();
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data.push_str(value.trim_start());
                    }
                }
                if event.is_empty() && data.is_empty() {
                    continue;
                }
                return (event, data);
            }

            let chunk = tokio::time::timeout(Duration::from_secs(5), self.data.next())
                .await
                .expect("timed out waiting for an event")
                .expect("event stream ended")
                .unwrap();
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }
}

/// An admin app over a memory store.
pub struct TestContext {
    pub store: MemoryProductStore,
    pub state: AppState,
    pub app: Router,
}

impl TestContext {
    /// Build the app and wait for the first product snapshot.
    pub async fn new() -> Self {
        Self::with_store(MemoryProductStore::new()).await
    }

    /// Build the app over an existing store.
    pub async fn with_store(store: MemoryProductStore) -> Self {
        let mut config = AdminConfig::local();
        config.store_timeout = Duration::from_secs(2);

        let shared: Arc<dyn ProductStore> = Arc::new(store.clone());
        let state = AppState::new(config.clone(), shared);
        let app = routes::app(
            state.clone(),
            create_session_layer(MemoryStore::default(), &config),
        );

        state.feed().ready().await;

        Self { store, state, app }
    }

    /// Send a GET request, optionally with a session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    /// Send a url-encoded form POST, optionally with a session cookie.
    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body)).unwrap()).await
    }

    /// Log in with the test password and return the session cookie.
    pub async fn login(&self) -> String {
        let response = self
            .post_form("/auth/login", &[("password", TEST_PASSWORD)], None)
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        response.cookie.expect("login should set a session cookie")
    }

    /// Open the live product feed without collecting the (endless) body.
    pub async fn open_feed(&self, cookie: Option<&str>) -> EventStream {
        let mut request = Request::builder().method("GET").uri("/products/feed");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = self
            .app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        EventStream {
            status: response.status(),
            content_type: response
                .headers()
                .get(header::CONTENT_TYPE)
                .map(|v| v.to_str().unwrap().to_string()),
            data: response.into_body().into_data_stream(),
            buffer: String::new(),
        }
    }

    /// Wait until the feed has seen at least `version` snapshots.
    pub async fn wait_for_version(&self, version: u64) -> FeedState {
        let mut rx = self.state.feed().watch();
        let state = tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|s| s.version >= version),
        )
        .await
        .expect("timed out waiting for snapshot")
        .unwrap()
        .clone();
        state
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().unwrap().split(';').next().map(str::to_string));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            location,
            cookie,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
