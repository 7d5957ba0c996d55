use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    routing::get,
    Router,
};
use catalog_api::{
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

const MULTIPART_BOUNDARY: &str = "catalog-test-boundary-7MA4YWxkTrZu0gW";

/// Helper harness for spinning up an application state backed by an in-memory
/// SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        // Minimal configuration suitable for tests. Each instance gets its own
        // private in-memory database, so the pool must stay on one connection.
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()));

        let state = AppState {
            db: db_arc,
            config: cfg.clone(),
            event_sender,
            services,
        };

        // Mirrors the router wiring in main.rs, minus telemetry layers.
        let router = Router::new()
            .route("/", get(|| async { "catalog-api up" }))
            .route("/health", get(catalog_api::health_check))
            .nest("/api", catalog_api::api_routes())
            .layer(CorsLayer::permissive())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a plain request against the router, with an optional JSON body.
    #[allow(dead_code)]
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Send a request with extra headers. Used for CORS checks.
    #[allow(dead_code)]
    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = builder.body(Body::empty()).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Send a multipart request carrying a `product` JSON part and an optional
    /// `imageFile` part given as (file name, content type, bytes).
    #[allow(dead_code)]
    pub async fn request_multipart(
        &self,
        method: Method,
        uri: &str,
        product: &Value,
        image: Option<(&str, &str, &[u8])>,
    ) -> axum::response::Response {
        let mut body = Vec::new();

        push_part_header(
            &mut body,
            "Content-Disposition: form-data; name=\"product\"\r\nContent-Type: application/json",
        );
        body.extend_from_slice(
            &serde_json::to_vec(product).expect("failed to serialize product part"),
        );
        body.extend_from_slice(b"\r\n");

        if let Some((file_name, content_type, bytes)) = image {
            push_part_header(
                &mut body,
                &format!(
                    "Content-Disposition: form-data; name=\"imageFile\"; filename=\"{}\"\r\nContent-Type: {}",
                    file_name, content_type
                ),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

        self.send_multipart_body(method, uri, body).await
    }

    /// Send a raw multipart body that omits the `product` part entirely.
    #[allow(dead_code)]
    pub async fn request_multipart_without_product(
        &self,
        method: Method,
        uri: &str,
    ) -> axum::response::Response {
        let mut body = Vec::new();
        push_part_header(
            &mut body,
            "Content-Disposition: form-data; name=\"unrelated\"",
        );
        body.extend_from_slice(b"ignored");
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

        self.send_multipart_body(method, uri, body).await
    }

    /// Send a multipart body whose `product` part is not valid JSON.
    #[allow(dead_code)]
    pub async fn request_multipart_with_bad_json(
        &self,
        method: Method,
        uri: &str,
    ) -> axum::response::Response {
        let mut body = Vec::new();
        push_part_header(
            &mut body,
            "Content-Disposition: form-data; name=\"product\"\r\nContent-Type: application/json",
        );
        body.extend_from_slice(b"{not json");
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

        self.send_multipart_body(method, uri, body).await
    }

    #[allow(dead_code)]
    async fn send_multipart_body(
        &self,
        method: Method,
        uri: &str,
        body: Vec<u8>,
    ) -> axum::response::Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(Body::from(body))
            .expect("failed to build multipart request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

#[allow(dead_code)]
fn push_part_header(body: &mut Vec<u8>, headers: &str) {
    body.extend_from_slice(format!("--{}\r\n{}\r\n\r\n", MULTIPART_BOUNDARY, headers).as_bytes());
}

/// Read a response body to completion and parse it as JSON.
#[allow(dead_code)]
pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not valid JSON")
}

/// Read a response body to completion as raw bytes.
#[allow(dead_code)]
pub async fn read_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body")
        .to_vec()
}

/// Assert the response carries the given status and return its JSON body.
#[allow(dead_code)]
pub async fn expect_json(response: axum::response::Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    read_json(response).await
}
