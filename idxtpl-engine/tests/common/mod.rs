//! Shared test utilities: an in-process mock Elasticsearch cluster.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use idxtpl_engine::{ClientConfig, ClusterHandle};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Install a log subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "idxtpl_engine=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct Inner {
    templates: BTreeMap<String, Value>,
    requests: Vec<String>,
    failure: Option<StatusCode>,
    root_failure: Option<StatusCode>,
}

#[derive(Clone)]
struct MockState {
    version: String,
    inner: Arc<Mutex<Inner>>,
}

/// Mock cluster serving `GET /` and `/_index_template/{name}`.
pub struct MockCluster {
    pub addr: SocketAddr,
    state: MockState,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl MockCluster {
    /// Spawn a mock cluster reporting the given version.
    pub async fn spawn(version: &str) -> Self {
        init_tracing();

        let state = MockState {
            version: version.to_string(),
            inner: Arc::new(Mutex::new(Inner::default())),
        };

        let router = Router::new()
            .route("/", get(root))
            .route(
                "/_index_template/{name}",
                get(get_template).put(put_template).delete(delete_template),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Server error");
        });

        Self {
            addr,
            state,
            shutdown_tx,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.url())
    }

    /// Connect with dialect sniffing, then forget the sniffing request.
    pub async fn handle(&self) -> ClusterHandle {
        let handle = ClusterHandle::connect(&self.config())
            .await
            .expect("Failed to connect");
        self.clear_requests();
        handle
    }

    /// Seed a template directly, bypassing the API.
    pub fn insert(&self, name: &str, body: Value) {
        self.lock().templates.insert(name.to_string(), body);
    }

    pub fn stored(&self, name: &str) -> Option<Value> {
        self.lock().templates.get(name).cloned()
    }

    /// Every request seen so far, as `"METHOD /path?query"`.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    /// Make every template endpoint answer with `status` until cleared.
    pub fn fail_with(&self, status: Option<StatusCode>) {
        self.lock().failure = status;
    }

    /// Make `GET /` answer with `status` until cleared.
    pub fn fail_root_with(&self, status: Option<StatusCode>) {
        self.lock().root_failure = status;
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.state.inner.lock().unwrap()
    }
}

fn es_error(status: StatusCode, error_type: &str, reason: String) -> Response {
    let body = json!({
        "error": {
            "root_cause": [{"type": error_type, "reason": reason}],
            "type": error_type,
            "reason": reason,
        },
        "status": status.as_u16(),
    });
    (status, Json(body)).into_response()
}

fn record(state: &MockState, method: &str, uri: &Uri) -> Option<Response> {
    let mut inner = state.inner.lock().unwrap();
    inner.requests.push(format!("{method} {uri}"));
    inner.failure.map(|status| {
        es_error(
            status,
            "cluster_block_exception",
            "injected failure".to_string(),
        )
    })
}

fn matches(pattern: &str, name: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => pattern == name,
    }
}

async fn root(State(state): State<MockState>, uri: Uri) -> Response {
    record(&state, "GET", &uri);
    if let Some(status) = state.inner.lock().unwrap().root_failure {
        return (status, "no handler found").into_response();
    }
    Json(json!({
        "name": "mock-node",
        "cluster_name": "mock",
        "version": {"number": state.version, "build_flavor": "default"},
        "tagline": "You Know, for Search",
    }))
    .into_response()
}

async fn get_template(
    State(state): State<MockState>,
    Path(name): Path<String>,
    uri: Uri,
) -> Response {
    if let Some(failure) = record(&state, "GET", &uri) {
        return failure;
    }
    let inner = state.inner.lock().unwrap();
    let items: Vec<Value> = inner
        .templates
        .iter()
        .filter(|(stored, _)| matches(&name, stored))
        .map(|(stored, body)| json!({"name": stored, "index_template": body}))
        .collect();

    if items.is_empty() {
        return es_error(
            StatusCode::NOT_FOUND,
            "resource_not_found_exception",
            format!("index template matching [{name}] not found"),
        );
    }
    Json(json!({ "index_templates": items })).into_response()
}

#[derive(Deserialize)]
struct PutParams {
    #[serde(default)]
    create: bool,
}

async fn put_template(
    State(state): State<MockState>,
    Path(name): Path<String>,
    Query(params): Query<PutParams>,
    uri: Uri,
    body: String,
) -> Response {
    if let Some(failure) = record(&state, "PUT", &uri) {
        return failure;
    }
    let parsed: Value = match serde_json::from_str(&body) {
        Ok(Value::Object(map)) => Value::Object(map),
        _ => {
            return es_error(
                StatusCode::BAD_REQUEST,
                "parse_exception",
                "request body is required to be a JSON object".to_string(),
            );
        }
    };

    let mut inner = state.inner.lock().unwrap();
    if params.create && inner.templates.contains_key(&name) {
        return es_error(
            StatusCode::BAD_REQUEST,
            "illegal_argument_exception",
            format!("index template [{name}] already exists"),
        );
    }
    inner.templates.insert(name, parsed);
    Json(json!({"acknowledged": true})).into_response()
}

async fn delete_template(
    State(state): State<MockState>,
    Path(name): Path<String>,
    uri: Uri,
) -> Response {
    if let Some(failure) = record(&state, "DELETE", &uri) {
        return failure;
    }
    let mut inner = state.inner.lock().unwrap();
    if inner.templates.remove(&name).is_none() {
        return es_error(
            StatusCode::NOT_FOUND,
            "resource_not_found_exception",
            format!("index_template [{name}] missing"),
        );
    }
    Json(json!({"acknowledged": true})).into_response()
}
