//! In-process Bot API double for tests.
//!
//! Serves `getMe`, `getUpdates`, `getFile` and the file endpoint from
//! memory, acknowledges everything else, and records every request it
//! receives.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use {
    axum::{
        Json, Router,
        body::Bytes,
        extract::State,
        http::{StatusCode, Uri},
        response::{IntoResponse, Response},
        routing::any,
    },
    serde_json::{Value, json},
    tokio::{sync::oneshot, task::JoinHandle},
};

pub(crate) const FILE_PATH: &str = "documents/file_1.mp4";

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub path: String,
    pub body: String,
}

#[derive(Clone)]
struct ApiState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// `None` makes `getFile` answer with an API error.
    file_body: Option<Arc<Vec<u8>>>,
    file_body_missing: Arc<AtomicBool>,
    /// Handed out by the next `getUpdates`, then empty batches.
    updates: Arc<Mutex<VecDeque<Value>>>,
    unauthorized: Arc<AtomicBool>,
    conflict: Arc<AtomicBool>,
}

pub(crate) struct MockTelegramApi {
    state: ApiState,
    addr: std::net::SocketAddr,
    shutdown: oneshot::Sender<()>,
    server: JoinHandle<()>,
}

impl MockTelegramApi {
    pub(crate) async fn start(file_body: Option<Vec<u8>>) -> Self {
        let state = ApiState {
            requests: Arc::new(Mutex::new(Vec::new())),
            file_body: file_body.map(Arc::new),
            file_body_missing: Arc::new(AtomicBool::new(false)),
            updates: Arc::new(Mutex::new(VecDeque::new())),
            unauthorized: Arc::new(AtomicBool::new(false)),
            conflict: Arc::new(AtomicBool::new(false)),
        };
        let app = Router::new()
            .route("/{*path}", any(handle))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve mock telegram api");
        });

        Self {
            state,
            addr,
            shutdown,
            server,
        }
    }

    /// `getFile` still succeeds but the file endpoint answers 404.
    pub(crate) fn with_missing_file_body(self) -> Self {
        self.state.file_body_missing.store(true, Ordering::SeqCst);
        self
    }

    /// Queue raw update objects for the next `getUpdates` call.
    pub(crate) fn with_updates(self, updates: impl IntoIterator<Item = Value>) -> Self {
        self.state
            .updates
            .lock()
            .expect("updates lock")
            .extend(updates);
        self
    }

    /// `getMe` answers 401.
    pub(crate) fn with_unauthorized(self) -> Self {
        self.state.unauthorized.store(true, Ordering::SeqCst);
        self
    }

    /// `getUpdates` answers with the "other instance is polling" conflict.
    pub(crate) fn with_get_updates_conflict(self) -> Self {
        self.state.conflict.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn bot(&self) -> teloxide::Bot {
        let url = reqwest::Url::parse(&format!("http://{}/", self.addr)).expect("parse api url");
        teloxide::Bot::new("test-token").set_api_url(url)
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    /// Bot API method names received so far, in order.
    pub(crate) fn methods(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| !r.path.starts_with("/file/"))
            .map(|r| r.path.rsplit('/').next().unwrap_or_default().to_string())
            .collect()
    }

    /// Wait until `method` has been called at least once.
    pub(crate) async fn wait_for(&self, method: &str) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !self.methods().iter().any(|m| m == method) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("{method} was never called"));
    }

    pub(crate) async fn stop(self) {
        let _ = self.shutdown.send(());
        self.server.await.expect("server join");
    }
}

async fn handle(State(state): State<ApiState>, uri: Uri, body: Bytes) -> Response {
    let path = uri.path().to_string();
    state
        .requests
        .lock()
        .expect("requests lock")
        .push(RecordedRequest {
            path: path.clone(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });

    if path.starts_with("/file/") {
        return match &state.file_body {
            Some(bytes) if !state.file_body_missing.load(Ordering::SeqCst) => {
                bytes.as_ref().clone().into_response()
            },
            _ => StatusCode::NOT_FOUND.into_response(),
        };
    }

    let method = path.rsplit('/').next().unwrap_or_default();
    match method {
        "GetMe" if state.unauthorized.load(Ordering::SeqCst) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "ok": false,
                "error_code": 401,
                "description": "Unauthorized",
            })),
        )
            .into_response(),
        "GetMe" => Json(json!({
            "ok": true,
            "result": {
                "id": 7,
                "is_bot": true,
                "first_name": "Clip",
                "username": "clip_bot",
                "can_join_groups": false,
                "can_read_all_group_messages": false,
                "supports_inline_queries": false,
                "can_connect_to_business": false,
                "has_main_web_app": false,
            }
        }))
        .into_response(),
        "GetUpdates" if state.conflict.load(Ordering::SeqCst) => (
            StatusCode::CONFLICT,
            Json(json!({
                "ok": false,
                "error_code": 409,
                "description": "Conflict: terminated by other getUpdates request; make sure that only one bot instance is running",
            })),
        )
            .into_response(),
        "GetUpdates" => {
            let batch: Vec<Value> = state
                .updates
                .lock()
                .expect("updates lock")
                .drain(..)
                .collect();
            if batch.is_empty() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            Json(json!({ "ok": true, "result": batch })).into_response()
        },
        "GetFile" => match &state.file_body {
            Some(bytes) => Json(json!({
                "ok": true,
                "result": {
                    "file_id": "doc-1",
                    "file_unique_id": "doc-unique-1",
                    "file_size": bytes.len(),
                    "file_path": FILE_PATH,
                }
            }))
            .into_response(),
            None => Json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: invalid file_id",
            }))
            .into_response(),
        },
        "SendMessage" | "SendVideo" => Json(json!({
            "ok": true,
            "result": {
                "message_id": 1,
                "date": 0,
                "chat": { "id": 42, "type": "private", "first_name": "Alice" },
                "text": "ok",
            }
        }))
        .into_response(),
        _ => Json(json!({ "ok": true, "result": true })).into_response(),
    }
}
