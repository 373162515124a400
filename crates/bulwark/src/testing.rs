//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use tokio::net::TcpListener;

/// What the mock siteverify endpoint answers with
#[derive(Clone)]
pub enum Reply {
    Json(serde_json::Value),
    Status(StatusCode),
    Garbage,
    /// Sleep this long before answering `{"success": true}`
    Stall(Duration),
}

/// A local stand-in for a provider's siteverify endpoint
#[derive(Clone)]
pub struct MockProvider {
    pub url: String,
    calls: Arc<AtomicUsize>,
    forms: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl MockProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_form(&self) -> Option<HashMap<String, String>> {
        self.forms.lock().expect("poisoned").last().cloned()
    }
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    calls: Arc<AtomicUsize>,
    forms: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn siteverify(
    State(state): State<MockState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    state.forms.lock().expect("poisoned").push(form);

    match state.reply {
        Reply::Json(body) => Json(body).into_response(),
        Reply::Status(status) => (status, "upstream unavailable").into_response(),
        Reply::Garbage => "<html>not json</html>".into_response(),
        Reply::Stall(delay) => {
            tokio::time::sleep(delay).await;
            Json(serde_json::json!({ "success": true })).into_response()
        }
    }
}

/// Bind a mock siteverify endpoint on an ephemeral local port
pub async fn spawn_provider(reply: Reply) -> MockProvider {
    let calls = Arc::new(AtomicUsize::new(0));
    let forms = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/siteverify", post(siteverify))
        .with_state(MockState {
            reply,
            calls: calls.clone(),
            forms: forms.clone(),
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockProvider {
        url: format!("http://{addr}/siteverify"),
        calls,
        forms,
    }
}

/// Nothing listens here; connecting is refused immediately
pub const REFUSED_URL: &str = "http://127.0.0.1:9/siteverify";
