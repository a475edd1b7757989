use std::collections::{HashMap, VecDeque};
use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use bosun_agent::{AgentConfig, Assistant, LogNotifier};
use bosun_core::Reply;
use bosun_observability::AppMetrics;
use bosun_storage::Store;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// One in-flight command at a time: the assistant keeps a conversation log,
/// so concurrent requests must serialize on it rather than interleave.
type SharedAssistant = Arc<tokio::sync::Mutex<Assistant<Store>>>;

#[derive(Clone)]
pub struct ApiState {
    assistant: SharedAssistant,
    metrics: Arc<AppMetrics>,
    limiter: RequestWindowLimiter,
}

/// Sliding-window request limiter keyed by caller. Over-limit chats still
/// answer inside the fixed 200 envelope; the chat contract admits no other
/// status code.
#[derive(Clone)]
pub struct RequestWindowLimiter {
    windows: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    window: Duration,
    max_requests: usize,
}

impl RequestWindowLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            window,
            max_requests,
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut guard = self.windows.lock();
        let timestamps = guard.entry(key.to_string()).or_default();

        while timestamps
            .front()
            .is_some_and(|first| now.duration_since(*first) > self.window)
        {
            timestamps.pop_front();
        }

        if timestamps.len() >= self.max_requests {
            return false;
        }
        timestamps.push_back(now);
        true
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: bosun_observability::MetricsSnapshot,
}

pub async fn build_app() -> Result<Router> {
    let metrics = AppMetrics::shared();
    let config = AgentConfig::from_env();

    let store = if env::var("BOSUN_STORAGE_DIR").is_ok() {
        Store::json_dir(&config.storage_dir)?
    } else {
        Store::memory()
    };

    let assistant = Assistant::new(
        Arc::new(store),
        metrics.clone(),
        Arc::new(LogNotifier),
        config,
    )
    .context("failed to construct assistant")?;

    let window = Duration::from_secs(
        env::var("BOSUN_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60),
    );
    let max_requests = env::var("BOSUN_RATE_LIMIT_MAX")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(60);

    let state = ApiState {
        assistant: Arc::new(tokio::sync::Mutex::new(assistant)),
        metrics,
        limiter: RequestWindowLimiter::new(window, max_requests),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat).fallback(chat_wrong_method))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

/// The chat contract: HTTP 200 with `{"response", "status"}` for every POST,
/// including malformed bodies and internal failures; only a non-POST method
/// earns a 400. The body is parsed by hand so a bad payload cannot surface as
/// a framework rejection code.
async fn chat(State(state): State<ApiState>, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let caller = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("local")
        .to_string();

    if !state.limiter.allow(&caller) {
        return envelope("You're sending messages too quickly. Give me a moment.", "error");
    }

    let input: ChatRequest = match serde_json::from_slice(&body) {
        Ok(input) => input,
        Err(error) => {
            return envelope(&format!("Error: {error}"), "error");
        }
    };

    let assistant = state.assistant.lock().await;
    match assistant.handle_command(&input.message).await {
        Ok(Reply::Text(text)) => envelope(&text, "success"),
        Ok(Reply::StandBy) => envelope("Going to stand-by.", "success"),
        // The HTTP surface never terminates the process; the control signal
        // degrades to a farewell.
        Ok(Reply::Shutdown) => envelope("Goodbye.", "success"),
        Err(error) => {
            tracing::error!(%error, "chat command failed");
            envelope(&format!("Error: {error}"), "error")
        }
    }
}

async fn chat_wrong_method() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(ChatResponse {
            response: "Invalid request".to_string(),
            status: "error",
        }),
    )
}

fn envelope(response: &str, status: &'static str) -> (StatusCode, Json<ChatResponse>) {
    (
        StatusCode::OK,
        Json(ChatResponse {
            response: response.to_string(),
            status,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_enforces_the_window() {
        let limiter = RequestWindowLimiter::new(Duration::from_secs(60), 2);
        assert!(limiter.allow("a"));
        assert!(limiter.allow("a"));
        assert!(!limiter.allow("a"));
        // Separate callers have separate windows.
        assert!(limiter.allow("b"));
    }
}
