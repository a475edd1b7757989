use bosun_core::{ConversationTurn, Role};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

/// Sentinel returned when no API key is configured. The orchestrator matches
/// on it to decide that the static small-talk table should answer instead.
pub const OFFLINE_NOTICE: &str = "The AI core is offline (no API key configured).";

/// Sentinel returned when the service call itself failed.
pub const ERROR_NOTICE: &str = "My connection to the AI service is failing right now.";

/// How many recent turns are replayed as context.
const HISTORY_WINDOW: usize = 5;

pub struct GenerativeClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerativeClient {
    pub fn new(http: Client, base_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url,
            model,
            api_key,
        }
    }

    pub fn is_unavailable(reply: &str) -> bool {
        reply == OFFLINE_NOTICE || reply == ERROR_NOTICE
    }

    /// History-aware completion. Never errors: unavailability comes back as
    /// one of the sentinel strings for the caller to interpret.
    pub async fn complete(&self, prompt: &str, history: &[ConversationTurn]) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            return OFFLINE_NOTICE.to_string();
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );

        let body = json!({
            "systemInstruction": {
                "parts": [{
                    "text": "You are Bosun, a helpful assistant. Keep responses concise. \
                             Only answer when the request cannot be handled by a specific tool."
                }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_prompt(prompt, history) }]
            }]
        });

        let response = match self.http.post(&url).json(&body).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(status = %response.status(), "generative service rejected the request");
                return ERROR_NOTICE.to_string();
            }
            Err(error) => {
                warn!(%error, "generative service unreachable");
                return ERROR_NOTICE.to_string();
            }
        };

        match response.json::<GenerateResponse>().await {
            Ok(payload) => payload
                .candidates
                .first()
                .and_then(|candidate| candidate.content.parts.first())
                .map(|part| part.text.trim().to_string())
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| ERROR_NOTICE.to_string()),
            Err(error) => {
                warn!(%error, "generative service returned an unreadable payload");
                ERROR_NOTICE.to_string()
            }
        }
    }
}

fn build_prompt(prompt: &str, history: &[ConversationTurn]) -> String {
    let mut text = String::new();
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    for turn in &history[start..] {
        let role = match turn.role {
            Role::User => "User",
            Role::Assistant => "Model",
        };
        text.push_str(&format!("{role}: {}\n", turn.text));
    }
    text.push_str(&format!("User: {prompt}\nModel:"));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn missing_key_returns_offline_sentinel() {
        let client = GenerativeClient::new(
            Client::new(),
            "http://127.0.0.1:9".to_string(),
            "test-model".to_string(),
            None,
        );
        let reply = client.complete("hello", &[]).await;
        assert_eq!(reply, OFFLINE_NOTICE);
        assert!(GenerativeClient::is_unavailable(&reply));
    }

    #[tokio::test]
    async fn unreachable_service_returns_error_sentinel() {
        let client = GenerativeClient::new(
            Client::new(),
            "http://127.0.0.1:9".to_string(),
            "test-model".to_string(),
            Some("key".to_string()),
        );
        let reply = client.complete("hello", &[]).await;
        assert_eq!(reply, ERROR_NOTICE);
    }

    #[test]
    fn prompt_includes_recent_history_only() {
        let turns: Vec<ConversationTurn> = (0..8)
            .map(|n| ConversationTurn {
                at: Utc::now(),
                role: Role::User,
                text: format!("line {n}"),
            })
            .collect();

        let prompt = build_prompt("now", &turns);
        assert!(!prompt.contains("line 2"));
        assert!(prompt.contains("line 3"));
        assert!(prompt.contains("line 7"));
        assert!(prompt.ends_with("User: now\nModel:"));
    }
}
