use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime knobs, read once from the environment at construction time.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub storage_dir: PathBuf,
    pub genai_api_key: Option<String>,
    pub genai_model: String,
    pub genai_url: String,
    pub weather_url: String,
    pub wiki_url: String,
    pub math_fallback_url: String,
    pub facts_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl AgentConfig {
    pub fn from_env() -> Self {
        Self {
            storage_dir: env::var("BOSUN_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("bosun-data")),
            genai_api_key: env::var("BOSUN_GENAI_API_KEY")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            genai_model: env::var("BOSUN_GENAI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            genai_url: env::var("BOSUN_GENAI_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            weather_url: env::var("BOSUN_WEATHER_URL")
                .unwrap_or_else(|_| "https://wttr.in".to_string()),
            wiki_url: env::var("BOSUN_WIKI_URL").unwrap_or_else(|_| {
                "https://en.wikipedia.org/api/rest_v1/page/summary".to_string()
            }),
            math_fallback_url: env::var("BOSUN_MATH_FALLBACK_URL")
                .unwrap_or_else(|_| "https://api.mathjs.org/v4".to_string()),
            facts_url: env::var("BOSUN_FACTS_URL")
                .unwrap_or_else(|_| "https://uselessfacts.jsph.pl/api/v2/facts/random".to_string()),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(8),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
