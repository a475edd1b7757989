pub mod config;
mod facts;
mod files;
mod genai;
mod jokes;
mod math_handler;
mod messaging;
mod tasks;
pub mod timers;
mod weather;
mod wiki;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use bosun_core::{
    fallback_reply, help_text, route, Intent, MemoryDocument, Reply, Role, RouteDecision,
};
use bosun_observability::AppMetrics;
use bosun_storage::{ContactsRepository, MemoryRepository, TaskRepository};
use chrono::{Local, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tracing::{info, instrument, warn};

pub use config::AgentConfig;
pub use genai::{GenerativeClient, ERROR_NOTICE, OFFLINE_NOTICE};
pub use messaging::{LinkGateway, MessageGateway};
pub use timers::{LogNotifier, Notifier, ScheduledTimer, TimerKind, TimerRegistry};

use files::FileVault;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").expect("valid digits regex"));

/// The assistant: routes one utterance at a time, keeps the conversation log,
/// and owns the timer registry. Storage backends plug in through the
/// repository traits.
pub struct Assistant<S>
where
    S: MemoryRepository + TaskRepository + ContactsRepository,
{
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
    timers: TimerRegistry,
    vault: FileVault,
    gateway: Box<dyn MessageGateway>,
    genai: GenerativeClient,
    http: Client,
    config: AgentConfig,
}

impl<S> Assistant<S>
where
    S: MemoryRepository + TaskRepository + ContactsRepository,
{
    pub fn new(
        store: Arc<S>,
        metrics: Arc<AppMetrics>,
        notifier: Arc<dyn Notifier>,
        config: AgentConfig,
    ) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")?;

        let vault = FileVault::open(config.storage_dir.join("files"))?;
        let genai = GenerativeClient::new(
            http.clone(),
            config.genai_url.clone(),
            config.genai_model.clone(),
            config.genai_api_key.clone(),
        );

        Ok(Self {
            store,
            metrics: metrics.clone(),
            timers: TimerRegistry::new(notifier, metrics),
            vault,
            gateway: Box::new(LinkGateway),
            genai,
            http,
            config,
        })
    }

    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Route one utterance and produce a reply. Both sides of the exchange are
    /// appended to the capped conversation log; control replies are not.
    #[instrument(skip(self, utterance))]
    pub async fn handle_command(&self, utterance: &str) -> Result<Reply> {
        let started = Instant::now();
        self.metrics.inc_command();

        let decision = route(utterance);
        let mut memory = self.store.load_memory()?;
        memory.push_turn(Role::User, utterance.trim());

        let reply = self.dispatch(&decision, utterance, &mut memory).await;

        if let Reply::Text(text) = &reply {
            memory.push_turn(Role::Assistant, text.clone());
        }
        self.store.save_memory(&memory)?;

        self.metrics.observe_latency(started.elapsed());
        info!(
            intent = ?decision.intent,
            latency_ms = started.elapsed().as_millis() as u64,
            "command handled"
        );

        Ok(reply)
    }

    async fn dispatch(
        &self,
        decision: &RouteDecision,
        original: &str,
        memory: &mut MemoryDocument,
    ) -> Reply {
        let remainder = decision.remainder.as_str();

        match decision.intent {
            Intent::Shutdown => Reply::Shutdown,
            Intent::StandBy => Reply::StandBy,
            Intent::Help => Reply::Text(help_text()),

            Intent::Remember => Reply::Text(facts::remember(memory, remainder)),
            Intent::Recall => match facts::recall(memory, remainder) {
                Some(answer) => Reply::Text(answer),
                None => Reply::Text(self.generative_fallback(original, memory).await),
            },

            Intent::Derivative => Reply::Text(self.apologize(
                math_handler::derivative_reply(remainder),
                "I had trouble computing that derivative. Make sure the expression is valid.",
            )),
            Intent::Integral => Reply::Text(self.apologize(
                math_handler::integral_reply(remainder),
                "I couldn't compute that integral.",
            )),
            Intent::Solve => Reply::Text(self.apologize(
                math_handler::solve_reply(remainder),
                "I couldn't solve that equation. Please check the format.",
            )),
            Intent::Arithmetic => Reply::Text(self.apologize(
                math_handler::arithmetic_reply(
                    &self.http,
                    &self.config.math_fallback_url,
                    remainder,
                )
                .await,
                "I could not evaluate that expression.",
            )),

            Intent::Encyclopedia => {
                let result = wiki::summary(&self.http, &self.config.wiki_url, remainder).await;
                Reply::Text(self.apologize(
                    result,
                    &format!("Couldn't find anything about {remainder}."),
                ))
            }
            Intent::Weather => {
                let result =
                    weather::weather_line(&self.http, &self.config.weather_url, remainder).await;
                Reply::Text(
                    self.apologize(result, "I could not retrieve weather data at this time."),
                )
            }

            Intent::AddTask => Reply::Text(self.apologize(
                tasks::add_task(self.store.as_ref(), remainder),
                "I couldn't save that task.",
            )),
            Intent::ListTasks => Reply::Text(self.apologize(
                tasks::list_tasks(self.store.as_ref()),
                "I couldn't read the task list.",
            )),
            Intent::CompleteTask => {
                let id_part = first_number(remainder).unwrap_or_default();
                Reply::Text(self.apologize(
                    tasks::complete_task(self.store.as_ref(), &id_part),
                    "I couldn't update the task list.",
                ))
            }

            Intent::SetAlarm => Reply::Text(self.set_alarm(remainder)),
            Intent::SetReminder => Reply::Text(self.set_reminder(remainder)),
            Intent::ListTimers => Reply::Text(self.list_timers()),
            Intent::CancelTimer => Reply::Text(self.cancel_timer(remainder)),

            Intent::CreateFile => Reply::Text(self.file_op(self.vault.create(remainder))),
            Intent::OpenFile => Reply::Text(self.file_op(self.vault.read(remainder))),
            Intent::DeleteFile => Reply::Text(self.file_op(self.vault.delete(remainder))),

            Intent::SendMessage => {
                let contacts = self.store.load_contacts().unwrap_or_default();
                match messaging::send_message(self.gateway.as_ref(), &contacts, remainder) {
                    Ok(text) => Reply::Text(text),
                    Err(error) => Reply::Text(format!("Can't send that: {error}.")),
                }
            }

            Intent::Joke => Reply::Text(self.tell_joke(original).await),

            Intent::Fallback => Reply::Text(self.generative_fallback(original, memory).await),
        }
    }

    /// Generative fallback with the recent conversation as context. When the
    /// service is offline or failing, the static small-talk table answers and
    /// the fallback counter ticks.
    async fn generative_fallback(&self, original: &str, memory: &MemoryDocument) -> String {
        // The current user turn is already in the log; don't replay it twice.
        let history = &memory.conversations[..memory.conversations.len().saturating_sub(1)];
        let reply = self.genai.complete(original.trim(), history).await;

        if GenerativeClient::is_unavailable(&reply) {
            self.metrics.inc_fallback();
            return fallback_reply(original);
        }
        reply
    }

    fn set_alarm(&self, remainder: &str) -> String {
        let Some((label, due)) = timers::parse_alarm(remainder) else {
            return "Couldn't parse the alarm time. Use HH:MM, like 07:30.".to_string();
        };

        match self.timers.schedule(TimerKind::Alarm, label, due) {
            Some(entry) => format!(
                "Alarm {} set for {}.",
                entry.id,
                entry.due.with_timezone(&Local).format("%I:%M %p")
            ),
            None => "That time is already in the past.".to_string(),
        }
    }

    fn set_reminder(&self, remainder: &str) -> String {
        let Some((label, due)) = timers::parse_reminder(remainder) else {
            return "Couldn't understand the reminder time. \
                    Try 'remind me to stretch in 10 minutes' or 'at 18:30'."
                .to_string();
        };

        if (due - Utc::now()).num_seconds() <= 10 {
            return "That time is either in the past or too soon.".to_string();
        }

        match self.timers.schedule(TimerKind::Reminder, label.clone(), due) {
            Some(entry) => format!(
                "Reminder {} set for {} to: {}",
                entry.id,
                entry.due.with_timezone(&Local).format("%Y-%m-%d %I:%M %p"),
                label
            ),
            None => "That time is already in the past.".to_string(),
        }
    }

    fn list_timers(&self) -> String {
        let pending = self.timers.list();
        if pending.is_empty() {
            return "No pending alarms or reminders.".to_string();
        }

        let lines: Vec<String> = pending
            .iter()
            .map(|entry| {
                let kind = match entry.kind {
                    TimerKind::Alarm => "alarm",
                    TimerKind::Reminder => "reminder",
                };
                format!(
                    "ID {}: {} at {} ({})",
                    entry.id,
                    kind,
                    entry.due.with_timezone(&Local).format("%I:%M %p"),
                    entry.label
                )
            })
            .collect();
        lines.join(". ")
    }

    fn cancel_timer(&self, remainder: &str) -> String {
        let Some(id) = first_number(remainder).and_then(|digits| digits.parse::<u64>().ok())
        else {
            return "Which one? Say: cancel timer <id>.".to_string();
        };

        if self.timers.cancel(id) {
            format!("Cancelled timer {id}.")
        } else {
            format!("No pending timer with ID {id}.")
        }
    }

    async fn tell_joke(&self, original: &str) -> String {
        if original.to_lowercase().contains("fun fact") {
            match jokes::random_fact(&self.http, &self.config.facts_url).await {
                Ok(fact) => return fact,
                Err(error) => {
                    self.metrics.inc_handler_error();
                    warn!(%error, "facts service failed, telling a joke instead");
                }
            }
        }

        jokes::local_joke(Utc::now().timestamp_millis() as usize).to_string()
    }

    fn file_op(&self, result: Result<String>) -> String {
        match result {
            Ok(text) => text,
            Err(error) => {
                self.metrics.inc_handler_error();
                format!("Couldn't do that: {error}.")
            }
        }
    }

    fn apologize(&self, result: Result<String>, apology: &str) -> String {
        match result {
            Ok(text) => text,
            Err(error) => {
                self.metrics.inc_handler_error();
                warn!(%error, "handler failed");
                apology.to_string()
            }
        }
    }
}

fn first_number(text: &str) -> Option<String> {
    DIGITS
        .captures(text)
        .map(|captures| captures[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bosun_core::CONVERSATION_LIMIT;
    use bosun_storage::MemoryStore;

    static DIR_SEQ: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(0);

    fn assistant() -> Assistant<MemoryStore> {
        let mut config = AgentConfig::from_env();
        // Point every external service at a dead port so tests stay offline.
        config.genai_api_key = None;
        config.weather_url = "http://127.0.0.1:9".to_string();
        config.wiki_url = "http://127.0.0.1:9".to_string();
        config.math_fallback_url = "http://127.0.0.1:9".to_string();
        config.facts_url = "http://127.0.0.1:9".to_string();
        config.storage_dir = std::env::temp_dir().join(format!(
            "bosun-agent-test-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
        ));
        config.connect_timeout = std::time::Duration::from_millis(100);
        config.request_timeout = std::time::Duration::from_millis(200);

        Assistant::new(
            Arc::new(MemoryStore::new()),
            AppMetrics::shared(),
            Arc::new(LogNotifier),
            config,
        )
        .expect("assistant should build")
    }

    async fn text_of(assistant: &Assistant<MemoryStore>, utterance: &str) -> String {
        match assistant.handle_command(utterance).await.unwrap() {
            Reply::Text(text) => text,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn remember_then_recall_end_to_end() {
        let assistant = assistant();
        let saved = text_of(&assistant, "remember color is blue").await;
        assert_eq!(saved, "Saved: color equals blue");

        let recalled = text_of(&assistant, "what is color").await;
        assert_eq!(recalled, "color is blue.");
    }

    #[tokio::test]
    async fn arithmetic_routes_through_what_is() {
        let assistant = assistant();
        let reply = text_of(&assistant, "what is 5 plus 3").await;
        assert_eq!(reply, "The result is 8.");
    }

    #[tokio::test]
    async fn derivative_command_end_to_end() {
        let assistant = assistant();
        let reply = text_of(&assistant, "derivative of x^2").await;
        assert!(reply.contains("2*x"));
    }

    #[tokio::test]
    async fn solve_command_end_to_end() {
        let assistant = assistant();
        let reply = text_of(&assistant, "solve x^2 = 9").await;
        assert!(reply.contains("-3"));
    }

    #[tokio::test]
    async fn control_replies_are_not_logged() {
        let assistant = assistant();
        let reply = assistant.handle_command("sleep").await.unwrap();
        assert_eq!(reply, Reply::StandBy);

        let memory = assistant.store().load_memory().unwrap();
        // The user's words are logged, the control signal is not.
        assert_eq!(memory.conversations.len(), 1);
        assert_eq!(memory.conversations[0].text, "sleep");
    }

    #[tokio::test]
    async fn conversation_log_stays_capped() {
        let assistant = assistant();
        for n in 0..15 {
            let _ = text_of(&assistant, &format!("add task item {n}")).await;
        }

        let memory = assistant.store().load_memory().unwrap();
        assert_eq!(memory.conversations.len(), CONVERSATION_LIMIT);
    }

    #[tokio::test]
    async fn offline_fallback_uses_smalltalk_table() {
        let assistant = assistant();
        assert!(text_of(&assistant, "hello").await.contains("Bosun"));
        assert!(text_of(&assistant, "how are you").await.contains("charge"));
        assert!(text_of(&assistant, "zzz unknown zzz")
            .await
            .contains("didn't catch"));
        assert!(assistant.metrics().snapshot().fallback_total >= 3);
    }

    #[tokio::test]
    async fn weather_failure_becomes_apology() {
        let assistant = assistant();
        let reply = text_of(&assistant, "weather in paris").await;
        assert_eq!(reply, "I could not retrieve weather data at this time.");
        assert_eq!(assistant.metrics().snapshot().handler_errors_total, 1);
    }

    #[tokio::test]
    async fn task_flow_end_to_end() {
        let assistant = assistant();
        let added = text_of(&assistant, "add task buy milk").await;
        assert_eq!(added, "Added task: buy milk");

        let listing = text_of(&assistant, "list tasks").await;
        assert!(listing.contains("buy milk"));

        let id = assistant.store().load_tasks().unwrap()[0].id.to_string();
        let suffix = &id[id.len() - 4..];
        let done = text_of(&assistant, &format!("mark task {suffix} done")).await;
        assert!(done.contains("as done"));
    }

    #[tokio::test]
    async fn reminder_lifecycle_via_commands() {
        let assistant = assistant();
        let set = text_of(&assistant, "remind me to stretch in 30 minutes").await;
        assert!(set.contains("stretch"));

        let listing = text_of(&assistant, "list timers").await;
        assert!(listing.contains("stretch"));

        let cancelled = text_of(&assistant, "cancel timer 1").await;
        assert!(cancelled.contains("Cancelled"));
        assert!(text_of(&assistant, "list timers").await.contains("No pending"));
    }

    #[tokio::test]
    async fn file_commands_are_sandboxed() {
        let assistant = assistant();
        let created = text_of(&assistant, "create file notes.txt").await;
        assert!(created.contains("Created"));

        let escape = text_of(&assistant, "delete file ../../etc/passwd").await;
        assert!(escape.contains("Couldn't do that"));
    }
}
