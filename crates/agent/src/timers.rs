use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bosun_observability::AppMetrics;
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use serde::Serialize;
use tracing::info;

/// Where fired timers announce themselves. The CLI prints (the stand-in for
/// text-to-speech); tests capture.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Default notifier: structured log only.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        info!(message, "timer fired");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    Alarm,
    Reminder,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduledTimer {
    pub id: u64,
    pub kind: TimerKind,
    pub label: String,
    pub due: DateTime<Utc>,
}

struct TimerEntry {
    meta: ScheduledTimer,
    handle: tokio::task::JoinHandle<()>,
}

/// Registry of pending alarms and reminders. Every entry has an id, shows up
/// in [`list`](TimerRegistry::list), and can be cancelled before it fires;
/// timers are never detached fire-and-forget tasks.
pub struct TimerRegistry {
    entries: Arc<Mutex<HashMap<u64, TimerEntry>>>,
    next_id: AtomicU64,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<AppMetrics>,
}

impl TimerRegistry {
    pub fn new(notifier: Arc<dyn Notifier>, metrics: Arc<AppMetrics>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            notifier,
            metrics,
        }
    }

    /// Schedule a firing at `due`. Returns the registry entry, or None when
    /// `due` is not usefully in the future.
    pub fn schedule(
        &self,
        kind: TimerKind,
        label: impl Into<String>,
        due: DateTime<Utc>,
    ) -> Option<ScheduledTimer> {
        let delay = (due - Utc::now()).to_std().ok()?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let meta = ScheduledTimer {
            id,
            kind,
            label: label.into(),
            due,
        };

        let entries = Arc::clone(&self.entries);
        let notifier = Arc::clone(&self.notifier);
        let metrics = Arc::clone(&self.metrics);
        let fired = meta.clone();

        // Holding the lock across spawn+insert: a zero-delay task blocks on
        // this same lock before it can unregister itself.
        let mut guard = self.entries.lock();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            entries.lock().remove(&fired.id);
            metrics.inc_timer_fired();

            let local_time = fired.due.with_timezone(&Local).format("%I:%M %p");
            let message = match fired.kind {
                TimerKind::Alarm => {
                    format!("Time's up! {}! It's {} now.", fired.label, local_time)
                }
                TimerKind::Reminder => {
                    format!("Reminder: {}. It's {} now.", fired.label, local_time)
                }
            };
            notifier.notify(&message);
        });

        guard.insert(
            id,
            TimerEntry {
                meta: meta.clone(),
                handle,
            },
        );
        drop(guard);

        Some(meta)
    }

    /// Pending entries, soonest first.
    pub fn list(&self) -> Vec<ScheduledTimer> {
        let mut pending: Vec<ScheduledTimer> = self
            .entries
            .lock()
            .values()
            .map(|entry| entry.meta.clone())
            .collect();
        pending.sort_by_key(|entry| entry.due);
        pending
    }

    /// Abort and drop a pending entry. False when the id is unknown (or the
    /// timer already fired).
    pub fn cancel(&self, id: u64) -> bool {
        match self.entries.lock().remove(&id) {
            Some(entry) => {
                entry.handle.abort();
                true
            }
            None => false,
        }
    }
}

static CLOCK_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("valid clock regex"));

static RELATIVE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bin\s+(\d+)\s*(second|minute|hour)s?\b").expect("valid relative-time regex")
});

static AT_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bat\s+\d{1,2}:\d{2}\b").expect("valid at-clause regex"));

/// "07:30" → the next occurrence of that local wall-clock time (today, or
/// tomorrow when it already passed).
pub fn parse_clock_time(text: &str) -> Option<DateTime<Utc>> {
    let captures = CLOCK_TIME.captures(text)?;
    let hour: u32 = captures[1].parse().ok()?;
    let minute: u32 = captures[2].parse().ok()?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;

    let now = Local::now();
    let mut due = now.date_naive().and_time(time);
    if due <= now.naive_local() {
        due += ChronoDuration::days(1);
    }

    due.and_local_timezone(Local)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

/// Alarm grammar: an HH:MM anywhere in the text; whatever else is there
/// becomes the label.
pub fn parse_alarm(text: &str) -> Option<(String, DateTime<Utc>)> {
    let due = parse_clock_time(text)?;
    let label = {
        let stripped = CLOCK_TIME.replace(text, " ");
        let label = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        if label.is_empty() {
            "Alarm".to_string()
        } else {
            label
        }
    };
    Some((label, due))
}

/// Reminder grammar: "<label> in N minutes" or "<label> at HH:MM". The time
/// clause is removed from the label; an empty label becomes a generic one.
pub fn parse_reminder(text: &str) -> Option<(String, DateTime<Utc>)> {
    if let Some(captures) = RELATIVE_TIME.captures(text) {
        let amount: i64 = captures[1].parse().ok()?;
        let due = Utc::now()
            + match &captures[2] {
                "second" => ChronoDuration::seconds(amount),
                "minute" => ChronoDuration::minutes(amount),
                _ => ChronoDuration::hours(amount),
            };
        let label = clean_label(&RELATIVE_TIME.replace(text, " "));
        return Some((label, due));
    }

    if AT_CLAUSE.is_match(text) {
        let due = parse_clock_time(text)?;
        let label = clean_label(&AT_CLAUSE.replace(text, " "));
        return Some((label, due));
    }

    None
}

fn clean_label(text: &str) -> String {
    let label = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if label.is_empty() {
        "check your schedule".to_string()
    } else {
        label
    }
}
