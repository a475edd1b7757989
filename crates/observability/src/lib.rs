use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    commands_total: AtomicU64,
    fallback_total: AtomicU64,
    handler_errors_total: AtomicU64,
    timers_fired_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub commands_total: u64,
    pub fallback_total: u64,
    pub handler_errors_total: u64,
    pub timers_fired_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_command(&self) {
        self.commands_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fallback(&self) {
        self.fallback_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_handler_error(&self) {
        self.handler_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_timer_fired(&self) {
        self.timers_fired_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let commands = self.commands_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            commands_total: commands,
            fallback_total: self.fallback_total.load(Ordering::Relaxed),
            handler_errors_total: self.handler_errors_total.load(Ordering::Relaxed),
            timers_fired_total: self.timers_fired_total.load(Ordering::Relaxed),
            avg_latency_millis: if commands == 0 {
                0.0
            } else {
                latency as f64 / commands as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,bosun_api=info,bosun_agent=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let metrics = AppMetrics::default();
        metrics.inc_command();
        metrics.inc_command();
        metrics.inc_fallback();
        metrics.observe_latency(Duration::from_millis(10));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.commands_total, 2);
        assert_eq!(snapshot.fallback_total, 1);
        assert!(snapshot.avg_latency_millis > 0.0);
    }
}
