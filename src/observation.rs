use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Structured record produced by a timer, formatting is left to the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// A single event ran longer than the limit given at start
    ThresholdExceeded {
        topic: String,
        event_name: String,
        elapsed: Duration,
        limit: Duration,
    },
    /// Total accumulated for a topic, tagged with a caller label
    Summary {
        topic: String,
        label: String,
        total_elapsed: Duration,
    },
    /// An event was stopped
    EventCompleted {
        topic: String,
        event_name: String,
        elapsed: Duration,
        total_elapsed: Duration,
    },
    /// Total reached right before the topic was reset
    Reset {
        topic: String,
        total_elapsed: Duration,
    },
}

impl Observation {
    pub fn topic(&self) -> &str {
        match self {
            Observation::ThresholdExceeded { topic, .. }
            | Observation::Summary { topic, .. }
            | Observation::EventCompleted { topic, .. }
            | Observation::Reset { topic, .. } => topic,
        }
    }

    pub fn is_threshold_exceeded(&self) -> bool {
        matches!(self, Observation::ThresholdExceeded { .. })
    }
}

/// Receiver of timer observations. Must not block the caller for long.
pub trait ObservationSink: Send + Sync {
    fn observe(&self, observation: Observation);
}

/// Forwards observations to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ObservationSink for LogSink {
    fn observe(&self, observation: Observation) {
        match observation {
            Observation::ThresholdExceeded {
                topic,
                event_name,
                elapsed,
                limit,
            } => log::warn!(
                "PerformanceMonitor:({topic}): Warning: {event_name} duration: {:.6}s exceeds limit of {:.6}s.",
                elapsed.as_secs_f64(),
                limit.as_secs_f64()
            ),
            Observation::Summary {
                topic,
                label,
                total_elapsed,
            } => log::info!(
                "PerformanceMonitor:({topic}): [{label}] totalTime {:.6}s",
                total_elapsed.as_secs_f64()
            ),
            Observation::EventCompleted {
                topic,
                event_name,
                elapsed,
                total_elapsed,
            } => log::debug!(
                "PerformanceMonitor:({topic}): {event_name} duration: {:.6}s. totalTime {:.6}s",
                elapsed.as_secs_f64(),
                total_elapsed.as_secs_f64()
            ),
            Observation::Reset {
                topic,
                total_elapsed,
            } => log::info!(
                "PerformanceMonitor:({topic}): reset({:.6}s)",
                total_elapsed.as_secs_f64()
            ),
        }
    }
}

/// Keeps every observation in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    observations: Mutex<Vec<Observation>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn threshold_warnings(&self) -> Vec<Observation> {
        self.observations()
            .into_iter()
            .filter(Observation::is_threshold_exceeded)
            .collect()
    }

    pub fn clear(&self) {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ObservationSink for MemorySink {
    fn observe(&self, observation: Observation) {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observation);
    }
}
