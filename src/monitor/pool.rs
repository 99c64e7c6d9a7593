use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::monitor::timer::EventTimer;
use crate::observation::{LogSink, ObservationSink};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Owns one [`EventTimer`] per topic.
///
/// Timers are created on first request and live as long as the registry.
/// Writing the enabled flag propagates it to every pooled timer; timers
/// created afterwards start with the current value.
pub struct TimerRegistry {
    enabled: AtomicBool,
    timers: Mutex<HashMap<String, Arc<EventTimer>>>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn ObservationSink>,
}

impl TimerRegistry {
    pub fn new(enabled: bool) -> Self {
        Self::with_collaborators(enabled, Arc::new(SystemClock), Arc::new(LogSink))
    }

    /// Every timer handed out shares `clock` and `sink`
    pub fn with_collaborators(
        enabled: bool,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn ObservationSink>,
    ) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            timers: Mutex::new(HashMap::new()),
            clock,
            sink,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.enabled)
    }

    /// Gets or creates the timer for `topic`
    pub fn timer_for_topic(&self, topic: &str) -> Arc<EventTimer> {
        let mut timers = self.lock();
        if let Some(timer) = timers.get(topic) {
            return timer.clone();
        }
        log::debug!("creating timer for topic [{topic}]");
        let timer = Arc::new(EventTimer::with_collaborators(
            topic,
            self.is_enabled(),
            self.clock.clone(),
            self.sink.clone(),
        ));
        timers.insert(topic.to_string(), timer.clone());
        timer
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Stores the flag and applies it to every pooled timer.
    /// Holds the pool lock so a concurrent lookup cannot create a timer with the old value.
    pub fn set_enabled(&self, enabled: bool) {
        let timers = self.lock();
        self.enabled.store(enabled, Ordering::SeqCst);
        for timer in timers.values() {
            timer.set_enabled(enabled);
        }
    }

    /// Pooled topics, sorted
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.lock().keys().cloned().collect();
        topics.sort();
        topics
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<EventTimer>>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TimerRegistry {
    fn default() -> Self {
        TimerRegistry::new(true)
    }
}

impl std::fmt::Debug for TimerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerRegistry")
            .field("enabled", &self.is_enabled())
            .field("topics", &self.topics())
            .finish()
    }
}
