use crate::clock::{elapsed_between, Clock, SystemClock};
use crate::observation::{LogSink, Observation, ObservationSink};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct TimerState {
    start_times: HashMap<String, DateTime<Utc>>,
    event_limits: HashMap<String, Duration>,
    total_elapsed: Duration,
}

impl TimerState {
    /// Removes the event and folds its duration into the total.
    /// Observations are collected so they can be emitted after unlocking.
    fn finish(
        &mut self,
        topic: &str,
        event_name: &str,
        now: DateTime<Utc>,
        out: &mut Vec<Observation>,
    ) {
        let Some(from) = self.start_times.remove(event_name) else {
            return;
        };
        let limit = self.event_limits.remove(event_name);
        let elapsed = elapsed_between(from, now);
        if let Some(limit) = limit {
            if elapsed > limit {
                out.push(Observation::ThresholdExceeded {
                    topic: topic.to_string(),
                    event_name: event_name.to_string(),
                    elapsed,
                    limit,
                });
            }
        }
        self.total_elapsed += elapsed;
        out.push(Observation::EventCompleted {
            topic: topic.to_string(),
            event_name: event_name.to_string(),
            elapsed,
            total_elapsed: self.total_elapsed,
        });
    }
}

/// Records durations of named events within one topic.
///
/// Time is measured between [`EventTimer::start`] and [`EventTimer::stop`],
/// and every completed event is added to the topic total. Misuse (stop
/// without start, start twice) never fails: it is absorbed as a no-op or an
/// overwrite so the instrumented code path is not affected.
pub struct EventTimer {
    topic: String,
    enabled: AtomicBool,
    state: Mutex<TimerState>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn ObservationSink>,
}

impl EventTimer {
    /// Constructs a new instance of [`EventTimer`] on the wall clock, logging through `log`.
    pub fn new(topic: impl Into<String>, enabled: bool) -> Self {
        Self::with_collaborators(topic, enabled, Arc::new(SystemClock), Arc::new(LogSink))
    }

    pub fn with_collaborators(
        topic: impl Into<String>,
        enabled: bool,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn ObservationSink>,
    ) -> Self {
        Self {
            topic: topic.into(),
            enabled: AtomicBool::new(enabled),
            state: Mutex::new(TimerState::default()),
            clock,
            sink,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Starts timing `event_name`.
    ///
    /// A start that was never stopped is replaced and contributes nothing.
    /// Without a `time_limit` any limit left from an earlier start is dropped.
    pub fn start(&self, event_name: impl Into<String>, time_limit: Option<Duration>) {
        if !self.is_enabled() {
            return;
        }
        let event_name = event_name.into();
        let now = self.clock.now();
        let mut state = self.lock();
        match time_limit {
            Some(limit) => state.event_limits.insert(event_name.clone(), limit),
            None => state.event_limits.remove(&event_name),
        };
        state.start_times.insert(event_name, now);
    }

    /// Stops timing `event_name` and adds its duration to the total.
    /// Does nothing if the event is not running.
    pub fn stop(&self, event_name: &str) {
        if !self.is_enabled() {
            return;
        }
        let now = self.clock.now();
        let mut out = Vec::new();
        self.lock().finish(&self.topic, event_name, now, &mut out);
        self.emit(out);
    }

    /// Stops every running event, then clears the total
    pub fn reset(&self) {
        if !self.is_enabled() {
            return;
        }
        let now = self.clock.now();
        let mut out = Vec::new();
        {
            let mut state = self.lock();
            let running: Vec<String> = state.start_times.keys().cloned().collect();
            for event_name in running {
                state.finish(&self.topic, &event_name, now, &mut out);
            }
            out.push(Observation::Reset {
                topic: self.topic.clone(),
                total_elapsed: state.total_elapsed,
            });
            state.total_elapsed = Duration::ZERO;
        }
        self.emit(out);
    }

    /// Reports the topic total. `label` only tags the output.
    pub fn log_summary(&self, label: &str) {
        let total_elapsed = self.total_elapsed();
        self.sink.observe(Observation::Summary {
            topic: self.topic.clone(),
            label: label.to_string(),
            total_elapsed,
        });
    }

    pub fn total_elapsed(&self) -> Duration {
        self.lock().total_elapsed
    }

    pub fn total_elapsed_secs(&self) -> f64 {
        self.total_elapsed().as_secs_f64()
    }

    pub fn is_running(&self, event_name: &str) -> bool {
        self.lock().start_times.contains_key(event_name)
    }

    pub fn running_count(&self) -> usize {
        self.lock().start_times.len()
    }

    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, observations: Vec<Observation>) {
        for observation in observations {
            self.sink.observe(observation);
        }
    }
}

impl std::fmt::Debug for EventTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTimer")
            .field("topic", &self.topic)
            .field("enabled", &self.is_enabled())
            .field("total_elapsed", &self.total_elapsed())
            .field("running", &self.running_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::observation::MemorySink;

    fn timer(enabled: bool) -> (EventTimer, Arc<ManualClock>, Arc<MemorySink>) {
        let clock = Arc::new(ManualClock::default());
        let sink = Arc::new(MemorySink::new());
        let t = EventTimer::with_collaborators("checkout", enabled, clock.clone(), sink.clone());
        (t, clock, sink)
    }

    #[test]
    fn test_start_stop_accumulates() {
        let (t, clock, _) = timer(true);
        t.start("render", None);
        clock.advance(Duration::from_millis(40));
        t.stop("render");
        t.start("layout", None);
        clock.advance(Duration::from_millis(15));
        t.stop("layout");
        assert_eq!(t.total_elapsed(), Duration::from_millis(55));
        assert_eq!(t.running_count(), 0);
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let (t, clock, sink) = timer(true);
        clock.advance(Duration::from_secs(1));
        t.stop("never-started");
        assert_eq!(t.total_elapsed(), Duration::ZERO);
        assert!(sink.observations().is_empty());
    }

    #[test]
    fn test_restart_discards_previous_start() {
        let (t, clock, _) = timer(true);
        t.start("fetch", None);
        clock.advance(Duration::from_millis(100));
        t.start("fetch", None);
        clock.advance(Duration::from_millis(20));
        t.stop("fetch");
        assert_eq!(t.total_elapsed(), Duration::from_millis(20));
    }

    #[test]
    fn test_threshold_exceeded_once() {
        let (t, clock, sink) = timer(true);
        t.start("e", Some(Duration::from_millis(10)));
        clock.advance(Duration::from_millis(25));
        t.stop("e");
        let warnings = sink.threshold_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0],
            Observation::ThresholdExceeded {
                topic: "checkout".to_string(),
                event_name: "e".to_string(),
                elapsed: Duration::from_millis(25),
                limit: Duration::from_millis(10),
            }
        );
    }

    #[test]
    fn test_threshold_not_exceeded() {
        let (t, clock, sink) = timer(true);
        t.start("e", Some(Duration::from_millis(10)));
        clock.advance(Duration::from_millis(5));
        t.stop("e");
        assert!(sink.threshold_warnings().is_empty());
        // exactly at the limit is not over it
        t.start("e", Some(Duration::from_millis(10)));
        clock.advance(Duration::from_millis(10));
        t.stop("e");
        assert!(sink.threshold_warnings().is_empty());
    }

    #[test]
    fn test_restart_without_limit_clears_limit() {
        let (t, clock, sink) = timer(true);
        t.start("e", Some(Duration::from_millis(1)));
        t.start("e", None);
        clock.advance(Duration::from_millis(50));
        t.stop("e");
        assert!(sink.threshold_warnings().is_empty());
    }

    #[test]
    fn test_reset_stops_running_and_zeroes() {
        let (t, clock, sink) = timer(true);
        t.start("a", None);
        t.start("b", Some(Duration::from_millis(5)));
        clock.advance(Duration::from_millis(30));
        t.stop("a");
        clock.advance(Duration::from_millis(10));
        t.reset();
        assert_eq!(t.total_elapsed(), Duration::ZERO);
        assert!(!t.is_running("b"));
        // b was stopped by reset, and it ran past its limit
        assert_eq!(sink.threshold_warnings().len(), 1);
        let last = sink.observations().pop();
        assert_eq!(
            last,
            Some(Observation::Reset {
                topic: "checkout".to_string(),
                total_elapsed: Duration::from_millis(70),
            })
        );
        clock.advance(Duration::from_millis(10));
        t.stop("b");
        assert_eq!(t.total_elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_disabled_timer_is_noop() {
        let (t, clock, sink) = timer(false);
        t.start("e", Some(Duration::from_millis(1)));
        clock.advance(Duration::from_secs(2));
        t.stop("e");
        t.reset();
        assert_eq!(t.total_elapsed(), Duration::ZERO);
        assert!(!t.is_running("e"));
        assert!(sink.observations().is_empty());
    }

    #[test]
    fn test_disable_mid_flight_keeps_total() {
        let (t, clock, _) = timer(true);
        t.start("e", None);
        clock.advance(Duration::from_millis(10));
        t.set_enabled(false);
        t.stop("e");
        assert_eq!(t.total_elapsed(), Duration::ZERO);
        t.set_enabled(true);
        t.stop("e");
        assert_eq!(t.total_elapsed(), Duration::from_millis(10));
    }

    #[test]
    fn test_log_summary_reports_total() {
        let (t, clock, sink) = timer(true);
        t.start("e", None);
        clock.advance(Duration::from_millis(8));
        t.stop("e");
        sink.clear();
        t.log_summary("viewDidAppear");
        assert_eq!(
            sink.observations(),
            vec![Observation::Summary {
                topic: "checkout".to_string(),
                label: "viewDidAppear".to_string(),
                total_elapsed: Duration::from_millis(8),
            }]
        );
    }

    #[test]
    fn test_real_clock_elapsed() {
        let sink = Arc::new(MemorySink::new());
        let t = EventTimer::with_collaborators("io", true, Arc::new(SystemClock), sink.clone());
        t.start("sleep", Some(Duration::from_millis(10)));
        std::thread::sleep(Duration::from_millis(30));
        t.stop("sleep");
        assert!(t.total_elapsed() >= Duration::from_millis(30));
        assert_eq!(sink.threshold_warnings().len(), 1);
    }
}
