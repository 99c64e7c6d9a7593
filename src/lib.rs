/// Time sources for timers
pub mod clock;
/// Config loading from config.ini and the environment
pub mod config;
/// Errors of the config and logging layers, timers never fail
pub mod error;
/// Shared pool declared with lazy_static!. Prefer passing a registry.
pub mod global;
/// Logger initialization
pub mod logger;
/// Event timers and the topic pool
pub mod monitor;
/// Structured observations and the sinks receiving them
pub mod observation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MonitorConfig;
pub use monitor::pool::TimerRegistry;
pub use monitor::timer::EventTimer;
pub use observation::{LogSink, MemorySink, Observation, ObservationSink};
