/// Topic pool handing out shared timers
pub mod pool;
/// Per-topic event timer
pub mod timer;
