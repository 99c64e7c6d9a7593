//! Process-wide timer pool.
//! Refrain from using this in library code, pass a [`TimerRegistry`] instead.
use crate::monitor::pool::TimerRegistry;

lazy_static::lazy_static! {
    static ref SHARED_POOL: TimerRegistry = TimerRegistry::new(true);
}

/// Pool shared by the whole process, enabled until told otherwise
pub fn shared_pool() -> &'static TimerRegistry {
    &SHARED_POOL
}
