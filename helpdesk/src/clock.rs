use chrono::{DateTime, Utc};

/// Time source for every "now"-stamp the lifecycle services apply. The
/// services own timestamp side effects, never the data objects, so tests
/// can substitute a controlled clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
