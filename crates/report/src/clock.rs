use chrono::{DateTime, Utc};

/// Source of the certificate's generation timestamp — the single
/// non-deterministic input to rendering, injected so tests can pin it.
pub trait Clock {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Wall-clock time. The default for production rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns a pre-set instant — for tests and reproducible output.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}
