use std::time::Duration;

pub const DEFAULT_WORKER_COUNT: usize = 20;

/// Outcome of one probe. DNS resolution stands in for registration, so a
/// registered name without any address records reads as `Available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Taken,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }

    pub fn is_taken(&self) -> bool {
        matches!(self, Availability::Taken)
    }
}

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub domain: String,
    pub availability: Availability,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub worker_count: usize,
    /// `None` lets a stuck lookup hold its worker forever.
    pub probe_timeout: Option<Duration>,
}

impl ProbeConfig {
    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    pub(crate) fn effective_workers(&self) -> usize {
        self.worker_count.max(1)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            probe_timeout: None,
        }
    }
}
