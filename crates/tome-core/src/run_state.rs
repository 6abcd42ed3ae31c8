//! **Run polling state machine**: pure evaluation of a run's reported status.
//!
//! The orchestrator owns the I/O (fetch run, wait between polls); this module only decides
//! what a given observation means. Queued and in-progress collapse into `Pending`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default wait between two polls of a run.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Default number of polls before giving up (~60 s with the default interval).
pub const DEFAULT_POLL_ATTEMPTS: u32 = 60;

/// Collapsed lifecycle of a remote run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Pending,
    Completed,
    Failed,
    Cancelled,
    Expired,
}

impl RunPhase {
    /// Map a backend status word onto a phase. Unrecognised words stay `Pending`; the poll cap
    /// bounds how long that can last.
    pub fn from_status(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" => RunPhase::Completed,
            "failed" | "incomplete" => RunPhase::Failed,
            "cancelled" => RunPhase::Cancelled,
            "expired" => RunPhase::Expired,
            _ => RunPhase::Pending,
        }
    }

}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::Pending => "pending",
            RunPhase::Completed => "completed",
            RunPhase::Failed => "failed",
            RunPhase::Cancelled => "cancelled",
            RunPhase::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// Cadence and cap for polling a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_POLL_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    /// Total time the policy waits if every attempt comes back pending.
    pub fn budget(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// What to do after observing the run at a given attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Still pending and budget remains: wait one interval and poll again.
    Continue,
    /// Run completed; read the answer.
    Done,
    /// Terminal non-success; never retried.
    Abort { phase: RunPhase, reason: String },
    /// Budget exhausted while pending.
    TimedOut,
}

/// Decide the next step for an observation. `attempt` is 1-based: the number of polls made so far.
pub fn next_step(phase: RunPhase, reason: Option<&str>, attempt: u32, policy: &PollPolicy) -> PollStep {
    match phase {
        RunPhase::Completed => PollStep::Done,
        RunPhase::Failed | RunPhase::Cancelled | RunPhase::Expired => PollStep::Abort {
            phase,
            reason: reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from)
                .unwrap_or_else(|| format!("run {}", phase)),
        },
        RunPhase::Pending if attempt >= policy.max_attempts => PollStep::TimedOut,
        RunPhase::Pending => PollStep::Continue,
    }
}

/// Wait source between polls. Production uses the tokio timer; tests inject a counter.
#[async_trait]
pub trait PollClock: Send + Sync {
    async fn wait(&self, interval: Duration);
}

/// `tokio::time::sleep` backed clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl PollClock for TokioClock {
    async fn wait(&self, interval: Duration) {
        tokio::time::sleep(interval).await;
    }
}
