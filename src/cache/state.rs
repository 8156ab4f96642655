// Refresh schedule and the bookkeeping the background loop publishes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_SUCCESS_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_FAILURE_INTERVAL: Duration = Duration::from_secs(10);

/// How long to wait after a successful or failed refresh before the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub success_interval: Duration,
    pub failure_interval: Duration,
}

impl RefreshPolicy {
    pub fn new(success_interval: Duration, failure_interval: Duration) -> Self {
        Self {
            success_interval,
            failure_interval,
        }
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_INTERVAL, DEFAULT_FAILURE_INTERVAL)
    }
}

/// Written only by the refresh loop; readers get a clone.
///
/// Published after the snapshot it describes, not atomically with it: right after a
/// refresh a reader may briefly see `count` (or `last_success_at`) lag the snapshot
/// returned by `get_all`. Each value is internally consistent on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshState {
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub next_refresh_at: Option<DateTime<Utc>>,
    pub running: bool,
    pub consecutive_failures: u32,
    /// Number of items in the current snapshot.
    pub count: usize,
}

impl RefreshState {
    /// True once at least one refresh has been published.
    pub fn has_succeeded(&self) -> bool {
        self.last_success_at.is_some()
    }
}

/// Lifecycle of a cache's background loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoopState {
    Created,
    Started,
    ShuttingDown,
    Stopped,
}

impl LoopState {
    pub(super) const fn as_u8(self) -> u8 {
        match self {
            LoopState::Created => 0,
            LoopState::Started => 1,
            LoopState::ShuttingDown => 2,
            LoopState::Stopped => 3,
        }
    }

    pub(super) const fn from_u8(v: u8) -> Self {
        match v {
            0 => LoopState::Created,
            1 => LoopState::Started,
            2 => LoopState::ShuttingDown,
            _ => LoopState::Stopped,
        }
    }
}
