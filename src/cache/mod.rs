// Refreshable snapshot cache. One background task per cache polls a refresher on a
// success/failure schedule and publishes each result as a new immutable snapshot.
// Readers load the current Arc and never wait on a refresh.

mod snapshot;
mod state;

pub use snapshot::{Keyed, Snapshot};
pub use state::{
    DEFAULT_FAILURE_INTERVAL, DEFAULT_SUCCESS_INTERVAL, LoopState, RefreshPolicy, RefreshState,
};

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Produces the full item list for one refresh cycle.
#[async_trait]
pub trait Refresh<T>: Send + Sync + 'static {
    async fn refresh(&self) -> anyhow::Result<Vec<T>>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("no such {kind}: {id}")]
    NotFound { kind: &'static str, id: String },
}

/// The type-erased part of a cache: lifecycle and status, used where datasets
/// of different item types are handled together.
#[async_trait]
pub trait ManagedCache: Send + Sync {
    fn kind(&self) -> &'static str;
    fn start(&self) -> bool;
    async fn shutdown(&self);
    fn status(&self) -> RefreshState;
}

struct Shared<T> {
    kind: &'static str,
    policy: RefreshPolicy,
    snapshot: ArcSwap<Snapshot<T>>,
    state: watch::Sender<RefreshState>,
    refresher: Box<dyn Refresh<T>>,
}

pub struct RefreshableCache<T> {
    shared: Arc<Shared<T>>,
    loop_state: AtomicU8,
    shutdown_tx: watch::Sender<bool>,
    // Flipped to true once the loop is gone (or was never started).
    exited_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<T> RefreshableCache<T>
where
    T: Keyed + Send + Sync + 'static,
{
    /// `kind` names a single item in logs and not-found errors ("beach", "sports field").
    pub fn new(kind: &'static str, policy: RefreshPolicy, refresher: impl Refresh<T>) -> Self {
        let (state, _) = watch::channel(RefreshState::default());
        let (shutdown_tx, _) = watch::channel(false);
        let (exited_tx, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                kind,
                policy,
                snapshot: ArcSwap::from_pointee(Snapshot::empty()),
                state,
                refresher: Box::new(refresher),
            }),
            loop_state: AtomicU8::new(LoopState::Created.as_u8()),
            shutdown_tx,
            exited_tx,
            task: Mutex::new(None),
        }
    }

    /// Spawns the refresh loop. Returns false (and spawns nothing) if the loop
    /// was already started or the cache has been shut down.
    pub fn start(&self) -> bool {
        // Held across the transition so shutdown() never sees Started without a handle.
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(current) = self.loop_state.compare_exchange(
            LoopState::Created.as_u8(),
            LoopState::Started.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            warn!(
                dataset = self.shared.kind,
                state = ?LoopState::from_u8(current),
                "refresh loop not started: already started or stopped"
            );
            return false;
        }
        let shared = self.shared.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();
        *task = Some(tokio::spawn(run(shared, shutdown_rx)));
        info!(dataset = self.shared.kind, "refresh loop started");
        true
    }

    /// Signals the loop to stop and waits until it has exited. A refresh that is
    /// already in flight completes first. Safe to call on a cache that never started,
    /// and from several tasks at once: every caller returns only after the loop is gone.
    pub async fn shutdown(&self) {
        match self.loop_state.compare_exchange(
            LoopState::Started.as_u8(),
            LoopState::ShuttingDown.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {}
            Err(current) if current == LoopState::Created.as_u8() => {
                self.loop_state
                    .store(LoopState::Stopped.as_u8(), Ordering::Release);
                self.exited_tx.send_replace(true);
                return;
            }
            Err(_) => {
                // Another caller is (or was) stopping the loop; wait for it to finish.
                let mut exited = self.exited_tx.subscribe();
                let _ = exited.wait_for(|done| *done).await;
                return;
            }
        }

        self.shutdown_tx.send_replace(true);
        let handle = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            warn!(dataset = self.shared.kind, error = %e, "refresh loop ended abnormally");
        }
        self.loop_state
            .store(LoopState::Stopped.as_u8(), Ordering::Release);
        self.exited_tx.send_replace(true);
        info!(dataset = self.shared.kind, "refresh loop stopped");
    }

    /// The current snapshot. Cheap: clones an Arc.
    pub fn get_all(&self) -> Arc<Snapshot<T>> {
        self.shared.snapshot.load_full()
    }

    pub fn get_by_id(&self, id: &str) -> Result<T, CacheError>
    where
        T: Clone,
    {
        self.shared
            .snapshot
            .load()
            .get(id)
            .cloned()
            .ok_or_else(|| CacheError::NotFound {
                kind: self.shared.kind,
                id: id.to_owned(),
            })
    }

    pub fn status(&self) -> RefreshState {
        self.shared.state.borrow().clone()
    }

    /// Receiver that is notified after every refresh attempt.
    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.shared.state.subscribe()
    }

    pub fn loop_state(&self) -> LoopState {
        LoopState::from_u8(self.loop_state.load(Ordering::Acquire))
    }

    pub fn kind(&self) -> &'static str {
        self.shared.kind
    }
}

#[async_trait]
impl<T> ManagedCache for RefreshableCache<T>
where
    T: Keyed + Send + Sync + 'static,
{
    fn kind(&self) -> &'static str {
        RefreshableCache::kind(self)
    }

    fn start(&self) -> bool {
        RefreshableCache::start(self)
    }

    async fn shutdown(&self) {
        RefreshableCache::shutdown(self).await;
    }

    fn status(&self) -> RefreshState {
        RefreshableCache::status(self)
    }
}

#[instrument(skip_all, fields(dataset = shared.kind))]
async fn run<T>(shared: Arc<Shared<T>>, mut shutdown_rx: watch::Receiver<bool>)
where
    T: Keyed + Send + Sync + 'static,
{
    shared.state.send_modify(|s| s.running = true);
    let mut next_refresh_at = Instant::now();

    loop {
        if *shutdown_rx.borrow_and_update() {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep_until(next_refresh_at) => {}
            changed = shutdown_rx.changed() => {
                // Sender dropped means the cache itself is gone.
                if changed.is_err() {
                    break;
                }
                continue;
            }
        }
        next_refresh_at = refresh_once(&shared).await;
    }

    shared.state.send_modify(|s| {
        s.running = false;
        s.next_refresh_at = None;
    });
    debug!("refresh loop exiting");
}

/// Runs one refresh and returns when the next one is due.
async fn refresh_once<T>(shared: &Shared<T>) -> Instant
where
    T: Keyed + Send + Sync + 'static,
{
    let started = Instant::now();
    match shared.refresher.refresh().await {
        Ok(items) => {
            let now = Utc::now();
            let snapshot = Snapshot::new(items, now);
            let count = snapshot.len();
            shared.snapshot.store(Arc::new(snapshot));

            let delay = shared.policy.success_interval;
            shared.state.send_modify(|s| {
                s.last_success_at = Some(now);
                s.last_error = None;
                s.consecutive_failures = 0;
                s.count = count;
                s.next_refresh_at = chrono::Duration::from_std(delay).ok().map(|d| now + d);
            });
            debug!(
                operation = "refresh",
                count,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "snapshot published"
            );
            Instant::now() + delay
        }
        Err(e) => {
            let now = Utc::now();
            let delay = shared.policy.failure_interval;
            shared.state.send_modify(|s| {
                s.last_error = Some(format!("{e:#}"));
                s.consecutive_failures = s.consecutive_failures.saturating_add(1);
                s.next_refresh_at = chrono::Duration::from_std(delay).ok().map(|d| now + d);
            });
            warn!(
                operation = "refresh",
                error = %format!("{e:#}"),
                retry_in_ms = delay.as_millis() as u64,
                "refresh failed; keeping previous snapshot"
            );
            Instant::now() + delay
        }
    }
}
