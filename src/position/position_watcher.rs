use super::{PositionError, PositionFeed, PositionFix, PositionSource};
use crate::health::{HealthTracker, Subsystem};
use crate::{event, info, warn};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
    time::Instant,
};
use tokio_util::sync::CancellationToken;

struct WatcherTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct WatcherState {
    task: Option<WatcherTask>,
    last_failure: Option<Instant>,
}

/// Maintains the most recent [`PositionFix`] in a background task.
///
/// The task is the only writer of the fix. Readers obtain consistent copies via
/// [`PositionWatcher::snapshot`], which never waits on the task.
pub struct PositionWatcher {
    source: Arc<dyn PositionSource>,
    health: Arc<HealthTracker>,
    fix_tx: Arc<watch::Sender<PositionFix>>,
    state: Mutex<WatcherState>,
    shutdown: CancellationToken,
    connect_timeout: Duration,
    retry_delay: Duration,
}

impl PositionWatcher {
    /// Creates a stopped watcher.
    ///
    /// # Arguments
    /// * `source` – The receiver connection factory.
    /// * `health` – Tracker receiving Position success/failure reports.
    /// * `shutdown` – Process token; the watcher task stops when it is cancelled.
    /// * `connect_timeout` – Bound on a single [`PositionWatcher::start`] attempt.
    /// * `retry_delay` – Minimum delay between failed start attempts in
    ///   [`PositionWatcher::ensure_running`].
    pub fn new(
        source: Arc<dyn PositionSource>,
        health: Arc<HealthTracker>,
        shutdown: CancellationToken,
        connect_timeout: Duration,
        retry_delay: Duration,
    ) -> Self {
        let (fix_tx, _) = watch::channel(PositionFix::default());
        Self {
            source,
            health,
            fix_tx: Arc::new(fix_tx),
            state: Mutex::new(WatcherState::default()),
            shutdown,
            connect_timeout,
            retry_delay,
        }
    }

    /// Last published fix, or the zero default before the first one.
    pub fn snapshot(&self) -> PositionFix { *self.fix_tx.borrow() }

    /// Subscribes to fix updates.
    pub fn subscribe(&self) -> watch::Receiver<PositionFix> { self.fix_tx.subscribe() }

    pub async fn is_running(&self) -> bool {
        self.state.lock().await.task.as_ref().is_some_and(|t| !t.handle.is_finished())
    }

    /// Attaches to the receiver and spawns the watcher task. Idempotent while running.
    ///
    /// A failed attempt is recorded as a Position failure and returned; it is never
    /// escalated further.
    pub async fn start(&self) -> Result<(), PositionError> {
        let mut state = self.state.lock().await;
        self.start_locked(&mut state).await
    }

    /// Starts the watcher unless it is running or a failed start happened less
    /// than the retry delay ago.
    pub async fn ensure_running(&self) {
        let mut state = self.state.lock().await;
        if state.task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return;
        }
        if state.last_failure.is_some_and(|t| t.elapsed() < self.retry_delay) {
            return;
        }
        if let Err(e) = self.start_locked(&mut state).await {
            warn!("Position watcher could not start: {e}. Continuing without ground speed.");
        }
    }

    /// Signals the watcher task to exit and waits for it.
    pub async fn stop(&self) {
        let task = self.state.lock().await.task.take();
        if let Some(WatcherTask { cancel, handle }) = task {
            cancel.cancel();
            handle.await.ok();
            info!("Position watcher stopped.");
        }
    }

    async fn start_locked(&self, state: &mut WatcherState) -> Result<(), PositionError> {
        if state.task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return Ok(());
        }
        let feed = match tokio::time::timeout(self.connect_timeout, self.source.open()).await {
            Ok(Ok(feed)) => feed,
            Ok(Err(e)) => return Err(self.record_start_failure(state, e)),
            Err(_) => return Err(self.record_start_failure(state, PositionError::Timeout)),
        };
        state.last_failure = None;

        let cancel = self.shutdown.child_token();
        let handle = tokio::spawn(Self::watch(
            feed,
            Arc::clone(&self.fix_tx),
            Arc::clone(&self.health),
            cancel.clone(),
        ));
        state.task = Some(WatcherTask { cancel, handle });
        info!("Position watcher started.");
        Ok(())
    }

    fn record_start_failure(&self, state: &mut WatcherState, err: PositionError) -> PositionError {
        state.last_failure = Some(Instant::now());
        self.health.report_failure(Subsystem::Position);
        err
    }

    async fn watch(
        mut feed: Box<dyn PositionFeed>,
        fix_tx: Arc<watch::Sender<PositionFix>>,
        health: Arc<HealthTracker>,
        cancel: CancellationToken,
    ) {
        loop {
            let report = tokio::select! {
                () = cancel.cancelled() => return,
                r = feed.next_report() => r,
            };
            match report {
                Ok(Some(track)) => {
                    let fix = PositionFix::new(track.speed_mps, track.track_deg, Instant::now());
                    event!("New fix: {:.2} m/s, {:.1} deg", fix.ground_speed_mps(), fix.heading_deg());
                    health.report_success(Subsystem::Position);
                    fix_tx.send_replace(fix);
                }
                Ok(None) => {
                    health.report_failure(Subsystem::Position);
                    fix_tx.send_replace(PositionFix::no_fix(Instant::now()));
                }
                Err(e) => {
                    warn!("Position feed lost: {e}");
                    health.report_failure(Subsystem::Position);
                    fix_tx.send_replace(PositionFix::no_fix(Instant::now()));
                    return;
                }
            }
        }
    }
}
