//! The refresh loop: a cancellable background task that polls a
//! [`SnapshotSource`] and publishes each snapshot on a watch channel.
//!
//! The render loop never waits on it. A slow or failed fetch only delays the
//! next reseed; the last good snapshot stays current. The most recent failure
//! is published on a second channel until a fetch succeeds.

use std::{convert::Infallible, fmt, future::Future, sync::Arc, time::Duration};

use stargaze_core::{engine::Aggregator, stats::SkySnapshot, store::SkyStore};
use tokio::{
  sync::{Notify, watch},
  task::JoinHandle,
  time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

/// Default polling period.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Shortest accepted polling period.
const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Where snapshots come from: the in-process engine, or a remote API.
pub trait SnapshotSource: Send + Sync + 'static {
  type Error: fmt::Display + Send;

  fn fetch<'a>(
    &'a self,
    sky_id: &'a str,
  ) -> impl Future<Output = Result<SkySnapshot, Self::Error>> + Send + 'a;
}

/// Snapshots straight from an [`Aggregator`]. Cannot fail; the engine
/// already degrades store errors to zero.
pub struct EngineSource<S> {
  aggregator: Aggregator<S>,
  limit:      usize,
}

impl<S: SkyStore> EngineSource<S> {
  /// `limit` bounds the participant metadata per snapshot.
  pub fn new(aggregator: Aggregator<S>, limit: usize) -> Self { Self { aggregator, limit } }
}

impl<S: SkyStore + 'static> SnapshotSource for EngineSource<S> {
  type Error = Infallible;

  async fn fetch(&self, sky_id: &str) -> Result<SkySnapshot, Infallible> {
    Ok(self.aggregator.snapshot(sky_id, self.limit).await)
  }
}

pub struct RefreshLoop;

impl RefreshLoop {
  /// Start polling `sky_id` every `interval`, beginning immediately. Must be
  /// called inside a tokio runtime.
  pub fn spawn<Src: SnapshotSource>(
    source: Arc<Src>,
    sky_id: impl Into<String>,
    interval: Duration,
  ) -> RefreshHandle {
    let sky_id = sky_id.into();
    let (tx, rx) = watch::channel(None);
    let (error_tx, error_rx) = watch::channel(None);
    let nudge = Arc::new(Notify::new());
    info!(%sky_id, ?interval, "starting refresh loop");
    let task = tokio::spawn(run(
      source,
      sky_id,
      interval.max(MIN_INTERVAL),
      Channels { snapshots: tx, errors: error_tx },
      Arc::clone(&nudge),
    ));
    RefreshHandle { rx, error_rx, nudge, task: Some(task) }
  }
}

struct Channels {
  snapshots: watch::Sender<Option<SkySnapshot>>,
  errors:    watch::Sender<Option<String>>,
}

async fn run<Src: SnapshotSource>(
  source: Arc<Src>,
  sky_id: String,
  period: Duration,
  channels: Channels,
  nudge: Arc<Notify>,
) {
  let mut ticker = tokio::time::interval(period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

  loop {
    tokio::select! {
      _ = ticker.tick() => {}
      () = nudge.notified() => ticker.reset(),
    }

    match source.fetch(&sky_id).await {
      Ok(snapshot) => {
        debug!(
          %sky_id,
          total_stars = snapshot.stats.total_stars,
          participants = snapshot.participants.len(),
          "refreshed"
        );
        channels.errors.send_if_modified(|last| last.take().is_some());
        channels.snapshots.send_replace(Some(snapshot));
      }
      Err(e) => {
        warn!(%sky_id, error = %e, "refresh failed; keeping previous snapshot");
        channels.errors.send_replace(Some(e.to_string()));
      }
    }
  }
}

/// Owner of a running refresh loop. Dropping it cancels the task.
pub struct RefreshHandle {
  rx:       watch::Receiver<Option<SkySnapshot>>,
  error_rx: watch::Receiver<Option<String>>,
  nudge:    Arc<Notify>,
  task:     Option<JoinHandle<()>>,
}

impl RefreshHandle {
  /// A receiver of snapshots; `None` until the first fetch succeeds.
  pub fn subscribe(&self) -> watch::Receiver<Option<SkySnapshot>> { self.rx.clone() }

  pub fn latest(&self) -> Option<SkySnapshot> { self.rx.borrow().clone() }

  pub fn has_snapshot(&self) -> bool { self.rx.borrow().is_some() }

  /// The error of the last fetch, cleared by the next success.
  pub fn last_error(&self) -> Option<String> { self.error_rx.borrow().clone() }

  /// Fetch now instead of waiting for the next tick.
  pub fn refresh_now(&self) { self.nudge.notify_one(); }

  pub fn is_running(&self) -> bool { self.task.as_ref().is_some_and(|t| !t.is_finished()) }

  /// Cancel the loop and wait for it to stop.
  pub async fn shutdown(mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
      let _ = task.await;
      debug!("refresh loop stopped");
    }
  }
}

impl Drop for RefreshHandle {
  fn drop(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}
