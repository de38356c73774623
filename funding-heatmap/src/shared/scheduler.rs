//! Periodic and manual refresh of the funding snapshot
//!
//! Each fetch runs in its own task and reports back over the view's event channel
//! as `FetchStarted` / `FetchCompleted`, tagged with a generation drawn from a
//! shared counter. A completion whose generation is no longer the latest is dropped
//! before it is forwarded, and again when [`FetchEvents`] drains it, so a result
//! queued just before a newer fetch was initiated never reaches the reducer. A watch
//! flag cancels the timer and silences any fetch still on the wire.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, info};

use super::{catalog::Snapshot, error::FetchError, state::ViewEvent};

/// Capacity of the fetch event channel
pub const EVENT_CHANNEL_SIZE: usize = 64;

/// Anything able to produce a funding snapshot
#[async_trait]
pub trait AssetSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<Snapshot, FetchError>;
}

/// Drives acquisition for one view
pub struct RefreshScheduler<S: AssetSource> {
    source: Arc<S>,
    period: Duration,
    generation: Arc<AtomicU64>,
    event_tx: mpsc::Sender<ViewEvent>,
    cancel_tx: watch::Sender<bool>,
    timer: Option<JoinHandle<()>>,
}

impl<S: AssetSource> RefreshScheduler<S> {
    /// Create the scheduler together with the receiving end of its events
    pub fn new(source: S, period: Duration) -> (Self, FetchEvents) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let (cancel_tx, _) = watch::channel(false);
        let generation = Arc::new(AtomicU64::new(0));

        let events = FetchEvents {
            rx: event_rx,
            generation: Arc::clone(&generation),
        };
        let scheduler = Self {
            source: Arc::new(source),
            period,
            generation,
            event_tx,
            cancel_tx,
            timer: None,
        };
        (scheduler, events)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some() && !self.is_cancelled()
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Generation of the most recently initiated fetch (0 before the first)
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Fetch immediately, then once per period until [`stop`](Self::stop)
    pub fn start(&mut self) {
        if self.timer.is_some() || self.is_cancelled() {
            return;
        }
        info!(period_secs = self.period.as_secs(), "Starting funding refresh scheduler");

        let fetcher = self.fetcher();
        let mut cancel_rx = self.cancel_tx.subscribe();
        let period = self.period;

        self.timer = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if *cancel_rx.borrow() {
                            break;
                        }
                        fetcher.spawn();
                    }
                    changed = cancel_rx.changed() => {
                        if changed.is_err() || *cancel_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("Refresh timer stopped");
        }));
    }

    /// Out-of-band fetch; the timer keeps its own cadence
    pub fn refresh_now(&self) {
        if self.is_cancelled() {
            debug!("Ignoring manual refresh after stop");
            return;
        }
        self.fetcher().spawn();
    }

    /// Cancel the timer and drop results of fetches still in flight
    pub fn stop(&mut self) {
        let _ = self.cancel_tx.send(true);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        info!("Funding refresh scheduler stopped");
    }

    fn fetcher(&self) -> Fetcher<S> {
        Fetcher {
            source: Arc::clone(&self.source),
            generation: Arc::clone(&self.generation),
            event_tx: self.event_tx.clone(),
            cancel_rx: self.cancel_tx.subscribe(),
        }
    }
}

impl<S: AssetSource> Drop for RefreshScheduler<S> {
    fn drop(&mut self) {
        let _ = self.cancel_tx.send(true);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Receiving end of the scheduler's events
///
/// Completions older than the latest initiated generation are skipped here, since
/// they may have been queued before that newer fetch existed.
#[derive(Debug)]
pub struct FetchEvents {
    rx: mpsc::Receiver<ViewEvent>,
    generation: Arc<AtomicU64>,
}

impl FetchEvents {
    /// Wait for the next event; `None` once every sender is gone
    pub async fn recv(&mut self) -> Option<ViewEvent> {
        loop {
            let event = self.rx.recv().await?;
            if self.is_current(&event) {
                return Some(event);
            }
        }
    }

    /// Next queued event without waiting
    pub fn try_recv(&mut self) -> Option<ViewEvent> {
        loop {
            let event = self.rx.try_recv().ok()?;
            if self.is_current(&event) {
                return Some(event);
            }
        }
    }

    fn is_current(&self, event: &ViewEvent) -> bool {
        match event {
            ViewEvent::FetchCompleted { generation, .. } => {
                let latest = self.generation.load(Ordering::SeqCst);
                if *generation < latest {
                    debug!(generation, latest, "Skipping queued result of superseded fetch");
                    return false;
                }
                true
            }
            _ => true,
        }
    }
}

/// Everything a single fetch task needs
struct Fetcher<S: AssetSource> {
    source: Arc<S>,
    generation: Arc<AtomicU64>,
    event_tx: mpsc::Sender<ViewEvent>,
    cancel_rx: watch::Receiver<bool>,
}

impl<S: AssetSource> Clone for Fetcher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            generation: Arc::clone(&self.generation),
            event_tx: self.event_tx.clone(),
            cancel_rx: self.cancel_rx.clone(),
        }
    }
}

impl<S: AssetSource> Fetcher<S> {
    /// Allocate the next generation and run the fetch in the background
    fn spawn(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let fetcher = self.clone();

        tokio::spawn(async move {
            if *fetcher.cancel_rx.borrow() {
                return;
            }
            if fetcher
                .event_tx
                .send(ViewEvent::FetchStarted { generation })
                .await
                .is_err()
            {
                return;
            }

            let outcome = fetcher.source.fetch().await;

            if *fetcher.cancel_rx.borrow() {
                debug!(generation, "Dropping fetch result after stop");
                return;
            }
            let latest = fetcher.generation.load(Ordering::SeqCst);
            if generation != latest {
                debug!(generation, latest, "Dropping result of superseded fetch");
                return;
            }

            let event = ViewEvent::FetchCompleted {
                generation,
                outcome,
                received_at: Utc::now(),
            };
            if fetcher.event_tx.send(event).await.is_err() {
                debug!(generation, "View receiver dropped before fetch completed");
            }
        });
    }
}
