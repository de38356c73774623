//! View state container and its reducer
//!
//! All transitions (fetch lifecycle, threshold edits, selection) go through
//! [`ViewState::apply`], so the view loop is the only owner of the state and no
//! locking is needed. Fetch results carry the generation they were initiated with;
//! only the newest initiated generation is allowed to touch the catalog.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{
    catalog::{Catalog, Snapshot},
    error::FetchError,
    selection::SelectionState,
    threshold::{visible, ThresholdState},
    types::AssetRecord,
};

/// Inputs to the reducer
#[derive(Debug, Clone)]
pub enum ViewEvent {
    /// A fetch with this generation has been initiated
    FetchStarted { generation: u64 },
    /// A fetch finished (successfully or not)
    FetchCompleted {
        generation: u64,
        outcome: Result<Snapshot, FetchError>,
        received_at: DateTime<Utc>,
    },
    /// Threshold set from the input control (millions of USD)
    SetThreshold(f64),
    /// Threshold moved by a number of control steps
    StepThreshold(i32),
    Select(String),
    Dismiss,
    /// View torn down; everything after this is ignored
    Unmount,
}

/// Generation bookkeeping for single-flight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSequence {
    /// Highest generation seen in a `FetchStarted`
    pub latest_initiated: u64,
    /// Highest generation whose completion has been processed
    pub latest_resolved: u64,
}

impl FetchSequence {
    pub fn in_flight(&self) -> bool {
        self.latest_resolved < self.latest_initiated
    }
}

#[derive(Debug, Clone)]
pub struct ViewState {
    pub catalog: Catalog,
    pub threshold: ThresholdState,
    pub selection: SelectionState,
    pub sequence: FetchSequence,
    mounted: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    /// Fresh state as created on mount
    pub fn new() -> Self {
        Self {
            catalog: Catalog::new(),
            threshold: ThresholdState::new(),
            selection: SelectionState::new(),
            sequence: FetchSequence::default(),
            mounted: true,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Apply one event in place
    pub fn apply(&mut self, event: ViewEvent) {
        if !self.mounted {
            debug!(?event, "Ignoring event after unmount");
            return;
        }

        match event {
            ViewEvent::FetchStarted { generation } => {
                self.sequence.latest_initiated = self.sequence.latest_initiated.max(generation);
            }
            ViewEvent::FetchCompleted { generation, outcome, received_at } => {
                self.complete_fetch(generation, outcome, received_at);
            }
            ViewEvent::SetThreshold(millions) => self.threshold.set(millions),
            ViewEvent::StepThreshold(steps) => self.threshold.step(steps),
            ViewEvent::Select(name) => self.selection.select(name),
            ViewEvent::Dismiss => self.selection.clear(),
            ViewEvent::Unmount => {
                self.mounted = false;
                self.selection.clear();
            }
        }
    }

    fn complete_fetch(
        &mut self,
        generation: u64,
        outcome: Result<Snapshot, FetchError>,
        received_at: DateTime<Utc>,
    ) {
        // A completion also counts as initiated
        self.sequence.latest_initiated = self.sequence.latest_initiated.max(generation);
        self.sequence.latest_resolved = self.sequence.latest_resolved.max(generation);

        if generation != self.sequence.latest_initiated {
            debug!(
                generation,
                latest = self.sequence.latest_initiated,
                "Discarding superseded fetch result"
            );
            return;
        }

        match outcome {
            Ok(snapshot) => {
                debug!(generation, assets = snapshot.assets().len(), "Applying snapshot");
                self.catalog.replace(snapshot, received_at);
                self.threshold.rebound(&self.catalog);
                if self.selection.reconcile(&self.catalog) {
                    debug!("Selected asset vanished from snapshot; dismissed detail");
                }
            }
            Err(error) => {
                warn!(generation, %error, "Funding refresh failed");
                self.catalog.fail(error.user_message());
            }
        }
    }

    /// Records passing the current threshold, in catalog order
    pub fn visible(&self) -> Vec<&AssetRecord> {
        visible(&self.catalog, &self.threshold)
    }

    /// The record backing the detail popup, if still present
    pub fn selected_asset(&self) -> Option<&AssetRecord> {
        self.selection.resolve(&self.catalog)
    }

    pub fn is_loading(&self) -> bool {
        self.sequence.in_flight()
    }

    /// Nothing has ever loaded and the last attempt failed
    pub fn shows_fullscreen_error(&self) -> bool {
        !self.catalog.has_loaded() && self.catalog.error_message().is_some()
    }

    /// Nothing has loaded yet and no error to show
    pub fn shows_initial_loading(&self) -> bool {
        !self.catalog.has_loaded() && self.catalog.error_message().is_none()
    }
}

/// Pure reducer form of [`ViewState::apply`]
pub fn reduce(mut state: ViewState, event: ViewEvent) -> ViewState {
    state.apply(event);
    state
}
