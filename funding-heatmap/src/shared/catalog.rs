//! Current set of asset records plus refresh metadata

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::types::{AssetRecord, RawAssetRecord};

/// Validated, de-duplicated and sorted records from one successful fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    assets: Vec<AssetRecord>,
    dropped: usize,
}

impl Snapshot {
    /// Build from already validated records. Duplicate names keep the first.
    pub fn new(records: Vec<AssetRecord>) -> Self {
        let total = records.len();
        let mut seen = HashSet::with_capacity(total);
        let mut assets: Vec<AssetRecord> = records
            .into_iter()
            .filter(|record| seen.insert(record.name.clone()))
            .collect();

        sort_by_magnitude(&mut assets);

        Self {
            dropped: total - assets.len(),
            assets,
        }
    }

    /// Build from raw wire values, dropping anything that does not validate
    pub fn from_values(values: Vec<serde_json::Value>) -> Self {
        let total = values.len();
        let valid: Vec<AssetRecord> = values
            .into_iter()
            .filter_map(|value| serde_json::from_value::<RawAssetRecord>(value).ok())
            .filter_map(RawAssetRecord::validate)
            .collect();
        let invalid = total - valid.len();

        let mut snapshot = Self::new(valid);
        snapshot.dropped += invalid;

        if snapshot.dropped > 0 {
            warn!(
                dropped = snapshot.dropped,
                kept = snapshot.assets.len(),
                "Dropped invalid asset records from snapshot"
            );
        }
        snapshot
    }

    pub fn assets(&self) -> &[AssetRecord] {
        &self.assets
    }

    /// Records rejected during normalization
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn into_assets(self) -> Vec<AssetRecord> {
        self.assets
    }
}

/// Stable sort, descending by `abs(annualized_return)`
pub fn sort_by_magnitude(assets: &mut [AssetRecord]) {
    assets.sort_by(|a, b| {
        b.annualized_return
            .abs()
            .total_cmp(&a.annualized_return.abs())
    });
}

/// Asset catalog owned by the view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    assets: Vec<AssetRecord>,
    last_updated_at: Option<DateTime<Utc>>,
    error_message: Option<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole catalog with a fresh snapshot
    pub fn replace(&mut self, snapshot: Snapshot, at: DateTime<Utc>) {
        *self = Self {
            assets: snapshot.into_assets(),
            last_updated_at: Some(at),
            error_message: None,
        };
    }

    /// Record a failed refresh, keeping whatever data is already present
    pub fn fail(&mut self, message: String) {
        self.error_message = Some(message);
    }

    pub fn assets(&self) -> &[AssetRecord] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        self.last_updated_at
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// True once any fetch has succeeded
    pub fn has_loaded(&self) -> bool {
        self.last_updated_at.is_some()
    }

    pub fn get(&self, name: &str) -> Option<&AssetRecord> {
        self.assets.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Largest `liquidity_usd` across current assets
    pub fn max_liquidity_usd(&self) -> Option<f64> {
        self.assets
            .iter()
            .map(|a| a.liquidity_usd)
            .max_by(|a, b| a.total_cmp(b))
    }
}
