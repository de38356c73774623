//! Liquidity threshold and the derived visible subset of the catalog
//!
//! The threshold value is never clamped by a refresh. Only edits made through the
//! input control are bounded, so a stale value above a shrunken bound simply empties
//! the visible set.

use super::{catalog::Catalog, types::AssetRecord};

/// Bound used before any asset has been seen (millions of USD)
pub const DEFAULT_MAX_BOUND_MILLIONS: f64 = 1000.0;

/// Input control step (millions of USD)
pub const THRESHOLD_STEP_MILLIONS: f64 = 0.1;

/// Steps moved by a page up/down
pub const PAGE_STEPS: i32 = 10;

const USD_PER_MILLION: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdState {
    min_liquidity_millions: f64,
    max_liquidity_bound_millions: f64,
}

impl Default for ThresholdState {
    fn default() -> Self {
        Self {
            min_liquidity_millions: 0.0,
            max_liquidity_bound_millions: DEFAULT_MAX_BOUND_MILLIONS,
        }
    }
}

impl ThresholdState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_liquidity_millions(&self) -> f64 {
        self.min_liquidity_millions
    }

    pub fn max_liquidity_bound_millions(&self) -> f64 {
        self.max_liquidity_bound_millions
    }

    /// Cutoff in USD
    pub fn min_liquidity_usd(&self) -> f64 {
        self.min_liquidity_millions * USD_PER_MILLION
    }

    /// Re-derive the control bound from the catalog, leaving the user value alone
    pub fn rebound(&mut self, catalog: &Catalog) {
        self.max_liquidity_bound_millions = max_bound_millions(catalog);
    }

    /// Set from the input control, clamped to `[0, bound]` and snapped to one decimal
    pub fn set(&mut self, millions: f64) {
        if !millions.is_finite() {
            return;
        }
        let clamped = millions.clamp(0.0, self.max_liquidity_bound_millions);
        self.min_liquidity_millions = snap(clamped);
    }

    /// Move by `steps` control steps (negative moves down)
    pub fn step(&mut self, steps: i32) {
        self.set(self.min_liquidity_millions + steps as f64 * THRESHOLD_STEP_MILLIONS);
    }

    /// Position of the value within `[0, bound]`, for gauges
    pub fn ratio(&self) -> f64 {
        if self.max_liquidity_bound_millions <= 0.0 {
            return 0.0;
        }
        (self.min_liquidity_millions / self.max_liquidity_bound_millions).clamp(0.0, 1.0)
    }

    pub fn admits(&self, asset: &AssetRecord) -> bool {
        asset.liquidity_usd >= self.min_liquidity_usd()
    }
}

/// Snap to the nearest tenth so repeated steps do not accumulate float drift
fn snap(millions: f64) -> f64 {
    (millions * 10.0).round() / 10.0
}

/// `ceil(max liquidity / 1M)`, or the default bound for an empty catalog
pub fn max_bound_millions(catalog: &Catalog) -> f64 {
    match catalog.max_liquidity_usd() {
        Some(max) => (max / USD_PER_MILLION).ceil(),
        None => DEFAULT_MAX_BOUND_MILLIONS,
    }
}

/// Records at or above the threshold, in catalog order
pub fn visible<'a>(catalog: &'a Catalog, threshold: &ThresholdState) -> Vec<&'a AssetRecord> {
    catalog
        .assets()
        .iter()
        .filter(|asset| threshold.admits(asset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{catalog::Snapshot, types::asset};
    use chrono::Utc;

    fn catalog(records: Vec<AssetRecord>) -> Catalog {
        let mut catalog = Catalog::new();
        catalog.replace(Snapshot::new(records), Utc::now());
        catalog
    }

    fn names(assets: &[&AssetRecord]) -> Vec<String> {
        assets.iter().map(|a| a.name.clone()).collect()
    }

    #[test]
    fn test_empty_catalog_uses_default_bound() {
        let catalog = Catalog::new();
        assert_eq!(max_bound_millions(&catalog), DEFAULT_MAX_BOUND_MILLIONS);
        assert!(visible(&catalog, &ThresholdState::new()).is_empty());
    }

    #[test]
    fn test_bound_is_ceiling_of_max_liquidity() {
        let catalog = catalog(vec![asset("A", 1.0, 11_700_000.0), asset("B", 2.0, 300_000.0)]);
        assert_eq!(max_bound_millions(&catalog), 12.0);

        let catalog_exact = self::catalog(vec![asset("A", 1.0, 12_000_000.0)]);
        assert_eq!(max_bound_millions(&catalog_exact), 12.0);
    }

    #[test]
    fn test_visible_keeps_catalog_order_and_is_inclusive() {
        let catalog = catalog(vec![
            asset("LOW", 90.0, 500_000.0),
            asset("EDGE", 30.0, 2_000_000.0),
            asset("HIGH", 60.0, 9_000_000.0),
        ]);
        let mut threshold = ThresholdState::new();
        threshold.rebound(&catalog);
        threshold.set(2.0);

        let shown = visible(&catalog, &threshold);
        assert_eq!(names(&shown), vec!["HIGH", "EDGE"]);
        assert_eq!(visible(&catalog, &threshold), shown);
    }

    #[test]
    fn test_filtering_is_monotonic() {
        let catalog = catalog(
            (0..40)
                .map(|i| asset(&format!("A{i}"), i as f64 * 1.7 - 30.0, i as f64 * 250_000.0))
                .collect(),
        );

        let thresholds: Vec<f64> = (0..=12).map(|i| i as f64 * 0.9).collect();
        for pair in thresholds.windows(2) {
            let mut low = ThresholdState::new();
            let mut high = ThresholdState::new();
            low.set(pair[0]);
            high.set(pair[1]);

            let low_set = names(&visible(&catalog, &low));
            let high_set = names(&visible(&catalog, &high));
            assert!(
                high_set.iter().all(|n| low_set.contains(n)),
                "visible({}) must contain visible({})",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_stale_threshold_above_new_bound_empties_view() {
        let rich = catalog(vec![asset("A", 10.0, 40_000_000.0)]);
        let mut threshold = ThresholdState::new();
        threshold.rebound(&rich);
        threshold.set(15.0);

        let poor = catalog(vec![asset("A", 10.0, 11_700_000.0), asset("B", 3.0, 2_000_000.0)]);
        threshold.rebound(&poor);

        assert_eq!(threshold.max_liquidity_bound_millions(), 12.0);
        assert_eq!(threshold.min_liquidity_millions(), 15.0);
        assert!(visible(&poor, &threshold).is_empty());
        assert_eq!(threshold.ratio(), 1.0);
    }

    #[test]
    fn test_control_edits_are_clamped_and_snapped() {
        let mut threshold = ThresholdState::new();
        threshold.rebound(&catalog(vec![asset("A", 1.0, 3_000_000.0)]));

        threshold.set(-4.0);
        assert_eq!(threshold.min_liquidity_millions(), 0.0);

        for _ in 0..3 {
            threshold.step(1);
        }
        assert_eq!(threshold.min_liquidity_millions(), 0.3);

        threshold.step(PAGE_STEPS * 10);
        assert_eq!(threshold.min_liquidity_millions(), 3.0);

        threshold.step(-PAGE_STEPS);
        assert_eq!(threshold.min_liquidity_millions(), 2.0);

        threshold.set(f64::NAN);
        assert_eq!(threshold.min_liquidity_millions(), 2.0);
    }
}
