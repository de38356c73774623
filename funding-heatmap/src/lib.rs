/// Hyperliquid Funding Heatmap - Shared Library
///
/// Live terminal heatmap of perpetual-futures funding opportunities.
///
/// The library includes:
/// - Asset records, validation and the sorted catalog
/// - Return classification and the legend
/// - Liquidity threshold, selection and the view reducer
/// - REST client, the refresh scheduler and the browser opener
/// - Ratatui widgets for the grid, threshold panel and detail popup
pub mod shared;

// Re-export commonly used types for convenience
pub use shared::types::{AssetRecord, Side};

pub use shared::catalog::{Catalog, Snapshot};
pub use shared::classify::{classify, Bucket, LEGEND};
pub use shared::selection::SelectionState;
pub use shared::threshold::{visible, ThresholdState};

pub use shared::state::{reduce, ViewEvent, ViewState};

pub use shared::client::HttpAssetSource;
pub use shared::config::HeatmapConfig;
pub use shared::error::{ConfigError, FetchError};
pub use shared::scheduler::{AssetSource, FetchEvents, RefreshScheduler};

pub use shared::browser::open_in_browser;

pub use shared::format::{format_percentage, format_rate, format_usd, trade_url};
pub use shared::widget::{render_heatmap, HeatmapUi};
