/// Display formatting for funding figures and the outbound trade link

use super::types::AssetRecord;

/// Base of the exchange trade page; the asset name is appended verbatim
pub const TRADE_URL_BASE: &str = "https://app.hyperliquid.xyz/trade/";

/// `$1.23M`, `$4.56K` or `$7.89`
pub fn format_usd(value: f64) -> String {
    format_usd_with(value, 2)
}

pub fn format_usd_with(value: f64, decimals: usize) -> String {
    if value >= 1_000_000.0 {
        format!("${:.*}M", decimals, value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.*}K", decimals, value / 1_000.0)
    } else {
        format!("${:.*}", decimals, value)
    }
}

/// Signed percentage with two decimals, `+` for zero and above
pub fn format_percentage(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

/// Fractional rate as a percentage with four decimals (funding, premium)
pub fn format_rate(fraction: f64) -> String {
    format!("{:.4}%", fraction * 100.0)
}

pub fn format_price(price: f64) -> String {
    format!("${:.4}", price)
}

pub fn trade_url(name: &str) -> String {
    format!("{TRADE_URL_BASE}{name}")
}

/// One-line summary of who earns funding on this asset
pub fn opportunity_text(asset: &AssetRecord) -> String {
    if asset.annualized_return > 0.0 {
        format!(
            "Long positions earn funding at an annualized rate of {}.",
            format_percentage(asset.annualized_return)
        )
    } else {
        format!(
            "Short positions earn funding at an annualized rate of {}.",
            format_percentage(asset.annualized_return.abs())
        )
    }
}
