/// Core data types for funding snapshots
///
/// These types match the JSON body served by `GET {base}/api/hyperliquid/data`

use serde::{Deserialize, Serialize};

/// One tradable perpetual as served by the funding endpoint
///
/// Only produced through [`RawAssetRecord::validate`], so every numeric field is
/// finite and `liquidity_usd`/`day_volume` are non-negative.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AssetRecord {
    /// Asset ticker (e.g., "BTC", "kPEPE"), unique within a snapshot
    pub name: String,
    /// Funding rate per (hourly) funding interval, as a fraction
    pub funding_rate: f64,
    /// Funding rate extrapolated to a yearly percentage, sign preserved
    pub annualized_return: f64,
    /// Mark price in USD
    pub mark_price: f64,
    /// Open interest notional in USD
    pub liquidity_usd: f64,
    /// 24h notional volume in USD
    pub day_volume: f64,
    /// Perp premium over oracle, as a fraction
    pub premium: f64,
}

impl AssetRecord {
    /// Side that currently receives funding
    pub fn side(&self) -> Side {
        Side::of(self.annualized_return)
    }
}

/// Side of the funding trade (which side gets paid)
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Strictly positive returns pay longs; zero and below are shown as short
    pub fn of(annualized_return: f64) -> Self {
        if annualized_return > 0.0 {
            Side::Long
        } else {
            Side::Short
        }
    }

    /// Convert to display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "Long",
            Side::Short => "Short",
        }
    }

    pub fn is_long(&self) -> bool {
        matches!(self, Side::Long)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wire form of an asset before validation
///
/// Every field is optional so a single bad record can be dropped instead of
/// failing the whole response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAssetRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub funding_rate: Option<f64>,
    #[serde(default)]
    pub annualized_return: Option<f64>,
    #[serde(default)]
    pub mark_price: Option<f64>,
    #[serde(default)]
    pub liquidity_usd: Option<f64>,
    #[serde(default)]
    pub day_volume: Option<f64>,
    #[serde(default)]
    pub premium: Option<f64>,
}

impl RawAssetRecord {
    /// Returns `None` for records that are incomplete, non-finite, or carry
    /// negative liquidity/volume
    pub fn validate(self) -> Option<AssetRecord> {
        let name = self.name.filter(|n| !n.trim().is_empty())?;

        let record = AssetRecord {
            name,
            funding_rate: self.funding_rate?,
            annualized_return: self.annualized_return?,
            mark_price: self.mark_price?,
            liquidity_usd: self.liquidity_usd?,
            day_volume: self.day_volume?,
            premium: self.premium?,
        };

        let all_finite = [
            record.funding_rate,
            record.annualized_return,
            record.mark_price,
            record.liquidity_usd,
            record.day_volume,
            record.premium,
        ]
        .iter()
        .all(|v| v.is_finite());

        if !all_finite || record.liquidity_usd < 0.0 || record.day_volume < 0.0 {
            return None;
        }

        Some(record)
    }
}

/// Response envelope of the funding endpoint
///
/// `assets` is kept as raw JSON values so records can be validated one at a time.
#[derive(Debug, Clone, Deserialize)]
pub struct DataResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub assets: Option<Vec<serde_json::Value>>,
}

#[cfg(test)]
pub(crate) fn asset(name: &str, annualized_return: f64, liquidity_usd: f64) -> AssetRecord {
    AssetRecord {
        name: name.to_string(),
        funding_rate: annualized_return / 100.0 / 8760.0,
        annualized_return,
        mark_price: 1.0,
        liquidity_usd,
        day_volume: liquidity_usd / 2.0,
        premium: 0.0001,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawAssetRecord {
        RawAssetRecord {
            name: Some("BTC".to_string()),
            funding_rate: Some(0.0000125),
            annualized_return: Some(10.95),
            mark_price: Some(67_000.5),
            liquidity_usd: Some(1_200_000_000.0),
            day_volume: Some(3_400_000_000.0),
            premium: Some(-0.0002),
        }
    }

    #[test]
    fn test_validate_accepts_complete_record() {
        let record = raw().validate().unwrap();
        assert_eq!(record.name, "BTC");
        assert_eq!(record.side(), Side::Long);
    }

    #[test]
    fn test_validate_rejects_bad_records() {
        struct TestCase {
            input: RawAssetRecord,
            name: &'static str,
        }

        let tests = vec![
            TestCase {
                input: RawAssetRecord { name: None, ..raw() },
                name: "missing name",
            },
            TestCase {
                input: RawAssetRecord { name: Some("  ".to_string()), ..raw() },
                name: "blank name",
            },
            TestCase {
                input: RawAssetRecord { mark_price: Some(f64::NAN), ..raw() },
                name: "nan mark price",
            },
            TestCase {
                input: RawAssetRecord { annualized_return: Some(f64::INFINITY), ..raw() },
                name: "infinite return",
            },
            TestCase {
                input: RawAssetRecord { premium: None, ..raw() },
                name: "missing premium",
            },
            TestCase {
                input: RawAssetRecord { liquidity_usd: Some(-1.0), ..raw() },
                name: "negative liquidity",
            },
            TestCase {
                input: RawAssetRecord { day_volume: Some(-5.0), ..raw() },
                name: "negative volume",
            },
        ];

        for test in tests {
            assert!(test.input.validate().is_none(), "{} should be rejected", test.name);
        }
    }

    #[test]
    fn test_side_of_zero_is_short() {
        assert_eq!(Side::of(0.0), Side::Short);
        assert_eq!(Side::of(-3.0), Side::Short);
        assert_eq!(Side::of(0.01), Side::Long);
        assert_eq!(Side::Long.to_string(), "Long");
    }

    #[test]
    fn test_raw_record_tolerates_nulls() {
        let raw: RawAssetRecord =
            serde_json::from_str(r#"{"name": "ETH", "funding_rate": null}"#).unwrap();
        assert_eq!(raw.name.as_deref(), Some("ETH"));
        assert!(raw.funding_rate.is_none());
        assert!(raw.validate().is_none());
    }
}
