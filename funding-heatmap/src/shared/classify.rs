//! Annualized-return classification shared by the heatmap grid and its legend
//!
//! Thresholds apply to `abs(return)` with strict `>` comparisons, evaluated from
//! the largest band down. Anything at or below 5% is neutral regardless of sign.

use super::types::Side;

/// Band boundaries on `abs(annualized_return)`, in percent.
pub const STRONG_ABOVE: f64 = 50.0;
pub const MEDIUM_ABOVE: f64 = 20.0;
pub const WEAK_ABOVE: f64 = 10.0;
pub const MODEST_ABOVE: f64 = 5.0;

/// Color bucket of an annualized return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    StrongLong,
    MediumLong,
    WeakLong,
    ModestLong,
    Neutral,
    ModestShort,
    WeakShort,
    MediumShort,
    StrongShort,
}

/// Classify an annualized return (percent). Non-finite input is neutral.
pub fn classify(annualized_return: f64) -> Bucket {
    if !annualized_return.is_finite() {
        return Bucket::Neutral;
    }

    let abs = annualized_return.abs();
    let long = annualized_return > 0.0;

    let (long_bucket, short_bucket) = if abs > STRONG_ABOVE {
        (Bucket::StrongLong, Bucket::StrongShort)
    } else if abs > MEDIUM_ABOVE {
        (Bucket::MediumLong, Bucket::MediumShort)
    } else if abs > WEAK_ABOVE {
        (Bucket::WeakLong, Bucket::WeakShort)
    } else if abs > MODEST_ABOVE {
        (Bucket::ModestLong, Bucket::ModestShort)
    } else {
        return Bucket::Neutral;
    };

    if long { long_bucket } else { short_bucket }
}

impl Bucket {
    /// Fill color as an RGB triple
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Bucket::StrongLong => (34, 197, 94),
            Bucket::MediumLong => (74, 222, 128),
            Bucket::WeakLong => (134, 239, 172),
            Bucket::ModestLong => (187, 247, 208),
            Bucket::Neutral => (229, 231, 235),
            Bucket::ModestShort => (254, 202, 202),
            Bucket::WeakShort => (252, 165, 165),
            Bucket::MediumShort => (248, 113, 113),
            Bucket::StrongShort => (239, 68, 68),
        }
    }

    /// `None` for the sign-agnostic neutral band
    pub fn side(&self) -> Option<Side> {
        match self {
            Bucket::StrongLong | Bucket::MediumLong | Bucket::WeakLong | Bucket::ModestLong => {
                Some(Side::Long)
            }
            Bucket::Neutral => None,
            _ => Some(Side::Short),
        }
    }

    /// Cells above 20% get a highlighted border
    pub fn is_emphasized(&self) -> bool {
        matches!(
            self,
            Bucket::StrongLong | Bucket::MediumLong | Bucket::MediumShort | Bucket::StrongShort
        )
    }
}

/// One legend row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendEntry {
    pub bucket: Bucket,
    pub label: &'static str,
}

/// Seven legend rows, long side first. The modest bands share the neutral swatch
/// in the legend, so "0-10%" covers everything up to the weak band.
pub const LEGEND: [LegendEntry; 7] = [
    LegendEntry { bucket: Bucket::StrongLong, label: ">50% (Long)" },
    LegendEntry { bucket: Bucket::MediumLong, label: "20-50% (Long)" },
    LegendEntry { bucket: Bucket::WeakLong, label: "10-20% (Long)" },
    LegendEntry { bucket: Bucket::Neutral, label: "0-10%" },
    LegendEntry { bucket: Bucket::WeakShort, label: "-10 to -20% (Short)" },
    LegendEntry { bucket: Bucket::MediumShort, label: "-20 to -50% (Short)" },
    LegendEntry { bucket: Bucket::StrongShort, label: "<-50% (Short)" },
];
