//! Dashboard data model.
//!
//! Everything here except the customer list is rebuilt on every refresh
//! cycle and never mutated afterwards.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One day of the revenue trend. `day` is 1-based, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub day: u32,
    pub value: f64,
}

/// One segment of the product mix. `ratio` is the segment's share of the
/// summed raw weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSegment {
    pub label: String,
    pub value: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiMetric {
    pub label: String,
    pub display_value: String,
    /// Signed fractional change against the metric's reference.
    pub trend: f64,
    pub delta_label: String,
}

impl KpiMetric {
    pub fn direction(&self) -> TrendDirection {
        if self.trend >= 0.0 {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Good,
    Warning,
    Risk,
}

impl Health {
    pub fn as_str(&self) -> &'static str {
        match self {
            Health::Good => "good",
            Health::Warning => "warning",
            Health::Risk => "risk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub name: String,
    /// Account value in whole dollars.
    pub value: f64,
    pub health: Health,
}

/// Everything one refresh cycle produced. Renderers and the composer only
/// ever read from a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub range_days: u32,
    pub revenue: Vec<RevenuePoint>,
    pub product_mix: Vec<ProductSegment>,
    pub kpis: Vec<KpiMetric>,
    pub activity: Vec<ActivityEntry>,
    pub customers: Vec<CustomerRecord>,
    /// Wall-clock stamp shown in the activity caption (`HH:MM`).
    pub updated_at: String,
}

impl DashboardSnapshot {
    /// Sum of the revenue series, in the series' own units.
    pub fn revenue_total(&self) -> f64 {
        self.revenue.iter().map(|p| p.value).sum()
    }

    /// Hex SHA-256 over the serialized snapshot, used to correlate log records
    /// with written frames.
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }
}
