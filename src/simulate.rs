//! Mock metric simulators.
//!
//! Outputs are randomized but shape-constrained; callers should check them by
//! invariant (length, floor, ratio sums) rather than exact value.

use crate::format::{format_currency, format_percent};
use crate::model::{ActivityEntry, CustomerRecord, Health, KpiMetric, ProductSegment, RevenuePoint};
use crate::random::{random_int, RandomSource};

pub const REVENUE_FLOOR: f64 = 120.0;
pub const REVENUE_BASE: (i64, i64) = (180, 260);
pub const REVENUE_STEP: (i64, i64) = (-12, 15);

/// Fixed segment labels with their raw-weight draw ranges.
pub const PRODUCT_SEGMENTS: [(&str, i64, i64); 4] = [
    ("Enterprise", 35, 45),
    ("Teams", 25, 35),
    ("Consumer", 15, 25),
    ("Services", 8, 15),
];

/// KPI baselines the synthetic metrics are compared against.
pub const SALES_BASELINE: f64 = 320.0;
pub const PIPELINE_BASELINE: f64 = 40.0;
pub const SATISFACTION_BASELINE: f64 = 0.75;

pub const KPI_LABELS: [&str; 4] = ["Revenue", "Sales Volume", "Pipeline", "Customer Satisfaction"];

/// How many points back the revenue trend looks.
const TREND_LOOKBACK: usize = 7;

pub const ACTIVITY_ENTRIES: usize = 5;

/// Random walk of `days` points, oldest first. Each step applies a delta
/// before storing, so the first stored value already differs from the base
/// draw.
pub fn generate_revenue_series(src: &mut dyn RandomSource, days: u32) -> Vec<RevenuePoint> {
    let mut value = random_int(src, REVENUE_BASE.0, REVENUE_BASE.1) as f64;
    let mut series = Vec::with_capacity(days as usize);
    for day in 1..=days {
        value += random_int(src, REVENUE_STEP.0, REVENUE_STEP.1) as f64;
        if value < REVENUE_FLOOR {
            value = REVENUE_FLOOR;
        }
        series.push(RevenuePoint { day, value });
    }
    series
}

/// Draws one raw weight per fixed segment and normalizes them.
pub fn generate_product_mix(src: &mut dyn RandomSource) -> Vec<ProductSegment> {
    let weights: Vec<(&str, f64)> = PRODUCT_SEGMENTS
        .iter()
        .map(|(label, lo, hi)| (*label, random_int(src, *lo, *hi) as f64))
        .collect();
    normalize_mix(&weights)
}

/// Converts raw `(label, weight)` pairs into segments whose ratios sum to 1.
/// A zero total yields all-zero ratios rather than NaN.
pub fn normalize_mix(weights: &[(&str, f64)]) -> Vec<ProductSegment> {
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    weights
        .iter()
        .map(|(label, w)| ProductSegment {
            label: (*label).to_string(),
            value: *w,
            ratio: if total > 0.0 { w / total } else { 0.0 },
        })
        .collect()
}

/// Relative change between the latest point and the one `TREND_LOOKBACK`
/// positions earlier (or the first point). Zero reference gives 0.
pub fn revenue_trend(series: &[RevenuePoint]) -> f64 {
    let Some(latest) = series.last() else {
        return 0.0;
    };
    let reference = series[series.len().saturating_sub(TREND_LOOKBACK + 1)].value;
    if reference == 0.0 {
        return 0.0;
    }
    (latest.value - reference) / reference
}

/// Four KPIs in fixed order: revenue from the series, then three synthetic
/// metrics. An empty series reports zero revenue with a flat trend.
pub fn build_kpis(src: &mut dyn RandomSource, series: &[RevenuePoint]) -> Vec<KpiMetric> {
    let latest = series.last().map(|p| p.value).unwrap_or(0.0);
    let delta = revenue_trend(series);

    let sales = random_int(src, 280, 430);
    let pipeline = random_int(src, 32, 55);
    let satisfaction = src.unit() * 0.25 + 0.65;

    vec![
        KpiMetric {
            label: KPI_LABELS[0].to_string(),
            display_value: format_currency(latest * 1000.0),
            trend: delta,
            delta_label: format_percent(delta),
        },
        KpiMetric {
            label: KPI_LABELS[1].to_string(),
            display_value: format!("{} deals", sales),
            trend: (sales as f64 - SALES_BASELINE) / SALES_BASELINE,
            delta_label: format!("{} deals", sales),
        },
        KpiMetric {
            label: KPI_LABELS[2].to_string(),
            display_value: format_currency(pipeline as f64 * 10_000.0),
            trend: (pipeline as f64 - PIPELINE_BASELINE) / PIPELINE_BASELINE,
            delta_label: format!("{} active", pipeline),
        },
        KpiMetric {
            label: KPI_LABELS[3].to_string(),
            display_value: format_percent(satisfaction),
            trend: satisfaction - SATISFACTION_BASELINE,
            delta_label: format_percent(satisfaction),
        },
    ]
}

/// Activity feed templates; the value is drawn at the moment an entry is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    NewOrder,
    Renewal,
    ChurnAlert,
    ProductInquiry,
    RefundIssued,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 5] = [
        ActivityKind::NewOrder,
        ActivityKind::Renewal,
        ActivityKind::ChurnAlert,
        ActivityKind::ProductInquiry,
        ActivityKind::RefundIssued,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::NewOrder => "New order",
            ActivityKind::Renewal => "Renewal",
            ActivityKind::ChurnAlert => "Churn alert",
            ActivityKind::ProductInquiry => "Product inquiry",
            ActivityKind::RefundIssued => "Refund issued",
        }
    }

    pub fn draw_value(&self, src: &mut dyn RandomSource) -> String {
        match self {
            ActivityKind::NewOrder => format!("+${}k", random_int(src, 8, 75)),
            ActivityKind::Renewal => format!("+${}k", random_int(src, 20, 60)),
            ActivityKind::ChurnAlert => "-1 acct".to_string(),
            ActivityKind::ProductInquiry => format!("{} leads", random_int(src, 5, 22)),
            ActivityKind::RefundIssued => format!("-${}k", random_int(src, 4, 18)),
        }
    }
}

/// Five entries drawn with replacement from the templates.
pub fn generate_activity(src: &mut dyn RandomSource) -> Vec<ActivityEntry> {
    (0..ACTIVITY_ENTRIES)
        .map(|_| {
            let idx = random_int(src, 0, ActivityKind::ALL.len() as i64 - 1) as usize;
            let kind = ActivityKind::ALL[idx];
            ActivityEntry {
                label: kind.label().to_string(),
                value: kind.draw_value(src),
            }
        })
        .collect()
}

/// The static reference customer list.
pub fn reference_customers() -> Vec<CustomerRecord> {
    [
        ("Acme Holdings", 420_000.0, Health::Good),
        ("Northwind Group", 350_000.0, Health::Warning),
        ("Lumina Retail", 285_000.0, Health::Good),
        ("Vertex Media", 198_000.0, Health::Risk),
        ("Atlas Mobility", 167_000.0, Health::Good),
    ]
    .into_iter()
    .map(|(name, value, health)| CustomerRecord {
        name: name.to_string(),
        value,
        health,
    })
    .collect()
}
