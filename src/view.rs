//! Refresh-cycle orchestration.
//!
//! A cycle regenerates every simulated dataset into a fresh
//! [`DashboardSnapshot`], paints both charts, then hands the panel content to
//! the screen as a list of [`DisplayCommand`]s built by [`compose`].
//! Nothing from a previous cycle is reused.

use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::format::{format_currency, format_trend_badge};
use crate::interaction::{RangeSelector, RefreshGuard, Trigger};
use crate::logging::{log_cycle, log_range_rejected, log_series, log_trigger_dropped, v_num, ProfileScope};
use crate::model::{CustomerRecord, DashboardSnapshot, Health, TrendDirection};
use crate::random::RandomSource;
use crate::render::{draw_bar_chart, draw_line_chart, RecordingSurface, Surface};
use crate::simulate::{
    build_kpis, generate_activity, generate_product_mix, generate_revenue_series, reference_customers,
};

pub const MIX_CAPTION: &str = "Share of revenue by segment";

/// Named content regions of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    KpiGrid,
    ActivityMeta,
    ActivityFeed,
    CustomerTable,
    RevenueMeta,
    MixMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiCard {
    pub label: String,
    pub value: String,
    pub delta_label: String,
    pub direction: TrendDirection,
    /// Arrow and magnitude, e.g. `▲ 4.2%`.
    pub badge: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRow {
    pub name: String,
    pub value: String,
    pub health: Health,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
pub enum RegionContent {
    KpiCards(Vec<KpiCard>),
    ActivityList(Vec<ActivityRow>),
    CustomerTable(Vec<CustomerRow>),
    Text(String),
}

/// Replace the content of `region` with `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayCommand {
    pub region: Region,
    pub content: RegionContent,
}

/// Receives whole-region content replacements.
pub trait ContentSink {
    fn replace(&mut self, command: DisplayCommand) -> Result<()>;
}

/// Keeps the latest content per region.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    regions: BTreeMap<Region, RegionContent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, region: Region) -> Option<&RegionContent> {
        self.regions.get(&region)
    }

    pub fn text(&self, region: Region) -> Option<&str> {
        match self.regions.get(&region) {
            Some(RegionContent::Text(t)) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.regions).unwrap_or(serde_json::Value::Null)
    }
}

impl ContentSink for MemorySink {
    fn replace(&mut self, command: DisplayCommand) -> Result<()> {
        self.regions.insert(command.region, command.content);
        Ok(())
    }
}

/// Mutable borrows of everything a cycle paints into.
pub struct Targets<'a> {
    pub revenue: &'a mut dyn Surface,
    pub mix: &'a mut dyn Surface,
    pub content: &'a mut dyn ContentSink,
}

/// Where a refresh cycle renders to.
pub trait Screen {
    fn targets(&mut self) -> Targets<'_>;

    /// Called once the cycle has painted everything.
    fn present(&mut self, _snapshot: &DashboardSnapshot) -> Result<()> {
        Ok(())
    }
}

/// In-memory screen: recorded chart commands plus region content.
#[derive(Debug, Clone)]
pub struct MemoryScreen {
    pub revenue: RecordingSurface,
    pub mix: RecordingSurface,
    pub content: MemorySink,
}

impl MemoryScreen {
    pub fn new(revenue_size: (f64, f64), mix_size: (f64, f64)) -> Self {
        Self {
            revenue: RecordingSurface::new(revenue_size.0, revenue_size.1),
            mix: RecordingSurface::new(mix_size.0, mix_size.1),
            content: MemorySink::new(),
        }
    }
}

impl Screen for MemoryScreen {
    fn targets(&mut self) -> Targets<'_> {
        Targets {
            revenue: &mut self.revenue,
            mix: &mut self.mix,
            content: &mut self.content,
        }
    }
}

pub fn customer_rows(customers: &[CustomerRecord]) -> Vec<CustomerRow> {
    customers
        .iter()
        .map(|c| CustomerRow {
            name: c.name.clone(),
            value: format_currency(c.value),
            health: c.health,
        })
        .collect()
}

/// Maps a snapshot to the panel updates for one cycle, in paint order.
pub fn compose(snapshot: &DashboardSnapshot) -> Vec<DisplayCommand> {
    let cards = snapshot
        .kpis
        .iter()
        .map(|k| KpiCard {
            label: k.label.clone(),
            value: k.display_value.clone(),
            delta_label: k.delta_label.clone(),
            direction: k.direction(),
            badge: format_trend_badge(k.trend),
        })
        .collect();
    let activity = snapshot
        .activity
        .iter()
        .map(|a| ActivityRow {
            label: a.label.clone(),
            value: a.value.clone(),
        })
        .collect();
    let revenue_caption = format!(
        "{} {}-day total",
        format_currency(snapshot.revenue_total() * 1000.0),
        snapshot.range_days
    );

    vec![
        DisplayCommand {
            region: Region::KpiGrid,
            content: RegionContent::KpiCards(cards),
        },
        DisplayCommand {
            region: Region::ActivityMeta,
            content: RegionContent::Text(format!("Updated {}", snapshot.updated_at)),
        },
        DisplayCommand {
            region: Region::ActivityFeed,
            content: RegionContent::ActivityList(activity),
        },
        DisplayCommand {
            region: Region::CustomerTable,
            content: RegionContent::CustomerTable(customer_rows(&snapshot.customers)),
        },
        DisplayCommand {
            region: Region::RevenueMeta,
            content: RegionContent::Text(revenue_caption),
        },
        DisplayCommand {
            region: Region::MixMeta,
            content: RegionContent::Text(MIX_CAPTION.to_string()),
        },
    ]
}

/// Paints a finished snapshot: both charts, then every panel.
pub fn paint(snapshot: &DashboardSnapshot, targets: Targets<'_>) -> Result<()> {
    draw_line_chart(targets.revenue, &snapshot.revenue);
    draw_bar_chart(targets.mix, &snapshot.product_mix);
    for command in compose(snapshot) {
        targets.content.replace(command)?;
    }
    Ok(())
}

/// Owns the random source, range selection and customer reference list, and
/// runs refresh cycles against a [`Screen`].
pub struct Dashboard {
    source: Box<dyn RandomSource + Send>,
    customers: Vec<CustomerRecord>,
    range: RangeSelector,
    guard: Arc<RefreshGuard>,
    cycles: u64,
}

impl Dashboard {
    pub fn new(source: Box<dyn RandomSource + Send>, range: RangeSelector) -> Self {
        Self {
            source,
            customers: reference_customers(),
            range,
            guard: Arc::new(RefreshGuard::new()),
            cycles: 0,
        }
    }

    pub fn range_days(&self) -> u32 {
        self.range.days()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn guard(&self) -> Arc<RefreshGuard> {
        Arc::clone(&self.guard)
    }

    /// Applies a range change; unknown values keep the current selection.
    pub fn select_range(&mut self, days: u32) -> bool {
        let kept = self.range.days();
        match self.range.select(days) {
            Ok(_) => true,
            Err(_) => {
                log_range_rejected(days, kept);
                false
            }
        }
    }

    /// Builds a fresh snapshot for `days` without painting it.
    pub fn generate(&mut self, days: u32) -> DashboardSnapshot {
        let src: &mut dyn RandomSource = self.source.as_mut();
        let revenue = generate_revenue_series(src, days);
        let product_mix = generate_product_mix(src);
        let kpis = build_kpis(src, &revenue);
        let activity = generate_activity(src);
        DashboardSnapshot {
            range_days: days,
            revenue,
            product_mix,
            kpis,
            activity,
            customers: self.customers.clone(),
            updated_at: Local::now().format("%H:%M").to_string(),
        }
    }

    /// Runs one cycle. Returns `Ok(None)` when another cycle holds the
    /// guard. A range requested through the guard is applied first. An error
    /// aborts the cycle; anything already painted stays.
    pub fn refresh(&mut self, screen: &mut dyn Screen) -> Result<Option<DashboardSnapshot>> {
        let guard = Arc::clone(&self.guard);
        let Some(_token) = guard.try_begin() else {
            log_trigger_dropped("refresh");
            return Ok(None);
        };
        if let Some(days) = guard.take_pending_range() {
            self.select_range(days);
        }
        let days = self.range.days();
        let _scope = ProfileScope::with_context("refresh_cycle", &[("range_days", v_num(days as f64))]);

        let snapshot = self.generate(days);
        if let (Some(lo), Some(hi)) = (
            snapshot.revenue.iter().map(|p| p.value).reduce(f64::min),
            snapshot.revenue.iter().map(|p| p.value).reduce(f64::max),
        ) {
            log_series(snapshot.revenue.len(), lo, hi);
        }

        paint(&snapshot, screen.targets())?;
        screen.present(&snapshot)?;

        self.cycles += 1;
        log_cycle(self.cycles, days, snapshot.revenue_total(), &snapshot.fingerprint());
        Ok(Some(snapshot))
    }

    /// Applies `trigger` and runs the cycle it asks for.
    pub fn handle(&mut self, trigger: Trigger, screen: &mut dyn Screen) -> Result<Option<DashboardSnapshot>> {
        if let Trigger::RangeChanged(days) = trigger {
            self.select_range(days);
        }
        self.refresh(screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActivityEntry, KpiMetric, RevenuePoint};
    use crate::random::{Entropy, Scripted};
    use crate::render::DrawCommand;
    use crate::simulate::{normalize_mix, KPI_LABELS};

    fn dashboard(days: u32) -> Dashboard {
        Dashboard::new(
            Box::new(Entropy::seeded(17)),
            RangeSelector::new(days).unwrap(),
        )
    }

    fn screen() -> MemoryScreen {
        MemoryScreen::new((640.0, 260.0), (420.0, 260.0))
    }

    fn fixed_snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            range_days: 7,
            revenue: (1..=7).map(|day| RevenuePoint { day, value: 200.0 }).collect(),
            product_mix: normalize_mix(&[("Enterprise", 40.0), ("Teams", 30.0), ("Consumer", 20.0), ("Services", 10.0)]),
            kpis: vec![KpiMetric {
                label: "Revenue".into(),
                display_value: "$200,000".into(),
                trend: -0.05,
                delta_label: "-5.0%".into(),
            }],
            activity: vec![ActivityEntry {
                label: "Churn alert".into(),
                value: "-1 acct".into(),
            }],
            customers: reference_customers(),
            updated_at: "14:05".into(),
        }
    }

    #[test]
    fn test_compose_order_and_captions() {
        let commands = compose(&fixed_snapshot());
        let regions: Vec<Region> = commands.iter().map(|c| c.region).collect();
        assert_eq!(
            regions,
            vec![
                Region::KpiGrid,
                Region::ActivityMeta,
                Region::ActivityFeed,
                Region::CustomerTable,
                Region::RevenueMeta,
                Region::MixMeta,
            ]
        );
        assert_eq!(commands[1].content, RegionContent::Text("Updated 14:05".into()));
        assert_eq!(commands[4].content, RegionContent::Text("$1,400,000 7-day total".into()));
        assert_eq!(commands[5].content, RegionContent::Text(MIX_CAPTION.into()));
    }

    #[test]
    fn test_compose_kpi_card_badge() {
        let commands = compose(&fixed_snapshot());
        match &commands[0].content {
            RegionContent::KpiCards(cards) => {
                assert_eq!(cards[0].direction, TrendDirection::Down);
                assert_eq!(cards[0].badge, "▼ 5.0%");
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_customer_rows_format_currency() {
        let rows = customer_rows(&[CustomerRecord {
            name: "Acme Holdings".into(),
            value: 420_000.0,
            health: Health::Good,
        }]);
        assert_eq!(rows[0].value, "$420,000");
    }

    #[test]
    fn test_refresh_paints_everything() {
        let mut dash = dashboard(7);
        let mut out = screen();
        let snap = dash.refresh(&mut out).unwrap().unwrap();

        assert_eq!(snap.revenue.len(), 7);
        assert!(snap.revenue.iter().all(|p| p.value >= 120.0));
        assert_eq!(snap.product_mix.len(), 4);
        let labels: Vec<&str> = snap.kpis.iter().map(|k| k.label.as_str()).collect();
        assert_eq!(labels, KPI_LABELS.to_vec());
        assert_eq!(snap.activity.len(), 5);
        assert_eq!(snap.customers.len(), 5);

        assert!(matches!(out.revenue.commands()[0], DrawCommand::Clear { .. }));
        assert!(out.mix.commands().iter().any(|c| matches!(c, DrawCommand::Fill { .. })));
        for region in [
            Region::KpiGrid,
            Region::ActivityMeta,
            Region::ActivityFeed,
            Region::CustomerTable,
            Region::RevenueMeta,
            Region::MixMeta,
        ] {
            assert!(out.content.get(region).is_some(), "missing {:?}", region);
        }
        assert!(out.content.text(Region::RevenueMeta).unwrap().ends_with("7-day total"));
        assert_eq!(dash.cycles(), 1);
    }

    #[test]
    fn test_revenue_kpi_matches_painted_series() {
        let mut dash = dashboard(14);
        let mut out = screen();
        let snap = dash.refresh(&mut out).unwrap().unwrap();
        let latest = snap.revenue.last().unwrap().value;
        assert_eq!(snap.kpis[0].display_value, format_currency(latest * 1000.0));
    }

    #[test]
    fn test_refresh_twice_is_independent() {
        let mut dash = dashboard(30);
        let mut out = screen();
        let a = dash.refresh(&mut out).unwrap().unwrap();
        let b = dash.refresh(&mut out).unwrap().unwrap();
        assert_eq!(a.revenue.len(), b.revenue.len());
        assert_ne!(a.revenue, b.revenue);
        assert_eq!(dash.cycles(), 2);
    }

    #[test]
    fn test_refresh_dropped_while_busy() {
        let mut dash = dashboard(7);
        let mut out = screen();
        let guard = dash.guard();
        let token = guard.try_begin().unwrap();
        assert!(dash.refresh(&mut out).unwrap().is_none());
        assert_eq!(dash.cycles(), 0);
        drop(token);
        assert!(dash.refresh(&mut out).unwrap().is_some());
    }

    #[test]
    fn test_range_change_trigger() {
        let mut dash = dashboard(7);
        let mut out = screen();
        let snap = dash.handle(Trigger::RangeChanged(90), &mut out).unwrap().unwrap();
        assert_eq!(snap.revenue.len(), 90);
        assert_eq!(dash.range_days(), 90);

        let snap = dash.handle(Trigger::RangeChanged(3), &mut out).unwrap().unwrap();
        assert_eq!(snap.revenue.len(), 90);
    }

    #[test]
    fn test_scripted_source_gives_exact_series() {
        let mut dash = Dashboard::new(
            Box::new(Scripted::new(&[200, 5, -3, 1, 2, 3, 4, 5, 6, 7], &[])),
            RangeSelector::new(7).unwrap(),
        );
        let snap = dash.generate(7);
        let values: Vec<f64> = snap.revenue.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![205.0, 202.0, 203.0, 205.0, 208.0, 212.0, 217.0]);
    }

    struct FailingSink;

    impl ContentSink for FailingSink {
        fn replace(&mut self, _command: DisplayCommand) -> Result<()> {
            anyhow::bail!("region unavailable")
        }
    }

    struct FailingScreen {
        revenue: RecordingSurface,
        mix: RecordingSurface,
        sink: FailingSink,
    }

    impl Screen for FailingScreen {
        fn targets(&mut self) -> Targets<'_> {
            Targets {
                revenue: &mut self.revenue,
                mix: &mut self.mix,
                content: &mut self.sink,
            }
        }
    }

    #[test]
    fn test_failed_cycle_keeps_painted_charts() {
        let mut dash = dashboard(7);
        let mut out = FailingScreen {
            revenue: RecordingSurface::new(100.0, 100.0),
            mix: RecordingSurface::new(100.0, 100.0),
            sink: FailingSink,
        };
        assert!(dash.refresh(&mut out).is_err());
        assert!(!out.revenue.commands().is_empty());
        assert_eq!(dash.cycles(), 0);
        // guard released after the aborted cycle
        assert!(!dash.guard().is_busy());
    }
}
