//! Inputs that start refresh cycles: the range selector, manual refresh and
//! the periodic timer.
//!
//! Cycles never overlap. The event loop runs them one at a time on a single
//! task, and [`RefreshGuard`] lets producers on other tasks drop triggers
//! while a cycle is in progress instead of queueing them behind it. A range
//! change is recorded on the guard even when its trigger is dropped, so the
//! next cycle of any kind picks it up.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::logging::{log_cycle_failed, log_trigger, log_trigger_dropped};
use crate::view::{Dashboard, Screen};

/// Day counts the range control offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSelector {
    days: u32,
}

impl RangeSelector {
    pub const ALLOWED_DAYS: [u32; 4] = [7, 14, 30, 90];
    pub const DEFAULT_DAYS: u32 = 30;

    pub fn new(days: u32) -> Result<Self, String> {
        if Self::ALLOWED_DAYS.contains(&days) {
            Ok(Self { days })
        } else {
            Err(format!(
                "unsupported range {} (expected one of {:?})",
                days,
                Self::ALLOWED_DAYS
            ))
        }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// Switches to `days`; an unsupported value leaves the selection as is.
    pub fn select(&mut self, days: u32) -> Result<u32, String> {
        *self = Self::new(days)?;
        Ok(self.days)
    }
}

impl Default for RangeSelector {
    fn default() -> Self {
        Self {
            days: Self::DEFAULT_DAYS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Timer,
    Refresh,
    RangeChanged(u32),
}

impl Trigger {
    pub fn name(&self) -> &'static str {
        match self {
            Trigger::Timer => "timer",
            Trigger::Refresh => "refresh",
            Trigger::RangeChanged(_) => "range_changed",
        }
    }
}

/// A line typed on the control input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Trigger(Trigger),
    Quit,
}

/// Parses `r`/`refresh`, `range <days>` and `q`/`quit`. Blank lines yield
/// `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let cmd = match head.to_lowercase().as_str() {
        "r" | "refresh" => Command::Trigger(Trigger::Refresh),
        "q" | "quit" => Command::Quit,
        "range" => {
            let days = parts
                .next()
                .ok_or_else(|| "range needs a day count".to_string())?
                .parse::<u32>()
                .map_err(|e| format!("bad day count: {}", e))?;
            Command::Trigger(Trigger::RangeChanged(days))
        }
        other => return Err(format!("unknown command: {}", other)),
    };
    Ok(Some(cmd))
}

/// Busy flag and latest requested range, shared between the cycle runner and
/// trigger producers.
#[derive(Debug, Default)]
pub struct RefreshGuard {
    busy: AtomicBool,
    // 0 when no range change is waiting
    pending_range: AtomicU32,
}

/// Holds the guard until dropped.
#[derive(Debug)]
pub struct RefreshToken<'a> {
    guard: &'a RefreshGuard,
}

impl RefreshGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another token is alive.
    pub fn try_begin(&self) -> Option<RefreshToken<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshToken { guard: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Records `days` as the range for the next cycle. Later requests win.
    pub fn request_range(&self, days: u32) {
        self.pending_range.store(days, Ordering::Release);
    }

    pub fn take_pending_range(&self) -> Option<u32> {
        match self.pending_range.swap(0, Ordering::AcqRel) {
            0 => None,
            days => Some(days),
        }
    }
}

impl Drop for RefreshToken<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}

/// Producer handle: forwards triggers to the event loop unless a cycle is
/// running. Range changes are kept on the guard either way.
#[derive(Debug, Clone)]
pub struct TriggerSender {
    tx: mpsc::Sender<Trigger>,
    guard: Arc<RefreshGuard>,
}

impl TriggerSender {
    /// Returns whether the trigger was accepted.
    pub fn offer(&self, trigger: Trigger) -> bool {
        if let Trigger::RangeChanged(days) = trigger {
            self.guard.request_range(days);
        }
        if self.guard.is_busy() {
            log_trigger_dropped(trigger.name());
            return false;
        }
        match self.tx.try_send(trigger) {
            Ok(()) => true,
            Err(_) => {
                log_trigger_dropped(trigger.name());
                false
            }
        }
    }
}

/// Capacity 1: at most one trigger waits while the loop is idle-polling.
pub fn trigger_channel(guard: Arc<RefreshGuard>) -> (TriggerSender, mpsc::Receiver<Trigger>) {
    let (tx, rx) = mpsc::channel(1);
    (TriggerSender { tx, guard }, rx)
}

fn run_cycle(dashboard: &mut Dashboard, screen: &mut dyn Screen, trigger: Trigger) -> bool {
    log_trigger(trigger.name(), dashboard.range_days());
    match dashboard.handle(trigger, screen) {
        Ok(Some(_)) => true,
        Ok(None) => false,
        Err(err) => {
            log_cycle_failed(dashboard.cycles() + 1, &format!("{:#}", err));
            false
        }
    }
}

/// Runs the initial render as a timer cycle before looking at the channel,
/// then one cycle per timer tick (every `period` after that) and per
/// received trigger, until the trigger channel closes or `max_cycles`
/// completed cycles. Failed cycles are logged and the loop carries on.
/// Returns the number of completed cycles.
pub async fn run_event_loop(
    dashboard: &mut Dashboard,
    screen: &mut dyn Screen,
    mut triggers: mpsc::Receiver<Trigger>,
    period: Duration,
    max_cycles: Option<u64>,
) -> u64 {
    let reached = |completed: u64| max_cycles.is_some_and(|max| completed >= max);
    let mut completed = 0u64;
    if run_cycle(dashboard, screen, Trigger::Timer) {
        completed += 1;
    }

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while !reached(completed) {
        let trigger = tokio::select! {
            _ = ticker.tick() => Trigger::Timer,
            received = triggers.recv() => match received {
                Some(t) => t,
                None => break,
            },
        };
        if run_cycle(dashboard, screen, trigger) {
            completed += 1;
        }
    }
    completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::Entropy;
    use crate::view::MemoryScreen;

    #[test]
    fn test_range_selector() {
        assert_eq!(RangeSelector::default().days(), 30);
        assert!(RangeSelector::new(7).is_ok());
        assert!(RangeSelector::new(1).is_err());

        let mut sel = RangeSelector::new(14).unwrap();
        assert_eq!(sel.select(90), Ok(90));
        assert!(sel.select(45).is_err());
        assert_eq!(sel.days(), 90);
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("r"), Ok(Some(Command::Trigger(Trigger::Refresh))));
        assert_eq!(parse_command("  Refresh "), Ok(Some(Command::Trigger(Trigger::Refresh))));
        assert_eq!(
            parse_command("range 14"),
            Ok(Some(Command::Trigger(Trigger::RangeChanged(14))))
        );
        assert_eq!(parse_command("quit"), Ok(Some(Command::Quit)));
        assert_eq!(parse_command(""), Ok(None));
        assert!(parse_command("range").is_err());
        assert!(parse_command("range many").is_err());
        assert!(parse_command("zoom").is_err());
    }

    #[test]
    fn test_guard_is_exclusive() {
        let guard = RefreshGuard::new();
        let token = guard.try_begin().unwrap();
        assert!(guard.is_busy());
        assert!(guard.try_begin().is_none());
        drop(token);
        assert!(!guard.is_busy());
        assert!(guard.try_begin().is_some());
    }

    #[test]
    fn test_sender_drops_while_busy() {
        let guard = Arc::new(RefreshGuard::new());
        let (sender, mut rx) = trigger_channel(Arc::clone(&guard));
        let token = guard.try_begin().unwrap();
        assert!(!sender.offer(Trigger::Refresh));
        drop(token);
        assert!(sender.offer(Trigger::Refresh));
        assert_eq!(rx.try_recv().ok(), Some(Trigger::Refresh));
    }

    #[test]
    fn test_sender_drops_when_full() {
        let guard = Arc::new(RefreshGuard::new());
        let (sender, _rx) = trigger_channel(guard);
        assert!(sender.offer(Trigger::Refresh));
        assert!(!sender.offer(Trigger::Refresh));
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(Box::new(Entropy::seeded(99)), RangeSelector::new(7).unwrap())
    }

    #[test]
    fn test_pending_range_latest_wins() {
        let guard = RefreshGuard::new();
        assert_eq!(guard.take_pending_range(), None);
        guard.request_range(14);
        guard.request_range(90);
        assert_eq!(guard.take_pending_range(), Some(90));
        assert_eq!(guard.take_pending_range(), None);
    }

    #[test]
    fn test_range_change_survives_full_channel() {
        let mut dash = dashboard();
        let mut screen = MemoryScreen::new((320.0, 120.0), (320.0, 120.0));
        let (sender, mut rx) = trigger_channel(dash.guard());
        assert!(sender.offer(Trigger::Refresh));
        assert!(!sender.offer(Trigger::RangeChanged(14)));

        assert_eq!(rx.try_recv().ok(), Some(Trigger::Refresh));
        let snap = dash.handle(Trigger::Timer, &mut screen).unwrap().unwrap();
        assert_eq!(dash.range_days(), 14);
        assert_eq!(snap.revenue.len(), 14);
    }

    #[test]
    fn test_range_change_survives_busy_guard() {
        let mut dash = dashboard();
        let mut screen = MemoryScreen::new((320.0, 120.0), (320.0, 120.0));
        let guard = dash.guard();
        let (sender, _rx) = trigger_channel(Arc::clone(&guard));

        let token = guard.try_begin().unwrap();
        assert!(!sender.offer(Trigger::RangeChanged(90)));
        drop(token);

        let snap = dash.handle(Trigger::Refresh, &mut screen).unwrap().unwrap();
        assert_eq!(snap.revenue.len(), 90);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_initial_render_precedes_queued_triggers() {
        let mut dash = dashboard();
        let mut screen = MemoryScreen::new((320.0, 120.0), (320.0, 120.0));
        let (tx, rx) = mpsc::channel(4);
        tx.send(Trigger::Refresh).await.unwrap();
        tx.send(Trigger::RangeChanged(14)).await.unwrap();
        drop(tx);

        let completed =
            run_event_loop(&mut dash, &mut screen, rx, Duration::from_secs(3600), None).await;
        assert_eq!(completed, 3);
        assert_eq!(dash.cycles(), 3);
        assert_eq!(dash.range_days(), 14);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_timer_with_cycle_cap() {
        let mut dash = dashboard();
        let mut screen = MemoryScreen::new((320.0, 120.0), (320.0, 120.0));
        let (_tx, rx) = mpsc::channel(1);
        let started = Instant::now();
        let completed =
            run_event_loop(&mut dash, &mut screen, rx, Duration::from_millis(8000), Some(3)).await;
        assert_eq!(completed, 3);
        assert_eq!(dash.cycles(), 3);
        // initial render, then ticks at 8s and 16s
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(16) && elapsed < Duration::from_secs(17));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_applies_range_dropped_on_full_channel() {
        let mut dash = dashboard();
        let mut screen = MemoryScreen::new((320.0, 120.0), (320.0, 120.0));
        let (sender, rx) = trigger_channel(dash.guard());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(4)).await;
            assert!(sender.offer(Trigger::Refresh));
            assert!(!sender.offer(Trigger::RangeChanged(90)));
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let completed =
            run_event_loop(&mut dash, &mut screen, rx, Duration::from_secs(8), None).await;
        // initial render, refresh at 4s, tick at 8s; channel closes at 14s
        assert_eq!(completed, 3);
        assert_eq!(dash.range_days(), 90);
    }
}
