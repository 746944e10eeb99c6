use anyhow::Result;
use std::io::BufRead;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tokio::sync::Notify;

use pulseboard::config::Config;
use pulseboard::interaction::{parse_command, run_event_loop, trigger_channel, Command, RangeSelector, TriggerSender};
use pulseboard::logging::{log_range_rejected, log_session_summary, log_startup};
use pulseboard::output::FileScreen;
use pulseboard::random::{Entropy, RandomSource};
use pulseboard::view::Dashboard;

/// Reads control commands from stdin on a plain thread until EOF or `quit`.
/// Only `quit` stops the dashboard; after EOF the timer keeps refreshing.
fn read_commands(sender: TriggerSender, quit: Arc<Notify>) {
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        match parse_command(&line) {
            Ok(Some(Command::Trigger(trigger))) => {
                sender.offer(trigger);
            }
            Ok(Some(Command::Quit)) => {
                quit.notify_one();
                return;
            }
            Ok(None) => {}
            Err(err) => eprintln!("[input] {}", err),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let started = Instant::now();

    let range = RangeSelector::new(cfg.range_days).unwrap_or_else(|_| {
        let fallback = RangeSelector::default();
        log_range_rejected(cfg.range_days, fallback.days());
        fallback
    });
    let source: Box<dyn RandomSource + Send> = match cfg.seed {
        Some(seed) => Box::new(Entropy::seeded(seed)),
        None => Box::new(Entropy::from_entropy()),
    };
    let mut dashboard = Dashboard::new(source, range);
    let mut screen = FileScreen::from_config(&cfg)?;

    log_startup(range.days(), cfg.refresh_ms, &cfg.out_dir, cfg.seed.is_some());
    eprintln!("[pulseboard] commands: r | range <7|14|30|90> | q");

    // main keeps one sender so the channel stays open after stdin EOF
    let (sender, triggers) = trigger_channel(dashboard.guard());
    let quit = Arc::new(Notify::new());
    {
        let sender = sender.clone();
        let quit = Arc::clone(&quit);
        thread::spawn(move || read_commands(sender, quit));
    }

    tokio::select! {
        _ = run_event_loop(
            &mut dashboard,
            &mut screen,
            triggers,
            cfg.refresh_interval(),
            cfg.max_cycles,
        ) => {}
        _ = quit.notified() => {}
    }
    drop(sender);

    log_session_summary(started.elapsed().as_secs());
    Ok(())
}
