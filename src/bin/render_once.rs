//! Runs a single refresh cycle and exits.
//!
//! `render_once [--json]` writes the frame to `OUT_DIR`, or with `--json`
//! prints the snapshot, panel content and recorded draw commands to stdout.
//! `SEED` and `RANGE_DAYS` are honored as for the main binary. Log records
//! also go to stdout; use `LOG_LEVEL=warn` to keep the JSON clean.

use anyhow::{anyhow, Result};
use serde_json::json;
use std::env;

use pulseboard::config::Config;
use pulseboard::interaction::RangeSelector;
use pulseboard::output::FileScreen;
use pulseboard::random::{Entropy, RandomSource};
use pulseboard::view::{Dashboard, MemoryScreen};

fn main() -> Result<()> {
    let cfg = Config::from_env();
    let as_json = env::args().skip(1).any(|a| a == "--json");

    let range = RangeSelector::new(cfg.range_days).map_err(|e| anyhow!(e))?;
    let source: Box<dyn RandomSource + Send> = match cfg.seed {
        Some(seed) => Box::new(Entropy::seeded(seed)),
        None => Box::new(Entropy::from_entropy()),
    };
    let mut dashboard = Dashboard::new(source, range);

    if as_json {
        let mut screen = MemoryScreen::new(
            (cfg.revenue_width, cfg.revenue_height),
            (cfg.mix_width, cfg.mix_height),
        );
        let snapshot = dashboard
            .refresh(&mut screen)?
            .ok_or_else(|| anyhow!("refresh skipped"))?;
        let payload = json!({
            "fingerprint": snapshot.fingerprint(),
            "snapshot": snapshot,
            "panels": screen.content.to_json(),
            "revenue_chart": screen.revenue.to_json(),
            "mix_chart": screen.mix.to_json(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let mut screen = FileScreen::from_config(&cfg)?;
    dashboard.refresh(&mut screen)?;
    eprintln!("[render_once] wrote frame to {}", screen.dir().display());
    Ok(())
}
