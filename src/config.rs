use std::time::Duration;

use crate::interaction::RangeSelector;

/// Runtime configuration, read from the environment with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub range_days: u32,
    pub refresh_ms: u64,
    pub revenue_width: f64,
    pub revenue_height: f64,
    pub mix_width: f64,
    pub mix_height: f64,
    pub out_dir: String,
    pub seed: Option<u64>,
    pub max_cycles: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            range_days: RangeSelector::DEFAULT_DAYS,
            refresh_ms: 8_000,
            revenue_width: 640.0,
            revenue_height: 260.0,
            mix_width: 420.0,
            mix_height: 260.0,
            out_dir: "out/frames".to_string(),
            seed: None,
            max_cycles: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unparsable values fall back to
    /// the defaults.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        Self {
            range_days: get("RANGE_DAYS").and_then(|v| v.parse().ok()).unwrap_or(d.range_days),
            refresh_ms: get("REFRESH_MS").and_then(|v| v.parse().ok()).unwrap_or(d.refresh_ms),
            revenue_width: get("REVENUE_WIDTH").and_then(|v| v.parse().ok()).unwrap_or(d.revenue_width),
            revenue_height: get("REVENUE_HEIGHT").and_then(|v| v.parse().ok()).unwrap_or(d.revenue_height),
            mix_width: get("MIX_WIDTH").and_then(|v| v.parse().ok()).unwrap_or(d.mix_width),
            mix_height: get("MIX_HEIGHT").and_then(|v| v.parse().ok()).unwrap_or(d.mix_height),
            out_dir: get("OUT_DIR").unwrap_or(d.out_dir),
            seed: get("SEED").and_then(|v| v.parse().ok()),
            max_cycles: get("MAX_CYCLES").and_then(|v| v.parse().ok()),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(1))
    }
}
