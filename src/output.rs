use anyhow::{Context, Result};
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::logging::log_frame_written;
use crate::model::DashboardSnapshot;
use crate::render::SvgSurface;
use crate::view::{MemorySink, Screen, Targets};

pub const REVENUE_FILE: &str = "revenue.svg";
pub const MIX_FILE: &str = "product_mix.svg";
pub const PANELS_FILE: &str = "panels.json";
pub const SNAPSHOT_FILE: &str = "snapshot.json";

/// Screen that writes the latest frame into a directory, overwriting the
/// previous one.
#[derive(Debug)]
pub struct FileScreen {
    dir: PathBuf,
    revenue: SvgSurface,
    mix: SvgSurface,
    content: MemorySink,
}

impl FileScreen {
    pub fn new(dir: impl Into<PathBuf>, revenue_size: (f64, f64), mix_size: (f64, f64)) -> Result<Self> {
        let dir = dir.into();
        create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        Ok(Self {
            dir,
            revenue: SvgSurface::new(revenue_size.0, revenue_size.1),
            mix: SvgSurface::new(mix_size.0, mix_size.1),
            content: MemorySink::new(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            &cfg.out_dir,
            (cfg.revenue_width, cfg.revenue_height),
            (cfg.mix_width, cfg.mix_height),
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, name: &str, body: &str) -> Result<()> {
        let path = self.dir.join(name);
        fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        log_frame_written(&path.display().to_string(), body.len());
        Ok(())
    }

    fn write_svg(&self, name: &str, svg: &SvgSurface) -> Result<()> {
        let path = self.dir.join(name);
        let bytes = svg.write_to(&path)?;
        log_frame_written(&path.display().to_string(), bytes);
        Ok(())
    }
}

impl Screen for FileScreen {
    fn targets(&mut self) -> Targets<'_> {
        Targets {
            revenue: &mut self.revenue,
            mix: &mut self.mix,
            content: &mut self.content,
        }
    }

    fn present(&mut self, snapshot: &DashboardSnapshot) -> Result<()> {
        self.write_svg(REVENUE_FILE, &self.revenue)?;
        self.write_svg(MIX_FILE, &self.mix)?;
        self.write(PANELS_FILE, &serde_json::to_string_pretty(&self.content.to_json())?)?;
        let mut snap = serde_json::to_value(snapshot)?;
        snap["fingerprint"] = serde_json::Value::String(snapshot.fingerprint());
        self.write(SNAPSHOT_FILE, &serde_json::to_string_pretty(&snap)?)?;
        Ok(())
    }
}
