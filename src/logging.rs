//! Structured JSON-lines logging for the dashboard runtime.
//!
//! Every record carries `ts`, `run_id`, `seq`, `lvl`, `component`, `event`
//! and a `data` object. Records go to stdout and to
//! `<LOG_DIR>/<run_id>/events.jsonl` (trace/debug to `trace.jsonl`).
//!
//! Filtering:
//! - `LOG_LEVEL`: trace | debug | info | warn | error (default info)
//! - `LOG_DOMAINS`: comma-separated domain list or `all`

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Data,    // Simulated series, mixes, KPIs
    Render,  // Chart and panel output
    Refresh, // Cycle lifecycle
    Input,   // Range changes, refresh requests, timer ticks
    System,  // Startup, shutdown
    Profile, // Timing
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Data => "data",
            Domain::Render => "render",
            Domain::Refresh => "refresh",
            Domain::Input => "input",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn is_enabled(&self) -> bool {
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    events: Option<Mutex<BufWriter<File>>>,
    trace: Option<Mutex<BufWriter<File>>>,
}

fn open_sink(path: PathBuf) -> Option<Mutex<BufWriter<File>>> {
    match File::create(&path) {
        Ok(f) => Some(Mutex::new(BufWriter::new(f))),
        Err(err) => {
            eprintln!("[log] failed to create {}: {}", path.display(), err);
            None
        }
    }
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let base = std::env::var("LOG_DIR").unwrap_or_else(|_| "out/runs".to_string());
        let mut run_dir = PathBuf::from(base);
        run_dir.push(&run_id);
        if let Err(err) = create_dir_all(&run_dir) {
            eprintln!("[log] failed to create run dir: {}", err);
        }
        RunContext {
            events: open_sink(run_dir.join("events.jsonl")),
            trace: open_sink(run_dir.join("trace.jsonl")),
            run_id,
        }
    })
}

fn write_line(writer: &Option<Mutex<BufWriter<File>>>, line: &str) {
    if let Some(Ok(mut w)) = writer.as_ref().map(|m| m.lock()) {
        let _ = writeln!(w, "{}", line);
        let _ = w.flush();
    }
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    emit_record(level, domain.as_str(), event, fields);
}

fn build_record(run_id: &str, level: Level, component: &str, event: &str, mut data: Map<String, Value>) -> Value {
    let msg = data.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(run_id));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry)
}

fn emit_record(level: Level, component: &str, event: &str, fields: Map<String, Value>) {
    let ctx = ensure_run_context();
    let line = build_record(&ctx.run_id, level, component, event, fields).to_string();
    match level {
        Level::Trace | Level::Debug => write_line(&ctx.trace, &line),
        _ => write_line(&ctx.events, &line),
    }
    println!("{}", line);
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_startup(range_days: u32, refresh_ms: u64, out_dir: &str, seeded: bool) {
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("range_days", json!(range_days)),
            ("refresh_ms", json!(refresh_ms)),
            ("out_dir", v_str(out_dir)),
            ("seeded", json!(seeded)),
        ]),
    );
}

pub fn log_trigger(trigger: &str, range_days: u32) {
    log(
        Level::Debug,
        Domain::Input,
        "trigger",
        obj(&[("trigger", v_str(trigger)), ("range_days", json!(range_days))]),
    );
}

pub fn log_trigger_dropped(trigger: &str) {
    agg_increment("dropped");
    log(
        Level::Warn,
        Domain::Input,
        "trigger_dropped",
        obj(&[("trigger", v_str(trigger)), ("msg", v_str("refresh already in progress"))]),
    );
}

pub fn log_range_rejected(requested: u32, kept: u32) {
    log(
        Level::Warn,
        Domain::Input,
        "range_rejected",
        obj(&[("requested", json!(requested)), ("kept", json!(kept))]),
    );
}

pub fn log_cycle(cycle: u64, range_days: u32, revenue_total: f64, fingerprint: &str) {
    agg_increment("cycle");
    log(
        Level::Info,
        Domain::Refresh,
        "cycle",
        obj(&[
            ("cycle", json!(cycle)),
            ("range_days", json!(range_days)),
            ("revenue_total", v_num(revenue_total)),
            ("fingerprint", v_str(fingerprint)),
        ]),
    );
}

pub fn log_cycle_failed(cycle: u64, error: &str) {
    agg_increment("failed");
    log(
        Level::Error,
        Domain::Refresh,
        "cycle_failed",
        obj(&[("cycle", json!(cycle)), ("msg", v_str(error))]),
    );
}

pub fn log_series(points: usize, min: f64, max: f64) {
    log(
        Level::Trace,
        Domain::Data,
        "revenue_series",
        obj(&[("points", json!(points)), ("min", v_num(min)), ("max", v_num(max))]),
    );
}

pub fn log_frame_written(path: &str, bytes: usize) {
    log(
        Level::Debug,
        Domain::Render,
        "frame_written",
        obj(&[("path", v_str(path)), ("bytes", json!(bytes))]),
    );
}

/// Session summary on shutdown
pub fn log_session_summary(duration_secs: u64) {
    let (cycles, dropped, failed) = agg_snapshot();
    log(
        Level::Info,
        Domain::System,
        "session_summary",
        obj(&[
            ("duration_secs", json!(duration_secs)),
            ("cycles", json!(cycles)),
            ("dropped_triggers", json!(dropped)),
            ("failed_cycles", json!(failed)),
        ]),
    );
}

// =============================================================================
// Utility Functions
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Profiling scope that emits structured timing on drop.
pub struct ProfileScope {
    label: &'static str,
    context: Map<String, Value>,
    started: Instant,
}

impl ProfileScope {
    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        Self {
            label,
            context: obj(fields),
            started: Instant::now(),
        }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = std::mem::take(&mut self.context);
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}

// =============================================================================
// Session counters
// =============================================================================

static AGGREGATOR: OnceLock<Mutex<SessionCounters>> = OnceLock::new();

#[derive(Debug, Default)]
struct SessionCounters {
    cycles: u64,
    dropped: u64,
    failed: u64,
}

fn get_aggregator() -> &'static Mutex<SessionCounters> {
    AGGREGATOR.get_or_init(|| Mutex::new(SessionCounters::default()))
}

fn agg_increment(event: &str) {
    if let Ok(mut agg) = get_aggregator().lock() {
        match event {
            "cycle" => agg.cycles += 1,
            "dropped" => agg.dropped += 1,
            "failed" => agg.failed += 1,
            _ => {}
        }
    }
}

fn agg_snapshot() -> (u64, u64, u64) {
    get_aggregator()
        .lock()
        .map(|a| (a.cycles, a.dropped, a.failed))
        .unwrap_or((0, 0, 0))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_obj_helper() {
        let m = obj(&[("key", v_str("value")), ("num", v_num(42.0))]);
        assert_eq!(m.get("key").unwrap(), "value");
        assert_eq!(m.get("num").unwrap(), 42.0);
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }

    #[test]
    fn test_record_shape() {
        let rec = build_record(
            "r-test",
            Level::Warn,
            "input",
            "range_rejected",
            obj(&[("msg", v_str("nope")), ("requested", json!(3))]),
        );
        assert_eq!(rec["lvl"], "WARN");
        assert_eq!(rec["component"], "input");
        assert_eq!(rec["msg"], "nope");
        assert_eq!(rec["data"]["requested"], 3);
        assert!(rec["data"].get("msg").is_none());
    }

    #[test]
    fn test_counters_accumulate() {
        let (before, _, _) = agg_snapshot();
        agg_increment("cycle");
        let (after, _, _) = agg_snapshot();
        assert!(after > before);
    }
}
