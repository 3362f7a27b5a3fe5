//! calgrid – runs one conditioning pass over a JSON series file and prints
//! the resulting grid (layout, labels, cell polygons) as JSON.
//!
//! ```text
//! calgrid <series.json> [calendar.conf] [--start YYYY-MM-DD] [--end YYYY-MM-DD]
//! ```
//!
//! The range comes from the flags, then from `DATE_START`/`DATE_END` in the
//! config file, then from the span of the data itself.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tracing::info;

use calgrid_common::config::{self, CalendarConfig};
use calgrid_common::record::SeriesSet;
use calgrid_processing::aggregate::aggregate;
use calgrid_processing::{condition, DateRange};

#[derive(Debug, Default)]
struct Args {
    series: PathBuf,
    config: Option<PathBuf>,
    start: Option<String>,
    end: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut positional = Vec::new();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--start" => args.start = Some(it.next().context("--start needs a date")?),
            "--end" => args.end = Some(it.next().context("--end needs a date")?),
            flag if flag.starts_with("--") => bail!("Unknown flag {flag}"),
            _ => positional.push(PathBuf::from(arg)),
        }
    }
    let mut positional = positional.into_iter();
    args.series = positional
        .next()
        .context("usage: calgrid <series.json> [calendar.conf] [--start DATE] [--end DATE]")?;
    args.config = positional.next();
    Ok(args)
}

/// Pick the range: flags, then config, then the data's own span.
fn resolve_range(args: &Args, config: &CalendarConfig, series: &SeriesSet) -> Result<DateRange> {
    let parse = |raw: &str| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("Bad date {raw}"))
    };
    let counts = aggregate(series).counts;

    let start = match (&args.start, config.date_start, counts.first_date()) {
        (Some(raw), _, _) => parse(raw)?,
        (None, Some(d), _) => d,
        (None, None, Some(d)) => d,
        (None, None, None) => bail!("No range given and the series set has no valid dates"),
    };
    let end = match (&args.end, config.date_end, counts.last_date()) {
        (Some(raw), _, _) => parse(raw)?,
        (None, Some(d), _) => d,
        (None, None, Some(d)) => d.succ_opt().context("Last date is out of range")?,
        (None, None, None) => bail!("No range end given and the series set has no valid dates"),
    };
    Ok(DateRange::new(start, end))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    // ── load config ──────────────────────────────────────────────────
    let config = match &args.config {
        Some(path) => config::load(path).context("Config load failed")?,
        None => CalendarConfig::default(),
    };

    // ── load series ──────────────────────────────────────────────────
    let text = std::fs::read_to_string(&args.series)
        .with_context(|| format!("Cannot read {}", args.series.display()))?;
    let series: SeriesSet = serde_json::from_str(&text)
        .with_context(|| format!("Invalid series file: {}", args.series.display()))?;
    info!(
        "Loaded {} series ({} records) from {}",
        series.len(),
        series.records().count(),
        args.series.display()
    );

    // ── condition ────────────────────────────────────────────────────
    let range = resolve_range(&args, &config, &series)?;
    let conditioned = condition(&series, &range, &config).context("Conditioning failed")?;

    println!("{}", serde_json::to_string_pretty(&conditioned)?);
    Ok(())
}
