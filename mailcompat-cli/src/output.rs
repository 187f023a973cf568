//! Report rendering.

use std::io::{self, Write};

use clap::ValueEnum;
use mailcompat_engine::{Category, ParseReport, ReportContainer, ReportEntry};
use owo_colors::OwoColorize;
use serde_json::Value;
use strum::IntoEnumIterator;
use strum_macros::Display;

/// How the report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// The report as JSON, as consumed by other tools.
    Json,
    /// Every entry grouped by category, with support figures.
    Pretty,
    /// One line per category.
    Summary,
}

/// Support counts over every client, platform and version listed in a rule's
/// `stats`. The first state of each version decides: `y` supported, `n`
/// unsupported, anything else (partial support, with notes) mitigated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupportStats {
    /// Versions with full support.
    pub supported: usize,
    /// Versions with partial support.
    pub mitigated: usize,
    /// Versions without support.
    pub unsupported: usize,
}

impl SupportStats {
    /// Stats for one rule info, `None` when it carries no support data.
    pub fn of(rules: &Value) -> Option<Self> {
        let mut stats = Self::default();
        let families = rules.get("stats")?.as_object()?;
        for platforms in families.values().filter_map(Value::as_object) {
            for versions in platforms.values().filter_map(Value::as_object) {
                for states in versions.values() {
                    match states.get(0).and_then(Value::as_str) {
                        Some("y") => stats.supported += 1,
                        Some("n") => stats.unsupported += 1,
                        _ => stats.mitigated += 1,
                    }
                }
            }
        }
        (stats.total() > 0).then_some(stats)
    }

    /// Number of versions counted.
    pub const fn total(&self) -> usize {
        self.supported + self.mitigated + self.unsupported
    }

    /// Share of clients rendering the feature at least partially, in percent.
    #[allow(clippy::cast_precision_loss)]
    pub fn full_support_percentage(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        (self.supported + self.mitigated) as f64 * 100.0 / self.total() as f64
    }
}

/// Write `report` to `out` in `format`.
pub fn write_report(
    mut out: impl Write,
    report: &ParseReport,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, report)?;
            writeln!(out)
        }
        OutputFormat::Pretty => write_pretty(out, report),
        OutputFormat::Summary => write_summary(out, report),
    }
}

fn write_pretty(mut out: impl Write, report: &ParseReport) -> io::Result<()> {
    if report.is_empty() {
        return writeln!(out, "{}", "No tracked features found.".green());
    }

    let mut current: Option<Category> = None;
    for entry in report.entries() {
        if current != Some(entry.category) {
            if current.is_some() {
                writeln!(out)?;
            }
            writeln!(out, "=== {} ===", entry.category.bold())?;
            current = Some(entry.category);
        }
        writeln!(out, "  {}", describe(&entry))?;
    }
    Ok(())
}

fn describe(entry: &ReportEntry<'_>) -> String {
    let name = match (entry.key, entry.subkey) {
        ("", "") => title(entry.container).unwrap_or("(any)").to_owned(),
        (key, "") => key.to_owned(),
        (key, subkey) => format!("{key} {}", subkey.replace("||", "=")),
    };

    let mut line = format!("{}  lines {}", name.cyan(), format_lines(entry.container));
    if let Some(stats) = SupportStats::of(&entry.container.rules) {
        let percentage = stats.full_support_percentage();
        let figure = format!("{percentage:.0}% supported");
        let figure = if stats.unsupported == 0 {
            figure.green().to_string()
        } else if percentage >= 50.0 {
            figure.yellow().to_string()
        } else {
            figure.red().to_string()
        };
        line.push_str(&format!("  {figure}"));
    }
    line
}

fn title(container: &ReportContainer) -> Option<&str> {
    container.rules.get("title").and_then(Value::as_str)
}

/// `3, 7, 12` with a trailing `…` when lines were dropped.
fn format_lines(container: &ReportContainer) -> String {
    let mut lines = container
        .lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    if container.more_lines {
        lines.push_str(", …");
    }
    lines
}

fn write_summary(mut out: impl Write, report: &ParseReport) -> io::Result<()> {
    let mut total = 0;
    for category in Category::iter() {
        let (features, occurrences) = report
            .entries()
            .filter(|entry| entry.category == category)
            .fold((0usize, 0usize), |(features, occurrences), entry| {
                (features + 1, occurrences + entry.container.lines.len())
            });
        if features == 0 {
            continue;
        }
        total += features;
        let name: &'static str = category.into();
        writeln!(out, "{name}: {features} features on {occurrences} lines")?;
    }
    writeln!(out, "total: {total} features")
}
