//! mailcompat CLI
//!
//! Reports which HTML and CSS features of an email are tracked by the
//! compatibility rules database, and where they occur.

mod logger;
mod output;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mailcompat_common::warning::warn_once;
use mailcompat_engine::{Engine, EngineConfig, LIMIT_REPORT_LINES, RulesDb};

use output::OutputFormat;

/// mailcompat: email client compatibility report for HTML emails
#[derive(Parser, Debug)]
#[command(name = "mailcompat")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Report on a file
    mailcompat newsletter.html

    # Machine-readable report
    mailcompat --format json newsletter.html > report.json

    # Read from stdin, one line per category
    cat newsletter.html | mailcompat --format summary

    # Check inline HTML against a custom rules database
    mailcompat --rules my-rules.json --html '<video src="a.webm"></video>'
"#)]
struct Cli {
    /// Path to the HTML document (stdin when omitted)
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Analyze an HTML string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Rules database to use instead of the bundled one
    #[arg(long, value_name = "PATH")]
    rules: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Fail when a single HTML token is larger than this many bytes
    #[arg(long, value_name = "N")]
    max_token_bytes: Option<usize>,

    /// Lines kept per report entry
    #[arg(long, value_name = "N", default_value_t = LIMIT_REPORT_LINES)]
    limit_lines: usize,

    /// Log analysis progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        logger::init(log::LevelFilter::Debug)?;
    }

    let rules = load_rules(cli.rules.as_deref())?;
    let document = load_document(&cli)?;
    if std::str::from_utf8(&document).is_err() {
        let _ = warn_once(
            "input",
            "document is not valid UTF-8; invalid bytes were replaced",
        );
    }

    let config = EngineConfig {
        max_token_bytes: cli.max_token_bytes,
        limit_report_lines: cli.limit_lines,
    };
    let report = Engine::with_config(rules, config)
        .report(&document)
        .context("failed to analyze document")?;

    if report.entries().any(|entry| entry.container.more_lines) {
        let _ = warn_once(
            "report",
            &format!(
                "some entries list only their first {} lines",
                cli.limit_lines
            ),
        );
    }

    output::write_report(io::stdout().lock(), &report, cli.format)
        .context("failed to write report")
}

/// Load the rules database from `path`, or the bundled one.
fn load_rules(path: Option<&Path>) -> Result<Arc<RulesDb>> {
    match path {
        Some(path) => {
            let file = fs::File::open(path)
                .with_context(|| format!("failed to open rules database {}", path.display()))?;
            let rules = RulesDb::from_reader(io::BufReader::new(file))
                .with_context(|| format!("failed to load rules database {}", path.display()))?;
            Ok(Arc::new(rules))
        }
        None => Ok(RulesDb::shared_bundled()?),
    }
}

/// Document bytes from `--html`, the path argument, or stdin.
fn load_document(cli: &Cli) -> Result<Vec<u8>> {
    if let Some(ref html) = cli.html {
        return Ok(html.clone().into_bytes());
    }
    if let Some(ref path) = cli.path {
        return fs::read(path).with_context(|| format!("failed to read {}", path.display()));
    }
    let mut document = Vec::new();
    let _ = io::stdin()
        .lock()
        .read_to_end(&mut document)
        .context("failed to read stdin")?;
    Ok(document)
}
