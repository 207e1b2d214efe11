use std::io::Write;
use std::path::PathBuf;
use std::sync::Once;
use std::thread;

use anyhow::{Context, anyhow};
use clap::{Parser, ValueEnum};
use retpair_core::{
    BenchConfig, Case, CaseReport, ExecContext, RunEvent, Runner, Sink,
    alloc_stats::CountingAllocator,
};


#[global_allocator]
static GLOBAL_ALLOCATOR: CountingAllocator = CountingAllocator::new();

static TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "retpair_core=debug,retpair_cli=info";
const RUNNER_THREAD_NAME: &str = "retpair-runner";

#[derive(Debug, Parser)]
#[command(
    name = "retpair",
    author,
    version,
    about = "Compare ways of returning a pair of values from a call",
    long_about = None
)]
struct CliArgs {
    /// TOML file with runner settings; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Minimum time per case in the warmup pass
    #[arg(long, value_name = "MS")]
    warmup_ms: Option<u64>,

    /// Minimum time per case in the measurement pass
    #[arg(long, value_name = "MS")]
    measure_ms: Option<u64>,

    /// Iterations in the first round of each case
    #[arg(long, value_name = "N")]
    start_iterations: Option<u64>,

    /// Only run this case (repeatable); see --list
    #[arg(long = "case", value_name = "KEY")]
    cases: Vec<String>,

    /// Also time the allocator (adds overhead to allocating cases)
    #[arg(long)]
    alloc_timing: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print the case keys and exit
    #[arg(long)]
    list: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl CliArgs {
    fn resolve_config(&self) -> anyhow::Result<BenchConfig> {
        let mut cfg = match &self.config {
            Some(path) => BenchConfig::load(path)?,
            None => BenchConfig::default(),
        };
        if let Some(ms) = self.warmup_ms {
            cfg.warmup_ms = ms;
        }
        if let Some(ms) = self.measure_ms {
            cfg.measure_ms = ms;
        }
        if let Some(n) = self.start_iterations {
            cfg.start_iterations = n;
        }
        if !self.cases.is_empty() {
            cfg.cases = self.cases.clone();
        }
        if self.alloc_timing {
            cfg.alloc_timing = true;
        }
        cfg.validate().context("invalid runner configuration")?;
        Ok(cfg)
    }
}

fn env_toggle_enabled(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    !(trimmed.eq_ignore_ascii_case("0") || trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("off"))
}

fn filter_expr_from(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("1")
        || trimmed.eq_ignore_ascii_case("true")
        || trimmed.eq_ignore_ascii_case("on")
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Logs go to stderr so they never interleave with report lines on stdout.
fn maybe_init_tracing() {
    let raw = match std::env::var("RETPAIR_TRACE") {
        Ok(value) => value,
        Err(_) => return,
    };

    if !env_toggle_enabled(&raw) {
        return;
    }

    TRACE_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        use tracing_subscriber::fmt;

        let filter_expr = filter_expr_from(&raw).or_else(|| std::env::var("RUST_LOG").ok());

        let builder = fmt().with_writer(std::io::stderr);

        let builder = match filter_expr.and_then(|expr| EnvFilter::try_new(expr).ok()) {
            Some(filter) => builder.with_env_filter(filter),
            None => builder.with_env_filter(DEFAULT_TRACE_FILTER),
        };

        let _ = builder.try_init();
    });
}

fn render_report(report: &CaseReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(report.to_string()),
        OutputFormat::Json => serde_json::to_string(report).context("serialize case report"),
    }
}

fn print_case_list() {
    for case in Case::ALL {
        println!("{:<18} {}", case.key(), case.label());
    }
}

/// Runs warmup and measurement on a dedicated thread that owns its
/// execution context for the whole run.
fn run_on_background_thread(cfg: BenchConfig, format: OutputFormat) -> anyhow::Result<Vec<CaseReport>> {
    let handle = thread::Builder::new()
        .name(RUNNER_THREAD_NAME.to_string())
        .spawn(move || -> anyhow::Result<Vec<CaseReport>> {
            let mut runner = Runner::new(cfg, ExecContext::new(), Sink::from_clock())?;
            tracing::info!(cases = runner.cases().len(), "runner started");
            let stdout = std::io::stdout();
            let mut failure = None;
            let reports = runner.run_with(|event| {
                let line = match event {
                    RunEvent::Banner(text) if format == OutputFormat::Text => Ok(text.to_string()),
                    RunEvent::Banner(_) => return,
                    RunEvent::Report(report) => render_report(report, format),
                };
                let written = line.and_then(|line| {
                    let mut out = stdout.lock();
                    writeln!(out, "{}", line)?;
                    out.flush()?;
                    Ok(())
                });
                if let Err(e) = written
                    && failure.is_none()
                {
                    failure = Some(e);
                }
            });
            if let Some(e) = failure {
                return Err(e.context("write report"));
            }
            tracing::debug!(sink = runner.sink().value(), "runner finished");
            Ok(reports)
        })
        .context("spawn runner thread")?;

    handle
        .join()
        .map_err(|_| anyhow!("runner thread panicked"))?
}

fn main() -> anyhow::Result<()> {
    maybe_init_tracing();

    let args = CliArgs::parse();
    if args.list {
        print_case_list();
        return Ok(());
    }

    let cfg = args.resolve_config()?;
    tracing::info!(
        warmup_ms = cfg.warmup_ms,
        measure_ms = cfg.measure_ms,
        start_iterations = cfg.start_iterations,
        alloc_timing = cfg.alloc_timing,
        "configuration resolved"
    );
    run_on_background_thread(cfg, args.format)?;
    Ok(())
}
