//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use wikiharvest_core::{HarvestReport, ProgressReporter};
use wikiharvest_shared::{AppConfig, HarvestConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// wikiharvest: collect wiki problems and solutions into a JSON corpus.
#[derive(Parser)]
#[command(
    name = "wikiharvest",
    version,
    about = "Harvest problem and solution pages from a wiki index into a JSON corpus.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Discover, fetch, and extract every item and write the corpus.
    Run {
        /// Index page listing the item pages.
        #[arg(long)]
        index_url: Option<String>,

        /// Output file for the corpus.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Number of concurrent fetch workers.
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,

        /// Also write the run report as JSON to this path.
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List the item locations found on the index page.
    Discover {
        /// Index page listing the item pages.
        #[arg(long)]
        index_url: Option<String>,
    },

    /// Print the extracted record of one page as JSON.
    Extract {
        /// Saved HTML file, page URL, or item location.
        target: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "wikiharvest=info",
        1 => "wikiharvest=debug",
        _ => "wikiharvest=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            index_url,
            out,
            concurrency,
            report,
        } => cmd_run(index_url, out, concurrency, report.as_deref()).await,
        Command::Discover { index_url } => cmd_discover(index_url).await,
        Command::Extract { target } => cmd_extract(&target).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Config file values with CLI flags layered on top.
fn resolve_config(
    index_url: Option<String>,
    out: Option<PathBuf>,
    concurrency: Option<usize>,
) -> Result<HarvestConfig> {
    let app = load_config()?;
    let mut config = HarvestConfig::from(&app);
    if let Some(url) = index_url {
        config.index_url = url;
    }
    if let Some(path) = out {
        config.output_path = path;
    }
    if let Some(n) = concurrency {
        config.concurrency = n;
    }
    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(
    index_url: Option<String>,
    out: Option<PathBuf>,
    concurrency: Option<usize>,
    report_path: Option<&Path>,
) -> Result<()> {
    let config = resolve_config(index_url, out, concurrency)?;

    info!(
        index = %config.index_url,
        out = %config.output_path.display(),
        concurrency = config.concurrency,
        "starting run"
    );

    let reporter = CliProgress::new();
    let report = wikiharvest_core::harvest(&config, &reporter).await?;

    if let Some(path) = report_path {
        wikiharvest_core::write_json(path, &report)
            .wrap_err_with(|| format!("failed to write report to {}", path.display()))?;
    }

    print_summary(&report);
    Ok(())
}

async fn cmd_discover(index_url: Option<String>) -> Result<()> {
    let config = resolve_config(index_url, None, None)?;
    let links = wikiharvest_core::discover_items(&config).await?;
    for location in &links.locations {
        println!("{location}");
    }
    info!(
        items = links.locations.len(),
        duplicates = links.duplicates,
        "discovery finished"
    );
    Ok(())
}

async fn cmd_extract(target: &str) -> Result<()> {
    let record = if Path::new(target).is_file() {
        wikiharvest_core::extract_file(Path::new(target))?
    } else {
        let config = resolve_config(None, None, None)?;
        wikiharvest_core::extract_url(&config, target).await?
    };
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn print_summary(report: &HarvestReport) {
    println!();
    println!("  Harvest finished.");
    println!("  Attempted: {}", report.attempted);
    println!("  Succeeded: {}", report.succeeded);
    println!("  Failed:    {}", report.failed());
    if report.duplicates > 0 {
        println!("  Duplicate: {}", report.duplicates);
    }
    println!("  Output:    {}", report.output_path.display());
    println!("  Time:      {:.1}s", report.elapsed_ms as f64 / 1000.0);

    if !report.failures.is_empty() {
        println!();
        println!("  Failures:");
        for failure in &report.failures {
            let item = failure
                .item
                .as_ref()
                .map_or_else(|| failure.location.clone(), ToString::to_string);
            println!("    {item:<12} {}", failure.kind);
        }
    }
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter: a spinner during discovery, then a bar over items.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn item_finished(&self, location: &str, completed: usize, total: usize, ok: bool) {
        if self.bar.length() != Some(total as u64) {
            self.bar.set_length(total as u64);
            if let Ok(style) =
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            {
                self.bar.set_style(style);
            }
        }
        self.bar.set_position(completed as u64);
        let mark = if ok { "ok" } else { "failed" };
        self.bar.set_message(format!("{mark} {location}"));
    }

    fn done(&self, _report: &HarvestReport) {
        self.bar.finish_and_clear();
    }
}
