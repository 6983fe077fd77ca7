//! CLI argument definitions, tracing setup, and the generate command.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use brdgen_core::pipeline::{GenerateConfig, GenerateResult, ProgressReporter, generate_brd};
use brdgen_shared::{load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// brdgen — turn a JSON payload into a business-requirements document.
#[derive(Parser)]
#[command(
    name = "brdgen",
    version,
    about = "Generate a formatted business-requirements document from a JSON payload.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Path to the input JSON file.
    pub input: PathBuf,

    /// Path for the output document file.
    pub output: PathBuf,

    /// Config file path (defaults to ~/.brdgen/brdgen.toml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "brdgen=info",
        1 => "brdgen=debug",
        _ => "brdgen=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Generate command
// ---------------------------------------------------------------------------

/// Run the generate command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let app_config = match &cli.config {
        Some(path) => load_config_from(path)
            .map_err(|e| eyre!("cannot load config '{}': {e}", path.display()))?,
        None => load_config()?,
    };

    let config = GenerateConfig {
        input_path: cli.input.clone(),
        output_path: cli.output.clone(),
        app: app_config,
    };

    info!(
        input = %cli.input.display(),
        output = %cli.output.display(),
        "generating business requirements document"
    );

    let reporter = CliProgress::new();
    let result = generate_brd(&config, &reporter).await?;

    // Print summary
    println!();
    println!("  Document generated successfully!");
    println!("  Path:      {}", result.output_path.display());
    println!("  Sections:  {}", result.section_count);
    println!("  Generated: {}", result.generated_count);
    println!("  Size:      {} bytes", result.bytes_written);
    println!("  SHA-256:   {}", result.sha256);
    println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn section_progress(&self, current: usize, total: usize, name: &str) {
        self.spinner.set_message(format!(
            "Generating section [{current}/{total}] {name}"
        ));
    }

    fn done(&self, _result: &GenerateResult) {
        self.spinner.finish_and_clear();
    }
}
