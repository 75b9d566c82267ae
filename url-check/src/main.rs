//! URL Check CLI Application
//!
//! A command-line interface for checking the liveness of the image and
//! attachment URLs listed in JSON product files. Results are written as
//! `image_status` / `pdf_status` sheets per input file and bundled into
//! `all_results.zip`.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use console::style;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use url_check_lib::{load_env_config, parse_timeout, ConfigManager, EnvConfig, FileConfig};
use url_check_lib::{
    bundle_results, read_document, save_report, CheckConfig, DocumentReport, ExportFormat,
    ExportOptions, ExtractedUrls, UrlChecker,
};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for url-check
#[derive(Parser, Debug)]
#[command(name = "url-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check image and attachment URLs in JSON product files")]
#[command(
    long_about = "Check the liveness of image and attachment URLs listed in JSON product files.\n\nEach URL gets one GET request (redirects are reported, not followed) from a bounded worker pool. Results for each file are written to <OUTPUT_DIR>/<file>_results.xlsx with image_status and pdf_status sheets, and all result files of a run are packed into <OUTPUT_DIR>/all_results.zip."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// JSON product files to check
    #[arg(value_name = "FILES", help_heading = "Input")]
    pub files: Vec<PathBuf>,

    /// Print the extracted URLs without checking them
    #[arg(long = "dry-run", help_heading = "Input")]
    pub dry_run: bool,

    /// Max concurrent checks (default: 5, max: 100)
    #[arg(short = 'w', long = "workers", value_name = "N", help_heading = "Performance")]
    pub workers: Option<usize>,

    /// Per-request timeout, e.g. 5s, 1500ms, 2m (default: 5s)
    #[arg(short = 't', long = "timeout", value_name = "DURATION", help_heading = "Performance")]
    pub timeout: Option<String>,

    /// Referer header sent with every request
    #[arg(long = "referer", value_name = "URL", help_heading = "Request")]
    pub referer: Option<String>,

    /// File of user agents to rotate through, one per line
    #[arg(long = "user-agents", value_name = "FILE", help_heading = "Request")]
    pub user_agents: Option<PathBuf>,

    /// Directory that receives the result sheets (default: .)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", help_heading = "Output")]
    pub output_dir: Option<PathBuf>,

    /// Omit the header row from result sheets
    #[arg(long = "no-headers", help_heading = "Output")]
    pub no_headers: bool,

    /// Write each sheet as CSV under <file>_results/ instead of an xlsx workbook
    #[arg(long = "csv", help_heading = "Output")]
    pub csv: bool,

    /// Do not pack the result files into all_results.zip
    #[arg(long = "no-bundle", help_heading = "Output")]
    pub no_bundle: bool,

    /// Print reports as JSON on stdout
    #[arg(short = 'j', long = "json", help_heading = "Output")]
    pub json: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
struct RunSettings {
    check: CheckConfig,
    export: ExportOptions,
    bundle: bool,
    json_pretty: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            check: CheckConfig::default(),
            export: ExportOptions::default(),
            bundle: true,
            json_pretty: true,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if args.files.is_empty() {
        return Err("You must specify at least one JSON file to check".to_string());
    }

    if let Some(workers) = args.workers {
        if workers == 0 || workers > 100 {
            return Err("Workers must be between 1 and 100".to_string());
        }
    }

    if let Some(timeout) = &args.timeout {
        if parse_timeout(timeout).is_none() {
            return Err(format!(
                "Invalid timeout '{}'. Use format like '5s', '1500ms', '2m'",
                timeout
            ));
        }
    }

    if let Some(referer) = &args.referer {
        if referer.trim().is_empty() {
            return Err("Referer cannot be empty".to_string());
        }
    }

    Ok(())
}

/// Main checking logic
async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = build_settings(&args)?;
    tracing::debug!(
        workers = settings.check.max_workers,
        timeout_ms = settings.check.timeout.as_millis() as u64,
        output_dir = %settings.export.output_dir.display(),
        "resolved configuration"
    );

    if args.dry_run {
        return run_dry_run(&args, &settings);
    }

    let checker = UrlChecker::with_config(settings.check.clone())?;
    let progress = ui::ConsoleProgress::new();
    let mut reports: Vec<DocumentReport> = Vec::new();
    let mut written = Vec::new();

    for path in &args.files {
        let Some(urls) = load_urls(path) else {
            continue;
        };

        if !args.json {
            ui::print_header(path, &urls, settings.check.max_workers);
        }

        let started = Instant::now();
        let report = checker
            .check_document(&source_name(path), &urls, &progress)
            .await;
        let saved = match save_report(&report, &settings.export) {
            Ok(files) => files,
            Err(e) => {
                eprintln!(
                    "{} Failed to save results for {}: {}",
                    style("Warning:").yellow(),
                    path.display(),
                    e
                );
                Vec::new()
            }
        };

        if !args.json {
            ui::print_problems(&report);
            ui::print_summary(&report, started.elapsed(), &saved);
        }

        written.extend(saved);
        reports.push(report);
    }

    if settings.bundle && !written.is_empty() {
        match bundle_results(&settings.export.output_dir, &written) {
            Ok(archive) if !args.json => ui::print_bundle(&archive, written.len()),
            Ok(_) => {}
            Err(e) => eprintln!("{} Failed to bundle results: {}", style("Warning:").yellow(), e),
        }
    }

    if args.json {
        print_json(&reports, settings.json_pretty)?;
    }

    Ok(())
}

/// Print extracted URLs and exit without touching the network.
fn run_dry_run(args: &Args, settings: &RunSettings) -> Result<(), Box<dyn std::error::Error>> {
    let mut documents = Vec::new();

    for path in &args.files {
        let Some(urls) = load_urls(path) else {
            continue;
        };

        if args.json {
            documents.push(serde_json::json!({
                "source": source_name(path),
                "images": urls.images,
                "attachments": urls.attachments,
            }));
        } else {
            ui::print_dry_run(path, &urls);
        }
    }

    if args.json {
        print_json(&documents, settings.json_pretty)?;
    }

    Ok(())
}

/// Read and extract one input file, warning and returning `None` when it
/// should be skipped.
fn load_urls(path: &Path) -> Option<ExtractedUrls> {
    match read_document(path) {
        Ok(urls) if urls.is_empty() => {
            eprintln!(
                "{} No URLs found in {}, skipping",
                style("Warning:").yellow(),
                path.display()
            );
            None
        }
        Ok(urls) => Some(urls),
        Err(e) => {
            eprintln!(
                "{} Skipping {}: {}",
                style("Warning:").yellow(),
                path.display(),
                e
            );
            None
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(
    value: &T,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

/// Name used for the result files of an input file.
fn source_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

/// Build configuration with precedence: CLI > env > config file > defaults.
///
/// Config file selection:
/// 1. `--config` flag
/// 2. `UC_CONFIG` environment variable
/// 3. Discovery (XDG, home directory, current directory; later wins)
fn build_settings(args: &Args) -> Result<RunSettings, Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let config_manager = ConfigManager::new();

    let explicit_path = args.config.as_ref().or(env_config.config.as_ref());
    let file_config = match explicit_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using explicit config file");
            config_manager.load_file(path).map_err(|e| {
                format!("Failed to load config file '{}': {}", path.display(), e)
            })?
        }
        None => config_manager.discover_and_load()?,
    };

    resolve_settings(args, file_config, &env_config)
}

/// Layer file, environment and CLI values over the defaults.
fn resolve_settings(
    args: &Args,
    file_config: FileConfig,
    env_config: &EnvConfig,
) -> Result<RunSettings, Box<dyn std::error::Error>> {
    let settings = merge_file_config(RunSettings::default(), file_config);
    let settings = apply_environment_config(settings, env_config);
    apply_cli_args(settings, args)
}

/// Merge FileConfig into the run settings
fn merge_file_config(mut settings: RunSettings, file_config: FileConfig) -> RunSettings {
    if let Some(defaults) = file_config.defaults {
        if let Some(workers) = defaults.workers {
            settings.check = settings.check.with_max_workers(workers);
        }
        if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_timeout) {
            settings.check = settings.check.with_timeout(timeout);
        }
        if let Some(referer) = defaults.referer {
            settings.check = settings.check.with_referer(referer);
        }
        if let Some(user_agents) = defaults.user_agents {
            settings.check = settings.check.with_user_agents(user_agents);
        }
    }

    if let Some(output) = file_config.output {
        if let Some(dir) = output.dir {
            settings.export.output_dir = dir;
        }
        if let Some(format) = output.format {
            settings.export.format = format;
        }
        if let Some(headers) = output.csv_headers {
            settings.export.headers = headers;
        }
        if let Some(bundle) = output.bundle {
            settings.bundle = bundle;
        }
        if let Some(pretty) = output.json_pretty {
            settings.json_pretty = pretty;
        }
    }

    settings
}

/// Apply `UC_*` environment values.
fn apply_environment_config(mut settings: RunSettings, env_config: &EnvConfig) -> RunSettings {
    if let Some(workers) = env_config.workers {
        settings.check = settings.check.with_max_workers(workers);
    }
    if let Some(timeout) = env_config.timeout {
        settings.check = settings.check.with_timeout(timeout);
    }
    if let Some(referer) = &env_config.referer {
        settings.check = settings.check.with_referer(referer.clone());
    }
    if let Some(user_agents) = &env_config.user_agents {
        settings.check = settings.check.with_user_agents(user_agents.clone());
    }
    if let Some(dir) = &env_config.output_dir {
        settings.export.output_dir = dir.clone();
    }

    settings
}

/// Apply CLI arguments (highest precedence).
///
/// Only flags the user actually passed override earlier layers.
fn apply_cli_args(
    mut settings: RunSettings,
    args: &Args,
) -> Result<RunSettings, Box<dyn std::error::Error>> {
    if let Some(workers) = args.workers {
        settings.check = settings.check.with_max_workers(workers);
    }
    if let Some(timeout) = &args.timeout {
        let timeout = parse_timeout(timeout)
            .ok_or_else(|| format!("Invalid timeout '{}'", timeout))?;
        settings.check = settings.check.with_timeout(timeout);
    }
    if let Some(referer) = &args.referer {
        settings.check = settings.check.with_referer(referer.trim());
    }
    if let Some(user_agents) = &args.user_agents {
        settings.check = settings.check.with_user_agents(user_agents.clone());
    }
    if let Some(dir) = &args.output_dir {
        settings.export.output_dir = dir.clone();
    }
    if args.no_headers {
        settings.export.headers = false;
    }
    if args.csv {
        settings.export.format = ExportFormat::Csv;
    }
    if args.no_bundle {
        settings.bundle = false;
    }

    Ok(settings)
}
