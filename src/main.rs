//! Mining Exporter binary
//!
//! Serves Prometheus metrics for the miner running on this host.

use clap::{Args, Parser, Subcommand};
use mining_exporter::{
    backends::detect, start_web_server, DebugOverrides, ExporterConfig, WebConfig,
    DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_WEB_PORT,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "mining_exporter")]
#[command(about = "Prometheus exporter for local mining daemons")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "Polls the local T-Rex or lolMiner API on every scrape and exposes the result as Prometheus metrics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Web server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Web server port
    #[arg(short, long, default_value_t = DEFAULT_WEB_PORT)]
    port: u16,

    /// Auxiliary device label file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Miner API timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_MS)]
    fetch_timeout_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the metrics server (default)
    Serve,

    /// Run a single poll, print the result and exit
    Snapshot(SnapshotArgs),

    /// Show which miner would be polled
    Detect,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing/logging
    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Serve) | None => {
            print_banner();
            serve_command(&cli).await?;
        }
        Some(Commands::Snapshot(args)) => {
            snapshot_command(&cli, args).await?;
        }
        Some(Commands::Detect) => {
            detect_command();
        }
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(level, directives.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// `RUST_LOG` style directives refine the level picked from the CLI flags.
fn log_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives.unwrap_or_default())
}

fn print_banner() {
    println!("Mining Exporter");
    println!("   Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
}

fn build_collector(
    cli: &Cli,
) -> Result<Box<dyn mining_exporter::MinerCollector>, Box<dyn std::error::Error>> {
    let config = ExporterConfig::load(cli.config.as_deref())?;
    if !config.devices.is_empty() {
        info!("Loaded auxiliary labels for {} devices", config.devices.len());
    }

    let overrides = DebugOverrides::from_env();
    let backend = detect::detect_backend(&overrides);
    let collector = detect::build_collector(
        backend,
        &overrides,
        config,
        Duration::from_millis(cli.fetch_timeout_ms),
    )?;
    Ok(collector)
}

async fn serve_command(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting mining exporter...");

    let collector = build_collector(cli)?;
    info!("Collector initialized for {}", collector.name());

    let web_config = WebConfig::new(&cli.host, cli.port);
    info!("Web server configuration:");
    info!("  - Bind address: {}", web_config.bind_address());
    info!("  - Miner timeout: {}ms", cli.fetch_timeout_ms);

    start_web_server(web_config, collector).await?;

    Ok(())
}

async fn snapshot_command(cli: &Cli, args: &SnapshotArgs) -> Result<(), Box<dyn std::error::Error>> {
    let collector = build_collector(cli)?;
    let families = collector.collect().await?;

    match args.format.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&families)?;
            println!("{}", json);
        }
        "text" => {
            print!("{}", mining_exporter::web::exposition::render(&families));
        }
        other => {
            return Err(format!("Unsupported format: {}. Use 'text' or 'json'", other).into());
        }
    }

    Ok(())
}

fn detect_command() {
    let overrides = DebugOverrides::from_env();
    match detect::detect_backend(&overrides) {
        Some(backend) => {
            println!("Miner: {}", backend);
            println!("Endpoint: {}", backend.spec().endpoint);
        }
        None => println!("No supported miner found"),
    }
}
