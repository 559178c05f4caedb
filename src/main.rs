use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use playmetrics::{analyze_capture, PlaymetricsConfig};

#[derive(Parser, Debug)]
#[command(name = "playmetrics")]
#[command(about = "Motion aggregation for sports-training video observations")]
#[command(version)]
#[command(long_about = "Analyzes a pre-recorded observation stream (per-frame bounding boxes \
and pose keypoints produced by external detector and pose-estimation models) and derives \
per-player motion metrics: distance covered, average speed, deceleration, stop/move \
transitions, and a coarse pose classification. Results are written as JSON for a separate \
visualization step.")]
struct Args {
    /// Capture file to analyze (JSON array of observed frames)
    #[arg(value_name = "CAPTURE", help = "Path to the observation capture file")]
    input: String,

    /// Path to configuration file
    #[arg(short, long, default_value = "playmetrics.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Override the report output directory
    #[arg(short, long, help = "Directory for report output (overrides config)")]
    output: Option<String>,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without analyzing")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle special modes that don't require full initialization
    if args.print_config {
        print_default_config();
        return Ok(());
    }

    // Initialize logging
    init_logging(&args)?;

    info!("Starting playmetrics v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    // Load and validate configuration
    let mut config = match PlaymetricsConfig::load_from_file(&args.config) {
        Ok(config) => {
            info!("Configuration loaded successfully from: {}", args.config);
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                info!("Configuration validation successful");
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    config.validate().map_err(|e| {
        error!("Configuration validation failed: {}", e);
        e
    })?;

    if let Some(output) = args.output {
        config.report.path = output;
    }

    info!("Analyzing capture file: {}", args.input);
    let report_config = config.report.clone();

    let report = analyze_capture(config, &args.input).await.map_err(|e| {
        error!("Analysis failed: {}", e);
        e
    })?;

    let written = report
        .save(&report_config.path, report_config.write_pose_timeline)
        .await
        .map_err(|e| {
            error!("Failed to write report: {}", e);
            e
        })?;

    for path in &written {
        println!("Wrote {}", path.display());
    }
    info!("Analysis complete: {} players", report.players.len());

    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Determine log level based on flags
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    // Create environment filter
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("playmetrics={}", log_level)));

    // Configure format based on options
    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() {
    println!("# Playmetrics Configuration File");
    println!("# This is the default configuration with all available options");
    println!();

    let default_config = r#"[motion]
# Meters per pixel for cumulative displacement
# (field width in meters / frame width in pixels)
distance_scale = 0.008333
# Meters per pixel for speed
# (player height in meters / player bounding box height in pixels)
player_scale = 0.009
# Speed in m/s below which a player counts as stopped
stop_threshold = 0.1

[pipeline]
# Detection class id accepted as a player (0 = person)
target_class_id = 0
# Minimum detection confidence
min_confidence = 0.8

[report]
# Directory for report output
path = "./outputs"
# Write the per-timestamp pose timeline alongside the metrics
write_pose_timeline = true
"#;

    println!("{}", default_config);
}
