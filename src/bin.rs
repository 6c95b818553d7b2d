//! Binary entry point for `covid-bot`.
//!
//! Parses the command line, installs the log (and optionally OTLP) layers, loads the
//! configuration and hands over to [`covid_bot::start`].

use clap::Parser;
use covid_bot::base::{config::Config, types::Void};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use tracing::info;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Covid-bot: answers COVID-19 questions and live statistics in Slack.
///
/// Configuration can come from `config.toml` or `COVID_BOT_*` environment variables.
/// Each message is classified by LUIS, then answered from a QnA Maker knowledge base
/// or from live per-country and per-state statistics.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the bot will look for a config file at `.hidden/config.toml`
    /// in the current directory.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Export spans over OTLP/HTTP (endpoint from `OTEL_EXPORTER_OTLP_ENDPOINT`).
    #[arg(long)]
    otlp: bool,
    /// Load and validate the configuration, then exit.
    #[arg(long)]
    check_config: bool,
}

/// Main entry point for the covid-bot binary.
///
/// Sets up logging based on verbosity, loads configuration, and starts the bot.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Prepare the otlp layer, if asked for.

    let otel = if args.otlp {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_batch_exporter(exporter).build().tracer("covid-bot");

        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    let config = Config::load(args.config.as_deref())?;

    info!(
        "Stats timeout {:?} (retries: {}), cache TTL {:?}, turn timeout {:?}",
        config.stats_timeout(),
        config.stats_retries,
        config.stats_cache_ttl(),
        config.turn_timeout()
    );

    if args.check_config {
        info!("Configuration is valid.");
        return Ok(());
    }

    covid_bot::start(config).await
}
