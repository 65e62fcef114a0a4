use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use hemolink_matcher::config::Settings;
use hemolink_matcher::models::{BloodType, GeoPoint, MatchingCriteria};
use hemolink_matcher::services::{CacheManager, PgMatchingEngine, PostgresClient};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "hemolink-matcher",
    about = "Rank blood donors for donation requests",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank donors for a stored donation request
    Find(FindArgs),
    /// Rank donors for ad-hoc criteria
    Match(MatchArgs),
    /// Print the effective configuration with secrets masked
    CheckConfig,
}

#[derive(Args, Debug)]
struct FindArgs {
    /// Donation request id
    #[arg(long)]
    request_id: String,
    /// Maximum number of matches to return
    #[arg(long)]
    limit: Option<usize>,
    /// Skip the match cache and always recompute
    #[arg(long)]
    no_cache: bool,
}

#[derive(Args, Debug)]
struct MatchArgs {
    /// Required blood type, e.g. "A+" or "O_NEGATIVE"
    #[arg(long)]
    blood_type: BloodType,
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,
    /// Search radius in km (defaults to 50)
    #[arg(long)]
    radius_km: Option<f64>,
    /// Urgency from 1 (routine) to 5 (critical)
    #[arg(long, default_value_t = 3)]
    urgency: u8,
    /// RFC 3339 deadline (defaults to now)
    #[arg(long)]
    required_by: Option<DateTime<Utc>>,
    #[arg(long)]
    limit: Option<usize>,
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr);

    match settings.logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "json" => subscriber.json().init(),
        _ => subscriber.compact().init(),
    }
}

async fn build_engine(settings: &Settings) -> Result<PgMatchingEngine, String> {
    let postgres = PostgresClient::new(
        &settings.database.url,
        settings.database.max_connections.unwrap_or(10),
        settings.database.min_connections.unwrap_or(1),
        settings.database.acquire_timeout_secs.unwrap_or(5),
    )
    .await
    .map_err(|e| format!("Failed to connect to PostgreSQL: {}", e))?;
    let postgres = Arc::new(postgres);

    info!("PostgreSQL client initialized");

    let cache = CacheManager::connect_or_degrade(
        settings.cache.redis_url.as_deref(),
        settings.l1_cache_size(),
    )
    .await;

    info!(
        "Cache manager initialized (redis: {}, L1: {} entries, TTL: {}s)",
        cache.has_redis(),
        settings.l1_cache_size(),
        settings.cache_ttl_secs()
    );

    Ok(PgMatchingEngine::new(
        Arc::clone(&postgres),
        Arc::clone(&postgres),
        postgres,
        Arc::new(cache),
        settings.engine_options(),
    ))
}

async fn run(command: Command, settings: Settings) -> Result<String, String> {
    match command {
        Command::CheckConfig => serde_json::to_string_pretty(&settings.redacted())
            .map_err(|e| e.to_string()),
        Command::Find(args) => {
            let engine = build_engine(&settings).await?;
            let result = if args.no_cache {
                engine.find_matches(&args.request_id, args.limit).await
            } else {
                engine.find_matches_cached(&args.request_id, args.limit).await
            }
            .map_err(|e| e.to_string())?;

            serde_json::to_string_pretty(&result).map_err(|e| e.to_string())
        }
        Command::Match(args) => {
            let engine = build_engine(&settings).await?;
            let criteria = MatchingCriteria {
                blood_type: args.blood_type,
                location: GeoPoint::new(args.lat, args.lon),
                radius_km: args.radius_km,
                urgency_level: args.urgency,
                required_by: args.required_by.unwrap_or_else(Utc::now),
            };
            let result = engine
                .match_donors(&criteria, args.limit)
                .await
                .map_err(|e| e.to_string())?;

            serde_json::to_string_pretty(&result).map_err(|e| e.to_string())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&settings);

    match run(cli.command, settings).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
