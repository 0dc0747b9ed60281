//! Command-line and environment configuration

use std::time::Duration;

use clap::{Parser, ValueEnum};
use project_map_db::CandidateFilter;
use reverse_geocoding::{ClientSettings, DEFAULT_BASE_URL};

use crate::error::{ReconcilerError, Result};
use crate::types::PipelineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReporterKind {
    /// Structured log events
    Log,
    /// Decorated report on stdout
    Console,
}

/// Fill missing street, city and zip fields from record coordinates
#[derive(Parser, Debug)]
#[command(name = "geocode-reconciler")]
#[command(version)]
pub struct Args {
    /// Process at most this many candidates
    #[arg(long, env = "RECONCILE_LIMIT")]
    pub limit: Option<i64>,

    /// Restrict the run to these sectors (repeatable or comma-separated)
    #[arg(long = "sector", env = "RECONCILE_SECTORS", value_delimiter = ',')]
    pub sectors: Vec<String>,

    /// Provider calls between long pauses
    #[arg(long, default_value_t = 10, env = "RECONCILE_BATCH_SIZE")]
    pub batch_size: usize,

    /// Delay after each provider call, in milliseconds
    #[arg(long, default_value_t = 100, env = "RECONCILE_DELAY_MS")]
    pub delay_ms: u64,

    /// Pause after each batch, in milliseconds (default: ten times the delay)
    #[arg(long, env = "RECONCILE_BATCH_PAUSE_MS")]
    pub batch_pause_ms: Option<u64>,

    /// Geocoding request timeout, in seconds
    #[arg(long, default_value_t = 10, env = "GEOCODING_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    #[arg(long, default_value = DEFAULT_BASE_URL, env = "GEOCODING_BASE_URL")]
    pub base_url: String,

    #[arg(long, env = "GEOCODING_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, value_enum, default_value_t = ReporterKind::Log, env = "RECONCILE_REPORTER")]
    pub reporter: ReporterKind,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Run database migrations before processing
    #[arg(long)]
    pub migrate: bool,
}

/// Everything a run needs, validated
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub database_url: String,
    pub client: ClientSettings,
    pub pipeline: PipelineConfig,
    pub filter: CandidateFilter,
    pub reporter: ReporterKind,
    pub json_summary: bool,
    pub migrate: bool,
}

impl ReconcilerConfig {
    /// Validate arguments and resolve the database URL from `env`
    pub fn from_args(args: Args, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = args
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ReconcilerError::Config("GEOCODING_API_KEY is required".to_string())
            })?;

        if args.batch_size == 0 {
            return Err(ReconcilerError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }
        if args.timeout_secs == 0 {
            return Err(ReconcilerError::Config(
                "timeout must be at least 1 second".to_string(),
            ));
        }
        if matches!(args.limit, Some(n) if n < 0) {
            return Err(ReconcilerError::Config(
                "limit must not be negative".to_string(),
            ));
        }

        let base_url = url::Url::parse(&args.base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ReconcilerError::Config(format!(
                "unsupported geocoding URL scheme: {}",
                base_url.scheme()
            )));
        }

        let request_delay = Duration::from_millis(args.delay_ms);
        let batch_pause = args
            .batch_pause_ms
            .map(Duration::from_millis)
            .unwrap_or(request_delay * 10);

        let sectors = args
            .sectors
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            database_url: database_url(env)?,
            client: ClientSettings {
                api_key,
                base_url: args.base_url,
                timeout: Duration::from_secs(args.timeout_secs),
            },
            pipeline: PipelineConfig {
                batch_size: args.batch_size,
                request_delay,
                batch_pause,
            },
            filter: CandidateFilter {
                sectors,
                limit: args.limit,
            },
            reporter: args.reporter,
            json_summary: args.json,
            migrate: args.migrate,
        })
    }
}

/// `DATABASE_URL`, or a URL assembled from the separate `DB_*` variables
/// (Cloud SQL socket paths included)
pub fn database_url(env: impl Fn(&str) -> Option<String>) -> Result<String> {
    if let Some(url) = env("DATABASE_URL") {
        return Ok(url);
    }

    let host = env("DB_HOST").ok_or_else(|| {
        ReconcilerError::Config(
            "DATABASE_URL or DB_HOST environment variable is required".to_string(),
        )
    })?;
    let name = env("DB_NAME").unwrap_or_else(|| "defaultdb".to_string());
    let user = env("DB_USER").unwrap_or_else(|| "postgres".to_string());
    let password = env("DB_PASSWORD").unwrap_or_default();

    // Cloud SQL connects over a unix socket passed as the `host` parameter
    let mut url = if host.starts_with("/cloudsql/") {
        let mut url = url::Url::parse(&format!("postgresql://localhost/{}", name))?;
        url.query_pairs_mut().append_pair("host", &host);
        url
    } else {
        let port = env("DB_PORT").unwrap_or_else(|| "5432".to_string());
        let mut url = url::Url::parse(&format!("postgresql://{}:{}/{}", host, port, name))?;
        if let Some(sslmode) = env("DB_SSLMODE") {
            url.query_pairs_mut().append_pair("sslmode", &sslmode);
        }
        url
    };

    // Credentials are percent-encoded by the setters
    url.set_username(&user)
        .map_err(|_| ReconcilerError::Config("invalid DB_USER".to_string()))?;
    url.set_password(Some(&password))
        .map_err(|_| ReconcilerError::Config("invalid DB_PASSWORD".to_string()))?;
    Ok(url.into())
}
