use clap::{Parser, Subcommand};
use geosync_core::{DbConfig, HttpConfig, DEFAULT_LIMIT, DEFAULT_SOURCE_URL};
use std::net::SocketAddr;
use std::path::PathBuf;

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "geosync")]
#[command(
    author,
    version,
    about = "Syncs country reference data from REST Countries and serves it over HTTP"
)]
#[command(after_help = "Examples:
  geosync serve --bind 127.0.0.1:8000
  geosync sync
  geosync list --region europe --limit 10
  geosync show ARG")]
pub struct Config {
    /// PostgreSQL database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// REST Countries endpoint to sync from
    #[arg(long, env = "REST_COUNTRIES_URL", default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Timeout for the upstream request, in seconds
    #[arg(
        long,
        env = "REST_COUNTRIES_TIMEOUT",
        value_name = "SECONDS",
        default_value_t = HttpConfig::default().timeout.as_secs()
    )]
    pub source_timeout: u64,

    /// Maximum number of pooled database connections
    #[arg(
        long,
        env = "DB_MAX_CONNECTIONS",
        default_value_t = DbConfig::default().max_connections
    )]
    pub db_max_connections: u32,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    #[command(after_help = "Examples:
  geosync serve                              # Listen on 0.0.0.0:8000
  geosync serve --static-dir ./dashboard     # Serve the dashboard from ./dashboard")]
    Serve {
        /// Address to listen on
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
        bind: SocketAddr,

        /// Directory holding the dashboard (index.html and assets)
        #[arg(long, env = "STATIC_DIR", value_name = "DIR", default_value = "static")]
        static_dir: PathBuf,
    },
    /// Fetch all countries from upstream and upsert them
    Sync,
    /// List stored countries
    #[command(after_help = "Example: geosync list --search buenos")]
    List {
        /// Case-insensitive substring of the region
        #[arg(short, long)]
        region: Option<String>,
        /// Case-insensitive substring of the name or capital
        #[arg(short, long)]
        search: Option<String>,
        /// Number of countries to skip
        #[arg(long, default_value = "0")]
        skip: i64,
        /// Maximum number of countries to return (1-250)
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: i64,
    },
    /// List the distinct stored regions
    Regions,
    /// Show one country by its 3-letter code
    Show {
        /// Country code, any case (e.g. ARG, usa)
        code: String,
    },
}
