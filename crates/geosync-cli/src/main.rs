use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use geosync_cli::{router, AppState, Command, Config};
use geosync_client::RestCountriesClient;
use geosync_core::{AppError, Country, CountryQuery, CountryService, HttpConfig};
use geosync_db::{ensure_schema, CountryRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Parse command line arguments
    let config = Config::parse();

    // Setup logging (stderr to keep stdout clean for command output)
    let level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    // Database connection
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    ensure_schema(&pool).await?;

    // Initialize services
    let client = RestCountriesClient::new(
        &config.source_url,
        &HttpConfig::with_timeout_secs(config.source_timeout),
    )
    .context("Invalid REST_COUNTRIES_URL")?;
    let state = AppState::new(Arc::new(CountryRepository::new(pool)), Arc::new(client));

    // Execute command
    let result = match config.command {
        Command::Serve { bind, static_dir } => serve(state, bind, static_dir).await,
        Command::Sync => sync(&state.service()).await,
        Command::List {
            region,
            search,
            skip,
            limit,
        } => list(&state.service(), region, search, skip, limit).await,
        Command::Regions => regions(&state.service()).await,
        Command::Show { code } => show(&state.service(), &code).await,
    };

    if let Err(e) = result {
        match e.downcast_ref::<AppError>() {
            Some(app_err) => eprintln!("\nError: {}\n", app_err.user_message()),
            None => eprintln!("\nError: {:#}\n", e),
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Run the HTTP API until Ctrl-C
async fn serve(state: AppState, bind: SocketAddr, static_dir: PathBuf) -> anyhow::Result<()> {
    let static_dir = if static_dir.is_dir() {
        info!("Serving dashboard from {}", static_dir.display());
        Some(static_dir)
    } else {
        warn!(
            "Static directory {} not found, dashboard disabled",
            static_dir.display()
        );
        None
    };

    let app = router(state, static_dir.as_deref());
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// One-shot sync from the command line
async fn sync(service: &CountryService) -> anyhow::Result<()> {
    let summary = service.sync().await?;

    println!("\n{}\n", summary.message);
    println!("  Inserted:  {}", summary.inserted);
    println!("  Updated:   {}", summary.updated);
    println!("  Total:     {}", summary.total);
    println!();

    Ok(())
}

/// Print a page of stored countries
async fn list(
    service: &CountryService,
    region: Option<String>,
    search: Option<String>,
    skip: i64,
    limit: i64,
) -> anyhow::Result<()> {
    let query = CountryQuery::new(region, search, skip, limit)?;
    let countries = service.list(&query).await?;

    if countries.is_empty() {
        println!("\nNo countries found.\n");
        println!("Try:");
        println!("  • Loosening the --region / --search filters");
        println!("  • Syncing first with: geosync sync");
        return Ok(());
    }

    println!();
    for country in &countries {
        println!(
            "{}  {:<40} {:<25} {}",
            country.code,
            truncate_text(&country.name, 40),
            truncate_text(country.capital.as_deref().unwrap_or("-"), 25),
            country.region.as_deref().unwrap_or("-"),
        );
    }
    println!("\n{} countries shown (skip {})\n", countries.len(), skip);

    Ok(())
}

async fn regions(service: &CountryService) -> anyhow::Result<()> {
    for region in service.regions().await? {
        println!("{}", region);
    }
    Ok(())
}

/// Print every stored field of one country
async fn show(service: &CountryService, code: &str) -> anyhow::Result<()> {
    let country = service.get_by_code(code).await?;
    print_country(&country);
    Ok(())
}

fn print_country(country: &Country) {
    let dash = || "-".to_string();

    println!("\n{} ({})\n", country.name, country.code);
    println!(
        "  Capital:      {}",
        country.capital.clone().unwrap_or_else(dash)
    );
    println!(
        "  Region:       {}",
        country.region.clone().unwrap_or_else(dash)
    );
    println!(
        "  Subregion:    {}",
        country.subregion.clone().unwrap_or_else(dash)
    );
    println!(
        "  Population:   {}",
        country
            .population
            .map(|p| p.to_string())
            .unwrap_or_else(dash)
    );
    println!(
        "  Area (km²):   {}",
        country.area.map(|a| a.to_string()).unwrap_or_else(dash)
    );
    println!(
        "  Flag:         {}",
        country.flag_url.clone().unwrap_or_else(dash)
    );
    println!("  Created:      {}", country.created_at);
    if let Some(updated_at) = country.updated_at {
        println!("  Updated:      {}", updated_at);
    }
    println!();
}

/// Truncate text to a maximum number of characters, adding ellipsis if needed
fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
