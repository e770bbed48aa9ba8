use anyhow::{Context, Result};
use clap::Parser;

use mawaqit::cli::args::{Cli, Commands};
use mawaqit::cli::handlers;
use mawaqit::config::AppConfig;
use mawaqit::db::CacheStore;
use mawaqit::fetch::{PrayerApiClient, TcpProbe};
use mawaqit::sync::SyncService;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    // Ensure the data directory exists and open the cache (WAL mode and
    // migrations are applied on open).
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let store = CacheStore::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    let client = PrayerApiClient::new(&config.api.base_url, config.api.timeout())?;
    let probe = match config.api.probe_addr.parse() {
        Ok(addr) => TcpProbe::new(addr, std::time::Duration::from_secs(3)),
        Err(_) => TcpProbe::default(),
    };
    let mut service = SyncService::new(store, client, probe);

    match cli.command {
        Some(Commands::Setup {
            city,
            country,
            api_name,
            id,
        }) => {
            handlers::handle_setup(&service, &city, &country, api_name.as_deref(), id.as_deref())?;
        }
        Some(Commands::Times { watch, date }) => {
            handlers::handle_times(&mut service, watch, date.as_deref()).await?;
        }
        Some(Commands::Month { year, month }) => {
            handlers::handle_month(&mut service, year, month).await?;
        }
        Some(Commands::Sync { year, month, force }) => {
            handlers::handle_sync(&mut service, year, month, force).await?;
        }
        Some(Commands::Status) => {
            handlers::handle_status(&service)?;
        }
        Some(Commands::Qibla { lat, lng }) => {
            handlers::handle_qibla(&service, lat, lng)?;
        }
        // No subcommand: baseline sync in the background, then today's view.
        None => {
            handlers::handle_default(&mut service).await?;
        }
    }

    Ok(())
}
