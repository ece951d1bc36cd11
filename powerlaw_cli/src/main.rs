use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use powerlaw_core::{FitConfig, PowerLawError, PowerLawModel, PriceFeed, SeriesStore};

use powerlaw_cli::cmc::CmcClient;
use powerlaw_cli::config::{CliConfig, CmcConfig};
use powerlaw_cli::csv_store::CsvStore;
use powerlaw_cli::output;

fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        error!("power-law update failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), PowerLawError> {
    let cli = CliConfig::from_env();
    let fit_config = FitConfig::default();

    let store = CsvStore::new(&cli.history_path, fit_config.genesis_date);
    let mut series = store.load()?;

    if cli.offline {
        info!("offline mode: refitting the persisted series");
    } else {
        let feed = CmcClient::new(CmcConfig::from_env(&fit_config.quote_currency)?)?;
        let quote = feed.latest()?;
        if series.append(quote.date, quote.price)? {
            info!(date = %quote.date, "appended today's observation");
        } else {
            info!(date = %quote.date, "date already present, history unchanged");
        }
    }

    let model = PowerLawModel::new(fit_config);
    let report = model.fit(&series)?;
    info!(
        slope = report.slope,
        intercept = report.intercept,
        std = report.std,
        points = report.data.len(),
        "power-law fit"
    );

    output::write_report(&cli.output_path, &report)?;
    store.save(&series)?;

    info!("update complete");
    Ok(())
}
