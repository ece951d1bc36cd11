use std::env;
use std::path::PathBuf;

use powerlaw_core::PowerLawError;

const DEFAULT_HISTORY_PATH: &str = "BTC_PL_Daily_Data.csv";
const DEFAULT_OUTPUT_PATH: &str = "data/powerlaw.json";

/// CoinMarketCap client configuration.
///
/// Built explicitly from the environment at startup instead of read from a
/// process-wide global, so a missing key fails fast with a named error.
#[derive(Debug, Clone)]
pub struct CmcConfig {
    pub api_key: String,
    pub base_url: String,
    pub symbol: String,
    pub convert: String,
}

impl CmcConfig {
    pub fn from_env(convert: &str) -> Result<Self, PowerLawError> {
        let api_key = env::var("CMC_API_KEY").map_err(|_| {
            PowerLawError::MissingCredential(
                "CMC_API_KEY is not set; create a .env or export it".to_string(),
            )
        })?;
        Ok(Self {
            api_key,
            base_url: "https://pro-api.coinmarketcap.com/v1".to_string(),
            symbol: "BTC".to_string(),
            convert: convert.to_string(),
        })
    }
}

/// Runtime configuration of the daily update binary.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub history_path: PathBuf,
    pub output_path: PathBuf,
    pub offline: bool,
}

impl CliConfig {
    pub fn from_env() -> Self {
        let history_path = env::var("POWERLAW_HISTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_HISTORY_PATH));
        let output_path = env::var("POWERLAW_OUTPUT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_PATH));
        let offline = env::var("POWERLAW_OFFLINE")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(false);
        Self {
            history_path,
            output_path,
            offline,
        }
    }
}
