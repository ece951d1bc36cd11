use std::collections::HashMap;
use std::thread::sleep;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use powerlaw_core::{PowerLawError, PriceFeed, PriceQuote};

use crate::config::CmcConfig;

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 500;

/// CoinMarketCap `quotes/latest` client.
pub struct CmcClient {
    client: Client,
    config: CmcConfig,
}

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    data: HashMap<String, AssetEntry>,
}

#[derive(Debug, Deserialize)]
struct AssetEntry {
    quote: HashMap<String, QuoteEntry>,
}

#[derive(Debug, Deserialize)]
struct QuoteEntry {
    price: f64,
    last_updated: String,
}

impl CmcClient {
    pub fn new(config: CmcConfig) -> Result<Self, PowerLawError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("powerlaw/0.1")
            .build()
            .map_err(|e| PowerLawError::FetchFailed(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn quotes_latest(&self) -> Result<QuotesResponse, PowerLawError> {
        let url = format!("{}/cryptocurrency/quotes/latest", self.config.base_url);
        let mut backoff = Duration::from_millis(INITIAL_BACKOFF_MS);

        for attempt in 1..=MAX_RETRIES {
            let result = self
                .client
                .get(&url)
                .header("X-CMC_PRO_API_KEY", &self.config.api_key)
                .query(&[
                    ("symbol", self.config.symbol.as_str()),
                    ("convert", self.config.convert.as_str()),
                ])
                .send();

            match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<QuotesResponse>()
                            .map_err(|e| PowerLawError::FetchFailed(format!("decode: {}", e)));
                    }
                    // Rate limits and server hiccups are worth another try;
                    // auth or request errors are not.
                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        warn!(%status, attempt, "quotes/latest retryable failure");
                    } else {
                        return Err(PowerLawError::FetchFailed(format!(
                            "quotes/latest returned {}",
                            status
                        )));
                    }
                }
                Err(e) => {
                    warn!(error = %e, attempt, "quotes/latest transport failure");
                }
            }

            if attempt < MAX_RETRIES {
                debug!(backoff_ms = backoff.as_millis() as u64, "backing off");
                sleep(backoff);
                backoff *= 2;
            }
        }

        Err(PowerLawError::FetchFailed(format!(
            "quotes/latest failed after {} attempts",
            MAX_RETRIES
        )))
    }
}

impl PriceFeed for CmcClient {
    fn latest(&self) -> Result<PriceQuote, PowerLawError> {
        let response = self.quotes_latest()?;
        let quote = extract_quote(&response, &self.config.symbol, &self.config.convert)?;
        info!(
            symbol = %self.config.symbol,
            date = %quote.date,
            price = quote.price,
            "fetched latest price"
        );
        Ok(quote)
    }
}

fn extract_quote(
    response: &QuotesResponse,
    symbol: &str,
    convert: &str,
) -> Result<PriceQuote, PowerLawError> {
    let entry = response
        .data
        .get(symbol)
        .and_then(|asset| asset.quote.get(convert))
        .ok_or_else(|| {
            PowerLawError::FetchFailed(format!("response missing {}/{} quote", symbol, convert))
        })?;

    if !entry.price.is_finite() || entry.price <= 0.0 {
        return Err(PowerLawError::FetchFailed(format!(
            "non-positive price {} for {}",
            entry.price, symbol
        )));
    }

    // `last_updated` is an ISO-8601 timestamp; the calendar date is its first
    // 10 characters.
    let date_part = entry.last_updated.get(..10).ok_or_else(|| {
        PowerLawError::FetchFailed(format!("timestamp too short: {}", entry.last_updated))
    })?;
    let date: NaiveDate = date_part
        .parse()
        .map_err(|e| PowerLawError::FetchFailed(format!("bad timestamp {}: {}", date_part, e)))?;

    Ok(PriceQuote {
        date,
        price: entry.price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response() -> QuotesResponse {
        serde_json::from_str(
            r#"{
                "data": {
                    "BTC": {
                        "quote": {
                            "USD": {
                                "price": 67512.3456,
                                "last_updated": "2024-06-01T09:30:00.000Z"
                            }
                        }
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_extract_quote() {
        let quote = extract_quote(&sample_response(), "BTC", "USD").unwrap();
        assert_eq!(quote.date.to_string(), "2024-06-01");
        assert!((quote.price - 67512.3456).abs() < 1e-9);
    }

    #[test]
    fn test_missing_convert_currency() {
        let err = extract_quote(&sample_response(), "BTC", "EUR").unwrap_err();
        assert!(matches!(err, PowerLawError::FetchFailed(_)));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let response: QuotesResponse = serde_json::from_str(
            r#"{"data":{"BTC":{"quote":{"USD":{"price":0.0,"last_updated":"2024-06-01T09:30:00Z"}}}}}"#,
        )
        .unwrap();
        let err = extract_quote(&response, "BTC", "USD").unwrap_err();
        assert!(err.to_string().contains("non-positive price"));
    }
}
