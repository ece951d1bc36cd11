use chrono::NaiveDate;

use crate::common::error::PowerLawError;

/// A clean (date, price) pair as delivered by a price feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub date: NaiveDate,
    pub price: f64,
}

/// Source of the latest daily price.
///
/// Implementations own all transport concerns (network, rate limits, retries,
/// malformed responses) and surface them as `FetchFailed`; the pipeline only
/// ever sees a quote or that error.
pub trait PriceFeed {
    fn latest(&self) -> Result<PriceQuote, PowerLawError>;
}
