use crate::common::error::PowerLawError;
use crate::history::series::PriceSeries;

/// Persistence boundary for the price history.
///
/// Implementations own the on-disk format; the fit core only ever sees an
/// in-memory series.
pub trait SeriesStore {
    fn load(&self) -> Result<PriceSeries, PowerLawError>;
    fn save(&self, series: &PriceSeries) -> Result<(), PowerLawError>;
}
