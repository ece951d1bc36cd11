pub mod common;
pub mod config;
pub mod history;
pub mod math;
pub mod traits;

pub use common::error::PowerLawError;
pub use config::fit_config::FitConfig;
pub use history::observation::Observation;
pub use history::series::PriceSeries;
pub use math::power_law::{AnnotatedObservation, FitReport, PowerLawFit, PowerLawModel};
pub use traits::price_feed::{PriceFeed, PriceQuote};
pub use traits::series_store::SeriesStore;
