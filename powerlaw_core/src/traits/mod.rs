pub mod price_feed;
pub mod series_store;
