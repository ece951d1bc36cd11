use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::common::error::PowerLawError;
use crate::history::observation::Observation;

/// Date-ordered price history, unique by calendar date.
///
/// Mutation is append-only and idempotent: appending a date that is already
/// present leaves the series unchanged, so the daily pipeline can be re-run
/// any number of times without double-counting. Insertion order is preserved
/// for deterministic serialization; the fitter itself is order-independent.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    genesis: NaiveDate,
    observations: Vec<Observation>,
    dates: HashSet<NaiveDate>,
}

impl PriceSeries {
    pub fn new(genesis: NaiveDate) -> Self {
        Self {
            genesis,
            observations: Vec::new(),
            dates: HashSet::new(),
        }
    }

    /// Assemble a series from already-validated observations.
    ///
    /// Later rows carrying a date that is already present are dropped, the
    /// same outcome an idempotent append of that row would have produced.
    pub fn from_observations(
        genesis: NaiveDate,
        observations: impl IntoIterator<Item = Observation>,
    ) -> Self {
        let mut series = Self::new(genesis);
        let mut dropped = 0usize;
        for obs in observations {
            if series.dates.insert(obs.date) {
                series.observations.push(obs);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!(dropped, "dropped duplicate dates while assembling series");
        }
        series
    }

    /// Append one (date, price) pair, deriving the day index from genesis.
    ///
    /// Returns `true` if the observation was inserted, `false` if the date was
    /// already present (no-op). Same inputs always give the same outcome.
    pub fn append(&mut self, date: NaiveDate, price: f64) -> Result<bool, PowerLawError> {
        if self.dates.contains(&date) {
            return Ok(false);
        }
        let obs = Observation::derive(date, price, self.genesis)?;
        self.dates.insert(date);
        self.observations.push(obs);
        Ok(true)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn genesis_date(&self) -> NaiveDate {
        self.genesis
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|obs| obs.date)
    }
}
