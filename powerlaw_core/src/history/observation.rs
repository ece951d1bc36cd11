use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::error::PowerLawError;

/// One daily price observation.
///
/// `day_index` counts whole days since the genesis date. It can be zero or
/// negative for dates at or before genesis; such observations stay in the
/// series but are skipped by the fitter, whose log-day axis is undefined for
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub day_index: i64,
    pub price: f64,
}

impl Observation {
    /// Build an observation from a fresh (date, price) pair, deriving the day
    /// index from the genesis date.
    pub fn derive(
        date: NaiveDate,
        price: f64,
        genesis: NaiveDate,
    ) -> Result<Self, PowerLawError> {
        check_price(date, price)?;
        Ok(Self {
            date,
            day_index: (date - genesis).num_days(),
            price,
        })
    }

    /// Build an observation from a persisted row that carries its day index
    /// directly.
    ///
    /// A direct day index must be strictly positive and must agree with the
    /// row's date under the given genesis; either violation means the row is
    /// corrupt, not merely stale.
    pub fn from_parts(
        date: NaiveDate,
        day_index: i64,
        price: f64,
        genesis: NaiveDate,
    ) -> Result<Self, PowerLawError> {
        check_price(date, price)?;
        if day_index <= 0 {
            return Err(PowerLawError::malformed(format!(
                "{}: day_index={} must be positive",
                date, day_index
            )));
        }
        let expected = (date - genesis).num_days();
        if day_index != expected {
            return Err(PowerLawError::malformed(format!(
                "{}: day_index={} disagrees with date (expected {})",
                date, day_index, expected
            )));
        }
        Ok(Self {
            date,
            day_index,
            price,
        })
    }

    /// Whether this observation can participate in the log-log fit.
    pub fn is_fittable(&self) -> bool {
        self.day_index > 0 && self.price > 0.0
    }
}

fn check_price(date: NaiveDate, price: f64) -> Result<(), PowerLawError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(PowerLawError::malformed(format!(
            "{}: price={} must be a positive number",
            date, price
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fit_config::default_genesis_date;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_derive_day_index() {
        let genesis = default_genesis_date();
        let obs = Observation::derive(date("2009-01-04"), 0.1, genesis).unwrap();
        assert_eq!(obs.day_index, 1);

        let obs = Observation::derive(date("2010-01-03"), 0.1, genesis).unwrap();
        assert_eq!(obs.day_index, 365);
    }

    #[test]
    fn test_derive_allows_genesis_but_not_fittable() {
        let genesis = default_genesis_date();
        let obs = Observation::derive(genesis, 0.1, genesis).unwrap();
        assert_eq!(obs.day_index, 0);
        assert!(!obs.is_fittable());
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let genesis = default_genesis_date();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = Observation::derive(date("2020-01-01"), bad, genesis).unwrap_err();
            assert!(matches!(err, PowerLawError::MalformedRecord(_)));
        }
    }

    #[test]
    fn test_from_parts_rejects_non_positive_day_index() {
        let genesis = default_genesis_date();
        let err = Observation::from_parts(genesis, 0, 1.0, genesis).unwrap_err();
        assert!(matches!(err, PowerLawError::MalformedRecord(_)));
    }

    #[test]
    fn test_from_parts_rejects_inconsistent_day_index() {
        let genesis = default_genesis_date();
        let err = Observation::from_parts(date("2009-01-04"), 2, 1.0, genesis).unwrap_err();
        assert!(err.to_string().contains("disagrees"));

        assert!(Observation::from_parts(date("2009-01-04"), 1, 1.0, genesis).is_ok());
    }
}
