use chrono::NaiveDate;

/// Default deviation band multiples, in units of the log-residual std.
pub const DEFAULT_BAND_MULTIPLES: [f64; 10] =
    [-3.0, -2.5, -2.0, -1.5, -1.0, 1.0, 1.5, 2.0, 2.5, 3.0];

/// Power-law fit configuration.
///
/// `genesis_date` is the epoch the day index is measured from (the Bitcoin
/// genesis block date by default). Band multiples may be any non-zero finite
/// set; negative multiples produce `dev_down_*` curves, positive ones
/// `dev_up_*`.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub genesis_date: NaiveDate,
    pub band_multiples: Vec<f64>,
    pub quote_currency: String,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            genesis_date: default_genesis_date(),
            band_multiples: DEFAULT_BAND_MULTIPLES.to_vec(),
            quote_currency: "USD".to_string(),
        }
    }
}

impl FitConfig {
    pub fn with_bands(band_multiples: Vec<f64>) -> Self {
        Self {
            band_multiples,
            ..Self::default()
        }
    }
}

/// 2009-01-03, the Bitcoin genesis block date.
pub fn default_genesis_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2009, 1, 3).unwrap()
}

/// JSON field name for a band multiple, e.g. `dev_up_2` or `dev_down_1_5`.
///
/// The decimal point of a fractional multiple is spelled `_` so the label
/// stays a plain identifier-like key.
pub fn band_label(multiple: f64) -> String {
    let side = if multiple < 0.0 { "dev_down" } else { "dev_up" };
    let magnitude = multiple.abs();
    if magnitude.fract() == 0.0 {
        format!("{}_{}", side, magnitude as i64)
    } else {
        format!("{}_{}", side, magnitude.to_string().replace('.', "_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FitConfig::default();
        assert_eq!(config.genesis_date.to_string(), "2009-01-03");
        assert_eq!(config.band_multiples.len(), 10);
        assert_eq!(config.quote_currency, "USD");
    }

    #[test]
    fn test_band_label_integer() {
        assert_eq!(band_label(1.0), "dev_up_1");
        assert_eq!(band_label(-2.0), "dev_down_2");
        assert_eq!(band_label(3.0), "dev_up_3");
    }

    #[test]
    fn test_band_label_fractional() {
        assert_eq!(band_label(1.5), "dev_up_1_5");
        assert_eq!(band_label(-1.5), "dev_down_1_5");
        assert_eq!(band_label(2.5), "dev_up_2_5");
    }

    #[test]
    fn test_with_bands_keeps_other_defaults() {
        let config = FitConfig::with_bands(vec![-1.0, 1.0, 2.0]);
        assert_eq!(config.band_multiples, vec![-1.0, 1.0, 2.0]);
        assert_eq!(config.genesis_date, default_genesis_date());
    }
}
