use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::error::PowerLawError;
use crate::config::fit_config::{band_label, FitConfig};
use crate::history::series::PriceSeries;

const MIN_FIT_POINTS: usize = 2;

/// Regression parameters of one power-law fit in log-log space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawFit {
    pub slope: f64,
    pub intercept: f64,
    pub std: f64,
}

/// One observation annotated with its fitted trend and deviation bands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedObservation {
    pub date: NaiveDate,
    pub day_index: i64,
    pub price: f64,
    pub trend: f64,
    #[serde(flatten)]
    pub bands: BTreeMap<String, f64>,
}

/// Terminal output of the fit: parameters plus the annotated series, in the
/// shape the rendering layer consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    pub slope: f64,
    pub intercept: f64,
    pub std: f64,
    pub last_update: DateTime<Utc>,
    pub data: Vec<AnnotatedObservation>,
}

/// Power-law trend model: `log10(price) ≈ slope · log10(day_index) + intercept`.
#[derive(Debug, Clone)]
pub struct PowerLawModel {
    config: FitConfig,
}

impl PowerLawModel {
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Fit the series and annotate every retained observation.
    ///
    /// Observations with `day_index <= 0` or `price <= 0` are excluded (their
    /// logarithm is undefined) and do not appear in the report.
    pub fn fit(&self, series: &PriceSeries) -> Result<FitReport, PowerLawError> {
        let retained: Vec<_> = series.iter().filter(|obs| obs.is_fittable()).collect();
        if retained.len() < MIN_FIT_POINTS {
            return Err(PowerLawError::InsufficientData {
                got: retained.len(),
                need: MIN_FIT_POINTS,
            });
        }

        let xs: Vec<f64> = retained
            .iter()
            .map(|obs| (obs.day_index as f64).log10())
            .collect();
        let ys: Vec<f64> = retained.iter().map(|obs| obs.price.log10()).collect();

        let fit = regress(&xs, &ys)?;
        debug!(
            points = retained.len(),
            slope = fit.slope,
            intercept = fit.intercept,
            std = fit.std,
            "power-law fit complete"
        );

        let data = retained
            .iter()
            .zip(&xs)
            .map(|(obs, &x)| {
                let trend = 10f64.powf(fit.slope * x + fit.intercept);
                let bands = self
                    .config
                    .band_multiples
                    .iter()
                    .map(|&k| (band_label(k), trend * 10f64.powf(k * fit.std)))
                    .collect();
                AnnotatedObservation {
                    date: obs.date,
                    day_index: obs.day_index,
                    price: obs.price,
                    trend,
                    bands,
                }
            })
            .collect();

        Ok(FitReport {
            slope: fit.slope,
            intercept: fit.intercept,
            std: fit.std,
            last_update: Utc::now(),
            data,
        })
    }
}

/// Closed-form OLS slope, per-point-intercept mean, and the sample standard
/// deviation of the absolute log-residuals.
///
/// The intercept is NOT the OLS intercept of the fitted line: it is the mean
/// of `y_i - slope * x_i` over all points, centering the trend through the
/// typical logarithmic deviation. Do not substitute the OLS intercept here.
fn regress(xs: &[f64], ys: &[f64]) -> Result<PowerLawFit, PowerLawError> {
    let n = xs.len();
    if n < MIN_FIT_POINTS {
        return Err(PowerLawError::InsufficientData {
            got: n,
            need: MIN_FIT_POINTS,
        });
    }
    let n_f = n as f64;

    let mean_x = xs.iter().sum::<f64>() / n_f;
    let mean_y = ys.iter().sum::<f64>() / n_f;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    if sxx == 0.0 {
        return Err(PowerLawError::DegenerateInput);
    }
    let slope = sxy / sxx;

    let intercept = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| y - slope * x)
        .sum::<f64>()
        / n_f;

    let diffs: Vec<f64> = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (y - (slope * x + intercept)).abs())
        .collect();
    let mean_diff = diffs.iter().sum::<f64>() / n_f;

    // Bessel's correction divides by n - 1.
    if n < 2 {
        return Err(PowerLawError::InsufficientData { got: n, need: 2 });
    }
    let variance = diffs
        .iter()
        .map(|&d| (d - mean_diff) * (d - mean_diff))
        .sum::<f64>()
        / (n_f - 1.0);
    let std = variance.sqrt();

    Ok(PowerLawFit {
        slope,
        intercept,
        std,
    })
}
