use std::fs;
use std::fs::File;
use std::path::PathBuf;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{debug, info};

use powerlaw_core::{Observation, PowerLawError, PriceSeries, SeriesStore};

/// Semicolon-delimited CSV store for the price history.
///
/// Canonical header is `date;day_index;price`. The historical data file
/// predates this tool and is accepted as-is: `Date`/`DaysGB`/`Price` header
/// spellings and decimal-comma prices parse fine. Saving always writes the
/// canonical form.
pub struct CsvStore {
    path: PathBuf,
    genesis: NaiveDate,
}

struct Columns {
    date: usize,
    day_index: Option<usize>,
    price: usize,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>, genesis: NaiveDate) -> Self {
        Self {
            path: path.into(),
            genesis,
        }
    }
}

impl SeriesStore for CsvStore {
    fn load(&self) -> Result<PriceSeries, PowerLawError> {
        let file = File::open(&self.path).map_err(|e| {
            PowerLawError::store(format!("open {}: {}", self.path.display(), e))
        })?;
        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| PowerLawError::malformed(format!("header: {}", e)))?
            .clone();
        let columns = resolve_columns(&headers)?;

        let mut observations = Vec::new();
        for (i, result) in reader.records().enumerate() {
            // Header is line 1, first data row is line 2.
            let line = i + 2;
            let record =
                result.map_err(|e| PowerLawError::malformed(format!("line {}: {}", line, e)))?;
            let obs = parse_row(&record, &columns, self.genesis)
                .map_err(|e| PowerLawError::malformed(format!("line {}: {}", line, e)))?;
            observations.push(obs);
        }

        let series = PriceSeries::from_observations(self.genesis, observations);
        info!(
            path = %self.path.display(),
            rows = series.len(),
            "loaded price history"
        );
        Ok(series)
    }

    fn save(&self, series: &PriceSeries) -> Result<(), PowerLawError> {
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = WriterBuilder::new()
                .delimiter(b';')
                .from_path(&tmp)
                .map_err(|e| PowerLawError::store(format!("create {}: {}", tmp.display(), e)))?;
            writer
                .write_record(["date", "day_index", "price"])
                .map_err(|e| PowerLawError::store(e.to_string()))?;
            for obs in series.iter() {
                writer
                    .write_record([
                        obs.date.to_string(),
                        obs.day_index.to_string(),
                        obs.price.to_string(),
                    ])
                    .map_err(|e| PowerLawError::store(e.to_string()))?;
            }
            writer
                .flush()
                .map_err(|e| PowerLawError::store(e.to_string()))?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| {
            PowerLawError::store(format!("rename {}: {}", self.path.display(), e))
        })?;
        debug!(path = %self.path.display(), rows = series.len(), "saved price history");
        Ok(())
    }
}

fn resolve_columns(headers: &StringRecord) -> Result<Columns, PowerLawError> {
    let mut date = None;
    let mut day_index = None;
    let mut price = None;
    for (i, name) in headers.iter().enumerate() {
        match name.to_ascii_lowercase().as_str() {
            "date" => date = Some(i),
            "day_index" | "daysgb" => day_index = Some(i),
            "price" => price = Some(i),
            _ => {}
        }
    }
    match (date, price) {
        (Some(date), Some(price)) => Ok(Columns {
            date,
            day_index,
            price,
        }),
        _ => Err(PowerLawError::malformed(format!(
            "header must name date and price columns, got: {:?}",
            headers
        ))),
    }
}

fn parse_row(
    record: &StringRecord,
    columns: &Columns,
    genesis: NaiveDate,
) -> Result<Observation, PowerLawError> {
    let date_field = record
        .get(columns.date)
        .ok_or_else(|| PowerLawError::malformed("missing date field"))?;
    let date: NaiveDate = date_field
        .parse()
        .map_err(|e| PowerLawError::malformed(format!("date {:?}: {}", date_field, e)))?;

    let price_field = record
        .get(columns.price)
        .ok_or_else(|| PowerLawError::malformed("missing price field"))?;
    // Legacy rows use a decimal comma.
    let price: f64 = price_field
        .replace(',', ".")
        .parse()
        .map_err(|e| PowerLawError::malformed(format!("price {:?}: {}", price_field, e)))?;

    match columns.day_index {
        Some(col) => {
            let field = record
                .get(col)
                .ok_or_else(|| PowerLawError::malformed("missing day_index field"))?;
            let day_index: i64 = field
                .parse()
                .map_err(|e| PowerLawError::malformed(format!("day_index {:?}: {}", field, e)))?;
            Observation::from_parts(date, day_index, price, genesis)
        }
        None => Observation::derive(date, price, genesis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerlaw_core::config::fit_config::default_genesis_date;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_canonical_format() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "history.csv",
            "date;day_index;price\n2013-01-03;1461;13.5\n2017-01-03;2922;1020.0\n",
        );
        let store = CsvStore::new(path, default_genesis_date());
        let series = store.load().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.observations()[0].day_index, 1461);
    }

    #[test]
    fn test_load_legacy_headers_and_decimal_comma() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "history.csv",
            "Date;DaysGB;Price\n2013-01-03;1461;13,5\n",
        );
        let store = CsvStore::new(path, default_genesis_date());
        let series = store.load().unwrap();
        assert_eq!(series.len(), 1);
        assert!((series.observations()[0].price - 13.5).abs() < 1e-12);
    }

    #[test]
    fn test_load_derives_day_index_when_column_absent() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "history.csv", "date;price\n2009-01-04;0.1\n");
        let store = CsvStore::new(path, default_genesis_date());
        let series = store.load().unwrap();
        assert_eq!(series.observations()[0].day_index, 1);
    }

    #[test]
    fn test_load_rejects_bad_price() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "history.csv",
            "date;day_index;price\n2013-01-03;1461;abc\n",
        );
        let store = CsvStore::new(path, default_genesis_date());
        let err = store.load().unwrap_err();
        assert!(matches!(err, PowerLawError::MalformedRecord(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_load_rejects_inconsistent_day_index() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "history.csv",
            "date;day_index;price\n2013-01-03;999;13.5\n",
        );
        let store = CsvStore::new(path, default_genesis_date());
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("disagrees"));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.csv");
        let genesis = default_genesis_date();

        let mut series = PriceSeries::new(genesis);
        series.append("2013-01-03".parse().unwrap(), 13.5).unwrap();
        series
            .append("2024-06-01".parse().unwrap(), 67512.3456)
            .unwrap();

        let store = CsvStore::new(&path, genesis);
        store.save(&series).unwrap();
        let reloaded = store.load().unwrap();

        assert_eq!(reloaded, series);
        assert!(!path.with_extension("csv.tmp").exists());
    }
}
