use crate::error::{EstimatorError, Result};
use crate::models::{FuelType, Gearbox, Listing, RawListing};
use crate::observability::StructuredLogger;
use polars::prelude::{DataFrame, DataType, ParquetReader, SerReader};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// On-disk layout of a snapshot, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Csv,
    Parquet,
}

impl SnapshotFormat {
    /// `.parquet` and `.pq` are columnar; anything else is read as CSV
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("parquet") | Some("pq") => SnapshotFormat::Parquet,
            _ => SnapshotFormat::Csv,
        }
    }
}

/// One snapshot row as written by the exporter.
///
/// `list_id` and `url` are deliberately not mapped. Numeric columns are
/// read as floats because exporters write integer columns containing
/// nulls as `2018.0`.
#[derive(Debug, Deserialize)]
struct SnapshotRecord {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    brand: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    model: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    year: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    horsepower: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    f_horsepower: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    mileage: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    nb_doors: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    nb_seats: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    gearbox: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fuel_type: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    price_cents: Option<f64>,
}

/// Counters gathered while loading a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows: usize,
    /// Rows whose fuel type was outside the known vocabulary
    pub unknown_fuel_rows: usize,
    pub invalid_gearbox_rows: usize,
}

/// In-memory listings snapshot, one row per advertisement
#[derive(Debug, Clone, Default)]
pub struct ListingTable {
    rows: Vec<RawListing>,
    stats: LoadStats,
}

impl ListingTable {
    /// Load a CSV or Parquet snapshot from disk
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| EstimatorError::io(path, e))?;
        let format = SnapshotFormat::from_path(path);
        debug!(path = %path.display(), ?format, "Reading snapshot");
        let table = match format {
            SnapshotFormat::Csv => Self::from_reader(file)?,
            SnapshotFormat::Parquet => Self::from_parquet(file)?,
        };
        StructuredLogger::new("loader").log_corpus_loaded(path, &table.stats);
        Ok(table)
    }

    /// Parse a CSV snapshot from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let records = reader
            .deserialize::<SnapshotRecord>()
            .collect::<std::result::Result<Vec<_>, csv::Error>>()?;
        Ok(Self::from_records(records))
    }

    /// Parse a Parquet snapshot; absent columns read as missing values
    pub fn from_parquet(file: File) -> Result<Self> {
        let df = ParquetReader::new(file).finish()?;

        let brand = string_cells(&df, "brand")?;
        let model = string_cells(&df, "model")?;
        let year = float_cells(&df, "year")?;
        let horsepower = float_cells(&df, "horsepower")?;
        let f_horsepower = float_cells(&df, "f_horsepower")?;
        let mileage = float_cells(&df, "mileage")?;
        let nb_doors = float_cells(&df, "nb_doors")?;
        let nb_seats = float_cells(&df, "nb_seats")?;
        let gearbox = category_cells(&df, "gearbox")?;
        let fuel_type = category_cells(&df, "fuel_type")?;
        let price_cents = float_cells(&df, "price_cents")?;

        let records = (0..df.height()).map(|i| SnapshotRecord {
            brand: brand[i].clone(),
            model: model[i].clone(),
            year: year[i],
            horsepower: horsepower[i],
            f_horsepower: f_horsepower[i],
            mileage: mileage[i],
            nb_doors: nb_doors[i],
            nb_seats: nb_seats[i],
            gearbox: gearbox[i].clone(),
            fuel_type: fuel_type[i].clone(),
            price_cents: price_cents[i],
        });
        Ok(Self::from_records(records))
    }

    fn from_records(records: impl IntoIterator<Item = SnapshotRecord>) -> Self {
        let mut stats = LoadStats::default();
        let rows: Vec<RawListing> = records
            .into_iter()
            .map(|record| convert(record, &mut stats))
            .collect();
        stats.rows = rows.len();

        if stats.unknown_fuel_rows > 0 {
            warn!(
                unknown_fuel_rows = stats.unknown_fuel_rows,
                "Fuel types outside {{Essence, Diesel}} treated as missing"
            );
        }

        Self { rows, stats }
    }

    pub fn from_rows(rows: Vec<RawListing>) -> Self {
        let stats = LoadStats {
            rows: rows.len(),
            ..Default::default()
        };
        Self { rows, stats }
    }

    pub fn rows(&self) -> &[RawListing] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// Rows with every field present; incomplete rows are dropped
    pub fn complete_rows(&self) -> Vec<Listing> {
        let complete: Vec<Listing> = self.rows.iter().filter_map(RawListing::complete).collect();
        let dropped = self.rows.len() - complete.len();
        if dropped > 0 {
            StructuredLogger::new("loader").log_rows_dropped(dropped, complete.len());
        }
        complete
    }
}

fn convert(record: SnapshotRecord, stats: &mut LoadStats) -> RawListing {
    let fuel_type = record.fuel_type.as_deref().and_then(|raw| {
        let parsed = raw.parse::<FuelType>().ok();
        if parsed.is_none() {
            stats.unknown_fuel_rows += 1;
        }
        parsed
    });
    let gearbox = record.gearbox.as_deref().and_then(|raw| {
        let parsed = raw.parse::<Gearbox>().ok();
        if parsed.is_none() {
            stats.invalid_gearbox_rows += 1;
        }
        parsed
    });

    RawListing {
        brand: non_empty(record.brand),
        model: non_empty(record.model),
        year: record.year.and_then(whole).and_then(|v| i32::try_from(v).ok()),
        horsepower: record.horsepower.filter(|v| v.is_finite()),
        f_horsepower: record.f_horsepower.filter(|v| v.is_finite()),
        mileage: record.mileage.filter(|v| v.is_finite()),
        nb_doors: record.nb_doors.and_then(whole).and_then(|v| u32::try_from(v).ok()),
        nb_seats: record.nb_seats.and_then(whole).and_then(|v| u32::try_from(v).ok()),
        gearbox,
        fuel_type,
        price_cents: record.price_cents.and_then(whole),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Integral value of a float cell, or None for NaN and fractional values
fn whole(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

fn string_cells(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let Ok(column) = df.column(name) else {
        return Ok(vec![None; df.height()]);
    };
    let cells = column.cast(&DataType::String)?;
    Ok(cells
        .str()?
        .into_iter()
        .map(|cell| cell.map(|v| v.trim().to_string()))
        .collect())
}

fn float_cells(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let Ok(column) = df.column(name) else {
        return Ok(vec![None; df.height()]);
    };
    let cells = column.cast(&DataType::Float64)?;
    Ok(cells.f64()?.into_iter().collect())
}

/// Category cells that may have been stored as codes in a float column,
/// so `1.0` reads as `1`
fn category_cells(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    Ok(string_cells(df, name)?
        .into_iter()
        .map(|cell| {
            cell.map(|v| match v.parse::<f64>().ok().and_then(whole) {
                Some(code) => code.to_string(),
                None => v,
            })
        })
        .collect())
}
