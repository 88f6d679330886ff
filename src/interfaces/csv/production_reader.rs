use crate::domain::ids::{FarmId, ProductionId};
use crate::domain::production::DailyProduction;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct ProductionRow {
    id: Option<ProductionId>,
    farm_id: FarmId,
    date: String,
    volume_liters: Decimal,
}

/// Reads daily production records from a CSV source with the header
/// `id, farm_id, date, volume_liters`.
///
/// `id` may be left empty, in which case one is derived from the farm and the
/// date, so importing the same file twice yields the same records. `date` is either
/// `YYYY-MM-DD` (taken as midnight UTC) or an RFC 3339 timestamp.
pub struct ProductionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ProductionReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and validates records, one `Result` per row.
    pub fn records(self) -> impl Iterator<Item = Result<DailyProduction>> {
        self.reader
            .into_deserialize::<ProductionRow>()
            .map(|row| row.map_err(PaymentError::from).and_then(into_record))
    }
}

fn into_record(row: ProductionRow) -> Result<DailyProduction> {
    if row.volume_liters < Decimal::ZERO {
        return Err(PaymentError::ValidationError(format!(
            "Negative volume {} for farm {} on {}",
            row.volume_liters, row.farm_id, row.date
        )));
    }
    let date = parse_date(&row.date)?;
    Ok(DailyProduction {
        id: row
            .id
            .unwrap_or_else(|| DailyProduction::derived_id(row.farm_id, date)),
        farm_id: row.farm_id,
        date,
        volume_liters: row.volume_liters,
    })
}

pub fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|e| PaymentError::ValidationError(format!("Invalid date '{raw}': {e}")))
}
