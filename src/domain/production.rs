use super::ids::{FarmId, ProductionId};
use crate::error::PaymentError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One day's milk volume for one farm.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct DailyProduction {
    #[serde(rename = "_id")]
    pub id: ProductionId,
    pub farm_id: FarmId,
    pub date: DateTime<Utc>,
    pub volume_liters: Decimal,
}

impl DailyProduction {
    /// Id for a record that arrives without one. The same farm and timestamp
    /// always map to the same id, so re-importing a log replaces records
    /// instead of adding copies.
    pub fn derived_id(farm_id: FarmId, date: DateTime<Utc>) -> ProductionId {
        let mut name = Vec::with_capacity(24);
        name.extend_from_slice(farm_id.as_bytes());
        name.extend_from_slice(&date.timestamp_micros().to_be_bytes());
        ProductionId::from_uuid(Uuid::new_v5(&Uuid::NAMESPACE_OID, &name))
    }
}

/// A calendar month, the unit every payment is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, PaymentError> {
        if !(1..=12).contains(&month) {
            return Err(PaymentError::ValidationError(format!(
                "Month must be between 1 and 12, got {month}"
            )));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() || last_day_of(year, month).is_none() {
            return Err(PaymentError::ValidationError(format!(
                "Year {year} is out of range"
            )));
        }
        Ok(Self { year, month })
    }

    /// Inclusive UTC bounds of the month: 00:00:00 on day 1 through
    /// 23:59:59 on the last day.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let first = self.first_day();
        let last = self.last_day();
        let start = Utc.from_utc_datetime(&first.and_time(chrono::NaiveTime::MIN));
        let end = Utc.from_utc_datetime(
            &last
                .and_hms_opt(23, 59, 59)
                .unwrap_or_else(|| last.and_time(chrono::NaiveTime::MIN)),
        );
        (start, end)
    }

    pub fn last_day(&self) -> NaiveDate {
        // `new` guarantees the last day exists.
        last_day_of(self.year, self.month).unwrap_or_else(|| self.first_day())
    }

    fn first_day(&self) -> NaiveDate {
        // `new` guarantees day 1 of this month exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
}

fn last_day_of(year: i32, month: u32) -> Option<NaiveDate> {
    if month == 12 {
        // no next month to step back from in chrono's last supported year
        return NaiveDate::from_ymd_opt(year, 12, 31);
    }
    NaiveDate::from_ymd_opt(year, month + 1, 1)?.pred_opt()
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct DailyVolume {
    pub date: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub volume_liters: Decimal,
}

/// Aggregated production for one farm over one period.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProductionSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_volume_liters: Decimal,
    pub daily_productions: Vec<DailyVolume>,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_liters: Decimal,
}

impl ProductionSummary {
    /// Sums the given records. Returns `None` when there are no records, which
    /// callers must treat as "no data for period" rather than a zero volume.
    pub fn aggregate(mut records: Vec<DailyProduction>) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        records.sort_by_key(|r| r.date);

        let total_volume_liters: Decimal = records.iter().map(|r| r.volume_liters).sum();
        let average_liters = round_money(total_volume_liters / Decimal::from(records.len()));
        let daily_productions = records
            .into_iter()
            .map(|r| DailyVolume {
                date: r.date,
                volume_liters: r.volume_liters,
            })
            .collect();

        Some(Self {
            total_volume_liters,
            daily_productions,
            average_liters,
        })
    }
}

/// Rounds to 2 decimal places, halves away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
