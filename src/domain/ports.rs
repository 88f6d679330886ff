use super::farm::Farm;
use super::ids::{FarmId, PaymentId};
use super::money::Currency;
use super::payment::{MonthlyPayment, PaymentPatch};
use super::production::DailyProduction;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Farm documents, keyed by `FarmId`.
#[async_trait]
pub trait FarmStore: Send + Sync {
    /// Inserts the farm, replacing any farm with the same id.
    async fn store(&self, farm: Farm) -> Result<()>;
    async fn get(&self, farm_id: FarmId) -> Result<Option<Farm>>;
}

/// Daily production records, queried by farm and date range.
#[async_trait]
pub trait ProductionStore: Send + Sync {
    /// Inserts the record, replacing any record with the same id.
    async fn store(&self, record: DailyProduction) -> Result<()>;
    /// Records of `farm_id` dated within `[start, end]`, both inclusive.
    async fn find_in_range(
        &self,
        farm_id: FarmId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DailyProduction>>;
}

/// Monthly payment snapshots. Duplicates for the same farm and month are
/// allowed at this level.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, payment: MonthlyPayment) -> Result<()>;
    async fn get(&self, payment_id: PaymentId) -> Result<Option<MonthlyPayment>>;
    /// Every snapshot of `farm_id` for `year`, in no particular order.
    async fn find_by_year(&self, farm_id: FarmId, year: i32) -> Result<Vec<MonthlyPayment>>;
    /// Snapshots of one month. Backends without a better index can rely on
    /// this default, which filters `find_by_year`.
    async fn find_by_period(
        &self,
        farm_id: FarmId,
        year: i32,
        month: u32,
    ) -> Result<Vec<MonthlyPayment>> {
        let mut payments = self.find_by_year(farm_id, year).await?;
        payments.retain(|p| p.month == month);
        Ok(payments)
    }
    /// Returns the patched snapshot, or `None` if no snapshot has that id.
    async fn update(
        &self,
        payment_id: PaymentId,
        patch: PaymentPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<MonthlyPayment>>;
    /// Returns whether a snapshot was removed.
    async fn delete(&self, payment_id: PaymentId) -> Result<bool>;
}

/// External exchange-rate provider.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Units of `to` per one unit of `from`.
    async fn rate(&self, from: Currency, to: Currency) -> Result<Decimal>;
}

pub type FarmStoreBox = Box<dyn FarmStore>;
pub type ProductionStoreBox = Box<dyn ProductionStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type RateSourceBox = Box<dyn RateSource>;
