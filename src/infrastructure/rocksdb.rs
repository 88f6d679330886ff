use crate::domain::farm::Farm;
use crate::domain::ids::{FarmId, PaymentId};
use crate::domain::payment::{MonthlyPayment, PaymentPatch};
use crate::domain::ports::{FarmStore, PaymentStore, ProductionStore};
use crate::domain::production::DailyProduction;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for farm documents.
pub const CF_FARMS: &str = "farms";
/// Column Family for daily production records.
pub const CF_PRODUCTIONS: &str = "productions";
/// Column Family for monthly payment snapshots.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent store implementation using RocksDB.
///
/// Each collection lives in its own Column Family with JSON values.
/// Production keys are `farm_id ++ timestamp ++ record_id`, so a month of one
/// farm's records is a single forward range scan.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating the
    /// column families on first use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_FARMS, CF_PRODUCTIONS, CF_PAYMENTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            PaymentError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn put<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key, bytes)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_all<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut items = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            items.push(serde_json::from_slice(&value)?);
        }
        Ok(items)
    }
}

/// Maps a timestamp to 8 bytes whose lexicographic order matches time order.
fn ordered_timestamp(date: DateTime<Utc>) -> [u8; 8] {
    ((date.timestamp_micros() as u64) ^ (1 << 63)).to_be_bytes()
}

fn production_key_prefix(farm_id: FarmId, date: DateTime<Utc>) -> Vec<u8> {
    let mut key = Vec::with_capacity(40);
    key.extend_from_slice(farm_id.as_bytes());
    key.extend_from_slice(&ordered_timestamp(date));
    key
}

#[async_trait]
impl FarmStore for RocksDBStore {
    async fn store(&self, farm: Farm) -> Result<()> {
        self.put(CF_FARMS, farm.id.as_bytes(), &farm)
    }

    async fn get(&self, farm_id: FarmId) -> Result<Option<Farm>> {
        self.fetch(CF_FARMS, farm_id.as_bytes())
    }
}

#[async_trait]
impl ProductionStore for RocksDBStore {
    async fn store(&self, record: DailyProduction) -> Result<()> {
        let mut key = production_key_prefix(record.farm_id, record.date);
        key.extend_from_slice(record.id.as_bytes());
        self.put(CF_PRODUCTIONS, &key, &record)
    }

    async fn find_in_range(
        &self,
        farm_id: FarmId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DailyProduction>> {
        let cf = self.cf(CF_PRODUCTIONS)?;
        let from = production_key_prefix(farm_id, start);
        let until = production_key_prefix(farm_id, end);

        let mut records = Vec::new();
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(from.as_slice(), Direction::Forward));
        for item in iter {
            let (key, value) = item?;
            if key.len() < until.len() || key[..until.len()] > until[..] {
                break;
            }
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn insert(&self, payment: MonthlyPayment) -> Result<()> {
        self.put(CF_PAYMENTS, payment.id.as_bytes(), &payment)
    }

    async fn get(&self, payment_id: PaymentId) -> Result<Option<MonthlyPayment>> {
        self.fetch(CF_PAYMENTS, payment_id.as_bytes())
    }

    async fn find_by_year(&self, farm_id: FarmId, year: i32) -> Result<Vec<MonthlyPayment>> {
        let mut payments: Vec<MonthlyPayment> = self.scan_all(CF_PAYMENTS)?;
        payments.retain(|p| p.is_for(farm_id, year));
        Ok(payments)
    }

    async fn update(
        &self,
        payment_id: PaymentId,
        patch: PaymentPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<MonthlyPayment>> {
        let Some(mut payment) = self.fetch::<MonthlyPayment>(CF_PAYMENTS, payment_id.as_bytes())?
        else {
            return Ok(None);
        };
        payment.apply(&patch, now);
        self.put(CF_PAYMENTS, payment_id.as_bytes(), &payment)?;
        Ok(Some(payment))
    }

    async fn delete(&self, payment_id: PaymentId) -> Result<bool> {
        let cf = self.cf(CF_PAYMENTS)?;
        let key = payment_id.as_bytes();
        // Just check if the key exists without retrieving the value
        let existed = self.db.get_pinned_cf(cf, key)?.is_some();
        if existed {
            self.db.delete_cf(cf, key)?;
        }
        Ok(existed)
    }
}
