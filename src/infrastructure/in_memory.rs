use crate::domain::farm::Farm;
use crate::domain::ids::{FarmId, PaymentId, ProductionId};
use crate::domain::payment::{MonthlyPayment, PaymentPatch};
use crate::domain::ports::{FarmStore, PaymentStore, ProductionStore};
use crate::domain::production::DailyProduction;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for farms.
///
/// Uses `Arc<RwLock<HashMap<FarmId, Farm>>>` to allow shared concurrent access.
#[derive(Default, Clone)]
pub struct InMemoryFarmStore {
    farms: Arc<RwLock<HashMap<FarmId, Farm>>>,
}

impl InMemoryFarmStore {
    /// Creates a new, empty in-memory farm store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FarmStore for InMemoryFarmStore {
    async fn store(&self, farm: Farm) -> Result<()> {
        let mut farms = self.farms.write().await;
        farms.insert(farm.id, farm);
        Ok(())
    }

    async fn get(&self, farm_id: FarmId) -> Result<Option<Farm>> {
        let farms = self.farms.read().await;
        Ok(farms.get(&farm_id).cloned())
    }
}

/// A thread-safe in-memory store for daily production records.
#[derive(Default, Clone)]
pub struct InMemoryProductionStore {
    records: Arc<RwLock<HashMap<ProductionId, DailyProduction>>>,
}

impl InMemoryProductionStore {
    /// Creates a new, empty in-memory production store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductionStore for InMemoryProductionStore {
    async fn store(&self, record: DailyProduction) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(record.id, record);
        Ok(())
    }

    async fn find_in_range(
        &self,
        farm_id: FarmId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DailyProduction>> {
        let records = self.records.read().await;
        let mut found: Vec<DailyProduction> = records
            .values()
            .filter(|r| r.farm_id == farm_id && r.date >= start && r.date <= end)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.date);
        Ok(found)
    }
}

/// A thread-safe in-memory store for monthly payment snapshots.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<PaymentId, MonthlyPayment>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, payment: MonthlyPayment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.id, payment);
        Ok(())
    }

    async fn get(&self, payment_id: PaymentId) -> Result<Option<MonthlyPayment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&payment_id).cloned())
    }

    async fn find_by_year(&self, farm_id: FarmId, year: i32) -> Result<Vec<MonthlyPayment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|p| p.is_for(farm_id, year))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        payment_id: PaymentId,
        patch: PaymentPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<MonthlyPayment>> {
        let mut payments = self.payments.write().await;
        Ok(payments.get_mut(&payment_id).map(|payment| {
            payment.apply(&patch, now);
            payment.clone()
        }))
    }

    async fn delete(&self, payment_id: PaymentId) -> Result<bool> {
        let mut payments = self.payments.write().await;
        Ok(payments.remove(&payment_id).is_some())
    }
}
