use super::ids::{FarmId, PaymentId};
use super::production::Period;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time snapshot of what a farm is owed for one month.
///
/// Snapshots are never recomputed when the underlying production records
/// change. Patches overwrite fields verbatim.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct MonthlyPayment {
    #[serde(rename = "_id")]
    pub id: PaymentId,
    pub farm_id: FarmId,
    pub year: i32,
    pub month: u32,
    pub price_per_liter: Decimal,
    pub total_volume_liters: Decimal,
    pub total_payment: Decimal,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl MonthlyPayment {
    pub fn new(
        farm_id: FarmId,
        period: Period,
        price_per_liter: Decimal,
        total_volume_liters: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            farm_id,
            year: period.year,
            month: period.month,
            price_per_liter,
            total_volume_liters,
            total_payment: price_per_liter * total_volume_liters,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_for(&self, farm_id: FarmId, year: i32) -> bool {
        self.farm_id == farm_id && self.year == year
    }

    fn recency(&self) -> (DateTime<Utc>, PaymentId) {
        (self.created_at, self.id)
    }

    /// Overwrites the patched fields and bumps `updated_at`.
    pub fn apply(&mut self, patch: &PaymentPatch, now: DateTime<Utc>) {
        if let Some(price) = patch.price_per_liter {
            self.price_per_liter = price;
        }
        if let Some(volume) = patch.total_volume_liters {
            self.total_volume_liters = volume;
        }
        if let Some(total) = patch.total_payment {
            self.total_payment = total;
        }
        self.updated_at = now;
    }
}

/// Raw field overwrite for a payment snapshot. Nothing is recomputed.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentPatch {
    pub price_per_liter: Option<Decimal>,
    pub total_volume_liters: Option<Decimal>,
    pub total_payment: Option<Decimal>,
}

impl PaymentPatch {
    pub fn is_empty(&self) -> bool {
        self.price_per_liter.is_none()
            && self.total_volume_liters.is_none()
            && self.total_payment.is_none()
    }
}

/// Keeps the most recently created snapshot per month when duplicates exist.
/// Snapshots created at the same instant are ranked by id, so the pick does
/// not depend on the order the store returns them in.
pub fn latest_per_month(payments: Vec<MonthlyPayment>) -> Vec<MonthlyPayment> {
    let mut by_month: BTreeMap<u32, MonthlyPayment> = BTreeMap::new();
    for payment in payments {
        match by_month.get(&payment.month) {
            Some(existing) if existing.recency() > payment.recency() => {}
            _ => {
                by_month.insert(payment.month, payment);
            }
        }
    }
    by_month.into_values().collect()
}
