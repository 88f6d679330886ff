use super::conversion::{CurrencyConverter, PriceDisplay};
use crate::domain::farm::Farm;
use crate::domain::ids::{FarmId, PaymentId};
use crate::domain::payment::{MonthlyPayment, PaymentPatch, latest_per_month};
use crate::domain::ports::{FarmStoreBox, PaymentStoreBox, ProductionStoreBox, RateSourceBox};
use crate::domain::pricing;
use crate::domain::production::{Period, ProductionSummary, round_money};
use crate::error::{PaymentError, Result};
use chrono::Utc;
use futures_util::future::try_join_all;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use tracing::{debug, info};

/// Outcome of a read operation. "Not found" cases are ordinary results, not
/// errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    FarmNotFound,
    NoPaymentData,
    NoProductionData,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct Informational<'a> {
    message: &'a str,
}

impl<T: Serialize> Serialize for Lookup<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let message = match self {
            Lookup::Found(value) => return value.serialize(serializer),
            Lookup::FarmNotFound => "Farm not found",
            Lookup::NoPaymentData => "No payment data for this period",
            Lookup::NoProductionData => "No milk production data for this period",
        };
        Informational { message }.serialize(serializer)
    }
}

/// Price of one month of deliveries, as shown to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPrice {
    pub year: i32,
    pub month: u32,
    pub price_per_liter: PriceDisplay,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_payment: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_volume_liters: Decimal,
}

/// Orchestrates aggregation, pricing and conversion over the injected stores.
///
/// The service holds no mutable state of its own; every operation reads from
/// and writes to the stores it was built with.
pub struct PaymentService {
    farms: FarmStoreBox,
    productions: ProductionStoreBox,
    payments: PaymentStoreBox,
    converter: CurrencyConverter,
}

impl PaymentService {
    /// Creates a new `PaymentService`.
    ///
    /// # Arguments
    ///
    /// * `farms` - The store for farm documents.
    /// * `productions` - The store for daily production records.
    /// * `payments` - The store for monthly payment snapshots.
    /// * `rate_source` - Exchange rates for the BRL to USD display price.
    pub fn new(
        farms: FarmStoreBox,
        productions: ProductionStoreBox,
        payments: PaymentStoreBox,
        rate_source: RateSourceBox,
    ) -> Self {
        Self {
            farms,
            productions,
            payments,
            converter: CurrencyConverter::new(rate_source),
        }
    }

    /// Sums the farm's daily production over `period`. `None` means there
    /// were no records at all.
    pub async fn aggregate(
        &self,
        farm_id: FarmId,
        period: Period,
    ) -> Result<Option<ProductionSummary>> {
        let (start, end) = period.bounds();
        let records = self.productions.find_in_range(farm_id, start, end).await?;
        debug!(%farm_id, %period, records = records.len(), "aggregating production");
        Ok(ProductionSummary::aggregate(records))
    }

    pub async fn production_summary(
        &self,
        farm_id: FarmId,
        year: i32,
        month: u32,
    ) -> Result<Lookup<ProductionSummary>> {
        let period = Period::new(year, month)?;
        if self.farms.get(farm_id).await?.is_none() {
            return Ok(Lookup::FarmNotFound);
        }
        Ok(match self.aggregate(farm_id, period).await? {
            Some(summary) => Lookup::Found(summary),
            None => Lookup::NoProductionData,
        })
    }

    pub async fn price_by_farm_and_month(
        &self,
        farm_id: FarmId,
        year: i32,
        month: u32,
    ) -> Result<Lookup<MonthlyPrice>> {
        let period = Period::new(year, month)?;
        let Some(farm) = self.farms.get(farm_id).await? else {
            return Ok(Lookup::FarmNotFound);
        };

        let snapshots = self
            .payments
            .find_by_period(farm_id, period.year, period.month)
            .await?;
        let Some(payment) = latest_per_month(snapshots).pop() else {
            return Ok(Lookup::NoPaymentData);
        };

        debug!(%farm_id, %period, payment_id = %payment.id, "pricing stored snapshot");
        Ok(Lookup::Found(self.price_snapshot(&farm, &payment).await?))
    }

    /// Prices every month of `year` that has a snapshot, ordered by month.
    /// Conversions run concurrently and any single failure fails the call.
    pub async fn price_by_farm_and_year(
        &self,
        farm_id: FarmId,
        year: i32,
    ) -> Result<Lookup<Vec<MonthlyPrice>>> {
        Period::new(year, 1)?;
        let Some(farm) = self.farms.get(farm_id).await? else {
            return Ok(Lookup::FarmNotFound);
        };

        let snapshots = latest_per_month(self.payments.find_by_year(farm_id, year).await?);
        if snapshots.is_empty() {
            return Ok(Lookup::NoPaymentData);
        }

        debug!(%farm_id, year, months = snapshots.len(), "pricing yearly snapshots");
        let prices =
            try_join_all(snapshots.iter().map(|payment| self.price_snapshot(&farm, payment)))
                .await?;
        Ok(Lookup::Found(prices))
    }

    async fn price_snapshot(&self, farm: &Farm, payment: &MonthlyPayment) -> Result<MonthlyPrice> {
        let price = pricing::price_per_liter(
            farm.distance_to_factory_km,
            payment.month,
            payment.total_volume_liters,
        );
        let display = self.converter.quote(price).await?;

        Ok(MonthlyPrice {
            year: payment.year,
            month: payment.month,
            price_per_liter: display,
            total_payment: round_money(payment.total_payment),
            total_volume_liters: round_money(payment.total_volume_liters),
        })
    }

    /// Computes and stores a new snapshot for the farm's production in the
    /// given month.
    pub async fn create_payment(
        &self,
        farm_id: FarmId,
        year: i32,
        month: u32,
    ) -> Result<MonthlyPayment> {
        let period = Period::new(year, month)?;
        let farm = self
            .farms
            .get(farm_id)
            .await?
            .ok_or(PaymentError::FarmNotFound(farm_id))?;
        let summary =
            self.aggregate(farm_id, period)
                .await?
                .ok_or(PaymentError::NoProductionData {
                    farm_id,
                    year,
                    month,
                })?;

        let terms = pricing::breakdown(
            farm.distance_to_factory_km,
            period.month,
            summary.total_volume_liters,
        );
        let payment = MonthlyPayment::new(
            farm_id,
            period,
            terms.price_per_liter,
            summary.total_volume_liters,
            Utc::now(),
        );
        self.payments.insert(payment.clone()).await?;

        info!(
            %farm_id,
            %period,
            payment_id = %payment.id,
            base_price = %terms.base_price,
            transport_cost = %terms.transport_cost,
            bonus = %terms.bonus,
            price_per_liter = %payment.price_per_liter,
            total_payment = %payment.total_payment,
            "payment snapshot created"
        );
        Ok(payment)
    }

    /// Overwrites snapshot fields verbatim. Nothing is recomputed.
    pub async fn update_payment(
        &self,
        payment_id: PaymentId,
        patch: PaymentPatch,
    ) -> Result<MonthlyPayment> {
        if patch.is_empty() {
            return Err(PaymentError::ValidationError(
                "Payment update has no fields to change".to_string(),
            ));
        }
        let payment = self
            .payments
            .update(payment_id, patch, Utc::now())
            .await?
            .ok_or(PaymentError::PaymentNotFound(payment_id))?;
        info!(%payment_id, "payment snapshot updated");
        Ok(payment)
    }

    pub async fn delete_payment(&self, payment_id: PaymentId) -> Result<()> {
        if !self.payments.delete(payment_id).await? {
            return Err(PaymentError::PaymentNotFound(payment_id));
        }
        info!(%payment_id, "payment snapshot deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{FarmerId, ProductionId};
    use crate::domain::ports::{FarmStore, PaymentStore, ProductionStore};
    use crate::domain::production::DailyProduction;
    use crate::infrastructure::in_memory::{
        InMemoryFarmStore, InMemoryPaymentStore, InMemoryProductionStore,
    };
    use crate::infrastructure::rates::FixedRateSource;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    struct Fixture {
        farms: InMemoryFarmStore,
        productions: InMemoryProductionStore,
        payments: InMemoryPaymentStore,
        service: PaymentService,
    }

    fn fixture() -> Fixture {
        let farms = InMemoryFarmStore::new();
        let productions = InMemoryProductionStore::new();
        let payments = InMemoryPaymentStore::new();
        let service = PaymentService::new(
            Box::new(farms.clone()),
            Box::new(productions.clone()),
            Box::new(payments.clone()),
            Box::new(FixedRateSource::new(dec!(0.2))),
        );
        Fixture {
            farms,
            productions,
            payments,
            service,
        }
    }

    async fn add_farm(fx: &Fixture, distance: Decimal) -> FarmId {
        let farm = Farm::new(FarmId::new(), FarmerId::new(), "Recanto", distance).unwrap();
        let id = farm.id;
        fx.farms.store(farm).await.unwrap();
        id
    }

    async fn add_production(fx: &Fixture, farm_id: FarmId, y: i32, m: u32, d: u32, liters: Decimal) {
        fx.productions
            .store(DailyProduction {
                id: ProductionId::new(),
                farm_id,
                date: Utc.with_ymd_and_hms(y, m, d, 5, 30, 0).unwrap(),
                volume_liters: liters,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_payment_first_semester() {
        let fx = fixture();
        let farm = add_farm(&fx, dec!(30)).await;
        add_production(&fx, farm, 2024, 3, 1, dec!(2000)).await;
        add_production(&fx, farm, 2024, 3, 31, dec!(3000)).await;
        // outside the month
        add_production(&fx, farm, 2024, 4, 1, dec!(999)).await;

        let payment = fx.service.create_payment(farm, 2024, 3).await.unwrap();

        assert_eq!(payment.total_volume_liters, dec!(5000));
        assert_eq!(payment.price_per_liter, dec!(0.30));
        assert_eq!(payment.total_payment, dec!(1500));
        assert_eq!(fx.payments.get(payment.id).await.unwrap(), Some(payment));
    }

    #[tokio::test]
    async fn test_create_payment_second_semester_negative_price() {
        let fx = fixture();
        let farm = add_farm(&fx, dec!(80)).await;
        add_production(&fx, farm, 2024, 9, 10, dec!(15000)).await;

        let payment = fx.service.create_payment(farm, 2024, 9).await.unwrap();
        assert_eq!(payment.price_per_liter, dec!(-2.84));
        assert_eq!(payment.total_payment, dec!(-42600));
    }

    #[tokio::test]
    async fn test_create_payment_without_production_stores_nothing() {
        let fx = fixture();
        let farm = add_farm(&fx, dec!(30)).await;
        add_production(&fx, farm, 2024, 2, 10, dec!(100)).await;

        let result = fx.service.create_payment(farm, 2024, 3).await;

        assert!(matches!(
            result,
            Err(PaymentError::NoProductionData { month: 3, .. })
        ));
        assert!(fx.payments.find_by_year(farm, 2024).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_payment_unknown_farm() {
        let fx = fixture();
        let result = fx.service.create_payment(FarmId::new(), 2024, 3).await;
        assert!(matches!(result, Err(PaymentError::FarmNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_payment_rejects_invalid_month() {
        let fx = fixture();
        let farm = add_farm(&fx, dec!(30)).await;
        let result = fx.service.create_payment(farm, 2024, 13).await;
        assert!(matches!(result, Err(PaymentError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_leap_february_includes_day_29() {
        let fx = fixture();
        let farm = add_farm(&fx, dec!(10)).await;
        add_production(&fx, farm, 2024, 2, 29, dec!(400)).await;
        add_production(&fx, farm, 2024, 2, 1, dec!(100)).await;

        let summary = fx
            .service
            .production_summary(farm, 2024, 2)
            .await
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(summary.total_volume_liters, dec!(500));
        assert_eq!(summary.average_liters, dec!(250));
    }

    #[tokio::test]
    async fn test_production_summary_lookups() {
        let fx = fixture();
        let farm = add_farm(&fx, dec!(10)).await;

        assert_eq!(
            fx.service.production_summary(FarmId::new(), 2024, 1).await.unwrap(),
            Lookup::FarmNotFound
        );
        assert_eq!(
            fx.service.production_summary(farm, 2024, 1).await.unwrap(),
            Lookup::NoProductionData
        );
    }

    #[tokio::test]
    async fn test_price_by_month_lookups() {
        let fx = fixture();
        let farm = add_farm(&fx, dec!(30)).await;

        assert_eq!(
            fx.service
                .price_by_farm_and_month(FarmId::new(), 2024, 3)
                .await
                .unwrap(),
            Lookup::FarmNotFound
        );
        assert_eq!(
            fx.service.price_by_farm_and_month(farm, 2024, 3).await.unwrap(),
            Lookup::NoPaymentData
        );
    }

    #[tokio::test]
    async fn test_price_by_month_is_repeatable() {
        let fx = fixture();
        let farm = add_farm(&fx, dec!(30)).await;
        add_production(&fx, farm, 2024, 3, 5, dec!(5000)).await;
        fx.service.create_payment(farm, 2024, 3).await.unwrap();

        let first = fx.service.price_by_farm_and_month(farm, 2024, 3).await.unwrap();
        let second = fx.service.price_by_farm_and_month(farm, 2024, 3).await.unwrap();
        assert_eq!(first, second);

        let price = first.found().unwrap();
        assert_eq!(price.price_per_liter.primary, "R$ 0,30");
        assert_eq!(price.price_per_liter.secondary, "$0.06");
        assert_eq!(price.total_payment, dec!(1500));
        assert_eq!(price.total_volume_liters, dec!(5000));
    }

    #[tokio::test]
    async fn test_price_by_month_uses_latest_duplicate() {
        let fx = fixture();
        let farm = add_farm(&fx, dec!(30)).await;
        let period = Period::new(2024, 3).unwrap();
        let t0 = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let older = MonthlyPayment::new(farm, period, dec!(0.30), dec!(100), t0);
        let newer = MonthlyPayment::new(
            farm,
            period,
            dec!(0.30),
            dec!(200),
            t0 + chrono::Duration::days(1),
        );
        fx.payments.insert(newer).await.unwrap();
        fx.payments.insert(older).await.unwrap();

        let price = fx
            .service
            .price_by_farm_and_month(farm, 2024, 3)
            .await
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(price.total_volume_liters, dec!(200));
    }

    #[tokio::test]
    async fn test_price_by_year_orders_months() {
        let fx = fixture();
        let farm = add_farm(&fx, dec!(30)).await;
        for month in [11, 2, 7] {
            add_production(&fx, farm, 2024, month, 1, dec!(1000)).await;
            fx.service.create_payment(farm, 2024, month).await.unwrap();
        }

        let prices = fx
            .service
            .price_by_farm_and_year(farm, 2024)
            .await
            .unwrap()
            .found()
            .unwrap();
        let months: Vec<u32> = prices.iter().map(|p| p.month).collect();
        assert_eq!(months, vec![2, 7, 11]);
        // 1.95 - 1.50 in the second semester
        assert_eq!(prices[1].price_per_liter.primary, "R$ 0,45");
    }

    #[tokio::test]
    async fn test_price_by_year_without_snapshots() {
        let fx = fixture();
        let farm = add_farm(&fx, dec!(30)).await;
        assert_eq!(
            fx.service.price_by_farm_and_year(farm, 2024).await.unwrap(),
            Lookup::NoPaymentData
        );
    }

    #[tokio::test]
    async fn test_update_and_delete_payment() {
        let fx = fixture();
        let farm = add_farm(&fx, dec!(30)).await;
        add_production(&fx, farm, 2024, 3, 5, dec!(5000)).await;
        let payment = fx.service.create_payment(farm, 2024, 3).await.unwrap();

        let updated = fx
            .service
            .update_payment(
                payment.id,
                PaymentPatch {
                    total_payment: Some(dec!(1234.56)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.total_payment, dec!(1234.56));
        assert_eq!(updated.price_per_liter, payment.price_per_liter);
        assert!(updated.updated_at >= payment.updated_at);

        assert!(matches!(
            fx.service
                .update_payment(payment.id, PaymentPatch::default())
                .await,
            Err(PaymentError::ValidationError(_))
        ));

        fx.service.delete_payment(payment.id).await.unwrap();
        assert!(matches!(
            fx.service.delete_payment(payment.id).await,
            Err(PaymentError::PaymentNotFound(_))
        ));
        assert!(matches!(
            fx.service
                .update_payment(
                    payment.id,
                    PaymentPatch {
                        total_payment: Some(dec!(1)),
                        ..Default::default()
                    }
                )
                .await,
            Err(PaymentError::PaymentNotFound(_))
        ));
    }

    #[test]
    fn test_lookup_serialization() {
        let not_found: Lookup<MonthlyPrice> = Lookup::FarmNotFound;
        assert_eq!(
            serde_json::to_value(&not_found).unwrap(),
            serde_json::json!({ "message": "Farm not found" })
        );
        assert_eq!(
            serde_json::to_value(Lookup::<MonthlyPrice>::NoPaymentData).unwrap(),
            serde_json::json!({ "message": "No payment data for this period" })
        );
        assert_eq!(
            serde_json::to_value(Lookup::<ProductionSummary>::NoProductionData).unwrap(),
            serde_json::json!({ "message": "No milk production data for this period" })
        );

        let found = Lookup::Found(MonthlyPrice {
            year: 2024,
            month: 3,
            price_per_liter: PriceDisplay {
                primary: "R$ 0,30".to_string(),
                secondary: "$0.06".to_string(),
            },
            total_payment: dec!(1500),
            total_volume_liters: dec!(5000),
        });
        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(json["price_per_liter"]["primary"], "R$ 0,30");
        assert_eq!(json["total_payment"], serde_json::json!(1500.0));
    }
}
