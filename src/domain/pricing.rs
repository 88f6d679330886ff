//! Price-per-liter rules for the two semester regimes.
//!
//! | Criterion                      | Jan-Jun | Jul-Dec |
//! |--------------------------------|---------|---------|
//! | Base price per liter           | 1.80    | 1.95    |
//! | Transport per km, <= 50 km     | 0.05    | 0.05    |
//! | Transport per km, > 50 km      | 0.06    | 0.06    |
//! | Bonus, volume > 10,000 L       | none    | +0.01   |
//!
//! The result is not floored: a distant farm can end up with a zero or
//! negative price per liter.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

pub const FIRST_SEMESTER_BASE_PRICE: Decimal = dec!(1.80);
pub const SECOND_SEMESTER_BASE_PRICE: Decimal = dec!(1.95);
pub const NEAR_COST_PER_KM: Decimal = dec!(0.05);
pub const FAR_COST_PER_KM: Decimal = dec!(0.06);
pub const NEAR_DISTANCE_LIMIT_KM: Decimal = dec!(50);
pub const VOLUME_BONUS_THRESHOLD_LITERS: Decimal = dec!(10000);
pub const VOLUME_BONUS_PER_LITER: Decimal = dec!(0.01);

/// The individual terms that make up a price per liter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub base_price: Decimal,
    pub cost_per_km: Decimal,
    pub transport_cost: Decimal,
    pub bonus: Decimal,
    pub price_per_liter: Decimal,
}

/// January to June are priced with the first-semester base and no volume
/// bonus.
pub fn is_first_semester(month: u32) -> bool {
    (1..=6).contains(&month)
}

/// Computes every pricing term for a farm at `distance_km` delivering
/// `volume_liters` in `month` (1-12).
///
/// Inputs are expected to be sanitized upstream: non-negative distance and a
/// month within range.
pub fn breakdown(distance_km: Decimal, month: u32, volume_liters: Decimal) -> PriceBreakdown {
    let first_semester = is_first_semester(month);

    let base_price = if first_semester {
        FIRST_SEMESTER_BASE_PRICE
    } else {
        SECOND_SEMESTER_BASE_PRICE
    };

    // Flat per-liter bonus, independent of how far above the threshold the
    // volume is.
    let bonus = if !first_semester && volume_liters > VOLUME_BONUS_THRESHOLD_LITERS {
        VOLUME_BONUS_PER_LITER
    } else {
        Decimal::ZERO
    };

    let cost_per_km = if distance_km <= NEAR_DISTANCE_LIMIT_KM {
        NEAR_COST_PER_KM
    } else {
        FAR_COST_PER_KM
    };
    let transport_cost = cost_per_km * distance_km;

    PriceBreakdown {
        base_price,
        cost_per_km,
        transport_cost,
        bonus,
        price_per_liter: base_price - transport_cost + bonus,
    }
}

/// Price per liter paid to a farm for one month of deliveries.
pub fn price_per_liter(distance_km: Decimal, month: u32, volume_liters: Decimal) -> Decimal {
    breakdown(distance_km, month, volume_liters).price_per_liter
}
