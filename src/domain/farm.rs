use super::ids::{FarmId, FarmerId};
use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A production site and its distance to the processing factory.
///
/// Farmer management lives outside this crate; farms only carry the owner
/// reference.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Farm {
    #[serde(rename = "_id", alias = "id")]
    pub id: FarmId,
    pub farmer_id: FarmerId,
    #[serde(default)]
    pub name: String,
    pub distance_to_factory_km: Decimal,
}

impl Farm {
    pub fn new(
        id: FarmId,
        farmer_id: FarmerId,
        name: impl Into<String>,
        distance_to_factory_km: Decimal,
    ) -> Result<Self, PaymentError> {
        let farm = Self {
            id,
            farmer_id,
            name: name.into(),
            distance_to_factory_km,
        };
        farm.validate()?;
        Ok(farm)
    }

    /// Rejects farms the price calculator cannot be fed with.
    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.distance_to_factory_km < Decimal::ZERO {
            return Err(PaymentError::ValidationError(format!(
                "Farm {} has a negative distance to factory",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_farm_accepts_zero_distance() {
        let farm = Farm::new(FarmId::new(), FarmerId::new(), "Sitio", dec!(0));
        assert!(farm.is_ok());
    }

    #[test]
    fn test_farm_rejects_negative_distance() {
        let farm = Farm::new(FarmId::new(), FarmerId::new(), "Sitio", dec!(-1.5));
        assert!(matches!(farm, Err(PaymentError::ValidationError(_))));
    }
}
