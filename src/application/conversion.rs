use crate::domain::money::Currency;
use crate::domain::ports::RateSourceBox;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

/// A price shown in the payment currency and in the display currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceDisplay {
    /// e.g. `R$ 0,30`
    pub primary: String,
    /// e.g. `$0.06`
    pub secondary: String,
}

/// Converts prices between currencies using an external rate source.
///
/// Failures of the rate source are returned as-is; there is no fallback rate
/// and no silent pass-through of the unconverted amount.
pub struct CurrencyConverter {
    source: RateSourceBox,
    primary: Currency,
    secondary: Currency,
}

impl CurrencyConverter {
    /// Converter from BRL (payment currency) to USD (display currency).
    pub fn new(source: RateSourceBox) -> Self {
        Self {
            source,
            primary: Currency::Brl,
            secondary: Currency::Usd,
        }
    }

    pub async fn convert(&self, amount: Decimal, from: Currency, to: Currency) -> Result<Decimal> {
        let rate = self.source.rate(from, to).await.inspect_err(|e| {
            warn!(%from, %to, error = %e, "currency conversion failed");
        })?;
        debug!(%from, %to, %rate, %amount, "converted amount");
        Ok(amount * rate)
    }

    /// Formats `price` in the primary currency and its converted value in the
    /// secondary currency.
    pub async fn quote(&self, price: Decimal) -> Result<PriceDisplay> {
        let converted = self.convert(price, self.primary, self.secondary).await?;
        Ok(PriceDisplay {
            primary: self.primary.format(price),
            secondary: self.secondary.format(converted),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentError;
    use crate::infrastructure::rates::FixedRateSource;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_convert_multiplies_by_rate() {
        let converter = CurrencyConverter::new(Box::new(FixedRateSource::new(dec!(0.2))));
        let usd = converter
            .convert(dec!(1500), Currency::Brl, Currency::Usd)
            .await
            .unwrap();
        assert_eq!(usd, dec!(300));
    }

    #[tokio::test]
    async fn test_quote_formats_both_currencies() {
        let converter = CurrencyConverter::new(Box::new(FixedRateSource::new(dec!(0.2))));
        let display = converter.quote(dec!(-3.24)).await.unwrap();
        assert_eq!(display.primary, "-R$ 3,24");
        // -3.24 * 0.2 = -0.648
        assert_eq!(display.secondary, "-$0.65");
    }

    #[tokio::test]
    async fn test_quote_propagates_rate_failure() {
        let converter = CurrencyConverter::new(Box::new(FixedRateSource::new(dec!(-1))));
        let result = converter.quote(dec!(0.30)).await;
        assert!(matches!(result, Err(PaymentError::ConversionFailure(_))));
    }
}
