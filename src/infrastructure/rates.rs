use crate::domain::money::Currency;
use crate::domain::ports::RateSource;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_RATE_URL: &str = "https://economia.awesomeapi.com.br/json/last";

/// A rate source that always answers with the same configured rate.
#[derive(Debug, Clone, Copy)]
pub struct FixedRateSource {
    rate: Decimal,
}

impl FixedRateSource {
    pub fn new(rate: Decimal) -> Self {
        Self { rate }
    }
}

#[async_trait]
impl RateSource for FixedRateSource {
    async fn rate(&self, from: Currency, to: Currency) -> Result<Decimal> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        validate_rate(self.rate, from, to)
    }
}

#[derive(Debug, Deserialize)]
struct Quote {
    bid: String,
}

/// Fetches the latest quote from an AwesomeAPI-compatible endpoint:
/// `GET {base_url}/BRL-USD` answering `{"BRLUSD": {"bid": "0.1834", ...}}`.
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRateSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, from: Currency, to: Currency) -> String {
        format!("{}/{}-{}", self.base_url, from.code(), to.code())
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn rate(&self, from: Currency, to: Currency) -> Result<Decimal> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        let url = self.url(from, to);
        debug!(%url, "fetching exchange rate");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PaymentError::ConversionFailure(format!("rate request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(PaymentError::ConversionFailure(format!(
                "rate service answered {}",
                response.status()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::ConversionFailure(format!("rate body unreadable: {e}")))?;

        parse_quote(&body, from, to)
    }
}

/// Extracts the bid for `from`/`to` out of an AwesomeAPI response body.
pub fn parse_quote(body: &str, from: Currency, to: Currency) -> Result<Decimal> {
    let quotes: HashMap<String, Quote> = serde_json::from_str(body)
        .map_err(|e| PaymentError::ConversionFailure(format!("malformed rate payload: {e}")))?;
    let pair = format!("{}{}", from.code(), to.code());
    let quote = quotes.get(&pair).ok_or_else(|| {
        PaymentError::ConversionFailure(format!("rate payload has no {pair} quote"))
    })?;
    let rate = Decimal::from_str(quote.bid.trim()).map_err(|e| {
        PaymentError::ConversionFailure(format!("invalid {pair} bid '{}': {e}", quote.bid))
    })?;
    validate_rate(rate, from, to)
}

fn validate_rate(rate: Decimal, from: Currency, to: Currency) -> Result<Decimal> {
    if rate > Decimal::ZERO {
        Ok(rate)
    } else {
        Err(PaymentError::ConversionFailure(format!(
            "invalid {from}->{to} rate: {rate}"
        )))
    }
}
