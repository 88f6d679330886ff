use crate::domain::ids::{FarmId, PaymentId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Farm not found: {0}")]
    FarmNotFound(FarmId),
    #[error("No milk production data for farm {farm_id} in {year}-{month:02}")]
    NoProductionData {
        farm_id: FarmId,
        year: i32,
        month: u32,
    },
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),
    #[error("Currency conversion failed: {0}")]
    ConversionFailure(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for PaymentError {
    fn from(err: rocksdb::Error) -> Self {
        PaymentError::InternalError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;
