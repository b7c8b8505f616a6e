use thiserror::Error;
use uuid::Uuid;

use flowplan_domain::{KeyKind, ParseKeyError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid recurrence: {0}")]
    InvalidRecurrence(String),
    #[error("Invalid cadence: {0}")]
    InvalidCadence(String),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),
    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),
    #[error("Plan not found: {0}")]
    PlanNotFound(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ParseKeyError> for CoreError {
    fn from(err: ParseKeyError) -> Self {
        match err.kind {
            KeyKind::Recurrence => CoreError::InvalidRecurrence(err.value),
            KeyKind::Cadence => CoreError::InvalidCadence(err.value),
            KeyKind::Category => CoreError::InvalidCategory(err.value),
            KeyKind::PaymentMethod => CoreError::InvalidPaymentMethod(err.value),
        }
    }
}
