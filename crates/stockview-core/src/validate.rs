//! Strict validation of full-dataset write payloads.
//!
//! A payload is accepted only when every element matches the wire shape
//! exactly: unknown fields and missing fields are both rejected. The first
//! failing record is reported and nothing is accepted.

use serde_json::Value;

use crate::error::ValidationError;
use crate::models::records::{DatasetRecord, SalesRecord, StockRecord};

/// Validate a decoded JSON payload as a full dataset of `T`.
pub fn validate_dataset<T: DatasetRecord>(payload: &Value) -> Result<Vec<T>, ValidationError> {
    let items = payload.as_array().ok_or(ValidationError::NotAnArray {
        dataset: T::DATASET,
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            <T as serde::Deserialize>::deserialize(item).map_err(|e| ValidationError::Record {
                dataset: T::DATASET,
                index,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Validate a stock dataset payload.
pub fn validate_stock(payload: &Value) -> Result<Vec<StockRecord>, ValidationError> {
    validate_dataset(payload)
}

/// Validate a sales dataset payload.
pub fn validate_sales(payload: &Value) -> Result<Vec<SalesRecord>, ValidationError> {
    validate_dataset(payload)
}
