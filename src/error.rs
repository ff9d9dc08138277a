// Error types shared by the supplier adapters and the configuration layer

use crate::supplier::Supplier;
use thiserror::Error;

// Failures while fetching one supplier's raw records.
// Any of these aborts the whole aggregation.
#[derive(Error, Debug)]
pub enum SupplierError {
    #[error("Network error from {supplier}: {message}")]
    NetworkError { supplier: Supplier, message: String },

    #[error("Request to {supplier} timed out after {timeout_ms}ms")]
    Timeout { supplier: Supplier, timeout_ms: u64 },

    #[error("API error from {supplier}: {status_code} - {message}")]
    ApiResponseError {
        supplier: Supplier,
        status_code: u16,
        message: String,
        is_retryable: bool,
    },

    #[error("JSON parse error for {supplier}: {message}")]
    JsonParseError { supplier: Supplier, message: String },

    #[error("Unexpected payload from {supplier}: {message}")]
    InvalidFormat { supplier: Supplier, message: String },

    #[error("I/O error for {supplier}: {source}")]
    IoError {
        supplier: Supplier,
        #[source]
        source: std::io::Error,
    },
}

impl SupplierError {
    pub fn supplier(&self) -> Supplier {
        match self {
            SupplierError::NetworkError { supplier, .. }
            | SupplierError::Timeout { supplier, .. }
            | SupplierError::ApiResponseError { supplier, .. }
            | SupplierError::JsonParseError { supplier, .. }
            | SupplierError::InvalidFormat { supplier, .. }
            | SupplierError::IoError { supplier, .. } => *supplier,
        }
    }

    // Whether a fresh attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            SupplierError::NetworkError { .. } | SupplierError::Timeout { .. } => true,
            SupplierError::ApiResponseError { is_retryable, .. } => *is_retryable,
            _ => false,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let timeout = SupplierError::Timeout {
            supplier: Supplier::Acme,
            timeout_ms: 100,
        };
        assert!(timeout.is_retryable());
        assert_eq!(timeout.supplier(), Supplier::Acme);

        let not_found = SupplierError::ApiResponseError {
            supplier: Supplier::Paperflies,
            status_code: 404,
            message: "Not Found".to_string(),
            is_retryable: false,
        };
        assert!(!not_found.is_retryable());
        assert_eq!(
            not_found.to_string(),
            "API error from paperflies: 404 - Not Found"
        );

        let bad_json = SupplierError::JsonParseError {
            supplier: Supplier::Patagonia,
            message: "expected value".to_string(),
        };
        assert!(!bad_json.is_retryable());
    }
}
