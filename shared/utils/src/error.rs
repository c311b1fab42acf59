use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum InventoryError {
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Invalid input{}: {field} = '{value}' - {message}", row_suffix(.row))]
    InvalidInput {
        row: Option<usize>,
        field: String,
        value: String,
        message: String,
    },

    #[error("CSV schema error: {message}")]
    CsvSchema { message: String },

    #[error("CSV read error: {message}")]
    Csv { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl InventoryError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_input(
        row: Option<usize>,
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            row,
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    pub fn csv_schema(message: impl Into<String>) -> Self {
        Self::CsvSchema {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::CsvSchema { .. } => "CSV_SCHEMA_ERROR",
            Self::Csv { .. } => "CSV_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::InvalidInput { .. } => 422,
            Self::CsvSchema { .. } => 400,
            Self::Csv { .. } => 400,
            Self::Configuration { .. } => 500,
            Self::Internal { .. } => 500,
        }
    }
}

fn row_suffix(row: &Option<usize>) -> String {
    row.map(|r| format!(" at row {}", r)).unwrap_or_default()
}

pub type InventoryResult<T> = Result<T, InventoryError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<InventoryError> for ErrorResponse {
    fn from(error: InventoryError) -> Self {
        let details = match &error {
            InventoryError::InvalidInput { row, field, value, .. } => Some(serde_json::json!({
                "row": row,
                "field": field,
                "value": value,
            })),
            _ => None,
        };

        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message: error.to_string(),
            details,
        }
    }
}

// Conversion from common error types
impl From<csv::Error> for InventoryError {
    fn from(error: csv::Error) -> Self {
        Self::Csv {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for InventoryError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

impl From<config::ConfigError> for InventoryError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}
