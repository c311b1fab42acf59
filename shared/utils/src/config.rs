use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

use crate::inventory::{DuplicatePolicy, PercentCheck, ValidationPolicy};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub validation: ValidationConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// How repeated SDS/CAS numbers are treated; `source_parity` keeps the
    /// interactive/CSV split
    pub duplicate_policy: DuplicatePolicy,
    /// `None` compares the percent total to 100 with strict float equality
    pub percent_tolerance: Option<f64>,
    pub check_cas_format: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_size: u64,
    pub allowed_types: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Start with default values
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific config
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with INVENTORY prefix
            .add_source(
                Environment::with_prefix("INVENTORY")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("upload.allowed_types"),
            );

        config.build()?.try_deserialize()
    }
}

impl ValidationConfig {
    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            duplicates: self.duplicate_policy,
            percent_check: match self.percent_tolerance {
                Some(tolerance) => PercentCheck::Tolerance(tolerance.abs()),
                None => PercentCheck::Strict,
            },
            check_cas_format: self.check_cas_format,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::SourceParity,
            percent_tolerance: None,
            check_cas_format: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                max_request_size: 16 * 1024 * 1024, // 16MB
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                file_path: None,
            },
            validation: ValidationConfig::default(),
            upload: UploadConfig {
                max_file_size: 10 * 1024 * 1024,
                allowed_types: vec!["csv".to_string()],
            },
        }
    }
}
