//! Inventory Service
//!
//! Runs the record builder and validator for one submission and records
//! metrics for the result.

use inventory_models::ReportType;
use inventory_utils::inventory::{
    InventoryValidator, MaterialEntry, RecordBuilder, SubmissionReport,
};
use inventory_utils::{
    validate_file_size, validate_file_type, AppConfig, InventoryError, InventoryResult,
    UploadConfig,
};
use tracing::info;

use crate::metrics::Metrics;

pub struct InventoryService {
    builder: RecordBuilder,
    validator: InventoryValidator,
    upload: UploadConfig,
    metrics: Metrics,
}

impl InventoryService {
    pub fn new(config: &AppConfig, metrics: Metrics) -> Self {
        Self {
            builder: RecordBuilder::new(),
            validator: InventoryValidator::new(config.validation.policy()),
            upload: config.upload.clone(),
            metrics,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Validate interactively entered materials
    pub fn submit_entries(
        &self,
        report_type: ReportType,
        entries: &[MaterialEntry],
    ) -> InventoryResult<SubmissionReport> {
        if entries.is_empty() {
            return Err(InventoryError::validation(
                "materials",
                "At least one material is required",
            ));
        }

        let parsed = self.builder.build_entries(entries);
        Ok(self.finish(report_type, parsed))
    }

    /// Validate an uploaded CSV file
    pub fn process_upload(
        &self,
        report_type: ReportType,
        filename: &str,
        data: &[u8],
    ) -> InventoryResult<SubmissionReport> {
        validate_file_type(filename, &self.upload.allowed_types)?;
        validate_file_size(data.len() as u64, self.upload.max_file_size)?;

        info!(filename, bytes = data.len(), "Processing inventory upload");
        let parsed = self.builder.parse_csv(data)?;
        Ok(self.finish(report_type, parsed))
    }

    fn finish(
        &self,
        report_type: ReportType,
        parsed: inventory_utils::inventory::ParsedInventory,
    ) -> SubmissionReport {
        let report = self.validator.validate_submission(report_type, parsed);
        self.metrics.record(&report);
        report
    }
}
