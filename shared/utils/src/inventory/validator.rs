//! Inventory Validator & Usage Calculator
//!
//! Checks SDS and CAS uniqueness and percent completeness for a submission,
//! then computes per-CAS usage in pounds. Every problem found is returned as
//! a `Finding`; nothing here fails.

use chrono::{DateTime, Utc};
use inventory_models::{
    CasUsage, DisplayRecord, EntrySource, Finding, MaterialReport, ReportType,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

use super::builder::{describe_rejection, ParsedInventory, ParsedMaterial, RejectedEntry};
use crate::validation::validate_cas_number;

/// Treatment of repeated SDS numbers and repeated CAS numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Interactive entries keep duplicates, CSV rows drop them
    #[default]
    SourceParity,
    /// Duplicates are reported and still processed
    Retain,
    /// Duplicates are reported and left out of totals and usage
    Drop,
}

impl DuplicatePolicy {
    pub fn retains_duplicates(self, source: EntrySource) -> bool {
        match self {
            Self::SourceParity => source == EntrySource::Interactive,
            Self::Retain => true,
            Self::Drop => false,
        }
    }
}

/// How the retained percent total is compared with 100.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PercentCheck {
    /// `total == 100.0`; float accumulation error counts as a mismatch
    #[default]
    Strict,
    /// `|total - 100| <= tolerance`
    Tolerance(f64),
}

impl PercentCheck {
    pub fn is_complete(&self, total_percent: f64) -> bool {
        match self {
            Self::Strict => total_percent == 100.0,
            Self::Tolerance(tolerance) => (total_percent - 100.0).abs() <= *tolerance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ValidationPolicy {
    pub duplicates: DuplicatePolicy,
    pub percent_check: PercentCheck,
    pub check_cas_format: bool,
}

/// Summary statistics for a validated submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ValidationSummary {
    pub total_entries: usize,
    pub processed: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub duplicate_sds_numbers: usize,
    pub duplicate_cas_numbers: usize,
    pub percent_mismatches: usize,
    pub invalid_cas_numbers: usize,
}

impl ValidationSummary {
    pub fn is_clean(&self) -> bool {
        self.rejected == 0
            && self.skipped == 0
            && self.duplicate_sds_numbers == 0
            && self.duplicate_cas_numbers == 0
            && self.percent_mismatches == 0
            && self.invalid_cas_numbers == 0
    }
}

/// Result of one submission: per-material reports plus rejected entries
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    pub id: Uuid,
    pub report_type: ReportType,
    pub source: EntrySource,
    pub generated_at: DateTime<Utc>,
    pub materials: Vec<MaterialReport>,
    pub rejected: Vec<RejectedEntry>,
    pub warnings: Vec<String>,
    pub summary: ValidationSummary,
}

impl SubmissionReport {
    pub fn display(&self) -> Vec<DisplayRecord> {
        self.materials.iter().map(MaterialReport::display).collect()
    }

    pub fn rejection_messages(&self) -> Vec<String> {
        self.rejected.iter().map(describe_rejection).collect()
    }

    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.materials.iter().flat_map(|m| m.findings.iter())
    }
}

/// Usage in pounds of one CAS substance: `quantity * percent / 100`
pub fn compute_usage(order_quantity: f64, percent: f64) -> f64 {
    (order_quantity * percent) / 100.0
}

#[derive(Debug, Clone, Default)]
pub struct InventoryValidator {
    policy: ValidationPolicy,
}

impl InventoryValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Validate every material of one submission in encounter order
    pub fn validate(&self, source: EntrySource, materials: &[ParsedMaterial]) -> Vec<MaterialReport> {
        let retain = self.policy.duplicates.retains_duplicates(source);
        let mut seen_sds: HashSet<&str> = HashSet::new();

        materials
            .iter()
            .map(|parsed| {
                let material = &parsed.material;
                let duplicate_sds = !seen_sds.insert(material.sds_number.as_str());

                let mut findings = Vec::new();
                if duplicate_sds {
                    findings.push(Finding::DuplicateSdsNumber {
                        sds_number: material.sds_number.clone(),
                    });
                    if !retain {
                        debug!(sds_number = %material.sds_number, "Skipping duplicate SDS occurrence");
                        return MaterialReport {
                            row_number: parsed.row_number,
                            sds_number: material.sds_number.clone(),
                            name: material.name.clone(),
                            order_quantity: material.order_quantity,
                            total_percent: 0.0,
                            skipped: true,
                            findings,
                            usages: Vec::new(),
                        };
                    }
                }

                self.check_composition(parsed, retain, findings)
            })
            .collect()
    }

    fn check_composition(
        &self,
        parsed: &ParsedMaterial,
        retain: bool,
        mut findings: Vec<Finding>,
    ) -> MaterialReport {
        let material = &parsed.material;
        let mut seen_cas: HashSet<&str> = HashSet::new();
        let mut total_percent = 0.0;
        let mut usages = Vec::with_capacity(material.composition.len());

        for entry in &material.composition {
            let first_occurrence = seen_cas.insert(entry.cas_number.as_str());
            if !first_occurrence {
                findings.push(Finding::DuplicateCasNumber {
                    sds_number: material.sds_number.clone(),
                    material_name: material.name.clone(),
                    cas_number: entry.cas_number.clone(),
                });
                if !retain {
                    continue;
                }
            } else if self.policy.check_cas_format && validate_cas_number(&entry.cas_number).is_err() {
                findings.push(Finding::InvalidCasFormat {
                    sds_number: material.sds_number.clone(),
                    cas_number: entry.cas_number.clone(),
                });
            }

            total_percent += entry.percent;
            usages.push(CasUsage {
                cas_number: entry.cas_number.clone(),
                percent: entry.percent,
                usage_lbs: compute_usage(material.order_quantity, entry.percent),
            });
        }

        if !self.policy.percent_check.is_complete(total_percent) {
            findings.push(Finding::PercentSumMismatch {
                sds_number: material.sds_number.clone(),
                material_name: material.name.clone(),
                total_percent,
            });
        }

        for finding in &findings {
            debug!(code = finding.code(), sds_number = %material.sds_number, "{}", finding);
        }

        MaterialReport {
            row_number: parsed.row_number,
            sds_number: material.sds_number.clone(),
            name: material.name.clone(),
            order_quantity: material.order_quantity,
            total_percent,
            skipped: false,
            findings,
            usages,
        }
    }

    /// Validate a built submission and assemble the full report
    pub fn validate_submission(&self, report_type: ReportType, parsed: ParsedInventory) -> SubmissionReport {
        let materials = self.validate(parsed.source, &parsed.materials);
        let summary = summarize(parsed.total_entries, &materials, parsed.rejected.len());

        info!(
            submission_id = %parsed.id,
            source = ?parsed.source,
            report_type = report_type.label(),
            total = summary.total_entries,
            processed = summary.processed,
            skipped = summary.skipped,
            rejected = summary.rejected,
            "Inventory submission validated"
        );

        SubmissionReport {
            id: parsed.id,
            report_type,
            source: parsed.source,
            generated_at: Utc::now(),
            materials,
            rejected: parsed.rejected,
            warnings: parsed.warnings,
            summary,
        }
    }
}

fn summarize(total_entries: usize, materials: &[MaterialReport], rejected: usize) -> ValidationSummary {
    let mut summary = ValidationSummary {
        total_entries,
        rejected,
        ..Default::default()
    };

    for report in materials {
        if report.skipped {
            summary.skipped += 1;
        } else {
            summary.processed += 1;
        }
        for finding in &report.findings {
            match finding {
                Finding::DuplicateSdsNumber { .. } => summary.duplicate_sds_numbers += 1,
                Finding::DuplicateCasNumber { .. } => summary.duplicate_cas_numbers += 1,
                Finding::PercentSumMismatch { .. } => summary.percent_mismatches += 1,
                Finding::InvalidCasFormat { .. } => summary.invalid_cas_numbers += 1,
            }
        }
    }

    summary
}
