//! Usage results and display records returned to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::finding::Finding;

/// Estimated mass of one CAS substance consumed, in pounds (full precision).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CasUsage {
    pub cas_number: String,
    pub percent: f64,
    pub usage_lbs: f64,
}

/// Validation and usage outcome for one material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialReport {
    /// CSV line number (header is line 1); `None` for interactive entries
    pub row_number: Option<usize>,
    pub sds_number: String,
    pub name: String,
    pub order_quantity: f64,
    pub total_percent: f64,
    /// Set when the material was dropped as a duplicate SDS occurrence
    pub skipped: bool,
    pub findings: Vec<Finding>,
    pub usages: Vec<CasUsage>,
}

/// One usage line formatted for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayUsage {
    pub cas_number: String,
    pub usage_lbs: String,
}

/// The record the presentation layer renders per material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayRecord {
    pub material_name: String,
    pub sds_number: String,
    pub findings: Vec<String>,
    /// One suggestion per distinct finding kind, in first-seen order
    pub suggestions: Vec<String>,
    pub usages: Vec<DisplayUsage>,
}

/// Format a usage value the way results are shown: two decimals, pounds implied.
pub fn format_usage(usage_lbs: f64) -> String {
    format!("{:.2}", usage_lbs)
}

impl MaterialReport {
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    pub fn usage_for(&self, cas_number: &str) -> Option<f64> {
        self.usages
            .iter()
            .find(|u| u.cas_number == cas_number)
            .map(|u| u.usage_lbs)
    }

    /// Render to the display record; rounding happens here and only here.
    pub fn display(&self) -> DisplayRecord {
        let mut suggestions: Vec<String> = Vec::new();
        for finding in &self.findings {
            let suggestion = finding.suggestion();
            if !suggestions.iter().any(|s| s == suggestion) {
                suggestions.push(suggestion.to_string());
            }
        }

        DisplayRecord {
            material_name: self.name.clone(),
            sds_number: self.sds_number.clone(),
            findings: self.findings.iter().map(|f| f.to_string()).collect(),
            suggestions,
            usages: self
                .usages
                .iter()
                .map(|u| DisplayUsage {
                    cas_number: u.cas_number.clone(),
                    usage_lbs: format_usage(u.usage_lbs),
                })
                .collect(),
        }
    }
}

impl DisplayRecord {
    /// Plain-text result lines, e.g. `CAS 67-64-1: Estimated Usage = 120.00 lbs`
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Results for {} (SDS # {})",
            self.material_name, self.sds_number
        )];
        lines.extend(self.findings.iter().cloned());
        lines.extend(self.usages.iter().map(|u| {
            format!("CAS {}: Estimated Usage = {} lbs", u.cas_number, u.usage_lbs)
        }));
        lines
    }
}
