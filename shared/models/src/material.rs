//! Material domain models for the chemical inventory reporting system.
//!
//! This module defines the records assembled for one submission: a material
//! identified by its SDS number, its order quantity, and its CAS composition.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single substance within a material's composition.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct CasEntry {
    pub cas_number: String,
    #[validate(range(min = 0.0, max = 100.0, message = "CAS percent must be between 0 and 100"))]
    pub percent: f64,
}

/// A material (product) ordered in pounds, with its CAS composition in entry order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct Material {
    pub sds_number: String,
    pub name: String,
    #[validate(range(min = 0.0, message = "Order quantity must not be negative"))]
    pub order_quantity: f64,
    #[validate]
    pub composition: Vec<CasEntry>,
}

/// Reporting program the submission is labelled for.
///
/// Carried through to the report only; no computation depends on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ReportType {
    #[default]
    #[serde(rename = "Tier II", alias = "tier_ii")]
    TierII,
    #[serde(rename = "SARA 313", alias = "sara_313")]
    Sara313,
    #[serde(rename = "VOC/HAP", alias = "voc_hap")]
    VocHap,
}

impl ReportType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TierII => "Tier II",
            Self::Sara313 => "SARA 313",
            Self::VocHap => "VOC/HAP",
        }
    }

    /// Parse a selector label, accepting the display labels and snake_case names
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "tier ii" | "tier_ii" | "tier2" => Some(Self::TierII),
            "sara 313" | "sara_313" | "sara313" => Some(Self::Sara313),
            "voc/hap" | "voc_hap" | "vochap" => Some(Self::VocHap),
            _ => None,
        }
    }
}

/// Where a batch of materials came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    Interactive,
    Csv,
}

impl Material {
    pub fn new(sds_number: impl Into<String>, name: impl Into<String>, order_quantity: f64) -> Self {
        Self {
            sds_number: sds_number.into(),
            name: name.into(),
            order_quantity,
            composition: Vec::new(),
        }
    }

    /// Builder-style helper appending a CAS entry in entry order
    pub fn with_cas(mut self, cas_number: impl Into<String>, percent: f64) -> Self {
        self.add_cas_entry(cas_number, percent);
        self
    }

    pub fn add_cas_entry(&mut self, cas_number: impl Into<String>, percent: f64) {
        self.composition.push(CasEntry {
            cas_number: cas_number.into(),
            percent,
        });
    }

    pub fn cas_count(&self) -> usize {
        self.composition.len()
    }
}
