//! Validation findings attached to material reports.
//!
//! Findings are warnings: they describe a broken invariant but never stop
//! usage computation.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// A later material reuses an SDS number seen earlier in the submission
    DuplicateSdsNumber { sds_number: String },
    /// A CAS number appears more than once in one material's composition
    DuplicateCasNumber {
        sds_number: String,
        material_name: String,
        cas_number: String,
    },
    /// Retained CAS percents do not total 100
    PercentSumMismatch {
        sds_number: String,
        material_name: String,
        total_percent: f64,
    },
    /// CAS number fails the registry format or check digit
    InvalidCasFormat {
        sds_number: String,
        cas_number: String,
    },
}

impl Finding {
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateSdsNumber { .. } => "DUPLICATE_SDS_NUMBER",
            Self::DuplicateCasNumber { .. } => "DUPLICATE_CAS_NUMBER",
            Self::PercentSumMismatch { .. } => "PERCENT_SUM_MISMATCH",
            Self::InvalidCasFormat { .. } => "INVALID_CAS_FORMAT",
        }
    }

    /// What the user should change to clear the finding
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DuplicateSdsNumber { .. } => "Give each material its own SDS #",
            Self::DuplicateCasNumber { .. } => "Enter each CAS # only once per material",
            Self::PercentSumMismatch { .. } => "Adjust CAS percentages so they total 100%",
            Self::InvalidCasFormat { .. } => "CAS format should be XXXXXXX-XX-X",
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            Self::DuplicateSdsNumber { .. } | Self::DuplicateCasNumber { .. }
        )
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSdsNumber { sds_number } => write!(
                f,
                "SDS # {sds_number} is already used. Each material must have a unique SDS #."
            ),
            Self::DuplicateCasNumber {
                sds_number,
                material_name,
                cas_number,
            } => write!(
                f,
                "Duplicate CAS # {cas_number} is not allowed for {material_name} (SDS {sds_number}). Please enter a unique CAS #."
            ),
            Self::PercentSumMismatch {
                sds_number,
                material_name,
                total_percent,
            } => write!(
                f,
                "Total CAS % for {material_name} (SDS {sds_number}) must sum to 100%. Currently: {total_percent}%"
            ),
            Self::InvalidCasFormat {
                sds_number,
                cas_number,
            } => write!(f, "Invalid CAS number format: {cas_number} (SDS {sds_number})"),
        }
    }
}
