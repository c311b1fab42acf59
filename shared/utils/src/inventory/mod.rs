//! Inventory Processing Module
//!
//! Builds material records from interactive entries or CSV uploads, then
//! validates SDS/CAS uniqueness and percent completeness and computes CAS
//! usage in pounds.

pub mod builder;
pub mod validator;

pub use builder::{
    is_missing, CasEntryInput, CsvSchema, MaterialEntry, ParsedInventory, ParsedMaterial,
    RecordBuilder, RejectedEntry,
};
pub use validator::{
    compute_usage, DuplicatePolicy, InventoryValidator, PercentCheck, SubmissionReport,
    ValidationPolicy, ValidationSummary,
};
