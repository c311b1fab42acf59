//! # Chemical Inventory Domain Models
//!
//! Core domain models for the chemical inventory reporting system. All models
//! implement serialization with serde; input-bearing models carry range rules
//! for the validator crate.
//!
//! ## Key Models
//!
//! - **Material**: an SDS-identified product with order quantity (lbs) and CAS composition
//! - **CasEntry**: one CAS number and its percentage within a material
//! - **Finding**: a non-fatal validation warning (duplicate SDS/CAS, percent mismatch)
//! - **MaterialReport**: per-material findings and full-precision CAS usage
//! - **DisplayRecord**: the two-decimal rendering handed to the presentation layer

pub mod material;
pub mod finding;
pub mod report;


pub use material::*;
pub use finding::*;
pub use report::*;
