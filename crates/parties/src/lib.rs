//! Parties module: clients and the issuing company profile.
//!
//! Simple field storage with no cross-invariants beyond identifier uniqueness
//! and the required client name/email. Invoices take value copies of these
//! records at creation time.

pub mod directory;
pub mod party;

pub use directory::ClientDirectory;
pub use party::{Client, ClientPatch, Company, CompanyPatch};
