//! Swiss cantonal tax and social-security engine.
//!
//! Rule data for every canton lives in an immutable
//! [`JurisdictionRuleRegistry`]; the engines in [`calculations`] borrow it
//! and compute one filing at a time. [`filings`] keeps a taxpayer's primary
//! and secondary filings consistent on top of a [`FilingRepository`].

pub mod calculations;
pub mod db;
pub mod error;
pub mod filings;
pub mod models;
pub mod registry;

#[cfg(test)]
mod fixtures;

pub use calculations::{CalculationResult, TaxSummaryAggregator};
pub use db::{FilingRepository, InMemoryFilingRepository, RepositoryError};
pub use error::{TaxError, parse_canton};
pub use filings::{FilingError, FilingOrchestrator, PrimaryFilingRequest};
pub use models::*;
pub use registry::{JurisdictionRuleRegistry, RuleRegistryBuilder};
