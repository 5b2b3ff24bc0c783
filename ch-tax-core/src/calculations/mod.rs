//! Tax and social-security calculation engines.
//!
//! Engines borrow a [`JurisdictionRuleRegistry`](crate::JurisdictionRuleRegistry)
//! and a tax year; they hold no other state and never mutate the registry.

pub mod brackets;
mod cantonal;
pub mod church_tax;
pub mod common;
pub mod deductions;
pub mod federal_tax;
pub mod income_tax;
pub mod social_security;
pub mod summary;
pub mod wealth_tax;

pub use brackets::{BracketResolution, resolve, resolve_progressive, resolve_proportional};
pub use cantonal::CantonalTaxResult;
pub use church_tax::{ChurchTaxEngine, ChurchTaxResult, NotApplicableReason, RateSource};
pub use deductions::{DeductionBreakdown, DeductionCalculator, IncomeBreakdown, WealthBreakdown};
pub use federal_tax::{FederalTaxEngine, FederalTaxResult};
pub use income_tax::IncomeTaxEngine;
pub use social_security::{ContributionReason, ContributionResult, SocialSecurityBreakdown, SocialSecurityEngine};
pub use summary::{CalculationResult, TaxSummaryAggregator};
pub use wealth_tax::WealthTaxEngine;
