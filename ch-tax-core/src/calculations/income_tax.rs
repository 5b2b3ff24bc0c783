//! Cantonal and municipal income tax.
//!
//! # Example
//!
//! The engine borrows a registry; a missing rule set is an error, never a
//! silent zero.
//!
//! ```
//! use ch_tax_core::{Canton, JurisdictionRuleRegistry, MaritalStatus, TaxError};
//! use ch_tax_core::calculations::IncomeTaxEngine;
//! use rust_decimal_macros::dec;
//!
//! let registry = JurisdictionRuleRegistry::builder().build();
//! let engine = IncomeTaxEngine::new(&registry, 2024);
//!
//! let result = engine.calculate(Canton::Bern, dec!(80000), MaritalStatus::Single, "Bern");
//!
//! assert!(matches!(result, Err(TaxError::RuleNotFound { .. })));
//! ```

use rust_decimal::Decimal;

use crate::calculations::cantonal::{CantonalTaxResult, calculate_cantonal};
use crate::error::TaxError;
use crate::models::{Canton, MaritalStatus, RuleKind};
use crate::registry::JurisdictionRuleRegistry;

#[derive(Debug, Clone, Copy)]
pub struct IncomeTaxEngine<'a> {
    registry: &'a JurisdictionRuleRegistry,
    tax_year: i32,
}

impl<'a> IncomeTaxEngine<'a> {
    pub fn new(
        registry: &'a JurisdictionRuleRegistry,
        tax_year: i32,
    ) -> Self {
        Self { registry, tax_year }
    }

    /// Income tax on `taxable_income` in `canton`, plus the municipal share.
    ///
    /// # Errors
    ///
    /// [`TaxError::RuleNotFound`] when the canton has no income rules for the
    /// engine's tax year.
    pub fn calculate(
        &self,
        canton: Canton,
        taxable_income: Decimal,
        marital_status: MaritalStatus,
        municipality: &str,
    ) -> Result<CantonalTaxResult, TaxError> {
        calculate_cantonal(
            self.registry,
            self.tax_year,
            RuleKind::Income,
            canton,
            taxable_income,
            marital_status,
            municipality,
        )
    }
}
