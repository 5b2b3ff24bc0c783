//! Direct federal tax.
//!
//! One progressive tariff for single taxpayers and one for married couples,
//! both threshold-free, followed by a fixed reduction per dependent child.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::brackets::resolve_progressive;
use crate::calculations::common::{effective_rate, non_negative, round_half_up};
use crate::error::TaxError;
use crate::models::MaritalStatus;
use crate::registry::JurisdictionRuleRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalTaxResult {
    pub taxable_income: Decimal,
    /// Tax from the tariff before the child reduction.
    pub tariff_tax: Decimal,
    pub child_reduction: Decimal,
    /// Tariff tax less the child reduction, never negative.
    pub tax: Decimal,
    pub effective_rate: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct FederalTaxEngine<'a> {
    registry: &'a JurisdictionRuleRegistry,
    tax_year: i32,
}

impl<'a> FederalTaxEngine<'a> {
    pub fn new(
        registry: &'a JurisdictionRuleRegistry,
        tax_year: i32,
    ) -> Self {
        Self { registry, tax_year }
    }

    /// # Errors
    ///
    /// [`TaxError::FederalRulesNotFound`] when no tariff is loaded for the
    /// engine's tax year.
    pub fn calculate(
        &self,
        taxable_income: Decimal,
        marital_status: MaritalStatus,
        children: u32,
    ) -> Result<FederalTaxResult, TaxError> {
        let rules = self.registry.federal_rules(self.tax_year)?;
        let brackets = rules.brackets_for(marital_status);

        let resolution = resolve_progressive(taxable_income, Decimal::ZERO, brackets);
        let tariff_tax = round_half_up(resolution.tax);
        let child_reduction = rules.child_tax_reduction * Decimal::from(children);
        let tax = non_negative(tariff_tax - child_reduction);

        debug!(
            tax_year = self.tax_year,
            taxable_income = %resolution.taxable,
            tariff_tax = %tariff_tax,
            children,
            tax = %tax,
            "federal tax resolved"
        );

        Ok(FederalTaxResult {
            taxable_income: resolution.taxable,
            tariff_tax,
            child_reduction,
            tax,
            effective_rate: effective_rate(tax, taxable_income),
        })
    }
}
