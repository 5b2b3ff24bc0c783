//! Per-filing liability summary.
//!
//! A primary filing is assessed on everything it carries: earned and other
//! income, deductions, federal tax, cantonal and municipal income and wealth
//! tax, church tax and social security. A secondary filing is assessed on the
//! property located in its canton only.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::cantonal::CantonalTaxResult;
use crate::calculations::church_tax::{ChurchTaxEngine, ChurchTaxResult};
use crate::calculations::common::effective_rate;
use crate::calculations::deductions::{DeductionBreakdown, DeductionCalculator, IncomeBreakdown, WealthBreakdown};
use crate::calculations::federal_tax::{FederalTaxEngine, FederalTaxResult};
use crate::calculations::income_tax::IncomeTaxEngine;
use crate::calculations::social_security::{SocialSecurityBreakdown, SocialSecurityEngine};
use crate::calculations::wealth_tax::WealthTaxEngine;
use crate::error::TaxError;
use crate::models::{Canton, FilingRole, TaxFiling};
use crate::registry::JurisdictionRuleRegistry;

/// Complete liability breakdown of one filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub filing_id: i64,
    pub tax_year: i32,
    pub canton: Canton,
    pub role: FilingRole,

    pub income: IncomeBreakdown,
    pub deductions: DeductionBreakdown,
    pub taxable_income: Decimal,
    pub wealth: WealthBreakdown,

    /// `None` for secondary filings.
    pub federal: Option<FederalTaxResult>,
    pub income_tax: CantonalTaxResult,
    pub wealth_tax: CantonalTaxResult,
    pub church: ChurchTaxResult,
    /// `None` for secondary filings.
    pub social_security: Option<SocialSecurityBreakdown>,

    pub federal_tax: Decimal,
    pub cantonal_tax: Decimal,
    pub municipal_tax: Decimal,
    pub church_tax: Decimal,
    /// Employee share only.
    pub social_security_contributions: Decimal,
    pub total_liability: Decimal,
    /// Total liability as a percentage of gross income (primary) or
    /// property income (secondary).
    pub effective_rate: Decimal,
}

impl fmt::Display for CalculationResult {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "Filing {} ({} {}, {})",
            self.filing_id,
            self.canton,
            self.tax_year,
            self.role.as_str()
        )?;
        writeln!(f, "  Gross income:          {:>12}", self.income.gross)?;
        writeln!(f, "  Deductions:            {:>12}", self.deductions.total)?;
        writeln!(f, "  Taxable income:        {:>12}", self.taxable_income)?;
        writeln!(f, "  Net wealth:            {:>12}", self.wealth.net)?;
        writeln!(f, "  Federal tax:           {:>12}", self.federal_tax)?;
        writeln!(f, "  Cantonal tax:          {:>12}", self.cantonal_tax)?;
        writeln!(f, "  Municipal tax:         {:>12}", self.municipal_tax)?;
        match self.church.reason {
            Some(reason) => writeln!(f, "  Church tax:            {:>12} ({reason})", self.church_tax)?,
            None => writeln!(f, "  Church tax:            {:>12}", self.church_tax)?,
        }
        writeln!(f, "  Social security:       {:>12}", self.social_security_contributions)?;
        writeln!(f, "  Total liability:       {:>12}", self.total_liability)?;
        write!(f, "  Effective rate:        {:>11}%", self.effective_rate)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TaxSummaryAggregator<'a> {
    registry: &'a JurisdictionRuleRegistry,
}

impl<'a> TaxSummaryAggregator<'a> {
    pub fn new(registry: &'a JurisdictionRuleRegistry) -> Self {
        Self { registry }
    }

    /// Computes the liability of `filing` for its own tax year.
    ///
    /// # Errors
    ///
    /// Fails when the income, wealth or federal rules or the year
    /// configuration are missing. Missing church data never fails.
    pub fn calculate(
        &self,
        filing: &TaxFiling,
    ) -> Result<CalculationResult, TaxError> {
        let result = match filing.role {
            FilingRole::Primary => self.calculate_primary(filing),
            FilingRole::Secondary => self.calculate_secondary(filing),
        }?;

        debug!(
            filing_id = filing.id,
            canton = %filing.canton,
            total = %result.total_liability,
            effective_rate = %result.effective_rate,
            "filing calculated"
        );

        Ok(result)
    }

    /// Calculates every filing independently; one failure does not stop the
    /// others.
    pub fn calculate_batch(
        &self,
        filings: &[TaxFiling],
    ) -> Vec<(i64, Result<CalculationResult, TaxError>)> {
        filings
            .iter()
            .map(|filing| {
                let result = self.calculate(filing);
                if let Err(err) = &result {
                    warn!(filing_id = filing.id, error = %err, "filing calculation failed");
                }
                (filing.id, result)
            })
            .collect()
    }

    fn calculate_primary(
        &self,
        filing: &TaxFiling,
    ) -> Result<CalculationResult, TaxError> {
        let year = filing.tax_year;
        let personal = &filing.personal;

        // Property in other cantons is assessed by the secondary filings.
        let mut financials = filing.financials.clone();
        financials.properties.retain(|p| p.canton == filing.canton);

        let calculator = DeductionCalculator::from_registry(self.registry, year)?;
        let social_security =
            SocialSecurityEngine::from_registry(self.registry, year)?.calculate(&financials, personal.date_of_birth);

        let income = calculator.income(&financials);
        let deductions = calculator.personal(
            &financials,
            personal.marital_status,
            personal.children,
            &social_security,
        );
        let wealth = calculator.wealth(&financials);
        let taxable_income = income.gross - deductions.total;

        let federal = FederalTaxEngine::new(self.registry, year).calculate(
            taxable_income,
            personal.marital_status,
            personal.children,
        )?;

        let parts = Assessment {
            income,
            deductions,
            taxable_income,
            wealth,
            federal: Some(federal),
            social_security: Some(social_security),
        };
        self.finish(filing, parts)
    }

    fn calculate_secondary(
        &self,
        filing: &TaxFiling,
    ) -> Result<CalculationResult, TaxError> {
        let financials = filing.financials.local_property(filing.canton);
        let calculator = DeductionCalculator::from_registry(self.registry, filing.tax_year)?;

        let income = calculator.income(&financials);
        let deductions = calculator.property(&financials);
        let wealth = calculator.wealth(&financials);
        let taxable_income = income.gross - deductions.total;

        let parts = Assessment {
            income,
            deductions,
            taxable_income,
            wealth,
            federal: None,
            social_security: None,
        };
        self.finish(filing, parts)
    }

    /// Cantonal, municipal and church tax on the assessed bases, and the
    /// totals.
    fn finish(
        &self,
        filing: &TaxFiling,
        parts: Assessment,
    ) -> Result<CalculationResult, TaxError> {
        let year = filing.tax_year;
        let status = filing.personal.marital_status;
        let municipality = filing.municipality.as_str();

        let income_tax = IncomeTaxEngine::new(self.registry, year).calculate(
            filing.canton,
            parts.taxable_income,
            status,
            municipality,
        )?;
        let wealth_tax =
            WealthTaxEngine::new(self.registry, year).calculate(filing.canton, parts.wealth.net, status, municipality)?;

        let cantonal_tax = income_tax.cantonal_tax + wealth_tax.cantonal_tax;
        let municipal_tax = income_tax.municipal_tax + wealth_tax.municipal_tax;

        let church = ChurchTaxEngine::new(self.registry, year).calculate(
            filing.canton,
            cantonal_tax,
            filing.personal.denomination,
            municipality,
        );

        let federal_tax = parts.federal.as_ref().map_or(Decimal::ZERO, |f| f.tax);
        let social_security_contributions = parts
            .social_security
            .as_ref()
            .map_or(Decimal::ZERO, |s| s.employee_total);

        let total_liability = federal_tax + cantonal_tax + municipal_tax + church.tax + social_security_contributions;
        let base = match filing.role {
            FilingRole::Primary => parts.income.gross,
            FilingRole::Secondary => parts.income.property,
        };

        Ok(CalculationResult {
            filing_id: filing.id,
            tax_year: year,
            canton: filing.canton,
            role: filing.role,
            federal_tax,
            cantonal_tax,
            municipal_tax,
            church_tax: church.tax,
            social_security_contributions,
            total_liability,
            effective_rate: effective_rate(total_liability, base),
            income: parts.income,
            deductions: parts.deductions,
            taxable_income: parts.taxable_income,
            wealth: parts.wealth,
            federal: parts.federal,
            income_tax,
            wealth_tax,
            church,
            social_security: parts.social_security,
        })
    }
}

/// Bases assessed before the cantonal engines run.
struct Assessment {
    income: IncomeBreakdown,
    deductions: DeductionBreakdown,
    taxable_income: Decimal,
    wealth: WealthBreakdown,
    federal: Option<FederalTaxResult>,
    social_security: Option<SocialSecurityBreakdown>,
}
