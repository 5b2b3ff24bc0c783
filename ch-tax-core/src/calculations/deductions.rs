//! Income, deduction and wealth breakdowns.
//!
//! [`DeductionCalculator`] turns a filing's raw financials into the three
//! bases the tax engines work on: gross income, deductions and net wealth.
//! Each reported component is rounded once; totals add rounded components.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{non_negative, round_half_up};
use crate::calculations::social_security::SocialSecurityBreakdown;
use crate::error::TaxError;
use crate::models::{DeductionLimits, FilingFinancials, MaritalStatus, PropertyHolding};
use crate::registry::JurisdictionRuleRegistry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeBreakdown {
    pub employment: Decimal,
    pub self_employment: Decimal,
    pub other: Decimal,
    pub property: Decimal,
    pub gross: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    /// Employee AHV/IV/EO, unemployment and accident contributions.
    pub social_security: Decimal,
    /// Employee occupational-pension contributions.
    pub pension: Decimal,
    pub pillar_3a: Decimal,
    pub professional_expenses: Decimal,
    pub insurance_premiums: Decimal,
    pub children: Decimal,
    pub debt_interest: Decimal,
    pub mortgage_interest: Decimal,
    pub property_maintenance: Decimal,
    pub total: Decimal,
}

impl DeductionBreakdown {
    fn with_total(mut self) -> Self {
        self.total = self.social_security
            + self.pension
            + self.pillar_3a
            + self.professional_expenses
            + self.insurance_premiums
            + self.children
            + self.debt_interest
            + self.mortgage_interest
            + self.property_maintenance;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WealthBreakdown {
    pub movable_assets: Decimal,
    pub property: Decimal,
    pub debts: Decimal,
    pub mortgages: Decimal,
    /// Assets less debts; may be negative.
    pub net: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct DeductionCalculator<'a> {
    limits: &'a DeductionLimits,
}

impl<'a> DeductionCalculator<'a> {
    pub fn new(limits: &'a DeductionLimits) -> Self {
        Self { limits }
    }

    /// # Errors
    ///
    /// [`TaxError::YearConfigNotFound`] when the year has no configuration.
    pub fn from_registry(
        registry: &'a JurisdictionRuleRegistry,
        tax_year: i32,
    ) -> Result<Self, TaxError> {
        Ok(Self::new(&registry.year_config(tax_year)?.deductions))
    }

    pub fn income(
        &self,
        financials: &FilingFinancials,
    ) -> IncomeBreakdown {
        let employment = financials
            .employment
            .as_ref()
            .map_or(Decimal::ZERO, |e| round_half_up(e.earned_salary()));
        let self_employment = financials
            .self_employment
            .as_ref()
            .map_or(Decimal::ZERO, |s| round_half_up(s.net_income));
        let other = round_half_up(financials.other_income);
        let property = round_half_up(sum(&financials.properties, |p| p.rental_income));

        IncomeBreakdown {
            employment,
            self_employment,
            other,
            property,
            gross: employment + self_employment + other + property,
        }
    }

    /// Full deductions of a primary filing.
    pub fn personal(
        &self,
        financials: &FilingFinancials,
        marital_status: MaritalStatus,
        children: u32,
        social_security: &SocialSecurityBreakdown,
    ) -> DeductionBreakdown {
        let limits = self.limits;
        let children = Decimal::from(children);

        let insurance_base = if marital_status.is_joint() {
            limits.insurance_premium_married
        } else {
            limits.insurance_premium_single
        };

        DeductionBreakdown {
            social_security: social_security.statutory_contributions(),
            pension: social_security.pension_contribution(),
            pillar_3a: round_half_up(self.pillar_3a(financials, social_security)),
            professional_expenses: round_half_up(self.professional_expenses(financials)),
            insurance_premiums: round_half_up(insurance_base + limits.insurance_premium_per_child * children),
            children: round_half_up(limits.child_deduction * children),
            debt_interest: round_half_up(non_negative(financials.debt_interest)),
            ..self.property(financials)
        }
        .with_total()
    }

    /// Deductions tied to property only, as claimed in a secondary filing.
    pub fn property(
        &self,
        financials: &FilingFinancials,
    ) -> DeductionBreakdown {
        let flat_rate = self.limits.property_maintenance_flat_rate;

        DeductionBreakdown {
            mortgage_interest: round_half_up(sum(&financials.properties, |p| non_negative(p.mortgage_interest))),
            property_maintenance: round_half_up(sum(&financials.properties, |p| {
                non_negative(
                    p.maintenance_costs
                        .unwrap_or(non_negative(p.rental_income) * flat_rate),
                )
            })),
            ..DeductionBreakdown::default()
        }
        .with_total()
    }

    pub fn wealth(
        &self,
        financials: &FilingFinancials,
    ) -> WealthBreakdown {
        let movable_assets = round_half_up(financials.movable_assets);
        let property = round_half_up(sum(&financials.properties, |p| p.tax_value));
        let debts = round_half_up(financials.debts);
        let mortgages = round_half_up(sum(&financials.properties, |p| p.mortgage));

        WealthBreakdown {
            movable_assets,
            property,
            debts,
            mortgages,
            net: movable_assets + property - debts - mortgages,
        }
    }

    /// Contributions up to the cap: a fixed amount when insured in a pension
    /// plan, otherwise a share of earned income up to a maximum.
    fn pillar_3a(
        &self,
        financials: &FilingFinancials,
        social_security: &SocialSecurityBreakdown,
    ) -> Decimal {
        let limits = self.limits;
        let contributions = non_negative(financials.pillar_3a_contributions);

        let cap = if social_security.pension.applicable {
            limits.pillar_3a_with_pension
        } else {
            let earned = financials
                .employment
                .as_ref()
                .map_or(Decimal::ZERO, |e| e.earned_salary())
                + financials
                    .self_employment
                    .as_ref()
                    .map_or(Decimal::ZERO, |s| s.net_income);
            (non_negative(earned) * limits.pillar_3a_without_pension_rate)
                .min(limits.pillar_3a_without_pension_max)
        };

        contributions.min(cap)
    }

    /// Flat professional expenses on employment income.
    fn professional_expenses(
        &self,
        financials: &FilingFinancials,
    ) -> Decimal {
        let Some(employment) = &financials.employment else {
            return Decimal::ZERO;
        };
        let limits = self.limits;
        let salary = non_negative(employment.earned_salary());

        (salary * limits.professional_expense_rate)
            .max(limits.professional_expense_min)
            .min(limits.professional_expense_max)
            .min(salary)
    }
}

fn sum(
    properties: &[PropertyHolding],
    field: impl Fn(&PropertyHolding) -> Decimal,
) -> Decimal {
    properties.iter().map(field).sum()
}
