//! Social-security contributions.
//!
//! Four independent calculators share one [`SocialSecurityConfig`]:
//!
//! | Insurance | Who pays | Base |
//! |-----------|----------|------|
//! | AHV/IV/EO (old age, disability, income compensation) | employed: split equally; self-employed: alone | earned salary or net self-employment income |
//! | ALV (unemployment) | employed only, split equally | earned salary, solidarity rate above the ceiling |
//! | NBU (non-occupational accident) | employed only, employee-borne | earned salary, from a minimum work percentage |
//! | BVG (occupational pension) | employed only, employee and employer pay the band rate each | coordinated salary |
//!
//! Employer amounts are informational; only the employee side enters a
//! taxpayer's liability.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{non_negative, round_half_up};
use crate::error::TaxError;
use crate::models::{EmploymentIncome, FilingFinancials, SelfEmploymentIncome, SocialSecurityConfig};
use crate::registry::JurisdictionRuleRegistry;

/// Why a contribution does not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionReason {
    NoEarnedIncome,
    SelfEmployed,
    BelowMinimumWorkPercentage,
    BelowEntrySalary,
    BelowEntryAge,
    AgeUnknown,
    OutsideAgeBands,
}

impl ContributionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoEarnedIncome => "no_earned_income",
            Self::SelfEmployed => "self_employed",
            Self::BelowMinimumWorkPercentage => "below_minimum_work_percentage",
            Self::BelowEntrySalary => "below_entry_salary",
            Self::BelowEntryAge => "below_entry_age",
            Self::AgeUnknown => "age_unknown",
            Self::OutsideAgeBands => "outside_age_bands",
        }
    }
}

impl fmt::Display for ContributionReason {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One insurance's contribution, split by payer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionResult {
    pub employee: Decimal,
    pub employer: Decimal,
    pub applicable: bool,
    pub reason: Option<ContributionReason>,
}

impl ContributionResult {
    fn applies(
        employee: Decimal,
        employer: Decimal,
    ) -> Self {
        Self {
            employee,
            employer,
            applicable: true,
            reason: None,
        }
    }

    fn not_applicable(reason: ContributionReason) -> Self {
        Self {
            employee: Decimal::ZERO,
            employer: Decimal::ZERO,
            applicable: false,
            reason: Some(reason),
        }
    }

    /// A combined rate split equally between employee and employer.
    fn split(total: Decimal) -> Self {
        let half = round_half_up(total / Decimal::TWO);
        Self::applies(half, half)
    }

    fn total(&self) -> Decimal {
        self.employee + self.employer
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityBreakdown {
    pub old_age: ContributionResult,
    pub unemployment: ContributionResult,
    pub accident: ContributionResult,
    pub pension: ContributionResult,
    pub employee_total: Decimal,
    pub employer_total: Decimal,
}

impl SocialSecurityBreakdown {
    /// A breakdown in which nothing applies, used for filings without
    /// earned income.
    pub fn empty() -> Self {
        let none = ContributionResult::not_applicable(ContributionReason::NoEarnedIncome);
        Self::from_parts(none, none, none, none)
    }

    fn from_parts(
        old_age: ContributionResult,
        unemployment: ContributionResult,
        accident: ContributionResult,
        pension: ContributionResult,
    ) -> Self {
        let parts = [old_age, unemployment, accident, pension];
        Self {
            employee_total: parts.iter().map(|p| p.employee).sum(),
            employer_total: parts.iter().map(|p| p.employer).sum(),
            old_age,
            unemployment,
            accident,
            pension,
        }
    }

    pub fn pension_contribution(&self) -> Decimal {
        self.pension.employee
    }

    /// Employee contributions other than the occupational pension.
    pub fn statutory_contributions(&self) -> Decimal {
        self.employee_total - self.pension.employee
    }
}

/// Age in `tax_year`, counted by year of birth.
pub fn age_in(
    tax_year: i32,
    date_of_birth: NaiveDate,
) -> u32 {
    u32::try_from(tax_year - date_of_birth.year()).unwrap_or(0)
}

#[derive(Debug, Clone, Copy)]
pub struct SocialSecurityEngine<'a> {
    config: &'a SocialSecurityConfig,
    tax_year: i32,
}

impl<'a> SocialSecurityEngine<'a> {
    pub fn new(
        config: &'a SocialSecurityConfig,
        tax_year: i32,
    ) -> Self {
        Self { config, tax_year }
    }

    /// # Errors
    ///
    /// [`TaxError::YearConfigNotFound`] when the year has no configuration.
    pub fn from_registry(
        registry: &'a JurisdictionRuleRegistry,
        tax_year: i32,
    ) -> Result<Self, TaxError> {
        let config = &registry.year_config(tax_year)?.social_security;
        Ok(Self::new(config, tax_year))
    }

    /// All four contributions for the earned income in `financials`.
    pub fn calculate(
        &self,
        financials: &FilingFinancials,
        date_of_birth: Option<NaiveDate>,
    ) -> SocialSecurityBreakdown {
        let employment = financials.employment.as_ref();
        let age = date_of_birth.map(|dob| age_in(self.tax_year, dob));

        let breakdown = SocialSecurityBreakdown::from_parts(
            self.old_age(employment, financials.self_employment.as_ref()),
            self.unemployment(employment, financials),
            self.accident(employment, financials),
            self.pension(employment, age, financials),
        );

        debug!(
            tax_year = self.tax_year,
            employee_total = %breakdown.employee_total,
            employer_total = %breakdown.employer_total,
            "social security resolved"
        );

        breakdown
    }

    /// AHV/IV/EO on employment and self-employment income combined.
    pub fn old_age(
        &self,
        employment: Option<&EmploymentIncome>,
        self_employment: Option<&SelfEmploymentIncome>,
    ) -> ContributionResult {
        let employed = employment.map(|e| self.old_age_employed(e.earned_salary()));
        let independent = self_employment.map(|s| self.old_age_self_employed(s.net_income));

        match (employed, independent) {
            (Some(e), Some(s)) => ContributionResult::applies(e.employee + s.employee, e.employer + s.employer),
            (Some(e), None) => e,
            (None, Some(s)) => s,
            (None, None) => ContributionResult::not_applicable(ContributionReason::NoEarnedIncome),
        }
    }

    pub fn old_age_employed(
        &self,
        salary: Decimal,
    ) -> ContributionResult {
        ContributionResult::split(non_negative(salary) * self.config.ahv_rate)
    }

    /// Self-employed AHV: a low rate below the lower bound, a fixed amount
    /// between the bounds, and a high rate above the upper bound. Paid in
    /// full by the self-employed person.
    pub fn old_age_self_employed(
        &self,
        net_income: Decimal,
    ) -> ContributionResult {
        let c = self.config;
        let income = non_negative(net_income);

        let contribution = if income == Decimal::ZERO {
            Decimal::ZERO
        } else if income < c.ahv_self_employed_lower_bound {
            income * c.ahv_self_employed_low_rate
        } else if income <= c.ahv_self_employed_upper_bound {
            c.ahv_self_employed_band_contribution
        } else {
            income * c.ahv_self_employed_high_rate
        };

        ContributionResult::applies(round_half_up(contribution), Decimal::ZERO)
    }

    pub fn unemployment(
        &self,
        employment: Option<&EmploymentIncome>,
        financials: &FilingFinancials,
    ) -> ContributionResult {
        let Some(employment) = employment else {
            return ContributionResult::not_applicable(not_employed_reason(financials));
        };
        let c = self.config;
        let salary = non_negative(employment.earned_salary());

        let standard = salary.min(c.alv_ceiling) * c.alv_rate;
        let solidarity = non_negative(salary - c.alv_ceiling) * c.alv_solidarity_rate;

        ContributionResult::split(standard + solidarity)
    }

    pub fn accident(
        &self,
        employment: Option<&EmploymentIncome>,
        financials: &FilingFinancials,
    ) -> ContributionResult {
        let Some(employment) = employment else {
            return ContributionResult::not_applicable(not_employed_reason(financials));
        };
        let c = self.config;

        if employment.work_percentage < c.nbu_min_work_percentage {
            return ContributionResult::not_applicable(ContributionReason::BelowMinimumWorkPercentage);
        }

        let rate = employment.accident_rate.unwrap_or(c.nbu_default_rate);
        let premium = non_negative(employment.earned_salary()) * rate;

        ContributionResult::applies(round_half_up(premium), Decimal::ZERO)
    }

    pub fn pension(
        &self,
        employment: Option<&EmploymentIncome>,
        age: Option<u32>,
        financials: &FilingFinancials,
    ) -> ContributionResult {
        let Some(employment) = employment else {
            return ContributionResult::not_applicable(not_employed_reason(financials));
        };
        let Some(age) = age else {
            return ContributionResult::not_applicable(ContributionReason::AgeUnknown);
        };
        let c = self.config;

        if age < c.bvg_entry_age {
            return ContributionResult::not_applicable(ContributionReason::BelowEntryAge);
        }
        let salary = employment.earned_salary();
        if salary < c.bvg_entry_threshold {
            return ContributionResult::not_applicable(ContributionReason::BelowEntrySalary);
        }
        let Some(band) = c.pension_band_for_age(age) else {
            return ContributionResult::not_applicable(ContributionReason::OutsideAgeBands);
        };

        let coordinated = self.coordinated_salary(salary);
        let contribution = round_half_up(coordinated * band.rate);

        debug!(age, coordinated = %coordinated, rate = %band.rate, "pension band");

        ContributionResult::applies(contribution, contribution)
    }

    /// Salary minus the coordination deduction, between zero and the maximum
    /// insured salary minus the coordination deduction.
    pub fn coordinated_salary(
        &self,
        salary: Decimal,
    ) -> Decimal {
        let c = self.config;
        let cap = non_negative(c.bvg_max_insured_salary - c.bvg_coordination_deduction);
        non_negative(salary - c.bvg_coordination_deduction).min(cap)
    }
}

fn not_employed_reason(financials: &FilingFinancials) -> ContributionReason {
    if financials.self_employment.is_some() {
        ContributionReason::SelfEmployed
    } else {
        ContributionReason::NoEarnedIncome
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::fixtures;

    fn employed(
        gross_salary: Decimal,
        work_percentage: Decimal,
    ) -> FilingFinancials {
        FilingFinancials {
            employment: Some(EmploymentIncome {
                gross_salary,
                work_percentage,
                accident_rate: None,
            }),
            ..FilingFinancials::default()
        }
    }

    fn self_employed(net_income: Decimal) -> FilingFinancials {
        FilingFinancials {
            self_employment: Some(SelfEmploymentIncome { net_income }),
            ..FilingFinancials::default()
        }
    }

    fn born(year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, 6, 15)
    }

    // =========================================================================
    // employed
    // =========================================================================

    #[test]
    fn full_time_employee() {
        let config = fixtures::year_config();
        let engine = SocialSecurityEngine::new(&config.social_security, 2024);

        let result = engine.calculate(&employed(dec!(85000), dec!(100)), born(1984));

        // 85000 × 10.6% / 2
        assert_eq!(result.old_age.employee, dec!(4505));
        assert_eq!(result.old_age.employer, dec!(4505));
        // 85000 × 2.2% / 2
        assert_eq!(result.unemployment.employee, dec!(935));
        // 85000 × 1.4%, employee only
        assert_eq!(result.accident.employee, dec!(1190));
        assert_eq!(result.accident.employer, dec!(0));
        assert_eq!(result.pension.employee, dec!(5927.50));
        assert_eq!(result.pension.employer, dec!(5927.50));
        assert_eq!(result.employee_total, dec!(12557.50));
        assert_eq!(result.employer_total, dec!(11367.50));
        assert_eq!(result.statutory_contributions(), dec!(6630));
    }

    #[test]
    fn unemployment_adds_solidarity_above_ceiling() {
        let config = fixtures::year_config();
        let engine = SocialSecurityEngine::new(&config.social_security, 2024);
        let financials = employed(dec!(200000), dec!(100));

        let result = engine.unemployment(financials.employment.as_ref(), &financials);

        // (148200 × 2.2% + 51800 × 1%) / 2 = (3260.40 + 518) / 2
        assert_eq!(result.employee, dec!(1889.20));
        assert_eq!(result.total(), dec!(3778.40));
    }

    #[test]
    fn part_time_salary_is_scaled() {
        let config = fixtures::year_config();
        let engine = SocialSecurityEngine::new(&config.social_security, 2024);

        let result = engine.calculate(&employed(dec!(100000), dec!(50)), born(1994));

        // earned 50000
        assert_eq!(result.old_age.employee, dec!(2650));
        // (50000 - 25725) × 7%
        assert_eq!(result.pension.employee, dec!(1699.25));
    }

    #[test]
    fn accident_requires_minimum_work_percentage() {
        let config = fixtures::year_config();
        let engine = SocialSecurityEngine::new(&config.social_security, 2024);
        let financials = employed(dec!(100000), dec!(10));

        let result = engine.accident(financials.employment.as_ref(), &financials);

        assert!(!result.applicable);
        assert_eq!(result.reason, Some(ContributionReason::BelowMinimumWorkPercentage));
    }

    #[test]
    fn accident_uses_employer_rate_when_given() {
        let config = fixtures::year_config();
        let engine = SocialSecurityEngine::new(&config.social_security, 2024);
        let mut financials = employed(dec!(80000), dec!(100));
        if let Some(employment) = financials.employment.as_mut() {
            employment.accident_rate = Some(dec!(0.0125));
        }

        let result = engine.accident(financials.employment.as_ref(), &financials);

        assert_eq!(result.employee, dec!(1000));
    }

    // =========================================================================
    // pension
    // =========================================================================

    #[test]
    fn pension_example() {
        let config = fixtures::year_config();
        let engine = SocialSecurityEngine::new(&config.social_security, 2024);
        let financials = employed(dec!(85000), dec!(100));

        let result = engine.pension(financials.employment.as_ref(), Some(40), &financials);

        assert_eq!(engine.coordinated_salary(dec!(85000)), dec!(59275));
        assert_eq!(result.employee, dec!(5927.50));
    }

    #[test]
    fn coordinated_salary_is_capped() {
        let config = fixtures::year_config();
        let engine = SocialSecurityEngine::new(&config.social_security, 2024);
        let financials = employed(dec!(150000), dec!(100));

        let result = engine.pension(financials.employment.as_ref(), Some(50), &financials);

        // (88200 - 25725) × 15%
        assert_eq!(engine.coordinated_salary(dec!(150000)), dec!(62475));
        assert_eq!(result.employee, dec!(9371.25));
    }

    #[test]
    fn pension_not_mandatory_below_entry_age() {
        let config = fixtures::year_config();
        let engine = SocialSecurityEngine::new(&config.social_security, 2024);
        let financials = employed(dec!(85000), dec!(100));

        let result = engine.pension(financials.employment.as_ref(), Some(24), &financials);

        assert_eq!(result.reason, Some(ContributionReason::BelowEntryAge));
        assert_eq!(result.employee, dec!(0));
    }

    #[test]
    fn pension_not_mandatory_below_entry_salary() {
        let config = fixtures::year_config();
        let engine = SocialSecurityEngine::new(&config.social_security, 2024);
        let financials = employed(dec!(20000), dec!(100));

        let result = engine.pension(financials.employment.as_ref(), Some(40), &financials);

        assert_eq!(result.reason, Some(ContributionReason::BelowEntrySalary));
    }

    #[test]
    fn pension_needs_a_birth_date() {
        let config = fixtures::year_config();
        let engine = SocialSecurityEngine::new(&config.social_security, 2024);

        let result = engine.calculate(&employed(dec!(85000), dec!(100)), None);

        assert_eq!(result.pension.reason, Some(ContributionReason::AgeUnknown));
        assert!(result.old_age.applicable);
    }

    #[test]
    fn pension_outside_age_bands() {
        let config = fixtures::year_config();
        let engine = SocialSecurityEngine::new(&config.social_security, 2024);
        let financials = employed(dec!(85000), dec!(100));

        let result = engine.pension(financials.employment.as_ref(), Some(70), &financials);

        assert_eq!(result.reason, Some(ContributionReason::OutsideAgeBands));
    }

    #[test]
    fn age_counts_birth_years() {
        let december = NaiveDate::from_ymd_opt(1984, 12, 31).unwrap();

        assert_eq!(age_in(2024, december), 40);
        assert_eq!(age_in(1980, december), 0);
    }

    // =========================================================================
    // self-employed
    // =========================================================================

    #[test]
    fn self_employed_owes_only_old_age() {
        let config = fixtures::year_config();
        let engine = SocialSecurityEngine::new(&config.social_security, 2024);

        let result = engine.calculate(&self_employed(dec!(100000)), born(1984));

        assert_eq!(result.old_age.employee, dec!(10000));
        assert_eq!(result.old_age.employer, dec!(0));
        for other in [result.unemployment, result.accident, result.pension] {
            assert_eq!(other.employee, dec!(0));
            assert_eq!(other.employer, dec!(0));
            assert_eq!(other.reason, Some(ContributionReason::SelfEmployed));
        }
        assert_eq!(result.employee_total, dec!(10000));
    }

    #[test]
    fn self_employed_bands() {
        let config = fixtures::year_config();
        let engine = SocialSecurityEngine::new(&config.social_security, 2024);

        assert_eq!(engine.old_age_self_employed(dec!(8000)).employee, dec!(429.68));
        assert_eq!(engine.old_age_self_employed(dec!(10100)).employee, dec!(2650));
        assert_eq!(engine.old_age_self_employed(dec!(40000)).employee, dec!(2650));
        assert_eq!(engine.old_age_self_employed(dec!(60500)).employee, dec!(2650));
        assert_eq!(engine.old_age_self_employed(dec!(-5000)).employee, dec!(0));
    }

    #[test]
    fn no_earned_income_owes_nothing() {
        let config = fixtures::year_config();
        let engine = SocialSecurityEngine::new(&config.social_security, 2024);

        let result = engine.calculate(&FilingFinancials::default(), born(1984));

        assert_eq!(result, SocialSecurityBreakdown::empty());
    }

    #[test]
    fn from_registry_requires_year_config() {
        let registry = fixtures::registry();

        let result = SocialSecurityEngine::from_registry(&registry, 2030);

        assert!(matches!(result, Err(TaxError::YearConfigNotFound(2030))));
    }
}
