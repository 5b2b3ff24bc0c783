use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One occupational-pension age band. Ages are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionAgeBand {
    pub min_age: u32,
    pub max_age: u32,
    /// Contribution rate on the coordinated salary, paid by the employee and
    /// matched by the employer.
    pub rate: Decimal,
}

/// Social-security parameters for one tax year.
///
/// Work percentages are expressed in percent (`100` is full time); all other
/// rates are fractions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityConfig {
    /// Combined employee + employer AHV/IV/EO rate for employees.
    pub ahv_rate: Decimal,
    pub ahv_self_employed_lower_bound: Decimal,
    pub ahv_self_employed_upper_bound: Decimal,
    pub ahv_self_employed_low_rate: Decimal,
    /// Fixed annual contribution owed between the lower and upper bound.
    pub ahv_self_employed_band_contribution: Decimal,
    pub ahv_self_employed_high_rate: Decimal,

    /// Combined employee + employer unemployment rate up to the ceiling.
    pub alv_rate: Decimal,
    pub alv_ceiling: Decimal,
    /// Combined rate on salary above the ceiling.
    pub alv_solidarity_rate: Decimal,

    pub nbu_min_work_percentage: Decimal,
    pub nbu_default_rate: Decimal,

    pub bvg_entry_threshold: Decimal,
    pub bvg_coordination_deduction: Decimal,
    pub bvg_max_insured_salary: Decimal,
    pub bvg_entry_age: u32,
    pub bvg_age_bands: Vec<PensionAgeBand>,
}

impl SocialSecurityConfig {
    pub fn pension_band_for_age(
        &self,
        age: u32,
    ) -> Option<&PensionAgeBand> {
        self.bvg_age_bands
            .iter()
            .find(|band| age >= band.min_age && age <= band.max_age)
    }
}

/// Deduction limits for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLimits {
    /// Pillar 3a cap for taxpayers insured in an occupational pension plan.
    pub pillar_3a_with_pension: Decimal,
    /// Pillar 3a cap for taxpayers without a pension plan, as a share of
    /// earned income, bounded by `pillar_3a_without_pension_max`.
    pub pillar_3a_without_pension_rate: Decimal,
    pub pillar_3a_without_pension_max: Decimal,

    pub professional_expense_rate: Decimal,
    pub professional_expense_min: Decimal,
    pub professional_expense_max: Decimal,

    pub insurance_premium_single: Decimal,
    pub insurance_premium_married: Decimal,
    pub insurance_premium_per_child: Decimal,

    pub child_deduction: Decimal,

    /// Flat maintenance deduction as a share of gross property income.
    pub property_maintenance_flat_rate: Decimal,
}

/// Everything a calculation needs besides the per-canton tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearConfig {
    pub tax_year: i32,
    pub social_security: SocialSecurityConfig,
    pub deductions: DeductionLimits,
}
