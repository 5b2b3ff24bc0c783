use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Canton;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentIncome {
    /// Gross annual salary for a full-time position.
    pub gross_salary: Decimal,
    /// Work percentage in percent (`100` is full time).
    pub work_percentage: Decimal,
    /// Employer-specific non-occupational accident rate, if known.
    pub accident_rate: Option<Decimal>,
}

impl EmploymentIncome {
    /// Salary actually earned: the full-time salary scaled by the work
    /// percentage.
    pub fn earned_salary(&self) -> Decimal {
        self.gross_salary * self.work_percentage / Decimal::ONE_HUNDRED
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEmploymentIncome {
    pub net_income: Decimal,
}

/// Real estate held by the taxpayer. Income and wealth from a property are
/// taxed in the canton where it is located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyHolding {
    pub canton: Canton,
    pub municipality: String,
    #[serde(default)]
    pub description: String,
    /// Tax value of the property.
    pub tax_value: Decimal,
    #[serde(default)]
    pub mortgage: Decimal,
    /// Rental income, or imputed rental value for owner-occupied property.
    pub rental_income: Decimal,
    #[serde(default)]
    pub mortgage_interest: Decimal,
    /// Effective maintenance costs; `None` claims the flat deduction.
    pub maintenance_costs: Option<Decimal>,
}

/// Financial inputs of a filing.
///
/// A secondary filing only ever carries the properties located in its own
/// canton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilingFinancials {
    pub employment: Option<EmploymentIncome>,
    pub self_employment: Option<SelfEmploymentIncome>,
    /// Pensions, capital income and other income not covered above.
    pub other_income: Decimal,
    /// Bank balances, securities and other movable assets.
    pub movable_assets: Decimal,
    /// Debts other than mortgages.
    pub debts: Decimal,
    pub debt_interest: Decimal,
    pub pillar_3a_contributions: Decimal,
    pub properties: Vec<PropertyHolding>,
}

impl FilingFinancials {
    pub fn carries_earned_income(&self) -> bool {
        self.employment.is_some() || self.self_employment.is_some()
    }

    /// Only the properties located in `canton`.
    pub fn local_property(
        &self,
        canton: Canton,
    ) -> Self {
        Self {
            properties: self
                .properties
                .iter()
                .filter(|p| p.canton == canton)
                .cloned()
                .collect(),
            ..Self::default()
        }
    }

    /// Cantons other than `home` in which property is held, sorted and
    /// without duplicates.
    pub fn property_cantons_outside(
        &self,
        home: Canton,
    ) -> Vec<Canton> {
        let mut cantons: Vec<Canton> = self
            .properties
            .iter()
            .map(|p| p.canton)
            .filter(|c| *c != home)
            .collect();
        cantons.sort_unstable();
        cantons.dedup();
        cantons
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn property(canton: Canton) -> PropertyHolding {
        PropertyHolding {
            canton,
            municipality: "Somewhere".to_string(),
            description: "Flat".to_string(),
            tax_value: dec!(400000),
            mortgage: dec!(200000),
            rental_income: dec!(18000),
            mortgage_interest: dec!(3000),
            maintenance_costs: None,
        }
    }

    #[test]
    fn local_property_drops_income_and_foreign_property() {
        let financials = FilingFinancials {
            employment: Some(EmploymentIncome {
                gross_salary: dec!(90000),
                work_percentage: dec!(100),
                accident_rate: None,
            }),
            other_income: dec!(1200),
            properties: vec![property(Canton::Zurich), property(Canton::Valais)],
            ..FilingFinancials::default()
        };

        let local = financials.local_property(Canton::Valais);

        assert!(!local.carries_earned_income());
        assert_eq!(local.other_income, dec!(0));
        assert_eq!(local.properties.len(), 1);
        assert_eq!(local.properties[0].canton, Canton::Valais);
    }

    #[test]
    fn property_cantons_outside_are_deduplicated() {
        let financials = FilingFinancials {
            properties: vec![
                property(Canton::Valais),
                property(Canton::Zurich),
                property(Canton::Ticino),
                property(Canton::Valais),
            ],
            ..FilingFinancials::default()
        };

        let cantons = financials.property_cantons_outside(Canton::Zurich);

        assert_eq!(cantons, vec![Canton::Ticino, Canton::Valais]);
    }

    #[test]
    fn earned_salary_scales_with_work_percentage() {
        let employment = EmploymentIncome {
            gross_salary: dec!(100000),
            work_percentage: dec!(60),
            accident_rate: None,
        };

        assert_eq!(employment.earned_salary(), dec!(60000));
    }
}
