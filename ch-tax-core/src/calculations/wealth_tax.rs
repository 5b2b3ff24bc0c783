//! Cantonal and municipal wealth tax.

use rust_decimal::Decimal;

use crate::calculations::cantonal::{CantonalTaxResult, calculate_cantonal};
use crate::error::TaxError;
use crate::models::{Canton, MaritalStatus, RuleKind};
use crate::registry::JurisdictionRuleRegistry;

#[derive(Debug, Clone, Copy)]
pub struct WealthTaxEngine<'a> {
    registry: &'a JurisdictionRuleRegistry,
    tax_year: i32,
}

impl<'a> WealthTaxEngine<'a> {
    pub fn new(
        registry: &'a JurisdictionRuleRegistry,
        tax_year: i32,
    ) -> Self {
        Self { registry, tax_year }
    }

    /// Wealth tax on `net_wealth` in `canton`, plus the municipal share.
    /// Negative net wealth is taxed as zero.
    ///
    /// # Errors
    ///
    /// [`TaxError::RuleNotFound`] when the canton has no wealth rules for the
    /// engine's tax year.
    pub fn calculate(
        &self,
        canton: Canton,
        net_wealth: Decimal,
        marital_status: MaritalStatus,
        municipality: &str,
    ) -> Result<CantonalTaxResult, TaxError> {
        calculate_cantonal(
            self.registry,
            self.tax_year,
            RuleKind::Wealth,
            canton,
            net_wealth,
            marital_status,
            municipality,
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::fixtures;

    #[test]
    fn progressive_wealth_tax_example() {
        let registry = fixtures::registry();
        let engine = WealthTaxEngine::new(&registry, 2024);

        let result = engine
            .calculate(Canton::Zurich, dec!(500000), MaritalStatus::Single, "Zürich")
            .unwrap();

        assert_eq!(result.taxable_base, dec!(420000));
        assert_eq!(result.cantonal_tax, dec!(300));
        assert_eq!(result.municipal_tax, dec!(357));
    }

    #[test]
    fn proportional_wealth_tax_example() {
        let registry = fixtures::registry();
        let engine = WealthTaxEngine::new(&registry, 2024);

        let result = engine
            .calculate(Canton::Zug, dec!(100000), MaritalStatus::Single, "Zug")
            .unwrap();

        assert_eq!(result.taxable_base, dec!(65000));
        assert_eq!(result.cantonal_tax, dec!(16.25));
        // 16.25 × 0.5 = 8.125
        assert_eq!(result.municipal_tax, dec!(8.13));
    }

    #[test]
    fn married_threshold_applies_to_wealth() {
        let registry = fixtures::registry();
        let engine = WealthTaxEngine::new(&registry, 2024);

        let result = engine
            .calculate(Canton::Valais, dec!(100000), MaritalStatus::Married, "Sion")
            .unwrap();

        // (100000 - 60000) × 2‰
        assert_eq!(result.threshold, dec!(60000));
        assert_eq!(result.cantonal_tax, dec!(80));
        assert_eq!(result.municipal_tax, dec!(88));
    }

    #[test]
    fn negative_net_wealth_is_untaxed() {
        let registry = fixtures::registry();
        let engine = WealthTaxEngine::new(&registry, 2024);

        let result = engine
            .calculate(Canton::Zurich, dec!(-40000), MaritalStatus::Single, "Zürich")
            .unwrap();

        assert_eq!(result.taxable_base, dec!(0));
        assert_eq!(result.total(), dec!(0));
    }

    #[test]
    fn missing_wealth_rules_are_fatal() {
        let registry = fixtures::registry();
        let engine = WealthTaxEngine::new(&registry, 2024);

        let result = engine.calculate(Canton::Bern, dec!(500000), MaritalStatus::Single, "Bern");

        assert!(matches!(
            result,
            Err(TaxError::RuleNotFound {
                kind: RuleKind::Wealth,
                ..
            })
        ));
    }
}
