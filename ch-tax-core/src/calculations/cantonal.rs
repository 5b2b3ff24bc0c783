//! Shared cantonal + municipal tax computation for income and wealth.
//!
//! Every canton goes through the same code path; what differs between them is
//! the rule data (structure, thresholds, brackets, municipal multipliers).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::brackets::resolve;
use crate::calculations::common::{effective_rate, round_half_up};
use crate::error::TaxError;
use crate::models::{Canton, MaritalStatus, RuleKind};
use crate::registry::JurisdictionRuleRegistry;

/// Result of a cantonal income or wealth tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CantonalTaxResult {
    pub canton: Canton,
    pub kind: RuleKind,
    /// Tax owed to the canton.
    pub cantonal_tax: Decimal,
    /// Cantonal tax times the municipal multiplier.
    pub municipal_tax: Decimal,
    /// Amount above the threshold.
    pub taxable_base: Decimal,
    pub threshold: Decimal,
    pub municipal_multiplier: Decimal,
    /// `true` when the municipality was unknown and a multiplier of 1 applied.
    pub multiplier_defaulted: bool,
    /// Cantonal plus municipal tax as a percentage of the amount.
    pub effective_rate: Decimal,
}

impl CantonalTaxResult {
    pub fn total(&self) -> Decimal {
        self.cantonal_tax + self.municipal_tax
    }
}

pub(crate) fn calculate_cantonal(
    registry: &JurisdictionRuleRegistry,
    tax_year: i32,
    kind: RuleKind,
    canton: Canton,
    amount: Decimal,
    marital_status: MaritalStatus,
    municipality: &str,
) -> Result<CantonalTaxResult, TaxError> {
    let rules = registry.rule_set(canton, tax_year, kind)?;
    let threshold = rules.thresholds.for_status(marital_status);
    let resolution = resolve(rules.structure, amount, threshold, &rules.brackets);

    let (municipal_multiplier, multiplier_defaulted) =
        match registry.municipal_multiplier(canton, tax_year, municipality) {
            Some(multiplier) => (multiplier, false),
            None => {
                warn!(
                    %canton,
                    tax_year,
                    municipality,
                    "unknown municipality; applying multiplier 1.0"
                );
                (Decimal::ONE, true)
            }
        };

    let cantonal_tax = round_half_up(resolution.tax);
    let municipal_tax = round_half_up(resolution.tax * municipal_multiplier);

    debug!(
        %canton,
        %kind,
        amount = %amount,
        threshold = %threshold,
        taxable = %resolution.taxable,
        cantonal_tax = %cantonal_tax,
        municipal_tax = %municipal_tax,
        "cantonal tax resolved"
    );

    Ok(CantonalTaxResult {
        canton,
        kind,
        cantonal_tax,
        municipal_tax,
        taxable_base: resolution.taxable,
        threshold,
        municipal_multiplier,
        multiplier_defaulted,
        effective_rate: effective_rate(cantonal_tax + municipal_tax, amount),
    })
}
