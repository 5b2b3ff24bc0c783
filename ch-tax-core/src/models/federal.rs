use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{MaritalStatus, TaxBracket};

/// Direct federal tax tariffs for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalRuleSet {
    pub tax_year: i32,
    pub single: Vec<TaxBracket>,
    pub married: Vec<TaxBracket>,
    /// Amount subtracted from the computed tax for each dependent child.
    pub child_tax_reduction: Decimal,
}

impl FederalRuleSet {
    pub fn brackets_for(
        &self,
        status: MaritalStatus,
    ) -> &[TaxBracket] {
        if status.is_joint() {
            &self.married
        } else {
            &self.single
        }
    }
}
