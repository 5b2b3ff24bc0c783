use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A contiguous income or wealth range taxed at one marginal rate.
///
/// `upper` is `None` for the final, unbounded bracket. Rates are fractions
/// (`0.0003` is 0.3‰).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        lower: Decimal,
        upper: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self { lower, upper, rate }
    }

    /// Width of the bracket, or `None` when unbounded.
    pub fn width(&self) -> Option<Decimal> {
        self.upper.map(|upper| upper - self.lower)
    }
}
