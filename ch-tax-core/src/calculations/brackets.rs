//! Bracket resolution for proportional and progressive schedules.
//!
//! Both strategies are pure functions of numbers: they never touch the
//! registry and never round. The amount above the threshold is the taxable
//! base; a progressive schedule then walks its brackets by width, so the
//! result is continuous in the amount and never drops at a bracket boundary.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use ch_tax_core::TaxBracket;
//! use ch_tax_core::calculations::brackets::resolve_progressive;
//!
//! let brackets = vec![
//!     TaxBracket::new(dec!(0), Some(dec!(100000)), dec!(0.0003)),
//!     TaxBracket::new(dec!(100000), Some(dec!(200000)), dec!(0.0005)),
//!     TaxBracket::new(dec!(200000), None, dec!(0.001)),
//! ];
//!
//! let result = resolve_progressive(dec!(500000), dec!(80000), &brackets);
//!
//! assert_eq!(result.taxable, dec!(420000));
//! assert_eq!(result.tax, dec!(300));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::TaxBracket;
use crate::calculations::common::non_negative;
use crate::models::RateStructure;

/// Outcome of resolving an amount against a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketResolution {
    /// Amount above the threshold, never negative.
    pub taxable: Decimal,
    /// Unrounded tax on `taxable`.
    pub tax: Decimal,
}

impl BracketResolution {
    const ZERO: Self = Self {
        taxable: Decimal::ZERO,
        tax: Decimal::ZERO,
    };
}

/// Flat `rate` on everything above `threshold`.
pub fn resolve_proportional(
    amount: Decimal,
    threshold: Decimal,
    rate: Decimal,
) -> BracketResolution {
    let taxable = non_negative(amount - threshold);
    BracketResolution {
        taxable,
        tax: taxable * rate,
    }
}

/// Marginal `brackets` on everything above `threshold`.
///
/// Brackets are consumed in order, each for at most its width. Whatever is
/// left after the last bracket is taxed at the last bracket's rate, so a
/// schedule whose final bracket is bounded still yields a total result.
pub fn resolve_progressive(
    amount: Decimal,
    threshold: Decimal,
    brackets: &[TaxBracket],
) -> BracketResolution {
    let taxable = non_negative(amount - threshold);
    let Some(last) = brackets.last() else {
        return BracketResolution { taxable, ..BracketResolution::ZERO };
    };

    let mut remaining = taxable;
    let mut tax = Decimal::ZERO;

    for bracket in brackets {
        if remaining <= Decimal::ZERO {
            break;
        }
        let slice = match bracket.width() {
            Some(width) => remaining.min(non_negative(width)),
            None => remaining,
        };
        tax += slice * bracket.rate;
        remaining -= slice;
    }

    if remaining > Decimal::ZERO {
        tax += remaining * last.rate;
    }

    BracketResolution { taxable, tax }
}

/// Dispatches on the schedule's structure.
///
/// A proportional schedule uses the rate of its only bracket; an empty
/// proportional schedule taxes nothing.
pub fn resolve(
    structure: RateStructure,
    amount: Decimal,
    threshold: Decimal,
    brackets: &[TaxBracket],
) -> BracketResolution {
    match structure {
        RateStructure::Proportional => {
            let rate = brackets.first().map_or(Decimal::ZERO, |b| b.rate);
            resolve_proportional(amount, threshold, rate)
        }
        RateStructure::Progressive => resolve_progressive(amount, threshold, brackets),
    }
}
