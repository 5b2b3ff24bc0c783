use thiserror::Error;

use crate::models::{Canton, RuleKind};

/// Errors raised by the rule registry and the calculation engines.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxError {
    /// The jurisdiction code is not one of the 26 cantons.
    #[error("unknown jurisdiction '{0}'")]
    InvalidJurisdiction(String),

    /// No rule set is registered for the canton, year and kind.
    #[error("no {kind} rules for {canton} in tax year {tax_year}")]
    RuleNotFound {
        canton: Canton,
        tax_year: i32,
        kind: RuleKind,
    },

    #[error("no federal rules for tax year {0}")]
    FederalRulesNotFound(i32),

    #[error("no year configuration for tax year {0}")]
    YearConfigNotFound(i32),

    /// Rule data violates a structural invariant.
    #[error("invalid rules for {scope}: {reason}")]
    InvalidRuleSet { scope: String, reason: String },
}

impl TaxError {
    pub(crate) fn invalid(
        scope: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRuleSet {
            scope: scope.into(),
            reason: reason.into(),
        }
    }
}

/// Parses a canton code, failing with [`TaxError::InvalidJurisdiction`].
pub fn parse_canton(code: &str) -> Result<Canton, TaxError> {
    Canton::parse(code).ok_or_else(|| TaxError::InvalidJurisdiction(code.to_string()))
}
