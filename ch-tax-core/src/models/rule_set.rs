use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Canton, MaritalStatus, TaxBracket};

/// Which base a rule set taxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Income,
    Wealth,
    Church,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Wealth => "wealth",
            Self::Church => "church",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Some(Self::Income),
            "wealth" => Some(Self::Wealth),
            "church" => Some(Self::Church),
            _ => None,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the brackets of a rule set are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateStructure {
    /// One flat rate on everything above the threshold.
    Proportional,
    /// Ordered marginal brackets above the threshold.
    Progressive,
}

impl RateStructure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proportional => "proportional",
            Self::Progressive => "progressive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proportional" | "flat" => Some(Self::Proportional),
            "progressive" => Some(Self::Progressive),
            _ => None,
        }
    }
}

/// Tax-free amount by marital status.
///
/// Cantons without a separate married threshold leave `married` empty and the
/// single amount applies to everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub single: Decimal,
    pub married: Option<Decimal>,
}

impl ThresholdTable {
    pub fn uniform(amount: Decimal) -> Self {
        Self {
            single: amount,
            married: None,
        }
    }

    pub fn for_status(
        &self,
        status: MaritalStatus,
    ) -> Decimal {
        if status.is_joint() {
            self.married.unwrap_or(self.single)
        } else {
            self.single
        }
    }
}

/// Income or wealth tax rules of one canton for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionRuleSet {
    pub canton: Canton,
    pub tax_year: i32,
    pub kind: RuleKind,
    pub structure: RateStructure,
    pub thresholds: ThresholdTable,
    pub brackets: Vec<TaxBracket>,
}

impl JurisdictionRuleSet {
    /// The single rate of a proportional schedule.
    pub fn flat_rate(&self) -> Option<Decimal> {
        match self.structure {
            RateStructure::Proportional => self.brackets.first().map(|b| b.rate),
            RateStructure::Progressive => None,
        }
    }
}
