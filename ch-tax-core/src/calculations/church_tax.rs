//! Church tax.
//!
//! Church tax is a surcharge on the cantonal tax: a denomination-specific
//! rate multiplies the cantonal amount. Missing church data never fails the
//! calculation; the result says why no church tax applies instead.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::round_half_up;
use crate::models::{Canton, Denomination};
use crate::registry::JurisdictionRuleRegistry;

/// Why a church tax result is not applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotApplicableReason {
    UserNotMember,
    CantonNotFound,
    JurisdictionNoTax,
    DenominationNotRecognized,
    RateNotFound,
}

impl NotApplicableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserNotMember => "user_not_member",
            Self::CantonNotFound => "canton_not_found",
            Self::JurisdictionNoTax => "jurisdiction_no_tax",
            Self::DenominationNotRecognized => "denomination_not_recognized",
            Self::RateNotFound => "rate_not_found",
        }
    }
}

impl fmt::Display for NotApplicableReason {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the applied church rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Municipal,
    CantonalAverage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurchTaxResult {
    pub applies: bool,
    pub reason: Option<NotApplicableReason>,
    pub denomination: Denomination,
    pub rate: Decimal,
    pub rate_source: Option<RateSource>,
    pub tax: Decimal,
}

impl ChurchTaxResult {
    fn not_applicable(
        denomination: Denomination,
        reason: NotApplicableReason,
    ) -> Self {
        Self {
            applies: false,
            reason: Some(reason),
            denomination,
            rate: Decimal::ZERO,
            rate_source: None,
            tax: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChurchTaxEngine<'a> {
    registry: &'a JurisdictionRuleRegistry,
    tax_year: i32,
}

impl<'a> ChurchTaxEngine<'a> {
    pub fn new(
        registry: &'a JurisdictionRuleRegistry,
        tax_year: i32,
    ) -> Self {
        Self { registry, tax_year }
    }

    /// Church tax on `cantonal_tax` for a member of `denomination`.
    ///
    /// The rate is looked up for the municipality first and falls back to the
    /// canton's average for the denomination.
    pub fn calculate(
        &self,
        canton: Canton,
        cantonal_tax: Decimal,
        denomination: Denomination,
        municipality: &str,
    ) -> ChurchTaxResult {
        use NotApplicableReason::*;

        if !denomination.is_member() {
            return ChurchTaxResult::not_applicable(denomination, UserNotMember);
        }

        let Some(rules) = self.registry.church_rules(canton, self.tax_year) else {
            debug!(%canton, tax_year = self.tax_year, "no church rules");
            return ChurchTaxResult::not_applicable(denomination, CantonNotFound);
        };

        if !rules.levies_church_tax {
            return ChurchTaxResult::not_applicable(denomination, JurisdictionNoTax);
        }
        if !rules.recognizes(denomination) {
            return ChurchTaxResult::not_applicable(denomination, DenominationNotRecognized);
        }

        let (rate, source) = match rules.municipal_rate(municipality, denomination) {
            Some(rate) => (rate, RateSource::Municipal),
            None => match rules.average_rate(denomination) {
                Some(rate) => (rate, RateSource::CantonalAverage),
                None => {
                    debug!(%canton, denomination = denomination.as_str(), "no church rate");
                    return ChurchTaxResult::not_applicable(denomination, RateNotFound);
                }
            },
        };

        let base = cantonal_tax.max(Decimal::ZERO);

        ChurchTaxResult {
            applies: true,
            reason: None,
            denomination,
            rate,
            rate_source: Some(source),
            tax: round_half_up(base * rate),
        }
    }
}
