use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Canton, Denomination};

/// A church tax rate expressed as a fraction of the cantonal tax amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurchRate {
    pub denomination: Denomination,
    pub rate: Decimal,
}

/// A church tax rate that overrides the cantonal average in one municipality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalChurchRate {
    pub municipality: String,
    pub denomination: Denomination,
    pub rate: Decimal,
}

/// Church tax rules of one canton for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurchRuleSet {
    pub canton: Canton,
    pub tax_year: i32,
    pub levies_church_tax: bool,
    pub recognized: Vec<Denomination>,
    pub average_rates: Vec<ChurchRate>,
    pub municipal_rates: Vec<MunicipalChurchRate>,
}

impl ChurchRuleSet {
    pub fn recognizes(
        &self,
        denomination: Denomination,
    ) -> bool {
        self.recognized.contains(&denomination)
    }

    pub fn average_rate(
        &self,
        denomination: Denomination,
    ) -> Option<Decimal> {
        self.average_rates
            .iter()
            .find(|r| r.denomination == denomination)
            .map(|r| r.rate)
    }

    /// Rate for `denomination` in `municipality`; the municipality is matched
    /// by name or BFS number, ignoring case.
    pub fn municipal_rate(
        &self,
        municipality: &str,
        denomination: Denomination,
    ) -> Option<Decimal> {
        let key = municipality.trim();
        self.municipal_rates
            .iter()
            .find(|r| r.denomination == denomination && r.municipality.trim().eq_ignore_ascii_case(key))
            .map(|r| r.rate)
    }
}
