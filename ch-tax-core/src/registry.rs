//! Immutable per-tax-year rule data.
//!
//! A [`JurisdictionRuleRegistry`] is assembled once through a
//! [`RuleRegistryBuilder`], which validates every table as it is added, and is
//! read-only afterwards. Engines borrow it; share it across threads behind an
//! `Arc` when needed.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::TaxError;
use crate::models::{
    Canton, ChurchRuleSet, FederalRuleSet, JurisdictionRuleSet, Municipality, MunicipalityTable,
    RateStructure, RuleKind, TaxBracket, YearConfig,
};

#[derive(Debug, Clone, Default)]
pub struct JurisdictionRuleRegistry {
    rule_sets: HashMap<(Canton, i32, RuleKind), JurisdictionRuleSet>,
    church: HashMap<(Canton, i32), ChurchRuleSet>,
    municipalities: HashMap<(Canton, i32), MunicipalityTable>,
    federal: HashMap<i32, FederalRuleSet>,
    years: HashMap<i32, YearConfig>,
}

impl JurisdictionRuleRegistry {
    pub fn builder() -> RuleRegistryBuilder {
        RuleRegistryBuilder::default()
    }

    /// Income or wealth rules for a canton.
    ///
    /// # Errors
    ///
    /// [`TaxError::RuleNotFound`] when nothing is registered for the key.
    pub fn rule_set(
        &self,
        canton: Canton,
        tax_year: i32,
        kind: RuleKind,
    ) -> Result<&JurisdictionRuleSet, TaxError> {
        self.rule_sets
            .get(&(canton, tax_year, kind))
            .ok_or(TaxError::RuleNotFound {
                canton,
                tax_year,
                kind,
            })
    }

    pub fn church_rules(
        &self,
        canton: Canton,
        tax_year: i32,
    ) -> Option<&ChurchRuleSet> {
        self.church.get(&(canton, tax_year))
    }

    pub fn municipality(
        &self,
        canton: Canton,
        tax_year: i32,
        municipality: &str,
    ) -> Option<&Municipality> {
        self.municipalities
            .get(&(canton, tax_year))
            .and_then(|table| table.find(municipality))
    }

    pub fn municipal_multiplier(
        &self,
        canton: Canton,
        tax_year: i32,
        municipality: &str,
    ) -> Option<Decimal> {
        let found = self
            .municipality(canton, tax_year, municipality)
            .map(|m| m.multiplier);
        debug!(%canton, tax_year, municipality, multiplier = ?found, "municipal multiplier lookup");
        found
    }

    pub fn federal_rules(
        &self,
        tax_year: i32,
    ) -> Result<&FederalRuleSet, TaxError> {
        self.federal
            .get(&tax_year)
            .ok_or(TaxError::FederalRulesNotFound(tax_year))
    }

    pub fn year_config(
        &self,
        tax_year: i32,
    ) -> Result<&YearConfig, TaxError> {
        self.years
            .get(&tax_year)
            .ok_or(TaxError::YearConfigNotFound(tax_year))
    }

    /// Every tax year with at least one table, ascending.
    pub fn tax_years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self
            .rule_sets
            .keys()
            .map(|(_, year, _)| *year)
            .chain(self.federal.keys().copied())
            .chain(self.years.keys().copied())
            .collect();
        years.into_iter().collect()
    }

    /// Cantons with income rules for `tax_year`, sorted.
    pub fn cantons(
        &self,
        tax_year: i32,
    ) -> Vec<Canton> {
        let mut cantons: Vec<Canton> = self
            .rule_sets
            .keys()
            .filter(|(_, year, kind)| *year == tax_year && *kind == RuleKind::Income)
            .map(|(canton, _, _)| *canton)
            .collect();
        cantons.sort_unstable();
        cantons
    }
}

/// Collects and validates rule tables before freezing them into a
/// [`JurisdictionRuleRegistry`].
#[derive(Debug, Default)]
pub struct RuleRegistryBuilder {
    inner: JurisdictionRuleRegistry,
}

impl RuleRegistryBuilder {
    /// Adds an income or wealth rule set.
    ///
    /// # Errors
    ///
    /// [`TaxError::InvalidRuleSet`] if the table breaks a bracket invariant,
    /// is a church table, or duplicates an existing key.
    pub fn add_rule_set(
        &mut self,
        rule_set: JurisdictionRuleSet,
    ) -> Result<&mut Self, TaxError> {
        let scope = format!("{} {} {}", rule_set.canton, rule_set.tax_year, rule_set.kind);
        if rule_set.kind == RuleKind::Church {
            return Err(TaxError::invalid(scope, "church rules use ChurchRuleSet"));
        }
        validate_rule_set(&scope, &rule_set)?;

        let key = (rule_set.canton, rule_set.tax_year, rule_set.kind);
        if self.inner.rule_sets.contains_key(&key) {
            return Err(TaxError::invalid(scope, "duplicate rule set"));
        }
        self.inner.rule_sets.insert(key, rule_set);
        Ok(self)
    }

    pub fn add_church_rules(
        &mut self,
        rules: ChurchRuleSet,
    ) -> Result<&mut Self, TaxError> {
        let scope = format!("{} {} church", rules.canton, rules.tax_year);
        validate_church_rules(&scope, &rules)?;

        let key = (rules.canton, rules.tax_year);
        if self.inner.church.contains_key(&key) {
            return Err(TaxError::invalid(scope, "duplicate church rules"));
        }
        self.inner.church.insert(key, rules);
        Ok(self)
    }

    pub fn add_municipalities(
        &mut self,
        table: MunicipalityTable,
    ) -> Result<&mut Self, TaxError> {
        let scope = format!("{} {} municipalities", table.canton, table.tax_year);
        if let Some(m) = table
            .municipalities
            .iter()
            .find(|m| m.multiplier < Decimal::ZERO)
        {
            return Err(TaxError::invalid(
                scope,
                format!("negative multiplier for {}", m.name),
            ));
        }

        let key = (table.canton, table.tax_year);
        if self.inner.municipalities.contains_key(&key) {
            return Err(TaxError::invalid(scope, "duplicate municipality table"));
        }
        self.inner.municipalities.insert(key, table);
        Ok(self)
    }

    pub fn add_federal_rules(
        &mut self,
        rules: FederalRuleSet,
    ) -> Result<&mut Self, TaxError> {
        let scope = format!("federal {}", rules.tax_year);
        validate_brackets(&format!("{scope} single"), RateStructure::Progressive, &rules.single, &[Decimal::ZERO])?;
        validate_brackets(&format!("{scope} married"), RateStructure::Progressive, &rules.married, &[Decimal::ZERO])?;
        if rules.child_tax_reduction < Decimal::ZERO {
            return Err(TaxError::invalid(scope, "negative child tax reduction"));
        }
        if self.inner.federal.contains_key(&rules.tax_year) {
            return Err(TaxError::invalid(scope, "duplicate federal rules"));
        }
        self.inner.federal.insert(rules.tax_year, rules);
        Ok(self)
    }

    pub fn add_year_config(
        &mut self,
        config: YearConfig,
    ) -> Result<&mut Self, TaxError> {
        let scope = format!("year config {}", config.tax_year);
        validate_year_config(&scope, &config)?;
        if self.inner.years.contains_key(&config.tax_year) {
            return Err(TaxError::invalid(scope, "duplicate year configuration"));
        }
        self.inner.years.insert(config.tax_year, config);
        Ok(self)
    }

    pub fn build(self) -> JurisdictionRuleRegistry {
        debug!(
            rule_sets = self.inner.rule_sets.len(),
            church = self.inner.church.len(),
            municipalities = self.inner.municipalities.len(),
            federal = self.inner.federal.len(),
            "rule registry built"
        );
        self.inner
    }
}

fn validate_rule_set(
    scope: &str,
    rule_set: &JurisdictionRuleSet,
) -> Result<(), TaxError> {
    let thresholds = &rule_set.thresholds;
    if thresholds.single < Decimal::ZERO {
        return Err(TaxError::invalid(scope, "negative threshold"));
    }
    if let Some(married) = thresholds.married {
        if married < thresholds.single {
            return Err(TaxError::invalid(
                scope,
                format!(
                    "married threshold {married} is below single threshold {}",
                    thresholds.single
                ),
            ));
        }
    }

    let mut allowed_starts = vec![Decimal::ZERO, thresholds.single];
    allowed_starts.extend(thresholds.married);
    validate_brackets(scope, rule_set.structure, &rule_set.brackets, &allowed_starts)
}

/// Brackets must be non-empty, ascending, contiguous and non-overlapping,
/// start at one of `allowed_starts`, and end with an unbounded bracket.
/// A proportional schedule has exactly one bracket.
fn validate_brackets(
    scope: &str,
    structure: RateStructure,
    brackets: &[TaxBracket],
    allowed_starts: &[Decimal],
) -> Result<(), TaxError> {
    let (first, last) = match (brackets.first(), brackets.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(TaxError::invalid(scope, "no brackets")),
    };

    if structure == RateStructure::Proportional && brackets.len() != 1 {
        return Err(TaxError::invalid(
            scope,
            format!("proportional schedule needs exactly one bracket, got {}", brackets.len()),
        ));
    }
    if !allowed_starts.contains(&first.lower) {
        return Err(TaxError::invalid(
            scope,
            format!("first bracket starts at {}", first.lower),
        ));
    }
    if last.upper.is_some() {
        return Err(TaxError::invalid(scope, "last bracket must be unbounded"));
    }

    for bracket in brackets {
        if bracket.rate < Decimal::ZERO {
            return Err(TaxError::invalid(
                scope,
                format!("negative rate {}", bracket.rate),
            ));
        }
        if let Some(upper) = bracket.upper {
            if upper <= bracket.lower {
                return Err(TaxError::invalid(
                    scope,
                    format!("empty bracket {}..{}", bracket.lower, upper),
                ));
            }
        }
    }

    for pair in brackets.windows(2) {
        match pair[0].upper {
            Some(upper) if upper == pair[1].lower => {}
            Some(upper) => {
                return Err(TaxError::invalid(
                    scope,
                    format!("gap or overlap between {} and {}", upper, pair[1].lower),
                ));
            }
            None => {
                return Err(TaxError::invalid(
                    scope,
                    "only the last bracket may be unbounded",
                ));
            }
        }
    }

    Ok(())
}

fn validate_church_rules(
    scope: &str,
    rules: &ChurchRuleSet,
) -> Result<(), TaxError> {
    for rate in &rules.average_rates {
        if rate.rate < Decimal::ZERO {
            return Err(TaxError::invalid(scope, "negative church rate"));
        }
        if !rules.recognizes(rate.denomination) {
            return Err(TaxError::invalid(
                scope,
                format!("rate for unrecognized denomination {}", rate.denomination.as_str()),
            ));
        }
    }
    if rules.municipal_rates.iter().any(|r| r.rate < Decimal::ZERO) {
        return Err(TaxError::invalid(scope, "negative municipal church rate"));
    }
    Ok(())
}

fn validate_year_config(
    scope: &str,
    config: &YearConfig,
) -> Result<(), TaxError> {
    let ss = &config.social_security;
    if ss.ahv_self_employed_upper_bound < ss.ahv_self_employed_lower_bound {
        return Err(TaxError::invalid(scope, "AHV self-employed bounds are reversed"));
    }
    if ss.bvg_age_bands.is_empty() {
        return Err(TaxError::invalid(scope, "no pension age bands"));
    }
    for pair in ss.bvg_age_bands.windows(2) {
        if pair[1].min_age <= pair[0].max_age {
            return Err(TaxError::invalid(scope, "pension age bands overlap or are unordered"));
        }
        if pair[1].rate < pair[0].rate {
            return Err(TaxError::invalid(scope, "pension rates must increase with age"));
        }
    }
    Ok(())
}
