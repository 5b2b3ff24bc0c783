//! Small 2024 rule set shared by the unit tests.
//!
//! The numbers are chosen for easy arithmetic, not taken from any tariff.

use rust_decimal_macros::dec;

use crate::models::{
    Canton, ChurchRate, ChurchRuleSet, DeductionLimits, Denomination, FederalRuleSet,
    JurisdictionRuleSet, MunicipalChurchRate, Municipality, MunicipalityTable, PensionAgeBand,
    RateStructure, RuleKind, SocialSecurityConfig, TaxBracket, ThresholdTable, YearConfig,
};
use crate::registry::JurisdictionRuleRegistry;

pub(crate) fn year_config() -> YearConfig {
    YearConfig {
        tax_year: 2024,
        social_security: SocialSecurityConfig {
            ahv_rate: dec!(0.106),
            ahv_self_employed_lower_bound: dec!(10100),
            ahv_self_employed_upper_bound: dec!(60500),
            ahv_self_employed_low_rate: dec!(0.05371),
            ahv_self_employed_band_contribution: dec!(2650),
            ahv_self_employed_high_rate: dec!(0.10),
            alv_rate: dec!(0.022),
            alv_ceiling: dec!(148200),
            alv_solidarity_rate: dec!(0.01),
            nbu_min_work_percentage: dec!(20),
            nbu_default_rate: dec!(0.014),
            bvg_entry_threshold: dec!(22050),
            bvg_coordination_deduction: dec!(25725),
            bvg_max_insured_salary: dec!(88200),
            bvg_entry_age: 25,
            bvg_age_bands: vec![
                PensionAgeBand {
                    min_age: 25,
                    max_age: 34,
                    rate: dec!(0.07),
                },
                PensionAgeBand {
                    min_age: 35,
                    max_age: 44,
                    rate: dec!(0.10),
                },
                PensionAgeBand {
                    min_age: 45,
                    max_age: 54,
                    rate: dec!(0.15),
                },
                PensionAgeBand {
                    min_age: 55,
                    max_age: 65,
                    rate: dec!(0.18),
                },
            ],
        },
        deductions: DeductionLimits {
            pillar_3a_with_pension: dec!(7056),
            pillar_3a_without_pension_rate: dec!(0.20),
            pillar_3a_without_pension_max: dec!(35280),
            professional_expense_rate: dec!(0.03),
            professional_expense_min: dec!(2000),
            professional_expense_max: dec!(4000),
            insurance_premium_single: dec!(1800),
            insurance_premium_married: dec!(3600),
            insurance_premium_per_child: dec!(700),
            child_deduction: dec!(6700),
            property_maintenance_flat_rate: dec!(0.20),
        },
    }
}

fn rule_set(
    canton: Canton,
    kind: RuleKind,
    structure: RateStructure,
    thresholds: ThresholdTable,
    brackets: Vec<TaxBracket>,
) -> JurisdictionRuleSet {
    JurisdictionRuleSet {
        canton,
        tax_year: 2024,
        kind,
        structure,
        thresholds,
        brackets,
    }
}

fn municipality(
    bfs_id: u32,
    name: &str,
    multiplier: rust_decimal::Decimal,
) -> Municipality {
    Municipality {
        bfs_id,
        name: name.to_string(),
        multiplier,
    }
}

pub(crate) fn registry() -> JurisdictionRuleRegistry {
    let mut builder = JurisdictionRuleRegistry::builder();

    builder
        .add_rule_set(rule_set(
            Canton::Zurich,
            RuleKind::Income,
            RateStructure::Progressive,
            ThresholdTable {
                single: dec!(10000),
                married: Some(dec!(20000)),
            },
            vec![
                TaxBracket::new(dec!(0), Some(dec!(20000)), dec!(0.02)),
                TaxBracket::new(dec!(20000), Some(dec!(60000)), dec!(0.05)),
                TaxBracket::new(dec!(60000), None, dec!(0.10)),
            ],
        ))
        .unwrap()
        .add_rule_set(rule_set(
            Canton::Zurich,
            RuleKind::Wealth,
            RateStructure::Progressive,
            ThresholdTable {
                single: dec!(80000),
                married: Some(dec!(160000)),
            },
            vec![
                TaxBracket::new(dec!(0), Some(dec!(100000)), dec!(0.0003)),
                TaxBracket::new(dec!(100000), Some(dec!(200000)), dec!(0.0005)),
                TaxBracket::new(dec!(200000), Some(dec!(500000)), dec!(0.001)),
                TaxBracket::new(dec!(500000), None, dec!(0.0015)),
            ],
        ))
        .unwrap()
        .add_rule_set(rule_set(
            Canton::Zug,
            RuleKind::Income,
            RateStructure::Proportional,
            ThresholdTable::uniform(dec!(5000)),
            vec![TaxBracket::new(dec!(0), None, dec!(0.06))],
        ))
        .unwrap()
        .add_rule_set(rule_set(
            Canton::Zug,
            RuleKind::Wealth,
            RateStructure::Proportional,
            ThresholdTable::uniform(dec!(35000)),
            vec![TaxBracket::new(dec!(0), None, dec!(0.00025))],
        ))
        .unwrap()
        .add_rule_set(rule_set(
            Canton::Valais,
            RuleKind::Income,
            RateStructure::Progressive,
            ThresholdTable::uniform(dec!(0)),
            vec![
                TaxBracket::new(dec!(0), Some(dec!(50000)), dec!(0.04)),
                TaxBracket::new(dec!(50000), None, dec!(0.08)),
            ],
        ))
        .unwrap()
        .add_rule_set(rule_set(
            Canton::Valais,
            RuleKind::Wealth,
            RateStructure::Proportional,
            ThresholdTable {
                single: dec!(30000),
                married: Some(dec!(60000)),
            },
            vec![TaxBracket::new(dec!(0), None, dec!(0.002))],
        ))
        .unwrap();

    builder
        .add_municipalities(MunicipalityTable {
            canton: Canton::Zurich,
            tax_year: 2024,
            municipalities: vec![
                municipality(261, "Zürich", dec!(1.19)),
                municipality(230, "Winterthur", dec!(1.25)),
            ],
        })
        .unwrap()
        .add_municipalities(MunicipalityTable {
            canton: Canton::Zug,
            tax_year: 2024,
            municipalities: vec![municipality(1711, "Zug", dec!(0.50))],
        })
        .unwrap()
        .add_municipalities(MunicipalityTable {
            canton: Canton::Valais,
            tax_year: 2024,
            municipalities: vec![
                municipality(6266, "Sion", dec!(1.10)),
                municipality(6300, "Zermatt", dec!(1.00)),
            ],
        })
        .unwrap();

    builder
        .add_church_rules(ChurchRuleSet {
            canton: Canton::Zurich,
            tax_year: 2024,
            levies_church_tax: true,
            recognized: vec![
                Denomination::Reformed,
                Denomination::RomanCatholic,
                Denomination::ChristCatholic,
            ],
            average_rates: vec![
                ChurchRate {
                    denomination: Denomination::Reformed,
                    rate: dec!(0.10),
                },
                ChurchRate {
                    denomination: Denomination::RomanCatholic,
                    rate: dec!(0.11),
                },
            ],
            municipal_rates: vec![MunicipalChurchRate {
                municipality: "Winterthur".to_string(),
                denomination: Denomination::Reformed,
                rate: dec!(0.12),
            }],
        })
        .unwrap()
        .add_church_rules(ChurchRuleSet {
            canton: Canton::Zug,
            tax_year: 2024,
            levies_church_tax: true,
            recognized: vec![Denomination::Reformed, Denomination::RomanCatholic],
            average_rates: vec![
                ChurchRate {
                    denomination: Denomination::Reformed,
                    rate: dec!(0.06),
                },
                ChurchRate {
                    denomination: Denomination::RomanCatholic,
                    rate: dec!(0.08),
                },
            ],
            municipal_rates: Vec::new(),
        })
        .unwrap()
        .add_church_rules(ChurchRuleSet {
            canton: Canton::Valais,
            tax_year: 2024,
            levies_church_tax: false,
            recognized: Vec::new(),
            average_rates: Vec::new(),
            municipal_rates: Vec::new(),
        })
        .unwrap();

    builder
        .add_federal_rules(FederalRuleSet {
            tax_year: 2024,
            single: vec![
                TaxBracket::new(dec!(0), Some(dec!(20000)), dec!(0)),
                TaxBracket::new(dec!(20000), Some(dec!(50000)), dec!(0.01)),
                TaxBracket::new(dec!(50000), Some(dec!(100000)), dec!(0.04)),
                TaxBracket::new(dec!(100000), None, dec!(0.10)),
            ],
            married: vec![
                TaxBracket::new(dec!(0), Some(dec!(30000)), dec!(0)),
                TaxBracket::new(dec!(30000), Some(dec!(60000)), dec!(0.01)),
                TaxBracket::new(dec!(60000), Some(dec!(120000)), dec!(0.03)),
                TaxBracket::new(dec!(120000), None, dec!(0.09)),
            ],
            child_tax_reduction: dec!(250),
        })
        .unwrap()
        .add_year_config(year_config())
        .unwrap();

    builder.build()
}
