//! Rule data loading from CSV and TOML files.
//!
//! A rule-data directory holds:
//!
//! | File | Content |
//! |------|---------|
//! | `rule_sets.csv` | one row per (canton, year, income/wealth): structure and thresholds |
//! | `brackets.csv` | the brackets of those rule sets |
//! | `municipalities.csv` | municipal multipliers |
//! | `church.csv` | church tax per (canton, year, denomination); optional |
//! | `church_municipal.csv` | municipality-specific church rates; optional |
//! | `federal.csv` | federal single and married tariffs |
//! | `years/*.toml` | social-security parameters and deduction limits per year |
//!
//! Everything is validated by [`RuleRegistryBuilder`] before a registry is
//! returned.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use ch_tax_core::{
    Canton, ChurchRate, ChurchRuleSet, DeductionLimits, Denomination, FederalRuleSet,
    JurisdictionRuleRegistry, JurisdictionRuleSet, MunicipalChurchRate, Municipality,
    MunicipalityTable, RateStructure, RuleKind, RuleRegistryBuilder, SocialSecurityConfig,
    TaxBracket, TaxError, ThresholdTable, YearConfig,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

pub const RULE_SETS_FILE: &str = "rule_sets.csv";
pub const BRACKETS_FILE: &str = "brackets.csv";
pub const MUNICIPALITIES_FILE: &str = "municipalities.csv";
pub const CHURCH_FILE: &str = "church.csv";
pub const CHURCH_MUNICIPAL_FILE: &str = "church_municipal.csv";
pub const FEDERAL_FILE: &str = "federal.csv";
pub const YEARS_DIR: &str = "years";

/// Errors that can occur when loading rule data.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("TOML parse error: {0}")]
    Toml(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A field holds a value outside its allowed set.
    #[error("{file} row {row}: invalid {field} '{value}'")]
    InvalidValue {
        file: &'static str,
        row: usize,
        field: &'static str,
        value: String,
    },

    /// A row refers to a table that does not exist.
    #[error("{file} row {row}: {reason}")]
    Unmatched {
        file: &'static str,
        row: usize,
        reason: String,
    },

    #[error("Invalid rule data: {0}")]
    Rules(#[from] TaxError),
}

impl From<csv::Error> for LoaderError {
    fn from(err: csv::Error) -> Self {
        LoaderError::CsvParse(err.to_string())
    }
}

impl From<toml::de::Error> for LoaderError {
    fn from(err: toml::de::Error) -> Self {
        LoaderError::Toml(err.to_string())
    }
}

impl LoaderError {
    fn io(
        path: &Path,
        source: io::Error,
    ) -> Self {
        LoaderError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A row of `rule_sets.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RuleSetRecord {
    pub canton: String,
    pub tax_year: i32,
    pub kind: String,
    pub structure: String,
    pub threshold_single: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub threshold_married: Option<Decimal>,
}

/// A row of `brackets.csv`. An empty `upper` means unbounded.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub canton: String,
    pub tax_year: i32,
    pub kind: String,
    pub lower: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

/// A row of `municipalities.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MunicipalityRecord {
    pub canton: String,
    pub tax_year: i32,
    pub bfs_id: u32,
    pub name: String,
    pub multiplier: Decimal,
}

/// A row of `church.csv`.
///
/// A canton without church tax is a single row with `levies_church_tax`
/// false and an empty denomination. A recognized denomination without an
/// average rate leaves `average_rate` empty.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChurchRecord {
    pub canton: String,
    pub tax_year: i32,
    pub levies_church_tax: bool,
    pub denomination: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub average_rate: Option<Decimal>,
}

/// A row of `church_municipal.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChurchMunicipalRecord {
    pub canton: String,
    pub tax_year: i32,
    pub municipality: String,
    pub denomination: String,
    pub rate: Decimal,
}

/// A row of `federal.csv`; `tariff` is `single` or `married`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FederalRecord {
    pub tax_year: i32,
    pub tariff: String,
    pub lower: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

/// One `years/*.toml` file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct YearConfigFile {
    pub tax_year: i32,
    pub federal: FederalSection,
    pub social_security: SocialSecurityConfig,
    pub deductions: DeductionLimits,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FederalSection {
    pub child_tax_reduction: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Parsed content of a rule-data directory, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleData {
    pub rule_sets: Vec<RuleSetRecord>,
    pub brackets: Vec<BracketRecord>,
    pub municipalities: Vec<MunicipalityRecord>,
    pub church: Vec<ChurchRecord>,
    pub church_municipal: Vec<ChurchMunicipalRecord>,
    pub federal: Vec<FederalRecord>,
    pub years: Vec<YearConfigFile>,
}

/// Loader for rule data.
pub struct RuleDataLoader;

impl RuleDataLoader {
    /// Parse CSV records from any reader, such as a file or a string slice.
    pub fn parse_csv<T, R>(reader: R) -> Result<Vec<T>, LoaderError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: T = result?;
            records.push(record);
        }

        Ok(records)
    }

    pub fn parse_year_config(text: &str) -> Result<YearConfigFile, LoaderError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and validate every table under `dir`.
    pub fn load_dir(dir: &Path) -> Result<JurisdictionRuleRegistry, LoaderError> {
        let data = Self::read_dir(dir)?;
        let registry = Self::build(&data)?;
        info!(
            dir = %dir.display(),
            years = ?registry.tax_years(),
            "rule data loaded"
        );
        Ok(registry)
    }

    /// Parse every table under `dir` without validating it.
    pub fn read_dir(dir: &Path) -> Result<RuleData, LoaderError> {
        let mut years = Vec::new();
        for path in toml_files(&dir.join(YEARS_DIR))? {
            let text = fs::read_to_string(&path).map_err(|e| LoaderError::io(&path, e))?;
            years.push(Self::parse_year_config(&text)?);
        }

        Ok(RuleData {
            rule_sets: read_csv(dir, RULE_SETS_FILE, true)?,
            brackets: read_csv(dir, BRACKETS_FILE, true)?,
            municipalities: read_csv(dir, MUNICIPALITIES_FILE, true)?,
            church: read_csv(dir, CHURCH_FILE, false)?,
            church_municipal: read_csv(dir, CHURCH_MUNICIPAL_FILE, false)?,
            federal: read_csv(dir, FEDERAL_FILE, true)?,
            years,
        })
    }

    /// Turns parsed records into a validated registry.
    pub fn build(data: &RuleData) -> Result<JurisdictionRuleRegistry, LoaderError> {
        let mut builder = JurisdictionRuleRegistry::builder();

        add_rule_sets(&mut builder, &data.rule_sets, &data.brackets)?;
        add_municipalities(&mut builder, &data.municipalities)?;
        add_church_rules(&mut builder, &data.church, &data.church_municipal)?;
        add_federal_rules(&mut builder, &data.federal, &data.years)?;

        for year in &data.years {
            builder.add_year_config(YearConfig {
                tax_year: year.tax_year,
                social_security: year.social_security.clone(),
                deductions: year.deductions.clone(),
            })?;
        }

        Ok(builder.build())
    }
}

fn read_csv<T: DeserializeOwned>(
    dir: &Path,
    name: &'static str,
    required: bool,
) -> Result<Vec<T>, LoaderError> {
    let path = dir.join(name);
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) if !required && e.kind() == io::ErrorKind::NotFound => {
            debug!(file = name, "optional rule file not present");
            return Ok(Vec::new());
        }
        Err(e) => return Err(LoaderError::io(&path, e)),
    };

    let records = RuleDataLoader::parse_csv(file).map_err(|e| match e {
        LoaderError::CsvParse(message) => LoaderError::CsvParse(format!("{name}: {message}")),
        other => other,
    })?;
    debug!(file = name, records = records.len(), "parsed rule file");
    Ok(records)
}

fn toml_files(dir: &Path) -> Result<Vec<PathBuf>, LoaderError> {
    let entries = fs::read_dir(dir).map_err(|e| LoaderError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| LoaderError::io(dir, e))?.path();
        if path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// CSV row number of the record at `index`; row 1 is the header.
fn row(index: usize) -> usize {
    index + 2
}

fn canton(
    file: &'static str,
    row: usize,
    value: &str,
) -> Result<Canton, LoaderError> {
    Canton::parse(value).ok_or_else(|| invalid(file, row, "canton", value))
}

fn denomination(
    file: &'static str,
    row: usize,
    value: &str,
) -> Result<Denomination, LoaderError> {
    Denomination::parse(value).ok_or_else(|| invalid(file, row, "denomination", value))
}

fn kind(
    file: &'static str,
    row: usize,
    value: &str,
) -> Result<RuleKind, LoaderError> {
    match RuleKind::parse(value) {
        Some(kind @ (RuleKind::Income | RuleKind::Wealth)) => Ok(kind),
        _ => Err(invalid(file, row, "kind", value)),
    }
}

fn invalid(
    file: &'static str,
    row: usize,
    field: &'static str,
    value: &str,
) -> LoaderError {
    LoaderError::InvalidValue {
        file,
        row,
        field,
        value: value.to_string(),
    }
}

type RuleKey = (Canton, i32, RuleKind);

fn add_rule_sets(
    builder: &mut RuleRegistryBuilder,
    rule_sets: &[RuleSetRecord],
    brackets: &[BracketRecord],
) -> Result<(), LoaderError> {
    // First row of each group, for error reporting.
    let mut groups: BTreeMap<RuleKey, (usize, Vec<TaxBracket>)> = BTreeMap::new();
    for (index, record) in brackets.iter().enumerate() {
        let row = row(index);
        let key = (
            canton(BRACKETS_FILE, row, &record.canton)?,
            record.tax_year,
            kind(BRACKETS_FILE, row, &record.kind)?,
        );
        groups
            .entry(key)
            .or_insert_with(|| (row, Vec::new()))
            .1
            .push(TaxBracket::new(record.lower, record.upper, record.rate));
    }

    for (index, record) in rule_sets.iter().enumerate() {
        let row = row(index);
        let canton = canton(RULE_SETS_FILE, row, &record.canton)?;
        let kind = kind(RULE_SETS_FILE, row, &record.kind)?;
        let structure = RateStructure::parse(&record.structure)
            .ok_or_else(|| invalid(RULE_SETS_FILE, row, "structure", &record.structure))?;

        let mut brackets = groups
            .remove(&(canton, record.tax_year, kind))
            .map(|(_, brackets)| brackets)
            .unwrap_or_default();
        brackets.sort_by(|a, b| a.lower.cmp(&b.lower));

        builder.add_rule_set(JurisdictionRuleSet {
            canton,
            tax_year: record.tax_year,
            kind,
            structure,
            thresholds: ThresholdTable {
                single: record.threshold_single,
                married: record.threshold_married,
            },
            brackets,
        })?;
    }

    if let Some(((canton, tax_year, kind), (row, _))) = groups.into_iter().next() {
        return Err(LoaderError::Unmatched {
            file: BRACKETS_FILE,
            row,
            reason: format!("no {kind} rule set for {canton} in {tax_year}"),
        });
    }
    Ok(())
}

fn add_municipalities(
    builder: &mut RuleRegistryBuilder,
    records: &[MunicipalityRecord],
) -> Result<(), LoaderError> {
    let mut tables: BTreeMap<(Canton, i32), Vec<Municipality>> = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        let canton = canton(MUNICIPALITIES_FILE, row(index), &record.canton)?;
        tables.entry((canton, record.tax_year)).or_default().push(Municipality {
            bfs_id: record.bfs_id,
            name: record.name.clone(),
            multiplier: record.multiplier,
        });
    }

    for ((canton, tax_year), municipalities) in tables {
        builder.add_municipalities(MunicipalityTable {
            canton,
            tax_year,
            municipalities,
        })?;
    }
    Ok(())
}

fn add_church_rules(
    builder: &mut RuleRegistryBuilder,
    records: &[ChurchRecord],
    municipal: &[ChurchMunicipalRecord],
) -> Result<(), LoaderError> {
    let mut rules: BTreeMap<(Canton, i32), ChurchRuleSet> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        let row = row(index);
        let canton = canton(CHURCH_FILE, row, &record.canton)?;
        let denomination = denomination(CHURCH_FILE, row, &record.denomination)?;

        let entry = rules.entry((canton, record.tax_year)).or_insert_with(|| ChurchRuleSet {
            canton,
            tax_year: record.tax_year,
            levies_church_tax: record.levies_church_tax,
            recognized: Vec::new(),
            average_rates: Vec::new(),
            municipal_rates: Vec::new(),
        });
        if entry.levies_church_tax != record.levies_church_tax {
            return Err(invalid(
                CHURCH_FILE,
                row,
                "levies_church_tax",
                &record.levies_church_tax.to_string(),
            ));
        }
        if !denomination.is_member() {
            continue;
        }

        entry.recognized.push(denomination);
        if let Some(rate) = record.average_rate {
            entry.average_rates.push(ChurchRate { denomination, rate });
        }
    }

    for (index, record) in municipal.iter().enumerate() {
        let row = row(index);
        let canton = canton(CHURCH_MUNICIPAL_FILE, row, &record.canton)?;
        let denomination = denomination(CHURCH_MUNICIPAL_FILE, row, &record.denomination)?;

        let Some(entry) = rules.get_mut(&(canton, record.tax_year)) else {
            return Err(LoaderError::Unmatched {
                file: CHURCH_MUNICIPAL_FILE,
                row,
                reason: format!("no church rules for {canton} in {}", record.tax_year),
            });
        };
        entry.municipal_rates.push(MunicipalChurchRate {
            municipality: record.municipality.clone(),
            denomination,
            rate: record.rate,
        });
    }

    for church in rules.into_values() {
        builder.add_church_rules(church)?;
    }
    Ok(())
}

fn add_federal_rules(
    builder: &mut RuleRegistryBuilder,
    records: &[FederalRecord],
    years: &[YearConfigFile],
) -> Result<(), LoaderError> {
    // (single, married, first row)
    let mut tariffs: BTreeMap<i32, (Vec<TaxBracket>, Vec<TaxBracket>, usize)> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        let row = row(index);
        let (single, married, _) = tariffs
            .entry(record.tax_year)
            .or_insert_with(|| (Vec::new(), Vec::new(), row));
        let bracket = TaxBracket::new(record.lower, record.upper, record.rate);

        match record.tariff.trim().to_ascii_lowercase().as_str() {
            "single" => single.push(bracket),
            "married" => married.push(bracket),
            _ => return Err(invalid(FEDERAL_FILE, row, "tariff", &record.tariff)),
        }
    }

    for (tax_year, (mut single, mut married, row)) in tariffs {
        let Some(year) = years.iter().find(|y| y.tax_year == tax_year) else {
            return Err(LoaderError::Unmatched {
                file: FEDERAL_FILE,
                row,
                reason: format!("no year configuration for {tax_year}"),
            });
        };
        single.sort_by(|a, b| a.lower.cmp(&b.lower));
        married.sort_by(|a, b| a.lower.cmp(&b.lower));

        builder.add_federal_rules(FederalRuleSet {
            tax_year,
            single,
            married,
            child_tax_reduction: year.federal.child_tax_reduction,
        })?;
    }
    Ok(())
}
