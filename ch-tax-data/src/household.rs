//! Household declarations.
//!
//! A household file is a TOML document holding everything needed to open a
//! primary filing:
//!
//! ```toml
//! taxpayer_id = 1
//! tax_year = 2024
//! canton = "ZH"
//! municipality = "Winterthur"
//!
//! [personal]
//! first_name = "Anna"
//! last_name = "Muster"
//! marital_status = "single"
//! denomination = "reformed"
//! date_of_birth = "1984-03-15"
//!
//! [financials.employment]
//! gross_salary = "95000"
//! work_percentage = "100"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use ch_tax_core::{Canton, FilingFinancials, PersonalData, PrimaryFilingRequest};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HouseholdError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid household file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Household {
    pub taxpayer_id: i64,
    pub tax_year: i32,
    pub canton: Canton,
    pub municipality: String,
    pub personal: PersonalData,
    #[serde(default)]
    pub financials: FilingFinancials,
}

impl Household {
    pub fn parse(text: &str) -> Result<Self, HouseholdError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, HouseholdError> {
        let text = fs::read_to_string(path).map_err(|source| HouseholdError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn into_request(self) -> PrimaryFilingRequest {
        PrimaryFilingRequest {
            taxpayer_id: self.taxpayer_id,
            tax_year: self.tax_year,
            canton: self.canton,
            municipality: self.municipality,
            personal: self.personal,
            financials: self.financials,
        }
    }
}
