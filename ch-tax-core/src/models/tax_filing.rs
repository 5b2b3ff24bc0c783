use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Canton, FilingFinancials, PersonalData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingRole {
    /// Filing in the canton of residence.
    Primary,
    /// Filing in a canton where the taxpayer only holds property.
    Secondary,
}

impl FilingRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Draft,
    InProgress,
    Completed,
    Submitted,
}

impl FilingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Submitted => "submitted",
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted)
    }

    /// Filings move forward one step at a time; a completed filing may be
    /// reopened. Nothing leaves `Submitted`.
    pub fn can_transition_to(
        &self,
        next: FilingStatus,
    ) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::InProgress)
                | (Self::InProgress, Self::Completed)
                | (Self::Completed, Self::Submitted)
                | (Self::Completed, Self::InProgress)
        )
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxFiling {
    pub id: i64,
    pub taxpayer_id: i64,
    pub tax_year: i32,
    pub canton: Canton,
    pub municipality: String,
    pub role: FilingRole,
    /// Set for secondary filings only.
    pub parent_filing_id: Option<i64>,
    pub status: FilingStatus,
    pub personal: PersonalData,
    pub financials: FilingFinancials,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TaxFiling {
    pub fn is_primary(&self) -> bool {
        self.role == FilingRole::Primary
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// For creating new filings (no id, status or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaxFiling {
    pub taxpayer_id: i64,
    pub tax_year: i32,
    pub canton: Canton,
    pub municipality: String,
    pub role: FilingRole,
    pub parent_filing_id: Option<i64>,
    pub personal: PersonalData,
    pub financials: FilingFinancials,
}
