//! Filing orchestration.
//!
//! A taxpayer has exactly one primary filing per tax year, in the canton of
//! residence. Property held in other cantons is declared in secondary
//! filings, one per canton, each linked to the primary. Secondaries carry a
//! copy of the primary's identity fields (see [`PersonalData::inherited`])
//! and only the property located in their own canton.
//!
//! Status flow: draft → in progress → completed → submitted. A completed
//! filing may be reopened; a submitted one is frozen.

use std::sync::Arc;

use tracing::{info, warn};

use super::error::FilingError;
use crate::db::{FilingRepository, RepositoryError};
use crate::models::{
    Canton, FilingFinancials, FilingRole, FilingStatus, NewTaxFiling, PersonalData, TaxFiling,
};

/// Input for [`FilingOrchestrator::create_primary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryFilingRequest {
    pub taxpayer_id: i64,
    pub tax_year: i32,
    pub canton: Canton,
    pub municipality: String,
    pub personal: PersonalData,
    pub financials: FilingFinancials,
}

pub struct FilingOrchestrator {
    repo: Arc<dyn FilingRepository>,
}

impl FilingOrchestrator {
    pub fn new(repo: Arc<dyn FilingRepository>) -> Self {
        Self { repo }
    }

    /// Creates the taxpayer's primary filing for the year.
    ///
    /// # Errors
    ///
    /// [`FilingError::InvalidFilingRelationship`] when a live primary already
    /// exists for the taxpayer and year.
    pub async fn create_primary(
        &self,
        request: PrimaryFilingRequest,
    ) -> Result<TaxFiling, FilingError> {
        let (taxpayer_id, tax_year) = (request.taxpayer_id, request.tax_year);

        if let Some(existing) = self.repo.find_primary(taxpayer_id, tax_year).await? {
            return Err(primary_exists(&existing));
        }

        let new = NewTaxFiling {
            taxpayer_id,
            tax_year,
            canton: request.canton,
            municipality: request.municipality,
            role: FilingRole::Primary,
            parent_filing_id: None,
            personal: request.personal,
            financials: request.financials,
        };

        let filing = match self.repo.insert_filing(new).await {
            Ok(filing) => filing,
            Err(RepositoryError::UniqueViolation(_)) => {
                return match self.repo.find_primary(taxpayer_id, tax_year).await? {
                    Some(existing) => Err(primary_exists(&existing)),
                    None => Err(FilingError::InvalidFilingRelationship(format!(
                        "a primary filing already exists for taxpayer {taxpayer_id} in {tax_year}"
                    ))),
                };
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            filing_id = filing.id,
            taxpayer_id,
            tax_year,
            canton = %filing.canton,
            "created primary filing"
        );
        Ok(filing)
    }

    /// Makes sure a secondary filing exists for every canton in `cantons`.
    ///
    /// The primary's own canton is skipped and repeated cantons are handled
    /// once. Existing secondaries are returned as they are; new ones inherit
    /// the primary's identity fields and start without financial data.
    /// Calling this again with the same cantons changes nothing.
    pub async fn auto_create_secondary(
        &self,
        primary_id: i64,
        cantons: &[Canton],
    ) -> Result<Vec<TaxFiling>, FilingError> {
        let primary = self.load_primary(primary_id).await?;

        let mut wanted: Vec<Canton> = Vec::with_capacity(cantons.len());
        for &canton in cantons {
            if canton != primary.canton && !wanted.contains(&canton) {
                wanted.push(canton);
            }
        }

        let mut secondaries = Vec::with_capacity(wanted.len());
        for canton in wanted {
            secondaries.push(self.ensure_secondary(&primary, canton).await?);
        }
        Ok(secondaries)
    }

    /// Creates a secondary for every canton outside the primary's in which
    /// the primary declares property, and hands each secondary the property
    /// located in its canton. Submitted secondaries are left as they are.
    pub async fn declare_property_filings(
        &self,
        primary_id: i64,
    ) -> Result<Vec<TaxFiling>, FilingError> {
        let primary = self.load_primary(primary_id).await?;
        let cantons = primary.financials.property_cantons_outside(primary.canton);

        let mut secondaries = Vec::with_capacity(cantons.len());
        for mut secondary in self.auto_create_secondary(primary_id, &cantons).await? {
            if secondary.status.is_submitted() {
                warn!(filing_id = secondary.id, "secondary already submitted; property not updated");
                secondaries.push(secondary);
                continue;
            }
            secondary.financials = primary.financials.local_property(secondary.canton);
            secondaries.push(self.repo.update_filing(&secondary).await?);
        }
        Ok(secondaries)
    }

    /// Re-applies the primary's identity fields to every linked secondary.
    /// Financial data and filing-local personal fields are left untouched;
    /// submitted secondaries are skipped.
    pub async fn sync_personal_data(
        &self,
        primary_id: i64,
    ) -> Result<Vec<TaxFiling>, FilingError> {
        let primary = self.load_primary(primary_id).await?;
        let secondaries = self.repo.list_secondaries(primary.id).await?;

        let mut synced = Vec::with_capacity(secondaries.len());
        for mut secondary in secondaries {
            if secondary.status.is_submitted() {
                warn!(
                    filing_id = secondary.id,
                    primary_id, "skipping personal data sync for submitted secondary"
                );
                continue;
            }
            secondary.personal.apply_inherited(&primary.personal);
            synced.push(self.repo.update_filing(&secondary).await?);
        }

        info!(primary_id, synced = synced.len(), "personal data synced");
        Ok(synced)
    }

    /// Replaces the primary's personal data and syncs it to the secondaries.
    pub async fn update_personal_data(
        &self,
        primary_id: i64,
        personal: PersonalData,
    ) -> Result<TaxFiling, FilingError> {
        let mut primary = self.load_primary(primary_id).await?;
        ensure_mutable(&primary)?;

        primary.personal = personal;
        let primary = self.repo.update_filing(&primary).await?;
        self.sync_personal_data(primary.id).await?;
        Ok(primary)
    }

    /// Soft-deletes a filing.
    ///
    /// # Errors
    ///
    /// [`FilingError::SubmittedFilingMutation`] for submitted filings and
    /// for secondaries whose primary is submitted, and
    /// [`FilingError::InvalidFilingRelationship`] for a primary that still
    /// has live secondaries.
    pub async fn delete(
        &self,
        filing_id: i64,
    ) -> Result<(), FilingError> {
        let filing = self.load(filing_id).await?;
        ensure_mutable(&filing)?;

        if filing.is_primary() {
            let linked = self.repo.list_secondaries(filing.id).await?;
            if !linked.is_empty() {
                return Err(FilingError::InvalidFilingRelationship(format!(
                    "primary filing {} still has {} secondary filing(s)",
                    filing.id,
                    linked.len()
                )));
            }
        } else {
            let parent = self.parent_of(&filing).await?;
            if parent.status.is_submitted() {
                return Err(FilingError::SubmittedFilingMutation(parent.id));
            }
        }

        self.repo.delete_filing(filing.id).await?;
        info!(filing_id, role = filing.role.as_str(), "filing deleted");
        Ok(())
    }

    pub async fn transition(
        &self,
        filing_id: i64,
        to: FilingStatus,
    ) -> Result<TaxFiling, FilingError> {
        let mut filing = self.load(filing_id).await?;
        let from = filing.status;

        if !from.can_transition_to(to) {
            return Err(FilingError::InvalidStatusTransition {
                id: filing.id,
                from,
                to,
            });
        }

        filing.status = to;
        let filing = self.repo.update_filing(&filing).await?;
        info!(filing_id, %from, %to, "filing status changed");
        Ok(filing)
    }

    /// Moves a filing to another canton and municipality.
    ///
    /// A secondary may not move into its primary's canton, and a primary may
    /// not move into a canton one of its secondaries covers.
    pub async fn change_jurisdiction(
        &self,
        filing_id: i64,
        canton: Canton,
        municipality: impl Into<String>,
    ) -> Result<TaxFiling, FilingError> {
        let mut filing = self.load(filing_id).await?;
        ensure_mutable(&filing)?;

        match filing.role {
            FilingRole::Primary => {
                let linked = self.repo.list_secondaries(filing.id).await?;
                if let Some(clash) = linked.iter().find(|s| s.canton == canton) {
                    return Err(FilingError::InvalidFilingRelationship(format!(
                        "secondary filing {} already covers {canton}",
                        clash.id
                    )));
                }
            }
            FilingRole::Secondary => {
                let primary = self.parent_of(&filing).await?;
                if primary.canton == canton {
                    return Err(FilingError::InvalidFilingRelationship(format!(
                        "secondary filing {} cannot share canton {canton} with its primary",
                        filing.id
                    )));
                }
            }
        }

        let from = filing.canton;
        filing.canton = canton;
        filing.municipality = municipality.into();

        let filing = match self.repo.update_filing(&filing).await {
            Ok(filing) => filing,
            Err(RepositoryError::UniqueViolation(detail)) => {
                return Err(FilingError::InvalidFilingRelationship(detail));
            }
            Err(e) => return Err(e.into()),
        };
        info!(filing_id, %from, to = %canton, "filing jurisdiction changed");
        Ok(filing)
    }

    /// Replaces a filing's financial data.
    ///
    /// # Errors
    ///
    /// [`FilingError::InvalidFilingRelationship`] when a secondary would
    /// carry employment or self-employment income.
    pub async fn update_financials(
        &self,
        filing_id: i64,
        financials: FilingFinancials,
    ) -> Result<TaxFiling, FilingError> {
        let mut filing = self.load(filing_id).await?;
        ensure_mutable(&filing)?;

        if !filing.is_primary() && financials.carries_earned_income() {
            return Err(FilingError::InvalidFilingRelationship(format!(
                "secondary filing {} cannot carry earned income",
                filing.id
            )));
        }

        filing.financials = financials;
        Ok(self.repo.update_filing(&filing).await?)
    }

    async fn ensure_secondary(
        &self,
        primary: &TaxFiling,
        canton: Canton,
    ) -> Result<TaxFiling, FilingError> {
        let (taxpayer_id, tax_year) = (primary.taxpayer_id, primary.tax_year);

        if let Some(existing) = self.repo.find_secondary(taxpayer_id, tax_year, canton).await? {
            return Ok(existing);
        }

        let municipality = primary
            .financials
            .properties
            .iter()
            .find(|p| p.canton == canton)
            .map(|p| p.municipality.clone())
            .unwrap_or_default();

        let new = NewTaxFiling {
            taxpayer_id,
            tax_year,
            canton,
            municipality,
            role: FilingRole::Secondary,
            parent_filing_id: Some(primary.id),
            personal: primary.personal.inherited(),
            financials: FilingFinancials::default(),
        };

        match self.repo.insert_filing(new).await {
            Ok(filing) => {
                info!(
                    filing_id = filing.id,
                    primary_id = primary.id,
                    %canton,
                    "created secondary filing"
                );
                Ok(filing)
            }
            // Someone else created it between the lookup and the insert.
            Err(RepositoryError::UniqueViolation(detail)) => {
                match self.repo.find_secondary(taxpayer_id, tax_year, canton).await? {
                    Some(existing) => Ok(existing),
                    None => Err(RepositoryError::UniqueViolation(detail).into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn load(
        &self,
        filing_id: i64,
    ) -> Result<TaxFiling, FilingError> {
        match self.repo.get_filing(filing_id).await {
            Ok(filing) => Ok(filing),
            Err(RepositoryError::NotFound) => Err(FilingError::FilingNotFound(filing_id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_primary(
        &self,
        filing_id: i64,
    ) -> Result<TaxFiling, FilingError> {
        let filing = self.load(filing_id).await?;
        if !filing.is_primary() {
            return Err(FilingError::InvalidFilingRelationship(format!(
                "filing {filing_id} is not a primary filing"
            )));
        }
        Ok(filing)
    }

    async fn parent_of(
        &self,
        secondary: &TaxFiling,
    ) -> Result<TaxFiling, FilingError> {
        let parent_id = secondary.parent_filing_id.ok_or_else(|| {
            FilingError::InvalidFilingRelationship(format!(
                "secondary filing {} has no primary",
                secondary.id
            ))
        })?;
        self.load(parent_id).await
    }
}

fn ensure_mutable(filing: &TaxFiling) -> Result<(), FilingError> {
    if filing.status.is_submitted() {
        return Err(FilingError::SubmittedFilingMutation(filing.id));
    }
    Ok(())
}

fn primary_exists(existing: &TaxFiling) -> FilingError {
    FilingError::InvalidFilingRelationship(format!(
        "primary filing {} already exists for taxpayer {} in {}",
        existing.id, existing.taxpayer_id, existing.tax_year
    ))
}
