//! In-process [`FilingRepository`] backed by a mutex-guarded map.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::repository::{FilingRepository, RepositoryError};
use crate::models::{Canton, FilingRole, FilingStatus, NewTaxFiling, TaxFiling};

#[derive(Debug, Default)]
struct Store {
    last_id: i64,
    filings: BTreeMap<i64, TaxFiling>,
}

impl Store {
    fn live(&self) -> impl Iterator<Item = &TaxFiling> {
        self.filings.values().filter(|f| !f.is_deleted())
    }

    /// Rejects a row that would collide with another live row.
    fn check_unique(
        &self,
        id: Option<i64>,
        taxpayer_id: i64,
        tax_year: i32,
        canton: Canton,
        role: FilingRole,
    ) -> Result<(), RepositoryError> {
        let clash = self.live().find(|f| {
            Some(f.id) != id
                && f.taxpayer_id == taxpayer_id
                && f.tax_year == tax_year
                && f.role == role
                && (role == FilingRole::Primary || f.canton == canton)
        });

        match clash {
            Some(existing) => Err(RepositoryError::UniqueViolation(format!(
                "{} filing {} already exists for taxpayer {taxpayer_id} in {tax_year} ({})",
                role.as_str(),
                existing.id,
                existing.canton
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFilingRepository {
    store: Mutex<Store>,
}

impl InMemoryFilingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> Result<MutexGuard<'_, Store>, RepositoryError> {
        self.store
            .lock()
            .map_err(|e| RepositoryError::Storage(e.to_string()))
    }
}

#[async_trait]
impl FilingRepository for InMemoryFilingRepository {
    async fn insert_filing(&self, filing: NewTaxFiling) -> Result<TaxFiling, RepositoryError> {
        let mut store = self.store()?;
        store.check_unique(None, filing.taxpayer_id, filing.tax_year, filing.canton, filing.role)?;

        store.last_id += 1;
        let now = Utc::now();
        let row = TaxFiling {
            id: store.last_id,
            taxpayer_id: filing.taxpayer_id,
            tax_year: filing.tax_year,
            canton: filing.canton,
            municipality: filing.municipality,
            role: filing.role,
            parent_filing_id: filing.parent_filing_id,
            status: FilingStatus::Draft,
            personal: filing.personal,
            financials: filing.financials,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        store.filings.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_filing(&self, id: i64) -> Result<TaxFiling, RepositoryError> {
        self.store()?
            .filings
            .get(&id)
            .filter(|f| !f.is_deleted())
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_primary(
        &self,
        taxpayer_id: i64,
        tax_year: i32,
    ) -> Result<Option<TaxFiling>, RepositoryError> {
        Ok(self
            .store()?
            .live()
            .find(|f| f.is_primary() && f.taxpayer_id == taxpayer_id && f.tax_year == tax_year)
            .cloned())
    }

    async fn find_secondary(
        &self,
        taxpayer_id: i64,
        tax_year: i32,
        canton: Canton,
    ) -> Result<Option<TaxFiling>, RepositoryError> {
        Ok(self
            .store()?
            .live()
            .find(|f| {
                !f.is_primary() && f.taxpayer_id == taxpayer_id && f.tax_year == tax_year && f.canton == canton
            })
            .cloned())
    }

    async fn list_secondaries(&self, parent_filing_id: i64) -> Result<Vec<TaxFiling>, RepositoryError> {
        Ok(self
            .store()?
            .live()
            .filter(|f| f.parent_filing_id == Some(parent_filing_id))
            .cloned()
            .collect())
    }

    async fn list_filings(
        &self,
        taxpayer_id: i64,
        tax_year: i32,
    ) -> Result<Vec<TaxFiling>, RepositoryError> {
        let mut filings: Vec<TaxFiling> = self
            .store()?
            .live()
            .filter(|f| f.taxpayer_id == taxpayer_id && f.tax_year == tax_year)
            .cloned()
            .collect();
        filings.sort_by_key(|f| (!f.is_primary(), f.id));
        Ok(filings)
    }

    async fn update_filing(&self, filing: &TaxFiling) -> Result<TaxFiling, RepositoryError> {
        let mut store = self.store()?;
        match store.filings.get(&filing.id) {
            Some(existing) if !existing.is_deleted() => {}
            _ => return Err(RepositoryError::NotFound),
        }
        store.check_unique(
            Some(filing.id),
            filing.taxpayer_id,
            filing.tax_year,
            filing.canton,
            filing.role,
        )?;

        let mut row = filing.clone();
        row.updated_at = Utc::now();
        store.filings.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete_filing(&self, id: i64) -> Result<(), RepositoryError> {
        let mut store = self.store()?;
        let filing = store
            .filings
            .get_mut(&id)
            .filter(|f| !f.is_deleted())
            .ok_or(RepositoryError::NotFound)?;

        let now = Utc::now();
        filing.deleted_at = Some(now);
        filing.updated_at = now;
        Ok(())
    }
}
