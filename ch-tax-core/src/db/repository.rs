use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Canton, NewTaxFiling, TaxFiling};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Persistence of tax filings.
///
/// Deleted filings are soft-deleted: every lookup below ignores rows whose
/// `deleted_at` is set, and they do not count toward uniqueness. Among live
/// rows there is at most one primary per (taxpayer, year) and one secondary
/// per (taxpayer, year, canton); violations surface as
/// [`RepositoryError::UniqueViolation`].
#[async_trait]
pub trait FilingRepository: Send + Sync {
    async fn insert_filing(&self, filing: NewTaxFiling) -> Result<TaxFiling, RepositoryError>;

    async fn get_filing(&self, id: i64) -> Result<TaxFiling, RepositoryError>;

    async fn find_primary(
        &self,
        taxpayer_id: i64,
        tax_year: i32,
    ) -> Result<Option<TaxFiling>, RepositoryError>;

    async fn find_secondary(
        &self,
        taxpayer_id: i64,
        tax_year: i32,
        canton: Canton,
    ) -> Result<Option<TaxFiling>, RepositoryError>;

    /// Live secondaries linked to `parent_filing_id`, by id.
    async fn list_secondaries(&self, parent_filing_id: i64) -> Result<Vec<TaxFiling>, RepositoryError>;

    /// Live filings of a taxpayer for a year, primary first.
    async fn list_filings(
        &self,
        taxpayer_id: i64,
        tax_year: i32,
    ) -> Result<Vec<TaxFiling>, RepositoryError>;

    /// Stores `filing` and returns the stored row with a fresh `updated_at`.
    async fn update_filing(&self, filing: &TaxFiling) -> Result<TaxFiling, RepositoryError>;

    /// Soft delete.
    async fn delete_filing(&self, id: i64) -> Result<(), RepositoryError>;
}
