//! End-to-end tests over the rule data and household shipped in `test-data/`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ch_tax_core::calculations::NotApplicableReason;
use ch_tax_core::{
    Canton, FilingOrchestrator, FilingRepository, FilingRole, InMemoryFilingRepository, RuleKind,
    TaxSummaryAggregator,
};
use ch_tax_data::{Household, LoaderError, RuleDataLoader};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn test_data() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

#[test]
fn test_load_dir_registers_every_table() {
    let registry = RuleDataLoader::load_dir(&test_data()).expect("Failed to load test data");

    assert_eq!(registry.tax_years(), vec![2024]);
    assert_eq!(registry.cantons(2024), vec![Canton::Valais, Canton::Zug, Canton::Zurich]);

    let valais = registry.rule_set(Canton::Valais, 2024, RuleKind::Wealth).unwrap();
    assert_eq!(valais.flat_rate(), Some(dec!(0.002)));
    assert_eq!(
        registry.municipal_multiplier(Canton::Zurich, 2024, "winterthur"),
        Some(dec!(1.25))
    );
    assert_eq!(registry.year_config(2024).unwrap().social_security.bvg_age_bands.len(), 4);
}

#[test]
fn test_load_dir_missing_directory() {
    let err = RuleDataLoader::load_dir(Path::new("no-such-dir")).unwrap_err();

    assert!(matches!(err, LoaderError::Io { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_household_end_to_end() {
    let registry = RuleDataLoader::load_dir(&test_data()).expect("Failed to load test data");
    let household = Household::load(&test_data().join("household.toml")).expect("Failed to load household");
    let (taxpayer_id, tax_year) = (household.taxpayer_id, household.tax_year);

    let repo: Arc<dyn FilingRepository> = Arc::new(InMemoryFilingRepository::new());
    let orchestrator = FilingOrchestrator::new(Arc::clone(&repo));

    let primary = orchestrator.create_primary(household.into_request()).await.unwrap();
    let secondaries = orchestrator.declare_property_filings(primary.id).await.unwrap();

    assert_eq!(secondaries.len(), 1);
    assert_eq!(secondaries[0].canton, Canton::Valais);
    assert_eq!(secondaries[0].municipality, "Sion");
    assert_eq!(secondaries[0].financials.properties.len(), 1);

    let filings = repo.list_filings(taxpayer_id, tax_year).await.unwrap();
    let results = TaxSummaryAggregator::new(&registry).calculate_batch(&filings);

    assert_eq!(results.len(), 2);
    let primary_result = results[0].1.as_ref().unwrap();
    assert_eq!(primary_result.role, FilingRole::Primary);
    assert_eq!(primary_result.taxable_income, dec!(73436.50));
    assert_eq!(primary_result.church_tax, dec!(281.37));
    assert_eq!(primary_result.total_liability, dec!(20238.22));
    assert_eq!(primary_result.effective_rate, dec!(19.46));

    let secondary_result = results[1].1.as_ref().unwrap();
    assert_eq!(secondary_result.role, FilingRole::Secondary);
    assert_eq!(secondary_result.church.reason, Some(NotApplicableReason::JurisdictionNoTax));
    assert_eq!(secondary_result.total_liability, dec!(1461.60));
}

#[tokio::test]
async fn test_household_in_year_without_rules() {
    let registry = RuleDataLoader::load_dir(&test_data()).expect("Failed to load test data");
    let mut household = Household::load(&test_data().join("household.toml")).expect("Failed to load household");
    household.tax_year = 2030;

    let repo: Arc<dyn FilingRepository> = Arc::new(InMemoryFilingRepository::new());
    let orchestrator = FilingOrchestrator::new(Arc::clone(&repo));
    let primary = orchestrator.create_primary(household.into_request()).await.unwrap();

    let results = TaxSummaryAggregator::new(&registry).calculate_batch(&[primary]);

    assert_eq!(results.len(), 1);
    assert!(results[0].1.is_err());
}
