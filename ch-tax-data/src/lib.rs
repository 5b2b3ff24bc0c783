//! Loading of cantonal rule data and household declarations from disk.

pub mod household;
pub mod loader;

pub use household::{Household, HouseholdError};
pub use loader::{LoaderError, RuleData, RuleDataLoader};
