//! Primary and secondary filing coordination.

mod error;
mod orchestrator;

pub use error::FilingError;
pub use orchestrator::{FilingOrchestrator, PrimaryFilingRequest};
