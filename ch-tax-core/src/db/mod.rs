pub mod memory;
pub mod repository;

pub use memory::InMemoryFilingRepository;
pub use repository::{FilingRepository, RepositoryError};
