pub mod metrics;
pub mod reports;
pub mod repository;

pub use repository::AgencyRepository;
