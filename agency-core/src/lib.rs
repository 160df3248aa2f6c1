//! agency-core: Shared infrastructure for the agency back-office service.
pub mod error;
pub mod middleware;
pub mod observability;
