//! Core domain concepts shared across all subdomains.
//!
//! - [`provider::ProviderKind`]: model vendors the loop can talk to
//! - [`query::Query`]: a validated user query
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod provider;
pub mod query;
