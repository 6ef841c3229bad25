// src/models/mod.rs

//! Domain models for the discovery generator.
//!
//! - `catalog`: raw upstream input, read-only
//! - `discovery`: the published feed records
//! - `config`: application configuration

mod catalog;
mod config;
mod discovery;

// Re-export all public types
pub use catalog::{Catalog, NameEntry, RawCoordinate, RawInstitution, RawProfile, Scalar};
pub use config::{CatalogConfig, Config, DiscoveryConfig, OutputConfig};
pub use discovery::{
    ANY, Coordinate, DiscoveryEnvelope, DiscoveryFeed, INSTITUTION_ID_PREFIX, Institution,
    LocalizedName, PROFILE_ID_PREFIX, Profile,
};
