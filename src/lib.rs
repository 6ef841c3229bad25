// src/lib.rs

//! eduroam discovery feed generator.
//!
//! Reads the CAT institution catalog and publishes a versioned discovery
//! document for onboarding apps.

pub mod config;
pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod locale;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
