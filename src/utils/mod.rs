//! Utility functions and helpers.

pub mod http;
pub mod json;
pub mod url;
