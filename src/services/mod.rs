//! Service layer for the discovery generator.
//!
//! This module contains the business logic for:
//! - Name localization (`localize`)
//! - Profile classification (`ProfileClassifier`)
//! - Institution assembly (`InstitutionAssembler`)

mod institutions;
mod names;
mod profiles;

pub use institutions::InstitutionAssembler;
pub use names::{localize, localize_with};
pub use profiles::ProfileClassifier;
