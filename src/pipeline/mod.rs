//! Pipeline entry points for feed generation.
//!
//! - `generate`: catalog to discovery envelope, including `seq`
//! - `diff`: change detection against the stored snapshot
//! - `publish`: the complete fetch, compare and store run

pub mod diff;
pub mod generate;
pub mod publish;

pub use diff::{Snapshot, is_up_to_date, previous_seq};
pub use generate::{DiscoveryGenerator, daily_seq, next_seq};
pub use publish::{PublishOutcome, load_previous, publish_catalog, publish_catalog_on, run_publish};
