// src/pipeline/publish.rs

//! Publish pipeline: fetch, generate, compare, store.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::models::{Catalog, Config};
use crate::pipeline::diff::{Snapshot, is_up_to_date, previous_seq};
use crate::pipeline::generate::DiscoveryGenerator;
use crate::storage::SnapshotStorage;
use crate::utils::http::fetch_catalog;
use crate::utils::json::encode_canonical;

/// Result of one publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A new document was written.
    Published {
        seq: u64,
        institutions: usize,
        location: String,
        timestamp: DateTime<Utc>,
    },
    /// The stored document already has the same institutions.
    Unchanged { seq: u64 },
}

impl PublishOutcome {
    /// Sequence number of the document that is live after this run.
    pub fn seq(&self) -> u64 {
        match self {
            Self::Published { seq, .. } | Self::Unchanged { seq } => *seq,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// Load the last published snapshot, if any is usable.
pub async fn load_previous(storage: &dyn SnapshotStorage, sigil: &str) -> Result<Option<Snapshot>> {
    let Some(bytes) = storage.read_snapshot().await? else {
        log::info!("No previous snapshot at {}", storage.location());
        return Ok(None);
    };
    Ok(Snapshot::parse(&bytes, sigil))
}

/// Full run: fetch the catalog, then publish it.
///
/// Nothing is written unless the catalog was fetched and decoded.
pub async fn run_publish(
    config: &Config,
    storage: &dyn SnapshotStorage,
    client: &reqwest::Client,
    force: bool,
) -> Result<PublishOutcome> {
    let generator = DiscoveryGenerator::new(config)?;
    let catalog = fetch_catalog(client, &config.catalog).await?;
    publish_catalog(&generator, storage, &catalog, force).await
}

/// Generate a document from `catalog` and store it when it differs from
/// the stored one, or when `force` is set.
pub async fn publish_catalog(
    generator: &DiscoveryGenerator,
    storage: &dyn SnapshotStorage,
    catalog: &Catalog,
    force: bool,
) -> Result<PublishOutcome> {
    publish_catalog_on(generator, storage, catalog, force, Utc::now().date_naive()).await
}

/// [`publish_catalog`] as if run on `date`.
pub async fn publish_catalog_on(
    generator: &DiscoveryGenerator,
    storage: &dyn SnapshotStorage,
    catalog: &Catalog,
    force: bool,
    date: NaiveDate,
) -> Result<PublishOutcome> {
    let previous = load_previous(storage, generator.sigil()).await?;
    let previous_seq = previous_seq(previous.as_ref(), generator.sigil());
    let envelope = generator.generate_on(catalog, previous_seq, date);

    if let Some(seq) = is_up_to_date(previous.as_ref(), &envelope) {
        if !force {
            log::info!("Unchanged {seq}");
            return Ok(PublishOutcome::Unchanged { seq });
        }
        log::info!("Unchanged {seq}, writing anyway");
    }

    let seq = envelope.seq();
    log::info!("Storing discovery seq {seq}");
    let bytes = encode_canonical(&envelope)?;
    let meta = storage.write_snapshot(&bytes).await?;

    Ok(PublishOutcome::Published {
        seq,
        institutions: envelope.institutions().len(),
        location: meta.location,
        timestamp: meta.timestamp,
    })
}
