// src/pipeline/generate.rs

//! Discovery feed generation.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate, Utc};

use crate::error::Result;
use crate::models::{Catalog, Config, DiscoveryEnvelope, DiscoveryFeed, Institution};
use crate::services::InstitutionAssembler;

/// Added to the first sequence number of a feed, so that a fresh feed is
/// very likely ahead of any other feed generated the same day.
const FIRST_RUN_OFFSET: u64 = 80;

/// Daily base sequence number, `YYYYMMDD00`.
pub fn daily_seq(date: NaiveDate) -> u64 {
    let year = u64::try_from(date.year()).unwrap_or_default();
    year * 1_000_000 + u64::from(date.month()) * 10_000 + u64::from(date.day()) * 100
}

/// Sequence number for a feed generated on `date`.
///
/// Always strictly greater than `previous`.
pub fn next_seq(previous: Option<u64>, date: NaiveDate) -> u64 {
    let candidate = daily_seq(date);
    match previous {
        None => candidate + FIRST_RUN_OFFSET,
        Some(previous) if candidate <= previous => previous + 1,
        Some(_) => candidate,
    }
}

/// Generates discovery envelopes from catalog data.
#[derive(Debug, Clone)]
pub struct DiscoveryGenerator {
    sigil: String,
    assembler: InstitutionAssembler,
    hidden_institutions: HashSet<String>,
}

impl DiscoveryGenerator {
    /// Build a generator; fails on an invalid stub prefix.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            sigil: config.discovery.sigil.clone(),
            assembler: InstitutionAssembler::new(config)?,
            hidden_institutions: config
                .discovery
                .hidden_institutions
                .iter()
                .cloned()
                .collect(),
        })
    }

    pub fn sigil(&self) -> &str {
        &self.sigil
    }

    /// Generate the envelope for today (UTC).
    pub fn generate(&self, catalog: &Catalog, previous_seq: Option<u64>) -> DiscoveryEnvelope {
        self.generate_on(catalog, previous_seq, Utc::now().date_naive())
    }

    /// Generate the envelope as if run on `date`.
    pub fn generate_on(
        &self,
        catalog: &Catalog,
        previous_seq: Option<u64>,
        date: NaiveDate,
    ) -> DiscoveryEnvelope {
        DiscoveryEnvelope {
            sigil: self.sigil.clone(),
            feed: DiscoveryFeed {
                seq: next_seq(previous_seq, date),
                institutions: self.institutions(catalog),
                apps: BTreeMap::new(),
            },
        }
    }

    /// All publishable institutions, in [`Catalog`] order.
    pub fn institutions(&self, catalog: &Catalog) -> Vec<Institution> {
        let institutions: Vec<Institution> = catalog
            .institutions
            .iter()
            .filter(|raw| raw.profiles.is_some())
            .filter(|raw| !self.hidden_institutions.contains(&raw.entity_id()))
            .filter_map(|raw| self.assembler.assemble(raw))
            .collect();

        log::info!(
            "Assembled {} of {} catalog entries",
            institutions.len(),
            catalog.institutions.len()
        );
        institutions
    }
}
