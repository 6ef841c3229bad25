//! Raw catalog payload as served by the upstream API.
//!
//! The upstream JSON is loosely typed: identifiers and coordinates show up
//! as strings in some records and as numbers in others, and optional fields
//! are sometimes absent and sometimes `null`. Everything here is read-only
//! input to the generator.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};

/// Success sentinel of the catalog API.
const STATUS_OK: i64 = 1;

/// A JSON scalar that may be encoded as either a string or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    /// String form, as used in identifiers.
    pub fn as_string(&self) -> String {
        match self {
            Scalar::Text(s) => s.clone(),
            Scalar::Number(n) => n.to_string(),
        }
    }

    /// Numeric form; `None` for text that is not a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Number(n) => n.as_f64(),
        }
    }
}

/// One `(language, text)` name pair.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NameEntry {
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub value: String,
}

impl NameEntry {
    pub fn new(lang: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            value: value.into(),
        }
    }
}

/// A coordinate as found in the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCoordinate {
    pub lon: Scalar,
    pub lat: Scalar,
}

/// A connection profile offered by an institution.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawProfile {
    pub id: Scalar,

    #[serde(default, deserialize_with = "null_as_default")]
    pub names: Vec<NameEntry>,

    /// Redirect target; empty or absent means "download the generic config"
    #[serde(default)]
    pub redirect: Option<Value>,
}

impl RawProfile {
    /// Profile identifier in string form.
    pub fn id(&self) -> String {
        self.id.as_string()
    }

    /// Redirect URL, or an empty string when the profile has none.
    pub fn redirect_url(&self) -> &str {
        match &self.redirect {
            Some(Value::String(s)) => s.trim(),
            _ => "",
        }
    }
}

/// One catalog entry (an identity provider).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawInstitution {
    /// Falls back to the catalog map key when absent
    #[serde(rename = "entityID", default)]
    pub entity_id: Option<Scalar>,

    #[serde(default)]
    pub country: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub names: Vec<NameEntry>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub geo: Vec<RawCoordinate>,

    /// Entries without this field are not institutions we can publish
    #[serde(default)]
    pub profiles: Option<Vec<RawProfile>>,
}

impl RawInstitution {
    /// Entity identifier in string form.
    pub fn entity_id(&self) -> String {
        self.entity_id
            .as_ref()
            .map(Scalar::as_string)
            .unwrap_or_default()
    }
}

/// Decoded catalog, sorted by catalog key compared as a string
/// (`"10"` before `"9"`).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub institutions: Vec<RawInstitution>,
}

#[derive(Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    status: Option<Scalar>,
    #[serde(default)]
    data: Option<BTreeMap<String, Value>>,
}

impl Catalog {
    /// Decode a catalog API response body.
    ///
    /// The envelope must report success and carry `data`; individual entries
    /// that cannot be decoded are skipped.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let response: CatalogResponse = serde_json::from_slice(body)?;

        let status = response.status.as_ref().and_then(Scalar::as_f64);
        if status != Some(STATUS_OK as f64) {
            return Err(AppError::catalog(format!(
                "unexpected status {:?}",
                response.status
            )));
        }
        let data = response
            .data
            .ok_or_else(|| AppError::catalog("response has no data"))?;

        let mut institutions = Vec::with_capacity(data.len());
        for (key, value) in data {
            match serde_json::from_value::<RawInstitution>(value) {
                Ok(mut institution) => {
                    if institution.entity_id.is_none() {
                        institution.entity_id = Some(Scalar::Text(key));
                    }
                    institutions.push(institution);
                }
                Err(e) => log::warn!("Skipping undecodable catalog entry {}: {}", key, e),
            }
        }

        Ok(Self { institutions })
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
