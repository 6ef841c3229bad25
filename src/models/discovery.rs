//! Discovery feed records.
//!
//! These are the values written to the published document. Every run builds
//! them from scratch; nothing here is mutated after construction.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Key holding the fallback display string of a [`LocalizedName`].
pub const ANY: &str = "any";

/// Prefix of every profile identifier derived from the catalog.
pub const PROFILE_ID_PREFIX: &str = "cat_profile_";

/// Prefix of every institution identifier derived from the catalog.
pub const INSTITUTION_ID_PREFIX: &str = "cat_idp_";

/// Display text keyed by language tag.
///
/// A non-empty name always has an [`ANY`] entry; other entries only exist
/// when their text differs from it. The empty name means "use the parent's
/// name".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedName(BTreeMap<String, String>);

impl LocalizedName {
    /// A name with only a fallback entry.
    pub fn any(text: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(ANY.to_string(), text.into());
        Self(map)
    }

    /// Wrap an already normalized mapping.
    pub(crate) fn from_map(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }

    /// The fallback display string.
    pub fn fallback(&self) -> Option<&str> {
        self.0.get(ANY).map(String::as_str)
    }

    /// Text for a specific language tag.
    pub fn get(&self, lang: &str) -> Option<&str> {
        self.0.get(lang).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// All `(lang, text)` entries, ordered by language tag.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All display strings.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    /// Same languages, every text passed through `f`.
    pub fn map_text(&self, f: impl Fn(&str) -> String) -> Self {
        Self(self.0.iter().map(|(k, v)| (k.clone(), f(v))).collect())
    }
}

/// A connection method offered by an institution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Profile {
    /// Automated provisioning over a vetted https endpoint.
    #[serde(rename = "letswifi")]
    SecureTunnel {
        id: String,
        name: LocalizedName,
        #[serde(rename = "letswifi_endpoint")]
        endpoint: String,
    },

    /// Browser redirect to the institution's own onboarding page.
    #[serde(rename = "webview")]
    WebPortal {
        id: String,
        name: LocalizedName,
        #[serde(rename = "webview_endpoint")]
        endpoint: String,
    },

    /// Generic EAP configuration download.
    #[serde(rename = "eap-config")]
    GenericConfig {
        id: String,
        name: LocalizedName,
        eapconfig_endpoint: String,
        mobileconfig_endpoint: String,
    },
}

impl Profile {
    pub fn id(&self) -> &str {
        match self {
            Profile::SecureTunnel { id, .. }
            | Profile::WebPortal { id, .. }
            | Profile::GenericConfig { id, .. } => id,
        }
    }

    pub fn name(&self) -> &LocalizedName {
        match self {
            Profile::SecureTunnel { name, .. }
            | Profile::WebPortal { name, .. }
            | Profile::GenericConfig { name, .. } => name,
        }
    }

    /// Catalog profile id, for profiles that were derived from the catalog.
    pub fn catalog_id(&self) -> Option<&str> {
        self.id().strip_prefix(PROFILE_ID_PREFIX)
    }

    /// The same profile under a different display name.
    pub fn with_name(self, name: LocalizedName) -> Self {
        match self {
            Profile::SecureTunnel { id, endpoint, .. } => {
                Profile::SecureTunnel { id, name, endpoint }
            }
            Profile::WebPortal { id, endpoint, .. } => Profile::WebPortal { id, name, endpoint },
            Profile::GenericConfig {
                id,
                eapconfig_endpoint,
                mobileconfig_endpoint,
                ..
            } => Profile::GenericConfig {
                id,
                name,
                eapconfig_endpoint,
                mobileconfig_endpoint,
            },
        }
    }
}

/// A coarsened location of an institution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

/// One published institution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub id: String,
    pub name: LocalizedName,
    pub country: String,
    pub geo: Vec<Coordinate>,
    pub profiles: Vec<Profile>,
}

/// Body of the discovery document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryFeed {
    pub seq: u64,
    pub institutions: Vec<Institution>,
    #[serde(default)]
    pub apps: BTreeMap<String, Value>,
}

/// The discovery document: a single sigil key mapping to the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryEnvelope {
    pub sigil: String,
    pub feed: DiscoveryFeed,
}

impl DiscoveryEnvelope {
    pub fn seq(&self) -> u64 {
        self.feed.seq
    }

    pub fn institutions(&self) -> &[Institution] {
        &self.feed.institutions
    }
}

impl Serialize for DiscoveryEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.sigil, &self.feed)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_institution() -> Institution {
        Institution {
            id: "cat_idp_1".to_string(),
            name: LocalizedName::any("Example University"),
            country: "NL".to_string(),
            geo: vec![Coordinate {
                lon: 5.123,
                lat: 52.0,
            }],
            profiles: vec![
                Profile::SecureTunnel {
                    id: "cat_profile_1".to_string(),
                    name: LocalizedName::default(),
                    endpoint: "https://example.org/".to_string(),
                },
                Profile::GenericConfig {
                    id: "cat_profile_2".to_string(),
                    name: LocalizedName::any("Guests"),
                    eapconfig_endpoint: "https://cat.example/eap".to_string(),
                    mobileconfig_endpoint: "https://cat.example/apple".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_profile_type_discriminator() {
        let value = serde_json::to_value(&sample_institution().profiles).unwrap();
        assert_eq!(value[0]["type"], "letswifi");
        assert_eq!(value[0]["letswifi_endpoint"], "https://example.org/");
        assert_eq!(value[0]["name"], serde_json::json!({}));
        assert_eq!(value[1]["type"], "eap-config");
        assert_eq!(value[1]["mobileconfig_endpoint"], "https://cat.example/apple");
    }

    #[test]
    fn test_envelope_uses_sigil_as_root_key() {
        let envelope = DiscoveryEnvelope {
            sigil: "urn:test".to_string(),
            feed: DiscoveryFeed {
                seq: 2024010100,
                institutions: vec![sample_institution()],
                apps: BTreeMap::new(),
            },
        };

        let value = serde_json::to_value(&envelope).unwrap();
        let root = value.as_object().unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(value["urn:test"]["seq"], 2024010100);
        assert_eq!(value["urn:test"]["apps"], serde_json::json!({}));
    }

    #[test]
    fn test_catalog_id_and_rename() {
        let profile = sample_institution().profiles.remove(1);
        assert_eq!(profile.catalog_id(), Some("2"));

        let renamed = profile.with_name(LocalizedName::any("Visitors"));
        assert_eq!(renamed.name().fallback(), Some("Visitors"));
        assert_eq!(renamed.id(), "cat_profile_2");
    }

    #[test]
    fn test_map_text_keeps_languages() {
        let mut map = BTreeMap::new();
        map.insert("any".to_string(), "Guest".to_string());
        map.insert("nl".to_string(), "Gast".to_string());
        let name = LocalizedName::from_map(map).map_text(|t| format!("{t}!"));
        assert_eq!(name.get("any"), Some("Guest!"));
        assert_eq!(name.get("nl"), Some("Gast!"));
    }
}
