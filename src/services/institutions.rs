// src/services/institutions.rs

//! Institution assembly.
//!
//! Builds one feed institution from a catalog entry, and makes sure no two
//! of its profiles end up with the same visible name.

use std::collections::HashSet;

use crate::error::Result;
use crate::locale::{languages_for_country, normalize_country};
use crate::models::{
    Config, Coordinate, INSTITUTION_ID_PREFIX, Institution, LocalizedName, Profile,
    RawCoordinate, RawInstitution,
};
use crate::services::names::localize;
use crate::services::profiles::ProfileClassifier;

/// Decimal places kept for published coordinates.
const GEO_PRECISION: i32 = 3;

/// Assembles feed institutions from catalog entries.
#[derive(Debug, Clone)]
pub struct InstitutionAssembler {
    classifier: ProfileClassifier,
    hidden_profiles: HashSet<String>,
}

impl InstitutionAssembler {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            classifier: ProfileClassifier::new(config)?,
            hidden_profiles: config.discovery.hidden_profiles.iter().cloned().collect(),
        })
    }

    /// Assemble one institution.
    ///
    /// Returns `None` when the entry has no usable name or no profile
    /// survives classification.
    pub fn assemble(&self, raw: &RawInstitution) -> Option<Institution> {
        let entity_id = raw.entity_id();
        let country = normalize_country(&raw.country);
        if languages_for_country(&country).is_none() {
            log::warn!("Institution {entity_id}: country {country:?} unknown, no local languages");
        }

        let name = localize(&raw.names, &country);
        let geo: Vec<Coordinate> = raw.geo.iter().filter_map(round_coordinate).collect();

        let profiles: Vec<Profile> = raw
            .profiles
            .iter()
            .flatten()
            .filter(|p| !self.hidden_profiles.contains(&p.id()))
            .filter_map(|p| self.classifier.classify(p, &country, name.as_ref()))
            .collect();

        let Some(name) = name else {
            log::debug!("Institution {entity_id}: no name, skipped");
            return None;
        };
        if profiles.is_empty() {
            log::debug!("Institution {entity_id}: no usable profiles, skipped");
            return None;
        }

        let profiles = disambiguate_profiles(profiles, &name);

        Some(Institution {
            id: format!("{INSTITUTION_ID_PREFIX}{entity_id}"),
            name,
            country,
            geo,
            profiles,
        })
    }
}

fn round_coordinate(raw: &RawCoordinate) -> Option<Coordinate> {
    let lon = raw.lon.as_f64().filter(|v| v.is_finite())?;
    let lat = raw.lat.as_f64().filter(|v| v.is_finite())?;
    Some(Coordinate {
        lon: round_to(lon, GEO_PRECISION),
        lat: round_to(lat, GEO_PRECISION),
    })
}

/// Round half to even, so exact binary ties do not drift away from zero.
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// Whether two names would look the same in a profile list.
fn names_collide(a: &LocalizedName, b: &LocalizedName) -> bool {
    a == b || a.values().any(|text| b.values().any(|other| other == text))
}

/// Append `(#id)` to every catalog profile's name when any two profiles
/// collide. Profiles without a name of their own take the institution name.
fn disambiguate_profiles(profiles: Vec<Profile>, institution_name: &LocalizedName) -> Vec<Profile> {
    let has_collision = profiles.iter().enumerate().any(|(i, a)| {
        profiles[i + 1..]
            .iter()
            .any(|b| names_collide(a.name(), b.name()))
    });
    if !has_collision {
        return profiles;
    }

    profiles
        .into_iter()
        .map(|profile| {
            let Some(catalog_id) = profile.catalog_id().map(str::to_string) else {
                return profile;
            };
            let base = if profile.name().is_empty() {
                institution_name
            } else {
                profile.name()
            };
            let name = base.map_text(|text| format!("{text} (#{catalog_id})"));
            profile.with_name(name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NameEntry, RawProfile, Scalar};

    fn assembler() -> InstitutionAssembler {
        InstitutionAssembler::new(&Config::default()).unwrap()
    }

    fn names(pairs: &[(&str, &str)]) -> Vec<NameEntry> {
        pairs.iter().map(|(l, v)| NameEntry::new(*l, *v)).collect()
    }

    fn raw_profile(id: &str, redirect: &str, profile_names: &[(&str, &str)]) -> RawProfile {
        RawProfile {
            id: Scalar::Text(id.to_string()),
            names: names(profile_names),
            redirect: Some(serde_json::Value::String(redirect.to_string())),
        }
    }

    fn raw_institution(profiles: Vec<RawProfile>) -> RawInstitution {
        RawInstitution {
            entity_id: Some(Scalar::Text("100".to_string())),
            country: "NL".to_string(),
            names: names(&[("en", "Example University")]),
            geo: vec![RawCoordinate {
                lon: Scalar::Text("5.12345".to_string()),
                lat: Scalar::Text("52.09876".to_string()),
            }],
            profiles: Some(profiles),
        }
    }

    fn fallback_names(institution: &Institution) -> Vec<Option<&str>> {
        institution
            .profiles
            .iter()
            .map(|p| p.name().fallback())
            .collect()
    }

    #[test]
    fn test_assemble_basic() {
        let institution = assembler()
            .assemble(&raw_institution(vec![raw_profile("1", "", &[])]))
            .unwrap();

        assert_eq!(institution.id, "cat_idp_100");
        assert_eq!(institution.country, "NL");
        assert_eq!(institution.name.fallback(), Some("Example University"));
        assert_eq!(
            institution.geo,
            vec![Coordinate {
                lon: 5.123,
                lat: 52.099
            }]
        );
        assert_eq!(institution.profiles.len(), 1);
        assert!(institution.profiles[0].name().is_empty());
    }

    #[test]
    fn test_pseudo_country_normalized() {
        let mut raw = raw_institution(vec![raw_profile("1", "", &[])]);
        raw.country = "GEANT".to_string();
        let institution = assembler().assemble(&raw).unwrap();
        assert_eq!(institution.country, "NL");
    }

    #[test]
    fn test_rejects_without_name() {
        let mut raw = raw_institution(vec![raw_profile("1", "", &[])]);
        raw.names = names(&[("en", "")]);
        assert!(assembler().assemble(&raw).is_none());
    }

    #[test]
    fn test_rejects_without_profiles() {
        assert!(assembler().assemble(&raw_institution(vec![])).is_none());

        let only_invalid = raw_institution(vec![raw_profile("1", "ftp://example.org/", &[])]);
        assert!(assembler().assemble(&only_invalid).is_none());
    }

    #[test]
    fn test_invalid_profile_does_not_affect_others() {
        let institution = assembler()
            .assemble(&raw_institution(vec![
                raw_profile("1", "http://example.org/#letswifi", &[("en", "Staff")]),
                raw_profile("2", "", &[("en", "Students")]),
            ]))
            .unwrap();
        assert_eq!(institution.profiles.len(), 1);
        assert_eq!(institution.profiles[0].id(), "cat_profile_2");
    }

    #[test]
    fn test_hidden_profiles_are_skipped() {
        let mut config = Config::default();
        config.discovery.hidden_profiles = vec!["1".to_string()];
        let assembler = InstitutionAssembler::new(&config).unwrap();

        let institution = assembler
            .assemble(&raw_institution(vec![
                raw_profile("1", "", &[("en", "Staff")]),
                raw_profile("2", "", &[("en", "Students")]),
            ]))
            .unwrap();
        assert_eq!(institution.profiles.len(), 1);
        assert_eq!(institution.profiles[0].id(), "cat_profile_2");
    }

    #[test]
    fn test_duplicate_names_get_ids() {
        let institution = assembler()
            .assemble(&raw_institution(vec![
                raw_profile("11", "", &[("any", "Guest")]),
                raw_profile("12", "https://portal.example.org/", &[("any", "Guest")]),
            ]))
            .unwrap();
        assert_eq!(
            fallback_names(&institution),
            vec![Some("Guest (#11)"), Some("Guest (#12)")]
        );
    }

    #[test]
    fn test_profiles_sharing_parent_name_use_it_as_base() {
        let institution = assembler()
            .assemble(&raw_institution(vec![
                raw_profile("21", "", &[]),
                raw_profile("22", "", &[("en", "Example University")]),
            ]))
            .unwrap();
        assert_eq!(
            fallback_names(&institution),
            vec![
                Some("Example University (#21)"),
                Some("Example University (#22)")
            ]
        );
    }

    #[test]
    fn test_overlapping_text_counts_as_duplicate() {
        let institution = assembler()
            .assemble(&raw_institution(vec![
                raw_profile("31", "", &[("en", "Staff"), ("nl", "Medewerkers")]),
                raw_profile("32", "", &[("en", "Employees"), ("nl", "Medewerkers")]),
            ]))
            .unwrap();

        let first = institution.profiles[0].name();
        assert_eq!(first.fallback(), Some("Staff (#31)"));
        assert_eq!(first.get("nl"), Some("Medewerkers (#31)"));
        let second = institution.profiles[1].name();
        assert_eq!(second.fallback(), Some("Employees (#32)"));
        assert_eq!(second.get("nl"), Some("Medewerkers (#32)"));
    }

    #[test]
    fn test_distinct_names_untouched() {
        let institution = assembler()
            .assemble(&raw_institution(vec![
                raw_profile("41", "", &[("en", "Staff")]),
                raw_profile("42", "", &[("en", "Students")]),
                raw_profile("43", "", &[]),
            ]))
            .unwrap();
        assert_eq!(
            fallback_names(&institution),
            vec![Some("Staff"), Some("Students"), None]
        );
    }

    #[test]
    fn test_non_finite_coordinates_dropped() {
        let mut raw = raw_institution(vec![raw_profile("1", "", &[])]);
        raw.geo.push(RawCoordinate {
            lon: Scalar::Text("NaN".to_string()),
            lat: Scalar::Text("1.0".to_string()),
        });
        raw.geo.push(RawCoordinate {
            lon: Scalar::Text("east".to_string()),
            lat: Scalar::Text("1.0".to_string()),
        });
        let institution = assembler().assemble(&raw).unwrap();
        assert_eq!(institution.geo.len(), 1);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(4.0004, 3), 4.0);
        assert_eq!(round_to(-73.98765, 3), -73.988);
    }

    #[test]
    fn test_round_to_ties_go_to_even() {
        assert_eq!(round_to(4.0625, 3), 4.062);
        assert_eq!(round_to(4.1875, 3), 4.188);
        assert_eq!(round_to(-0.0625, 3), -0.062);
    }
}
