// src/services/names.rs

//! Name localization.
//!
//! Turns the catalog's `(lang, text)` name lists into a [`LocalizedName`]:
//! one fallback under `any` plus the overrides that actually differ from it.

use std::collections::BTreeMap;

use crate::locale::languages_for_country;
use crate::models::{ANY, LocalizedName, NameEntry};

/// Tags that catalog authors use to mean "no particular language", by priority.
const FALLBACK_TAGS: [&str; 3] = [ANY, "C", ""];

const ENGLISH: &str = "en";

/// Localize a name list for an institution or profile in `country`.
///
/// Countries missing from the language table localize as if they had no
/// local languages.
pub fn localize(names: &[NameEntry], country: &str) -> Option<LocalizedName> {
    localize_with(names, languages_for_country(country).unwrap_or(&[]))
}

/// Localize a name list given the country's languages, most significant first.
///
/// Returns `None` when no entry carries any text.
pub fn localize_with(names: &[NameEntry], languages: &[&str]) -> Option<LocalizedName> {
    let names: Vec<&NameEntry> = names.iter().filter(|n| !n.value.is_empty()).collect();

    match names.as_slice() {
        [] => return None,
        [only] => return Some(LocalizedName::any(only.value.clone())),
        _ => {}
    }

    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for name in &names {
        map.insert(name.lang.clone(), name.value.clone());
    }

    normalize_fallback(&mut map);
    swap_mistaken_fallback(&mut map, languages);

    if !map.contains_key(ANY) {
        let first_tag = names[0].lang.as_str();
        let promoted = std::iter::once(ENGLISH)
            .chain(languages.iter().copied())
            .chain(std::iter::once(first_tag))
            .find_map(|tag| map.get(tag).cloned());

        match promoted {
            Some(text) => {
                map.insert(ANY.to_string(), text);
            }
            None => {
                // The first tag is either still present or was a fallback tag
                // that became `any`, so this cannot happen.
                log::error!("No fallback name among {:?}", map.keys().collect::<Vec<_>>());
                return None;
            }
        }
    }

    let fallback = map.get(ANY).cloned().unwrap_or_default();
    map.retain(|lang, text| lang == ANY || *text != fallback);

    Some(LocalizedName::from_map(map))
}

/// Fold the highest-priority fallback tag into `any` and drop the others.
fn normalize_fallback(map: &mut BTreeMap<String, String>) {
    let chosen = FALLBACK_TAGS
        .iter()
        .find_map(|tag| map.get(*tag).cloned());

    for tag in &FALLBACK_TAGS[1..] {
        map.remove(*tag);
    }
    if let Some(text) = chosen {
        map.insert(ANY.to_string(), text);
    }
}

/// Undo the common authoring mistake of putting local text under `any` next
/// to an English `en` entry.
///
/// Applies only when none of the country's non-English languages is used
/// yet; the local text then moves to the first such language and English
/// becomes the fallback.
fn swap_mistaken_fallback(map: &mut BTreeMap<String, String>, languages: &[&str]) {
    let (Some(english), Some(fallback)) = (map.get(ENGLISH), map.get(ANY)) else {
        return;
    };

    let local: Vec<&str> = languages
        .iter()
        .copied()
        .filter(|lang| *lang != ENGLISH)
        .collect();
    if local.iter().any(|lang| map.contains_key(*lang)) {
        return;
    }
    let Some(target) = local.first().copied() else {
        return;
    };

    let (english, fallback) = (english.clone(), fallback.clone());
    map.insert(target.to_string(), fallback);
    map.insert(ANY.to_string(), english);
}
