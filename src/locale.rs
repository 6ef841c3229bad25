// src/locale.rs

//! Languages spoken per country.
//!
//! Used by the name localizer to decide which language a catalog author most
//! likely meant when a name carries no explicit tag.

/// Map catalog pseudo-countries onto an ISO country code.
///
/// The catalog files a couple of GÉANT guest IdPs under `GEANT`; the staff
/// IdP of the same organisation is filed under `NL`, so those go there too.
pub fn normalize_country(country: &str) -> String {
    let upper = country.trim().to_ascii_uppercase();
    match upper.as_str() {
        "GEANT" => "NL".to_string(),
        _ => upper,
    }
}

/// Languages of a country, most significant first.
///
/// `None` for countries not in the table; callers report that and localize
/// with English and input order only.
pub fn languages_for_country(country: &str) -> Option<&'static [&'static str]> {
    let languages: &'static [&'static str] = match country.to_ascii_uppercase().as_str() {
        "AE" => &["arb", "afb"],
        "AL" => &["sq"],
        "AM" => &["hy"],
        "AR" => &["es"],
        "AT" => &["de", "sl"],
        "AU" => &["en"],
        "BD" => &["bn"],
        "BE" => &["nl", "fr"],
        "BG" => &["bg"],
        "BR" => &["pt"],
        "CA" => &["en", "fr"],
        "CH" => &["de", "fr", "it", "rm"],
        "CL" => &["es"],
        "CO" => &["es", "en"],
        "CR" => &["es"],
        "CZ" => &["cs"],
        "DE" => &["de"],
        "DK" => &["dk", "nb", "sv"],
        "EC" => &["es"],
        "EE" => &["et"],
        "ES" => &["es", "ca"],
        "ET" => &["aa", "am", "om", "so", "ti"],
        "FI" => &["fi", "sv", "dk", "nb"],
        "FR" => &["fr"],
        "GE" => &["ka", "ab"],
        "GR" => &["el"],
        "HR" => &["hr"],
        "HU" => &["hu"],
        "IE" => &["en"],
        "IL" => &["he"],
        "IS" => &["is", "dk", "nb", "sv"],
        "IT" => &["it"],
        "JP" => &["jp"],
        "KE" => &["sw", "en"],
        "KR" => &["ko"],
        // Kosovo, as used by the Kosovo NREN
        "KS" => &["sq", "sr"],
        "LA" => &["lo"],
        "LK" => &["si", "ta"],
        "LT" => &["lt"],
        "LU" => &["fr", "de"],
        "LV" => &["lv"],
        "MA" => &["arb", "zgh"],
        "MD" => &["ro"],
        "ME" => &["cnr"],
        "MK" => &["mk", "sq"],
        "MT" => &["mt", "en"],
        "MW" => &["en", "ny"],
        "MX" => &["es"],
        "MY" => &["zsm", "en", "zh"],
        "NG" => &["nb"],
        "NL" => &["nl"],
        "NO" => &["nb", "dk", "sv"],
        "NZ" => &["en", "mi"],
        "OM" => &["arb"],
        "PE" => &["es"],
        "PH" => &["fil", "en"],
        "PK" => &["ur", "en"],
        "PL" => &["pl"],
        "PT" => &["pt"],
        "RO" => &["ro"],
        "RS" => &["rs"],
        "SE" => &["sv", "dk", "nb"],
        "SG" => &["en", "ms", "zh", "ta"],
        "SI" => &["sl"],
        "SK" => &["sk"],
        "TR" => &["tr"],
        "UA" => &["uk"],
        "UG" => &["en", "sw"],
        "UK" => &["en"],
        "US" => &["en", "es"],
        "UY" => &["es"],
        // Kosovo, ISO user-assigned code
        "XK" => &["sq", "sr"],
        "ZA" => &["en", "af", "zu", "xh", "nso", "tn", "st", "ts", "ss", "ve", "nr"],
        "ZM" => &["en", "ny", "bem"],
        _ => return None,
    };
    Some(languages)
}
