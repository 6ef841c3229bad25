// src/utils/url.rs

//! URL manipulation utilities.

use url::{ParseError, Position, Url};

/// Parse a URL as typed by a catalog author.
///
/// Without a scheme, `example.org/path` would be read as a relative path,
/// so such input is retried as `http://example.org/path`.
///
/// # Examples
/// ```
/// use eduroam_discovery::utils::url::parse_lenient;
///
/// let url = parse_lenient("example.org/onboarding").unwrap();
/// assert_eq!(url.as_str(), "http://example.org/onboarding");
/// ```
pub fn parse_lenient(input: &str) -> Option<Url> {
    match Url::parse(input) {
        Ok(url) => Some(url),
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{input}")).ok(),
        Err(_) => None,
    }
}

/// Whether `host` matches an exemption entry.
///
/// Entries starting with `.` match any subdomain, others match exactly.
/// Comparison ignores ASCII case.
pub fn host_matches(host: &str, entry: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let entry = entry.trim().to_ascii_lowercase();
    if entry.starts_with('.') {
        host.ends_with(&entry)
    } else {
        host == entry
    }
}

/// Replace scheme, credentials, host and port of `url` with `prefix`.
///
/// A trailing slash on the prefix is not doubled.
///
/// # Examples
/// ```
/// use eduroam_discovery::utils::url::rebase;
///
/// let prefix = url::Url::parse("https://stub.example.net/").unwrap();
/// let url = url::Url::parse("https://idp.example.org:8443/a/b?c=d").unwrap();
/// assert_eq!(rebase(&prefix, &url), "https://stub.example.net/a/b?c=d");
/// ```
pub fn rebase(prefix: &Url, url: &Url) -> String {
    format!(
        "{}{}",
        prefix.as_str().trim_end_matches('/'),
        &url[Position::BeforePath..]
    )
}
