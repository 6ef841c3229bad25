// src/services/profiles.rs

//! Profile classification.
//!
//! Decides for each catalog profile whether it is a letswifi endpoint, a
//! plain web redirect or a generic EAP config download, and validates the
//! redirect URL on the way.

use url::Url;

use crate::error::Result;
use crate::models::{Config, LocalizedName, PROFILE_ID_PREFIX, Profile, RawProfile};
use crate::services::names::localize;
use crate::utils::url::{host_matches, parse_lenient, rebase};

/// Fragment token marking a redirect as a letswifi endpoint.
const LETSWIFI_MARKER: &str = "letswifi";

/// Classifies raw catalog profiles into feed profiles.
#[derive(Debug, Clone)]
pub struct ProfileClassifier {
    download_api_url: String,
    stub_prefix: Option<Url>,
    stub_exempt_hosts: Vec<String>,
}

impl ProfileClassifier {
    /// Build a classifier from configuration.
    ///
    /// Fails when a stub prefix is configured that is not an https URL.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            download_api_url: config.catalog.download_api_url.clone(),
            stub_prefix: config.discovery.stub_prefix_url()?,
            stub_exempt_hosts: config.discovery.stub_exempt_hosts.clone(),
        })
    }

    /// Classify one profile of an institution in `country`.
    ///
    /// The profile only gets its own name when it differs from
    /// `parent_name`. Returns `None` for profiles whose redirect is not
    /// acceptable.
    pub fn classify(
        &self,
        raw: &RawProfile,
        country: &str,
        parent_name: Option<&LocalizedName>,
    ) -> Option<Profile> {
        let raw_id = raw.id();
        let id = format!("{PROFILE_ID_PREFIX}{raw_id}");
        let name = localize(&raw.names, country)
            .filter(|name| Some(name) != parent_name)
            .unwrap_or_default();

        let redirect = raw.redirect_url();
        if redirect.is_empty() {
            return Some(self.generic_config(id, name, &raw_id));
        }

        let Some(mut url) = parse_lenient(redirect) else {
            log::warn!("Profile {raw_id}: unparseable redirect {redirect:?}");
            return None;
        };
        if !matches!(url.scheme(), "http" | "https") {
            log::warn!("Profile {raw_id}: unsupported scheme in {redirect:?}");
            return None;
        }

        let is_letswifi = url
            .fragment()
            .is_some_and(|f| f.split('&').any(|part| part == LETSWIFI_MARKER));
        if !is_letswifi {
            return Some(Profile::WebPortal {
                id,
                name,
                endpoint: url.to_string(),
            });
        }

        if url.scheme() != "https" {
            log::debug!("Profile {raw_id}: letswifi endpoint without https, dropped");
            return None;
        }
        // A `?` after the marker is a query in the wrong place, still a query.
        if url.query().is_some() || url.fragment().is_some_and(|f| f.contains('?')) {
            log::debug!("Profile {raw_id}: letswifi endpoint with query string, dropped");
            return None;
        }
        url.set_fragment(None);

        Some(Profile::SecureTunnel {
            id,
            name,
            endpoint: self.stub_endpoint(&url),
        })
    }

    fn generic_config(&self, id: String, name: LocalizedName, raw_id: &str) -> Profile {
        Profile::GenericConfig {
            id,
            name,
            eapconfig_endpoint: self.download_url("eap-generic", raw_id),
            mobileconfig_endpoint: self.download_url("apple_global", raw_id),
        }
    }

    fn download_url(&self, device: &str, raw_id: &str) -> String {
        format!(
            "{}?action=downloadInstaller&device={}&profile={}",
            self.download_api_url, device, raw_id
        )
    }

    /// Route the endpoint through the stub prefix unless its host is exempt.
    fn stub_endpoint(&self, url: &Url) -> String {
        let Some(prefix) = &self.stub_prefix else {
            return url.to_string();
        };
        let host = url.host_str().unwrap_or_default();
        if self
            .stub_exempt_hosts
            .iter()
            .any(|entry| host_matches(host, entry))
        {
            return url.to_string();
        }
        rebase(prefix, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NameEntry, Scalar};

    fn classifier() -> ProfileClassifier {
        ProfileClassifier::new(&Config::default()).unwrap()
    }

    fn stubbed(exempt: &[&str]) -> ProfileClassifier {
        let mut config = Config::default();
        config.discovery.stub_prefix = Some("https://stub.example.net/".to_string());
        config.discovery.stub_exempt_hosts = exempt.iter().map(|s| s.to_string()).collect();
        ProfileClassifier::new(&config).unwrap()
    }

    fn profile(id: &str, redirect: &str, names: &[(&str, &str)]) -> RawProfile {
        RawProfile {
            id: Scalar::Text(id.to_string()),
            names: names.iter().map(|(l, v)| NameEntry::new(*l, *v)).collect(),
            redirect: Some(serde_json::Value::String(redirect.to_string())),
        }
    }

    fn endpoint(profile: &Profile) -> &str {
        match profile {
            Profile::SecureTunnel { endpoint, .. } | Profile::WebPortal { endpoint, .. } => {
                endpoint
            }
            Profile::GenericConfig {
                eapconfig_endpoint, ..
            } => eapconfig_endpoint,
        }
    }

    #[test]
    fn test_letswifi_profile() {
        let result = classifier()
            .classify(&profile("5", "https://example.org/path#letswifi", &[]), "NL", None)
            .unwrap();
        assert!(matches!(result, Profile::SecureTunnel { .. }));
        assert_eq!(result.id(), "cat_profile_5");
        assert_eq!(endpoint(&result), "https://example.org/path");
        assert!(result.name().is_empty());
    }

    #[test]
    fn test_letswifi_marker_among_fragment_parts() {
        let result = classifier()
            .classify(&profile("5", "https://example.org/#x=1&letswifi", &[]), "NL", None)
            .unwrap();
        assert_eq!(endpoint(&result), "https://example.org/");
    }

    #[test]
    fn test_letswifi_with_query_dropped() {
        let c = classifier();
        assert!(
            c.classify(
                &profile("5", "https://example.org/path#letswifi&x=1?foo=bar", &[]),
                "NL",
                None
            )
            .is_none()
        );
        assert!(
            c.classify(
                &profile("5", "https://example.org/path?realm=x#letswifi", &[]),
                "NL",
                None
            )
            .is_none()
        );
    }

    #[test]
    fn test_letswifi_requires_https() {
        let result = classifier().classify(
            &profile("5", "http://example.org/path#letswifi", &[]),
            "NL",
            None,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_letswifi_without_scheme_is_http_and_dropped() {
        let result =
            classifier().classify(&profile("5", "example.org/path#letswifi", &[]), "NL", None);
        assert!(result.is_none());
    }

    #[test]
    fn test_web_portal_keeps_full_url() {
        let result = classifier()
            .classify(
                &profile("6", "https://wifi.example.org/start?lang=nl#top", &[]),
                "NL",
                None,
            )
            .unwrap();
        assert!(matches!(result, Profile::WebPortal { .. }));
        assert_eq!(
            endpoint(&result),
            "https://wifi.example.org/start?lang=nl#top"
        );
    }

    #[test]
    fn test_web_portal_without_scheme() {
        let result = classifier()
            .classify(&profile("6", "wifi.example.org/start", &[]), "NL", None)
            .unwrap();
        assert_eq!(endpoint(&result), "http://wifi.example.org/start");
    }

    #[test]
    fn test_rejects_other_schemes() {
        let c = classifier();
        assert!(c.classify(&profile("6", "ftp://example.org/", &[]), "NL", None).is_none());
        assert!(c.classify(&profile("6", "mailto:it@example.org", &[]), "NL", None).is_none());
    }

    #[test]
    fn test_generic_config_urls() {
        let result = classifier()
            .classify(&profile("1234", "", &[("en", "Staff")]), "NL", None)
            .unwrap();
        match result {
            Profile::GenericConfig {
                id,
                name,
                eapconfig_endpoint,
                mobileconfig_endpoint,
            } => {
                assert_eq!(id, "cat_profile_1234");
                assert_eq!(name.fallback(), Some("Staff"));
                assert_eq!(
                    eapconfig_endpoint,
                    "https://cat.eduroam.org/user/API.php?action=downloadInstaller&device=eap-generic&profile=1234"
                );
                assert_eq!(
                    mobileconfig_endpoint,
                    "https://cat.eduroam.org/user/API.php?action=downloadInstaller&device=apple_global&profile=1234"
                );
            }
            other => panic!("unexpected profile {other:?}"),
        }
    }

    #[test]
    fn test_missing_redirect_is_generic() {
        let mut raw = profile("7", "", &[]);
        raw.redirect = None;
        let result = classifier().classify(&raw, "NL", None).unwrap();
        assert!(matches!(result, Profile::GenericConfig { .. }));
    }

    #[test]
    fn test_name_same_as_parent_is_dropped() {
        let parent = LocalizedName::any("Example University");
        let result = classifier()
            .classify(
                &profile("8", "", &[("en", "Example University")]),
                "NL",
                Some(&parent),
            )
            .unwrap();
        assert!(result.name().is_empty());
    }

    #[test]
    fn test_stub_prefix_rewrites_endpoint() {
        let result = stubbed(&[])
            .classify(
                &profile("9", "https://idp.example.org/letswifi/#letswifi", &[]),
                "NL",
                None,
            )
            .unwrap();
        assert_eq!(endpoint(&result), "https://stub.example.net/letswifi/");
    }

    #[test]
    fn test_stub_exempt_hosts() {
        let c = stubbed(&["idp.example.org", ".example.edu"]);
        let exact = c
            .classify(&profile("9", "https://idp.example.org/x#letswifi", &[]), "NL", None)
            .unwrap();
        assert_eq!(endpoint(&exact), "https://idp.example.org/x");

        let suffix = c
            .classify(&profile("9", "https://wifi.example.edu/x#letswifi", &[]), "NL", None)
            .unwrap();
        assert_eq!(endpoint(&suffix), "https://wifi.example.edu/x");

        let other = c
            .classify(&profile("9", "https://other.example.com/x#letswifi", &[]), "NL", None)
            .unwrap();
        assert_eq!(endpoint(&other), "https://stub.example.net/x");
    }

    #[test]
    fn test_stub_prefix_does_not_touch_web_portals() {
        let result = stubbed(&[])
            .classify(&profile("9", "https://idp.example.org/portal", &[]), "NL", None)
            .unwrap();
        assert_eq!(endpoint(&result), "https://idp.example.org/portal");
    }

    #[test]
    fn test_insecure_stub_prefix_fails_construction() {
        let mut config = Config::default();
        config.discovery.stub_prefix = Some("http://stub.example.net/".to_string());
        assert!(ProfileClassifier::new(&config).is_err());
    }

    #[test]
    fn test_secure_tunnel_endpoints_are_https_without_query() {
        let c = stubbed(&[".example.org"]);
        let redirects = [
            "https://a.example.org/#letswifi",
            "https://b.example.com/p#letswifi&x",
            "http://c.example.org/#letswifi",
            "https://d.example.org/?q#letswifi",
            "https://e.example.org/#letswifi?q",
        ];
        for redirect in redirects {
            if let Some(Profile::SecureTunnel { endpoint, .. }) =
                c.classify(&profile("1", redirect, &[]), "NL", None)
            {
                let url = Url::parse(&endpoint).unwrap();
                assert_eq!(url.scheme(), "https", "{redirect}");
                assert!(url.query().is_none(), "{redirect}");
                assert!(url.fragment().is_none(), "{redirect}");
            }
        }
    }
}
