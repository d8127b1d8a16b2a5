//! Cookie data model shared by the host, the interceptor and the inspector
//!
//! Field names serialize in the camelCase layout browsers use for their
//! extension cookie API, so a cookie can be handed to or read from a host
//! without translation.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::UrlUtils;

/// Store identifier used when a tab does not report one.
pub const DEFAULT_STORE_ID: &str = "0";

/// A cookie as reported by the host cookie store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Domain as stored by the host; domain cookies carry a leading dot.
    pub domain: String,
    pub host_only: bool,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub store_id: String,
    /// Seconds since the Unix epoch; `None` for session cookies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
}

impl Cookie {
    pub fn is_session(&self) -> bool {
        self.expiration_date.is_none()
    }

    pub fn is_expired_at(&self, now: f64) -> bool {
        matches!(self.expiration_date, Some(expires) if expires <= now)
    }

    /// URL the host API needs to address this cookie.
    pub fn url(&self) -> String {
        UrlUtils::cookie_url(self.secure, &self.domain, &self.path)
    }

    /// Whether a request to `url` would carry this cookie.
    pub fn matches_url(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        if self.secure && url.scheme() != "https" {
            return false;
        }
        let host = host.to_ascii_lowercase();
        let bare = UrlUtils::strip_leading_dot(&self.domain).to_ascii_lowercase();
        let domain_ok = if self.host_only {
            host == bare
        } else {
            UrlUtils::domain_matches(&host, &bare)
        };
        domain_ok && UrlUtils::path_matches(url.path(), &self.path)
    }
}

/// Why the host reported a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCause {
    /// Set or removed by an explicit call.
    Explicit,
    /// Replaced by a newer cookie with the same identity.
    Overwrite,
    /// Removed because its expiry passed.
    Expired,
    /// Removed by a write whose expiry was already in the past.
    ExpiredOverwrite,
}

/// A change event delivered by the host for every cookie mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieChange {
    pub cookie: Cookie,
    pub removed: bool,
    pub cause: ChangeCause,
}

impl CookieChange {
    pub fn added(cookie: Cookie) -> Self {
        Self {
            cookie,
            removed: false,
            cause: ChangeCause::Explicit,
        }
    }

    pub fn removed(cookie: Cookie, cause: ChangeCause) -> Self {
        Self {
            cookie,
            removed: true,
            cause,
        }
    }
}

/// Query for every cookie sent to a URL within a store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAllDetails {
    pub url: String,
    pub store_id: Option<String>,
}

/// A cookie write, keyed by the URL the cookie belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDetails {
    pub url: String,
    pub name: String,
    pub value: String,
    /// Leave empty for a host-only cookie.
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub expiration_date: Option<f64>,
    pub store_id: Option<String>,
}

impl SetDetails {
    /// Rewrite `cookie` with a new value, keeping every other attribute.
    pub fn replacing_value(cookie: &Cookie, value: &str) -> Self {
        Self {
            url: cookie.url(),
            name: cookie.name.clone(),
            value: value.to_string(),
            domain: (!cookie.host_only).then(|| cookie.domain.clone()),
            path: Some(cookie.path.clone()),
            secure: cookie.secure,
            http_only: cookie.http_only,
            expiration_date: cookie.expiration_date,
            store_id: Some(cookie.store_id.clone()),
        }
    }
}

/// Removal of a single cookie by URL and name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveDetails {
    pub url: String,
    pub name: String,
    pub store_id: Option<String>,
}

impl RemoveDetails {
    pub fn for_cookie(cookie: &Cookie) -> Self {
        Self {
            url: cookie.url(),
            name: cookie.name.clone(),
            store_id: Some(cookie.store_id.clone()),
        }
    }
}

/// The browser tab whose cookies are being inspected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub url: String,
    pub cookie_store_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(domain: &str, host_only: bool, path: &str, secure: bool) -> Cookie {
        Cookie {
            name: "sid".to_string(),
            value: "1".to_string(),
            domain: domain.to_string(),
            host_only,
            path: path.to_string(),
            secure,
            http_only: false,
            store_id: DEFAULT_STORE_ID.to_string(),
            expiration_date: None,
        }
    }

    #[test]
    fn url_uses_scheme_from_secure_flag_and_strips_dot() {
        assert_eq!(
            cookie(".example.com", false, "/app", true).url(),
            "https://example.com/app"
        );
        assert_eq!(
            cookie("example.com", true, "/", false).url(),
            "http://example.com/"
        );
    }

    #[test]
    fn host_only_cookie_does_not_match_subdomain() {
        let url = Url::parse("https://www.example.com/").expect("url");
        assert!(!cookie("example.com", true, "/", false).matches_url(&url));
        assert!(cookie(".example.com", false, "/", false).matches_url(&url));
    }

    #[test]
    fn secure_cookie_requires_https() {
        let url = Url::parse("http://example.com/").expect("url");
        assert!(!cookie("example.com", true, "/", true).matches_url(&url));
    }

    #[test]
    fn replacing_value_keeps_host_only_cookies_host_only() {
        let mut original = cookie("example.com", true, "/a", true);
        original.expiration_date = Some(2_000_000_000.0);
        let details = SetDetails::replacing_value(&original, "locked");
        assert_eq!(details.domain, None);
        assert_eq!(details.path.as_deref(), Some("/a"));
        assert_eq!(details.expiration_date, Some(2_000_000_000.0));
        assert_eq!(details.url, "https://example.com/a");

        let domain_cookie = cookie(".example.com", false, "/", false);
        let details = SetDetails::replacing_value(&domain_cookie, "locked");
        assert_eq!(details.domain.as_deref(), Some(".example.com"));
    }

    #[test]
    fn cookie_serializes_in_extension_layout() {
        let json = serde_json::to_value(cookie(".example.com", false, "/", false)).expect("json");
        assert_eq!(json["storeId"], "0");
        assert_eq!(json["httpOnly"], false);
        assert!(json.get("expirationDate").is_none());
    }
}
