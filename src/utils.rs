//! Utility functions and helpers

use crate::error::{CookieMasterError, Result};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

/// URL validation and cookie addressing utilities
pub struct UrlUtils;

impl UrlUtils {
    /// Validate and normalize a tab URL
    ///
    /// Input that already parses with a scheme (`about:blank`, `data:...`)
    /// is kept as is. Anything else, including `host:port`, gets `http://`.
    pub fn validate_url(input: &str) -> Result<Url> {
        if !input.contains("://") {
            if let Ok(url) = Url::parse(input) {
                if !url.path().starts_with(|c: char| c.is_ascii_digit()) {
                    return Ok(url);
                }
            }
        }

        // Add http:// if no scheme is provided
        let url_str = if input.contains("://") {
            input.to_string()
        } else {
            format!("http://{}", input)
        };

        Url::parse(&url_str)
            .map_err(|e| CookieMasterError::InvalidUrl(format!("Invalid URL '{}': {}", input, e)))
    }

    /// Whether the page scheme supports cookie operations
    pub fn is_http_url(url: &str) -> bool {
        url.starts_with("http://") || url.starts_with("https://")
    }

    /// Scheme part of a URL-ish string, for the unavailable-page message
    pub fn scheme_of(url: &str) -> &str {
        url.split(':').next().unwrap_or(url)
    }

    pub fn strip_leading_dot(domain: &str) -> &str {
        domain.strip_prefix('.').unwrap_or(domain)
    }

    /// Reconstruct the URL a cookie belongs to.
    ///
    /// The host cookie API is keyed by URL rather than by domain and path.
    pub fn cookie_url(secure: bool, domain: &str, path: &str) -> String {
        let scheme = if secure { "https" } else { "http" };
        format!("{}://{}{}", scheme, Self::strip_leading_dot(domain), path)
    }

    /// URL used when creating a cookie for `domain` from a page using `protocol`.
    pub fn creation_url(protocol: &str, domain: &str) -> Result<String> {
        let protocol = protocol.trim_end_matches(':');
        let candidate = format!("{}://{}/", protocol, Self::strip_leading_dot(domain.trim()));
        let parsed = Url::parse(&candidate).map_err(|e| {
            CookieMasterError::InvalidUrl(format!("Invalid domain '{}': {}", domain, e))
        })?;
        if parsed.host_str().is_none() {
            return Err(CookieMasterError::InvalidUrl(format!(
                "Invalid domain '{}'",
                domain
            )));
        }
        Ok(candidate)
    }

    /// RFC 6265 domain-match, with `domain` given without a leading dot
    pub fn domain_matches(host: &str, domain: &str) -> bool {
        if domain.is_empty() {
            return false;
        }
        if host == domain {
            return true;
        }
        host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
    }

    /// RFC 6265 path-match
    pub fn path_matches(request_path: &str, cookie_path: &str) -> bool {
        if request_path == cookie_path {
            return true;
        }
        if !request_path.starts_with(cookie_path) {
            return false;
        }
        cookie_path.ends_with('/') || request_path.as_bytes()[cookie_path.len()] == b'/'
    }

    /// RFC 6265 default-path of a request URL
    pub fn default_path(url: &Url) -> String {
        let path = url.path();
        if !path.starts_with('/') {
            return "/".to_string();
        }
        match path.rfind('/') {
            Some(0) | None => "/".to_string(),
            Some(index) => path[..index].to_string(),
        }
    }
}

/// File system utilities
pub struct FileUtils;

impl FileUtils {
    /// Expand tilde (~) in file paths
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        if let Some(rest) = path.strip_prefix('~') {
            if let Some(home_dir) = dirs::home_dir() {
                Ok(home_dir.join(rest.trim_start_matches(['/', '\\'])))
            } else {
                Err(CookieMasterError::Config(
                    "Cannot determine home directory".to_string(),
                ))
            }
        } else {
            Ok(PathBuf::from(path))
        }
    }

    /// Directory holding the cookie jar and the policy store by default
    pub fn default_home() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("cookie-master"))
            .unwrap_or_else(|| PathBuf::from(".cookie-master"))
    }
}

/// Current time in seconds since the Unix epoch
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests;
