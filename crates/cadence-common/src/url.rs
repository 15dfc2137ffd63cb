//! URL resolution and the HTTPS-only policy for `url()` values.
//!
//! [URL Standard](https://url.spec.whatwg.org/)

use thiserror::Error;

/// A URL rejected by the HTTPS-only policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    /// The URL resolved to a scheme other than `https:`.
    #[error("URL must be HTTPS: \"{0}\"")]
    Insecure(String),
}

/// Whether a `url()` value is already final: a `data:` or `https:` URL that
/// needs no resolution against a base URL. Scheme matching is ASCII
/// case-insensitive.
#[must_use]
pub fn is_final_url(url: &str) -> bool {
    has_scheme(url, "https:") || has_scheme(url, "data:")
}

fn has_scheme(url: &str, scheme: &str) -> bool {
    url.get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}

/// Resolve a potentially relative URL against a base URL.
///
/// # Algorithm
///
/// STEP 1: "If url is an absolute URL, return url."
///
/// STEP 2: "Otherwise, resolve url relative to base."
///
/// NOTE: This is a simplified implementation covering protocol-relative,
/// origin-relative and directory-relative references.
#[must_use]
pub fn resolve_url(href: &str, base_url: Option<&str>) -> String {
    // STEP 1: Check if href is already absolute.
    //
    // [URL Standard § 4.3](https://url.spec.whatwg.org/#url-parsing)
    // "An absolute-URL string is a URL-scheme string, followed by U+003A (:),
    // followed by a scheme-specific part."
    if ["http:", "https:", "data:", "file:"]
        .iter()
        .any(|scheme| has_scheme(href, scheme))
    {
        return href.to_string();
    }

    // STEP 2: Resolve relative URL against base.
    let Some(base) = base_url else {
        return href.to_string();
    };

    if let Some(rest) = href.strip_prefix("//") {
        // Protocol-relative URL - borrow the scheme from base
        let scheme = base.split_once(':').map_or("https", |(scheme, _)| scheme);
        format!("{scheme}://{rest}")
    } else if href.starts_with('/') {
        // Absolute path - join with the origin of base
        base.find("://").map_or_else(
            || href.to_string(),
            |scheme_end| {
                let after_scheme = &base[scheme_end + 3..];
                after_scheme.find('/').map_or_else(
                    || format!("{base}{href}"),
                    |path_start| format!("{}{href}", &base[..scheme_end + 3 + path_start]),
                )
            },
        )
    } else {
        // Relative path - join with base directory
        let base_dir = base.rsplit_once('/').map_or(base, |(dir, _)| dir);
        format!("{base_dir}/{href}")
    }
}

/// Enforce the HTTPS-only policy on a resolved URL.
///
/// Plain `http:` is tolerated only for loopback hosts so local development
/// servers keep working: `localhost`, any `*.localhost` subdomain,
/// `127.0.0.1` and `[::1]`.
///
/// # Errors
///
/// Returns [`UrlError::Insecure`] for any other scheme or host.
pub fn assert_https_url(url: &str) -> Result<String, UrlError> {
    if has_scheme(url, "https:") || is_loopback_http(url) {
        Ok(url.to_string())
    } else {
        Err(UrlError::Insecure(url.to_string()))
    }
}

/// Whether `url` is `http:` on a loopback host. The host is compared whole,
/// so `http://localhost.evil.com` does not qualify.
fn is_loopback_http(url: &str) -> bool {
    const SCHEME: &str = "http://";
    if !has_scheme(url, SCHEME) {
        return false;
    }
    let authority = &url[SCHEME.len()..];
    let authority = authority
        .find(['/', '?', '#'])
        .map_or(authority, |end| &authority[..end]);
    // Userinfo would otherwise let `http://localhost@evil.com` through.
    if authority.contains('@') {
        return false;
    }
    let host = if authority.starts_with('[') {
        match authority.find(']') {
            Some(end) if authority[end + 1..].is_empty() || authority[end + 1..].starts_with(':') => {
                &authority[..=end]
            }
            _ => return false,
        }
    } else {
        authority
            .split_once(':')
            .map_or(authority, |(host, _)| host)
    };
    let host = host.to_ascii_lowercase();
    matches!(host.as_str(), "localhost" | "127.0.0.1" | "[::1]") || host.ends_with(".localhost")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_urls() {
        assert!(is_final_url("https://acme.org/img"));
        assert!(is_final_url("HTTPS://acme.org/img"));
        assert!(is_final_url("data:abc"));
        assert!(!is_final_url("http://acme.org/img"));
        assert!(!is_final_url("/relative"));
        assert!(!is_final_url(""));
    }

    #[test]
    fn test_resolve_relative() {
        let base = Some("https://acme.org/docs/page.html");
        assert_eq!(resolve_url("/img.png", base), "https://acme.org/img.png");
        assert_eq!(resolve_url("img.png", base), "https://acme.org/docs/img.png");
        assert_eq!(resolve_url("//cdn.org/a.png", base), "https://cdn.org/a.png");
        assert_eq!(resolve_url("http://acme.org/a", base), "http://acme.org/a");
        assert_eq!(resolve_url("img.png", None), "img.png");
    }

    #[test]
    fn test_https_policy() {
        assert!(assert_https_url("https://acme.org").is_ok());
        assert!(assert_https_url("http://localhost:8000/a").is_ok());
        assert!(assert_https_url("http://iframe.localhost:8000/a").is_ok());
        assert!(assert_https_url("http://127.0.0.1/a").is_ok());
        assert!(assert_https_url("http://[::1]:8000/a").is_ok());
        assert!(assert_https_url("HTTP://LOCALHOST").is_ok());
        assert_eq!(
            assert_https_url("http://acme.org/non-secure"),
            Err(UrlError::Insecure("http://acme.org/non-secure".to_string()))
        );
    }

    #[test]
    fn test_https_policy_rejects_lookalike_hosts() {
        for url in [
            "http://localhost.evil.com/a",
            "http://localhostevil.com/a",
            "http://foolocalhost",
            "http://127.0.0.1.attacker.net/a",
            "http://[::1].attacker.net/a",
            "http://localhost@evil.com/a",
            "ftp://localhost/a",
        ] {
            assert_eq!(
                assert_https_url(url),
                Err(UrlError::Insecure(url.to_string())),
                "{url}"
            );
        }
    }
}
