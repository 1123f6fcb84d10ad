//! Domain extraction
//!
//! Turns tab URLs into normalized hostnames and coarser root domains.
//!
//! [`root_domain_of`] is a heuristic, not a public-suffix lookup. It treats
//! a short pair of trailing labels (`co.uk`, `com.au`) as a second-level
//! country-code suffix, which is right for the common cases and wrong for
//! hosts like `bbc.co.uk` (three labels, yields `co.uk`) or `a.b.t.co`.

use crate::error::{Error, Result};
use url::Url;

const WWW_PREFIX: &str = "www.";

/// Check whether a string looks like an HTTP(S) URL
pub fn is_web_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// Extract the hostname of an HTTP(S) URL, without a leading `www.` label
///
/// ```
/// use sdc_core::domain::hostname_of;
///
/// assert_eq!(hostname_of("https://www.example.com/x").unwrap(), "example.com");
/// assert!(hostname_of("chrome://extensions").is_err());
/// ```
pub fn hostname_of(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::invalid_url(url, e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::invalid_url(
                url,
                format!("unsupported scheme '{other}'"),
            ))
        }
    }

    let host = parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| Error::invalid_url(url, "missing host"))?;

    Ok(host.strip_prefix(WWW_PREFIX).unwrap_or(host).to_string())
}

/// Derive the root domain of a hostname
///
/// ```
/// use sdc_core::domain::root_domain_of;
///
/// assert_eq!(root_domain_of("mail.google.com"), "google.com");
/// assert_eq!(root_domain_of("a.b.co.uk"), "b.co.uk");
/// ```
pub fn root_domain_of(hostname: &str) -> String {
    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() < 2 {
        return hostname.to_string();
    }

    let last = labels.len() - 1;
    let elem1 = labels[last - 1];
    let elem2 = labels[last];

    let second_level = labels.len() >= 4 && elem1.len() + elem2.len() <= 5;
    if second_level {
        format!("{}.{}.{}", labels[last - 2], elem1, elem2)
    } else {
        format!("{elem1}.{elem2}")
    }
}

/// Check whether `hostname` is `root` itself or one of its subdomains
///
/// Compares whole labels, so `notexample.com` is not within `example.com`.
pub fn is_within(hostname: &str, root: &str) -> bool {
    match hostname.strip_suffix(root) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}

/// The `www.`-prefixed form of a root domain, where site cookies usually live
pub fn www_of(root: &str) -> String {
    format!("{WWW_PREFIX}{root}")
}
