//! Whitelist of sites whose data is never destroyed
//!
//! Built once from configured origin URLs. Membership is decided by root
//! domain, so whitelisting `https://mail.google.com` exempts every
//! `*.google.com` host.

use crate::domain::{hostname_of, root_domain_of};
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Immutable whitelist derived from origin URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    /// Origins exactly as configured; used as the startup exclude-list
    origins: Vec<String>,
    /// Root domains of the configured origins
    roots: BTreeSet<String>,
}

impl Whitelist {
    /// Create an empty whitelist
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a whitelist from origin URLs
    ///
    /// Fails on the first origin that is not an HTTP(S) URL.
    pub fn from_origins<I, S>(origins: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut whitelist = Self::new();

        for origin in origins {
            let origin = origin.as_ref().trim();
            if origin.is_empty() {
                continue;
            }

            let hostname = hostname_of(origin).map_err(|e| match e {
                Error::InvalidUrl { reason, .. } => {
                    Error::config_value("whitelist.origins", format!("{origin}: {reason}"))
                }
                other => other,
            })?;

            whitelist.roots.insert(root_domain_of(&hostname));
            whitelist.origins.push(origin.to_string());
        }

        info!(
            origins = whitelist.origins.len(),
            roots = whitelist.roots.len(),
            "Loaded whitelist"
        );
        Ok(whitelist)
    }

    /// Check whether a root domain is whitelisted
    pub fn contains_root(&self, root: &str) -> bool {
        self.roots.contains(root)
    }

    /// Check whether a hostname is exempt from destruction
    pub fn is_exempt(&self, hostname: &str) -> bool {
        let root = root_domain_of(hostname);
        let exempt = self.contains_root(&root);
        if exempt {
            debug!(hostname, root = %root, "Hostname is whitelisted");
        }
        exempt
    }

    /// Configured origins, verbatim
    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    /// Whitelisted root domains, sorted
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.roots.iter().map(String::as_str)
    }

    /// Number of whitelisted root domains
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Check if whitelist is empty
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
