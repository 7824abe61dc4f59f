use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::resolver::{DnsLookup, LookupError, MxServer, SystemResolver};
use crate::error::{Error, Result};

/// DNS settings for a [`Domain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainOptions {
    timeout: Duration,
    pub fail_on_timeout: bool,
    pub mx_only: bool,
}

impl DomainOptions {
    /// Options bounding every query by `timeout`. Timeouts degrade to "no servers".
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            fail_on_timeout: false,
            mx_only: false,
        }
    }

    /// Report timeouts as [`ServerLookup::Unknown`] instead of an empty result.
    pub fn fail_on_timeout(mut self, fail_on_timeout: bool) -> Self {
        self.fail_on_timeout = fail_on_timeout;
        self
    }

    /// Only MX records count towards [`Domain::has_servers`].
    pub fn mx_only(mut self, mx_only: bool) -> Self {
        self.mx_only = mx_only;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::InvalidTimeout);
        }
        Ok(())
    }
}

/// Outcome of a single server lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLookup<T> {
    /// The domain publishes at least one record.
    Confirmed(Vec<T>),
    /// No records, no such domain, or a timeout under the default policy.
    ConfirmedEmpty,
    /// The query timed out and `fail_on_timeout` is set.
    Unknown,
}

impl<T> ServerLookup<T> {
    /// `true` for anything that is not a non-empty record list, including `Unknown`.
    pub fn is_empty(&self) -> bool {
        !matches!(self, Self::Confirmed(servers) if !servers.is_empty())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The records found, or an empty slice.
    pub fn servers(&self) -> &[T] {
        match self {
            Self::Confirmed(servers) => servers,
            _ => &[],
        }
    }

    fn from_records(records: Vec<T>) -> Self {
        if records.is_empty() {
            Self::ConfirmedEmpty
        } else {
            Self::Confirmed(records)
        }
    }
}

/// The right-hand side of an email address, checked against DNS on demand.
///
/// Nothing is cached: every accessor issues a fresh query. An empty name never
/// touches the network.
#[derive(Clone)]
pub struct Domain {
    name: String,
    options: DomainOptions,
    blacklisted: bool,
    lookup: Arc<dyn DnsLookup>,
}

impl Domain {
    /// Creates a domain resolved through the host's nameservers.
    pub fn new(name: impl Into<String>, options: DomainOptions) -> Result<Self> {
        Self::with_lookup(name, options, Arc::new(SystemResolver::new()))
    }

    /// Creates a domain resolved through `lookup`.
    pub fn with_lookup(
        name: impl Into<String>,
        options: DomainOptions,
        lookup: Arc<dyn DnsLookup>,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            name: name.into(),
            options,
            blacklisted: false,
            lookup,
        })
    }

    pub(crate) fn blacklist(mut self) -> Self {
        self.blacklisted = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &DomainOptions {
        &self.options
    }

    /// Mail exchange servers, sorted by preference.
    pub fn exchange_servers(&self) -> ServerLookup<MxServer> {
        self.resolve("mx", |name, timeout| self.lookup.mx(name, timeout))
    }

    /// Address records, the fallback signal that the domain exists.
    pub fn address_servers(&self) -> ServerLookup<Ipv4Addr> {
        self.resolve("a", |name, timeout| self.lookup.a(name, timeout))
    }

    /// Whether any mail-capable server was found. Timeouts count as "no".
    pub fn has_servers(&self) -> bool {
        if !self.exchange_servers().is_empty() {
            return true;
        }
        !self.options.mx_only && !self.address_servers().is_empty()
    }

    /// `false` for blacklisted domains without querying DNS, otherwise [`Self::has_servers`].
    pub fn is_valid(&self) -> bool {
        if self.blacklisted {
            debug!(domain = %self.name, "domain is listed as invalid");
            return false;
        }
        self.has_servers()
    }

    pub fn is_blacklisted(&self) -> bool {
        self.blacklisted
    }

    fn resolve<T, F>(&self, kind: &'static str, query: F) -> ServerLookup<T>
    where
        F: FnOnce(&str, Duration) -> std::result::Result<Vec<T>, LookupError>,
    {
        if self.name.is_empty() {
            return ServerLookup::ConfirmedEmpty;
        }

        match query(&self.name, self.options.timeout) {
            Ok(records) => ServerLookup::from_records(records),
            Err(LookupError::NotFound(reason)) => {
                debug!(domain = %self.name, kind, %reason, "no records");
                ServerLookup::ConfirmedEmpty
            }
            Err(LookupError::TimedOut) => {
                warn!(
                    domain = %self.name,
                    kind,
                    timeout_ms = self.options.timeout.as_millis() as u64,
                    "dns lookup timed out"
                );
                if self.options.fail_on_timeout {
                    ServerLookup::Unknown
                } else {
                    ServerLookup::ConfirmedEmpty
                }
            }
        }
    }
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("blacklisted", &self.blacklisted)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "domain_test.rs"]
mod tests;
