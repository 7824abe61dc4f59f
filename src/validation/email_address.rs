use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::domain::{Domain, DomainOptions, ServerLookup};
use super::resolver::{DnsLookup, SystemResolver};
use crate::error::Result;

/// Whole-address shape: a local part free of whitespace, `@` and commas, then
/// dotted labels ending in an alphabetic label of two or more letters.
static ADDRESS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[^@\s,]+@(?:[-a-z0-9]+\.)+[a-z]{2,}$").expect("address pattern compiles")
});

/// Unquoted dot-atom local part (RFC 5322 section 3.2.3).
static LOCAL_PART_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*$")
        .expect("local part pattern compiles")
});

/// Settings for an [`EmailAddress`]: the DNS options forwarded to its
/// [`Domain`] plus the domains that are never accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailOptions {
    pub domain: DomainOptions,
    invalid_domains: HashSet<String>,
}

impl EmailOptions {
    pub fn new(timeout: Duration) -> Self {
        Self::from_domain_options(DomainOptions::new(timeout))
    }

    pub fn from_domain_options(domain: DomainOptions) -> Self {
        Self {
            domain,
            invalid_domains: HashSet::new(),
        }
    }

    pub fn fail_on_timeout(mut self, fail_on_timeout: bool) -> Self {
        self.domain = self.domain.fail_on_timeout(fail_on_timeout);
        self
    }

    pub fn mx_only(mut self, mx_only: bool) -> Self {
        self.domain = self.domain.mx_only(mx_only);
        self
    }

    /// Domains rejected without a DNS lookup, such as disposable providers.
    /// Matching ignores ASCII case.
    pub fn invalid_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.invalid_domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        self
    }

    pub fn is_invalid_domain(&self, name: &str) -> bool {
        !name.is_empty() && self.invalid_domains.contains(&name.to_ascii_lowercase())
    }
}

/// Which checks [`EmailAddress::verdict`] runs beyond the pattern checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checks {
    /// Resolve the domain and require mail-capable servers.
    pub domain_check: bool,
}

impl Default for Checks {
    fn default() -> Self {
        Self { domain_check: true }
    }
}

/// Combined outcome of all checks on one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// No address was supplied.
    NotApplicable,
    InvalidPattern,
    InvalidLocalPart,
    /// The domain is listed in the invalid domains.
    InvalidDomain,
    NoServers,
    /// DNS timed out and timeouts are configured to fail.
    Unknown,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Definitely rejected, as opposed to valid, unknown or not applicable.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            Self::InvalidPattern | Self::InvalidLocalPart | Self::InvalidDomain | Self::NoServers
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::NotApplicable => "NOT_APPLICABLE",
            Self::InvalidPattern => "INVALID_SYNTAX",
            Self::InvalidLocalPart => "INVALID_LOCAL_PART",
            Self::InvalidDomain => "INVALID_DOMAIN",
            Self::NoServers => "NO_MAIL_SERVERS",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Valid => "Email address is valid",
            Self::NotApplicable => "No email address was given",
            Self::InvalidPattern => "Email address has invalid syntax",
            Self::InvalidLocalPart => "Email address has an invalid local part",
            Self::InvalidDomain => "Email address domain is not accepted",
            Self::NoServers => "Email domain has no mail servers",
            Self::Unknown => "Email domain could not be checked in time",
        }
    }
}

/// A raw address string split into its local part and an owned [`Domain`].
///
/// Construction never does network I/O; only the domain accessors resolve.
#[derive(Debug, Clone)]
pub struct EmailAddress {
    address: String,
    local_part: String,
    domain: Domain,
}

impl EmailAddress {
    /// Parses `address` and resolves its domain through the host's nameservers.
    pub fn new(address: impl Into<String>, options: &EmailOptions) -> Result<Self> {
        Self::with_lookup(address, options, Arc::new(SystemResolver::new()))
    }

    pub fn with_lookup(
        address: impl Into<String>,
        options: &EmailOptions,
        lookup: Arc<dyn DnsLookup>,
    ) -> Result<Self> {
        let address = address.into();
        let (local_part, domain_name) = split(&address);

        let mut domain = Domain::with_lookup(domain_name, options.domain.clone(), lookup)?;
        if options.is_invalid_domain(domain_name) {
            domain = domain.blacklist();
        }

        Ok(Self {
            local_part: local_part.to_string(),
            domain,
            address,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Everything before the last `@`, or the whole address when there is no `@`.
    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    /// The domain after the last `@`, with an empty name when absent.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// `None` when no address was given, otherwise whether the whole address
    /// has an acceptable shape.
    pub fn pattern_is_valid(&self) -> Option<bool> {
        if self.address.is_empty() {
            return None;
        }
        Some(ADDRESS_PATTERN.is_match(&self.address))
    }

    /// Stricter than [`Self::pattern_is_valid`]: separators such as commas and
    /// unbalanced dots are rejected.
    pub fn local_part_is_valid(&self) -> bool {
        LOCAL_PART_PATTERN.is_match(&self.local_part)
    }

    pub fn has_invalid_domain(&self) -> bool {
        self.domain.is_blacklisted()
    }

    /// Runs the pattern checks, then the domain checks selected by `checks`.
    pub fn verdict(&self, checks: &Checks) -> Verdict {
        let verdict = self.evaluate(checks);
        debug!(address = %self.address, verdict = verdict.code(), "email address checked");
        verdict
    }

    fn evaluate(&self, checks: &Checks) -> Verdict {
        match self.pattern_is_valid() {
            None => return Verdict::NotApplicable,
            Some(false) => return Verdict::InvalidPattern,
            Some(true) => {}
        }
        if !self.local_part_is_valid() {
            return Verdict::InvalidLocalPart;
        }
        if self.has_invalid_domain() {
            return Verdict::InvalidDomain;
        }
        if !checks.domain_check {
            return Verdict::Valid;
        }

        let exchange = self.domain.exchange_servers();
        if !exchange.is_empty() {
            return Verdict::Valid;
        }
        let mut unknown = exchange.is_unknown();

        if !self.domain.options().mx_only {
            match self.domain.address_servers() {
                ServerLookup::Confirmed(servers) if !servers.is_empty() => return Verdict::Valid,
                ServerLookup::Unknown => unknown = true,
                _ => {}
            }
        }

        if unknown {
            Verdict::Unknown
        } else {
            Verdict::NoServers
        }
    }
}

fn split(address: &str) -> (&str, &str) {
    address.rsplit_once('@').unwrap_or((address, ""))
}

#[cfg(test)]
#[path = "email_address_test.rs"]
mod tests;
