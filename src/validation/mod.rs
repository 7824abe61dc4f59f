/// Looks up MX and A records for a domain within a caller-supplied timeout.
///
/// [`Domain`] owns the timeout policy:
/// - an empty name never queries DNS
/// - NXDOMAIN and empty answers resolve to [`ServerLookup::ConfirmedEmpty`]
/// - a timeout resolves to `ConfirmedEmpty`, or to [`ServerLookup::Unknown`]
///   when `fail_on_timeout` is set
///
/// # Examples
/// ```no_run
/// use std::time::Duration;
/// use email_veracity::validation::domain::{Domain, DomainOptions};
///
/// let domain = Domain::new("gmail.com", DomainOptions::new(Duration::from_secs(2))).unwrap();
/// assert!(domain.has_servers());
/// ```
pub mod domain;

/// Splits an address into local part and [`Domain`] and checks its shape.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use email_veracity::validation::email_address::{EmailAddress, EmailOptions};
///
/// let options = EmailOptions::new(Duration::from_secs(2));
/// let email = EmailAddress::new("carsten,comma@example.com", &options).unwrap();
/// assert_eq!(email.local_part(), "carsten,comma");
/// assert!(!email.local_part_is_valid());
/// assert_eq!(email.pattern_is_valid(), Some(false));
/// ```
pub mod email_address;

/// The DNS boundary: the [`DnsLookup`](resolver::DnsLookup) trait and the
/// `trust-dns-resolver` backed [`SystemResolver`].
pub mod resolver;

pub use domain::{Domain, DomainOptions, ServerLookup};
pub use email_address::{Checks, EmailAddress, EmailOptions, Verdict};
pub use resolver::{DnsLookup, LookupError, MxServer, SystemResolver};
