//! Decides whether an email address is plausibly deliverable without sending
//! mail: pattern and local-part checks on the address, then MX and A lookups
//! for its domain under a caller-supplied timeout.

pub mod config;
pub mod error;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod validation;

pub use error::{Error, Result};
pub use validation::{
    Checks, DnsLookup, Domain, DomainOptions, EmailAddress, EmailOptions, ServerLookup, Verdict,
};
