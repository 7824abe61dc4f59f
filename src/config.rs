use std::env;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::validation::{Checks, EmailOptions};

const TIMEOUT_MS: &str = "EMAIL_VERACITY_TIMEOUT_MS";
const FAIL_ON_TIMEOUT: &str = "EMAIL_VERACITY_FAIL_ON_TIMEOUT";
const MX_ONLY: &str = "EMAIL_VERACITY_MX_ONLY";
const INVALID_DOMAINS: &str = "EMAIL_VERACITY_INVALID_DOMAINS";
const DOMAIN_CHECK: &str = "EMAIL_VERACITY_DOMAIN_CHECK";

/// Service settings, read from the environment (and `.env` via `dotenv`).
///
/// | Variable | Default |
/// |---|---|
/// | `EMAIL_VERACITY_TIMEOUT_MS` | `2000` |
/// | `EMAIL_VERACITY_FAIL_ON_TIMEOUT` | `false` |
/// | `EMAIL_VERACITY_MX_ONLY` | `false` |
/// | `EMAIL_VERACITY_INVALID_DOMAINS` | empty, comma separated |
/// | `EMAIL_VERACITY_DOMAIN_CHECK` | `true` |
/// | `HOST` / `PORT` | `127.0.0.1` / `8080` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub email: EmailOptions,
    pub checks: Checks,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key/value source.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_ms: u64 = parse(&get, TIMEOUT_MS)?.unwrap_or(2000);
        if timeout_ms == 0 {
            return Err(Error::InvalidTimeout);
        }

        let invalid_domains = get(INVALID_DOMAINS).unwrap_or_default();
        let email = EmailOptions::new(Duration::from_millis(timeout_ms))
            .fail_on_timeout(parse_flag(&get, FAIL_ON_TIMEOUT)?.unwrap_or(false))
            .mx_only(parse_flag(&get, MX_ONLY)?.unwrap_or(false))
            .invalid_domains(invalid_domains.split(','));

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse(&get, "PORT")?.unwrap_or(8080),
            email,
            checks: Checks {
                domain_check: parse_flag(&get, DOMAIN_CHECK)?.unwrap_or(true),
            },
        })
    }
}

fn parse<F, T>(get: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::config(key, raw)),
    }
}

fn parse_flag<F>(get: &F, key: &str) -> Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::config(key, raw)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.email.domain.timeout(), Duration::from_secs(2));
        assert!(!settings.email.domain.fail_on_timeout);
        assert!(!settings.email.domain.mx_only);
        assert!(settings.checks.domain_check);
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            (TIMEOUT_MS, "250"),
            (FAIL_ON_TIMEOUT, "yes"),
            (MX_ONLY, "1"),
            (INVALID_DOMAINS, "mailinator.com, Trashmail.com"),
            (DOMAIN_CHECK, "false"),
            ("PORT", "9000"),
        ])
        .unwrap();
        assert_eq!(settings.email.domain.timeout(), Duration::from_millis(250));
        assert!(settings.email.domain.fail_on_timeout);
        assert!(settings.email.domain.mx_only);
        assert!(settings.email.is_invalid_domain("trashmail.com"));
        assert!(settings.email.is_invalid_domain("mailinator.com"));
        assert!(!settings.checks.domain_check);
        assert_eq!(settings.port, 9000);
    }

    #[test]
    fn test_malformed_values() {
        assert!(matches!(
            settings(&[(TIMEOUT_MS, "soon")]),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            settings(&[(FAIL_ON_TIMEOUT, "maybe")]),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            settings(&[(TIMEOUT_MS, "0")]),
            Err(Error::InvalidTimeout)
        ));
    }
}
