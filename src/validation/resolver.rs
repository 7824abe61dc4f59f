use std::future::Future;
use std::net::Ipv4Addr;
use std::thread;
use std::time::Duration;

use tokio::runtime::Builder;
use tracing::{debug, warn};
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    system_conf,
};

/// A mail exchange host as published in an MX record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxServer {
    pub preference: u16,
    pub exchange: String,
}

/// Why a lookup produced no records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The query did not finish before its deadline.
    TimedOut,
    /// NXDOMAIN, no records of the requested type, or any other resolver failure.
    NotFound(String),
}

/// The DNS capability consumed by [`Domain`](super::domain::Domain).
///
/// Implementations must return within `timeout` and must not keep working on the
/// query after returning.
#[cfg_attr(test, mockall::automock)]
pub trait DnsLookup: Send + Sync {
    /// Mail exchange records for `name`.
    fn mx(&self, name: &str, timeout: Duration) -> std::result::Result<Vec<MxServer>, LookupError>;

    /// IPv4 address records for `name`.
    fn a(&self, name: &str, timeout: Duration) -> std::result::Result<Vec<Ipv4Addr>, LookupError>;
}

/// Resolves against the host's configured nameservers.
///
/// Construction does no I/O. Each lookup runs on its own short-lived thread
/// with its own current-thread runtime and resolver, so it is safe to call
/// from async code and nothing outlives the deadline.
#[derive(Debug, Clone, Default)]
pub struct SystemResolver {
    config: Option<(ResolverConfig, ResolverOpts)>,
}

impl SystemResolver {
    /// Reads the system configuration at lookup time, falling back to the
    /// library's default upstreams when it cannot be read.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses fixed nameservers instead of the system configuration.
    pub fn with_config(config: ResolverConfig, opts: ResolverOpts) -> Self {
        Self {
            config: Some((config, opts)),
        }
    }

    /// Resolver settings for one lookup. The caller's `timeout` is the only
    /// deadline: one attempt, bounded by `timeout`, with no cache.
    fn settings(&self, timeout: Duration) -> (ResolverConfig, ResolverOpts) {
        let (config, mut opts) = match &self.config {
            Some(fixed) => fixed.clone(),
            None => system_conf::read_system_conf().unwrap_or_else(|e| {
                warn!(error = %e, "could not read system resolver config, using defaults");
                (ResolverConfig::default(), ResolverOpts::default())
            }),
        };
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.cache_size = 0;
        (config, opts)
    }

    /// Runs `query` on a dedicated thread and joins it. The thread's runtime
    /// enforces the deadline and is dropped before the thread exits.
    fn run<T, F, Fut>(&self, timeout: Duration, query: F) -> std::result::Result<T, LookupError>
    where
        T: Send + 'static,
        F: FnOnce(TokioAsyncResolver) -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<T, ResolveError>>,
    {
        let (config, opts) = self.settings(timeout);

        let handle = thread::Builder::new()
            .name("dns-lookup".to_string())
            .spawn(move || {
                let runtime = Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .map_err(|e| LookupError::NotFound(format!("dns runtime: {e}")))?;
                runtime.block_on(async move {
                    let resolver = TokioAsyncResolver::tokio(config, opts);
                    with_deadline(timeout, query(resolver)).await
                })
            })
            .map_err(|e| LookupError::NotFound(format!("dns thread: {e}")))?;

        handle
            .join()
            .unwrap_or_else(|_| Err(LookupError::NotFound("dns thread panicked".to_string())))
    }
}

impl DnsLookup for SystemResolver {
    fn mx(&self, name: &str, timeout: Duration) -> std::result::Result<Vec<MxServer>, LookupError> {
        let fqdn = fully_qualified(name);
        let mut servers = self.run(timeout, move |resolver| async move {
            let lookup = resolver.mx_lookup(fqdn.as_str()).await?;
            Ok(lookup
                .iter()
                .map(|mx| MxServer {
                    preference: mx.preference(),
                    exchange: mx.exchange().to_utf8(),
                })
                .collect::<Vec<_>>())
        })?;

        servers.sort_by_key(|server| server.preference);
        debug!(domain = name, count = servers.len(), "mx lookup finished");
        Ok(servers)
    }

    fn a(&self, name: &str, timeout: Duration) -> std::result::Result<Vec<Ipv4Addr>, LookupError> {
        let fqdn = fully_qualified(name);
        let addresses = self.run(timeout, move |resolver| async move {
            let lookup = resolver.ipv4_lookup(fqdn.as_str()).await?;
            Ok(lookup.iter().map(|a| a.0).collect::<Vec<_>>())
        })?;

        debug!(domain = name, count = addresses.len(), "a lookup finished");
        Ok(addresses)
    }
}

/// Awaits `query` for at most `timeout`. On expiry the query future is dropped.
pub(crate) async fn with_deadline<T, F>(
    timeout: Duration,
    query: F,
) -> std::result::Result<T, LookupError>
where
    F: Future<Output = std::result::Result<T, ResolveError>>,
{
    match tokio::time::timeout(timeout, query).await {
        Ok(Ok(found)) => Ok(found),
        Ok(Err(e)) => Err(classify(&e)),
        Err(_) => Err(LookupError::TimedOut),
    }
}

fn classify(error: &ResolveError) -> LookupError {
    match error.kind() {
        ResolveErrorKind::Timeout => LookupError::TimedOut,
        _ => LookupError::NotFound(error.to_string()),
    }
}

fn fully_qualified(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}
