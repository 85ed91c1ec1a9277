use async_trait::async_trait;
use std::future::Future;
use std::net::Ipv4Addr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
};

/// Failure of a single DNS query.
///
/// These never leave the reachability check: every variant is treated as
/// "no records found".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DnsError {
    #[error("no records found")]
    NoRecords,
    #[error("DNS query timed out")]
    Timeout,
    #[error("DNS resolution failed: {0}")]
    Resolve(String),
}

impl From<ResolveError> for DnsError {
    fn from(err: ResolveError) -> Self {
        match err.kind() {
            ResolveErrorKind::NoRecordsFound { .. } => DnsError::NoRecords,
            ResolveErrorKind::Timeout => DnsError::Timeout,
            _ => DnsError::Resolve(err.to_string()),
        }
    }
}

/// A mail exchange host advertised by a domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

/// DNS capability needed to decide whether a domain can receive mail.
///
/// Implementations must be safe to share between concurrent validations and
/// must not cache answers across calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailResolver: Send + Sync {
    /// Queries the MX records of `domain`
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError>;

    /// Queries the A records of `domain`
    async fn lookup_a(&self, domain: &str) -> Result<Vec<Ipv4Addr>, DnsError>;
}

/// Which record types to consult, and in what order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DnsPolicy {
    pub try_mx: bool,
    pub fallback_to_a: bool,
}

/// Outcome of [`check_domain`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

impl Reachability {
    pub fn is_reachable(self) -> bool {
        self == Reachability::Reachable
    }
}

/// Decides whether `domain` has usable mail exchange or address records.
///
/// 1. If `policy.try_mx` is set, one MX query is made. Any record makes the
///    domain reachable.
/// 2. If no MX record was found (or the query failed) and
///    `policy.fallback_to_a` is set, one A query is made.
///
/// Each query is bounded by `deadline` when one is given. Timeouts, NXDOMAIN
/// and server failures all count as "no records"; this function never fails.
pub async fn check_domain(
    resolver: &dyn MailResolver,
    domain: &str,
    policy: DnsPolicy,
    deadline: Option<Duration>,
) -> Reachability {
    if policy.try_mx {
        match bounded(deadline, resolver.lookup_mx(domain)).await {
            Ok(records) if !records.is_empty() => {
                debug!(domain, count = records.len(), "MX records found");
                return Reachability::Reachable;
            }
            Ok(_) => debug!(domain, "MX lookup returned no records"),
            Err(err) => log_lookup_error(domain, "MX", &err),
        }
    }

    if policy.fallback_to_a {
        match bounded(deadline, resolver.lookup_a(domain)).await {
            Ok(addrs) if !addrs.is_empty() => {
                debug!(domain, count = addrs.len(), "A records found");
                return Reachability::Reachable;
            }
            Ok(_) => debug!(domain, "A lookup returned no records"),
            Err(err) => log_lookup_error(domain, "A", &err),
        }
    }

    Reachability::Unreachable
}

async fn bounded<T, F>(deadline: Option<Duration>, lookup: F) -> Result<T, DnsError>
where
    F: Future<Output = Result<T, DnsError>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, lookup)
            .await
            .map_err(|_| DnsError::Timeout)?,
        None => lookup.await,
    }
}

fn log_lookup_error(domain: &str, record_type: &str, err: &DnsError) {
    match err {
        DnsError::Timeout => warn!(domain, record_type, "DNS lookup timed out"),
        _ => debug!(domain, record_type, error = %err, "DNS lookup failed"),
    }
}

/// [`MailResolver`] backed by the trust-dns tokio resolver.
///
/// The resolver's own answer cache is disabled, so every validation sees
/// fresh DNS state.
#[derive(Clone)]
pub struct TrustDnsResolver {
    resolver: TokioAsyncResolver,
}

impl TrustDnsResolver {
    /// Creates a resolver using the default upstream configuration
    ///
    /// * `timeout` - per-request timeout applied by the resolver
    /// * `attempts` - number of attempts per request
    pub fn new(timeout: Duration, attempts: usize) -> Self {
        Self::with_config(ResolverConfig::default(), timeout, attempts)
    }

    pub fn with_config(config: ResolverConfig, timeout: Duration, attempts: usize) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = attempts;
        opts.cache_size = 0;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

impl Default for TrustDnsResolver {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), 2)
    }
}

#[async_trait]
impl MailResolver for TrustDnsResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        let lookup = self.resolver.mx_lookup(fully_qualified(domain)).await?;
        Ok(lookup
            .iter()
            .map(|mx| MxRecord {
                preference: mx.preference(),
                exchange: mx.exchange().to_string().trim_end_matches('.').to_string(),
            })
            .collect())
    }

    async fn lookup_a(&self, domain: &str) -> Result<Vec<Ipv4Addr>, DnsError> {
        let lookup = self.resolver.ipv4_lookup(fully_qualified(domain)).await?;
        Ok(lookup.iter().map(|a| a.0).collect())
    }
}

/// Appends the root label so the system search list is never consulted
fn fully_qualified(domain: &str) -> String {
    if domain.ends_with('.') {
        domain.to_string()
    } else {
        format!("{}.", domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MX_ONLY: DnsPolicy = DnsPolicy {
        try_mx: true,
        fallback_to_a: false,
    };
    const MX_THEN_A: DnsPolicy = DnsPolicy {
        try_mx: true,
        fallback_to_a: true,
    };

    fn mx(exchange: &str) -> MxRecord {
        MxRecord {
            preference: 10,
            exchange: exchange.to_string(),
        }
    }

    #[tokio::test]
    async fn test_mx_records_make_domain_reachable() {
        let mut resolver = MockMailResolver::new();
        resolver
            .expect_lookup_mx()
            .withf(|domain| domain == "gmail.com")
            .times(1)
            .returning(|_| Ok(vec![mx("gmail-smtp-in.l.google.com")]));
        resolver.expect_lookup_a().never();

        let result = check_domain(&resolver, "gmail.com", MX_THEN_A, None).await;
        assert_eq!(result, Reachability::Reachable);
    }

    #[tokio::test]
    async fn test_no_mx_without_fallback_is_unreachable() {
        let mut resolver = MockMailResolver::new();
        resolver
            .expect_lookup_mx()
            .times(1)
            .returning(|_| Ok(Vec::new()));
        resolver.expect_lookup_a().never();

        let result = check_domain(&resolver, "example.com", MX_ONLY, None).await;
        assert_eq!(result, Reachability::Unreachable);
    }

    #[tokio::test]
    async fn test_falls_back_to_a_records() {
        let mut resolver = MockMailResolver::new();
        resolver
            .expect_lookup_mx()
            .times(1)
            .returning(|_| Err(DnsError::NoRecords));
        resolver
            .expect_lookup_a()
            .times(1)
            .returning(|_| Ok(vec![Ipv4Addr::new(93, 184, 216, 34)]));

        let result = check_domain(&resolver, "example.com", MX_THEN_A, None).await;
        assert!(result.is_reachable());
    }

    #[tokio::test]
    async fn test_resolver_errors_degrade_to_unreachable() {
        let mut resolver = MockMailResolver::new();
        resolver
            .expect_lookup_mx()
            .times(1)
            .returning(|_| Err(DnsError::Resolve("SERVFAIL".to_string())));
        resolver
            .expect_lookup_a()
            .times(1)
            .returning(|_| Err(DnsError::Timeout));

        let result = check_domain(&resolver, "broken.example", MX_THEN_A, None).await;
        assert_eq!(result, Reachability::Unreachable);
    }

    #[tokio::test]
    async fn test_empty_policy_makes_no_queries() {
        let mut resolver = MockMailResolver::new();
        resolver.expect_lookup_mx().never();
        resolver.expect_lookup_a().never();

        let result = check_domain(&resolver, "example.com", DnsPolicy::default(), None).await;
        assert_eq!(result, Reachability::Unreachable);
    }

    struct StalledResolver;

    #[async_trait]
    impl MailResolver for StalledResolver {
        async fn lookup_mx(&self, _domain: &str) -> Result<Vec<MxRecord>, DnsError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![mx("late.example.com")])
        }

        async fn lookup_a(&self, _domain: &str) -> Result<Vec<Ipv4Addr>, DnsError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![Ipv4Addr::LOCALHOST])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_each_query() {
        let result = check_domain(
            &StalledResolver,
            "slow.example.com",
            MX_THEN_A,
            Some(Duration::from_millis(100)),
        )
        .await;
        assert_eq!(result, Reachability::Unreachable);
    }

    #[test]
    fn test_fully_qualified() {
        assert_eq!(fully_qualified("example.com"), "example.com.");
        assert_eq!(fully_qualified("example.com."), "example.com.");
    }

    #[tokio::test]
    async fn test_trust_dns_resolver_builds_without_network() {
        let _resolver = TrustDnsResolver::new(Duration::from_millis(500), 1);
        let _default = TrustDnsResolver::default();
    }
}
