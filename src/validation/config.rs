use crate::validation::dnsmx::DnsPolicy;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Decides, per validation call, whether the DNS check runs.
#[derive(Clone, Default)]
pub enum Activation {
    /// DNS checking runs whenever an MX option is set
    #[default]
    Always,
    /// Fixed on or off for the lifetime of the validator
    Flag(bool),
    /// Evaluated again on every call
    When(Arc<dyn Fn() -> bool + Send + Sync>),
}

impl Activation {
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Activation::When(Arc::new(predicate))
    }

    pub fn is_active(&self) -> bool {
        match self {
            Activation::Always => true,
            Activation::Flag(enabled) => *enabled,
            Activation::When(predicate) => predicate(),
        }
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Always => f.write_str("Always"),
            Activation::Flag(enabled) => f.debug_tuple("Flag").field(enabled).finish(),
            Activation::When(_) => f.write_str("When(<predicate>)"),
        }
    }
}

/// Options for one email validator.
///
/// ```
/// use email_verifier::validation::config::ValidationConfig;
///
/// let config = ValidationConfig::new()
///     .mx_with_fallback_to_a()
///     .with_mx_message("does not accept mail");
/// assert!(config.dns_policy().try_mx);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    pub use_mx: bool,
    pub use_mx_with_fallback_to_a: bool,
    /// Replaces the default syntax error message
    pub message: Option<String>,
    /// Replaces the default DNS error message
    pub mx_message: Option<String>,
    pub activation: Activation,
    /// Upper bound for each DNS query, on top of the resolver's own timeout
    pub dns_timeout: Option<Duration>,
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mx(mut self) -> Self {
        self.use_mx = true;
        self
    }

    pub fn mx_with_fallback_to_a(mut self) -> Self {
        self.use_mx_with_fallback_to_a = true;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_mx_message(mut self, message: impl Into<String>) -> Self {
        self.mx_message = Some(message.into());
        self
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = Some(timeout);
        self
    }

    /// Record types to query. Falling back to A always tries MX first.
    pub fn dns_policy(&self) -> DnsPolicy {
        DnsPolicy {
            try_mx: self.use_mx || self.use_mx_with_fallback_to_a,
            fallback_to_a: self.use_mx_with_fallback_to_a,
        }
    }

    /// Whether this call should consult DNS at all
    pub fn dns_check_enabled(&self) -> bool {
        let policy = self.dns_policy();
        policy.try_mx && self.activation.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_defaults_skip_dns() {
        let config = ValidationConfig::new();
        assert_eq!(config.dns_policy(), DnsPolicy::default());
        assert!(!config.dns_check_enabled());
        assert!(config.message.is_none());
        assert!(config.mx_message.is_none());
    }

    #[test]
    fn test_fallback_implies_mx() {
        let policy = ValidationConfig::new().mx_with_fallback_to_a().dns_policy();
        assert!(policy.try_mx);
        assert!(policy.fallback_to_a);

        let policy = ValidationConfig::new().mx().dns_policy();
        assert!(policy.try_mx);
        assert!(!policy.fallback_to_a);
    }

    #[test]
    fn test_static_flag() {
        assert!(!ValidationConfig::new()
            .mx()
            .with_activation(Activation::Flag(false))
            .dns_check_enabled());
        assert!(ValidationConfig::new()
            .mx()
            .with_activation(Activation::Flag(true))
            .dns_check_enabled());
    }

    #[test]
    fn test_predicate_is_reevaluated() {
        let flag = Arc::new(AtomicBool::new(false));
        let backing = Arc::clone(&flag);
        let config = ValidationConfig::new()
            .mx()
            .with_activation(Activation::when(move || backing.load(Ordering::SeqCst)));

        assert!(!config.dns_check_enabled());
        flag.store(true, Ordering::SeqCst);
        assert!(config.dns_check_enabled());
        flag.store(false, Ordering::SeqCst);
        assert!(!config.dns_check_enabled());
    }

    #[test]
    fn test_activation_debug_hides_closure() {
        assert_eq!(format!("{:?}", Activation::when(|| true)), "When(<predicate>)");
        assert_eq!(format!("{:?}", Activation::Flag(true)), "Flag(true)");
    }
}
