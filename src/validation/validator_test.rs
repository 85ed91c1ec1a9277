#[cfg(test)]
mod activation_tests {
    use crate::validation::config::{Activation, ValidationConfig};
    use crate::validation::dnsmx::{DnsError, MockMailResolver, MxRecord};
    use crate::validation::validator::*;
    use std::net::Ipv4Addr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Resolver that knows gmail.com (MX) and example.com (A only)
    fn world_resolver() -> MockMailResolver {
        let mut resolver = MockMailResolver::new();
        resolver.expect_lookup_mx().returning(|domain| match domain {
            "gmail.com" => Ok(vec![MxRecord {
                preference: 5,
                exchange: "gmail-smtp-in.l.google.com".to_string(),
            }]),
            _ => Err(DnsError::NoRecords),
        });
        resolver.expect_lookup_a().returning(|domain| match domain {
            "example.com" => Ok(vec![Ipv4Addr::new(93, 184, 216, 34)]),
            _ => Err(DnsError::NoRecords),
        });
        resolver
    }

    fn toggled_validator(config: ValidationConfig, flag: &Arc<AtomicBool>) -> EmailValidator {
        let backing = Arc::clone(flag);
        EmailValidator::new(
            config.with_activation(Activation::when(move || backing.load(Ordering::SeqCst))),
            Arc::new(world_resolver()),
        )
    }

    #[tokio::test]
    async fn test_toggling_flag_changes_verdict() {
        let flag = Arc::new(AtomicBool::new(false));
        let validator = toggled_validator(ValidationConfig::new().mx(), &flag);

        assert!(validator.validate("test@example.com").await.valid);

        flag.store(true, Ordering::SeqCst);
        let result = validator.validate("test@example.com").await;
        assert!(!result.valid);
        assert_eq!(result.failure_reason, Some(FailureReason::DomainUnreachable));

        flag.store(false, Ordering::SeqCst);
        assert!(validator.validate("test@example.com").await.valid);
    }

    #[tokio::test]
    async fn test_active_predicate_accepts_mx_domain() {
        let flag = Arc::new(AtomicBool::new(true));
        let validator = toggled_validator(ValidationConfig::new().mx(), &flag);

        assert!(validator.validate("test@gmail.com").await.valid);
    }

    #[tokio::test]
    async fn test_predicate_with_fallback_to_a() {
        let flag = Arc::new(AtomicBool::new(true));
        let validator = toggled_validator(ValidationConfig::new().mx_with_fallback_to_a(), &flag);

        assert!(validator.validate("test@example.com").await.valid);
        assert!(!validator.validate("test@exampledoesnotexist.com").await.valid);

        flag.store(false, Ordering::SeqCst);
        assert!(validator.validate("test@exampledoesnotexist.com").await.valid);
    }

    #[tokio::test]
    async fn test_predicate_evaluated_once_per_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let validator = EmailValidator::new(
            ValidationConfig::new().mx().with_activation(Activation::when(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })),
            Arc::new(world_resolver()),
        );

        validator.validate("test@gmail.com").await;
        validator.validate("test@gmail.com").await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_predicate_not_consulted_on_syntax_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let validator = EmailValidator::new(
            ValidationConfig::new().mx().with_activation(Activation::when(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })),
            Arc::new(world_resolver()),
        );

        let result = validator.validate("testexample.com").await;
        assert_eq!(result.failure_reason, Some(FailureReason::SyntaxInvalid));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_static_flag_off_skips_dns() {
        let mut resolver = MockMailResolver::new();
        resolver.expect_lookup_mx().never();
        resolver.expect_lookup_a().never();

        let validator = EmailValidator::new(
            ValidationConfig::new()
                .mx()
                .with_activation(Activation::Flag(false)),
            Arc::new(resolver),
        );

        assert!(validator.validate("test@example.com").await.valid);
    }

    #[test]
    fn test_validator_is_usable_from_blocking_code() {
        let validator = EmailValidator::new(
            ValidationConfig::new().mx_with_fallback_to_a(),
            Arc::new(world_resolver()),
        );

        let result = tokio_test::block_on(validator.validate("test@example.com"));
        assert!(result.valid);
        assert!(validator.config().use_mx_with_fallback_to_a);
    }
}
