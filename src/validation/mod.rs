/// Validates an email address against a practical subset of RFC 5321/5322.
///
/// The recognizer is a single-pass scanner with explicit quote and escape
/// state. It supports:
/// - Dot-atom local parts (with the apostrophe allowed unquoted)
/// - Fully quoted local parts with backslash escapes
/// - Length limits of 64 (local part) and 255 (domain)
///
/// # Examples
/// ```
/// use email_verifier::validation::syntax::is_valid_email;
///
/// assert!(is_valid_email("\"Abc\\@def\"@example.com"));
/// assert!(!is_valid_email("Abc\\@def@example.com"));
/// ```
pub mod syntax;

/// Checks whether a domain can plausibly receive mail by looking up its
/// MX records, optionally falling back to A records.
///
/// DNS access goes through the [`dnsmx::MailResolver`] trait so tests can
/// substitute a deterministic resolver.
pub mod dnsmx;

/// Per-validator options: MX policy, custom messages and DNS activation.
pub mod config;

/// Combines the syntax check and the DNS check into a single verdict.
pub mod validator;

pub use config::{Activation, ValidationConfig};
pub use dnsmx::{MailResolver, TrustDnsResolver};
pub use validator::{EmailValidator, FailureReason, ValidationResult, validate};


#[cfg(test)]
mod validator_test;
