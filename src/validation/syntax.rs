use std::fmt;
use thiserror::Error;

/// Longest local part accepted (RFC 5321 section 4.5.3.1.1)
pub const MAX_LOCAL_PART_LEN: usize = 64;
/// Longest domain accepted
pub const MAX_DOMAIN_LEN: usize = 255;
/// Longest single domain label (RFC 1035)
pub const MAX_LABEL_LEN: usize = 63;

const MAX_EMAIL_LEN: usize = MAX_LOCAL_PART_LEN + 1 + MAX_DOMAIN_LEN;

// atext from RFC 5322 section 3.2.3, apostrophe included
const ATOM_SPECIALS: &[u8] = b"!#$%&'*+/=?^_`{|}~-";

/// Reason a candidate address was rejected by [`parse_email`].
///
/// Every variant is an ordinary, expected outcome. Positions are byte
/// offsets into the original candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("email address is empty")]
    Empty,
    #[error("email address is not valid UTF-8")]
    InvalidUtf8,
    #[error("email address contains non-ASCII characters")]
    NonAscii,
    #[error("email address is {len} bytes long")]
    TooLong { len: usize },
    #[error("missing '@' separator")]
    MissingAt,
    #[error("more than one unquoted '@'")]
    MultipleAt,
    #[error("local part is {len} characters long (max {max})", max = MAX_LOCAL_PART_LEN)]
    LocalPartTooLong { len: usize },
    #[error("domain is {len} characters long (max {max})", max = MAX_DOMAIN_LEN)]
    DomainTooLong { len: usize },
    #[error("local part is empty")]
    EmptyLocalPart,
    #[error("local part has a leading, trailing or doubled dot")]
    MisplacedDot,
    #[error("local part has a doubled '+'")]
    DoubledPlus,
    #[error("illegal character {character:?} at position {position}")]
    IllegalCharacter { character: char, position: usize },
    #[error("backslash escape at position {position} outside of quotes")]
    EscapeOutsideQuotes { position: usize },
    #[error("quote at position {position} does not wrap the whole local part")]
    MisplacedQuote { position: usize },
    #[error("quoted local part is not terminated")]
    UnterminatedQuote,
    #[error("quoted local part is empty")]
    EmptyQuotedString,
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain must have at least two labels")]
    SingleLabelDomain,
    #[error("domain ends with a dot")]
    TrailingDot,
    #[error("domain has an empty label")]
    EmptyLabel,
    #[error("domain label {label:?} starts or ends with a hyphen")]
    HyphenPlacement { label: String },
    #[error("domain label is {len} characters long (max {max})", max = MAX_LABEL_LEN)]
    LabelTooLong { len: usize },
    #[error("top-level label {label:?} is invalid")]
    InvalidTopLevel { label: String },
}

/// An address that passed the grammar check, split at its unquoted `@`.
///
/// Both parts borrow from the candidate, so `to_string()` gives back the
/// exact input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedAddress<'a> {
    pub local_part: &'a str,
    pub domain: &'a str,
    /// Local part is wrapped in double quotes
    pub quoted: bool,
    /// Local part contains at least one backslash escape
    pub escaped: bool,
}

impl fmt::Display for ParsedAddress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InQuotes,
    AfterEscape,
}

struct Split {
    at: usize,
    quoted: bool,
    escaped: bool,
    /// Quote or escape error found before `at`, reported after the length checks
    deferred: Option<SyntaxError>,
}

/// Validates an email address against the supported subset of RFC 5321/5322.
///
/// Accepts dot-atom local parts and fully quoted local parts with backslash
/// escapes. Domain literals, comments and internationalized addresses are
/// rejected.
///
/// # Examples
/// ```
/// use email_verifier::validation::syntax::is_valid_email;
///
/// assert!(is_valid_email("user.name+tag@example.com"));
/// assert!(is_valid_email("\"Fred\\ Bloggs\"@example.com"));
/// assert!(!is_valid_email("invalid@ex_mple.com"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    parse_email(email).is_ok()
}

/// Same as [`parse_email`], for input that may not be UTF-8.
///
/// Undecodable bytes are reported as [`SyntaxError::InvalidUtf8`].
pub fn parse_email_bytes(bytes: &[u8]) -> Result<ParsedAddress<'_>, SyntaxError> {
    let email = std::str::from_utf8(bytes).map_err(|_| SyntaxError::InvalidUtf8)?;
    parse_email(email)
}

/// Parses a candidate address into its local part and domain.
///
/// The candidate is scanned once, left to right, to find the first `@`
/// that is neither quoted nor escaped. Length limits are enforced right
/// after the split, before either part is inspected character by character.
/// A misplaced quote or escape does not hide an oversized part: the scan
/// then splits on the next raw `@` and the length errors take precedence.
///
/// # Errors
/// Returns the first [`SyntaxError`] encountered.
pub fn parse_email(email: &str) -> Result<ParsedAddress<'_>, SyntaxError> {
    if email.is_empty() {
        return Err(SyntaxError::Empty);
    }
    if !email.is_ascii() {
        return Err(SyntaxError::NonAscii);
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(SyntaxError::TooLong { len: email.len() });
    }

    let split = split_address(email)?;
    let local_part = &email[..split.at];
    let domain = &email[split.at + 1..];

    if local_part.len() > MAX_LOCAL_PART_LEN {
        return Err(SyntaxError::LocalPartTooLong {
            len: local_part.len(),
        });
    }
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(SyntaxError::DomainTooLong { len: domain.len() });
    }
    if let Some(err) = split.deferred {
        return Err(err);
    }
    if domain.contains('@') {
        return Err(SyntaxError::MultipleAt);
    }

    if split.quoted {
        validate_quoted(local_part)?;
    } else {
        validate_dot_atom(local_part)?;
    }
    validate_domain(domain, split.at + 1)?;

    Ok(ParsedAddress {
        local_part,
        domain,
        quoted: split.quoted,
        escaped: split.escaped,
    })
}

/// Finds the separating `@`, tracking quote and escape state.
///
/// A quote or escape error is held back when a raw `@` follows it, so the
/// caller can check the part lengths first.
fn split_address(email: &str) -> Result<Split, SyntaxError> {
    let bytes = email.as_bytes();
    let mut state = ScanState::Normal;
    let mut quoted = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        let step = match (state, b) {
            (ScanState::Normal, b'@') => {
                return Ok(Split {
                    at: i,
                    quoted,
                    escaped,
                    deferred: None,
                });
            }
            (ScanState::Normal, b'"') if i == 0 => {
                quoted = true;
                Ok(ScanState::InQuotes)
            }
            (ScanState::Normal, b'"') => Err(SyntaxError::MisplacedQuote { position: i }),
            (ScanState::Normal, b'\\') => Err(SyntaxError::EscapeOutsideQuotes { position: i }),
            (ScanState::Normal, _) => Ok(ScanState::Normal),
            (ScanState::InQuotes, b'\\') => {
                escaped = true;
                Ok(ScanState::AfterEscape)
            }
            // closing quote must be the last character of the local part
            (ScanState::InQuotes, b'"') if bytes.get(i + 1) == Some(&b'@') => {
                Ok(ScanState::Normal)
            }
            (ScanState::InQuotes, b'"') => Err(SyntaxError::MisplacedQuote { position: i }),
            (ScanState::InQuotes, _) => Ok(ScanState::InQuotes),
            // input is ASCII here, any byte may be escaped
            (ScanState::AfterEscape, _) => Ok(ScanState::InQuotes),
        };

        match step {
            Ok(next) => state = next,
            Err(err) => {
                return match bytes[i + 1..].iter().position(|&c| c == b'@') {
                    Some(offset) => Ok(Split {
                        at: i + 1 + offset,
                        quoted,
                        escaped,
                        deferred: Some(err),
                    }),
                    None => Err(err),
                };
            }
        }
    }

    match state {
        ScanState::Normal => Err(SyntaxError::MissingAt),
        ScanState::InQuotes | ScanState::AfterEscape => Err(SyntaxError::UnterminatedQuote),
    }
}

/// Dot-atom form: atoms of atext separated by single dots
fn validate_dot_atom(local: &str) -> Result<(), SyntaxError> {
    if local.is_empty() {
        return Err(SyntaxError::EmptyLocalPart);
    }
    if local.starts_with('.') || local.ends_with('.') {
        return Err(SyntaxError::MisplacedDot);
    }

    let mut prev = None;
    for (i, b) in local.bytes().enumerate() {
        match b {
            b'.' if prev == Some(b'.') => return Err(SyntaxError::MisplacedDot),
            b'+' if prev == Some(b'+') => return Err(SyntaxError::DoubledPlus),
            b'.' => {}
            b if is_atext(b) => {}
            b => {
                return Err(SyntaxError::IllegalCharacter {
                    character: b as char,
                    position: i,
                });
            }
        }
        prev = Some(b);
    }
    Ok(())
}

/// Quoted form. Anything outside atext and `.` must be escaped.
fn validate_quoted(local: &str) -> Result<(), SyntaxError> {
    let content = &local[1..local.len() - 1];
    if content.is_empty() {
        return Err(SyntaxError::EmptyQuotedString);
    }

    let mut after_escape = false;
    for (i, b) in content.bytes().enumerate() {
        if after_escape {
            after_escape = false;
            continue;
        }
        match b {
            b'\\' => after_escape = true,
            b'.' => {}
            b if is_atext(b) => {}
            b => {
                return Err(SyntaxError::IllegalCharacter {
                    character: b as char,
                    position: i + 1,
                });
            }
        }
    }
    Ok(())
}

fn validate_domain(domain: &str, offset: usize) -> Result<(), SyntaxError> {
    if domain.is_empty() {
        return Err(SyntaxError::EmptyDomain);
    }
    if domain.ends_with('.') {
        return Err(SyntaxError::TrailingDot);
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(SyntaxError::SingleLabelDomain);
    }

    let mut position = offset;
    for label in &labels {
        validate_label(label, position)?;
        position += label.len() + 1;
    }

    let tld = labels[labels.len() - 1];
    if tld.len() < 2 || tld.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SyntaxError::InvalidTopLevel {
            label: tld.to_string(),
        });
    }
    Ok(())
}

fn validate_label(label: &str, offset: usize) -> Result<(), SyntaxError> {
    if label.is_empty() {
        return Err(SyntaxError::EmptyLabel);
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(SyntaxError::LabelTooLong { len: label.len() });
    }
    if let Some(i) = label
        .bytes()
        .position(|b| !(b.is_ascii_alphanumeric() || b == b'-'))
    {
        return Err(SyntaxError::IllegalCharacter {
            character: label.as_bytes()[i] as char,
            position: offset + i,
        });
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(SyntaxError::HyphenPlacement {
            label: label.to_string(),
        });
    }
    Ok(())
}

fn is_atext(b: u8) -> bool {
    b.is_ascii_alphanumeric() || ATOM_SPECIALS.contains(&b)
}
