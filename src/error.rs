use std::fmt;

/// Component of a reference where a [`ParseError`] was found.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    InvalidRegistry,
    InvalidRepository,
    InvalidTag,
    InvalidDigest,

    /// The overall structure is wrong, or strict validation needed
    /// a component that was not present.
    InvalidReference,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::InvalidRegistry => "Invalid registry",
            ErrorKind::InvalidRepository => "Invalid repository",
            ErrorKind::InvalidTag => "Invalid tag",
            ErrorKind::InvalidDigest => "Invalid digest",
            ErrorKind::InvalidReference => "Invalid reference",
        })
    }
}

/// Why a component was rejected.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Reason {
    #[error("empty value.")]
    Empty,

    #[error("illegal character {0:?}.")]
    IllegalCharacter(char),

    #[error("misplaced separator.")]
    MisplacedSeparator,

    #[error("longer than {0} characters.")]
    TooLong(usize),

    #[error("a registry needs a `.` or a port, or to be `localhost`.")]
    NotAHostname,

    #[error("invalid port number.")]
    InvalidPort,

    #[error("unknown digest algorithm.")]
    UnknownAlgorithm,

    #[error("expected {0} lowercase hexadecimal characters.")]
    InvalidHex(usize),

    #[error("strict validation requires an explicit registry.")]
    MissingRegistry,

    #[error("strict validation requires an explicit tag.")]
    MissingTag,

    #[error("strict validation requires the full repository path (missing `library`).")]
    ImplicitNamespace,

    #[error("a digest reference needs exactly one `@` separator.")]
    DigestSeparators,
}

/// Errors from the reference parsers.
///
/// It keeps the text that was rejected, so the message can point to
/// the exact component:
///
/// ```
/// # use oci_name::*;
/// let err = parse_reference("alpine@sha256:abc", &Options::default()).unwrap_err();
///
/// assert_eq!(err.kind(), ErrorKind::InvalidDigest);
/// assert_eq!(err.input(), "sha256:abc");
/// assert_eq!(err.reason(), Reason::InvalidHex(64));
/// ```
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("{kind} `{input}`: {reason}")]
pub struct ParseError {
    kind: ErrorKind,
    input: String,
    reason: Reason,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, input: impl Into<String>, reason: Reason) -> Self {
        ParseError {
            kind,
            input: input.into(),
            reason,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Text that was rejected.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn reason(&self) -> Reason {
        self.reason
    }
}

/// Attach the component and the rejected text to a [`Reason`].
pub(crate) trait ResultExt<T> {
    fn component(self, kind: ErrorKind, input: &str) -> Result<T, ParseError>;
}

impl<T> ResultExt<T> for Result<T, Reason> {
    fn component(self, kind: ErrorKind, input: &str) -> Result<T, ParseError> {
        self.map_err(|reason| ParseError::new(kind, input, reason))
    }
}

#[test]
fn error_messages() {
    let err = ParseError::new(ErrorKind::InvalidTag, "white space", Reason::IllegalCharacter(' '));
    assert_eq!(err.to_string(), "Invalid tag `white space`: illegal character ' '.");

    let err = ParseError::new(ErrorKind::InvalidDigest, "sha256:abc", Reason::InvalidHex(64));
    assert_eq!(
        err.to_string(),
        "Invalid digest `sha256:abc`: expected 64 lowercase hexadecimal characters."
    );
}
