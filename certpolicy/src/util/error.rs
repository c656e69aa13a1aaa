//! Error types

use core::fmt;

use crate::field::extension_kind::ExtensionKind;

/// Result type
pub type Result<T> = core::result::Result<T, Error>;

/// Error type
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// InvalidUsage occurs when a field's value is read before a successful injection, i.e., the
    /// caller did not follow the inject-then-read protocol. It says nothing about the certificate.
    InvalidUsage(ExtensionKind),
    /// PolicyRequiredViolation occurs when a field marked as required is injected from a certificate
    /// that does not contain the corresponding extension.
    PolicyRequiredViolation(ExtensionKind),
    /// MalformedExtension occurs when an extension is present but its value cannot be decoded.
    MalformedExtension(ExtensionKind),
    /// NotFound occurs when an action failed because a necessary artifact was not found.
    NotFound,
    /// An artifact could not be parsed
    ParseError,
    /// A configuration error was detected. See textual log output for more details.
    Misconfiguration,
    /// Asn1Error is used to propagate error information from the x509 crate.
    Asn1Error(der::Error),
    /// Error encapsulates an error derived from [std::io::ErrorKind]
    #[cfg(feature = "std")]
    StdIoError(std::io::ErrorKind),
}

impl Error {
    /// `is_policy_violation` returns true for errors that describe the content of a certificate
    /// (a missing required extension or an undecodable one) as opposed to misuse of the API.
    pub fn is_policy_violation(&self) -> bool {
        matches!(
            self,
            Error::PolicyRequiredViolation(_) | Error::MalformedExtension(_)
        )
    }
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Error {
        Error::Asn1Error(err)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::StdIoError(err.kind())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidUsage(kind) => write!(f, "InvalidUsage: {}", kind),
            Error::PolicyRequiredViolation(kind) => write!(f, "PolicyRequiredViolation: {}", kind),
            Error::MalformedExtension(kind) => write!(f, "MalformedExtension: {}", kind),
            Error::NotFound => write!(f, "NotFound"),
            Error::ParseError => write!(f, "ParseError"),
            Error::Misconfiguration => write!(f, "Misconfiguration"),
            Error::Asn1Error(err) => write!(f, "Asn1Error: {}", err),
            #[cfg(feature = "std")]
            Error::StdIoError(err) => write!(f, "StdError: {:?}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[test]
fn error_test() {
    use alloc::format;

    let _s = format!("{}", Error::InvalidUsage(ExtensionKind::KeyUsage));
    let _s = format!("{}", Error::NotFound);
    let _s = format!("{}", Error::ParseError);
    let _s = format!("{}", Error::Misconfiguration);
    let _s = format!("{}", Error::Asn1Error(der::Error::from(der::ErrorKind::Failed)));
    #[cfg(feature = "std")]
    let _s = format!("{}", Error::StdIoError(std::io::ErrorKind::NotFound));

    assert_eq!(
        "PolicyRequiredViolation: SubjectKeyIdentifier",
        format!(
            "{}",
            Error::PolicyRequiredViolation(ExtensionKind::SubjectKeyIdentifier)
        )
    );
    assert!(Error::MalformedExtension(ExtensionKind::KeyUsage).is_policy_violation());
    assert!(!Error::InvalidUsage(ExtensionKind::KeyUsage).is_policy_violation());
}
