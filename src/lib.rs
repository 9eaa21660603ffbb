//! Google-Authenticator-compatible TOTP (RFC 6238) generation and
//! verification, plus the padding-free Base32 codec used for secrets.
//!
//! The codec and code derivation are deterministic and side-effect free;
//! verification compares codes in constant time across a window of adjacent
//! 30-second time slices. [`totp::generate_secret`] is the only operation
//! that touches an external resource (the OS secure random source).
//!
//! ```no_run
//! use gauthenticator::totp::{self, Authenticator};
//!
//! let secret = totp::generate_secret(16)?;
//! let auth = Authenticator::new(secret.clone());
//!
//! let code = totp::derive_code(&secret, 6, totp::slice_time()?)?;
//! assert!(auth.verify(&code)?);
//! # Ok::<(), gauthenticator::OtpError>(())
//! ```

pub mod base32;
pub mod totp;

pub use totp::Authenticator;

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    /// Base32 decode hit a byte outside the alphabet; carries its ordinal.
    #[error("Encoded string is invalid. Contains unknown char #{0}")]
    InvalidEncoding(u8),
    #[error("Secret length must be 16 <= length <= 128, got {0}")]
    SecretLength(usize),
    #[error("The secret may not be an empty string")]
    EmptySecret,
    #[error(
        "The account name may not contain a colon (:) and may not be an empty string. Given {0:?}"
    )]
    InvalidAccountName(String),
    #[error("The issuer may not contain a colon (:) and may not be an empty string. Given {0:?}")]
    InvalidIssuer(String),
    /// The OS secure random source failed. Never downgraded to a weaker
    /// generator; secret generation fails outright.
    #[error("No source of secure randomness: {0}")]
    NoSecureRandomness(getrandom::Error),
    #[error("System time is set before the Unix epoch: {0}")]
    SystemTime(std::time::SystemTimeError),
}
