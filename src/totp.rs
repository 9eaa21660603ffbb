//! TOTP engine: secret generation, code derivation, windowed verification
//! and `otpauth://` provisioning URIs.
//!
//! Fixed at a 30-second time step and HMAC-SHA1 for Google Authenticator
//! compatibility. All operations take an explicit time slice; only the
//! convenience [`Authenticator::verify`] reads the ambient clock.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

use crate::{base32, OtpError};

type HmacSha1 = Hmac<Sha1>;

/// Seconds per time slice, per RFC 6238 and Google Authenticator.
const TIME_STEP: u64 = 30;

const MIN_SECRET_LENGTH: usize = 16;
const MAX_SECRET_LENGTH: usize = 128;

/// Returns the current slice of time, `floor(unix_now / 30)`.
///
/// Errors if the system clock is set before the Unix epoch. Callers that
/// need determinism pass their own slice to [`derive_code`] or
/// [`Authenticator::verify_at`] instead.
pub fn slice_time() -> Result<u64, OtpError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(OtpError::SystemTime)?;

    Ok(now.as_secs() / TIME_STEP)
}

/// Generates `length` bytes of secure randomness and Base32-encodes them,
/// truncated to exactly `length` characters.
///
/// The returned string length equals the requested *byte* length, not the
/// full Base32 expansion. This is an intentional legacy contract; keep it
/// when interoperating with secrets provisioned by older deployments.
///
/// `length` must satisfy `16 <= length <= 128`. Fails with
/// [`OtpError::NoSecureRandomness`] if the OS random source is unavailable;
/// there is no fallback to a weaker generator.
pub fn generate_secret(length: usize) -> Result<String, OtpError> {
    if !(MIN_SECRET_LENGTH..=MAX_SECRET_LENGTH).contains(&length) {
        return Err(OtpError::SecretLength(length));
    }

    let mut seed = vec![0u8; length];
    getrandom::getrandom(&mut seed).map_err(OtpError::NoSecureRandomness)?;

    let mut encoded = base32::encode(&seed);
    encoded.truncate(length);

    Ok(encoded)
}

/// Derives the code for `secret` at `time_slice`, truncated to
/// `code_length` decimal digits (left-zero-padded).
///
/// This is the RFC 4226 dynamic truncation over HMAC-SHA1, with the slice
/// packed into the low 4 bytes of an 8-byte big-endian message. Slices are
/// truncated to 32 bits, matching the legacy packing format.
///
/// # Panics
/// If the HMAC context cannot be constructed, which cannot happen for
/// HMAC keys of any length.
pub fn derive_code(secret: &str, code_length: u32, time_slice: u64) -> Result<String, OtpError> {
    let mut message = [0u8; 8];
    message[4..].copy_from_slice(&(time_slice as u32).to_be_bytes());

    let decoded = base32::decode(secret)?;
    let mut mac = HmacSha1::new_from_slice(&decoded).expect("HMAC accepts keys of any length");
    mac.update(&message);
    let digest = mac.finalize().into_bytes();

    // The low 4 bits of the last byte locate the 4 code bytes in the digest.
    let offset = (digest[19] & 0xf) as usize;
    let value = u32::from_be_bytes([
        digest[offset],
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]) & 0x7fff_ffff;

    let code = value % 10u32.pow(code_length);
    Ok(format!("{:0width$}", code, width = code_length as usize))
}

/// Formats an `otpauth://totp/` provisioning URI, the payload QR-code
/// renderers encode for authenticator apps.
///
/// When `issuer` is given the label becomes `issuer:account_name` and the
/// same issuer is repeated as a query parameter, as recommended by Google
/// for backward compatibility. Neither the account name nor the issuer may
/// be empty or contain a colon; the secret may not be empty.
///
/// No percent-encoding is applied to any component, matching legacy
/// behavior. Callers must supply URI-safe account names and issuers.
pub fn otpauth_uri(
    account_name: &str,
    secret: &str,
    issuer: Option<&str>,
) -> Result<String, OtpError> {
    if account_name.is_empty() || account_name.contains(':') {
        return Err(OtpError::InvalidAccountName(account_name.to_string()));
    }
    if secret.is_empty() {
        return Err(OtpError::EmptySecret);
    }

    match issuer {
        Some(issuer) => {
            if issuer.is_empty() || issuer.contains(':') {
                return Err(OtpError::InvalidIssuer(issuer.to_string()));
            }
            Ok(format!(
                "otpauth://totp/{issuer}:{account_name}?secret={secret}&issuer={issuer}"
            ))
        }
        None => Ok(format!("otpauth://totp/{account_name}?secret={secret}")),
    }
}

/// Verifier for codes derived from one shared secret.
///
/// Holds only immutable configuration, so one instance can serve concurrent
/// verifications without synchronization.
#[derive(Debug, Clone, PartialEq)]
pub struct Authenticator {
    secret: String,
    code_length: u32,
}

impl Authenticator {
    /// Creates a verifier for a Base32-encoded secret with the default
    /// 6-digit code length.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            code_length: 6,
        }
    }

    /// Sets the expected code length in digits.
    pub fn with_code_length(mut self, code_length: u32) -> Self {
        self.code_length = code_length;
        self
    }

    /// Verifies `code` against the current time slice, accepting codes from
    /// one slice either side to absorb clock drift.
    pub fn verify(&self, code: &str) -> Result<bool, OtpError> {
        self.verify_at(code, 1, slice_time()?)
    }

    /// Verifies `code` against every slice in
    /// `time_slice - discrepancy ..= time_slice + discrepancy`.
    ///
    /// A code whose length differs from the configured code length is
    /// rejected immediately, before any derivation. Candidate comparison is
    /// constant-time, so a near-miss costs the same as a far one.
    pub fn verify_at(
        &self,
        code: &str,
        discrepancy: u64,
        time_slice: u64,
    ) -> Result<bool, OtpError> {
        if code.len() != self.code_length as usize {
            return Ok(false);
        }

        let mut slices = vec![time_slice];
        for i in 1..=discrepancy {
            // Slices before the epoch do not exist; stop walking back.
            match time_slice.checked_sub(i) {
                Some(past) => slices.push(past),
                None => break,
            }
        }
        for i in 1..=discrepancy {
            slices.push(time_slice + i);
        }

        for slice in slices {
            let candidate = derive_code(&self.secret, self.code_length, slice)?;
            if bool::from(candidate.as_bytes().ct_eq(code.as_bytes())) {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
