//! GitHub webhook signature verification using HMAC-SHA256.
//!
//! GitHub signs webhook payloads using HMAC-SHA256 with a shared secret.
//! The signature is provided in the `X-Hub-Signature-256` header as `sha256=<hex>`.
//!
//! Verification runs over the raw request bytes, before the body is parsed.
//! When no secret is configured, verification is disabled and every
//! signature is accepted.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Prefix GitHub puts in front of the hex digest.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// A signature header that could not be interpreted at all.
///
/// This is distinct from a well-formed signature that simply does not match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The header did not start with `sha256=`.
    #[error("signature header is missing the sha256= prefix")]
    MissingPrefix,

    /// The digest part was not lowercase hex.
    #[error("signature digest is not valid hex: {0}")]
    InvalidHex(String),
}

/// Parses a GitHub signature header (e.g., "sha256=abc123...") into raw bytes.
///
/// The header must be exactly what [`format_signature_header`] produces: no
/// surrounding whitespace and lowercase hex only, so that two headers decode
/// to the same bytes only if they are the same string. Never panics.
///
/// # Examples
///
/// ```
/// use docs_relay::webhooks::{parse_signature_header, SignatureError};
///
/// assert!(parse_signature_header("sha256=abcd1234").is_ok());
/// assert_eq!(
///     parse_signature_header("sha1=abcd1234"),
///     Err(SignatureError::MissingPrefix)
/// );
/// assert!(matches!(
///     parse_signature_header("sha256=xyz"),
///     Err(SignatureError::InvalidHex(_))
/// ));
/// assert!(parse_signature_header("sha256=ABCD1234").is_err());
/// ```
pub fn parse_signature_header(header: &str) -> Result<Vec<u8>, SignatureError> {
    let hex_sig = header
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SignatureError::MissingPrefix)?;

    if !hex_sig.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(SignatureError::InvalidHex(
            "expected lowercase hex digits".to_string(),
        ));
    }

    hex::decode(hex_sig).map_err(|e| SignatureError::InvalidHex(e.to_string()))
}

/// Computes the HMAC-SHA256 signature of a payload using the given secret.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a signature as a GitHub-style header value.
///
/// Returns a string in the format "sha256=<hex>".
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(signature))
}

/// Verifies a GitHub webhook signature against the payload.
///
/// - `secret` of `None` disables verification: returns `Ok(true)` regardless
///   of `signature_header`.
/// - A well-formed header returns `Ok(true)` only if it equals
///   `sha256=` followed by the lowercase hex HMAC of `payload`.
///   The comparison is constant-time; a digest of the wrong length is
///   `Ok(false)`.
/// - A header that is not `sha256=<hex>` returns `Err`.
///
/// # Examples
///
/// ```
/// use docs_relay::webhooks::{compute_signature, format_signature_header, verify_signature};
///
/// let payload = b"Hello, World!";
/// let secret = b"my-secret-key";
/// let header = format_signature_header(&compute_signature(payload, secret));
///
/// assert_eq!(verify_signature(payload, &header, Some(secret)), Ok(true));
/// assert_eq!(verify_signature(payload, &header, Some(b"wrong-secret")), Ok(false));
/// assert_eq!(verify_signature(payload, "anything", None), Ok(true));
/// ```
pub fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    secret: Option<&[u8]>,
) -> Result<bool, SignatureError> {
    let Some(secret) = secret else {
        return Ok(true);
    };

    let provided = parse_signature_header(signature_header)?;

    let mut mac = match <HmacSha256 as Mac>::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return Ok(false),
    };
    mac.update(payload);

    // Constant-time comparison via the HMAC library
    Ok(mac.verify_slice(&provided).is_ok())
}
