//! Verification key material.
//!
//! The identity provider hands out its public key as a bare base64 body (no PEM armor).
//! It is wrapped into a PEM document once at startup and turned into a `DecodingKey`.
use base64::{Engine as _, engine::general_purpose::STANDARD};
use jsonwebtoken::{Algorithm, DecodingKey};
use thiserror::Error;

const PEM_LINE_WIDTH: usize = 64;
const PEM_BEGIN: &str = "-----BEGIN PUBLIC KEY-----";
const PEM_END: &str = "-----END PUBLIC KEY-----";

#[derive(Debug, Error)]
pub enum KeyMaterialError {
    #[error("verification key body is empty")]
    Empty,
    #[error("verification key body is not base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("algorithm {0:?} is not an asymmetric signature algorithm")]
    UnsupportedAlgorithm(Algorithm),
    #[error("invalid verification key pem: {0}")]
    Pem(#[from] jsonwebtoken::errors::Error),
}

/// Wraps a bare key body into a `PUBLIC KEY` PEM document.
///
/// A value that already carries PEM armor is passed through, with literal `\n`
/// sequences (common in env files) turned into real newlines.
pub fn assemble_public_key_pem(raw: &str) -> Result<String, KeyMaterialError> {
    let trimmed = raw.trim();
    if trimmed.starts_with("-----BEGIN") {
        return Ok(trimmed.replace("\\n", "\n").trim().to_string());
    }

    let body: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    if body.is_empty() {
        return Err(KeyMaterialError::Empty);
    }
    STANDARD.decode(&body)?;

    let mut pem = String::with_capacity(body.len() + body.len() / PEM_LINE_WIDTH + 64);
    pem.push_str(PEM_BEGIN);
    pem.push('\n');
    // base64 is ASCII, so byte chunks are char boundaries
    for line in body.as_bytes().chunks(PEM_LINE_WIDTH) {
        pem.push_str(std::str::from_utf8(line).unwrap_or_default());
        pem.push('\n');
    }
    pem.push_str(PEM_END);

    Ok(pem)
}

pub fn is_asymmetric(algorithm: &Algorithm) -> bool {
    !matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

/// Parses the PEM for the key family implied by `algorithm`.
pub fn decoding_key(pem: &str, algorithm: Algorithm) -> Result<DecodingKey, KeyMaterialError> {
    let bytes = pem.as_bytes();
    let key = match algorithm {
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => DecodingKey::from_rsa_pem(bytes)?,
        Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(bytes)?,
        Algorithm::EdDSA => DecodingKey::from_ed_pem(bytes)?,
        other => return Err(KeyMaterialError::UnsupportedAlgorithm(other)),
    };
    Ok(key)
}
