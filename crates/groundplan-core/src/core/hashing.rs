// crates/groundplan-core/src/core/hashing.rs
// ============================================================================
// Module: Canonical Document Hashing
// Description: RFC 8785 JSON canonicalization and digests for blueprints.
// Purpose: Give every document a stable content identity across formats.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Two blueprints that describe the same topology must hash identically no
//! matter which authoring format or key order produced them. Digests are
//! computed over RFC 8785 (JCS) canonical JSON bytes, so YAML and JSON
//! authoring inputs converge on the same identity once normalized.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Digest Algorithm
// ============================================================================

/// Supported digest algorithms for blueprint documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestAlgorithm {
    /// SHA-256 hashing.
    Sha256,
}

/// Default digest algorithm.
pub const DEFAULT_DIGEST_ALGORITHM: DigestAlgorithm = DigestAlgorithm::Sha256;

// ============================================================================
// SECTION: Document Digest
// ============================================================================

/// Deterministic content digest of a canonical document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDigest {
    /// Digest algorithm identifier.
    pub algorithm: DigestAlgorithm,
    /// Lowercase hex-encoded digest bytes.
    pub value: String,
}

impl DocumentDigest {
    /// Creates a digest record from raw digest bytes.
    #[must_use]
    pub fn new(algorithm: DigestAlgorithm, bytes: &[u8]) -> Self {
        Self {
            algorithm,
            value: hex_encode(bytes),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing canonical digests.
#[derive(Debug, Error)]
pub enum DigestError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Digest Helpers
// ============================================================================

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`DigestError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, DigestError> {
    serde_jcs::to_vec(value).map_err(|err| DigestError::Canonicalization(err.to_string()))
}

/// Digests the canonical JSON form of a serializable value.
///
/// # Errors
///
/// Returns [`DigestError::Canonicalization`] when serialization fails.
pub fn digest_canonical_json<T: Serialize + ?Sized>(
    algorithm: DigestAlgorithm,
    value: &T,
) -> Result<DocumentDigest, DigestError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(digest_bytes(algorithm, &bytes))
}

/// Digests raw bytes with the given algorithm.
#[must_use]
pub fn digest_bytes(algorithm: DigestAlgorithm, bytes: &[u8]) -> DocumentDigest {
    match algorithm {
        DigestAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            let digest = hasher.finalize();
            DocumentDigest::new(DigestAlgorithm::Sha256, &digest)
        }
    }
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
