// crates/groundplan-authoring/src/authoring.rs
// ============================================================================
// Module: Authoring Formats
// Description: Blueprint authoring parsing and normalization helpers.
// Purpose: Validate and canonicalize authoring inputs into RFC 8785 JSON.
// Dependencies: groundplan-core, jsonschema, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! This module validates and normalizes blueprint authoring inputs. YAML is
//! the canonical authoring format; JSON is accepted for interchange and is
//! normalized the same way. The pipeline is: parse into a structured value,
//! validate against the blueprint JSON Schema, deserialize into typed core
//! documents, run semantic validation, then canonicalize (RFC 8785) and
//! digest. Authoring inputs are untrusted; every step fails closed.
//!
//! A YAML stream may carry several documents separated by `---`. Streams are
//! explicit here: [`parse_documents`] and [`normalize_stream`] handle each
//! document independently, [`normalize_blueprint`] refuses more than one,
//! and nothing ever merges documents.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::Path;

use groundplan_core::Blueprint;
use groundplan_core::DocumentDigest;
use groundplan_core::ValidationReport;
use groundplan_core::hashing::canonical_json_bytes;
use jsonschema::Draft;
use jsonschema::JSONSchema;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::schemas;

// ============================================================================
// SECTION: Authoring Formats
// ============================================================================

/// Supported authoring formats for blueprint documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthoringFormat {
    /// Canonical YAML authoring format.
    Yaml,
    /// JSON interchange format.
    Json,
}

impl AuthoringFormat {
    /// Returns the lowercase label for the format.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    /// Returns the preferred file extension for the format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        self.label()
    }

    /// Parses a format from a file extension.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for AuthoringFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// Detects the authoring format from a file path.
#[must_use]
pub fn detect_format(path: &Path) -> Option<AuthoringFormat> {
    path.extension()
        .and_then(|extension| extension.to_str())
        .and_then(AuthoringFormat::from_extension)
}

// ============================================================================
// SECTION: Normalized Outputs
// ============================================================================

/// Normalized blueprint output with canonical JSON and digest metadata.
#[derive(Debug, Clone)]
pub struct NormalizedBlueprint {
    /// Parsed and validated blueprint document.
    pub blueprint: Blueprint,
    /// Canonical JSON bytes for the document (RFC 8785).
    pub canonical_json: Vec<u8>,
    /// Canonical content digest of the document.
    pub digest: DocumentDigest,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing or normalizing authoring inputs.
#[derive(Debug, Error)]
pub enum AuthoringError {
    /// Failed to parse the authoring input as structured data.
    #[error("failed to parse {format} input: {error}")]
    Parse {
        /// Format that failed to parse.
        format: AuthoringFormat,
        /// Underlying parse error message.
        error: String,
    },
    /// JSON Schema validation failed.
    #[error("schema validation failed: {error}")]
    Schema {
        /// Schema validation details.
        error: String,
    },
    /// Failed to deserialize into core blueprint types.
    #[error("failed to deserialize blueprint: {error}")]
    Deserialize {
        /// Deserialization error details.
        error: String,
    },
    /// Semantic validation reported violations.
    #[error("blueprint validation failed: {report}")]
    Validation {
        /// Full validation report with every violation.
        report: ValidationReport,
    },
    /// Canonical JSON serialization failed.
    #[error("canonicalization failed: {error}")]
    Canonicalization {
        /// Canonicalization error details.
        error: String,
    },
    /// Input carried more than one document where exactly one is required.
    #[error("input contains {count} documents; expected exactly one")]
    MultiDocument {
        /// Number of documents found in the stream.
        count: usize,
    },
    /// Input carried no documents at all.
    #[error("input contains no documents")]
    EmptyStream,
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Parses every document in an authoring input into typed blueprints.
///
/// A YAML stream yields one blueprint per `---`-separated document; JSON
/// always yields exactly one. Documents are independent and never merged.
///
/// # Errors
///
/// Returns [`AuthoringError::Parse`] when any document is malformed or does
/// not match the blueprint document shape, and [`AuthoringError::EmptyStream`]
/// when the input holds no documents.
pub fn parse_documents(
    input: &str,
    format: AuthoringFormat,
) -> Result<Vec<Blueprint>, AuthoringError> {
    let documents = parse_typed(input, format).map_err(|error| AuthoringError::Parse {
        format,
        error,
    })?;
    if documents.is_empty() {
        return Err(AuthoringError::EmptyStream);
    }
    Ok(documents)
}

/// Normalizes a single-document authoring input.
///
/// # Errors
///
/// Returns [`AuthoringError`] when parsing, validation, or canonicalization
/// fails, including [`AuthoringError::MultiDocument`] when the input is a
/// stream of more than one document.
#[must_use = "use the normalized blueprint output or handle the error"]
pub fn normalize_blueprint(
    input: &str,
    format: AuthoringFormat,
) -> Result<NormalizedBlueprint, AuthoringError> {
    let values = parse_values(input, format)?;
    match values.len() {
        0 => return Err(AuthoringError::EmptyStream),
        1 => {}
        count => {
            return Err(AuthoringError::MultiDocument {
                count,
            });
        }
    }
    validate_blueprint_schema(&values[0])?;
    let blueprint = parse_typed(input, format)
        .map_err(|error| AuthoringError::Deserialize {
            error,
        })?
        .into_iter()
        .next()
        .ok_or(AuthoringError::EmptyStream)?;
    normalize_document(blueprint)
}

/// Normalizes every document in an authoring stream independently.
///
/// # Errors
///
/// Returns [`AuthoringError`] for the first document that fails to parse,
/// validate, or canonicalize.
pub fn normalize_stream(
    input: &str,
    format: AuthoringFormat,
) -> Result<Vec<NormalizedBlueprint>, AuthoringError> {
    let values = parse_values(input, format)?;
    if values.is_empty() {
        return Err(AuthoringError::EmptyStream);
    }
    for value in &values {
        validate_blueprint_schema(value)?;
    }
    let blueprints = parse_typed(input, format).map_err(|error| AuthoringError::Deserialize {
        error,
    })?;
    blueprints.into_iter().map(normalize_document).collect()
}

/// Builds markdown documentation for the authoring formats.
#[must_use]
pub fn authoring_markdown() -> String {
    let mut out = String::new();
    out.push_str("# Groundplan Authoring Formats\n\n");
    out.push_str("Groundplan accepts blueprint authoring input in YAML or JSON. ");
    out.push_str("YAML is the canonical authoring format; JSON is accepted for ");
    out.push_str("interchange. Both are normalized to canonical JSON (RFC 8785) ");
    out.push_str("before hashing or downstream use.\n\n");
    out.push_str("## Canonical JSON\n\n");
    out.push_str("- Canonical JSON uses RFC 8785 (JCS) for deterministic ordering.\n");
    out.push_str("- Blueprint digests are computed over canonical JSON bytes.\n");
    out.push_str("- Canonical JSON is emitted by `groundplan normalize`.\n\n");
    out.push_str("## Multi-Document Streams\n\n");
    out.push_str("- A YAML stream may carry several blueprints separated by `---`.\n");
    out.push_str("- Each document is parsed and validated independently.\n");
    out.push_str("- Documents are never merged; `groundplan normalize` requires\n");
    out.push_str("  exactly one document per input.\n\n");
    out.push_str("## Normalization Pipeline\n\n");
    out.push_str("1. Parse YAML or JSON into a structured value.\n");
    out.push_str("2. Validate against the blueprint JSON Schema.\n");
    out.push_str("3. Deserialize into typed blueprint documents.\n");
    out.push_str("4. Run semantic validation (unique names, resolvable references).\n");
    out.push_str("5. Canonicalize to JSON (RFC 8785) and compute the digest.\n\n");
    out.push_str("## CLI Usage\n\n");
    out.push_str("Validate a blueprint:\n\n");
    out.push_str("```bash\n");
    out.push_str("groundplan validate --input blueprint.yaml\n");
    out.push_str("```\n\n");
    out.push_str("Normalize to canonical JSON:\n\n");
    out.push_str("```bash\n");
    out.push_str("groundplan normalize --input blueprint.yaml --output blueprint.json\n");
    out.push_str("```\n");
    out
}

// ============================================================================
// SECTION: Parsing Helpers
// ============================================================================

/// Parses every document in the input into JSON values for schema checks.
fn parse_values(input: &str, format: AuthoringFormat) -> Result<Vec<Value>, AuthoringError> {
    match format {
        AuthoringFormat::Yaml => {
            let mut out = Vec::new();
            for document in serde_yaml::Deserializer::from_str(input) {
                let value =
                    Value::deserialize(document).map_err(|err| AuthoringError::Parse {
                        format,
                        error: err.to_string(),
                    })?;
                out.push(value);
            }
            Ok(out)
        }
        AuthoringFormat::Json => {
            let value: Value =
                serde_json::from_str(input).map_err(|err| AuthoringError::Parse {
                    format,
                    error: err.to_string(),
                })?;
            Ok(vec![value])
        }
    }
}

/// Parses every document in the input into typed blueprints.
///
/// Typed parsing streams section entries directly from the text, so
/// duplicate entity names survive for semantic validation instead of
/// collapsing inside a generic map.
fn parse_typed(input: &str, format: AuthoringFormat) -> Result<Vec<Blueprint>, String> {
    match format {
        AuthoringFormat::Yaml => {
            let mut out = Vec::new();
            for document in serde_yaml::Deserializer::from_str(input) {
                let blueprint =
                    Blueprint::deserialize(document).map_err(|err| err.to_string())?;
                out.push(blueprint);
            }
            Ok(out)
        }
        AuthoringFormat::Json => {
            let mut deserializer = serde_json::Deserializer::from_str(input);
            let blueprint =
                Blueprint::deserialize(&mut deserializer).map_err(|err| err.to_string())?;
            deserializer.end().map_err(|err| err.to_string())?;
            Ok(vec![blueprint])
        }
    }
}

/// Runs semantic validation and canonicalization on one typed document.
fn normalize_document(blueprint: Blueprint) -> Result<NormalizedBlueprint, AuthoringError> {
    let report = blueprint.validate();
    if !report.is_valid() {
        return Err(AuthoringError::Validation {
            report,
        });
    }
    let canonical_json =
        canonical_json_bytes(&blueprint).map_err(|err| AuthoringError::Canonicalization {
            error: err.to_string(),
        })?;
    let digest = blueprint.canonical_digest().map_err(|err| AuthoringError::Canonicalization {
        error: err.to_string(),
    })?;
    Ok(NormalizedBlueprint {
        blueprint,
        canonical_json,
        digest,
    })
}

// ============================================================================
// SECTION: Schema Validation
// ============================================================================

/// Validates a blueprint value against the JSON schema.
fn validate_blueprint_schema(instance: &Value) -> Result<(), AuthoringError> {
    let schema = schemas::blueprint_schema();
    let compiled = compile_schema(&schema)?;
    match compiled.validate(instance) {
        Ok(()) => Ok(()),
        Err(errors) => {
            let messages: Vec<String> = errors.map(|err| err.to_string()).collect();
            Err(AuthoringError::Schema {
                error: messages.join("; "),
            })
        }
    }
}

/// Compiles the blueprint JSON schema for validation.
fn compile_schema(schema: &Value) -> Result<JSONSchema, AuthoringError> {
    let mut options = JSONSchema::options();
    options.with_draft(Draft::Draft202012);
    options.compile(schema).map_err(|err| AuthoringError::Schema {
        error: err.to_string(),
    })
}
