// crates/groundplan-authoring/src/lib.rs
// ============================================================================
// Module: Groundplan Authoring Library
// Description: Authoring-format parsing and normalization for blueprints.
// Purpose: Validate and canonicalize untrusted authoring inputs.
// Dependencies: crate::{authoring, schemas}
// ============================================================================

//! ## Overview
//! This crate turns untrusted authoring text into validated blueprint
//! documents. YAML is the canonical authoring format for blueprints; JSON is
//! accepted for interchange. Multi-document streams are explicit: documents
//! are parsed independently and never merged. Normalization emits canonical
//! JSON (RFC 8785) plus a stable content digest.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod authoring;
pub mod schemas;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use authoring::AuthoringError;
pub use authoring::AuthoringFormat;
pub use authoring::NormalizedBlueprint;
pub use authoring::authoring_markdown;
pub use authoring::detect_format;
pub use authoring::normalize_blueprint;
pub use authoring::normalize_stream;
pub use authoring::parse_documents;
pub use schemas::blueprint_schema;
