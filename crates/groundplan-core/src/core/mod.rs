// crates/groundplan-core/src/core/mod.rs
// ============================================================================
// Module: Groundplan Core Types
// Description: Canonical blueprint schema structures.
// Purpose: Provide stable, serializable types for blueprint documents.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Groundplan core types define the blueprint document model: identifiers,
//! property values, the lookup-expression mini-language, the document
//! sections, semantic validation, and canonical hashing. These types are the
//! canonical source of truth for any derived surfaces (authoring formats,
//! schemas, or CLIs).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod document;
pub mod hashing;
pub mod identifiers;
pub mod lookup;
mod serde_support;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use document::Blueprint;
pub use document::CapabilitySpec;
pub use document::EntityRef;
pub use document::FragmentSpec;
pub use document::InputSpec;
pub use document::NodeSpec;
pub use document::ValidationReport;
pub use document::Violation;
pub use hashing::DEFAULT_DIGEST_ALGORITHM;
pub use hashing::DigestAlgorithm;
pub use hashing::DigestError;
pub use hashing::DocumentDigest;
pub use identifiers::AnchorName;
pub use identifiers::CapabilityName;
pub use identifiers::DslVersion;
pub use identifiers::ImportRef;
pub use identifiers::InputName;
pub use identifiers::NodeName;
pub use identifiers::NodeTypeName;
pub use identifiers::SecretName;
pub use lookup::AttributePath;
pub use lookup::GET_ATTRIBUTE;
pub use lookup::GET_INPUT;
pub use lookup::GET_SECRET;
pub use lookup::LookupExpression;
pub use lookup::PathSegment;
pub use lookup::is_lookup_key;
pub use value::PropertyValue;
