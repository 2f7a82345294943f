// crates/groundplan-core/src/interfaces/mod.rs
// ============================================================================
// Module: Resolution Interfaces
// Description: Engine-agnostic contract for lookup expression resolution.
// Purpose: Define the surface an external orchestration engine fulfills.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This repository never provisions anything; it only defines what a
//! consuming engine must be able to answer. [`ResolutionContext`] is that
//! contract: given a secret name, an input name, or a node attribute path,
//! produce a concrete JSON value or fail with the precise missing entity.
//! Implementations must be deterministic and fail closed on missing data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::InputName;
use crate::core::identifiers::NodeName;
use crate::core::identifiers::SecretName;
use crate::core::lookup::AttributePath;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A lookup expression referenced an entity the environment does not hold.
///
/// # Invariants
/// - Variants are stable for programmatic handling and always name the
///   missing entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnresolvedError {
    /// The named secret is absent from the secret store.
    #[error("secret not found: {0}")]
    MissingSecret(SecretName),
    /// The named input was neither supplied nor defaulted.
    #[error("input not found: {0}")]
    MissingInput(InputName),
    /// No attribute document exists for the named node.
    #[error("node attributes not found: {0}")]
    MissingNode(NodeName),
    /// The attribute path does not exist in the node's attribute document.
    #[error("attribute {path} not found on node {node}")]
    MissingAttribute {
        /// Node whose attribute document was indexed.
        node: NodeName,
        /// Path that failed to resolve.
        path: AttributePath,
    },
}

// ============================================================================
// SECTION: Resolution Context
// ============================================================================

/// Evaluation-time environment an external engine exposes to lookups.
///
/// Resolved values are concrete JSON with no residual lookup expressions.
pub trait ResolutionContext {
    /// Resolves a named secret.
    ///
    /// # Errors
    ///
    /// Returns [`UnresolvedError::MissingSecret`] when the secret is absent.
    fn secret(&self, name: &SecretName) -> Result<Value, UnresolvedError>;

    /// Resolves a declared input parameter.
    ///
    /// # Errors
    ///
    /// Returns [`UnresolvedError::MissingInput`] when the input is absent.
    fn input(&self, name: &InputName) -> Result<Value, UnresolvedError>;

    /// Resolves an attribute path on a provisioned node.
    ///
    /// # Errors
    ///
    /// Returns [`UnresolvedError::MissingNode`] when the node has no
    /// attribute document and [`UnresolvedError::MissingAttribute`] when the
    /// path does not exist within it.
    fn attribute(&self, node: &NodeName, path: &AttributePath) -> Result<Value, UnresolvedError>;
}
