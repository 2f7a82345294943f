// crates/groundplan-core/src/runtime/environment.rs
// ============================================================================
// Module: In-Memory Resolution Environment
// Description: Map-backed resolution context for tests and previews.
// Purpose: Provide a deterministic environment without external services.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`ResolutionContext`] for tests, examples, and offline capability
//! previews. It is not an orchestration engine: it answers lookups from
//! maps the caller seeded and performs no provisioning.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::document::Blueprint;
use crate::core::identifiers::InputName;
use crate::core::identifiers::NodeName;
use crate::core::identifiers::SecretName;
use crate::core::lookup::AttributePath;
use crate::core::lookup::PathSegment;
use crate::interfaces::ResolutionContext;
use crate::interfaces::UnresolvedError;
use crate::runtime::resolver::resolve_value;

// ============================================================================
// SECTION: In-Memory Environment
// ============================================================================

/// In-memory resolution environment for tests and previews.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEnvironment {
    /// Secret values keyed by secret name.
    secrets: BTreeMap<String, Value>,
    /// Input values keyed by input name.
    inputs: BTreeMap<String, Value>,
    /// Per-node attribute documents keyed by node name.
    attributes: BTreeMap<String, Value>,
}

impl InMemoryEnvironment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a secret value.
    #[must_use]
    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.secrets.insert(name.into(), value.into());
        self
    }

    /// Adds an input value.
    #[must_use]
    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    /// Adds a node attribute document.
    #[must_use]
    pub fn with_node_attributes(mut self, node: impl Into<String>, document: Value) -> Self {
        self.attributes.insert(node.into(), document);
        self
    }

    /// Returns whether an input value is present.
    #[must_use]
    pub fn has_input(&self, name: &InputName) -> bool {
        self.inputs.contains_key(name.as_str())
    }

    /// Fills unset inputs from the blueprint's declared defaults.
    ///
    /// Defaults may themselves be lookup expressions (for example a secret
    /// lookup); they are resolved against the environment as it stands when
    /// this method runs. Inputs with neither a supplied value nor a default
    /// stay absent and surface later as [`UnresolvedError::MissingInput`].
    ///
    /// # Errors
    ///
    /// Returns [`UnresolvedError`] when a lookup-valued default does not
    /// resolve.
    pub fn apply_input_defaults(&mut self, blueprint: &Blueprint) -> Result<(), UnresolvedError> {
        for spec in &blueprint.inputs {
            if self.inputs.contains_key(spec.name.as_str()) {
                continue;
            }
            if let Some(default) = &spec.default {
                let value = resolve_value(default, self)?;
                self.inputs.insert(spec.name.as_str().to_owned(), value);
            }
        }
        Ok(())
    }
}

impl ResolutionContext for InMemoryEnvironment {
    fn secret(&self, name: &SecretName) -> Result<Value, UnresolvedError> {
        self.secrets
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| UnresolvedError::MissingSecret(name.clone()))
    }

    fn input(&self, name: &InputName) -> Result<Value, UnresolvedError> {
        self.inputs
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| UnresolvedError::MissingInput(name.clone()))
    }

    fn attribute(&self, node: &NodeName, path: &AttributePath) -> Result<Value, UnresolvedError> {
        let document = self
            .attributes
            .get(node.as_str())
            .ok_or_else(|| UnresolvedError::MissingNode(node.clone()))?;
        index_document(document, path).cloned().ok_or_else(|| {
            UnresolvedError::MissingAttribute {
                node: node.clone(),
                path: path.clone(),
            }
        })
    }
}

// ============================================================================
// SECTION: Attribute Indexing
// ============================================================================

/// Walks an attribute document along a path of keys and indexes.
fn index_document<'a>(document: &'a Value, path: &AttributePath) -> Option<&'a Value> {
    let mut current = document;
    for segment in path.segments() {
        current = match segment {
            PathSegment::Key(key) => current.as_object()?.get(key)?,
            PathSegment::Index(index) => {
                current.as_array()?.get(usize::try_from(*index).ok()?)?
            }
        };
    }
    Some(current)
}
