// crates/groundplan-core/src/core/lookup.rs
// ============================================================================
// Module: Lookup Expression Mini-Language
// Description: Tagged lookup expressions resolved by an external engine.
// Purpose: Define the closed sum type for secret, input, and attribute lookups.
// Dependencies: crate::core::identifiers, serde, smallvec
// ============================================================================

//! ## Overview
//! Lookup expressions are placeholder values embedded in a blueprint and
//! resolved at evaluation time from an external source: a secret store, the
//! supplied inputs, or the live attributes of a provisioned node. This module
//! represents them as a closed sum type rather than untyped nested maps so
//! reference validation and resolution are exhaustive.
//!
//! The wire contract is bit-exact: a single-key mapping whose key is one of
//! `get_secret`, `get_input`, or `get_attribute`. The `get_attribute` value
//! is a sequence `[node, segment, ...]` whose segments index into maps by
//! string key and into sequences by non-negative integer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;
use smallvec::SmallVec;

use crate::core::identifiers::InputName;
use crate::core::identifiers::NodeName;
use crate::core::identifiers::SecretName;
use crate::core::value::PropertyValue;

// ============================================================================
// SECTION: Wire Keys
// ============================================================================

/// Wire key for secret lookups.
pub const GET_SECRET: &str = "get_secret";

/// Wire key for input lookups.
pub const GET_INPUT: &str = "get_input";

/// Wire key for node attribute lookups.
pub const GET_ATTRIBUTE: &str = "get_attribute";

/// Returns whether a mapping key is one of the reserved lookup keys.
#[must_use]
pub fn is_lookup_key(key: &str) -> bool {
    matches!(key, GET_SECRET | GET_INPUT | GET_ATTRIBUTE)
}

// ============================================================================
// SECTION: Attribute Paths
// ============================================================================

/// One step of an attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Index into a mapping by string key.
    Key(String),
    /// Index into a sequence by position.
    Index(u64),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Attribute path into a node's runtime attribute document.
///
/// # Invariants
/// - A resolvable path has at least one segment; validation reports empty
///   paths built programmatically, and the wire format rejects them outright.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AttributePath(SmallVec<[PathSegment; 4]>);

impl AttributePath {
    /// Creates a path from a sequence of segments.
    #[must_use]
    pub fn new(segments: impl IntoIterator<Item = PathSegment>) -> Self {
        Self(segments.into_iter().collect())
    }

    /// Creates a path of string keys only.
    #[must_use]
    pub fn keys<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self(keys.into_iter().map(|key| PathSegment::Key(key.into())).collect())
    }

    /// Returns the path segments in order.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns whether the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends a segment to the path.
    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            if position > 0 && matches!(segment, PathSegment::Key(_)) {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromIterator<PathSegment> for AttributePath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// SECTION: Lookup Expressions
// ============================================================================

/// A value resolved at evaluation time from an external source.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupExpression {
    /// Resolve a named secret from the engine's secret store.
    Secret(SecretName),
    /// Resolve a declared input parameter by name.
    Input(InputName),
    /// Resolve an attribute path on a provisioned node.
    Attribute {
        /// Node template whose runtime attributes are addressed.
        node: NodeName,
        /// Path into the node's attribute document.
        path: AttributePath,
    },
}

impl LookupExpression {
    /// Creates a secret lookup.
    #[must_use]
    pub fn secret(name: impl Into<String>) -> Self {
        Self::Secret(SecretName::new(name))
    }

    /// Creates an input lookup.
    #[must_use]
    pub fn input(name: impl Into<String>) -> Self {
        Self::Input(InputName::new(name))
    }

    /// Creates an attribute lookup.
    #[must_use]
    pub fn attribute(node: impl Into<String>, path: AttributePath) -> Self {
        Self::Attribute {
            node: NodeName::new(node),
            path,
        }
    }

    /// Returns the wire key for the expression variant.
    #[must_use]
    pub const fn wire_key(&self) -> &'static str {
        match self {
            Self::Secret(_) => GET_SECRET,
            Self::Input(_) => GET_INPUT,
            Self::Attribute {
                ..
            } => GET_ATTRIBUTE,
        }
    }
}

impl fmt::Display for LookupExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secret(name) => write!(f, "{GET_SECRET}({name})"),
            Self::Input(name) => write!(f, "{GET_INPUT}({name})"),
            Self::Attribute {
                node,
                path,
            } => write!(f, "{GET_ATTRIBUTE}({node}, {path})"),
        }
    }
}

// ============================================================================
// SECTION: Wire Serialization
// ============================================================================

impl Serialize for LookupExpression {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Secret(name) => map.serialize_entry(GET_SECRET, name.as_str())?,
            Self::Input(name) => map.serialize_entry(GET_INPUT, name.as_str())?,
            Self::Attribute {
                node,
                path,
            } => {
                map.serialize_entry(
                    GET_ATTRIBUTE,
                    &AttributeCall {
                        node,
                        path,
                    },
                )?;
            }
        }
        map.end()
    }
}

/// Serialization adapter emitting `[node, segment, ...]` for attribute calls.
struct AttributeCall<'a> {
    /// Node template name, always the first element.
    node: &'a NodeName,
    /// Path segments following the node name.
    path: &'a AttributePath,
}

impl Serialize for AttributeCall<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1 + self.path.segments().len()))?;
        seq.serialize_element(self.node.as_str())?;
        for segment in self.path.segments() {
            match segment {
                PathSegment::Key(key) => seq.serialize_element(key)?,
                PathSegment::Index(index) => seq.serialize_element(index)?,
            }
        }
        seq.end()
    }
}

// ============================================================================
// SECTION: Wire Deserialization
// ============================================================================

impl<'de> Deserialize<'de> for LookupExpression {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match PropertyValue::deserialize(deserializer)? {
            PropertyValue::Lookup(expression) => Ok(expression),
            _ => Err(D::Error::custom("expected a single-key lookup expression mapping")),
        }
    }
}

/// Builds a lookup expression from a reserved mapping entry.
///
/// Callers have already checked that `key` is a reserved lookup key.
///
/// # Errors
///
/// Returns a description of the malformed argument when the entry value does
/// not match the wire contract for its key.
pub(crate) fn lookup_from_entry(
    key: &str,
    value: PropertyValue,
) -> Result<LookupExpression, String> {
    match key {
        GET_SECRET => match value {
            PropertyValue::String(name) => Ok(LookupExpression::Secret(SecretName::new(name))),
            _ => Err(format!("{GET_SECRET} expects a secret name string")),
        },
        GET_INPUT => match value {
            PropertyValue::String(name) => Ok(LookupExpression::Input(InputName::new(name))),
            _ => Err(format!("{GET_INPUT} expects an input name string")),
        },
        GET_ATTRIBUTE => attribute_from_value(value),
        _ => Err(format!("unrecognized lookup key: {key}")),
    }
}

/// Builds an attribute lookup from the `get_attribute` sequence value.
fn attribute_from_value(value: PropertyValue) -> Result<LookupExpression, String> {
    let PropertyValue::List(elements) = value else {
        return Err(format!("{GET_ATTRIBUTE} expects a sequence [node, segment, ...]"));
    };
    let mut elements = elements.into_iter();
    let node = match elements.next() {
        Some(PropertyValue::String(name)) => NodeName::new(name),
        Some(_) => return Err(format!("{GET_ATTRIBUTE} node name must be a string")),
        None => return Err(format!("{GET_ATTRIBUTE} sequence must not be empty")),
    };
    let mut path = AttributePath::default();
    for element in elements {
        match element {
            PropertyValue::String(key) => path.push(PathSegment::Key(key)),
            PropertyValue::Integer(index) => {
                let index = u64::try_from(index)
                    .map_err(|_| format!("{GET_ATTRIBUTE} index must be non-negative"))?;
                path.push(PathSegment::Index(index));
            }
            _ => {
                return Err(format!(
                    "{GET_ATTRIBUTE} path segments must be strings or integers"
                ));
            }
        }
    }
    if path.is_empty() {
        return Err(format!("{GET_ATTRIBUTE} requires at least one path segment"));
    }
    Ok(LookupExpression::Attribute {
        node,
        path,
    })
}
