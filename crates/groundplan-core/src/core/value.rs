// crates/groundplan-core/src/core/value.rs
// ============================================================================
// Module: Property Values
// Description: Property bag values with embedded lookup expressions.
// Purpose: Model literal, nested, and deferred values carried by a blueprint.
// Dependencies: crate::core::lookup, serde
// ============================================================================

//! ## Overview
//! Property values are the leaves and branches of a blueprint document: node
//! properties, input defaults, fragment bodies, and capability expressions
//! are all trees of [`PropertyValue`]. A mapping with exactly one reserved
//! key (`get_secret`, `get_input`, `get_attribute`) is a lookup expression;
//! every other mapping is plain data. Duplicate keys inside a mapping follow
//! last-one-wins overlay semantics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde::de::Error as DeError;
use serde::de::MapAccess;
use serde::de::SeqAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;

use crate::core::lookup::LookupExpression;
use crate::core::lookup::is_lookup_key;
use crate::core::lookup::lookup_from_entry;

// ============================================================================
// SECTION: Property Value Tree
// ============================================================================

/// A value carried by a blueprint property bag.
///
/// # Invariants
/// - Mappings on the three reserved lookup keys always denote lookup
///   expressions; the representation is deliberately non-injective there.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropertyValue {
    /// Absent or null value.
    #[default]
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Signed integer literal.
    Integer(i64),
    /// Floating point literal.
    Float(f64),
    /// String literal.
    String(String),
    /// Ordered sequence of values.
    List(Vec<PropertyValue>),
    /// String-keyed mapping of values.
    Map(BTreeMap<String, PropertyValue>),
    /// Deferred lookup resolved by the consuming engine.
    Lookup(LookupExpression),
}

impl PropertyValue {
    /// Collects every lookup expression embedded in the value tree.
    #[must_use]
    pub fn lookups(&self) -> Vec<&LookupExpression> {
        let mut out = Vec::new();
        collect_lookups(self, &mut out);
        out
    }

    /// Returns the string content for string literals.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }
}

/// Walks a value tree and appends embedded lookup expressions.
fn collect_lookups<'a>(value: &'a PropertyValue, out: &mut Vec<&'a LookupExpression>) {
    match value {
        PropertyValue::Lookup(expression) => out.push(expression),
        PropertyValue::List(elements) => {
            for element in elements {
                collect_lookups(element, out);
            }
        }
        PropertyValue::Map(entries) => {
            for entry in entries.values() {
                collect_lookups(entry, out);
            }
        }
        PropertyValue::Null
        | PropertyValue::Bool(_)
        | PropertyValue::Integer(_)
        | PropertyValue::Float(_)
        | PropertyValue::String(_) => {}
    }
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<LookupExpression> for PropertyValue {
    fn from(value: LookupExpression) -> Self {
        Self::Lookup(value)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(value: Vec<PropertyValue>) -> Self {
        Self::List(value)
    }
}

impl From<BTreeMap<String, PropertyValue>> for PropertyValue {
    fn from(value: BTreeMap<String, PropertyValue>) -> Self {
        Self::Map(value)
    }
}

// ============================================================================
// SECTION: Wire Serialization
// ============================================================================

impl Serialize for PropertyValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Integer(value) => serializer.serialize_i64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::String(value) => serializer.serialize_str(value),
            Self::List(elements) => {
                let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                for element in elements {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, entry) in entries {
                    map.serialize_entry(key, entry)?;
                }
                map.end()
            }
            Self::Lookup(expression) => expression.serialize(serializer),
        }
    }
}

// ============================================================================
// SECTION: Wire Deserialization
// ============================================================================

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PropertyValueVisitor)
    }
}

/// Visitor accepting any self-describing value as a [`PropertyValue`].
struct PropertyValueVisitor;

impl<'de> Visitor<'de> for PropertyValueVisitor {
    type Value = PropertyValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a blueprint property value")
    }

    fn visit_bool<E: DeError>(self, value: bool) -> Result<Self::Value, E> {
        Ok(PropertyValue::Bool(value))
    }

    fn visit_i64<E: DeError>(self, value: i64) -> Result<Self::Value, E> {
        Ok(PropertyValue::Integer(value))
    }

    fn visit_u64<E: DeError>(self, value: u64) -> Result<Self::Value, E> {
        i64::try_from(value)
            .map(PropertyValue::Integer)
            .map_err(|_| E::custom("integer out of supported range"))
    }

    fn visit_f64<E: DeError>(self, value: f64) -> Result<Self::Value, E> {
        Ok(PropertyValue::Float(value))
    }

    fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
        Ok(PropertyValue::String(value.to_owned()))
    }

    fn visit_string<E: DeError>(self, value: String) -> Result<Self::Value, E> {
        Ok(PropertyValue::String(value))
    }

    fn visit_unit<E: DeError>(self) -> Result<Self::Value, E> {
        Ok(PropertyValue::Null)
    }

    fn visit_none<E: DeError>(self) -> Result<Self::Value, E> {
        Ok(PropertyValue::Null)
    }

    fn visit_some<D: serde::Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(Self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut elements = Vec::new();
        while let Some(element) = seq.next_element()? {
            elements.push(element);
        }
        Ok(PropertyValue::List(elements))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, PropertyValue)> = Vec::new();
        while let Some((key, value)) = map.next_entry::<String, PropertyValue>()? {
            entries.push((key, value));
        }
        if entries.len() == 1 && is_lookup_key(&entries[0].0) {
            let (key, value) = entries.remove(0);
            return lookup_from_entry(&key, value)
                .map(PropertyValue::Lookup)
                .map_err(A::Error::custom);
        }
        let mut out = BTreeMap::new();
        for (key, value) in entries {
            out.insert(key, value);
        }
        Ok(PropertyValue::Map(out))
    }
}
