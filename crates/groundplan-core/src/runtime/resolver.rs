// crates/groundplan-core/src/runtime/resolver.rs
// ============================================================================
// Module: Lookup Resolution
// Description: Deep resolution of property values against a context.
// Purpose: Turn deferred lookups into concrete JSON for previews and tests.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! Resolution walks a property value tree, replaces every embedded lookup
//! expression with the value the [`ResolutionContext`] answers, and converts
//! the remaining literals to JSON. The entry point a consumer cares about is
//! [`capability_values`]: the concrete output value for every capability a
//! blueprint declares. Resolution fails closed: the first missing secret,
//! input, or attribute aborts with the entity that was missing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value;

use crate::core::document::Blueprint;
use crate::core::document::NodeSpec;
use crate::core::identifiers::CapabilityName;
use crate::core::lookup::LookupExpression;
use crate::core::value::PropertyValue;
use crate::interfaces::ResolutionContext;
use crate::interfaces::UnresolvedError;

// ============================================================================
// SECTION: Expression Resolution
// ============================================================================

/// Resolves a single lookup expression against the context.
///
/// # Errors
///
/// Returns [`UnresolvedError`] naming the missing entity.
pub fn resolve_expression<C: ResolutionContext + ?Sized>(
    expression: &LookupExpression,
    context: &C,
) -> Result<Value, UnresolvedError> {
    match expression {
        LookupExpression::Secret(name) => context.secret(name),
        LookupExpression::Input(name) => context.input(name),
        LookupExpression::Attribute {
            node,
            path,
        } => context.attribute(node, path),
    }
}

// ============================================================================
// SECTION: Value Resolution
// ============================================================================

/// Deeply resolves a property value tree into concrete JSON.
///
/// # Errors
///
/// Returns [`UnresolvedError`] for the first lookup that does not resolve.
pub fn resolve_value<C: ResolutionContext + ?Sized>(
    value: &PropertyValue,
    context: &C,
) -> Result<Value, UnresolvedError> {
    match value {
        PropertyValue::Null => Ok(Value::Null),
        PropertyValue::Bool(literal) => Ok(Value::Bool(*literal)),
        PropertyValue::Integer(literal) => Ok(Value::Number((*literal).into())),
        PropertyValue::Float(literal) => {
            Ok(serde_json::Number::from_f64(*literal).map_or(Value::Null, Value::Number))
        }
        PropertyValue::String(literal) => Ok(Value::String(literal.clone())),
        PropertyValue::List(elements) => {
            let mut out = Vec::with_capacity(elements.len());
            for element in elements {
                out.push(resolve_value(element, context)?);
            }
            Ok(Value::Array(out))
        }
        PropertyValue::Map(entries) => {
            let mut out = Map::new();
            for (key, entry) in entries {
                out.insert(key.clone(), resolve_value(entry, context)?);
            }
            Ok(Value::Object(out))
        }
        PropertyValue::Lookup(expression) => resolve_expression(expression, context),
    }
}

/// Resolves every property of a node template into concrete JSON.
///
/// # Errors
///
/// Returns [`UnresolvedError`] for the first lookup that does not resolve.
pub fn resolve_node_properties<C: ResolutionContext + ?Sized>(
    node: &NodeSpec,
    context: &C,
) -> Result<Map<String, Value>, UnresolvedError> {
    let mut out = Map::new();
    for (key, value) in &node.properties {
        out.insert(key.clone(), resolve_value(value, context)?);
    }
    Ok(out)
}

// ============================================================================
// SECTION: Capability Resolution
// ============================================================================

/// Produces the concrete output value for every declared capability.
///
/// This is the consumer contract: an engine that has provisioned the
/// blueprint's nodes evaluates each capability expression against the live
/// environment and publishes the results.
///
/// # Errors
///
/// Returns [`UnresolvedError`] for the first capability expression that does
/// not resolve.
pub fn capability_values<C: ResolutionContext + ?Sized>(
    blueprint: &Blueprint,
    context: &C,
) -> Result<BTreeMap<CapabilityName, Value>, UnresolvedError> {
    let mut out = BTreeMap::new();
    for spec in &blueprint.capabilities {
        let value = resolve_value(&spec.value, context)?;
        out.insert(spec.name.clone(), value);
    }
    Ok(out)
}
