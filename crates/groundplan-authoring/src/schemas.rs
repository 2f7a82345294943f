// crates/groundplan-authoring/src/schemas.rs
// ============================================================================
// Module: Blueprint Schema
// Description: JSON Schema builder for the blueprint wire shape.
// Purpose: Provide the canonical structural gate for authoring inputs.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! This module defines the JSON Schema that mirrors the core blueprint
//! document shape. The schema gates untrusted authoring input before typed
//! deserialization; semantic rules (unique names, resolvable references)
//! live in the core validator, not here. Property values are left open in
//! the schema because the lookup-expression contract is enforced by the
//! typed layer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Public Schema Entrypoints
// ============================================================================

/// Returns the JSON schema for a blueprint document.
#[must_use]
pub fn blueprint_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "groundplan://authoring/schemas/blueprint.schema.json",
        "title": "Groundplan Blueprint",
        "description": "Declarative infrastructure blueprint document.",
        "type": "object",
        "required": [
            "tosca_definitions_version",
            "imports",
            "node_templates"
        ],
        "properties": {
            "tosca_definitions_version": {
                "type": "string",
                "description": "DSL format-version tag."
            },
            "imports": nullable(&json!({
                "type": "array",
                "items": { "type": "string" },
                "description": "External schema and plugin references."
            })),
            "inputs": nullable(&json!({
                "type": "object",
                "additionalProperties": { "$ref": "#/$defs/InputBody" },
                "description": "Declared input parameters keyed by name."
            })),
            "dsl_definitions": nullable(&json!({
                "type": "object",
                "description": "Reusable definition fragments keyed by anchor."
            })),
            "node_templates": nullable(&json!({
                "type": "object",
                "additionalProperties": { "$ref": "#/$defs/NodeBody" },
                "description": "Resource node templates keyed by name."
            })),
            "capabilities": nullable(&json!({
                "type": "object",
                "additionalProperties": { "$ref": "#/$defs/CapabilityBody" },
                "description": "Exported capabilities keyed by name."
            }))
        },
        "additionalProperties": false,
        "$defs": {
            "InputBody": input_body_schema(),
            "NodeBody": node_body_schema(),
            "CapabilityBody": capability_body_schema()
        }
    })
}

// ============================================================================
// SECTION: Body Schemas
// ============================================================================

/// Returns the schema for an input declaration body.
fn input_body_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "type": {
                "type": "string",
                "description": "Declared value type; an open set defined by consuming engines."
            },
            "description": {
                "type": "string",
                "description": "Human-readable description."
            },
            "default": {
                "description": "Default value, literal or a lookup expression."
            }
        },
        "additionalProperties": false
    })
}

/// Returns the schema for a node template body.
fn node_body_schema() -> Value {
    json!({
        "type": "object",
        "required": ["type"],
        "properties": {
            "type": {
                "type": "string",
                "description": "Type identifier naming an external resource category."
            },
            "properties": {
                "type": "object",
                "description": "Property bag; values may embed lookup expressions."
            }
        },
        "additionalProperties": false
    })
}

/// Returns the schema for a capability body.
fn capability_body_schema() -> Value {
    json!({
        "type": "object",
        "required": ["value"],
        "properties": {
            "description": {
                "type": "string",
                "description": "Human-readable description."
            },
            "value": {
                "description": "Value expression, typically over node attributes."
            }
        },
        "additionalProperties": false
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Wraps a schema so the section may also be an explicitly empty (null) key.
fn nullable(schema: &Value) -> Value {
    json!({
        "oneOf": [
            { "type": "null" },
            schema
        ]
    })
}
