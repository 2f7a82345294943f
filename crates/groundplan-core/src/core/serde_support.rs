// crates/groundplan-core/src/core/serde_support.rs
// ============================================================================
// Module: Blueprint Serde Support
// Description: Hand-written wire serialization for blueprint documents.
// Purpose: Preserve document order, surface duplicate names, and enforce
//          required sections at parse time.
// Dependencies: crate::core::{document, identifiers, value}, serde
// ============================================================================

//! ## Overview
//! Blueprint sections are mappings keyed by entity name on the wire. Going
//! through a generic map type would collapse duplicate entity names before
//! validation could report them, so this module streams each section's
//! entries into an order-preserving `Vec` instead. Duplicate *top-level
//! section* keys are rejected outright: two root documents concatenated
//! without a stream separator must fail structurally, never merge.

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

use crate::core::document::Blueprint;
use crate::core::document::CapabilitySpec;
use crate::core::document::FragmentSpec;
use crate::core::document::InputSpec;
use crate::core::document::NodeSpec;
use crate::core::identifiers::AnchorName;
use crate::core::identifiers::CapabilityName;
use crate::core::identifiers::DslVersion;
use crate::core::identifiers::ImportRef;
use crate::core::identifiers::InputName;
use crate::core::identifiers::NodeName;
use crate::core::identifiers::NodeTypeName;
use crate::core::value::PropertyValue;

// ============================================================================
// SECTION: Wire Keys
// ============================================================================

/// Wire key for the DSL format-version tag.
const K_VERSION: &str = "tosca_definitions_version";

/// Wire key for the import list.
const K_IMPORTS: &str = "imports";

/// Wire key for the input parameter section.
const K_INPUTS: &str = "inputs";

/// Wire key for the definition fragment section.
const K_DSL_DEFINITIONS: &str = "dsl_definitions";

/// Wire key for the node template section.
const K_NODE_TEMPLATES: &str = "node_templates";

/// Wire key for the capability section.
const K_CAPABILITIES: &str = "capabilities";

/// Recognized top-level section keys, in canonical wire order.
const TOP_LEVEL_KEYS: &[&str] =
    &[K_VERSION, K_IMPORTS, K_INPUTS, K_DSL_DEFINITIONS, K_NODE_TEMPLATES, K_CAPABILITIES];

// ============================================================================
// SECTION: Section Bodies
// ============================================================================

/// Wire body of an input declaration (everything but the name).
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct InputBody {
    /// Declared value type, if any.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    value_type: Option<String>,
    /// Human-readable description, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// Default value, if any. An explicit `default: null` entry is a real
    /// null default, distinct from an absent key.
    #[serde(
        default,
        deserialize_with = "present_property_value",
        skip_serializing_if = "Option::is_none"
    )]
    default: Option<PropertyValue>,
}

/// Deserializes a present entry value as `Some`, keeping explicit nulls.
fn present_property_value<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<PropertyValue>, D::Error> {
    PropertyValue::deserialize(deserializer).map(Some)
}

impl InputBody {
    /// Builds a wire body from a spec.
    fn from_spec(spec: &InputSpec) -> Self {
        Self {
            value_type: spec.value_type.clone(),
            description: spec.description.clone(),
            default: spec.default.clone(),
        }
    }

    /// Attaches the entry name to build a spec.
    fn into_spec(self, name: InputName) -> InputSpec {
        InputSpec {
            name,
            value_type: self.value_type,
            description: self.description,
            default: self.default,
        }
    }
}

/// Wire body of a node template (everything but the name).
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeBody {
    /// Required type identifier.
    #[serde(rename = "type")]
    type_name: NodeTypeName,
    /// Property bag; omitted on the wire when empty.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, PropertyValue>,
}

impl NodeBody {
    /// Builds a wire body from a spec.
    fn from_spec(spec: &NodeSpec) -> Self {
        Self {
            type_name: spec.type_name.clone(),
            properties: spec.properties.clone(),
        }
    }

    /// Attaches the entry name to build a spec.
    fn into_spec(self, name: NodeName) -> NodeSpec {
        NodeSpec {
            name,
            type_name: self.type_name,
            properties: self.properties,
        }
    }
}

/// Wire body of a capability (everything but the name).
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CapabilityBody {
    /// Human-readable description, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// Required value expression.
    value: PropertyValue,
}

impl CapabilityBody {
    /// Builds a wire body from a spec.
    fn from_spec(spec: &CapabilitySpec) -> Self {
        Self {
            description: spec.description.clone(),
            value: spec.value.clone(),
        }
    }

    /// Attaches the entry name to build a spec.
    fn into_spec(self, name: CapabilityName) -> CapabilitySpec {
        CapabilitySpec {
            name,
            description: self.description,
            value: self.value,
        }
    }
}

// ============================================================================
// SECTION: Section Deserialization
// ============================================================================

/// Import list accepting a sequence or an empty (null) section.
struct ImportSection(Vec<ImportRef>);

impl<'de> Deserialize<'de> for ImportSection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        /// Visitor for the import list.
        struct SectionVisitor;

        impl<'de> Visitor<'de> for SectionVisitor {
            type Value = ImportSection;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a sequence of import references")
            }

            fn visit_unit<E: DeError>(self) -> Result<Self::Value, E> {
                Ok(ImportSection(Vec::new()))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::new();
                while let Some(reference) = seq.next_element::<ImportRef>()? {
                    out.push(reference);
                }
                Ok(ImportSection(out))
            }
        }

        deserializer.deserialize_any(SectionVisitor)
    }
}

/// Input section keeping entries (and duplicate names) in document order.
struct InputSection(Vec<InputSpec>);

impl<'de> Deserialize<'de> for InputSection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        /// Visitor for the input section mapping.
        struct SectionVisitor;

        impl<'de> Visitor<'de> for SectionVisitor {
            type Value = InputSection;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of input declarations")
            }

            fn visit_unit<E: DeError>(self) -> Result<Self::Value, E> {
                Ok(InputSection(Vec::new()))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::new();
                while let Some((name, body)) = map.next_entry::<InputName, InputBody>()? {
                    out.push(body.into_spec(name));
                }
                Ok(InputSection(out))
            }
        }

        deserializer.deserialize_any(SectionVisitor)
    }
}

/// Fragment section keeping entries (and duplicate anchors) in document
/// order.
struct FragmentSection(Vec<FragmentSpec>);

impl<'de> Deserialize<'de> for FragmentSection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        /// Visitor for the fragment section mapping.
        struct SectionVisitor;

        impl<'de> Visitor<'de> for SectionVisitor {
            type Value = FragmentSection;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of definition fragments")
            }

            fn visit_unit<E: DeError>(self) -> Result<Self::Value, E> {
                Ok(FragmentSection(Vec::new()))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::new();
                while let Some((anchor, body)) = map.next_entry::<AnchorName, PropertyValue>()? {
                    out.push(FragmentSpec {
                        anchor,
                        body,
                    });
                }
                Ok(FragmentSection(out))
            }
        }

        deserializer.deserialize_any(SectionVisitor)
    }
}

/// Node template section keeping entries (and duplicate names) in document
/// order.
struct NodeSection(Vec<NodeSpec>);

impl<'de> Deserialize<'de> for NodeSection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        /// Visitor for the node template section mapping.
        struct SectionVisitor;

        impl<'de> Visitor<'de> for SectionVisitor {
            type Value = NodeSection;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of node templates")
            }

            fn visit_unit<E: DeError>(self) -> Result<Self::Value, E> {
                Ok(NodeSection(Vec::new()))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::new();
                while let Some((name, body)) = map.next_entry::<NodeName, NodeBody>()? {
                    out.push(body.into_spec(name));
                }
                Ok(NodeSection(out))
            }
        }

        deserializer.deserialize_any(SectionVisitor)
    }
}

/// Capability section keeping entries (and duplicate names) in document
/// order.
struct CapabilitySection(Vec<CapabilitySpec>);

impl<'de> Deserialize<'de> for CapabilitySection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        /// Visitor for the capability section mapping.
        struct SectionVisitor;

        impl<'de> Visitor<'de> for SectionVisitor {
            type Value = CapabilitySection;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of capability declarations")
            }

            fn visit_unit<E: DeError>(self) -> Result<Self::Value, E> {
                Ok(CapabilitySection(Vec::new()))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::new();
                while let Some((name, body)) = map.next_entry::<CapabilityName, CapabilityBody>()? {
                    out.push(body.into_spec(name));
                }
                Ok(CapabilitySection(out))
            }
        }

        deserializer.deserialize_any(SectionVisitor)
    }
}

// ============================================================================
// SECTION: Document Deserialization
// ============================================================================

impl<'de> Deserialize<'de> for Blueprint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(BlueprintVisitor)
    }
}

/// Visitor for the top-level blueprint mapping.
struct BlueprintVisitor;

impl<'de> Visitor<'de> for BlueprintVisitor {
    type Value = Blueprint;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a blueprint document mapping")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut dsl_version: Option<DslVersion> = None;
        let mut imports: Option<Vec<ImportRef>> = None;
        let mut inputs: Option<Vec<InputSpec>> = None;
        let mut fragments: Option<Vec<FragmentSpec>> = None;
        let mut nodes: Option<Vec<NodeSpec>> = None;
        let mut capabilities: Option<Vec<CapabilitySpec>> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                K_VERSION => {
                    if dsl_version.is_some() {
                        return Err(A::Error::duplicate_field(K_VERSION));
                    }
                    dsl_version = Some(map.next_value()?);
                }
                K_IMPORTS => {
                    if imports.is_some() {
                        return Err(A::Error::duplicate_field(K_IMPORTS));
                    }
                    imports = Some(map.next_value::<ImportSection>()?.0);
                }
                K_INPUTS => {
                    if inputs.is_some() {
                        return Err(A::Error::duplicate_field(K_INPUTS));
                    }
                    inputs = Some(map.next_value::<InputSection>()?.0);
                }
                K_DSL_DEFINITIONS => {
                    if fragments.is_some() {
                        return Err(A::Error::duplicate_field(K_DSL_DEFINITIONS));
                    }
                    fragments = Some(map.next_value::<FragmentSection>()?.0);
                }
                K_NODE_TEMPLATES => {
                    if nodes.is_some() {
                        return Err(A::Error::duplicate_field(K_NODE_TEMPLATES));
                    }
                    nodes = Some(map.next_value::<NodeSection>()?.0);
                }
                K_CAPABILITIES => {
                    if capabilities.is_some() {
                        return Err(A::Error::duplicate_field(K_CAPABILITIES));
                    }
                    capabilities = Some(map.next_value::<CapabilitySection>()?.0);
                }
                _ => return Err(A::Error::unknown_field(&key, TOP_LEVEL_KEYS)),
            }
        }

        let dsl_version = dsl_version.ok_or_else(|| A::Error::missing_field(K_VERSION))?;
        let imports = imports.ok_or_else(|| A::Error::missing_field(K_IMPORTS))?;
        let nodes = nodes.ok_or_else(|| A::Error::missing_field(K_NODE_TEMPLATES))?;
        Ok(Blueprint {
            dsl_version,
            imports,
            inputs: inputs.unwrap_or_default(),
            fragments: fragments.unwrap_or_default(),
            nodes,
            capabilities: capabilities.unwrap_or_default(),
        })
    }
}

// ============================================================================
// SECTION: Document Serialization
// ============================================================================

impl Serialize for Blueprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut len = 3;
        if !self.inputs.is_empty() {
            len += 1;
        }
        if !self.fragments.is_empty() {
            len += 1;
        }
        if !self.capabilities.is_empty() {
            len += 1;
        }
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(K_VERSION, &self.dsl_version)?;
        map.serialize_entry(K_IMPORTS, &self.imports)?;
        if !self.inputs.is_empty() {
            map.serialize_entry(K_INPUTS, &InputSectionRef(&self.inputs))?;
        }
        if !self.fragments.is_empty() {
            map.serialize_entry(K_DSL_DEFINITIONS, &FragmentSectionRef(&self.fragments))?;
        }
        map.serialize_entry(K_NODE_TEMPLATES, &NodeSectionRef(&self.nodes))?;
        if !self.capabilities.is_empty() {
            map.serialize_entry(K_CAPABILITIES, &CapabilitySectionRef(&self.capabilities))?;
        }
        map.end()
    }
}

/// Serialization adapter for the input section.
struct InputSectionRef<'a>(&'a [InputSpec]);

impl Serialize for InputSectionRef<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for spec in self.0 {
            map.serialize_entry(&spec.name, &InputBody::from_spec(spec))?;
        }
        map.end()
    }
}

/// Serialization adapter for the fragment section.
struct FragmentSectionRef<'a>(&'a [FragmentSpec]);

impl Serialize for FragmentSectionRef<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for spec in self.0 {
            map.serialize_entry(&spec.anchor, &spec.body)?;
        }
        map.end()
    }
}

/// Serialization adapter for the node template section.
struct NodeSectionRef<'a>(&'a [NodeSpec]);

impl Serialize for NodeSectionRef<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for spec in self.0 {
            map.serialize_entry(&spec.name, &NodeBody::from_spec(spec))?;
        }
        map.end()
    }
}

/// Serialization adapter for the capability section.
struct CapabilitySectionRef<'a>(&'a [CapabilitySpec]);

impl Serialize for CapabilitySectionRef<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for spec in self.0 {
            map.serialize_entry(&spec.name, &CapabilityBody::from_spec(spec))?;
        }
        map.end()
    }
}
