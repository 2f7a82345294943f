// crates/groundplan-core/src/core/document.rs
// ============================================================================
// Module: Blueprint Document Model
// Description: Blueprint sections, entity specs, and semantic validation.
// Purpose: Define the canonical document shape and its invariant checks.
// Dependencies: crate::core::{identifiers, lookup, value}, thiserror
// ============================================================================

//! ## Overview
//! A blueprint declares named input parameters, reusable definition
//! fragments, typed resource node templates, and exported capabilities.
//! Section entries are kept in document order so duplicate names survive
//! parsing and are reported by [`Blueprint::validate`] instead of being
//! silently collapsed. Validation collects every violation rather than
//! stopping at the first; consuming pipelines fail closed on a non-empty
//! report.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::core::hashing::DEFAULT_DIGEST_ALGORITHM;
use crate::core::hashing::DigestError;
use crate::core::hashing::DocumentDigest;
use crate::core::identifiers::AnchorName;
use crate::core::identifiers::CapabilityName;
use crate::core::identifiers::DslVersion;
use crate::core::identifiers::ImportRef;
use crate::core::identifiers::InputName;
use crate::core::identifiers::NodeName;
use crate::core::identifiers::NodeTypeName;
use crate::core::lookup::LookupExpression;
use crate::core::value::PropertyValue;

// ============================================================================
// SECTION: Blueprint Document
// ============================================================================

/// Canonical blueprint document.
///
/// Wire shape (YAML or JSON): a mapping with `tosca_definitions_version`,
/// `imports`, and `node_templates` required, plus optional `inputs`,
/// `dsl_definitions`, and `capabilities` sections. Duplicate top-level
/// section keys are rejected at parse time, which is how two root documents
/// concatenated without a stream separator surface as a structural error.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    /// DSL format-version tag.
    pub dsl_version: DslVersion,
    /// External schema and plugin references.
    pub imports: Vec<ImportRef>,
    /// Declared input parameters, in document order.
    pub inputs: Vec<InputSpec>,
    /// Reusable definition fragments, in document order.
    pub fragments: Vec<FragmentSpec>,
    /// Resource node templates, in document order.
    pub nodes: Vec<NodeSpec>,
    /// Exported output capabilities, in document order.
    pub capabilities: Vec<CapabilitySpec>,
}

impl Blueprint {
    /// Returns the first declared input with the given name.
    #[must_use]
    pub fn input(&self, name: &InputName) -> Option<&InputSpec> {
        self.inputs.iter().find(|spec| &spec.name == name)
    }

    /// Returns the effective fragment for an anchor.
    ///
    /// Duplicate anchors follow overlay semantics: the last definition in
    /// document order wins.
    #[must_use]
    pub fn fragment(&self, anchor: &AnchorName) -> Option<&FragmentSpec> {
        self.fragments.iter().rev().find(|spec| &spec.anchor == anchor)
    }

    /// Returns the first declared node template with the given name.
    #[must_use]
    pub fn node(&self, name: &NodeName) -> Option<&NodeSpec> {
        self.nodes.iter().find(|spec| &spec.name == name)
    }

    /// Returns the first declared capability with the given name.
    #[must_use]
    pub fn capability(&self, name: &CapabilityName) -> Option<&CapabilitySpec> {
        self.capabilities.iter().find(|spec| &spec.name == name)
    }

    /// Computes the canonical content digest of the document.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Canonicalization`] when serialization fails.
    pub fn canonical_digest(&self) -> Result<DocumentDigest, DigestError> {
        crate::core::hashing::digest_canonical_json(DEFAULT_DIGEST_ALGORITHM, self)
    }

    /// Checks the document invariants and reports every violation found.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        check_nodes_present(self, &mut report);
        check_unique_inputs(&self.inputs, &mut report);
        check_unique_nodes(&self.nodes, &mut report);
        check_unique_capabilities(&self.capabilities, &mut report);
        check_references(self, &mut report);
        report
    }
}

// ============================================================================
// SECTION: Section Specs
// ============================================================================

/// Declared input parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    /// Parameter name, unique within the document.
    pub name: InputName,
    /// Optional declared value type (`string`, `boolean`, ...). Types are an
    /// open set defined by consuming engines; this model keeps them opaque.
    pub value_type: Option<String>,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Optional default, literal or computed via a lookup expression.
    pub default: Option<PropertyValue>,
}

/// Reusable definition fragment addressed by anchor name.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentSpec {
    /// Anchor name; later definitions shadow earlier ones.
    pub anchor: AnchorName,
    /// Fragment body shared by reference at authoring time.
    pub body: PropertyValue,
}

/// Resource node template.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    /// Node name, unique within the document.
    pub name: NodeName,
    /// Type identifier naming an external resource category.
    pub type_name: NodeTypeName,
    /// Property bag; values may be literals, nested data, or lookups.
    pub properties: BTreeMap<String, PropertyValue>,
}

/// Exported output capability.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilitySpec {
    /// Capability name, unique within the document.
    pub name: CapabilityName,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Value expression, typically over node attributes.
    pub value: PropertyValue,
}

// ============================================================================
// SECTION: Violations
// ============================================================================

/// Entity that owns a reported violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    /// A declared input parameter.
    Input(InputName),
    /// A definition fragment.
    Fragment(AnchorName),
    /// A node template.
    Node(NodeName),
    /// A capability.
    Capability(CapabilityName),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(name) => write!(f, "input {name}"),
            Self::Fragment(name) => write!(f, "fragment {name}"),
            Self::Node(name) => write!(f, "node template {name}"),
            Self::Capability(name) => write!(f, "capability {name}"),
        }
    }
}

/// A single invariant violation, tagged with the offending entity.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    /// Blueprint declares no node templates at all.
    #[error("blueprint must define at least one node template")]
    NoNodes,
    /// Two inputs declare the same name.
    #[error("duplicate input parameter: {input}")]
    DuplicateInput {
        /// Name declared more than once.
        input: InputName,
    },
    /// Two node templates declare the same name.
    #[error("duplicate node template: {node}")]
    DuplicateNode {
        /// Name declared more than once.
        node: NodeName,
    },
    /// Two capabilities declare the same name.
    #[error("duplicate capability: {capability}")]
    DuplicateCapability {
        /// Name declared more than once.
        capability: CapabilityName,
    },
    /// A `get_input` expression names an undeclared input.
    #[error("{owner} references undeclared input: {input}")]
    UnknownInput {
        /// Entity containing the expression.
        owner: EntityRef,
        /// Input name that does not resolve.
        input: InputName,
    },
    /// A `get_attribute` expression names an undeclared node template.
    #[error("{owner} references undeclared node template: {node}")]
    UnknownNode {
        /// Entity containing the expression.
        owner: EntityRef,
        /// Node name that does not resolve.
        node: NodeName,
    },
    /// A `get_attribute` expression carries no path segments.
    #[error("{owner} uses get_attribute with an empty attribute path")]
    EmptyAttributePath {
        /// Entity containing the expression.
        owner: EntityRef,
    },
}

/// Outcome of a semantic validation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Violations in detection order.
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns whether the document satisfied every invariant.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns the reported violations in detection order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Records a violation.
    fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            return f.write_str("document is valid");
        }
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Ensures the blueprint declares at least one node template.
fn check_nodes_present(blueprint: &Blueprint, report: &mut ValidationReport) {
    if blueprint.nodes.is_empty() {
        report.push(Violation::NoNodes);
    }
}

/// Ensures input names are unique within the document.
fn check_unique_inputs(inputs: &[InputSpec], report: &mut ValidationReport) {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for spec in inputs {
        if !seen.insert(spec.name.as_str()) {
            report.push(Violation::DuplicateInput {
                input: spec.name.clone(),
            });
        }
    }
}

/// Ensures node template names are unique within the document.
fn check_unique_nodes(nodes: &[NodeSpec], report: &mut ValidationReport) {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for spec in nodes {
        if !seen.insert(spec.name.as_str()) {
            report.push(Violation::DuplicateNode {
                node: spec.name.clone(),
            });
        }
    }
}

/// Ensures capability names are unique within the document.
fn check_unique_capabilities(capabilities: &[CapabilitySpec], report: &mut ValidationReport) {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for spec in capabilities {
        if !seen.insert(spec.name.as_str()) {
            report.push(Violation::DuplicateCapability {
                capability: spec.name.clone(),
            });
        }
    }
}

/// Ensures every lookup expression in the document resolves to a declared
/// entity.
fn check_references(blueprint: &Blueprint, report: &mut ValidationReport) {
    let declared_inputs: BTreeSet<&str> =
        blueprint.inputs.iter().map(|spec| spec.name.as_str()).collect();
    let declared_nodes: BTreeSet<&str> =
        blueprint.nodes.iter().map(|spec| spec.name.as_str()).collect();

    for spec in &blueprint.inputs {
        if let Some(default) = &spec.default {
            check_value_references(
                &EntityRef::Input(spec.name.clone()),
                default,
                &declared_inputs,
                &declared_nodes,
                report,
            );
        }
    }
    for spec in &blueprint.fragments {
        check_value_references(
            &EntityRef::Fragment(spec.anchor.clone()),
            &spec.body,
            &declared_inputs,
            &declared_nodes,
            report,
        );
    }
    for spec in &blueprint.nodes {
        let owner = EntityRef::Node(spec.name.clone());
        for value in spec.properties.values() {
            check_value_references(&owner, value, &declared_inputs, &declared_nodes, report);
        }
    }
    for spec in &blueprint.capabilities {
        check_value_references(
            &EntityRef::Capability(spec.name.clone()),
            &spec.value,
            &declared_inputs,
            &declared_nodes,
            report,
        );
    }
}

/// Checks the lookups embedded in one value tree against declared names.
fn check_value_references(
    owner: &EntityRef,
    value: &PropertyValue,
    declared_inputs: &BTreeSet<&str>,
    declared_nodes: &BTreeSet<&str>,
    report: &mut ValidationReport,
) {
    for expression in value.lookups() {
        match expression {
            LookupExpression::Secret(_) => {}
            LookupExpression::Input(input) => {
                if !declared_inputs.contains(input.as_str()) {
                    report.push(Violation::UnknownInput {
                        owner: owner.clone(),
                        input: input.clone(),
                    });
                }
            }
            LookupExpression::Attribute {
                node,
                path,
            } => {
                if !declared_nodes.contains(node.as_str()) {
                    report.push(Violation::UnknownNode {
                        owner: owner.clone(),
                        node: node.clone(),
                    });
                }
                if path.is_empty() {
                    report.push(Violation::EmptyAttributePath {
                        owner: owner.clone(),
                    });
                }
            }
        }
    }
}
