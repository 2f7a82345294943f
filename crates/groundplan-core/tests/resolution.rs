// crates/groundplan-core/tests/resolution.rs
// ============================================================================
// Module: Resolution Tests
// Description: Lookup resolution against the in-memory environment.
// Purpose: Ensure defaults, nested paths, and failures behave precisely.
// Dependencies: groundplan-core, serde_json
// ============================================================================

//! ## Overview
//! Validates the reference runtime: input default application, deep value
//! resolution, nested attribute indexing, and exact unresolved errors.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;

use groundplan_core::AttributePath;
use groundplan_core::Blueprint;
use groundplan_core::CapabilityName;
use groundplan_core::CapabilitySpec;
use groundplan_core::DslVersion;
use groundplan_core::ImportRef;
use groundplan_core::InMemoryEnvironment;
use groundplan_core::InputName;
use groundplan_core::InputSpec;
use groundplan_core::LookupExpression;
use groundplan_core::NodeName;
use groundplan_core::NodeSpec;
use groundplan_core::NodeTypeName;
use groundplan_core::PathSegment;
use groundplan_core::PropertyValue;
use groundplan_core::SecretName;
use groundplan_core::UnresolvedError;
use groundplan_core::capability_values;
use groundplan_core::resolve_node_properties;
use groundplan_core::resolve_value;
use serde_json::json;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Attribute path for the kubeconfig server endpoint.
fn endpoint_path() -> AttributePath {
    AttributePath::new([
        PathSegment::Key("kubeconf".to_owned()),
        PathSegment::Key("clusters".to_owned()),
        PathSegment::Index(0),
        PathSegment::Key("cluster".to_owned()),
        PathSegment::Key("server".to_owned()),
    ])
}

/// Kubeconfig attribute document as the cluster stores it at runtime.
fn kubeconf_attributes() -> serde_json::Value {
    json!({
        "kubeconf": {
            "apiVersion": "v1",
            "kind": "Config",
            "clusters": [
                {
                    "cluster": {
                        "server": "https://eks.us-east-1.example.com",
                        "certificate-authority-data": "Zm9v"
                    },
                    "name": "kubernetes"
                }
            ]
        },
        "arn": "arn:aws:eks:us-east-1:000000000000:cluster/eks_cluster"
    })
}

/// Builds the EKS cluster blueprint from the provisioning scenario.
fn eks_blueprint() -> Blueprint {
    let mut properties = BTreeMap::new();
    properties.insert(
        "resource_id".to_owned(),
        PropertyValue::Lookup(LookupExpression::input("resource_name")),
    );
    Blueprint {
        dsl_version: DslVersion::new("cloudify_dsl_1_3"),
        imports: vec![ImportRef::new("plugin:cloudify-aws-plugin")],
        inputs: vec![InputSpec {
            name: InputName::new("resource_name"),
            value_type: Some("string".to_owned()),
            description: None,
            default: Some(PropertyValue::from("eks_cluster")),
        }],
        fragments: Vec::new(),
        nodes: vec![NodeSpec {
            name: NodeName::new("eks_cluster"),
            type_name: NodeTypeName::new("cloudify.nodes.aws.eks.Cluster"),
            properties,
        }],
        capabilities: vec![CapabilitySpec {
            name: CapabilityName::new("endpoint"),
            description: None,
            value: PropertyValue::Lookup(LookupExpression::attribute(
                "eks_cluster",
                endpoint_path(),
            )),
        }],
    }
}

// ============================================================================
// SECTION: Input Defaults
// ============================================================================

#[test]
fn default_inputs_resolve_node_properties() {
    let blueprint = eks_blueprint();
    let mut environment = InMemoryEnvironment::new();
    environment.apply_input_defaults(&blueprint).expect("apply defaults");

    let properties =
        resolve_node_properties(&blueprint.nodes[0], &environment).expect("resolve properties");
    assert_eq!(properties["resource_id"], json!("eks_cluster"));
}

#[test]
fn supplied_inputs_shadow_defaults() {
    let blueprint = eks_blueprint();
    let mut environment = InMemoryEnvironment::new().with_input("resource_name", "primary");
    environment.apply_input_defaults(&blueprint).expect("apply defaults");

    let properties =
        resolve_node_properties(&blueprint.nodes[0], &environment).expect("resolve properties");
    assert_eq!(properties["resource_id"], json!("primary"));
}

#[test]
fn lookup_valued_defaults_resolve_against_the_environment() {
    let mut blueprint = eks_blueprint();
    blueprint.inputs.push(InputSpec {
        name: InputName::new("access_key"),
        value_type: None,
        description: None,
        default: Some(PropertyValue::Lookup(LookupExpression::secret(
            "aws_access_key_id",
        ))),
    });

    let mut environment =
        InMemoryEnvironment::new().with_secret("aws_access_key_id", "AKIA-TEST");
    environment.apply_input_defaults(&blueprint).expect("apply defaults");
    assert!(environment.has_input(&InputName::new("access_key")));

    let value = resolve_value(
        &PropertyValue::Lookup(LookupExpression::input("access_key")),
        &environment,
    )
    .expect("resolve input");
    assert_eq!(value, json!("AKIA-TEST"));
}

#[test]
fn inputs_without_default_stay_absent_until_supplied() {
    let mut blueprint = eks_blueprint();
    blueprint.inputs.push(InputSpec {
        name: InputName::new("subnet_ids"),
        value_type: Some("list".to_owned()),
        description: None,
        default: None,
    });

    let mut environment = InMemoryEnvironment::new();
    environment.apply_input_defaults(&blueprint).expect("apply defaults");

    let err = resolve_value(
        &PropertyValue::Lookup(LookupExpression::input("subnet_ids")),
        &environment,
    )
    .expect_err("expected missing input");
    assert_eq!(err, UnresolvedError::MissingInput(InputName::new("subnet_ids")));
}

// ============================================================================
// SECTION: Attribute Resolution
// ============================================================================

#[test]
fn capability_values_resolve_nested_attribute_paths() {
    let blueprint = eks_blueprint();
    let environment =
        InMemoryEnvironment::new().with_node_attributes("eks_cluster", kubeconf_attributes());

    let outputs = capability_values(&blueprint, &environment).expect("resolve capabilities");
    assert_eq!(
        outputs[&CapabilityName::new("endpoint")],
        json!("https://eks.us-east-1.example.com")
    );
}

#[test]
fn missing_attribute_path_names_node_and_path() {
    let blueprint = eks_blueprint();
    let environment = InMemoryEnvironment::new()
        .with_node_attributes("eks_cluster", json!({ "kubeconf": {} }));

    let err = capability_values(&blueprint, &environment).expect_err("expected missing path");
    assert_eq!(
        err,
        UnresolvedError::MissingAttribute {
            node: NodeName::new("eks_cluster"),
            path: endpoint_path(),
        }
    );
}

#[test]
fn missing_node_attributes_name_the_node() {
    let blueprint = eks_blueprint();
    let environment = InMemoryEnvironment::new();

    let err = capability_values(&blueprint, &environment).expect_err("expected missing node");
    assert_eq!(err, UnresolvedError::MissingNode(NodeName::new("eks_cluster")));
}

// ============================================================================
// SECTION: Deep Value Resolution
// ============================================================================

#[test]
fn nested_values_resolve_lookups_in_place() {
    let value = PropertyValue::Map(BTreeMap::from([
        (
            "client_config".to_owned(),
            PropertyValue::Map(BTreeMap::from([
                (
                    "aws_access_key_id".to_owned(),
                    PropertyValue::Lookup(LookupExpression::secret("aws_access_key_id")),
                ),
                ("region_name".to_owned(), PropertyValue::from("us-east-1")),
            ])),
        ),
        (
            "tags".to_owned(),
            PropertyValue::List(vec![
                PropertyValue::from("eks"),
                PropertyValue::Lookup(LookupExpression::input("resource_name")),
            ]),
        ),
    ]));

    let environment = InMemoryEnvironment::new()
        .with_secret("aws_access_key_id", "AKIA-TEST")
        .with_input("resource_name", "eks_cluster");

    let resolved = resolve_value(&value, &environment).expect("resolve nested value");
    assert_eq!(
        resolved,
        json!({
            "client_config": {
                "aws_access_key_id": "AKIA-TEST",
                "region_name": "us-east-1"
            },
            "tags": ["eks", "eks_cluster"]
        })
    );
}

#[test]
fn missing_secret_names_the_secret() {
    let value = PropertyValue::Lookup(LookupExpression::secret("aws_secret_access_key"));
    let environment = InMemoryEnvironment::new();

    let err = resolve_value(&value, &environment).expect_err("expected missing secret");
    assert_eq!(
        err,
        UnresolvedError::MissingSecret(SecretName::new("aws_secret_access_key"))
    );
}
