// crates/groundplan-authoring/tests/authoring.rs
// ============================================================================
// Module: Authoring Tests
// Description: Authoring pipeline tests over blueprint fixtures.
// Purpose: Ensure parsing, streams, schema gating, and digests behave.
// Dependencies: groundplan-authoring, groundplan-core, serde_json
// ============================================================================

//! ## Overview
//! Validates the authoring pipeline end to end: the EKS provisioning
//! fixture, anchor/alias reuse, multi-document stream semantics, schema and
//! semantic failures, and digest stability across authoring formats.

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

use std::path::Path;

use groundplan_authoring::AuthoringError;
use groundplan_authoring::AuthoringFormat;
use groundplan_authoring::authoring_markdown;
use groundplan_authoring::detect_format;
use groundplan_authoring::normalize_blueprint;
use groundplan_authoring::normalize_stream;
use groundplan_authoring::parse_documents;
use groundplan_core::CapabilityName;
use groundplan_core::InputName;
use groundplan_core::LookupExpression;
use groundplan_core::NodeName;
use groundplan_core::PropertyValue;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// EKS cluster provisioning blueprint with fragment reuse via anchors.
const EKS_BLUEPRINT: &str = r"
tosca_definitions_version: cloudify_dsl_1_3
imports:
  - plugin:cloudify-aws-plugin
dsl_definitions:
  client_config: &client_config
    aws_access_key_id: { get_secret: aws_access_key_id }
    aws_secret_access_key: { get_secret: aws_secret_access_key }
    region_name: { get_input: aws_region_name }
inputs:
  resource_name:
    type: string
    default: eks_cluster
  aws_region_name:
    type: string
    default: us-east-1
node_templates:
  eks_cluster:
    type: cloudify.nodes.aws.eks.Cluster
    properties:
      client_config: *client_config
      resource_id: { get_input: resource_name }
      store_kube_config_in_runtime: true
capabilities:
  endpoint:
    description: Kubernetes API server endpoint.
    value: { get_attribute: [eks_cluster, kubeconf, clusters, 0, cluster, server] }
";

/// Minimal second document for stream fixtures.
const ACCOUNT_BLUEPRINT: &str = r"
tosca_definitions_version: cloudify_dsl_1_3
imports:
  - plugin:cloudify-aws-plugin
node_templates:
  account:
    type: cloudify.nodes.aws.Account
    properties:
      resource_id: { get_input: account_id }
inputs:
  account_id:
    type: string
    default: '000000000000'
";

// ============================================================================
// SECTION: Parsing and Normalization
// ============================================================================

#[test]
fn eks_blueprint_normalizes() {
    let normalized =
        normalize_blueprint(EKS_BLUEPRINT, AuthoringFormat::Yaml).expect("normalize");
    let blueprint = &normalized.blueprint;

    assert_eq!(blueprint.inputs.len(), 2);
    assert_eq!(blueprint.nodes.len(), 1);
    assert!(blueprint.capability(&CapabilityName::new("endpoint")).is_some());
    assert!(!normalized.digest.value.is_empty());
    assert!(!normalized.canonical_json.is_empty());
}

#[test]
fn fragment_aliases_expand_into_node_properties() {
    let normalized =
        normalize_blueprint(EKS_BLUEPRINT, AuthoringFormat::Yaml).expect("normalize");
    let node = normalized
        .blueprint
        .node(&NodeName::new("eks_cluster"))
        .expect("node present");

    let PropertyValue::Map(client_config) = &node.properties["client_config"] else {
        panic!("client_config must expand to a mapping");
    };
    assert_eq!(
        client_config["aws_access_key_id"],
        PropertyValue::Lookup(LookupExpression::secret("aws_access_key_id"))
    );
    assert_eq!(
        client_config["region_name"],
        PropertyValue::Lookup(LookupExpression::input("aws_region_name"))
    );
}

#[test]
fn undefined_aliases_fail_structurally() {
    let fixture = r"
tosca_definitions_version: cloudify_dsl_1_3
imports: []
node_templates:
  eks_cluster:
    type: cloudify.nodes.aws.eks.Cluster
    properties:
      client_config: *missing
";
    let err = normalize_blueprint(fixture, AuthoringFormat::Yaml)
        .expect_err("expected undefined alias failure");
    assert!(matches!(err, AuthoringError::Parse { .. }));
}

#[test]
fn json_inputs_normalize_identically() {
    let yaml = normalize_blueprint(EKS_BLUEPRINT, AuthoringFormat::Yaml).expect("normalize yaml");
    let json_text =
        serde_json::to_string(&yaml.blueprint).expect("serialize blueprint to json");
    let json = normalize_blueprint(&json_text, AuthoringFormat::Json).expect("normalize json");

    assert_eq!(yaml.blueprint, json.blueprint);
    assert_eq!(yaml.digest, json.digest);
    assert_eq!(yaml.canonical_json, json.canonical_json);
}

// ============================================================================
// SECTION: Multi-Document Streams
// ============================================================================

#[test]
fn separated_documents_form_an_explicit_stream() {
    let stream = format!("{EKS_BLUEPRINT}\n---\n{ACCOUNT_BLUEPRINT}");
    let documents = parse_documents(&stream, AuthoringFormat::Yaml).expect("parse stream");
    assert_eq!(documents.len(), 2);
    assert!(documents[0].node(&NodeName::new("eks_cluster")).is_some());
    assert!(documents[1].node(&NodeName::new("account")).is_some());

    let normalized = normalize_stream(&stream, AuthoringFormat::Yaml).expect("normalize stream");
    assert_eq!(normalized.len(), 2);
    assert_ne!(normalized[0].digest, normalized[1].digest);
}

#[test]
fn normalize_refuses_multi_document_inputs() {
    let stream = format!("{EKS_BLUEPRINT}\n---\n{ACCOUNT_BLUEPRINT}");
    let err = normalize_blueprint(&stream, AuthoringFormat::Yaml)
        .expect_err("expected multi-document rejection");
    assert!(matches!(
        err,
        AuthoringError::MultiDocument {
            count: 2,
        }
    ));
}

#[test]
fn concatenation_without_separator_is_rejected_not_merged() {
    let concatenated = format!("{EKS_BLUEPRINT}\n{ACCOUNT_BLUEPRINT}");
    let err = normalize_blueprint(&concatenated, AuthoringFormat::Yaml)
        .expect_err("expected structural rejection");
    match err {
        AuthoringError::Deserialize {
            error,
        } => assert!(error.contains("duplicate"), "unexpected error: {error}"),
        other => panic!("expected a structural failure, got: {other}"),
    }
}

// ============================================================================
// SECTION: Schema and Semantic Gating
// ============================================================================

#[test]
fn schema_rejects_malformed_sections() {
    let fixture = r"
tosca_definitions_version: cloudify_dsl_1_3
imports: 5
node_templates:
  account:
    type: cloudify.nodes.aws.Account
";
    let err = normalize_blueprint(fixture, AuthoringFormat::Yaml)
        .expect_err("expected schema failure");
    assert!(matches!(err, AuthoringError::Schema { .. }));
}

#[test]
fn missing_required_sections_are_rejected() {
    let fixture = r"
tosca_definitions_version: cloudify_dsl_1_3
node_templates:
  account:
    type: cloudify.nodes.aws.Account
";
    let err = normalize_blueprint(fixture, AuthoringFormat::Yaml)
        .expect_err("expected missing imports failure");
    assert!(matches!(err, AuthoringError::Schema { .. }));
}

#[test]
fn semantic_violations_surface_in_the_report() {
    let fixture = r"
tosca_definitions_version: cloudify_dsl_1_3
imports: []
node_templates:
  account:
    type: cloudify.nodes.aws.Account
capabilities:
  endpoint:
    value: { get_attribute: [eks_cluster, kubeconf, clusters, 0, cluster, server] }
";
    let err = normalize_blueprint(fixture, AuthoringFormat::Yaml)
        .expect_err("expected validation failure");
    let AuthoringError::Validation {
        report,
    } = err
    else {
        panic!("expected a validation report");
    };
    assert_eq!(report.violations().len(), 1);
    assert!(report.to_string().contains("eks_cluster"));
}

#[test]
fn duplicate_node_names_survive_parsing_into_the_report() {
    let fixture = r"
tosca_definitions_version: cloudify_dsl_1_3
imports: []
node_templates:
  account:
    type: cloudify.nodes.aws.Account
  account:
    type: cloudify.nodes.aws.eks.Cluster
";
    let err = normalize_blueprint(fixture, AuthoringFormat::Yaml)
        .expect_err("expected duplicate node failure");
    let AuthoringError::Validation {
        report,
    } = err
    else {
        panic!("expected a validation report");
    };
    assert!(report.to_string().contains("duplicate node template"));
}

#[test]
fn unknown_inputs_referenced_from_defaults_are_reported() {
    let fixture = r"
tosca_definitions_version: cloudify_dsl_1_3
imports: []
inputs:
  derived:
    default: { get_input: base }
node_templates:
  account:
    type: cloudify.nodes.aws.Account
";
    let err = normalize_blueprint(fixture, AuthoringFormat::Yaml)
        .expect_err("expected validation failure");
    let AuthoringError::Validation {
        report,
    } = err
    else {
        panic!("expected a validation report");
    };
    assert!(report.to_string().contains(InputName::new("base").as_str()));
}

// ============================================================================
// SECTION: Format Detection and Docs
// ============================================================================

#[test]
fn format_detection_follows_extensions() {
    assert_eq!(detect_format(Path::new("blueprint.yaml")), Some(AuthoringFormat::Yaml));
    assert_eq!(detect_format(Path::new("blueprint.yml")), Some(AuthoringFormat::Yaml));
    assert_eq!(detect_format(Path::new("blueprint.json")), Some(AuthoringFormat::Json));
    assert_eq!(detect_format(Path::new("blueprint.txt")), None);
    assert_eq!(detect_format(Path::new("blueprint")), None);
}

#[test]
fn authoring_markdown_documents_the_pipeline() {
    let markdown = authoring_markdown();
    assert!(markdown.contains("groundplan normalize"));
    assert!(markdown.contains("RFC 8785"));
    assert!(markdown.contains("never merged"));
}
