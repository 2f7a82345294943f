// crates/groundplan-core/tests/lookup_serde.rs
// ============================================================================
// Module: Lookup Wire Contract Tests
// Description: Bit-exact serialization contract for lookup expressions.
// Purpose: Ensure the three intrinsics round-trip and malformed forms fail.
// Dependencies: groundplan-core, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! Validates the wire contract for `get_secret`, `get_input`, and
//! `get_attribute`: single-key mappings, sequence-shaped attribute calls
//! with string and integer segments, and rejection of malformed payloads.

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

use groundplan_core::AttributePath;
use groundplan_core::LookupExpression;
use groundplan_core::PathSegment;
use groundplan_core::PropertyValue;
use serde_json::json;

// ============================================================================
// SECTION: Parsing Intrinsics
// ============================================================================

#[test]
fn get_secret_parses_from_yaml() {
    let value: PropertyValue =
        serde_yaml::from_str("{ get_secret: aws_access_key_id }").expect("parse");
    assert_eq!(
        value,
        PropertyValue::Lookup(LookupExpression::secret("aws_access_key_id"))
    );
}

#[test]
fn get_input_parses_from_yaml() {
    let value: PropertyValue =
        serde_yaml::from_str("{ get_input: resource_name }").expect("parse");
    assert_eq!(value, PropertyValue::Lookup(LookupExpression::input("resource_name")));
}

#[test]
fn get_attribute_parses_mixed_segments() {
    let value: PropertyValue =
        serde_yaml::from_str("{ get_attribute: [eks_cluster, kubeconf, clusters, 0, cluster, server] }")
            .expect("parse");
    assert_eq!(
        value,
        PropertyValue::Lookup(LookupExpression::attribute(
            "eks_cluster",
            AttributePath::new([
                PathSegment::Key("kubeconf".to_owned()),
                PathSegment::Key("clusters".to_owned()),
                PathSegment::Index(0),
                PathSegment::Key("cluster".to_owned()),
                PathSegment::Key("server".to_owned()),
            ]),
        ))
    );
}

#[test]
fn lookups_parse_identically_from_json() {
    let value: PropertyValue =
        serde_json::from_value(json!({ "get_attribute": ["eks_cluster", "arn"] }))
            .expect("parse");
    assert_eq!(
        value,
        PropertyValue::Lookup(LookupExpression::attribute(
            "eks_cluster",
            AttributePath::keys(["arn"]),
        ))
    );
}

// ============================================================================
// SECTION: Plain Mappings Stay Plain
// ============================================================================

#[test]
fn non_reserved_single_key_mapping_stays_a_map() {
    let value: PropertyValue = serde_yaml::from_str("{ region_name: us-east-1 }").expect("parse");
    assert!(matches!(value, PropertyValue::Map(_)));
}

#[test]
fn reserved_key_in_multi_key_mapping_stays_a_map() {
    let value: PropertyValue =
        serde_yaml::from_str("{ get_input: resource_name, region_name: us-east-1 }")
            .expect("parse");
    assert!(matches!(value, PropertyValue::Map(entries) if entries.len() == 2));
}

#[test]
fn duplicate_mapping_keys_follow_last_one_wins() {
    let value: PropertyValue =
        serde_yaml::from_str("{ region_name: us-east-1, region_name: us-west-2 }")
            .expect("parse");
    let PropertyValue::Map(entries) = value else {
        panic!("expected a mapping");
    };
    assert_eq!(entries["region_name"], PropertyValue::from("us-west-2"));
}

// ============================================================================
// SECTION: Malformed Intrinsics
// ============================================================================

#[test]
fn get_secret_rejects_non_string_payloads() {
    let err = serde_yaml::from_str::<PropertyValue>("{ get_secret: [a, b] }")
        .expect_err("expected parse failure");
    assert!(err.to_string().contains("get_secret"));
}

#[test]
fn get_attribute_rejects_scalar_payloads() {
    let err = serde_yaml::from_str::<PropertyValue>("{ get_attribute: eks_cluster }")
        .expect_err("expected parse failure");
    assert!(err.to_string().contains("sequence"));
}

#[test]
fn get_attribute_rejects_missing_path_segments() {
    let err = serde_yaml::from_str::<PropertyValue>("{ get_attribute: [eks_cluster] }")
        .expect_err("expected parse failure");
    assert!(err.to_string().contains("path segment"));
}

#[test]
fn get_attribute_rejects_non_string_node_names() {
    let err = serde_yaml::from_str::<PropertyValue>("{ get_attribute: [0, arn] }")
        .expect_err("expected parse failure");
    assert!(err.to_string().contains("node name"));
}

#[test]
fn get_attribute_rejects_negative_indexes() {
    let err = serde_yaml::from_str::<PropertyValue>("{ get_attribute: [eks_cluster, -1] }")
        .expect_err("expected parse failure");
    assert!(err.to_string().contains("non-negative"));
}

// ============================================================================
// SECTION: Serialization
// ============================================================================

#[test]
fn lookups_serialize_to_single_key_mappings() {
    let expression = LookupExpression::attribute(
        "eks_cluster",
        AttributePath::new([
            PathSegment::Key("kubeconf".to_owned()),
            PathSegment::Key("clusters".to_owned()),
            PathSegment::Index(0),
        ]),
    );
    let value = serde_json::to_value(&expression).expect("serialize");
    assert_eq!(value, json!({ "get_attribute": ["eks_cluster", "kubeconf", "clusters", 0] }));

    let secret = serde_json::to_value(LookupExpression::secret("token")).expect("serialize");
    assert_eq!(secret, json!({ "get_secret": "token" }));
}

#[test]
fn lookup_expressions_round_trip_through_yaml() {
    let original = PropertyValue::Lookup(LookupExpression::attribute(
        "eks_cluster",
        AttributePath::new([PathSegment::Key("arn".to_owned()), PathSegment::Index(2)]),
    ));
    let text = serde_yaml::to_string(&original).expect("serialize");
    let reparsed: PropertyValue = serde_yaml::from_str(&text).expect("reparse");
    assert_eq!(reparsed, original);
}
