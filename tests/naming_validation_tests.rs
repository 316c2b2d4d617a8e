//! Naming schema, filtered word, address collision and similarity checks.

mod support;

use std::sync::Arc;

use assert_matches::assert_matches;
use ontoform::ontology::naming::{EntityKind, classify, find_filtered_word};
use ontoform::ontology::{NamingSchema, NamingValidator, SimilarityChecker, SimilarityOutcome};
use proptest::prelude::*;
use support::{FixedSynonyms, GRAPH, UnreachableSynonyms, class, iri, restaurant_store};

const FILTERED: &[&str] = &["And", "Or", "Other", "Miscellaneous"];

fn validator(store: Arc<ontoform::GraphStore>) -> NamingValidator {
    NamingValidator::new(store, FILTERED.iter().map(|w| w.to_string()).collect())
}

#[test]
fn all_caps_name_mismatches_camel_case_ontology() {
    let store = restaurant_store();
    let validator = validator(store.clone());
    let session = store.read();

    let result = validator
        .check_naming_schema(&session, GRAPH, "ALL_CAPS_NAME")
        .unwrap();
    assert!(!result.is_valid);
    assert_eq!(result.ontology_naming_schema, NamingSchema::CamelCase);
    assert_eq!(result.new_property_naming_schema, NamingSchema::AllCaps);

    let ok = validator.check_naming_schema(&session, GRAPH, "hasSauce").unwrap();
    assert!(ok.is_valid);
}

#[test]
fn filtered_word_is_reported() {
    let store = restaurant_store();
    let validator = validator(store);

    let result = validator.check_naming("propertyOneAndTwo");
    assert!(!result.is_valid);
    assert_eq!(result.filtered_word.as_deref(), Some("And"));

    let clean = validator.check_naming("hasOrderNumber");
    assert!(clean.is_valid);
    assert_eq!(clean.filtered_word, None);
}

#[test]
fn used_addresses_are_detected_with_their_kind() {
    let store = restaurant_store();
    let validator = validator(store.clone());
    let session = store.read();

    let cases = [
        ("Dish", Some(EntityKind::Class)),
        ("hasPrice", Some(EntityKind::Property)),
        ("Margherita", Some(EntityKind::Individual)),
        ("Pasta", None),
    ];
    for (local, kind) in cases {
        let usage = validator.check_if_uri_is_used(&session, GRAPH, local).unwrap();
        assert_eq!(usage.used, kind.is_some(), "{local}");
        assert_eq!(usage.occupied_by, kind, "{local}");
        assert_eq!(usage.uri, iri(local));
    }

    let absolute = validator
        .check_if_uri_is_used(&session, GRAPH, &iri("Tomato"))
        .unwrap();
    assert!(absolute.used);
}

#[test]
fn composite_report_includes_similar_properties() {
    let store = restaurant_store();
    let checker = SimilarityChecker::new(store.clone(), Arc::new(FixedSynonyms(vec!["price", "cost"])));
    let validator = validator(store.clone()).with_similarity(checker);

    let report = validator
        .validate_property_name(GRAPH, Some(&class("MainCourse")), "hasCost")
        .unwrap();
    assert!(report.is_acceptable());
    let similarity = report.similarity.unwrap();
    let names: Vec<_> = similarity.candidates().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["hasPrice"]);
}

#[test]
fn unreachable_thesaurus_does_not_abort_other_checks() {
    let store = restaurant_store();
    let checker = SimilarityChecker::new(store.clone(), Arc::new(UnreachableSynonyms));
    let validator = validator(store.clone()).with_similarity(checker);

    let report = validator
        .validate_property_name(GRAPH, None, "priceAndSize")
        .unwrap();
    assert_eq!(report.filtered_word.filtered_word.as_deref(), Some("And"));
    assert_eq!(report.naming_schema.filtered_word.as_deref(), Some("And"));
    assert!(report.naming_schema.is_valid);
    assert!(!report.is_acceptable());
    assert_matches!(report.similarity, Some(SimilarityOutcome::Inconclusive { .. }));
}

#[test]
fn report_serializes_in_camel_case() {
    let store = restaurant_store();
    let validator = validator(store);
    let report = validator.validate_property_name(GRAPH, None, "hasPrice").unwrap();
    assert!(report.uri.used);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["namingSchema"]["ontologyNamingSchema"], "CAMEL_CASE");
    assert_eq!(json["uri"]["used"], true);
    assert!(json.get("similarity").is_none());
}

proptest! {
    #[test]
    fn camel_case_identifiers_classify_as_camel(name in "[a-z][a-z0-9]{0,8}([A-Z][a-z0-9]{1,6}){0,3}") {
        prop_assert_eq!(classify(&name), NamingSchema::CamelCase);
    }

    #[test]
    fn pascal_case_identifiers_classify_as_pascal(name in "[A-Z][a-z][a-z0-9]{0,5}([A-Z][a-z0-9]{1,6}){0,3}") {
        prop_assert_eq!(classify(&name), NamingSchema::PascalCase);
    }

    #[test]
    fn snake_case_identifiers_classify_as_snake(name in "[a-z][a-z0-9]{0,6}(_[a-z0-9]{1,6}){1,3}") {
        prop_assert_eq!(classify(&name), NamingSchema::SnakeCase);
    }

    #[test]
    fn upper_identifiers_classify_as_all_caps(name in "[A-Z][A-Z0-9_]{0,10}") {
        prop_assert_eq!(classify(&name), NamingSchema::AllCaps);
    }

    #[test]
    fn identifiers_with_punctuation_are_unknown(name in "[a-z]{1,5}[-. /][a-z]{1,5}") {
        prop_assert_eq!(classify(&name), NamingSchema::Unknown);
    }

    #[test]
    fn embedded_filtered_word_is_found(prefix in "[a-z]{1,6}", suffix in "[A-Z][a-z]{1,5}") {
        let name = format!("{prefix}And{suffix}");
        let found = find_filtered_word(&name, FILTERED);
        prop_assert_eq!(found.as_deref(), Some("And"));
    }
}
