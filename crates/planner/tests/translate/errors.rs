use super::helpers::*;
use planner::query::translate::{TranslateError, translate};
use query_syntax::{
    BinaryOp,
    builder::{constant, source},
};

#[test]
fn test_unknown_method_names_itself() {
    let mapping = mapping();
    let query = source("Order").call_named("Reverse", vec![]);

    let err = translate(&query, &mapping).unwrap_err();
    let TranslateError::UnsupportedConstruct(message) = err else {
        panic!("unexpected error {err:?}");
    };
    assert!(message.contains("Reverse"), "{message}");
    assert!(message.contains("Query<Order>"), "{message}");
}

#[test]
fn test_select_of_collection_requires_select_many() {
    let mapping = mapping();
    let lines = prop(&mapping, "Order", "Lines");

    let query = source("Order").select("o", |o| o.member(&lines));
    assert!(matches!(
        translate(&query, &mapping),
        Err(TranslateError::MappingViolation(_))
    ));

    let query = source("Order").select_many("o", |o| o.member(&lines));
    assert!(translate(&query, &mapping).is_ok());
}

#[test]
fn test_contains_on_non_constant_source() {
    let mapping = mapping();
    let lines = prop(&mapping, "Order", "Lines");

    let query = source("Order").filter("o", |o| o.member(&lines).contains(constant(1)));
    assert!(matches!(
        translate(&query, &mapping),
        Err(TranslateError::UnsupportedConstruct(_))
    ));
}

#[test]
fn test_unsupported_binary_operator() {
    let mapping = mapping();
    let total = prop(&mapping, "Order", "Total");

    let query = source("Order").filter("o", |o| {
        o.member(&total)
            .binary(BinaryOp::Modulo, constant(2))
            .eq(constant(0))
    });
    let err = translate(&query, &mapping).unwrap_err();
    assert!(matches!(err, TranslateError::UnsupportedConstruct(_)));
}

#[test]
fn test_non_query_expression_is_invalid() {
    let mapping = mapping();
    assert!(matches!(
        translate(&constant(1), &mapping),
        Err(TranslateError::InvalidArgument(_))
    ));
}

#[test]
fn test_negative_row_count_is_invalid() {
    let mapping = mapping();
    assert!(matches!(
        translate(&source("Order").take(-1), &mapping),
        Err(TranslateError::InvalidArgument(_))
    ));
}

#[test]
fn test_unmapped_source_is_a_mapping_violation() {
    let mapping = mapping();
    assert!(matches!(
        translate(&source("Invoice"), &mapping),
        Err(TranslateError::MappingViolation(_))
    ));
}
