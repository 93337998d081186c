use super::helpers::*;
use query_syntax::{
    builder::{lambda, source},
    error::SyntaxError,
};

#[test]
fn test_path_follows_references() {
    let catalog = catalog();
    let selector = lambda("x", source("Order").element_type(), |x| {
        x.path("Customer.Name", &catalog).expect("valid path")
    });
    assert_eq!(selector.to_string(), "x => x.Customer.Name");
}

#[test]
fn test_malformed_path_is_rejected() {
    let catalog = catalog();
    let root = source("Order").element_type();
    lambda("x", root, |x| {
        let err = x.clone().path("Customer..Name", &catalog).unwrap_err();
        assert_eq!(err, SyntaxError::MalformedPath("Customer..Name".into()));

        let err = x.clone().path("Lines.Quantity", &catalog).unwrap_err();
        assert!(matches!(err, SyntaxError::UnknownMember { .. }));
        x
    });
}
