use super::helpers::*;
use query_syntax::{
    Expr,
    builder::{constant, source},
};

#[test]
fn test_query_survives_json_transport() {
    let catalog = catalog();
    let total = prop(&catalog, "Order", "Total");
    let lines = prop(&catalog, "Order", "Lines");

    let query = source("Order")
        .filter("x", |x| {
            x.clone()
                .member(&total)
                .gt(constant(12.5))
                .and(x.member(&lines).any())
        })
        .skip(10);

    let json = serde_json::to_string(&query).unwrap();
    let decoded: Expr = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded, query);
    assert_eq!(decoded.to_string(), query.to_string());
}

#[test]
fn test_malformed_json_is_rejected() {
    let result = serde_json::from_str::<Expr>(r#"{ "Source": { "entity": 7 } }"#);
    assert!(result.is_err());
}
