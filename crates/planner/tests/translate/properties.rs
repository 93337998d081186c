use super::helpers::*;
use model::{core::data_type::DataType, core::value::Value};
use planner::query::{
    dml::{AliasSource, Node, UnaryOp},
    translate::translate,
};
use query_syntax::builder::{constant, list, new_object, source};

#[test]
fn test_translation_is_deterministic() {
    let mapping = mapping();
    let total = prop(&mapping, "Order", "Total");
    let customer = prop(&mapping, "Order", "Customer");
    let name = prop(&mapping, "Customer", "Name");

    let query = source("Order")
        .filter("o", |o| {
            o.clone()
                .member(&total)
                .gt(constant(10))
                .and(o.member(&customer).member(&name).eq(constant("ACME")))
        })
        .order_by("o", |o| o.member(&total))
        .take(3);

    let first = compile(&query, &mapping);
    let second = compile(&query, &mapping);

    assert_eq!(format!("{:?}", first.tree), format!("{:?}", second.tree));
    assert_eq!(first.root, second.root);
}

#[test]
fn test_projection_keeps_member_order() {
    let mapping = mapping();
    let total = prop(&mapping, "Order", "Total");
    let reference = prop(&mapping, "Order", "Reference");
    let a = dto("Summary", "A", DataType::Double);
    let b = dto("Summary", "B", DataType::VarChar);

    let query = source("Order").select("o", |o| {
        new_object(
            "Summary",
            vec![
                (a.clone(), o.clone().member(&total)),
                (b.clone(), o.member(&reference)),
            ],
        )
    });
    let statement = compile(&query, &mapping);
    let request = statement.request();

    assert_eq!(request.select.len(), 2);
    assert!(request.select[0].new_element);
    assert!(!request.select[1].new_element);
    assert_eq!(request.select[0].property.as_ref(), Some(&a));
    assert_eq!(request.select[1].property.as_ref(), Some(&b));

    let from = request.from.expect("from alias");
    for info in &request.select {
        match statement.tree.node(info.node) {
            Node::Column { alias, .. } => assert_eq!(*alias, from),
            other => panic!("unexpected select item {other:?}"),
        }
    }
}

#[test]
fn test_skip_and_take_are_independent() {
    let mapping = mapping();

    for query in [
        source("Order").skip(5).take(10),
        source("Order").take(10).skip(5),
    ] {
        let statement = compile(&query, &mapping);
        assert_eq!(statement.request().skip, Some(5));
        assert_eq!(statement.request().take, Some(10));
    }
}

#[test]
fn test_aggregate_is_hoisted_over_filtered_request() {
    let mapping = mapping();
    let total = prop(&mapping, "Order", "Total");

    let query = source("Order")
        .filter("x", |x| x.member(&total).gt(constant(0)))
        .sum("x", |x| x.member(&total));
    let statement = compile(&query, &mapping);
    let outer = statement.request();

    assert_eq!(outer.select.len(), 1);
    let Node::Unary {
        op: UnaryOp::Sum,
        operand: Some(_),
    } = statement.tree.node(outer.select[0].node)
    else {
        panic!("expected a SUM select item");
    };

    let derived = statement.tree.alias(outer.from.expect("derived table"));
    let AliasSource::Request(inner) = derived.source else {
        panic!("expected a derived table");
    };
    let inner = statement.tree.request(inner);
    assert!(inner.where_clause.is_some());
    assert_eq!(inner.parent, Some(statement.root));
    assert_eq!(inner.select[0].label.as_deref(), Some("c0"));
}

/// Null members of a constant list are dropped, so `IN` never sees them.
#[test]
fn test_contains_drops_null_members() {
    let mapping = mapping();
    let id = prop(&mapping, "Order", "Id");

    let query = source("Order").filter("x", |x| {
        list(vec![
            Value::Int(1),
            Value::Null,
            Value::Int(2),
            Value::Int(3),
        ])
        .contains(x.member(&id))
    });
    let statement = compile(&query, &mapping);
    let filter = statement.request().where_clause.expect("where clause");

    let Node::In { values, .. } = statement.tree.node(filter) else {
        panic!("expected an IN predicate");
    };
    let constants = values
        .iter()
        .map(|value| statement.tree.node(*value).clone())
        .collect::<Vec<_>>();
    assert_eq!(
        constants,
        vec![Node::constant(1), Node::constant(2), Node::constant(3)]
    );
}

#[test]
fn test_starts_with_appends_wildcard() {
    let mapping = mapping();
    let reference = prop(&mapping, "Order", "Reference");

    let query =
        source("Order").filter("x", |x| x.member(&reference).starts_with(constant("a")));
    let statement = compile(&query, &mapping);
    let tree = &statement.tree;
    let filter = statement.request().where_clause.expect("where clause");

    let Node::Binary {
        op: planner::query::dml::BinaryOp::Like,
        right,
        ..
    } = tree.node(filter)
    else {
        panic!("expected a LIKE predicate");
    };
    let Node::Binary {
        op: planner::query::dml::BinaryOp::Concat,
        left,
        right,
    } = tree.node(*right)
    else {
        panic!("expected a concatenation");
    };
    assert_eq!(tree.node(*left), &Node::constant("a"));
    assert_eq!(tree.node(*right), &Node::constant("%"));
}

#[test]
fn test_whole_rows_select_simple_properties() {
    let mapping = mapping();
    let statement = translate(&source("Order"), &mapping).unwrap();
    let request = statement.request();

    let columns = request
        .select
        .iter()
        .map(|info| match statement.tree.node(info.node) {
            Node::Column { column, .. } => column.clone(),
            other => panic!("unexpected select item {other:?}"),
        })
        .collect::<Vec<_>>();
    assert_eq!(columns, vec!["ID", "REFERENCE", "TOTAL", "SHIPPED"]);
    assert!(request.select[0].new_element);
    assert!(request.select[1..].iter().all(|info| !info.new_element));
}
