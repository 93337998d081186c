use super::helpers::*;
use model::core::{
    data_type::DataType,
    types::{PropertyRef, TypeRef},
};
use planner::query::{
    dialect::Postgres,
    dml::{Node, UnaryOp},
};
use query_syntax::builder::{constant, new_object, source};

#[test]
fn test_group_by_selects_key_and_aggregate() {
    let mapping = mapping();
    let shipped = prop(&mapping, "Order", "Shipped");
    let key = dto("ShippedCount", "Shipped", DataType::Boolean);
    let count = dto("ShippedCount", "Count", DataType::Int);

    let query = source("Order")
        .group_by("o", |o| o.member(&shipped))
        .select("g", |g| {
            new_object(
                "ShippedCount",
                vec![(key.clone(), g.clone().key()), (count.clone(), g.count())],
            )
        });
    let statement = compile(&query, &mapping);
    let request = statement.request();

    assert_eq!(request.group_by.len(), 1);
    assert_eq!(request.select.len(), 2);
    assert!(matches!(
        statement.tree.node(request.select[0].node),
        Node::Column { column, .. } if column == "SHIPPED"
    ));
    assert_eq!(
        statement.tree.node(request.select[1].node),
        &Node::Unary {
            op: UnaryOp::Count,
            operand: None
        }
    );
    assert_eq!(statement.projection(), Some(&TypeRef::object("ShippedCount")));
}

#[test]
fn test_filter_after_group_by_is_having() {
    let mapping = mapping();
    let shipped = prop(&mapping, "Order", "Shipped");

    let query = source("Order")
        .group_by("o", |o| o.member(&shipped))
        .filter("g", |g| g.count().gt(constant(1)));
    let statement = compile(&query, &mapping);
    let request = statement.request();

    assert!(request.where_clause.is_none());
    assert!(request.having.is_some());
    // the group keys are the projected columns
    assert_eq!(request.select.len(), 1);
    assert!(statement.tree.structurally_equal(request.select[0].node, request.group_by[0]));
}

#[test]
fn test_count_with_predicate_over_grouping() {
    let mapping = mapping();
    let shipped = prop(&mapping, "Order", "Shipped");
    let total = prop(&mapping, "Order", "Total");
    let big = dto("Stats", "Big", DataType::Int);

    let query = source("Order")
        .group_by("o", |o| o.member(&shipped))
        .select("g", |g| {
            new_object(
                "Stats",
                vec![(big.clone(), g.count_where("x", |x| x.member(&total).gt(constant(100))))],
            )
        });
    let statement = compile(&query, &mapping);
    let tree = &statement.tree;
    let item = statement.request().select[0].node;

    let Node::Unary {
        op: UnaryOp::Count,
        operand: Some(case),
    } = tree.node(item)
    else {
        panic!("expected COUNT(..)");
    };
    assert!(matches!(tree.node(*case), Node::Conditional { .. }));
}

#[test]
fn test_top_level_count_counts_rows_of_derived_table() {
    let mapping = mapping();
    let statement = compile(&source("Order").count(), &mapping);
    let outer = statement.request();

    assert_eq!(
        statement.tree.node(outer.select[0].node),
        &Node::Unary {
            op: UnaryOp::Count,
            operand: None
        }
    );
    assert!(outer.from.is_some());
    assert_eq!(statement.projection(), Some(&TypeRef::scalar(DataType::Int)));
}

#[test]
fn test_projecting_composite_key_spreads_its_members() {
    let mapping = mapping();
    let shipped = prop(&mapping, "Order", "Shipped");
    let reference = prop(&mapping, "Order", "Reference");
    let key_shipped = dto("Key", "S", DataType::Boolean);
    let key_reference = dto("Key", "R", DataType::VarChar);
    let key = PropertyRef::new("Out", "K", TypeRef::object("Key"));
    let count = dto("Out", "C", DataType::Int);

    let query = source("Order")
        .group_by("o", |o| {
            new_object(
                "Key",
                vec![
                    (key_shipped.clone(), o.clone().member(&shipped)),
                    (key_reference.clone(), o.member(&reference)),
                ],
            )
        })
        .select("g", |g| {
            new_object("Out", vec![(key.clone(), g.clone().key()), (count.clone(), g.count())])
        });
    let statement = compile(&query, &mapping);
    let request = statement.request();

    assert_eq!(request.group_by.len(), 2);
    assert_eq!(request.select.len(), 3);
    let members: Vec<_> = request
        .select
        .iter()
        .map(|info| (info.property.clone(), info.new_element))
        .collect();
    assert_eq!(
        members,
        vec![
            (Some(key_shipped), true),
            (Some(key_reference), false),
            (Some(count), false),
        ]
    );
    for (info, group) in request.select.iter().zip(&request.group_by) {
        assert!(statement.tree.structurally_equal(info.node, *group));
        assert_ne!(info.node, *group);
    }

    assert_eq!(
        render(&statement, &Postgres).sql,
        r#"SELECT "t0"."SHIPPED", "t0"."REFERENCE", COUNT(*) FROM "ORDER" AS "t0" GROUP BY "t0"."SHIPPED", "t0"."REFERENCE""#
    );
}

#[test]
fn test_composite_key_member_is_still_addressable() {
    let mapping = mapping();
    let shipped = prop(&mapping, "Order", "Shipped");
    let reference = prop(&mapping, "Order", "Reference");
    let key_shipped = dto("Key", "S", DataType::Boolean);
    let key_reference = dto("Key", "R", DataType::VarChar);
    let label = dto("Out", "L", DataType::VarChar);

    let query = source("Order")
        .group_by("o", |o| {
            new_object(
                "Key",
                vec![
                    (key_shipped.clone(), o.clone().member(&shipped)),
                    (key_reference.clone(), o.member(&reference)),
                ],
            )
        })
        .select("g", |g| {
            new_object("Out", vec![(label.clone(), g.key().member(&key_reference))])
        });
    let statement = compile(&query, &mapping);
    let request = statement.request();

    assert_eq!(request.select.len(), 1);
    assert!(statement.tree.structurally_equal(request.select[0].node, request.group_by[1]));
}
