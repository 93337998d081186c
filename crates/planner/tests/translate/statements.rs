use super::helpers::*;
use model::core::{data_type::DataType, value::Value};
use planner::query::{
    dml::{Node, NodeId, RequestKind},
    translate::{ExpressionConverter, LoadingKind, TranslateError, Translator},
};
use query_syntax::{
    Expr, Method,
    builder::{constant, delete, entity_instance, insert, member_init, new_object, source, update},
};
use std::sync::Arc;

#[test]
fn test_update_assigns_target_columns() {
    let mapping = mapping();
    let total = prop(&mapping, "Order", "Total");
    let shipped = prop(&mapping, "Order", "Shipped");

    let query = update(
        source("Order").filter("o", |o| o.member(&total).gt(constant(100))),
        "o",
        |_| member_init("Order", vec![(shipped.clone(), constant(true))]),
    );
    let statement = compile(&query, &mapping);
    let request = statement.request();

    assert_eq!(request.kind, RequestKind::Update);
    assert_eq!(request.target, request.from);
    assert_eq!(request.assignments.len(), 1);
    assert!(request.select.is_empty());
}

#[test]
fn test_insert_select_targets_a_new_alias() {
    let mapping = mapping();
    let name = prop(&mapping, "Customer", "Name");
    let label = prop(&mapping, "Tag", "Label");

    let query = insert(source("Customer"), "c", |c| {
        member_init("Tag", vec![(label.clone(), c.member(&name))])
    });
    let statement = compile(&query, &mapping);
    let request = statement.request();

    assert_eq!(request.kind, RequestKind::InsertSelect);
    let target = request.target.expect("insert target");
    assert_ne!(Some(target), request.from);
    assert_eq!(statement.tree.alias(target).entity.as_deref(), Some("Tag"));
}

#[test]
fn test_collections_cannot_be_assigned() {
    let mapping = mapping();
    let lines = prop(&mapping, "Order", "Lines");

    let query = update(source("Order"), "o", |_| {
        member_init("Order", vec![(lines.clone(), constant(1))])
    });
    assert!(matches!(
        planner::query::translate(&query, &mapping),
        Err(TranslateError::MappingViolation(_))
    ));
}

#[test]
fn test_delete_marks_request() {
    let mapping = mapping();
    let statement = compile(&delete(source("Order")), &mapping);
    assert_eq!(statement.request().kind, RequestKind::Delete);
    assert!(statement.request().target.is_some());
}

#[test]
fn test_entity_constant_compares_by_id() {
    let mapping = mapping();
    let customer = prop(&mapping, "Order", "Customer");
    let id = prop(&mapping, "Customer", "Id");

    let query = source("Order").filter("o", |o| {
        o.member(&customer)
            .member(&id)
            .eq(entity_instance("Customer", [("Id", 7)]))
    });
    let statement = compile(&query, &mapping);
    let Node::Binary { right, .. } = statement
        .tree
        .node(statement.request().where_clause.expect("where"))
    else {
        panic!("expected a comparison");
    };
    assert_eq!(statement.tree.node(*right), &Node::Constant(Value::Int(7)));
}

#[test]
fn test_loading_hints_are_collected_in_order() {
    let mapping = mapping();
    let customer = prop(&mapping, "Order", "Customer");
    let lines = prop(&mapping, "Order", "Lines");

    let query = source("Order")
        .eager_load("o", |o| o.member(&customer))
        .dont_load("o", |o| o.member(&lines));
    let statement = compile(&query, &mapping);
    let hints = &statement.loading.hints;

    assert_eq!(hints.len(), 2);
    assert_eq!(hints[0].kind, LoadingKind::Eager);
    assert_eq!(hints[0].path, vec![customer]);
    assert!(statement.loading.excludes(&[lines]));
    assert!(statement.request().joins.is_empty());
}

#[test]
fn test_projected_member_resolves_through_equivalent() {
    let mapping = mapping();
    let total = prop(&mapping, "Order", "Total");
    let amount = dto("Summary", "Amount", DataType::Double);

    let query = source("Order")
        .select("o", |o| {
            new_object("Summary", vec![(amount.clone(), o.member(&total))])
        })
        .filter("s", |s| s.member(&amount).gt(constant(5)));
    let statement = compile(&query, &mapping);
    let Node::Binary { left, .. } = statement
        .tree
        .node(statement.request().where_clause.expect("where"))
    else {
        panic!("expected a comparison");
    };
    assert!(matches!(
        statement.tree.node(*left),
        Node::Column { column, .. } if column == "TOTAL"
    ));
}

#[test]
fn test_order_by_projected_aggregate() {
    let mapping = mapping();
    let lines = prop(&mapping, "Order", "Lines");
    let line_count = dto("LineCount", "N", DataType::Int);

    let query = source("Order")
        .select("o", |o| {
            new_object("LineCount", vec![(line_count.clone(), o.member(&lines).count())])
        })
        .order_by("e", |e| e.member(&line_count));
    let statement = compile(&query, &mapping);
    let request = statement.request();
    let tree = &statement.tree;

    let selected = request.select[0].node;
    let ordered = request.orders[0].node;
    let (Node::SubRequest(projected), Node::SubRequest(sorted)) = (tree.node(selected), tree.node(ordered)) else {
        panic!("expected the count sub-request in both clauses");
    };
    // the ORDER BY holds its own copy of the sub-request
    assert_ne!(projected, sorted);
    assert_ne!(tree.request(*projected).from, tree.request(*sorted).from);
    assert!(tree.structurally_equal(selected, ordered));
    assert!(tree.references_alias(ordered, request.from.unwrap()));
}

#[test]
fn test_filter_on_projected_member_of_first_element() {
    let mapping = mapping();
    let lines = prop(&mapping, "Order", "Lines");
    let quantity = prop(&mapping, "OrderLine", "Quantity");
    let first_quantity = dto("FirstLine", "A", DataType::Int);

    let query = source("Order")
        .select("o", |o| {
            new_object(
                "FirstLine",
                vec![(first_quantity.clone(), o.member(&lines).first().member(&quantity))],
            )
        })
        .filter("d", |d| d.member(&first_quantity).gt(constant(2)))
        .order_by("d", |d| d.member(&first_quantity));
    let statement = compile(&query, &mapping);
    let request = statement.request();
    let tree = &statement.tree;

    let Node::Binary { left, .. } = tree.node(request.where_clause.expect("where")) else {
        panic!("expected a comparison");
    };
    assert!(matches!(tree.node(*left), Node::SubRequest(_)));
    assert!(tree.structurally_equal(*left, request.select[0].node));
    assert!(tree.structurally_equal(request.orders[0].node, request.select[0].node));
}

#[test]
fn test_projected_path_member_still_resolves_to_column() {
    let mapping = mapping();
    let customer = prop(&mapping, "Order", "Customer");
    let name = prop(&mapping, "Customer", "Name");
    let buyer = dto("Buyer", "B", DataType::VarChar);

    let query = source("Order")
        .select("o", |o| {
            new_object("Buyer", vec![(buyer.clone(), o.member(&customer).member(&name))])
        })
        .filter("d", |d| d.member(&buyer).eq(constant("x")));
    let statement = compile(&query, &mapping);
    let tree = &statement.tree;

    let Node::Binary { left, .. } = tree.node(statement.request().where_clause.expect("where")) else {
        panic!("expected a comparison");
    };
    assert!(matches!(tree.node(*left), Node::Column { column, .. } if column == "NAME"));
}

/// Translates calls to `Today()` into a constant date marker.
struct TodayConverter;

impl ExpressionConverter for TodayConverter {
    fn accepts(&self, expr: &Expr) -> bool {
        matches!(expr, Expr::Call { method: Method::Named(name), .. } if name == "Today")
    }

    fn convert(&self, _expr: &Expr, translator: &mut Translator<'_>) -> Result<NodeId, TranslateError> {
        Ok(translator
            .tree_mut()
            .add(Node::Constant(Value::String("today".into()))))
    }
}

#[test]
fn test_converter_runs_before_built_in_rules() {
    let mapping = mapping();
    let reference = prop(&mapping, "Order", "Reference");

    let query = source("Order").filter("o", |o| {
        o.clone()
            .member(&reference)
            .eq(o.call_named("Today", vec![]))
    });

    assert!(planner::query::translate(&query, &mapping).is_err());

    let statement = Translator::new(&mapping)
        .with_converter(Arc::new(TodayConverter))
        .translate(&query)
        .expect("converter handles Today");
    let Node::Binary { right, .. } = statement
        .tree
        .node(statement.request().where_clause.expect("where"))
    else {
        panic!("expected a comparison");
    };
    assert_eq!(
        statement.tree.node(*right),
        &Node::Constant(Value::String("today".into()))
    );
}
