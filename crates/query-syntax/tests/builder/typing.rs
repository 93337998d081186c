use super::helpers::*;
use model::core::{data_type::DataType, types::TypeRef};
use query_syntax::{
    Method,
    builder::{constant, new_object, source},
};

#[test]
fn test_query_operators_keep_query_shape() {
    let catalog = catalog();
    let total = prop(&catalog, "Order", "Total");

    let query = source("Order")
        .filter("x", |x| x.member(&total).gt(constant(0)))
        .skip(5);
    assert_eq!(query.ty(), TypeRef::query(TypeRef::entity("Order")));

    let projected = query.select("x", |x| x.member(&total));
    assert_eq!(
        projected.ty(),
        TypeRef::query(TypeRef::scalar(DataType::Double))
    );
}

#[test]
fn test_group_by_produces_grouping_elements() {
    let catalog = catalog();
    let customer = prop(&catalog, "Order", "Customer");

    let grouped = source("Order").group_by("x", |x| x.member(&customer));
    let element = grouped.element_type();
    assert_eq!(
        element,
        TypeRef::grouping(TypeRef::entity("Customer"), TypeRef::entity("Order"))
    );

    // Parameters of a lambda over the groups are typed as the grouping.
    let shaped = grouped.select("g", |g| {
        assert!(g.ty().is_grouping());
        new_object("<>Anon", vec![(dto("Count", TypeRef::scalar(DataType::Int)), g.count())])
    });
    assert_eq!(shaped.element_type(), TypeRef::object("<>Anon"));
}

#[test]
fn test_collection_operators_are_collection_shaped() {
    let catalog = catalog();
    let lines = prop(&catalog, "Order", "Lines");
    let quantity = prop(&catalog, "OrderLine", "Quantity");

    source("Order").select("x", |x| {
        let nav = x.member(&lines);
        let filtered = nav.filter("l", |l| l.member(&quantity).gt(constant(1)));
        assert!(filtered.ty().is_collection());

        let total = filtered.sum("l", |l| l.member(&quantity));
        assert_eq!(total.ty(), TypeRef::scalar(DataType::Int));
        total
    });
}

#[test]
fn test_predicates_are_boolean() {
    let catalog = catalog();
    let total = prop(&catalog, "Order", "Total");

    let any = source("Order").any_where("x", |x| x.member(&total).gt(constant(1)));
    assert_eq!(any.ty(), TypeRef::boolean());

    let count = source("Order").aggregate(Method::Count);
    assert_eq!(count.ty(), TypeRef::scalar(DataType::Int));
}
