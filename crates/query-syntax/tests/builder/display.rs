use super::helpers::*;
use query_syntax::builder::{list, member_init, source};

#[test]
fn test_display_names_every_operator() {
    let catalog = catalog();
    let total = prop(&catalog, "Order", "Total");
    let id = prop(&catalog, "Order", "Id");

    let query = source("Order")
        .filter("x", |x| list([1, 2, 3]).contains(x.member(&id)))
        .order_by_desc("x", |x| x.member(&total))
        .select("x", |x| {
            member_init("OrderSummary", vec![(dto("Total", total.ty.clone()), x.member(&total))])
        });

    assert_eq!(
        query.to_string(),
        "Query<Order>.Where(x => [1, 2, 3].Contains(x.Id))\
         .OrderByDescending(x => x.Total)\
         .Select(x => new OrderSummary { Total = x.Total })"
    );
}

#[test]
fn test_display_of_unsupported_call() {
    let query = source("Order").call_named("Reverse", vec![]).take(1);
    assert_eq!(query.to_string(), "Query<Order>.Reverse().Take(1)");
}
