use super::helpers::*;
use model::core::{data_type::DataType, value::Value};
use planner::query::dialect::Postgres;
use query_syntax::builder::{constant, list, new_object, source};

#[test]
fn test_render_whole_rows() {
    let mapping = mapping();
    let rendered = render(&compile(&source("Order"), &mapping), &Postgres);

    assert_eq!(rendered.sql, format!(r#"SELECT {ORDER_COLUMNS} FROM "ORDER" AS "t0""#));
    assert!(rendered.params.is_empty());
    assert_eq!(rendered.layout.len(), 4);
    assert!(rendered.layout[0].new_element);
    assert_eq!(
        rendered.layout[1].property.as_ref().map(|p| p.name.as_str()),
        Some("Reference")
    );
}

#[test]
fn test_render_filter_and_limit() {
    let mapping = mapping();
    let total = prop(&mapping, "Order", "Total");

    let query = source("Order")
        .filter("o", |o| o.member(&total).gt(constant(100.0)))
        .take(10);
    let rendered = render(&compile(&query, &mapping), &Postgres);

    assert_eq!(
        rendered.sql,
        format!(r#"SELECT {ORDER_COLUMNS} FROM "ORDER" AS "t0" WHERE ("t0"."TOTAL" > $1) LIMIT 10"#)
    );
    assert_eq!(rendered.params, vec![Value::Float(100.0)]);
}

#[test]
fn test_render_projection_layout() {
    let mapping = mapping();
    let total = prop(&mapping, "Order", "Total");
    let reference = prop(&mapping, "Order", "Reference");
    let a = dto("Summary", "A", DataType::Double);
    let b = dto("Summary", "B", DataType::VarChar);

    let query = source("Order").select("o", |o| {
        new_object(
            "Summary",
            vec![(a.clone(), o.clone().member(&total)), (b.clone(), o.member(&reference))],
        )
    });
    let rendered = render(&compile(&query, &mapping), &Postgres);

    assert_eq!(rendered.sql, r#"SELECT "t0"."TOTAL", "t0"."REFERENCE" FROM "ORDER" AS "t0""#);
    assert_eq!(rendered.layout[0].property.as_ref(), Some(&a));
    assert!(rendered.layout[0].new_element);
    assert_eq!(rendered.layout[1].property.as_ref(), Some(&b));
    assert!(!rendered.layout[1].new_element);
}

#[test]
fn test_render_reference_join() {
    let mapping = mapping();
    let customer = prop(&mapping, "Order", "Customer");
    let name = prop(&mapping, "Customer", "Name");

    let query = source("Order").filter("o", |o| o.member(&customer).member(&name).eq(constant("ACME")));
    let rendered = render(&compile(&query, &mapping), &Postgres);

    assert_eq!(
        rendered.sql,
        format!(
            r#"SELECT {ORDER_COLUMNS} FROM "ORDER" AS "t0" INNER JOIN "CUSTOMER" AS "t1" ON ("t0"."IDFK_CUSTOMER" = "t1"."ID") WHERE ("t1"."NAME" = $1)"#
        )
    );
    assert_eq!(rendered.params, vec![Value::String("ACME".into())]);
}

#[test]
fn test_render_in_list_without_nulls() {
    let mapping = mapping();
    let id = prop(&mapping, "Order", "Id");

    let query = source("Order").filter("o", |o| {
        list(vec![Value::Int(1), Value::Null, Value::Int(2), Value::Int(3)]).contains(o.member(&id))
    });
    let rendered = render(&compile(&query, &mapping), &Postgres);

    assert_eq!(
        rendered.sql,
        format!(r#"SELECT {ORDER_COLUMNS} FROM "ORDER" AS "t0" WHERE ("t0"."ID" IN ($1, $2, $3))"#)
    );
    assert_eq!(rendered.params, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn test_render_null_comparison() {
    let mapping = mapping();
    let customer = prop(&mapping, "Order", "Customer");
    let name = prop(&mapping, "Customer", "Name");

    let query = source("Order").filter("o", |o| {
        o.member(&customer)
            .member(&name)
            .ne(query_syntax::builder::null())
    });
    let rendered = render(&compile(&query, &mapping), &Postgres);

    assert!(
        rendered.sql.ends_with(r#"WHERE ("t1"."NAME" IS NOT NULL)"#),
        "{}",
        rendered.sql
    );
    assert!(rendered.params.is_empty());
}

#[test]
fn test_render_collection_exists() {
    let mapping = mapping();
    let lines = prop(&mapping, "Order", "Lines");
    let quantity = prop(&mapping, "OrderLine", "Quantity");

    let query = source("Order").filter("o", |o| {
        o.member(&lines)
            .any_where("l", |l| l.member(&quantity).gt(constant(5)))
    });
    let rendered = render(&compile(&query, &mapping), &Postgres);

    assert_eq!(
        rendered.sql,
        format!(
            r#"SELECT {ORDER_COLUMNS} FROM "ORDER" AS "t0" WHERE EXISTS (SELECT "t1".* FROM "ORDER_LINE" AS "t1" WHERE (("t1"."IDFK_LINES" = "t0"."ID") AND ("t1"."QUANTITY" > $1)))"#
        )
    );
}

#[test]
fn test_render_many_to_many_exists() {
    let mapping = mapping();
    let tags = prop(&mapping, "Order", "Tags");
    let label = prop(&mapping, "Tag", "Label");

    let query = source("Order").filter("o", |o| {
        o.member(&tags)
            .any_where("t", |t| t.member(&label).eq(constant("urgent")))
    });
    let rendered = render(&compile(&query, &mapping), &Postgres);

    assert_eq!(
        rendered.sql,
        format!(
            r#"SELECT {ORDER_COLUMNS} FROM "ORDER" AS "t0" WHERE EXISTS (SELECT "t2".* FROM "TAG" AS "t2" INNER JOIN "ORDER_TAGS" AS "t1" ON ("t2"."ID" = "t1"."IDFK_TAG") WHERE (("t1"."IDFK_ORDER" = "t0"."ID") AND ("t2"."LABEL" = $1)))"#
        )
    );
}

#[test]
fn test_render_hoisted_sum() {
    let mapping = mapping();
    let total = prop(&mapping, "Order", "Total");

    let query = source("Order")
        .filter("x", |x| x.member(&total).gt(constant(0)))
        .sum("x", |x| x.member(&total));
    let rendered = render(&compile(&query, &mapping), &Postgres);

    assert_eq!(
        rendered.sql,
        r#"SELECT SUM("t1"."c0") FROM (SELECT "t0"."TOTAL" AS "c0" FROM "ORDER" AS "t0" WHERE ("t0"."TOTAL" > $1)) AS "t1""#
    );
    assert_eq!(rendered.params, vec![Value::Int(0)]);
}

#[test]
fn test_render_count() {
    let mapping = mapping();
    let rendered = render(&compile(&source("Order").count(), &mapping), &Postgres);

    assert_eq!(
        rendered.sql,
        r#"SELECT COUNT(*) FROM (SELECT "t0".* FROM "ORDER" AS "t0") AS "t1""#
    );
}

#[test]
fn test_render_grouping() {
    let mapping = mapping();
    let shipped = prop(&mapping, "Order", "Shipped");
    let key = dto("ShippedCount", "Shipped", DataType::Boolean);
    let count = dto("ShippedCount", "Count", DataType::Int);

    let query = source("Order")
        .group_by("o", |o| o.member(&shipped))
        .filter("g", |g| g.count().gt(constant(1)))
        .select("g", |g| {
            new_object(
                "ShippedCount",
                vec![(key.clone(), g.clone().key()), (count.clone(), g.count())],
            )
        });
    let rendered = render(&compile(&query, &mapping), &Postgres);

    assert_eq!(
        rendered.sql,
        r#"SELECT "t0"."SHIPPED", COUNT(*) FROM "ORDER" AS "t0" GROUP BY "t0"."SHIPPED" HAVING (COUNT(*) > $1)"#
    );
}

#[test]
fn test_render_top_level_any() {
    let mapping = mapping();
    let rendered = render(&compile(&source("Order").any(), &mapping), &Postgres);

    assert_eq!(
        rendered.sql,
        r#"SELECT CASE WHEN EXISTS (SELECT "t0".* FROM "ORDER" AS "t0") THEN $1::BOOLEAN ELSE $2::BOOLEAN END"#
    );
    assert_eq!(rendered.params, vec![Value::Boolean(true), Value::Boolean(false)]);
}

#[test]
fn test_render_ordering_drops_from_unpaged_derived_table() {
    let mapping = mapping();
    let total = prop(&mapping, "Order", "Total");

    let query = source("Order").order_by("o", |o| o.member(&total)).count();
    let rendered = render(&compile(&query, &mapping), &Postgres);
    assert!(!rendered.sql.contains("ORDER BY"), "{}", rendered.sql);

    let query = source("Order")
        .order_by_desc("o", |o| o.member(&total))
        .take(5)
        .count();
    let rendered = render(&compile(&query, &mapping), &Postgres);
    assert_eq!(
        rendered.sql,
        r#"SELECT COUNT(*) FROM (SELECT "t0".* FROM "ORDER" AS "t0" ORDER BY "t0"."TOTAL" DESC LIMIT 5) AS "t1""#
    );
}
