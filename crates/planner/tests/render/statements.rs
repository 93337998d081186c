use super::helpers::*;
use model::core::value::Value;
use planner::query::{
    dialect::{MySql, Postgres, SqlServer},
    mapping::DefaultSqlMapping,
};
use query_syntax::{
    Expr,
    builder::{constant, delete, insert, member_init, source, update},
};

fn ship_big_orders(mapping: &DefaultSqlMapping) -> Expr {
    let total = prop(mapping, "Order", "Total");
    let shipped = prop(mapping, "Order", "Shipped");
    update(
        source("Order").filter("o", |o| o.member(&total).gt(constant(100.0))),
        "o",
        |_| member_init("Order", vec![(shipped.clone(), constant(true))]),
    )
}

fn delete_by_customer(mapping: &DefaultSqlMapping) -> Expr {
    let customer = prop(mapping, "Order", "Customer");
    let name = prop(mapping, "Customer", "Name");
    delete(source("Order").filter("o", |o| o.member(&customer).member(&name).eq(constant("ACME"))))
}

#[test]
fn test_render_update_per_dialect() {
    let mapping = mapping();
    let statement = compile(&ship_big_orders(&mapping), &mapping);

    let rendered = render(&statement, &Postgres);
    assert_eq!(
        rendered.sql,
        r#"UPDATE "ORDER" AS "t0" SET "SHIPPED" = $1 WHERE ("t0"."TOTAL" > $2)"#
    );
    assert_eq!(rendered.params, vec![Value::Boolean(true), Value::Float(100.0)]);
    assert!(rendered.layout.is_empty());

    let rendered = render(&statement, &MySql);
    assert_eq!(
        rendered.sql,
        "UPDATE `ORDER` AS `t0` SET `t0`.`SHIPPED` = ? WHERE (`t0`.`TOTAL` > ?)"
    );

    let rendered = render(&statement, &SqlServer);
    assert_eq!(
        rendered.sql,
        "UPDATE [t0] SET [SHIPPED] = @P1 FROM [ORDER] AS [t0] WHERE ([t0].[TOTAL] > @P2)"
    );
}

#[test]
fn test_render_joined_delete_per_dialect() {
    let mapping = mapping();
    let statement = compile(&delete_by_customer(&mapping), &mapping);

    let rendered = render(&statement, &Postgres);
    assert_eq!(
        rendered.sql,
        r#"DELETE FROM "ORDER" AS "t0" WHERE "t0"."ID" IN (SELECT "t0"."ID" FROM "ORDER" AS "t0" INNER JOIN "CUSTOMER" AS "t1" ON ("t0"."IDFK_CUSTOMER" = "t1"."ID") WHERE ("t1"."NAME" = $1))"#
    );

    let rendered = render(&statement, &MySql);
    assert_eq!(
        rendered.sql,
        "DELETE `t0` FROM `ORDER` AS `t0` INNER JOIN `CUSTOMER` AS `t1` ON (`t0`.`IDFK_CUSTOMER` = `t1`.`ID`) WHERE (`t1`.`NAME` = ?)"
    );

    let rendered = render(&statement, &SqlServer);
    assert_eq!(
        rendered.sql,
        "DELETE [t0] FROM [ORDER] AS [t0] INNER JOIN [CUSTOMER] AS [t1] ON ([t0].[IDFK_CUSTOMER] = [t1].[ID]) WHERE ([t1].[NAME] = @P1)"
    );
}

#[test]
fn test_render_plain_delete() {
    let mapping = mapping();
    let statement = compile(&delete(source("Tag")), &mapping);

    let rendered = render(&statement, &Postgres);
    assert_eq!(rendered.sql, r#"DELETE FROM "TAG" AS "t0""#);
}

#[test]
fn test_render_insert_select() {
    let mapping = mapping();
    let name = prop(&mapping, "Customer", "Name");
    let active = prop(&mapping, "Customer", "Active");
    let label = prop(&mapping, "Tag", "Label");

    let query = insert(
        source("Customer").filter("c", |c| c.member(&active)),
        "c",
        |c| member_init("Tag", vec![(label.clone(), c.member(&name))]),
    );
    let rendered = render(&compile(&query, &mapping), &Postgres);

    assert_eq!(
        rendered.sql,
        r#"INSERT INTO "TAG" ("LABEL") SELECT "t0"."NAME" FROM "CUSTOMER" AS "t0" WHERE ("t0"."ACTIVE" = $1)"#
    );
    assert_eq!(rendered.params, vec![Value::Boolean(true)]);
}
