use super::helpers::*;
use model::core::value::Value;
use planner::query::dialect::{Db2, MySql, Postgres, SqlServer};
use query_syntax::{
    Expr,
    builder::{constant, source},
};

fn paged_prefix_query(mapping: &planner::query::mapping::DefaultSqlMapping) -> Expr {
    let reference = prop(mapping, "Order", "Reference");
    let total = prop(mapping, "Order", "Total");
    source("Order")
        .filter("o", |o| o.member(&reference).starts_with(constant("R")))
        .order_by("o", |o| o.member(&total))
        .skip(20)
        .take(10)
}

#[test]
fn test_postgres_paging_and_typed_concat() {
    let mapping = mapping();
    let rendered = render(&compile(&paged_prefix_query(&mapping), &mapping), &Postgres);

    assert_eq!(
        rendered.sql,
        format!(
            r#"SELECT {ORDER_COLUMNS} FROM "ORDER" AS "t0" WHERE ("t0"."REFERENCE" LIKE ($1::VARCHAR || $2::VARCHAR)) ORDER BY "t0"."TOTAL" LIMIT 10 OFFSET 20"#
        )
    );
    assert_eq!(
        rendered.params,
        vec![Value::String("R".into()), Value::String("%".into())]
    );
}

#[test]
fn test_mysql_paging_and_concat() {
    let mapping = mapping();
    let rendered = render(&compile(&paged_prefix_query(&mapping), &mapping), &MySql);

    assert_eq!(
        rendered.sql,
        "SELECT `t0`.`ID`, `t0`.`REFERENCE`, `t0`.`TOTAL`, `t0`.`SHIPPED` FROM `ORDER` AS `t0` WHERE (`t0`.`REFERENCE` LIKE CONCAT(?, ?)) ORDER BY `t0`.`TOTAL` LIMIT 10 OFFSET 20"
    );
}

#[test]
fn test_sqlserver_offset_fetch() {
    let mapping = mapping();
    let rendered = render(&compile(&paged_prefix_query(&mapping), &mapping), &SqlServer);

    assert_eq!(
        rendered.sql,
        "SELECT [t0].[ID], [t0].[REFERENCE], [t0].[TOTAL], [t0].[SHIPPED] FROM [ORDER] AS [t0] WHERE ([t0].[REFERENCE] LIKE (@P1 + @P2)) ORDER BY [t0].[TOTAL] OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
    );
}

#[test]
fn test_sqlserver_top_and_unordered_offset() {
    let mapping = mapping();

    let rendered = render(&compile(&source("Tag").take(5), &mapping), &SqlServer);
    assert_eq!(
        rendered.sql,
        "SELECT TOP (5) [t0].[ID], [t0].[LABEL] FROM [TAG] AS [t0]"
    );

    let rendered = render(&compile(&source("Tag").skip(5), &mapping), &SqlServer);
    assert_eq!(
        rendered.sql,
        "SELECT [t0].[ID], [t0].[LABEL] FROM [TAG] AS [t0] ORDER BY (SELECT NULL) OFFSET 5 ROWS"
    );
}

#[test]
fn test_db2_fetch_first_and_casts() {
    let mapping = mapping();
    let rendered = render(&compile(&paged_prefix_query(&mapping), &mapping), &Db2);

    assert_eq!(
        rendered.sql,
        format!(
            r#"SELECT {ORDER_COLUMNS} FROM "ORDER" AS "t0" WHERE ("t0"."REFERENCE" LIKE (CAST(? AS NVARCHAR(100)) || CAST(? AS NVARCHAR(100)))) ORDER BY "t0"."TOTAL" OFFSET 20 ROWS FETCH FIRST 10 ROWS ONLY"#
        )
    );
}

#[test]
fn test_db2_selects_from_dummy_table() {
    let mapping = mapping();
    let rendered = render(&compile(&source("Tag").any(), &mapping), &Db2);

    assert_eq!(
        rendered.sql,
        r#"SELECT CASE WHEN EXISTS (SELECT "t0".* FROM "TAG" AS "t0") THEN CAST(? AS SMALLINT) ELSE CAST(? AS SMALLINT) END FROM SYSIBM.SYSDUMMY1"#
    );
}
