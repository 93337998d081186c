use super::helpers::*;
use planner::query::{DdlTranslator, dialect::DialectKind};

fn entities(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn first_lines(scripts: &[String]) -> Vec<&str> {
    scripts
        .iter()
        .map(|sql| sql.lines().next().unwrap_or_default())
        .collect()
}

#[test]
fn test_plan_orders_referenced_tables_first() {
    let translator = DdlTranslator::for_kind(DialectKind::Postgres);
    let script = translator
        .plan(&entities(&["OrderLine", "Order", "Tag", "Customer"]), &mapping())
        .unwrap();

    assert_eq!(
        first_lines(&script.objects),
        vec![
            r#"CREATE TABLE "TAG" ("#,
            r#"CREATE TABLE "CUSTOMER" ("#,
            r#"CREATE TABLE "ORDER" ("#,
            r#"CREATE TABLE "ORDER_LINE" ("#,
        ]
    );
}

#[test]
fn test_plan_full_order_schema() {
    let translator = DdlTranslator::for_kind(DialectKind::Postgres);
    let script = translator
        .plan(&entities(&["Order", "Customer", "OrderLine", "Tag"]), &mapping())
        .unwrap();

    assert_eq!(
        script.objects[1],
        r#"CREATE TABLE "ORDER" (
	"ID" INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
	"REFERENCE" VARCHAR(20) NOT NULL,
	"TOTAL" DOUBLE PRECISION NOT NULL,
	"SHIPPED" BOOLEAN NOT NULL,
	"IDFK_CUSTOMER" INTEGER REFERENCES "CUSTOMER" ("ID")
)"#
    );

    assert_eq!(
        script.constraints,
        vec![
            r#"ALTER TABLE "ORDER_LINE" ADD COLUMN "IDFK_LINES" INTEGER REFERENCES "ORDER" ("ID")"#
                .to_string(),
            r#"CREATE TABLE "ORDER_TAGS" (
	"IDFK_ORDER" INTEGER NOT NULL REFERENCES "ORDER" ("ID"),
	"IDFK_TAG" INTEGER NOT NULL REFERENCES "TAG" ("ID"),
	PRIMARY KEY ("IDFK_ORDER", "IDFK_TAG")
)"#
            .to_string(),
        ]
    );
}

#[test]
fn test_statements_run_objects_before_constraints() {
    let translator = DdlTranslator::for_kind(DialectKind::MySql);
    let script = translator
        .plan(&entities(&["Order", "Customer", "OrderLine", "Tag"]), &mapping())
        .unwrap();

    let statements: Vec<&String> = script.statements().collect();
    assert_eq!(statements.len(), 6);
    assert!(statements[..4].iter().all(|sql| sql.starts_with("CREATE TABLE")));
    assert!(statements[4].starts_with("ALTER TABLE `ORDER_LINE`"));
    assert!(statements[5].starts_with("CREATE TABLE `ORDER_TAGS`"));
}

#[test]
fn test_plan_creates_a_repeated_entity_once() {
    let translator = DdlTranslator::for_kind(DialectKind::Postgres);
    let script = translator
        .plan(&entities(&["Customer", "Order", "Order"]), &mapping())
        .unwrap();

    assert_eq!(
        first_lines(&script.objects),
        vec![r#"CREATE TABLE "CUSTOMER" ("#, r#"CREATE TABLE "ORDER" ("#]
    );
    assert_eq!(script.constraints.len(), 2);
}
