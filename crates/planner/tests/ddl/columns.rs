use super::helpers::*;
use planner::query::{
    DdlError, DdlStatement, DdlTranslator,
    dialect::{Db2, DialectKind, SqlServer},
};

fn translate(translator: &DdlTranslator, statement: DdlStatement) -> (Vec<String>, Vec<String>) {
    let mut objects = Vec::new();
    let mut constraints = Vec::new();
    translator
        .translate(&statement, &mapping(), &mut objects, &mut constraints)
        .unwrap();
    (objects, constraints)
}

#[test]
fn test_identity_key_per_dialect() {
    let statement = DdlStatement::create_table("Tag");

    let (objects, _) = translate(&DdlTranslator::for_kind(DialectKind::MySql), statement.clone());
    assert_eq!(
        objects[0],
        "CREATE TABLE `TAG` (\n\t`ID` INT NOT NULL AUTO_INCREMENT PRIMARY KEY,\n\t`LABEL` VARCHAR(255) NOT NULL\n)"
    );

    let (objects, _) = translate(&DdlTranslator::new(Box::new(SqlServer)), statement.clone());
    assert_eq!(
        objects[0],
        "CREATE TABLE [TAG] (\n\t[ID] INTEGER NOT NULL IDENTITY PRIMARY KEY,\n\t[LABEL] NVARCHAR(100) NOT NULL\n)"
    );

    let (objects, _) = translate(&DdlTranslator::new(Box::new(Db2)), statement);
    assert_eq!(
        objects[0],
        "CREATE TABLE \"TAG\" (\n\t\"ID\" INTEGER NOT NULL GENERATED ALWAYS AS IDENTITY (START WITH 1 INCREMENT BY 1) PRIMARY KEY,\n\t\"LABEL\" NVARCHAR(100) NOT NULL\n)"
    );
}

#[test]
fn test_add_scalar_column_alters_the_owner() {
    let translator = DdlTranslator::new(Box::new(SqlServer));
    let (objects, constraints) = translate(&translator, DdlStatement::add_column("Order", "Total"));

    assert_eq!(objects, vec!["ALTER TABLE [ORDER] ADD [TOTAL] FLOAT NOT NULL".to_string()]);
    assert!(constraints.is_empty());
}

#[test]
fn test_add_collection_column_alters_the_child() {
    let translator = DdlTranslator::for_kind(DialectKind::Postgres);
    let (objects, constraints) = translate(&translator, DdlStatement::add_column("Order", "Lines"));

    assert!(objects.is_empty());
    assert_eq!(
        constraints,
        vec![
            r#"ALTER TABLE "ORDER_LINE" ADD COLUMN "IDFK_LINES" INTEGER REFERENCES "ORDER" ("ID")"#
                .to_string()
        ]
    );
}

#[test]
fn test_add_unknown_property_fails() {
    let translator = DdlTranslator::for_kind(DialectKind::Postgres);
    let result = translator.translate(
        &DdlStatement::add_column("Order", "Discount"),
        &mapping(),
        &mut Vec::new(),
        &mut Vec::new(),
    );

    assert!(matches!(result, Err(DdlError::Mapping(_))));
}
