use crate::query::dialect::{Dialect, DialectKind, render_sized_type};
use model::core::data_type::{DataType, SqlDialect};

#[derive(Debug, Clone)]
pub struct Db2;

impl Dialect for Db2 {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn get_placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn render_data_type(&self, data_type: &DataType, max_length: Option<usize>) -> String {
        render_sized_type(data_type, max_length, SqlDialect::Db2)
    }

    fn name(&self) -> String {
        "DB2".into()
    }

    fn kind(&self) -> DialectKind {
        DialectKind::Db2
    }

    fn identity_clause(&self) -> &'static str {
        " NOT NULL GENERATED ALWAYS AS IDENTITY (START WITH 1 INCREMENT BY 1) PRIMARY KEY"
    }

    fn types_bare_parameters(&self) -> bool {
        true
    }

    fn render_pagination(&self, sql: &mut String, skip: Option<u64>, take: Option<u64>, _ordered: bool) {
        if let Some(skip) = skip {
            sql.push_str(&format!(" OFFSET {skip} ROWS"));
        }
        if let Some(take) = take {
            sql.push_str(&format!(" FETCH FIRST {take} ROWS ONLY"));
        }
    }

    fn dummy_table(&self) -> Option<&'static str> {
        Some("SYSIBM.SYSDUMMY1")
    }
}
