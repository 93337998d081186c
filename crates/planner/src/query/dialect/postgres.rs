use crate::query::dialect::{Dialect, DialectKind, render_sized_type};
use model::core::data_type::{DataType, SqlDialect};

#[derive(Debug, Clone)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn get_placeholder(&self, index: usize) -> String {
        // PostgreSQL uses $1, $2, etc.
        format!("${}", index + 1)
    }

    fn render_data_type(&self, data_type: &DataType, max_length: Option<usize>) -> String {
        render_sized_type(data_type, max_length, SqlDialect::Postgres)
    }

    fn name(&self) -> String {
        "PostgreSQL".into()
    }

    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn identity_clause(&self) -> &'static str {
        " GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY"
    }

    fn cast(&self, expr: &str, data_type: &DataType) -> String {
        format!("{expr}::{}", self.render_data_type(data_type, None))
    }

    fn types_bare_parameters(&self) -> bool {
        true
    }
}
