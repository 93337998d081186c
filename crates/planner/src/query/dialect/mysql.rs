use crate::query::dialect::{Dialect, DialectKind, DmlStyle, render_sized_type};
use model::core::data_type::{DataType, SqlDialect};

/// Row count MySQL documents for "all remaining rows" in `LIMIT`.
const UNBOUNDED_LIMIT: u64 = u64::MAX;

#[derive(Debug, Clone)]
pub struct MySql;

impl Dialect for MySql {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn get_placeholder(&self, _index: usize) -> String {
        // MySQL uses ?
        "?".into()
    }

    fn render_data_type(&self, data_type: &DataType, max_length: Option<usize>) -> String {
        render_sized_type(data_type, max_length, SqlDialect::MySql)
    }

    fn name(&self) -> String {
        "MySQL".into()
    }

    fn kind(&self) -> DialectKind {
        DialectKind::MySql
    }

    fn identity_clause(&self) -> &'static str {
        " NOT NULL AUTO_INCREMENT PRIMARY KEY"
    }

    fn concat_tokens(&self) -> (&'static str, &'static str, &'static str) {
        ("CONCAT(", ", ", ")")
    }

    fn render_pagination(&self, sql: &mut String, skip: Option<u64>, take: Option<u64>, _ordered: bool) {
        match (skip, take) {
            (None, None) => {}
            (skip, take) => {
                sql.push_str(&format!(" LIMIT {}", take.unwrap_or(UNBOUNDED_LIMIT)));
                if let Some(skip) = skip {
                    sql.push_str(&format!(" OFFSET {skip}"));
                }
            }
        }
    }

    fn dml_style(&self) -> DmlStyle {
        DmlStyle::JoinedTarget
    }
}
