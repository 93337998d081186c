use crate::query::dialect::{Dialect, DialectKind, DmlStyle, render_sized_type};
use model::core::data_type::{DataType, SqlDialect};

#[derive(Debug, Clone)]
pub struct SqlServer;

impl Dialect for SqlServer {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("[{}]", ident.replace(']', "]]"))
    }

    fn get_placeholder(&self, index: usize) -> String {
        format!("@P{}", index + 1)
    }

    fn render_data_type(&self, data_type: &DataType, max_length: Option<usize>) -> String {
        render_sized_type(data_type, max_length, SqlDialect::SqlServer)
    }

    fn name(&self) -> String {
        "SQL Server".into()
    }

    fn kind(&self) -> DialectKind {
        DialectKind::SqlServer
    }

    fn identity_clause(&self) -> &'static str {
        " NOT NULL IDENTITY PRIMARY KEY"
    }

    fn concat_tokens(&self) -> (&'static str, &'static str, &'static str) {
        ("(", " + ", ")")
    }

    fn top_clause(&self, skip: Option<u64>, take: Option<u64>) -> Option<String> {
        match (skip, take) {
            (None, Some(take)) => Some(format!("TOP ({take})")),
            _ => None,
        }
    }

    fn render_pagination(&self, sql: &mut String, skip: Option<u64>, take: Option<u64>, ordered: bool) {
        let Some(skip) = skip else {
            return;
        };
        // OFFSET requires an ORDER BY clause
        if !ordered {
            sql.push_str(" ORDER BY (SELECT NULL)");
        }
        sql.push_str(&format!(" OFFSET {skip} ROWS"));
        if let Some(take) = take {
            sql.push_str(&format!(" FETCH NEXT {take} ROWS ONLY"));
        }
    }

    fn dml_style(&self) -> DmlStyle {
        DmlStyle::FromClause
    }

    fn add_column_keyword(&self) -> &'static str {
        "ADD"
    }
}
