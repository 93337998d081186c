use crate::query::{
    ast::create_table::{ColumnDef, CreateTable, TableConstraint},
    dialect::DialectKind,
    renderer::{Render, Renderer},
};
use model::core::value::Value;

impl Render for CreateTable {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("CREATE TABLE ");
        r.push_table(&self.table);
        r.sql.push_str(" (");

        let num_cols = self.columns.len();
        for (i, col) in self.columns.iter().enumerate() {
            r.sql.push_str("\n\t");
            col.render(r);
            if i < num_cols - 1 || !self.constraints.is_empty() {
                r.sql.push(',');
            }
        }

        for (i, constraint) in self.constraints.iter().enumerate() {
            r.sql.push_str("\n\t");
            constraint.render(r);
            if i < self.constraints.len() - 1 {
                r.sql.push(',');
            }
        }

        r.sql.push_str("\n)");
    }
}

impl Render for ColumnDef {
    fn render(&self, r: &mut Renderer) {
        // Name and Type
        r.push_identifier(&self.name);
        r.sql.push(' ');
        r.sql
            .push_str(&r.dialect.render_data_type(&self.data_type, self.max_length));

        if self.is_identity {
            r.sql.push_str(r.dialect.identity_clause());
            return;
        }

        // Constraints
        if self.is_primary_key {
            r.sql.push_str(" PRIMARY KEY");
        }
        if !self.is_nullable {
            r.sql.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default_value {
            r.sql.push_str(" DEFAULT ");
            let literal = render_literal(default, r.dialect.kind());
            r.sql.push_str(&literal);
        }
        if let Some(reference) = &self.references {
            r.sql.push_str(" REFERENCES ");
            r.push_table(&reference.table);
            r.sql.push_str(" (");
            r.push_identifier(&reference.column);
            r.sql.push(')');
        }
    }
}

impl Render for TableConstraint {
    fn render(&self, r: &mut Renderer) {
        match self {
            TableConstraint::PrimaryKey { columns } => {
                r.sql.push_str("PRIMARY KEY (");
                let quoted: Vec<String> = columns
                    .iter()
                    .map(|c| r.dialect.quote_identifier(c))
                    .collect();
                r.sql.push_str(&quoted.join(", "));
                r.sql.push(')');
            }
            TableConstraint::ForeignKey {
                columns,
                references,
                referenced_columns,
            } => {
                r.sql.push_str("FOREIGN KEY (");
                let quoted_columns: Vec<String> = columns
                    .iter()
                    .map(|c| r.dialect.quote_identifier(c))
                    .collect();
                r.sql.push_str(&quoted_columns.join(", "));

                r.sql.push_str(") REFERENCES ");
                r.push_table(references);
                r.sql.push_str(" (");
                let quoted_ref_columns: Vec<String> = referenced_columns
                    .iter()
                    .map(|c| r.dialect.quote_identifier(c))
                    .collect();
                r.sql.push_str(&quoted_ref_columns.join(", "));
                r.sql.push(')');
            }
        }
    }
}

/// Column defaults are part of the schema text, never parameters.
fn render_literal(value: &Value, dialect: DialectKind) -> String {
    match value {
        Value::Null => "NULL".into(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Boolean(v) => match dialect {
            DialectKind::Postgres | DialectKind::MySql => v.to_string().to_uppercase(),
            DialectKind::SqlServer | DialectKind::Db2 => u8::from(*v).to_string(),
        },
        other => {
            let text = other.as_string().unwrap_or_default();
            format!("'{}'", text.replace('\'', "''"))
        }
    }
}
