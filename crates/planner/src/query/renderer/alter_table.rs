use crate::query::{
    ast::alter_table::{AlterTable, AlterTableOperation},
    renderer::{Render, Renderer},
};

impl Render for AlterTable {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("ALTER TABLE ");
        r.push_table(&self.table);
        r.sql.push(' ');

        for (i, op) in self.operations.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            op.render(r);
        }
    }
}

impl Render for AlterTableOperation {
    fn render(&self, r: &mut Renderer) {
        match self {
            AlterTableOperation::AddColumn(column) => {
                r.sql.push_str(r.dialect.add_column_keyword());
                r.sql.push(' ');
                column.render(r);
            }
            AlterTableOperation::AddConstraint(constraint) => {
                r.sql.push_str("ADD ");
                constraint.render(r);
            }
        }
    }
}
