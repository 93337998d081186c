//! Defines the core rendering trait and context for converting AST to SQL.

use crate::query::{
    ast::common::TableRef,
    dialect::Dialect,
    dml::{AliasId, DmlTree, RequestKind},
    mapping::mapper::ColumnLayout,
    translate::Statement,
};
use model::core::value::Value;
use tracing::trace;

pub mod alter_table;
pub mod create_table;
pub mod node;
pub mod request;

pub use node::NodeRef;
pub use request::RequestRef;

/// A trait for any AST node that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// A context that holds the state during the rendering process.
///
/// It accumulates the SQL string and the parameters, and provides
/// access to the dialect for syntax-specific details.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
        }
    }

    /// Consumes the renderer and returns the final SQL string and parameters.
    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    pub fn add_param(&mut self, value: Value) {
        let placeholder = self.push_param(value);
        self.sql.push_str(&placeholder);
    }

    /// Adds a parameter wrapped in a cast to its own type when the dialect
    /// cannot infer the type of a bare parameter.
    pub fn add_typed_param(&mut self, value: Value) {
        if !self.dialect.types_bare_parameters() || value.is_null() {
            return self.add_param(value);
        }
        let data_type = value.data_type();
        let placeholder = self.push_param(value);
        let cast = self.dialect.cast(&placeholder, &data_type);
        self.sql.push_str(&cast);
    }

    fn push_param(&mut self, value: Value) -> String {
        self.params.push(value);
        self.dialect.get_placeholder(self.params.len() - 1)
    }

    pub fn push_identifier(&mut self, ident: &str) {
        let quoted = self.dialect.quote_identifier(ident);
        self.sql.push_str(&quoted);
    }

    pub fn push_table(&mut self, table: &TableRef) {
        if let Some(schema) = &table.schema {
            self.push_identifier(schema);
            self.sql.push('.');
        }
        self.push_identifier(&table.name);
    }

    pub(crate) fn push_alias(&mut self, tree: &DmlTree, alias: AliasId) {
        self.push_identifier(&tree.alias(alias).name);
    }
}

/// Rendered statement text, its parameters in placeholder order, and the
/// meaning of each result column.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSql {
    pub sql: String,
    pub params: Vec<Value>,
    pub layout: Vec<ColumnLayout>,
}

/// Renders translated statements for one dialect.
pub struct SqlRenderer<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> SqlRenderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub fn render(&self, statement: &Statement) -> RenderedSql {
        let mut renderer = Renderer::new(self.dialect);
        RequestRef::new(&statement.tree, statement.root).render(&mut renderer);
        let (sql, params) = renderer.finish();

        let request = statement.request();
        let layout = match request.kind {
            RequestKind::Select => request
                .select
                .iter()
                .map(|info| ColumnLayout {
                    property: info.property.clone(),
                    new_element: info.new_element,
                })
                .collect(),
            _ => Vec::new(),
        };

        trace!("Rendered for {}: {sql}", self.dialect.name());
        RenderedSql {
            sql,
            params,
            layout,
        }
    }
}
