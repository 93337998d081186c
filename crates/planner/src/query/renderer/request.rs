//! Statement forms of a request: SELECT, UPDATE, DELETE and
//! INSERT … SELECT.

use crate::query::{
    dialect::DmlStyle,
    dml::{AliasId, AliasSource, DmlTree, Node, NodeId, Request, RequestId, RequestKind},
    renderer::{Render, Renderer, node::NodeRef},
};

/// A request of a DML tree, ready to render.
#[derive(Clone, Copy)]
pub struct RequestRef<'t> {
    pub tree: &'t DmlTree,
    pub id: RequestId,
}

impl<'t> RequestRef<'t> {
    pub fn new(tree: &'t DmlTree, id: RequestId) -> Self {
        Self { tree, id }
    }

    fn request(&self) -> &'t Request {
        self.tree.request(self.id)
    }

    fn node(&self, id: NodeId) -> NodeRef<'t> {
        NodeRef::new(self.tree, id)
    }

    fn target(&self) -> Option<AliasId> {
        let request = self.request();
        request.target.or(request.from)
    }
}

impl Render for RequestRef<'_> {
    fn render(&self, r: &mut Renderer) {
        match self.request().kind {
            RequestKind::Select => self.render_select(r),
            RequestKind::Delete => self.render_delete(r),
            RequestKind::Update => self.render_update(r),
            RequestKind::InsertSelect => self.render_insert(r),
        }
    }
}

impl RequestRef<'_> {
    fn render_select(&self, r: &mut Renderer) {
        let request = self.request();
        r.sql.push_str("SELECT ");
        if request.distinct {
            r.sql.push_str("DISTINCT ");
        }
        let top = r.dialect.top_clause(request.skip, request.take);
        if let Some(top) = &top {
            r.sql.push_str(top);
            r.sql.push(' ');
        }

        if request.select.is_empty() {
            r.sql.push('*');
        }
        for (i, info) in request.select.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            self.node(info.node).render_typed(r);
            if let Some(label) = &info.label {
                r.sql.push_str(" AS ");
                r.push_identifier(label);
            }
        }

        self.render_from(r);
        self.render_filters(r);

        if top.is_none() {
            let ordered = !request.orders.is_empty();
            r.dialect
                .render_pagination(&mut r.sql, request.skip, request.take, ordered);
        }
    }

    /// `FROM source [joins]`, or the dialect's dummy table.
    fn render_from(&self, r: &mut Renderer) {
        let request = self.request();
        match request.from {
            Some(from) => {
                r.sql.push_str(" FROM ");
                self.render_source(r, from);
            }
            None => {
                if let Some(dummy) = r.dialect.dummy_table() {
                    r.sql.push_str(" FROM ");
                    r.sql.push_str(dummy);
                }
                return;
            }
        }
        self.render_joins(r);
    }

    fn render_joins(&self, r: &mut Renderer) {
        for join in &self.request().joins {
            r.sql.push(' ');
            r.sql.push_str(join.kind.keyword());
            r.sql.push(' ');
            self.render_source(r, join.alias);
            r.sql.push_str(" ON ");
            self.node(join.on).render(r);
        }
    }

    /// `WHERE`, `GROUP BY`, `HAVING` and `ORDER BY`.
    fn render_filters(&self, r: &mut Renderer) {
        let request = self.request();
        if let Some(filter) = request.where_clause {
            r.sql.push_str(" WHERE ");
            self.node(filter).render(r);
        }
        if !request.group_by.is_empty() {
            r.sql.push_str(" GROUP BY ");
            for (i, key) in request.group_by.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                self.node(*key).render(r);
            }
        }
        if let Some(having) = request.having {
            r.sql.push_str(" HAVING ");
            self.node(having).render(r);
        }
        if !request.orders.is_empty() {
            r.sql.push_str(" ORDER BY ");
            for (i, order) in request.orders.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                self.node(order.node).render(r);
                if !order.ascending {
                    r.sql.push_str(" DESC");
                }
            }
        }
    }

    fn render_source(&self, r: &mut Renderer, alias: AliasId) {
        let definition = self.tree.alias(alias);
        match &definition.source {
            AliasSource::Table(table) => r.push_identifier(table),
            AliasSource::Request(request) => {
                r.sql.push('(');
                RequestRef::new(self.tree, *request).render(r);
                r.sql.push(')');
            }
        }
        r.sql.push_str(" AS ");
        r.push_identifier(&definition.name);
    }

    fn render_target_table(&self, r: &mut Renderer, alias: AliasId) {
        if let AliasSource::Table(table) = &self.tree.alias(alias).source {
            r.push_identifier(table);
        }
    }

    fn render_delete(&self, r: &mut Renderer) {
        let Some(target) = self.target() else {
            return;
        };
        match r.dialect.dml_style() {
            DmlStyle::Subquery => {
                r.sql.push_str("DELETE FROM ");
                self.render_source(r, target);
                self.render_restriction(r, target);
            }
            DmlStyle::JoinedTarget | DmlStyle::FromClause => {
                r.sql.push_str("DELETE ");
                r.push_alias(self.tree, target);
                r.sql.push_str(" FROM ");
                self.render_source(r, target);
                self.render_joins(r);
                self.render_where(r);
            }
        }
    }

    fn render_update(&self, r: &mut Renderer) {
        let Some(target) = self.target() else {
            return;
        };
        match r.dialect.dml_style() {
            DmlStyle::Subquery => {
                r.sql.push_str("UPDATE ");
                self.render_source(r, target);
                self.render_assignments(r, false);
                self.render_restriction(r, target);
            }
            DmlStyle::JoinedTarget => {
                r.sql.push_str("UPDATE ");
                self.render_source(r, target);
                self.render_joins(r);
                self.render_assignments(r, true);
                self.render_where(r);
            }
            DmlStyle::FromClause => {
                r.sql.push_str("UPDATE ");
                r.push_alias(self.tree, target);
                self.render_assignments(r, false);
                r.sql.push_str(" FROM ");
                self.render_source(r, target);
                self.render_joins(r);
                self.render_where(r);
            }
        }
    }

    /// `INSERT INTO table (columns) SELECT values FROM …`
    fn render_insert(&self, r: &mut Renderer) {
        let request = self.request();
        let Some(target) = self.target() else {
            return;
        };
        r.sql.push_str("INSERT INTO ");
        self.render_target_table(r, target);
        r.sql.push_str(" (");
        for (i, assignment) in request.assignments.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            self.render_column_name(r, assignment.column);
        }
        r.sql.push_str(") SELECT ");
        if request.distinct {
            r.sql.push_str("DISTINCT ");
        }
        let top = r.dialect.top_clause(request.skip, request.take);
        if let Some(top) = &top {
            r.sql.push_str(top);
            r.sql.push(' ');
        }
        for (i, assignment) in request.assignments.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            self.node(assignment.value).render_typed(r);
        }
        self.render_from(r);
        self.render_filters(r);
        if top.is_none() {
            let ordered = !request.orders.is_empty();
            r.dialect
                .render_pagination(&mut r.sql, request.skip, request.take, ordered);
        }
    }

    fn render_assignments(&self, r: &mut Renderer, qualified: bool) {
        r.sql.push_str(" SET ");
        for (i, assignment) in self.request().assignments.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            if qualified {
                self.node(assignment.column).render(r);
            } else {
                self.render_column_name(r, assignment.column);
            }
            r.sql.push_str(" = ");
            self.node(assignment.value).render(r);
        }
    }

    fn render_column_name(&self, r: &mut Renderer, column: NodeId) {
        if let Node::Column { column, .. } = self.tree.node(column) {
            r.push_identifier(column);
        }
    }

    fn render_where(&self, r: &mut Renderer) {
        if let Some(filter) = self.request().where_clause {
            r.sql.push_str(" WHERE ");
            self.node(filter).render(r);
        }
    }

    /// The row restriction of a single-table UPDATE/DELETE. Joined requests
    /// restrict by id through a sub-select carrying the joins.
    fn render_restriction(&self, r: &mut Renderer, target: AliasId) {
        let request = self.request();
        let id_column = self.tree.alias(target).id_column.as_deref();
        let Some(id_column) = id_column.filter(|_| !request.joins.is_empty()) else {
            self.render_where(r);
            return;
        };

        r.sql.push_str(" WHERE ");
        r.push_alias(self.tree, target);
        r.sql.push('.');
        r.push_identifier(id_column);
        r.sql.push_str(" IN (SELECT ");
        r.push_alias(self.tree, target);
        r.sql.push('.');
        r.push_identifier(id_column);
        r.sql.push_str(" FROM ");
        self.render_source(r, target);
        self.render_joins(r);
        self.render_where(r);
        r.sql.push(')');
    }
}
