use crate::query::{
    dml::{ALL_COLUMNS, BinaryOp, DmlTree, Node, NodeId, UnaryOp},
    renderer::{Render, Renderer, request::RequestRef},
};

/// A node of a DML tree, ready to render.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    pub tree: &'t DmlTree,
    pub id: NodeId,
}

impl<'t> NodeRef<'t> {
    pub fn new(tree: &'t DmlTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    fn child(&self, id: NodeId) -> NodeRef<'t> {
        NodeRef::new(self.tree, id)
    }

    /// Renders constants as typed parameters where the dialect needs it.
    pub fn render_typed(&self, r: &mut Renderer) {
        match self.tree.node(self.id) {
            Node::Constant(value) if !value.is_null() => r.add_typed_param(value.clone()),
            _ => self.render(r),
        }
    }
}

impl Render for NodeRef<'_> {
    fn render(&self, r: &mut Renderer) {
        match self.tree.node(self.id) {
            Node::Column { alias, column } => {
                r.push_alias(self.tree, *alias);
                r.sql.push('.');
                if column == ALL_COLUMNS {
                    r.sql.push_str(ALL_COLUMNS);
                } else {
                    r.push_identifier(column);
                }
            }
            Node::AliasRef(alias) => {
                r.push_alias(self.tree, *alias);
                r.sql.push('.');
                match &self.tree.alias(*alias).id_column {
                    Some(id) => r.push_identifier(id),
                    None => r.sql.push_str(ALL_COLUMNS),
                }
            }
            // NULL is inlined and never bound
            Node::Constant(value) if value.is_null() => r.sql.push_str("NULL"),
            Node::Constant(value) => r.add_param(value.clone()),
            Node::Unary { op, operand } => render_unary(self, *op, *operand, r),
            Node::Binary { op, left, right } => render_binary(self, *op, *left, *right, r),
            Node::In { operand, values } => {
                if values.is_empty() {
                    r.sql.push_str("(1 = 0)");
                    return;
                }
                r.sql.push('(');
                self.child(*operand).render(r);
                r.sql.push_str(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(", ");
                    }
                    self.child(*value).render(r);
                }
                r.sql.push_str("))");
            }
            Node::Conditional {
                test,
                then,
                otherwise,
            } => {
                r.sql.push_str("CASE WHEN ");
                self.child(*test).render(r);
                r.sql.push_str(" THEN ");
                self.child(*then).render_typed(r);
                r.sql.push_str(" ELSE ");
                self.child(*otherwise).render_typed(r);
                r.sql.push_str(" END");
            }
            Node::SubRequest(request) => {
                r.sql.push('(');
                RequestRef::new(self.tree, *request).render(r);
                r.sql.push(')');
            }
        }
    }
}

fn render_unary(node: &NodeRef, op: UnaryOp, operand: Option<NodeId>, r: &mut Renderer) {
    match op {
        UnaryOp::Not => {
            r.sql.push_str("NOT ");
            if let Some(operand) = operand {
                node.child(operand).render(r);
            }
        }
        UnaryOp::Exists => {
            r.sql.push_str("EXISTS ");
            if let Some(operand) = operand {
                node.child(operand).render(r);
            }
        }
        UnaryOp::Count | UnaryOp::Max | UnaryOp::Min | UnaryOp::Sum | UnaryOp::Average => {
            r.sql.push_str(op.function().unwrap_or_default());
            r.sql.push('(');
            match operand {
                Some(operand) => node.child(operand).render(r),
                None => r.sql.push('*'),
            }
            r.sql.push(')');
        }
    }
}

fn render_binary(node: &NodeRef, op: BinaryOp, left: NodeId, right: NodeId, r: &mut Renderer) {
    let tree = node.tree;
    match op {
        // `= NULL` is never true
        BinaryOp::Equal | BinaryOp::NotEqual
            if tree.node(left).is_null_constant() || tree.node(right).is_null_constant() =>
        {
            let operand = if tree.node(left).is_null_constant() {
                right
            } else {
                left
            };
            r.sql.push('(');
            node.child(operand).render(r);
            r.sql.push_str(if op == BinaryOp::Equal {
                " IS NULL)"
            } else {
                " IS NOT NULL)"
            });
        }
        BinaryOp::Concat => {
            let (open, separator, close) = r.dialect.concat_tokens();
            r.sql.push_str(open);
            node.child(left).render_typed(r);
            r.sql.push_str(separator);
            node.child(right).render_typed(r);
            r.sql.push_str(close);
        }
        BinaryOp::Coalesce => {
            r.sql.push_str("COALESCE(");
            node.child(left).render(r);
            r.sql.push_str(", ");
            node.child(right).render(r);
            r.sql.push(')');
        }
        _ => {
            r.sql.push('(');
            node.child(left).render(r);
            r.sql.push_str(&format!(" {op} "));
            node.child(right).render(r);
            r.sql.push(')');
        }
    }
}
