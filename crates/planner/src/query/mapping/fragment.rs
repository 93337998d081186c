//! Alias-independent snapshots of node subtrees.
//!
//! A registered equivalent outlives the statement it was computed in, so it
//! cannot hold node or alias handles. A fragment replaces every alias by the
//! navigation path leading to it from an anchor alias, and is replayed onto
//! a new tree by resolving those paths again.

use crate::query::{
    dml::{AliasId, AliasOrigin, BinaryOp, DmlTree, Node, NodeId, RequestId, UnaryOp},
    mapping::{Resolved, SqlMapping},
};
use model::{core::types::PropertyRef, core::value::Value, error::MappingError};

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Column {
        path: Vec<PropertyRef>,
        column: String,
    },
    Row {
        path: Vec<PropertyRef>,
    },
    Constant(Value),
    Unary {
        op: UnaryOp,
        operand: Option<Box<Fragment>>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Fragment>,
        right: Box<Fragment>,
    },
    In {
        operand: Box<Fragment>,
        values: Vec<Fragment>,
    },
    Conditional {
        test: Box<Fragment>,
        then: Box<Fragment>,
        otherwise: Box<Fragment>,
    },
}

impl Fragment {
    /// Snapshots `node` relative to `anchor`. Returns `None` when the
    /// subtree reaches an alias that is not navigable from the anchor, or
    /// embeds a sub-request.
    pub fn capture(tree: &DmlTree, node: NodeId, anchor: AliasId) -> Option<Fragment> {
        let fragment = match tree.node(node) {
            Node::Column { alias, column } => Fragment::Column {
                path: path_from(tree, anchor, *alias)?,
                column: column.clone(),
            },
            Node::AliasRef(alias) => Fragment::Row {
                path: path_from(tree, anchor, *alias)?,
            },
            Node::Constant(value) => Fragment::Constant(value.clone()),
            Node::Unary { op, operand } => Fragment::Unary {
                op: *op,
                operand: match operand {
                    Some(operand) => Some(Box::new(Self::capture(tree, *operand, anchor)?)),
                    None => None,
                },
            },
            Node::Binary { op, left, right } => Fragment::Binary {
                op: *op,
                left: Box::new(Self::capture(tree, *left, anchor)?),
                right: Box::new(Self::capture(tree, *right, anchor)?),
            },
            Node::In { operand, values } => Fragment::In {
                operand: Box::new(Self::capture(tree, *operand, anchor)?),
                values: values
                    .iter()
                    .map(|value| Self::capture(tree, *value, anchor))
                    .collect::<Option<Vec<_>>>()?,
            },
            Node::Conditional {
                test,
                then,
                otherwise,
            } => Fragment::Conditional {
                test: Box::new(Self::capture(tree, *test, anchor)?),
                then: Box::new(Self::capture(tree, *then, anchor)?),
                otherwise: Box::new(Self::capture(tree, *otherwise, anchor)?),
            },
            Node::SubRequest(_) => return None,
        };
        Some(fragment)
    }

    /// Rebuilds the fragment in `tree`, anchored at `owner`.
    pub fn instantiate(
        &self,
        tree: &mut DmlTree,
        mapping: &dyn SqlMapping,
        request: RequestId,
        owner: AliasId,
        widen: bool,
    ) -> Result<NodeId, MappingError> {
        let node = match self {
            Fragment::Column { path, column } => Node::Column {
                alias: navigate(tree, mapping, request, owner, path, widen)?,
                column: column.clone(),
            },
            Fragment::Row { path } => {
                Node::AliasRef(navigate(tree, mapping, request, owner, path, widen)?)
            }
            Fragment::Constant(value) => Node::Constant(value.clone()),
            Fragment::Unary { op, operand } => Node::Unary {
                op: *op,
                operand: match operand {
                    Some(operand) => Some(operand.instantiate(tree, mapping, request, owner, widen)?),
                    None => None,
                },
            },
            Fragment::Binary { op, left, right } => Node::Binary {
                op: *op,
                left: left.instantiate(tree, mapping, request, owner, widen)?,
                right: right.instantiate(tree, mapping, request, owner, widen)?,
            },
            Fragment::In { operand, values } => Node::In {
                operand: operand.instantiate(tree, mapping, request, owner, widen)?,
                values: values
                    .iter()
                    .map(|value| value.instantiate(tree, mapping, request, owner, widen))
                    .collect::<Result<Vec<_>, _>>()?,
            },
            Fragment::Conditional {
                test,
                then,
                otherwise,
            } => Node::Conditional {
                test: test.instantiate(tree, mapping, request, owner, widen)?,
                then: then.instantiate(tree, mapping, request, owner, widen)?,
                otherwise: otherwise.instantiate(tree, mapping, request, owner, widen)?,
            },
        };
        Ok(tree.add(node))
    }
}

fn path_from(tree: &DmlTree, anchor: AliasId, alias: AliasId) -> Option<Vec<PropertyRef>> {
    if alias == anchor {
        return Some(Vec::new());
    }
    match &tree.alias(alias).origin {
        AliasOrigin::Navigation { owner, property, .. } => {
            let mut path = path_from(tree, anchor, *owner)?;
            path.push(property.clone());
            Some(path)
        }
        AliasOrigin::Root | AliasOrigin::Link { .. } => None,
    }
}

fn navigate(
    tree: &mut DmlTree,
    mapping: &dyn SqlMapping,
    request: RequestId,
    owner: AliasId,
    path: &[PropertyRef],
    widen: bool,
) -> Result<AliasId, MappingError> {
    let mut alias = owner;
    for step in path {
        alias = match mapping.sql_equivalent_for_property(tree, request, alias, step, widen)? {
            Resolved::Alias(next) => next,
            Resolved::Node(_) => {
                return Err(MappingError::InvalidRelation {
                    property: step.to_string(),
                    reason: "is not a navigation".into(),
                });
            }
        };
    }
    Ok(alias)
}
