use crate::query::dml::{AliasId, NodeId, RequestId};
use model::core::value::Value;
use std::fmt;

/// Column name that selects every column of an alias.
pub const ALL_COLUMNS: &str = "*";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Column {
        alias: AliasId,
        column: String,
    },
    /// A whole mapped row. Renders as the alias' id column; expanded into
    /// every mapped column when it ends up in the root select list.
    AliasRef(AliasId),
    Constant(Value),
    /// `operand` is absent only for `COUNT(*)`.
    Unary {
        op: UnaryOp,
        operand: Option<NodeId>,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    In {
        operand: NodeId,
        values: Vec<NodeId>,
    },
    Conditional {
        test: NodeId,
        then: NodeId,
        otherwise: NodeId,
    },
    SubRequest(RequestId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Count,
    Max,
    Min,
    Sum,
    Average,
    Exists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Like,
    Concat,
    Coalesce,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Node {
    pub fn column(alias: AliasId, column: &str) -> Self {
        Node::Column {
            alias,
            column: column.to_string(),
        }
    }

    pub fn all_columns(alias: AliasId) -> Self {
        Self::column(alias, ALL_COLUMNS)
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Node::Constant(value.into())
    }

    /// Direct child nodes, in evaluation order. Sub-requests are not nodes
    /// and are not listed.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Node::Column { .. } | Node::AliasRef(_) | Node::Constant(_) | Node::SubRequest(_) => {
                vec![]
            }
            Node::Unary { operand, .. } => operand.iter().copied().collect(),
            Node::Binary { left, right, .. } => vec![*left, *right],
            Node::In { operand, values } => {
                let mut children = Vec::with_capacity(values.len() + 1);
                children.push(*operand);
                children.extend(values);
                children
            }
            Node::Conditional {
                test,
                then,
                otherwise,
            } => vec![*test, *then, *otherwise],
        }
    }

    pub fn is_null_constant(&self) -> bool {
        matches!(self, Node::Constant(Value::Null))
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Node::Unary {
                op: UnaryOp::Count | UnaryOp::Max | UnaryOp::Min | UnaryOp::Sum | UnaryOp::Average,
                ..
            }
        )
    }
}

impl UnaryOp {
    /// The SQL function name of aggregate operators.
    pub fn function(&self) -> Option<&'static str> {
        match self {
            UnaryOp::Count => Some("COUNT"),
            UnaryOp::Max => Some("MAX"),
            UnaryOp::Min => Some("MIN"),
            UnaryOp::Sum => Some("SUM"),
            UnaryOp::Average => Some("AVG"),
            UnaryOp::Not | UnaryOp::Exists => None,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "<>",
            BinaryOp::LessThan => "<",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::Like => "LIKE",
            BinaryOp::Concat => "||",
            BinaryOp::Coalesce => "COALESCE",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
        };
        write!(f, "{symbol}")
    }
}
