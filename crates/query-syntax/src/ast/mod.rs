use model::core::{
    types::{PropertyRef, TypeRef},
    value::Value,
};
use serde::{Deserialize, Serialize};

pub mod display;
pub mod method;
pub mod operator;
pub mod typing;

pub use method::Method;
pub use operator::{BinaryOp, UnaryOp};

/// A node of the typed query expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A query over a mapped entity. At the root it starts the statement;
    /// nested inside a lambda it is a sub-query literal.
    Source(String),
    Constant(Literal),
    Parameter(Param),
    Member {
        target: Box<Expr>,
        property: PropertyRef,
    },
    /// The key of a grouping (`g.Key`).
    Key(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
    /// An operator call; the receiver is always `args[0]`.
    Call {
        method: Method,
        args: Vec<Expr>,
    },
    Lambda(Lambda),
    /// Anonymous object construction, one member per argument.
    New {
        ty: String,
        members: Vec<(PropertyRef, Expr)>,
    },
    /// Object initializer (`new Dto { A = .., B = .. }`).
    MemberInit {
        ty: String,
        bindings: Vec<Binding>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Value(Value),
    List(Vec<Value>),
    /// An instance of a mapped entity, carried as its field values.
    Entity {
        entity: String,
        fields: Vec<(String, Value)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub id: ParamId,
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lambda {
    pub params: Vec<Param>,
    pub body: Box<Expr>,
}

impl Lambda {
    /// The single parameter of a unary lambda.
    pub fn param(&self) -> Option<&Param> {
        match self.params.as_slice() {
            [param] => Some(param),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Binding {
    Assign { member: PropertyRef, value: Expr },
    /// Collection initializer on a member (`Items = { a, b }`).
    List { member: PropertyRef, items: Vec<Expr> },
}

impl Binding {
    pub fn member(&self) -> &PropertyRef {
        match self {
            Binding::Assign { member, .. } | Binding::List { member, .. } => member,
        }
    }
}

impl Expr {
    pub fn as_lambda(&self) -> Option<&Lambda> {
        match self {
            Expr::Lambda(lambda) => Some(lambda),
            _ => None,
        }
    }

    pub fn as_param(&self) -> Option<&Param> {
        match self {
            Expr::Parameter(param) => Some(param),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<(&Method, &[Expr])> {
        match self {
            Expr::Call { method, args } => Some((method, args)),
            _ => None,
        }
    }
}
