//! Static types of expression nodes.

use crate::ast::{BinaryOp, Expr, Literal, Method, UnaryOp};
use model::core::{data_type::DataType, types::TypeRef};

impl Expr {
    /// The static type of this expression.
    pub fn ty(&self) -> TypeRef {
        match self {
            Expr::Source(entity) => TypeRef::query(TypeRef::entity(entity)),
            Expr::Constant(literal) => literal.ty(),
            Expr::Parameter(param) => param.ty.clone(),
            Expr::Member { property, .. } => property.ty.clone(),
            Expr::Key(target) => match target.ty() {
                TypeRef::Grouping { key, .. } => *key,
                other => other,
            },
            Expr::Binary { op, left, right } => match op {
                BinaryOp::And | BinaryOp::Or => TypeRef::boolean(),
                op if op.is_comparison() => TypeRef::boolean(),
                BinaryOp::Coalesce => right.ty(),
                _ => left.ty(),
            },
            Expr::Unary { op, operand } => match op {
                UnaryOp::Not => TypeRef::boolean(),
                UnaryOp::Convert | UnaryOp::Negate => operand.ty(),
            },
            Expr::Conditional { if_true, .. } => if_true.ty(),
            Expr::Call { method, args } => call_type(method, args),
            Expr::Lambda(lambda) => lambda.body.ty(),
            Expr::New { ty, .. } | Expr::MemberInit { ty, .. } => TypeRef::object(ty),
        }
    }

    /// The element type when this expression is iterated.
    pub fn element_type(&self) -> TypeRef {
        let ty = self.ty();
        ty.element().cloned().unwrap_or(ty)
    }
}

impl Literal {
    pub fn ty(&self) -> TypeRef {
        match self {
            Literal::Value(value) if value.is_null() => {
                TypeRef::nullable(DataType::Custom("NULL".into()))
            }
            Literal::Value(value) => TypeRef::scalar(value.data_type()),
            Literal::List(values) => {
                let element = values
                    .iter()
                    .find(|v| !v.is_null())
                    .map(|v| TypeRef::nullable(v.data_type()))
                    .unwrap_or_else(|| TypeRef::nullable(DataType::Custom("NULL".into())));
                TypeRef::collection(element)
            }
            Literal::Entity { entity, .. } => TypeRef::entity(entity),
        }
    }
}

/// Wraps `element` the same way the receiver wraps its own elements: query
/// operators keep producing queries, collection operators collections.
fn same_shape(receiver: &TypeRef, element: TypeRef) -> TypeRef {
    if receiver.is_query() {
        TypeRef::query(element)
    } else {
        TypeRef::collection(element)
    }
}

fn selector_type(args: &[Expr]) -> Option<TypeRef> {
    args.get(1)
        .and_then(Expr::as_lambda)
        .map(|lambda| lambda.body.ty())
}

fn call_type(method: &Method, args: &[Expr]) -> TypeRef {
    let receiver = args.first().map(Expr::ty).unwrap_or_else(TypeRef::boolean);
    let element = receiver.element().cloned().unwrap_or_else(|| receiver.clone());

    match method {
        Method::Where
        | Method::Skip
        | Method::Take
        | Method::Distinct
        | Method::OrderBy
        | Method::OrderByDescending
        | Method::ThenBy
        | Method::ThenByDescending
        | Method::EagerLoad
        | Method::LazyLoad
        | Method::BatchLazyLoad
        | Method::DontLoad
        | Method::UseLeftJoin
        | Method::Named(_) => receiver,
        Method::Select => same_shape(&receiver, selector_type(args).unwrap_or(element)),
        Method::SelectMany => {
            let body = selector_type(args).unwrap_or_else(|| element.clone());
            let flattened = body.element().cloned().unwrap_or(body);
            same_shape(&receiver, flattened)
        }
        Method::GroupBy => {
            let key = selector_type(args).unwrap_or_else(|| element.clone());
            same_shape(&receiver, TypeRef::grouping(key, element))
        }
        Method::First => element,
        Method::Count | Method::Insert | Method::Update | Method::Delete => {
            TypeRef::scalar(DataType::Int)
        }
        Method::Average => TypeRef::scalar(DataType::Double),
        Method::Sum | Method::Min | Method::Max => selector_type(args).unwrap_or(element),
        Method::Any | Method::Contains | Method::StartsWith | Method::EndsWith => {
            TypeRef::boolean()
        }
    }
}
