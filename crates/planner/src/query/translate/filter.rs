//! Row-level operators: filters, pagination, ordering and the predicates
//! that compile to `LIKE` or `IN`.

use crate::query::{
    dml::{BinaryOp, Node, NodeId, RequestId},
    translate::{Sql, TranslateError, Translator, arg},
};
use model::core::value::Value;
use query_syntax::{Expr, Literal, Method};
use tracing::debug;

const WILDCARD: &str = "%";

pub(crate) fn translate_where(
    t: &mut Translator<'_>,
    expr: &Expr,
    _method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let request = t.receiver_request(expr, &args[0])?;
    t.set_active(request);
    let predicate = translate_predicate(t, expr, request, arg(expr, args, 1)?)?;
    apply_filter(t, request, predicate);
    Ok(Sql::Request(request))
}

pub(crate) fn translate_first(
    t: &mut Translator<'_>,
    expr: &Expr,
    _method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let request = t.receiver_request(expr, &args[0])?;
    t.set_active(request);
    if let Some(lambda) = args.get(1) {
        let predicate = translate_predicate(t, expr, request, lambda)?;
        apply_filter(t, request, predicate);
    }
    t.tree_mut().request_mut(request).take = Some(1);
    Ok(Sql::Request(request))
}

pub(crate) fn translate_skip(
    t: &mut Translator<'_>,
    expr: &Expr,
    _method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let request = t.receiver_request(expr, &args[0])?;
    t.set_active(request);
    let count = row_count(expr, arg(expr, args, 1)?)?;
    t.tree_mut().request_mut(request).skip = Some(count);
    Ok(Sql::Request(request))
}

pub(crate) fn translate_take(
    t: &mut Translator<'_>,
    expr: &Expr,
    _method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let request = t.receiver_request(expr, &args[0])?;
    t.set_active(request);
    let count = row_count(expr, arg(expr, args, 1)?)?;
    t.tree_mut().request_mut(request).take = Some(count);
    Ok(Sql::Request(request))
}

pub(crate) fn translate_distinct(
    t: &mut Translator<'_>,
    expr: &Expr,
    _method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let request = t.receiver_request(expr, &args[0])?;
    t.set_active(request);
    t.tree_mut().request_mut(request).distinct = true;
    Ok(Sql::Request(request))
}

pub(crate) fn translate_order(
    t: &mut Translator<'_>,
    expr: &Expr,
    method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let request = t.receiver_request(expr, &args[0])?;
    t.set_active(request);
    if matches!(method, Method::OrderBy | Method::OrderByDescending) {
        t.tree_mut().request_mut(request).orders.clear();
    }
    let ascending = matches!(method, Method::OrderBy | Method::ThenBy);

    let body = t.bind_lambda(expr, request, arg(expr, args, 1)?)?;
    let key = t.visit_node(body)?;
    t.tree_mut().push_order(request, key, ascending);
    Ok(Sql::Request(request))
}

/// `Contains` is either a substring match (string receiver) or a
/// membership test against a literal list.
pub(crate) fn translate_contains(
    t: &mut Translator<'_>,
    expr: &Expr,
    method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let receiver = &args[0];
    let item = arg(expr, args, 1)?;

    if receiver.ty().is_textual() {
        return translate_like(t, expr, method, args);
    }

    let Expr::Constant(Literal::List(values)) = receiver else {
        return Err(TranslateError::unsupported(
            expr,
            "Contains is only supported on constant collections",
        ));
    };

    let operand = t.visit_node(item)?;
    let total = values.len();
    let values = values
        .iter()
        .filter(|value| !value.is_null())
        .map(|value| t.tree_mut().add(Node::Constant(value.clone())))
        .collect::<Vec<_>>();
    if values.len() < total {
        debug!(
            "Dropped {} null value(s) from the IN list of {expr}",
            total - values.len()
        );
    }

    Ok(Sql::Node(t.tree_mut().add(Node::In { operand, values })))
}

/// `StartsWith`, `EndsWith` and string `Contains` as `LIKE` against the
/// operand wrapped in wildcards.
pub(crate) fn translate_like(
    t: &mut Translator<'_>,
    expr: &Expr,
    method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let subject = t.visit_node(&args[0])?;
    let operand = t.visit_node(arg(expr, args, 1)?)?;

    let pattern = match method {
        Method::StartsWith => {
            let suffix = wildcard(t);
            concat(t, operand, suffix)
        }
        Method::EndsWith => {
            let prefix = wildcard(t);
            concat(t, prefix, operand)
        }
        Method::Contains => {
            let suffix = wildcard(t);
            let tail = concat(t, operand, suffix);
            let prefix = wildcard(t);
            concat(t, prefix, tail)
        }
        other => {
            return Err(TranslateError::unsupported(
                expr,
                &format!("'{other}' is not a pattern operator"),
            ));
        }
    };

    Ok(Sql::Node(t.tree_mut().add(Node::Binary {
        op: BinaryOp::Like,
        left: subject,
        right: pattern,
    })))
}

/// Conjoins a predicate into WHERE, or into HAVING once the request is
/// grouped.
pub(crate) fn apply_filter(t: &mut Translator<'_>, request: RequestId, predicate: NodeId) {
    if t.tree().request(request).is_grouped() {
        t.tree_mut().and_having(request, predicate);
    } else {
        t.tree_mut().and_where(request, predicate);
    }
}

pub(crate) fn translate_predicate(
    t: &mut Translator<'_>,
    expr: &Expr,
    request: RequestId,
    lambda: &Expr,
) -> Result<NodeId, TranslateError> {
    let body = t.bind_lambda(expr, request, lambda)?;
    let predicate = t.visit_node(body)?;
    Ok(t.coerce_predicate(predicate))
}

fn row_count(expr: &Expr, count: &Expr) -> Result<u64, TranslateError> {
    match count {
        Expr::Constant(Literal::Value(Value::Int(n))) => u64::try_from(*n)
            .map_err(|_| TranslateError::invalid(expr, "Row count must not be negative")),
        _ => Err(TranslateError::invalid(expr, "Row count must be an integer constant")),
    }
}

fn wildcard(t: &mut Translator<'_>) -> NodeId {
    t.tree_mut().add(Node::Constant(Value::String(WILDCARD.into())))
}

fn concat(t: &mut Translator<'_>, left: NodeId, right: NodeId) -> NodeId {
    t.tree_mut().add(Node::Binary {
        op: BinaryOp::Concat,
        left,
        right,
    })
}
