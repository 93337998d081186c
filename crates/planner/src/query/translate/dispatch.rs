use crate::query::translate::{
    Sql, TranslateError, Translator, aggregate, crud, filter, loading, projection,
};
use lazy_static::lazy_static;
use query_syntax::{Expr, Method};
use std::collections::HashMap;
use tracing::trace;

/// Translates one operator call. `args[0]` is always the receiver.
pub type Handler =
    fn(&mut Translator<'_>, &Expr, &Method, &[Expr]) -> Result<Sql, TranslateError>;

lazy_static! {
    static ref HANDLERS: HashMap<Method, Handler> = build_handler_table();
}

fn build_handler_table() -> HashMap<Method, Handler> {
    let mut table: HashMap<Method, Handler> = HashMap::new();

    table.insert(Method::Where, filter::translate_where);
    table.insert(Method::First, filter::translate_first);
    table.insert(Method::Skip, filter::translate_skip);
    table.insert(Method::Take, filter::translate_take);
    table.insert(Method::Distinct, filter::translate_distinct);
    table.insert(Method::OrderBy, filter::translate_order);
    table.insert(Method::OrderByDescending, filter::translate_order);
    table.insert(Method::ThenBy, filter::translate_order);
    table.insert(Method::ThenByDescending, filter::translate_order);
    table.insert(Method::Contains, filter::translate_contains);
    table.insert(Method::StartsWith, filter::translate_like);
    table.insert(Method::EndsWith, filter::translate_like);

    table.insert(Method::Select, projection::translate_select);
    table.insert(Method::SelectMany, projection::translate_select);
    table.insert(Method::GroupBy, projection::translate_group_by);

    table.insert(Method::Count, aggregate::translate_aggregate);
    table.insert(Method::Sum, aggregate::translate_aggregate);
    table.insert(Method::Average, aggregate::translate_aggregate);
    table.insert(Method::Min, aggregate::translate_aggregate);
    table.insert(Method::Max, aggregate::translate_aggregate);
    table.insert(Method::Any, aggregate::translate_any);

    table.insert(Method::Insert, crud::translate_write);
    table.insert(Method::Update, crud::translate_write);
    table.insert(Method::Delete, crud::translate_delete);

    table.insert(Method::EagerLoad, loading::translate_hint);
    table.insert(Method::LazyLoad, loading::translate_hint);
    table.insert(Method::BatchLazyLoad, loading::translate_hint);
    table.insert(Method::DontLoad, loading::translate_hint);
    table.insert(Method::UseLeftJoin, loading::translate_use_left_join);

    table
}

pub(crate) fn dispatch(
    translator: &mut Translator<'_>,
    expr: &Expr,
    method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let handler = HANDLERS.get(method).ok_or_else(|| {
        TranslateError::unsupported(expr, &format!("The method '{method}' is not supported"))
    })?;
    if args.is_empty() {
        return Err(TranslateError::invalid(expr, "Operator call without a receiver"));
    }

    trace!("Translating {method}");
    handler(translator, expr, method, args)
}
