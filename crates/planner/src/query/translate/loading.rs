//! Loading hints. They do not change the SQL; they are collected for the
//! materializer.

use crate::query::translate::{Sql, TranslateError, Translator, arg};
use model::core::types::PropertyRef;
use query_syntax::{Expr, Method};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadingKind {
    Eager,
    Lazy,
    BatchLazy,
    /// The member is never loaded.
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingHint {
    pub kind: LoadingKind,
    /// Members from the root element down to the hinted member.
    pub path: Vec<PropertyRef>,
}

impl fmt::Display for LoadingHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .path
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{:?}({path})", self.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadingPlan {
    pub hints: Vec<LoadingHint>,
}

impl LoadingPlan {
    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    pub fn of_kind(&self, kind: LoadingKind) -> impl Iterator<Item = &LoadingHint> {
        self.hints.iter().filter(move |hint| hint.kind == kind)
    }

    /// Whether the member at `path` was excluded from loading.
    pub fn excludes(&self, path: &[PropertyRef]) -> bool {
        self.of_kind(LoadingKind::Exclude)
            .any(|hint| hint.path.as_slice() == path)
    }
}

pub(crate) fn translate_hint(
    t: &mut Translator<'_>,
    expr: &Expr,
    method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let kind = match method {
        Method::EagerLoad => LoadingKind::Eager,
        Method::LazyLoad => LoadingKind::Lazy,
        Method::BatchLazyLoad => LoadingKind::BatchLazy,
        _ => LoadingKind::Exclude,
    };

    let lambda = arg(expr, args, 1)?
        .as_lambda()
        .ok_or_else(|| TranslateError::invalid(expr, "Expected a lambda argument"))?;
    let path = hint_path(expr, &lambda.body)?;

    let sql = t.visit(&args[0])?;
    t.loading.hints.push(LoadingHint { kind, path });
    Ok(sql)
}

/// Walks `x.A.First().B` back to the parameter.
fn hint_path(expr: &Expr, body: &Expr) -> Result<Vec<PropertyRef>, TranslateError> {
    let mut path = Vec::new();
    let mut cursor = body;
    loop {
        match cursor {
            Expr::Member { target, property } => {
                path.push(property.clone());
                cursor = target;
            }
            Expr::Call {
                method: Method::First,
                args,
            } if args.len() == 1 => cursor = &args[0],
            Expr::Parameter(_) => break,
            other => {
                return Err(TranslateError::unsupported(
                    expr,
                    &format!("'{other}' is not a member path"),
                ));
            }
        }
    }

    if path.is_empty() {
        return Err(TranslateError::invalid(expr, "Loading hint without a member"));
    }
    path.reverse();
    Ok(path)
}

/// `UseLeftJoin(x)`: every navigation inside `x` is translated as if under
/// an `OR`.
pub(crate) fn translate_use_left_join(
    t: &mut Translator<'_>,
    _expr: &Expr,
    _method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    t.with_in_or(true, |t| t.visit(&args[0]))
}
