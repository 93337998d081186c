//! `Select`, `SelectMany` and `GroupBy`.

use crate::query::{
    dml::{RequestId, SelectInfo},
    translate::{Sql, TranslateError, Translator, arg, member_path},
};
use model::core::types::{PropertyRef, TypeRef};
use query_syntax::{Binding, Expr, Method};
use tracing::trace;

pub(crate) fn translate_select(
    t: &mut Translator<'_>,
    expr: &Expr,
    method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let request = t.receiver_request(expr, &args[0])?;
    t.set_active(request);
    let body = t.bind_lambda(expr, request, arg(expr, args, 1)?)?;

    let projection = match body {
        Expr::New { ty, members } => {
            t.tree_mut().clear_select(request);
            t.with_in_or(true, |t| {
                for (index, (member, value)) in members.iter().enumerate() {
                    project_member(t, request, member, value, index == 0)?;
                }
                Ok(())
            })?;
            TypeRef::object(ty)
        }
        Expr::MemberInit { ty, bindings } => {
            t.tree_mut().clear_select(request);
            t.with_in_or(true, |t| {
                for (index, binding) in bindings.iter().enumerate() {
                    let Binding::Assign { member, value } = binding else {
                        return Err(TranslateError::unsupported(
                            expr,
                            "Collection initializers are not supported in projections",
                        ));
                    };
                    project_member(t, request, member, value, index == 0)?;
                }
                Ok(())
            })?;
            TypeRef::object(ty)
        }
        Expr::Member { .. } | Expr::Parameter(_) | Expr::Key(_) => {
            project_single(t, expr, method, request, body)?
        }
        _ => {
            return Err(TranslateError::unsupported(expr, "No supported select"));
        }
    };

    t.tree_mut().request_mut(request).projection = Some(projection);
    Ok(Sql::Request(request))
}

/// A bare member becomes the only select item. Collection members must be
/// flattened with `SelectMany`.
fn project_single(
    t: &mut Translator<'_>,
    expr: &Expr,
    method: &Method,
    request: RequestId,
    body: &Expr,
) -> Result<TypeRef, TranslateError> {
    let ty = body.ty();
    let flatten = ty.is_collection();
    if flatten && *method != Method::SelectMany {
        return Err(TranslateError::violation(
            expr,
            "A collection member can only be projected with SelectMany",
        ));
    }

    let sql = t.with_in_or(!flatten, |t| t.visit(body))?;
    t.set_active(request);
    let node = t.node_of(sql);
    t.tree_mut().clear_select(request);
    t.tree_mut().push_select(request, SelectInfo::new(node));

    Ok(match ty.element() {
        Some(element) if flatten => element.clone(),
        _ => ty,
    })
}

fn project_member(
    t: &mut Translator<'_>,
    request: RequestId,
    member: &PropertyRef,
    value: &Expr,
    new_element: bool,
) -> Result<(), TranslateError> {
    match value {
        Expr::Member { .. } | Expr::Parameter(_) => {
            if value.ty().is_collection() {
                return Err(TranslateError::violation(
                    value,
                    "A collection member can only be projected with SelectMany",
                ));
            }
            let path = member_path(value);
            let node = t.visit_node(value)?;
            match path {
                Some(path) => t.add_equivalent(member, path),
                // `x.Items.First().Quantity` and the like
                None => t.add_projected(member, node),
            }
            t.tree_mut().push_select(
                request,
                SelectInfo::member(node, Some(member.clone()), new_element),
            );
        }
        Expr::Key(grouping) => project_key(t, request, member, value, grouping, new_element)?,
        // a nested object starts a new destination object
        Expr::New { members, .. } => {
            for (index, (inner, inner_value)) in members.iter().enumerate() {
                project_member(t, request, inner, inner_value, index == 0)?;
            }
        }
        Expr::Constant(_)
        | Expr::Call { .. }
        | Expr::Binary { .. }
        | Expr::Unary { .. }
        | Expr::Conditional { .. }
        | Expr::Source(_) => {
            let node = t.visit_node(value)?;
            t.add_projected(member, node);
            t.tree_mut().push_select(
                request,
                SelectInfo::member(node, Some(member.clone()), new_element),
            );
            let mapping = t.mapping();
            mapping.register_sql_equivalent(t.tree(), member, node);
        }
        Expr::Lambda(_) | Expr::MemberInit { .. } => {
            return Err(TranslateError::unsupported(
                value,
                &format!("Unsupported value for member '{}'", member.name),
            ));
        }
    }
    Ok(())
}

/// `g.Key` as a projected member. A composite key is spread over one
/// select item per GROUP BY entry, starting a nested object.
fn project_key(
    t: &mut Translator<'_>,
    request: RequestId,
    member: &PropertyRef,
    value: &Expr,
    grouping: &Expr,
    new_element: bool,
) -> Result<(), TranslateError> {
    let keys = t.grouping_keys(value, grouping)?;
    if let [(_, None)] = keys.as_slice() {
        let node = t.visit_node(value)?;
        t.add_projected(member, node);
        t.tree_mut().push_select(
            request,
            SelectInfo::member(node, Some(member.clone()), new_element),
        );
        return Ok(());
    }

    trace!("Spreading the key into {} over {} columns", member, keys.len());
    for (index, (key, key_member)) in keys.into_iter().enumerate() {
        let node = t.tree_mut().duplicate(key);
        t.tree_mut()
            .push_select(request, SelectInfo::member(node, key_member, index == 0));
    }
    Ok(())
}

pub(crate) fn translate_group_by(
    t: &mut Translator<'_>,
    expr: &Expr,
    _method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let request = t.receiver_request(expr, &args[0])?;
    t.set_active(request);
    let body = t.bind_lambda(expr, request, arg(expr, args, 1)?)?;

    match body {
        Expr::New { members, .. } => {
            for (member, value) in members {
                if let Some(path) = member_path(value) {
                    t.add_equivalent(member, path);
                }
                let key = t.visit_node(value)?;
                t.tree_mut().push_group_by(request, key, Some(member.clone()));
            }
        }
        Expr::Member { .. } | Expr::Parameter(_) => {
            let key = t.visit_node(body)?;
            t.tree_mut().push_group_by(request, key, None);
        }
        _ => {
            return Err(TranslateError::unsupported(
                expr,
                "Grouping keys must be members or anonymous objects of members",
            ));
        }
    }

    let r = t.tree_mut().request_mut(request);
    r.projection = Some(expr.element_type());
    Ok(Sql::Request(request))
}
