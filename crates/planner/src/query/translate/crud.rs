//! Statement intent: `Update`, `Insert` (as INSERT … SELECT) and `Delete`.

use crate::query::{
    dml::{AliasDefinition, Node, RequestKind, UpdateOrInsertInfo},
    translate::{Sql, TranslateError, Translator, arg},
};
use model::mapping::entity::PropertyKind;
use query_syntax::{Binding, Expr, Method};

pub(crate) fn translate_write(
    t: &mut Translator<'_>,
    expr: &Expr,
    method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let request = t.receiver_request(expr, &args[0])?;
    t.set_active(request);
    let body = t.bind_lambda(expr, request, arg(expr, args, 1)?)?;

    let Expr::MemberInit { ty, bindings } = body else {
        return Err(TranslateError::invalid(
            expr,
            &format!("{method} requires an object initializer"),
        ));
    };

    let mapping = t.mapping();
    let (kind, target) = if *method == Method::Update {
        let from = t
            .tree()
            .request(request)
            .from
            .ok_or_else(|| TranslateError::unsupported(expr, "Update without a source"))?;
        (RequestKind::Update, from)
    } else {
        let table = mapping.sql_equivalent_for_type(ty)?;
        let id_column = mapping
            .id_property(ty)
            .and_then(|id| mapping.column_name(&id))
            .ok();
        let alias = t
            .tree_mut()
            .add_alias(AliasDefinition::table(&table, ty, id_column));
        (RequestKind::InsertSelect, alias)
    };

    for binding in bindings {
        let Binding::Assign { member, value } = binding else {
            return Err(TranslateError::unsupported(
                expr,
                &format!("Collection initializer for '{}'", binding.member().name),
            ));
        };

        let property = mapping.property_mapping(member)?;
        if matches!(
            property.kind,
            PropertyKind::Collection { .. } | PropertyKind::ManyToMany { .. }
        ) {
            return Err(TranslateError::violation(
                expr,
                &format!("'{}' is a collection and cannot be assigned", member.name),
            ));
        }

        let column = mapping.column_name(member)?;
        let column = t.tree_mut().add(Node::column(target, &column));
        let value = t.visit_node(value)?;
        t.tree_mut()
            .push_assignment(request, UpdateOrInsertInfo { column, value });
    }

    let r = t.tree_mut().request_mut(request);
    r.kind = kind;
    r.target = Some(target);
    r.projection = Some(expr.ty());
    Ok(Sql::Request(request))
}

pub(crate) fn translate_delete(
    t: &mut Translator<'_>,
    expr: &Expr,
    _method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let request = t.receiver_request(expr, &args[0])?;
    t.set_active(request);

    let r = t.tree_mut().request_mut(request);
    r.kind = RequestKind::Delete;
    r.target = r.from;
    r.projection = Some(expr.ty());
    Ok(Sql::Request(request))
}
