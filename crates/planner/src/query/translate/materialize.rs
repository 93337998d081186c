//! Declares the columns the materializer reads back.
//!
//! Whole rows in the root select list are expanded into the mapped columns
//! of their entity. Custom property mappers contribute their own columns
//! for the properties they accept.

use crate::query::{
    dml::{AliasId, Node, RequestId, RequestKind, SelectInfo},
    translate::{TranslateError, Translator},
};
use std::collections::HashSet;
use tracing::trace;

pub(crate) fn declare_map(t: &mut Translator<'_>, root: RequestId) -> Result<(), TranslateError> {
    let request = t.tree().request(root);
    if request.kind != RequestKind::Select {
        return Ok(());
    }

    if request.select.is_empty() {
        if request.is_grouped() {
            let keys = request
                .group_by
                .iter()
                .copied()
                .zip(request.group_members.iter().cloned())
                .collect::<Vec<_>>();
            for (index, (key, member)) in keys.into_iter().enumerate() {
                let key = t.tree_mut().duplicate(key);
                t.tree_mut()
                    .push_select(root, SelectInfo::member(key, member, index == 0));
            }
            return Ok(());
        }
        if let Some(from) = request.from {
            declare_row(t, root, from)?;
        }
        return Ok(());
    }

    let select = std::mem::take(&mut t.tree_mut().request_mut(root).select);
    for info in select {
        match t.tree().node(info.node) {
            Node::AliasRef(alias)
                if info.label.is_none() && t.tree().alias(*alias).entity.is_some() =>
            {
                let alias = *alias;
                declare_row(t, root, alias)?;
            }
            _ => t.tree_mut().push_select(root, info),
        }
    }
    Ok(())
}

/// Selects every mapped column of the row behind `alias`; the first one
/// starts a new object.
fn declare_row(t: &mut Translator<'_>, request: RequestId, alias: AliasId) -> Result<(), TranslateError> {
    let Some(entity) = t.tree().alias(alias).entity.clone() else {
        return Ok(());
    };
    let mapping = t.mapping();
    let simple = mapping
        .mapped_simple_properties(&entity)?
        .into_iter()
        .collect::<HashSet<_>>();

    let mut new_element = true;
    for property in mapping.mapped_properties(&entity)? {
        if let Some(mapper) = mapping
            .custom_property_mappers()
            .iter()
            .find(|mapper| mapper.accepts(&property))
        {
            mapper.declare_map(t.tree_mut(), request, &property, alias, new_element)?;
            new_element = false;
            continue;
        }
        if !simple.contains(&property) {
            continue;
        }

        let column = mapping.column_name(&property)?;
        let node = t.tree_mut().add(Node::column(alias, &column));
        t.tree_mut().push_select(
            request,
            SelectInfo::member(node, Some(property), new_element),
        );
        new_element = false;
    }

    trace!("Declared the columns of {entity}");
    Ok(())
}
