use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator identity of a [`Call`](super::Expr::Call).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Where,
    First,
    Skip,
    Take,
    Distinct,
    Select,
    SelectMany,
    GroupBy,
    OrderBy,
    OrderByDescending,
    ThenBy,
    ThenByDescending,
    Count,
    Sum,
    Average,
    Min,
    Max,
    Any,
    /// Set membership on a collection, substring match on a string.
    Contains,
    StartsWith,
    EndsWith,
    Insert,
    Update,
    Delete,
    EagerLoad,
    LazyLoad,
    BatchLazyLoad,
    DontLoad,
    UseLeftJoin,
    /// Any other method. Never translatable.
    Named(String),
}

impl Method {
    pub fn name(&self) -> &str {
        match self {
            Method::Where => "Where",
            Method::First => "First",
            Method::Skip => "Skip",
            Method::Take => "Take",
            Method::Distinct => "Distinct",
            Method::Select => "Select",
            Method::SelectMany => "SelectMany",
            Method::GroupBy => "GroupBy",
            Method::OrderBy => "OrderBy",
            Method::OrderByDescending => "OrderByDescending",
            Method::ThenBy => "ThenBy",
            Method::ThenByDescending => "ThenByDescending",
            Method::Count => "Count",
            Method::Sum => "Sum",
            Method::Average => "Average",
            Method::Min => "Min",
            Method::Max => "Max",
            Method::Any => "Any",
            Method::Contains => "Contains",
            Method::StartsWith => "StartsWith",
            Method::EndsWith => "EndsWith",
            Method::Insert => "Insert",
            Method::Update => "Update",
            Method::Delete => "Delete",
            Method::EagerLoad => "EagerLoad",
            Method::LazyLoad => "LazyLoad",
            Method::BatchLazyLoad => "BatchLazyLoad",
            Method::DontLoad => "DontLoad",
            Method::UseLeftJoin => "UseLeftJoin",
            Method::Named(name) => name,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Method::Count | Method::Sum | Method::Average | Method::Min | Method::Max
        )
    }

    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Method::OrderBy | Method::OrderByDescending | Method::ThenBy | Method::ThenByDescending
        )
    }

    pub fn is_loading_hint(&self) -> bool {
        matches!(
            self,
            Method::EagerLoad | Method::LazyLoad | Method::BatchLazyLoad | Method::DontLoad
        )
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
