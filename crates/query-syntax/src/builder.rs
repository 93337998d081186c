//! Fluent construction of typed queries.
//!
//! ```
//! use model::core::{data_type::DataType, types::{PropertyRef, TypeRef}};
//! use query_syntax::builder::{constant, source};
//!
//! let total = PropertyRef::new("Order", "Total", TypeRef::scalar(DataType::Double));
//! let query = source("Order")
//!     .filter("x", |x| x.member(&total).gt(constant(10)))
//!     .take(5);
//! assert_eq!(query.to_string(), "Query<Order>.Where(x => (x.Total > 10)).Take(5)");
//! ```

use crate::{
    ast::{BinaryOp, Binding, Expr, Lambda, Literal, Method, Param, ParamId, UnaryOp},
    error::SyntaxError,
};
use model::{
    core::{
        types::{PropertyRef, TypeRef},
        value::Value,
    },
    mapping::MappingCatalog,
};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(1);

impl Param {
    /// Creates a parameter with a process-unique identity.
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Self {
            id: ParamId(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.to_string(),
            ty,
        }
    }
}

pub fn source(entity: &str) -> Expr {
    Expr::Source(entity.to_string())
}

pub fn constant(value: impl Into<Value>) -> Expr {
    Expr::Constant(Literal::Value(value.into()))
}

pub fn null() -> Expr {
    Expr::Constant(Literal::Value(Value::Null))
}

pub fn list<I, V>(values: I) -> Expr
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Expr::Constant(Literal::List(values.into_iter().map(Into::into).collect()))
}

pub fn entity_instance<I, V>(entity: &str, fields: I) -> Expr
where
    I: IntoIterator<Item = (&'static str, V)>,
    V: Into<Value>,
{
    Expr::Constant(Literal::Entity {
        entity: entity.to_string(),
        fields: fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.into()))
            .collect(),
    })
}

/// Builds a unary lambda whose parameter has type `ty`.
pub fn lambda(name: &str, ty: TypeRef, body: impl FnOnce(Expr) -> Expr) -> Expr {
    let param = Param::new(name, ty);
    let body = body(Expr::Parameter(param.clone()));
    Expr::Lambda(Lambda {
        params: vec![param],
        body: Box::new(body),
    })
}

pub fn new_object(ty: &str, members: Vec<(PropertyRef, Expr)>) -> Expr {
    Expr::New {
        ty: ty.to_string(),
        members,
    }
}

pub fn member_init(ty: &str, assignments: Vec<(PropertyRef, Expr)>) -> Expr {
    Expr::MemberInit {
        ty: ty.to_string(),
        bindings: assignments
            .into_iter()
            .map(|(member, value)| Binding::Assign { member, value })
            .collect(),
    }
}

pub fn conditional(test: Expr, if_true: Expr, if_false: Expr) -> Expr {
    Expr::Conditional {
        test: Box::new(test),
        if_true: Box::new(if_true),
        if_false: Box::new(if_false),
    }
}

pub fn call(method: Method, args: Vec<Expr>) -> Expr {
    Expr::Call { method, args }
}

/// `Insert(query, x => new T { .. })`: copies rows of the query.
pub fn insert(query: Expr, name: &str, values: impl FnOnce(Expr) -> Expr) -> Expr {
    let selector = lambda(name, query.element_type(), values);
    call(Method::Insert, vec![query, selector])
}

/// `Update(query, x => new T { .. })`
pub fn update(query: Expr, name: &str, values: impl FnOnce(Expr) -> Expr) -> Expr {
    let selector = lambda(name, query.element_type(), values);
    call(Method::Update, vec![query, selector])
}

pub fn delete(query: Expr) -> Expr {
    call(Method::Delete, vec![query])
}

/// Forces left joins for every navigation inside `expr`.
pub fn use_left_join(expr: Expr) -> Expr {
    call(Method::UseLeftJoin, vec![expr])
}

macro_rules! binary_ops {
    ($($fn_name:ident => $op:ident),* $(,)?) => {
        $(
            pub fn $fn_name(self, rhs: Expr) -> Expr {
                self.binary(BinaryOp::$op, rhs)
            }
        )*
    };
}

impl Expr {
    pub fn member(self, property: &PropertyRef) -> Expr {
        Expr::Member {
            target: Box::new(self),
            property: property.clone(),
        }
    }

    /// Follows a dotted path of mapped properties (`"Customer.Name"`).
    pub fn path(self, path: &str, catalog: &MappingCatalog) -> Result<Expr, SyntaxError> {
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(SyntaxError::MalformedPath(path.to_string()));
        }

        let mut expr = self;
        for segment in path.split('.') {
            let ty = expr.ty();
            let owner = ty.entity_name().ok_or_else(|| SyntaxError::UnknownMember {
                ty: ty.to_string(),
                member: segment.to_string(),
            })?;
            let property = catalog.property(owner, segment)?;
            expr = expr.member(&property);
        }
        Ok(expr)
    }

    pub fn key(self) -> Expr {
        Expr::Key(Box::new(self))
    }

    pub fn binary(self, op: BinaryOp, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(rhs),
        }
    }

    binary_ops! {
        and => And,
        or => Or,
        eq => Equal,
        ne => NotEqual,
        lt => LessThan,
        le => LessOrEqual,
        gt => GreaterThan,
        ge => GreaterOrEqual,
        coalesce => Coalesce,
        add => Add,
        sub => Subtract,
        mul => Multiply,
        div => Divide,
    }

    pub fn unary(self, op: UnaryOp) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(self),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Expr {
        self.unary(UnaryOp::Not)
    }

    fn apply(self, method: Method, args: Vec<Expr>) -> Expr {
        let mut all = Vec::with_capacity(args.len() + 1);
        all.push(self);
        all.extend(args);
        call(method, all)
    }

    fn apply_lambda(self, method: Method, name: &str, body: impl FnOnce(Expr) -> Expr) -> Expr {
        let selector = lambda(name, self.element_type(), body);
        self.apply(method, vec![selector])
    }

    pub fn filter(self, name: &str, predicate: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::Where, name, predicate)
    }

    pub fn select(self, name: &str, selector: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::Select, name, selector)
    }

    pub fn select_many(self, name: &str, selector: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::SelectMany, name, selector)
    }

    pub fn group_by(self, name: &str, key: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::GroupBy, name, key)
    }

    pub fn order_by(self, name: &str, key: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::OrderBy, name, key)
    }

    pub fn order_by_desc(self, name: &str, key: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::OrderByDescending, name, key)
    }

    pub fn then_by(self, name: &str, key: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::ThenBy, name, key)
    }

    pub fn then_by_desc(self, name: &str, key: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::ThenByDescending, name, key)
    }

    pub fn skip(self, count: i64) -> Expr {
        self.apply(Method::Skip, vec![constant(count)])
    }

    pub fn take(self, count: i64) -> Expr {
        self.apply(Method::Take, vec![constant(count)])
    }

    pub fn distinct(self) -> Expr {
        self.apply(Method::Distinct, vec![])
    }

    pub fn first(self) -> Expr {
        self.apply(Method::First, vec![])
    }

    pub fn first_where(self, name: &str, predicate: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::First, name, predicate)
    }

    pub fn count(self) -> Expr {
        self.apply(Method::Count, vec![])
    }

    pub fn count_where(self, name: &str, predicate: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::Count, name, predicate)
    }

    pub fn any(self) -> Expr {
        self.apply(Method::Any, vec![])
    }

    pub fn any_where(self, name: &str, predicate: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::Any, name, predicate)
    }

    pub fn sum(self, name: &str, selector: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::Sum, name, selector)
    }

    pub fn average(self, name: &str, selector: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::Average, name, selector)
    }

    pub fn min(self, name: &str, selector: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::Min, name, selector)
    }

    pub fn max(self, name: &str, selector: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::Max, name, selector)
    }

    /// An aggregate over already projected scalars (`.Select(..).Sum()`).
    pub fn aggregate(self, method: Method) -> Expr {
        self.apply(method, vec![])
    }

    /// Set membership when `self` is a collection, substring match when it
    /// is a string.
    pub fn contains(self, item: Expr) -> Expr {
        self.apply(Method::Contains, vec![item])
    }

    pub fn starts_with(self, prefix: Expr) -> Expr {
        self.apply(Method::StartsWith, vec![prefix])
    }

    pub fn ends_with(self, suffix: Expr) -> Expr {
        self.apply(Method::EndsWith, vec![suffix])
    }

    pub fn eager_load(self, name: &str, path: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::EagerLoad, name, path)
    }

    pub fn lazy_load(self, name: &str, path: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::LazyLoad, name, path)
    }

    pub fn batch_lazy_load(self, name: &str, path: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::BatchLazyLoad, name, path)
    }

    pub fn dont_load(self, name: &str, path: impl FnOnce(Expr) -> Expr) -> Expr {
        self.apply_lambda(Method::DontLoad, name, path)
    }

    /// Calls a method outside the supported operator surface.
    pub fn call_named(self, name: &str, args: Vec<Expr>) -> Expr {
        self.apply(Method::Named(name.to_string()), args)
    }
}
