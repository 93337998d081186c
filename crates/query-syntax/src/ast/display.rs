//! Human-readable form of an expression, used in diagnostics.

use crate::ast::{Binding, Expr, Lambda, Literal, UnaryOp};
use std::fmt;

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Source(entity) => write!(f, "Query<{entity}>"),
            Expr::Constant(literal) => write!(f, "{literal}"),
            Expr::Parameter(param) => write!(f, "{}", param.name),
            Expr::Member { target, property } => write!(f, "{target}.{}", property.name),
            Expr::Key(target) => write!(f, "{target}.Key"),
            Expr::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Convert => write!(f, "Convert({operand})"),
                _ => write!(f, "{op}{operand}"),
            },
            Expr::Conditional {
                test,
                if_true,
                if_false,
            } => write!(f, "({test} ? {if_true} : {if_false})"),
            Expr::Call { method, args } => match args.split_first() {
                Some((receiver, rest)) => {
                    write!(f, "{receiver}.{method}(")?;
                    write_list(f, rest)?;
                    write!(f, ")")
                }
                None => write!(f, "{method}()"),
            },
            Expr::Lambda(lambda) => write!(f, "{lambda}"),
            Expr::New { members, .. } => {
                write!(f, "new {{ ")?;
                for (i, (member, value)) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {value}", member.name)?;
                }
                write!(f, " }}")
            }
            Expr::MemberInit { ty, bindings } => {
                write!(f, "new {ty} {{ ")?;
                for (i, binding) in bindings.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match binding {
                        Binding::Assign { member, value } => write!(f, "{} = {value}", member.name)?,
                        Binding::List { member, items } => {
                            write!(f, "{} = {{ ", member.name)?;
                            write_list(f, items)?;
                            write!(f, " }}")?;
                        }
                    }
                }
                write!(f, " }}")
            }
        }
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.params.as_slice() {
            [param] => write!(f, "{} => {}", param.name, self.body),
            params => {
                write!(f, "(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param.name)?;
                }
                write!(f, ") => {}", self.body)
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Value(value) => write!(f, "{value}"),
            Literal::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Literal::Entity { entity, .. } => write!(f, "{entity} instance"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
