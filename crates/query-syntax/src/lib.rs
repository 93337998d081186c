//! The typed query language: an enum-tagged expression tree describing a
//! chain of query operators over mapped types, plus a fluent builder.

pub mod ast;
pub mod builder;
pub mod error;

pub use ast::{BinaryOp, Binding, Expr, Lambda, Literal, Method, Param, ParamId, UnaryOp};
