//! Translator tests
//!
//! These tests build typed queries with the query-syntax builder and check
//! the shape of the request tree the translator produces.

#[path = "../helpers/mod.rs"]
mod helpers;

mod errors;
mod grouping;
mod properties;
mod statements;
