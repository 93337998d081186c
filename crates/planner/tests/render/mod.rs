//! Renderer tests
//!
//! Typed queries are translated and rendered per dialect; the SQL text,
//! the parameter list and the column layout are compared verbatim.

#[path = "../helpers/mod.rs"]
mod helpers;

mod dialects;
mod select;
mod statements;
