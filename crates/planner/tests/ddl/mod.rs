#[path = "../helpers/mod.rs"]
mod helpers;

mod columns;
mod plan;
