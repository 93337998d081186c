//! The relational side of the compiler: the request tree the translator
//! builds, the dialect renderers that turn it into SQL, and schema
//! generation for mapped types.

pub mod ast;
pub mod builder;
pub mod ddl;
pub mod dialect;
pub mod dml;
pub mod macros;
pub mod mapping;
pub mod renderer;
pub mod translate;

pub use ddl::{DdlError, DdlScript, DdlStatement, DdlTranslator};
pub use renderer::{RenderedSql, SqlRenderer};
pub use translate::{Statement, TranslateError, Translator, translate};
