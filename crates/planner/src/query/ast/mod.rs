pub mod alter_table;
pub mod common;
pub mod create_table;
