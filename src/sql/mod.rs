//! SQL DDL generation.

mod ddl;

pub use ddl::{column_definition, render, render_table};
