//! MySQL `CREATE DATABASE` / `CREATE TABLE` rendering.
//!
//! Input is assumed to be validated; fields with an unrecognized type are
//! rendered with their raw alias.

use crate::schema::{Field, ForeignKeyRef, Schema, Table};
use unicode_width::UnicodeWidthStr;

/// Render the database and every table named in `order`, in that order.
pub fn render<S: AsRef<str>>(schema: &Schema, order: &[S], database: &str) -> String {
    let mut output = format!("CREATE DATABASE IF NOT EXISTS {};\n\n", database);

    for name in order {
        if let Some(table) = schema.table(name.as_ref()) {
            output.push_str(&render_table(table, database));
        }
    }

    output
}

pub fn render_table(table: &Table, database: &str) -> String {
    let name_width = table
        .fields
        .iter()
        .map(|f| f.name().width())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<String> = table
        .fields
        .iter()
        .map(|f| column_definition(f, name_width))
        .collect();

    if let Some(pk) = table.primary_key() {
        lines.push(format!("PRIMARY KEY ({})", pk.name()));
    }

    for (field, reference) in table.foreign_keys() {
        if let Ok(fk) = ForeignKeyRef::parse(reference) {
            lines.push(format!(
                "FOREIGN KEY ({}) REFERENCES {}({})",
                field, fk.table, fk.field
            ));
        }
    }

    let mut output = format!(
        "CREATE TABLE IF NOT EXISTS `{}`.`{}`(\n",
        database, table.name
    );
    for (i, line) in lines.iter().enumerate() {
        output.push_str("    ");
        output.push_str(line);
        if i + 1 < lines.len() {
            output.push(',');
        }
        output.push('\n');
    }
    output.push_str(");\n\n");
    output
}

/// `name TYPE [UNIQUE] [AUTO_INCREMENT] [NOT NULL]`, with the name padded to
/// `name_width` display columns.
pub fn column_definition(field: &Field, name_width: usize) -> String {
    let name = field.name();
    let mut def = String::from(name);
    def.push_str(&" ".repeat(name_width.saturating_sub(name.width()) + 1));

    match field.field_type() {
        Some(typ) => def.push_str(typ.keyword()),
        None => def.push_str(field.type_alias.as_deref().unwrap_or("")),
    }
    if field.unique {
        def.push_str(" UNIQUE");
    }
    if field.auto_increment {
        def.push_str(" AUTO_INCREMENT");
    }
    if field.not_null {
        def.push_str(" NOT NULL");
    }

    def
}
