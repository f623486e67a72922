//! Build a schema from workbook sheets.

use crate::alias::Attribute;
use crate::schema::{Field, Schema, Table};
use crate::validate::ErrorKind;
use crate::workbook::{Cell, Sheet, Workbook};
use tracing::{debug, info};

/// Text that cell A1 must hold for a sheet to describe a table.
pub const TABLE_MARKER: &str = "field name";

/// Header cells that did not resolve to an attribute, for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct IgnoredColumns {
    pub table: String,
    pub columns: Vec<String>,
}

impl IgnoredColumns {
    /// Ignored columns are reported, never treated as errors.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::UnknownColumnAttribute
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loaded {
    pub schema: Schema,
    pub ignored: Vec<IgnoredColumns>,
}

pub fn load(workbook: &Workbook) -> Loaded {
    let mut loaded = Loaded::default();

    for sheet in &workbook.sheets {
        if !is_table_sheet(sheet) {
            debug!(sheet = %sheet.name, "skipping sheet without a field name header");
            continue;
        }

        let (table, ignored) = load_sheet(sheet);
        info!(table = %table.name, fields = table.fields.len(), "loaded table");
        if !ignored.is_empty() {
            loaded.ignored.retain(|i| i.table != table.name);
            loaded.ignored.push(IgnoredColumns {
                table: table.name.clone(),
                columns: ignored,
            });
        }
        loaded.schema.add_table(table);
    }

    loaded
}

fn is_table_sheet(sheet: &Sheet) -> bool {
    matches!(sheet.cell(0, 0), Cell::Text(s) if s == TABLE_MARKER)
}

fn load_sheet(sheet: &Sheet) -> (Table, Vec<String>) {
    // Columns can appear in any order and any subset per sheet.
    let mut columns: Vec<(Attribute, usize)> = Vec::new();
    let mut ignored = Vec::new();

    for (col, header) in sheet.row(0).iter().enumerate() {
        let Some(text) = header.as_text() else {
            continue;
        };
        match Attribute::from_alias(&text) {
            Some(attribute) => {
                columns.retain(|(a, _)| *a != attribute);
                columns.push((attribute, col));
            }
            None => ignored.push(text),
        }
    }

    let mut table = Table::new(&sheet.name);
    for row in 1..sheet.row_count() {
        if sheet.row(row).iter().all(Cell::is_blank) {
            break;
        }

        let mut field = Field::default();
        for &(attribute, col) in &columns {
            field.set(attribute, sheet.cell(row, col));
        }
        table.add_field(field);
    }

    (table, ignored)
}
