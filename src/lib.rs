pub mod alias;
pub mod loader;
pub mod order;
pub mod schema;
pub mod sql;
pub mod validate;
pub mod workbook;

use wasm_bindgen::prelude::*;

use loader::IgnoredColumns;
use order::{OrderingIncomplete, TableOrder};
use tracing::{info, warn};
use validate::ValidationReport;
use workbook::Workbook;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render a JSON workbook to SQL DDL
#[wasm_bindgen(js_name = "sheetsToSql")]
pub fn render_workbook(workbook: &str, database: &str, strict: Option<bool>) -> Result<String, String> {
    let workbook = Workbook::from_json(workbook).map_err(|e| e.to_string())?;
    let options = Options {
        database: database.to_string(),
        strict: strict.unwrap_or(false),
    };
    convert(&workbook, &options)
        .map(|conversion| conversion.sql)
        .map_err(|e| e.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Database the tables are created in.
    pub database: String,
    /// Reject multiple primary keys per table and fail when the tables
    /// cannot be fully ordered.
    pub strict: bool,
}

impl Options {
    pub fn new(database: &str) -> Self {
        Self {
            database: database.to_string(),
            strict: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub sql: String,
    pub ignored: Vec<IgnoredColumns>,
    pub order: TableOrder,
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Validation failed:\n{0}")]
    Validation(ValidationReport),
    #[error(transparent)]
    Ordering(#[from] OrderingIncomplete),
}

/// Load, validate, order and render a workbook.
///
/// Validation errors abort before any SQL is produced. An incomplete table
/// order is only logged unless `options.strict` is set; the tables that
/// could be ordered are still rendered.
pub fn convert(workbook: &Workbook, options: &Options) -> Result<Conversion, ConvertError> {
    let loaded = loader::load(workbook);

    let report = validate::validate_with(&loaded.schema, options);
    if !report.is_empty() {
        return Err(ConvertError::Validation(report));
    }

    for ignored in &loaded.ignored {
        warn!(
            table = %ignored.table,
            columns = %ignored.columns.join(","),
            "ignored columns"
        );
    }

    let order = order::order_tables(&loaded.schema);
    if let Some(incomplete) = order.incomplete() {
        if options.strict {
            return Err(incomplete.into());
        }
        warn!("{}", incomplete);
    }

    info!(database = %options.database, tables = order.order.len(), "writing the SQL statements");
    let sql = sql::render(&loaded.schema, &order.order, &options.database);

    Ok(Conversion {
        sql,
        ignored: loaded.ignored,
        order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ErrorKind;

    const STORE: &str = r#"{
        "sheets": [
            {
                "name": "line_items",
                "rows": [
                    ["field name", "field type", "primary key", "foreign key", "notes"],
                    ["id", "int", "x", null, ""],
                    ["order_id", "int", null, "orders:id", "parent order"]
                ]
            },
            {
                "name": "orders",
                "rows": [
                    ["field name", "field type", "primary key", "foreign key"],
                    ["id", "int", 1, null],
                    ["customer_id", "int", 0, "customers:id"]
                ]
            },
            {
                "name": "README",
                "rows": [["This workbook describes the store schema"]]
            },
            {
                "name": "customers",
                "rows": [
                    ["field name", "field type", "primary key", "auto increment"],
                    ["id", "integer", true, true],
                    ["name", "text", false, null],
                    [],
                    ["ignored", "after blank row"]
                ]
            }
        ]
    }"#;

    #[test]
    fn test_convert_store() {
        let workbook = Workbook::from_json(STORE).unwrap();
        let conversion = convert(&workbook, &Options::new("store")).unwrap();

        assert_eq!(conversion.order.order, vec!["customers", "orders", "line_items"]);
        assert_eq!(conversion.ignored.len(), 1);
        assert_eq!(conversion.ignored[0].table, "line_items");
        assert_eq!(conversion.ignored[0].columns, vec!["notes"]);

        let sql = &conversion.sql;
        assert!(sql.starts_with("CREATE DATABASE IF NOT EXISTS store;\n"));
        let customers = sql.find("`store`.`customers`").unwrap();
        let orders = sql.find("`store`.`orders`").unwrap();
        let line_items = sql.find("`store`.`line_items`").unwrap();
        assert!(customers < orders && orders < line_items);
        assert!(sql.contains("id   INT AUTO_INCREMENT,\n"));
        assert!(sql.contains("FOREIGN KEY (order_id) REFERENCES orders(id)"));
        assert!(!sql.contains("README"));
        assert!(!sql.contains("after blank row"));
    }

    #[test]
    fn test_convert_is_deterministic() {
        let workbook = Workbook::from_json(STORE).unwrap();
        let options = Options::new("store");

        let first = convert(&workbook, &options).unwrap();
        let second = convert(&workbook, &options).unwrap();
        assert_eq!(first.sql, second.sql);
    }

    #[test]
    fn test_validation_failure_produces_no_sql() {
        let workbook = Workbook::from_json(
            r#"{"sheets": [{"name": "t", "rows": [["field name", "field type"], ["a", "blob"]]}]}"#,
        )
        .unwrap();

        match convert(&workbook, &Options::new("db")) {
            Err(ConvertError::Validation(report)) => {
                let kinds: Vec<_> = report.get("t").unwrap().iter().map(|e| e.kind()).collect();
                assert_eq!(kinds, vec![ErrorKind::UnrecognizedType]);
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    fn cyclic_workbook() -> Workbook {
        Workbook::from_json(
            r#"{"sheets": [
                {"name": "a", "rows": [["field name", "field type", "foreign key"], ["id", "int", null], ["b_id", "int", "b:id"]]},
                {"name": "b", "rows": [["field name", "field type", "foreign key"], ["id", "int", null], ["a_id", "int", "a:id"]]},
                {"name": "c", "rows": [["field name", "field type"], ["id", "int"]]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_cycle_emits_partial_order() {
        let conversion = convert(&cyclic_workbook(), &Options::new("db")).unwrap();

        assert_eq!(conversion.order.order, vec!["c"]);
        assert_eq!(conversion.order.unplaced, vec!["a", "b"]);
        assert!(conversion.sql.contains("`db`.`c`"));
        assert!(!conversion.sql.contains("`db`.`a`"));
    }

    #[test]
    fn test_cycle_fails_in_strict_mode() {
        let options = Options {
            strict: true,
            ..Options::new("db")
        };

        let err = convert(&cyclic_workbook(), &options).unwrap_err();
        match err {
            ConvertError::Ordering(incomplete) => {
                assert_eq!(incomplete.placed, 1);
                assert_eq!(incomplete.unplaced, vec!["a", "b"]);
            }
            other => panic!("expected ordering failure, got {:?}", other),
        }
    }

    #[test]
    fn test_render_workbook() {
        let sql = render_workbook(STORE, "store", None).unwrap();
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS `store`.`orders`("));

        let err = render_workbook("not json", "store", None).unwrap_err();
        assert!(err.starts_with("Invalid workbook"));
    }
}
