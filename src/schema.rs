//! Schema model: fields, tables and the schema they form.

use crate::alias::{Attribute, FieldType};
use crate::workbook::Cell;
use std::fmt;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("The column name '{0}' is not a valid field attribute")]
    UnknownAttribute(String),
}

/// One column definition, as read from a worksheet row.
///
/// `name`, `type_alias` and `foreign_key` keep the raw cell text so that the
/// validator can report exactly what the author wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Field {
    pub name: Option<String>,
    pub type_alias: Option<String>,
    pub unique: bool,
    pub auto_increment: bool,
    pub primary_key: bool,
    pub not_null: bool,
    pub foreign_key: Option<String>,
}

impl Field {
    pub fn new(name: &str, type_alias: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            type_alias: Some(type_alias.to_string()),
            ..Self::default()
        }
    }

    /// Build a field from `(attribute alias, cell)` pairs.
    ///
    /// Every key must resolve to a known attribute; the first one that
    /// doesn't is returned as an error.
    pub fn from_attributes<'a, I>(attributes: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (&'a str, Cell)>,
    {
        let mut field = Self::default();
        for (key, value) in attributes {
            let attribute = Attribute::from_alias(key)
                .ok_or_else(|| SchemaError::UnknownAttribute(key.to_string()))?;
            field.set(attribute, &value);
        }
        Ok(field)
    }

    /// Apply one cell. Blank cells leave the attribute at its default.
    pub fn set(&mut self, attribute: Attribute, value: &Cell) {
        if value.is_blank() {
            return;
        }
        match attribute {
            Attribute::FieldName => self.name = value.as_text(),
            Attribute::FieldType => self.type_alias = value.as_text(),
            Attribute::ForeignKey => self.foreign_key = value.as_text(),
            Attribute::Unique => self.unique = value.as_flag().unwrap_or(false),
            Attribute::AutoIncrement => self.auto_increment = value.as_flag().unwrap_or(false),
            Attribute::PrimaryKey => self.primary_key = value.as_flag().unwrap_or(false),
            Attribute::NotNull => self.not_null = value.as_flag().unwrap_or(false),
        }
    }

    pub fn with_foreign_key(mut self, reference: &str) -> Self {
        self.foreign_key = Some(reference.to_string());
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Normalized type, if the alias is recognized.
    pub fn field_type(&self) -> Option<FieldType> {
        self.type_alias.as_deref().and_then(FieldType::from_alias)
    }

    /// Required attributes that are not set.
    pub fn missing_attributes(&self) -> Vec<Attribute> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push(Attribute::FieldName);
        }
        if self.type_alias.is_none() {
            missing.push(Attribute::FieldType);
        }
        missing
    }
}

/// A parsed `table:field` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    pub table: String,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not of the form table:field")]
pub struct MalformedForeignKey(pub String);

impl ForeignKeyRef {
    pub fn parse(s: &str) -> Result<Self, MalformedForeignKey> {
        let mut parts = s.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(table), Some(field), None)
                if !table.trim().is_empty() && !field.trim().is_empty() =>
            {
                Ok(Self {
                    table: table.trim().to_string(),
                    field: field.trim().to_string(),
                })
            }
            _ => Err(MalformedForeignKey(s.to_string())),
        }
    }
}

impl fmt::Display for ForeignKeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.table, self.field)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Table {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(name: &str, fields: Vec<Field>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }

    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().filter_map(|f| f.name.as_deref()).collect()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name.as_deref() == Some(name))
    }

    /// `(field name, raw "table:field")` for every field with a foreign key.
    pub fn foreign_keys(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .filter_map(|f| f.foreign_key.as_deref().map(|fk| (f.name(), fk)))
            .collect()
    }

    /// The primary key column: the last field marked primary key.
    pub fn primary_key(&self) -> Option<&Field> {
        self.fields.iter().rev().find(|f| f.primary_key)
    }

    pub fn primary_key_fields(&self) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.primary_key).collect()
    }

    /// Tables referenced by well-formed foreign keys, first-seen order.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut deps: Vec<&str> = Vec::new();
        for (_, reference) in self.foreign_keys() {
            let Some(table) = split_table(reference) else {
                continue;
            };
            if !deps.contains(&table) {
                deps.push(table);
            }
        }
        deps
    }
}

/// Table part of a well-formed `table:field` string, borrowed from it.
fn split_table(reference: &str) -> Option<&str> {
    ForeignKeyRef::parse(reference).ok()?;
    reference.split(':').next().map(str::trim)
}

/// All tables of a workbook, in worksheet order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    tables: Vec<Table>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table. A table with the same name is replaced in place.
    pub fn add_table(&mut self, table: Table) {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<Table> for Schema {
    fn from_iter<T: IntoIterator<Item = Table>>(iter: T) -> Self {
        let mut schema = Schema::new();
        for table in iter {
            schema.add_table(table);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_attributes() {
        let field = Field::from_attributes([
            ("field name", Cell::text("id")),
            ("field_type", Cell::text("integer")),
            ("primary key", Cell::text("x")),
            ("not null", Cell::Number(1.0)),
        ])
        .unwrap();

        assert_eq!(field.name(), "id");
        assert_eq!(field.field_type(), Some(FieldType::Int));
        assert!(field.primary_key);
        assert!(field.not_null);
        assert!(!field.unique);
    }

    #[test]
    fn test_field_unknown_attribute() {
        let err = Field::from_attributes([
            ("field name", Cell::text("id")),
            ("comment", Cell::text("surrogate key")),
        ])
        .unwrap_err();

        assert_eq!(err, SchemaError::UnknownAttribute("comment".to_string()));
    }

    #[test]
    fn test_blank_cells_keep_defaults() {
        let field = Field::from_attributes([
            ("field name", Cell::text("")),
            ("unique", Cell::Empty),
            ("foreign key", Cell::text("   ")),
        ])
        .unwrap();

        assert_eq!(field, Field::default());
        assert_eq!(
            field.missing_attributes(),
            vec![Attribute::FieldName, Attribute::FieldType]
        );
    }

    #[test]
    fn test_foreign_key_parse() {
        let fk = ForeignKeyRef::parse("orders:id").unwrap();
        assert_eq!(fk.table, "orders");
        assert_eq!(fk.field, "id");
        assert_eq!(fk.to_string(), "orders:id");

        assert!(ForeignKeyRef::parse("orders:id:extra").is_err());
        assert!(ForeignKeyRef::parse("ordersid").is_err());
        assert!(ForeignKeyRef::parse(":id").is_err());
        assert!(ForeignKeyRef::parse("orders:").is_err());
    }

    #[test]
    fn test_table_foreign_keys_in_field_order() {
        let table = Table::with_fields(
            "line_items",
            vec![
                Field::new("id", "int").primary(),
                Field::new("order_id", "int").with_foreign_key("orders:id"),
                Field::new("product_id", "int").with_foreign_key("products:id"),
                Field::new("order_ref", "int").with_foreign_key("orders:id"),
            ],
        );

        assert_eq!(
            table.foreign_keys(),
            vec![
                ("order_id", "orders:id"),
                ("product_id", "products:id"),
                ("order_ref", "orders:id"),
            ]
        );
        assert_eq!(table.dependencies(), vec!["orders", "products"]);
    }

    #[test]
    fn test_last_primary_key_wins() {
        let table = Table::with_fields(
            "t",
            vec![
                Field::new("a", "int").primary(),
                Field::new("b", "int").primary(),
            ],
        );

        assert_eq!(table.primary_key().map(Field::name), Some("b"));
        assert_eq!(table.primary_key_fields().len(), 2);
    }

    #[test]
    fn test_schema_replaces_same_name() {
        let mut schema = Schema::new();
        schema.add_table(Table::new("a"));
        schema.add_table(Table::new("b"));
        schema.add_table(Table::with_fields("a", vec![Field::new("id", "int")]));

        assert_eq!(schema.table_names(), vec!["a", "b"]);
        assert!(schema.table("a").unwrap().has_field("id"));
    }
}
