//! Header and type alias tables.
//!
//! Worksheet authors write attribute headers and field types in free form.
//! These tables map that text onto the canonical attribute or type.

use std::fmt;

/// A field attribute that a worksheet column can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    FieldName,
    FieldType,
    Unique,
    AutoIncrement,
    PrimaryKey,
    ForeignKey,
    NotNull,
}

impl Attribute {
    pub const ALL: [Attribute; 7] = [
        Self::FieldName,
        Self::FieldType,
        Self::Unique,
        Self::AutoIncrement,
        Self::PrimaryKey,
        Self::ForeignKey,
        Self::NotNull,
    ];

    /// Resolve a header cell to an attribute. Matching ignores case and
    /// surrounding whitespace.
    pub fn from_alias(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "field name" | "field_name" => Some(Self::FieldName),
            "field type" | "field_type" => Some(Self::FieldType),
            "unique" => Some(Self::Unique),
            "auto increment" | "autoincrement" => Some(Self::AutoIncrement),
            "primary key" => Some(Self::PrimaryKey),
            "foreign key" => Some(Self::ForeignKey),
            "not null" | "not_null" => Some(Self::NotNull),
            _ => None,
        }
    }

    /// Canonical header text.
    pub fn name(self) -> &'static str {
        match self {
            Self::FieldName => "field name",
            Self::FieldType => "field type",
            Self::Unique => "unique",
            Self::AutoIncrement => "auto increment",
            Self::PrimaryKey => "primary key",
            Self::ForeignKey => "foreign key",
            Self::NotNull => "not null",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column types supported in the generated DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Int,
    Date,
    Text,
    Float,
}

impl FieldType {
    /// Normalize a type alias such as `integer` or `decimal`.
    pub fn from_alias(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "int" | "integer" => Some(Self::Int),
            "date" => Some(Self::Date),
            "text" => Some(Self::Text),
            "float" | "decimal" => Some(Self::Float),
            _ => None,
        }
    }

    /// SQL keyword for the type.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Date => "DATE",
            Self::Text => "TEXT",
            Self::Float => "FLOAT",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
