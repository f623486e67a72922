//! Schema validation.
//!
//! Errors are collected per table rather than raised one at a time, so a
//! single run reports every problem in the workbook.

use crate::alias::Attribute;
use crate::schema::{ForeignKeyRef, Schema, Table};
use crate::Options;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingRequiredAttribute,
    UnrecognizedType,
    MalformedForeignKey,
    DanglingForeignKey,
    MultiplePrimaryKeys,
    UnknownColumnAttribute,
    OrderingIncomplete,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("A field is missing the following attributes: {}", join(.attributes))]
    MissingRequiredAttribute { attributes: Vec<Attribute> },
    #[error("A field type of '{alias}' on field '{field}' is not recognized as a valid type")]
    UnrecognizedType { field: String, alias: String },
    #[error("A foreign key specified as '{reference}' on field '{field}' is not of the form table:field")]
    MalformedForeignKey { field: String, reference: String },
    #[error("A foreign key specified as '{reference}' on field '{field}' is not valid: {reason}")]
    DanglingForeignKey {
        field: String,
        reference: String,
        reason: String,
    },
    #[error("More than one field is marked as primary key: {}", .fields.join(", "))]
    MultiplePrimaryKeys { fields: Vec<String> },
}

fn join(attributes: &[Attribute]) -> String {
    attributes
        .iter()
        .map(|a| a.name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRequiredAttribute { .. } => ErrorKind::MissingRequiredAttribute,
            Self::UnrecognizedType { .. } => ErrorKind::UnrecognizedType,
            Self::MalformedForeignKey { .. } => ErrorKind::MalformedForeignKey,
            Self::DanglingForeignKey { .. } => ErrorKind::DanglingForeignKey,
            Self::MultiplePrimaryKeys { .. } => ErrorKind::MultiplePrimaryKeys,
        }
    }
}

/// Validation errors keyed by table, in schema order.
///
/// Tables without errors have no entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    tables: Vec<(String, Vec<ValidationError>)>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn get(&self, table: &str) -> Option<&[ValidationError]> {
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, errors)| errors.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ValidationError])> {
        self.tables
            .iter()
            .map(|(name, errors)| (name.as_str(), errors.as_slice()))
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn error_count(&self) -> usize {
        self.tables.iter().map(|(_, errors)| errors.len()).sum()
    }

    fn push(&mut self, table: &str, error: ValidationError) {
        match self.tables.iter_mut().find(|(name, _)| name == table) {
            Some((_, errors)) => errors.push(error),
            None => self.tables.push((table.to_string(), vec![error])),
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (table, errors) in self.iter() {
            writeln!(f, "Errors in the {} table:", table)?;
            for error in errors {
                writeln!(f, "  {}", error)?;
            }
        }
        Ok(())
    }
}

pub fn validate(schema: &Schema) -> ValidationReport {
    validate_with(schema, &Options::default())
}

pub fn validate_with(schema: &Schema, options: &Options) -> ValidationReport {
    let mut report = ValidationReport::default();

    for table in schema.tables() {
        validate_fields(table, &mut report);
        if options.strict {
            validate_primary_key(table, &mut report);
        }
    }

    // Referential checks run after field checks so each table's errors read
    // in that order.
    for table in schema.tables() {
        validate_foreign_keys(schema, table, &mut report);
    }

    report
}

fn validate_fields(table: &Table, report: &mut ValidationReport) {
    for field in &table.fields {
        let missing = field.missing_attributes();
        if !missing.is_empty() {
            report.push(
                &table.name,
                ValidationError::MissingRequiredAttribute { attributes: missing },
            );
        }

        if let Some(alias) = &field.type_alias {
            if field.field_type().is_none() {
                report.push(
                    &table.name,
                    ValidationError::UnrecognizedType {
                        field: field.name().to_string(),
                        alias: alias.clone(),
                    },
                );
            }
        }
    }
}

fn validate_primary_key(table: &Table, report: &mut ValidationReport) {
    let fields = table.primary_key_fields();
    if fields.len() > 1 {
        report.push(
            &table.name,
            ValidationError::MultiplePrimaryKeys {
                fields: fields.iter().map(|f| f.name().to_string()).collect(),
            },
        );
    }
}

fn validate_foreign_keys(schema: &Schema, table: &Table, report: &mut ValidationReport) {
    for (field, reference) in table.foreign_keys() {
        let fk = match ForeignKeyRef::parse(reference) {
            Ok(fk) => fk,
            Err(_) => {
                report.push(
                    &table.name,
                    ValidationError::MalformedForeignKey {
                        field: field.to_string(),
                        reference: reference.to_string(),
                    },
                );
                continue;
            }
        };

        let reason = match schema.table(&fk.table) {
            None => Some(format!("table '{}' does not exist", fk.table)),
            Some(target) if !target.has_field(&fk.field) => Some(format!(
                "table '{}' has no field '{}'",
                fk.table, fk.field
            )),
            Some(_) => None,
        };

        if let Some(reason) = reason {
            report.push(
                &table.name,
                ValidationError::DanglingForeignKey {
                    field: field.to_string(),
                    reference: reference.to_string(),
                    reason,
                },
            );
        }
    }
}
