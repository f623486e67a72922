//! Workbook input: sheets of cells exported from a spreadsheet as JSON.

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid workbook: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single spreadsheet cell.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    #[default]
    Empty,
}

impl Cell {
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    /// Blank cells mean "use the default".
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell content as trimmed text. Blank cells yield `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
        }
    }

    /// Interpret the cell as a flag. Blank cells yield `None`.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Empty => None,
            Self::Bool(b) => Some(*b),
            Self::Number(n) => Some(*n != 0.0),
            Self::Text(s) => {
                let s = s.trim().to_lowercase();
                if s.is_empty() {
                    None
                } else {
                    Some(!matches!(s.as_str(), "0" | "false" | "no" | "n"))
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: &str, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.to_string(),
            rows,
        }
    }

    /// Cell at `(row, col)`; positions outside the grid are empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Workbook {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn from_json(source: &str) -> Result<Self, WorkbookError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Read and parse a workbook file. The file is closed before parsing.
    pub fn from_path(path: &Path) -> Result<Self, WorkbookError> {
        let source = fs::read_to_string(path).map_err(|source| WorkbookError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_mixed_cells() {
        let json = r#"{
            "sheets": [
                { "name": "users", "rows": [["field name", "unique"], ["id", 1], ["email", true], [null, "  "]] }
            ]
        }"#;
        let workbook = Workbook::from_json(json).unwrap();
        let sheet = &workbook.sheets[0];

        assert_eq!(sheet.name, "users");
        assert_eq!(sheet.cell(1, 1), &Cell::Number(1.0));
        assert_eq!(sheet.cell(2, 1), &Cell::Bool(true));
        assert_eq!(sheet.cell(3, 0), &Cell::Empty);
        assert!(sheet.cell(3, 1).is_blank());
        assert_eq!(sheet.cell(10, 10), &Cell::Empty);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(Cell::Number(3.0).as_text().as_deref(), Some("3"));
        assert_eq!(Cell::Number(2.5).as_text().as_deref(), Some("2.5"));
        assert_eq!(Cell::text("  id ").as_text().as_deref(), Some("id"));
        assert_eq!(Cell::text("").as_text(), None);
    }

    #[test]
    fn test_cell_flag() {
        assert_eq!(Cell::text("x").as_flag(), Some(true));
        assert_eq!(Cell::text("No").as_flag(), Some(false));
        assert_eq!(Cell::Number(0.0).as_flag(), Some(false));
        assert_eq!(Cell::Empty.as_flag(), None);
        assert_eq!(Cell::text(" ").as_flag(), None);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"sheets": [{{"name": "a", "rows": []}}]}}"#).unwrap();

        let workbook = Workbook::from_path(file.path()).unwrap();
        assert_eq!(workbook.sheets.len(), 1);
        assert_eq!(workbook.sheets[0].row_count(), 0);
    }

    #[test]
    fn test_from_missing_path() {
        let err = Workbook::from_path(Path::new("/nonexistent/workbook.json")).unwrap_err();
        assert!(matches!(err, WorkbookError::Io { .. }));
    }
}
