//! Shared XLSX specification models, options and errors.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use rust_xlsxwriter::XlsxError;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::conf::{
    C_FIELD_HEADER_DEFAULT, C_FIELD_VALUE_DEFAULT, C_FILE_OUT_DEFAULT, C_PATTERN_INPUT_DEFAULT,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Bold font.
    pub bold: Option<bool>,
    /// Thin border on all four sides.
    pub border: Option<bool>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            bold: other.bold.or(self.bold),
            border: other.border.or(self.border),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValues

/// Normalized cell value placed into a sheet grid.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

impl EnumCellValue {
    /// Convert a JSON display value into a cell value.
    ///
    /// Nested arrays/objects are kept as their compact JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::Bool(val) => Self::Boolean(*val),
            Value::Number(val) => match val.as_f64() {
                Some(n) => Self::Number(n),
                None => Self::String(val.to_string()),
            },
            Value::String(val) => Self::String(val.clone()),
            Value::Array(_) | Value::Object(_) => Self::String(value.to_string()),
        }
    }
}

impl fmt::Display for EnumCellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::String(val) => write!(f, "{val}"),
            Self::Number(val) => {
                if val.fract() == 0.0 && val.abs() < 1e15 {
                    write!(f, "{}", *val as i64)
                } else {
                    write!(f, "{val}")
                }
            }
            Self::Boolean(val) => write!(f, "{}", if *val { "True" } else { "False" }),
        }
    }
}

/// One `properties` mapping lifted out of a source document, with its
/// coordinates already coerced to integers.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecCellRecord {
    /// Group the record was read from.
    pub group: String,
    /// Column position (`X`).
    pub x: i64,
    /// Row position (`Y`).
    pub y: i64,
    /// Full `properties` mapping.
    pub properties: Map<String, Value>,
}

impl SpecCellRecord {
    /// Read one display field from `properties`.
    pub fn field(&self, field: &str) -> Result<&Value, ReshapeError> {
        self.properties
            .get(field)
            .ok_or_else(|| ReshapeError::MissingKey {
                key: field.to_string(),
                context: format!("{}(X={}, Y={}).properties", self.group, self.x, self.y),
            })
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetGrid

/// One planned sheet cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetCell {
    /// Cell value.
    pub value: EnumCellValue,
    /// Render with header emphasis.
    pub if_bold: bool,
}

/// In-memory sheet layout, 1-based `(row, column)` like spreadsheet UIs.
///
/// Filled by [`crate::reshape`] and flushed by [`crate::writer::XlsxWriter`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetGrid {
    cells: BTreeMap<(usize, usize), SpecSheetCell>,
    widths_by_col: BTreeMap<usize, f64>,
}

impl SpecSheetGrid {
    /// Empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `value` at `(row, col)`, replacing any earlier cell.
    pub fn set_cell(&mut self, row: usize, col: usize, value: EnumCellValue, if_bold: bool) {
        debug_assert!(row >= 1 && col >= 1, "grid coordinates are 1-based");
        self.cells
            .insert((row, col), SpecSheetCell { value, if_bold });
    }

    /// Cell at `(row, col)`, if any.
    pub fn cell(&self, row: usize, col: usize) -> Option<&SpecSheetCell> {
        self.cells.get(&(row, col))
    }

    /// All planned cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (&(usize, usize), &SpecSheetCell)> {
        self.cells.iter()
    }

    /// Set the width of column `col`.
    pub fn set_column_width(&mut self, col: usize, width: f64) {
        self.widths_by_col.insert(col, width);
    }

    /// Width of column `col`, if one was set.
    pub fn column_width(&self, col: usize) -> Option<f64> {
        self.widths_by_col.get(&col).copied()
    }

    /// All explicit column widths.
    pub fn column_widths(&self) -> impl Iterator<Item = (&usize, &f64)> {
        self.widths_by_col.iter()
    }

    /// Highest used row (0 when empty).
    pub fn height(&self) -> usize {
        self.cells.keys().map(|(row, _)| *row).max().unwrap_or(0)
    }

    /// Highest used column (0 when empty).
    pub fn width(&self) -> usize {
        self.cells.keys().map(|(_, col)| *col).max().unwrap_or(0)
    }

    /// Display text of one row across `1..=width()`; blanks are empty strings.
    pub fn row_texts(&self, row: usize) -> Vec<String> {
        (1..=self.width())
            .map(|col| {
                self.cell(row, col)
                    .map(|cell| cell.value.to_string())
                    .unwrap_or_default()
            })
            .collect()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Per-workbook layout options.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecXlsxWriteOptions {
    /// Field read from header records.
    pub field_header: String,
    /// Field read from value records.
    pub field_value: String,
    /// Emphasize header cells.
    pub if_bold_header: bool,
    /// Border every cell in the used range, blanks included.
    pub if_border_cells: bool,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            field_header: C_FIELD_HEADER_DEFAULT.to_string(),
            field_value: C_FIELD_VALUE_DEFAULT.to_string(),
            if_bold_header: true,
            if_border_cells: true,
        }
    }
}

/// Options for one directory conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecConvertOptions {
    /// Directory scanned for input documents (not recursive).
    pub dir_input: PathBuf,
    /// Glob applied to file base names.
    pub pattern_input: String,
    /// Output workbook path.
    pub file_out: PathBuf,
    /// Layout options.
    pub write_options: SpecXlsxWriteOptions,
}

impl Default for SpecConvertOptions {
    fn default() -> Self {
        Self {
            dir_input: PathBuf::from("."),
            pattern_input: C_PATTERN_INPUT_DEFAULT.to_string(),
            file_out: PathBuf::from(C_FILE_OUT_DEFAULT),
            write_options: SpecXlsxWriteOptions::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// One sheet emitted to the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSummary {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Header cells written to row 1.
    pub n_headers: usize,
    /// Value cells written below the header.
    pub n_values: usize,
    /// Used rows.
    pub height: usize,
    /// Used columns.
    pub width: usize,
}

/// Workbook-level report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Saved workbook path; `None` when nothing was written.
    pub file_out: Option<PathBuf>,
    /// Sheets in write order.
    pub sheets: Vec<SpecSheetSummary>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Structural problems in one source document.
#[derive(Debug, Error)]
pub enum ReshapeError {
    /// Required structural field absent.
    #[error("Missing key {key:?} in {context}.")]
    MissingKey {
        /// Absent key.
        key: String,
        /// Where it was expected.
        context: String,
    },
    /// Coordinate not coercible to integer.
    #[error("Cannot coerce {key:?}={value} to integer in {context}.")]
    Parse {
        /// Coordinate key (`X` or `Y`).
        key: String,
        /// Offending raw value.
        value: String,
        /// Record location.
        context: String,
    },
    /// Wrong container type (group not a sequence, record not a mapping, ...).
    #[error("Malformed document: {0}")]
    Type(String),
    /// Requested header slice exceeds available records.
    #[error("Header count {requested} exceeds available records ({available}).")]
    Index {
        /// Requested header count.
        requested: usize,
        /// Records available.
        available: usize,
    },
    /// Value records present but the header row is empty.
    #[error("Value grid width must be >= 1 when values are present.")]
    ZeroWidth,
}

impl ReshapeError {
    /// Short failure category for log lines.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingKey { .. } => "missing-key",
            Self::Parse { .. } | Self::Type(_) => "parse",
            Self::Index { .. } | Self::ZeroWidth => "index",
        }
    }
}

/// Workbook write failures.
#[derive(Debug, Error)]
pub enum XlsxWriteError {
    /// Source document is structurally invalid.
    #[error(transparent)]
    Reshape(#[from] ReshapeError),
    /// Underlying xlsx library failure.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),
    /// Writer already saved.
    #[error("Cannot write after close().")]
    Closed,
    /// Grid does not fit Excel limits.
    #[error("{0}")]
    Limit(String),
}

/// Directory conversion failures. Any of these aborts the whole batch.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// `dir_input` is not a directory.
    #[error("Input is not a directory: {}", .0.display())]
    InputNotDirectory(PathBuf),
    /// `pattern_input` is not a valid glob.
    #[error("Invalid input pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// Raw pattern.
        pattern: String,
        /// Glob compile error.
        #[source]
        source: globset::Error,
    },
    /// Listing or reading failed.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// IO error.
        #[source]
        source: std::io::Error,
    },
    /// Input is not valid JSON.
    #[error("Failed to parse JSON {}: {source}", path.display())]
    Json {
        /// Input document path.
        path: PathBuf,
        /// Decode error.
        #[source]
        source: serde_json::Error,
    },
    /// Input JSON is structurally invalid or its sheet failed to write.
    #[error("Failed to convert {}: {source}", path.display())]
    Document {
        /// Input document path.
        path: PathBuf,
        /// Conversion error.
        #[source]
        source: XlsxWriteError,
    },
    /// Workbook could not be saved.
    #[error("Failed to save workbook {}: {source}", path.display())]
    Save {
        /// Output path.
        path: PathBuf,
        /// Save error.
        #[source]
        source: XlsxWriteError,
    },
}

impl ConvertError {
    /// Short failure category for log lines.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InputNotDirectory(_) | Self::InvalidPattern { .. } => "config",
            Self::Io { .. } => "io",
            Self::Json { .. } => "parse",
            Self::Document {
                source: XlsxWriteError::Reshape(err),
                ..
            } => err.category(),
            Self::Document { .. } | Self::Save { .. } => "write",
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cell_value_from_json_and_display() {
        assert_eq!(
            EnumCellValue::from_json(&json!("12-")),
            EnumCellValue::String("12-".to_string())
        );
        assert_eq!(EnumCellValue::from_json(&json!(42)).to_string(), "42");
        assert_eq!(EnumCellValue::from_json(&json!(1.5)).to_string(), "1.5");
        assert_eq!(EnumCellValue::from_json(&json!(true)).to_string(), "True");
        assert_eq!(EnumCellValue::from_json(&json!(null)), EnumCellValue::None);
        assert_eq!(
            EnumCellValue::from_json(&json!([1, 2])),
            EnumCellValue::String("[1,2]".to_string())
        );
    }

    #[test]
    fn test_grid_bounds_and_row_texts() {
        let mut grid = SpecSheetGrid::new();
        grid.set_cell(1, 1, EnumCellValue::String("a".to_string()), true);
        grid.set_cell(1, 3, EnumCellValue::Number(3.0), true);
        grid.set_cell(2, 2, EnumCellValue::None, false);

        assert_eq!(grid.height(), 2);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.row_texts(1), vec!["a", "", "3"]);
        assert!(grid.cell(1, 1).is_some_and(|cell| cell.if_bold));
    }

    #[test]
    fn test_record_field_missing_reports_location() {
        let record = SpecCellRecord {
            group: "rows".to_string(),
            x: 2,
            y: 5,
            properties: Map::new(),
        };
        let err = record.field("Text").unwrap_err();
        assert_eq!(err.category(), "missing-key");
        assert!(err.to_string().contains("rows(X=2, Y=5)"));
    }
}
