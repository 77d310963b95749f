//! Stateless helper utilities used by the XLSX writer kernel.

use std::path::Path;

use globset::{Glob, GlobMatcher};

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{ConvertError, SpecSheetGrid};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
///
/// Excel also rejects names that start or end with `'`; those are trimmed
/// together with surrounding whitespace after the length cut.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }

    let c_name: String = c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect();
    let c_name = c_name.trim_matches(|ch: char| ch == '\'' || ch.is_whitespace());
    if c_name.is_empty() {
        return "Sheet".to_string();
    }
    c_name.to_string()
}

/// Sheet name for an input file: base name up to the first `.`, sanitized.
pub fn derive_sheet_name_from_file_name(file_name: &str) -> String {
    let c_stem = file_name.split('.').next().unwrap_or_default();
    sanitize_sheet_name(c_stem, "_")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region InputDiscovery

/// Compile the base-name glob used to pick input documents.
pub fn compile_input_pattern(pattern: &str) -> Result<GlobMatcher, ConvertError> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|source| ConvertError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Base name as UTF-8 text, if representable.
pub fn derive_file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExcelLimits

/// Reject grids that do not fit one Excel worksheet.
pub fn validate_grid_limits(grid: &SpecSheetGrid) -> Result<(), String> {
    if grid.height() > N_NROWS_EXCEL_MAX {
        return Err(format!(
            "Excel limit overflow: {} rows > {N_NROWS_EXCEL_MAX}.",
            grid.height()
        ));
    }
    if grid.width() > N_NCOLS_EXCEL_MAX {
        return Err(format!(
            "Excel limit overflow: {} columns > {N_NCOLS_EXCEL_MAX}.",
            grid.width()
        ));
    }
    Ok(())
}

/// 1-based grid row to 0-based worksheet row.
pub fn cast_row_num(row: usize) -> Result<u32, String> {
    row.checked_sub(1)
        .and_then(|val| u32::try_from(val).ok())
        .ok_or_else(|| format!("row index overflow: {row}"))
}

/// 1-based grid column to 0-based worksheet column.
pub fn cast_col_num(col: usize) -> Result<u16, String> {
    col.checked_sub(1)
        .and_then(|val| u16::try_from(val).ok())
        .ok_or_else(|| format!("column index overflow: {col}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::EnumCellValue;

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("a/b:c", "_"), "a_b_c");
        assert_eq!(sanitize_sheet_name("   ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "_").len(), 31);
    }

    #[test]
    fn test_sanitize_sheet_name_trims_apostrophes() {
        assert_eq!(sanitize_sheet_name("'q'", "_"), "q");
        assert_eq!(sanitize_sheet_name(" 'it's' ", "_"), "it's");
        assert_eq!(sanitize_sheet_name("''", "_"), "Sheet");

        let c_long = format!("{}'tail", "x".repeat(30));
        assert_eq!(sanitize_sheet_name(&c_long, "_"), "x".repeat(30));
    }

    #[test]
    fn test_derive_sheet_name_from_file_name_cuts_at_first_dot() {
        assert_eq!(derive_sheet_name_from_file_name("report.json"), "report");
        assert_eq!(derive_sheet_name_from_file_name("q1.2024.json"), "q1");
        assert_eq!(derive_sheet_name_from_file_name(".json"), "Sheet");
        assert_eq!(derive_sheet_name_from_file_name("'q'.json"), "q");
    }

    #[test]
    fn test_compile_input_pattern() {
        let matcher = compile_input_pattern("*.json").unwrap();
        assert!(matcher.is_match("a.json"));
        assert!(!matcher.is_match("a.xlsx"));
        assert!(compile_input_pattern("[").is_err());
    }

    #[test]
    fn test_cast_is_one_based() {
        assert_eq!(cast_row_num(1), Ok(0));
        assert_eq!(cast_col_num(3), Ok(2));
        assert!(cast_row_num(0).is_err());
        assert!(cast_col_num(70_000).is_err());
    }

    #[test]
    fn test_validate_grid_limits() {
        let mut grid = SpecSheetGrid::new();
        grid.set_cell(1, N_NCOLS_EXCEL_MAX, EnumCellValue::None, false);
        assert!(validate_grid_limits(&grid).is_ok());
        grid.set_cell(1, N_NCOLS_EXCEL_MAX + 1, EnumCellValue::None, false);
        assert!(validate_grid_limits(&grid).is_err());
    }
}
