//! XLSX writer kernel that lays out cell-record documents as worksheets.

use std::collections::BTreeSet;
use std::path::PathBuf;

use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};
use serde_json::Value;

use crate::conf::N_LEN_EXCEL_SHEET_NAME_MAX;
use crate::reshape::plan_sheet_grid;
use crate::spec::{
    EnumCellValue, SpecCellFormat, SpecSheetGrid, SpecSheetSummary, SpecXlsxReport,
    SpecXlsxWriteOptions, XlsxWriteError,
};
use crate::util::{cast_col_num, cast_row_num, sanitize_sheet_name, validate_grid_limits};

/// Stateful workbook writer.
///
/// Sheets are buffered in memory; nothing touches disk until [`Self::close`].
/// Dropping an unclosed writer discards the workbook.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    fmt_header: SpecCellFormat,
    fmt_value: SpecCellFormat,
    write_options: SpecXlsxWriteOptions,
    set_sheet_names_existing: BTreeSet<String>,
    report: SpecXlsxReport,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path and format/options presets.
    pub fn new(
        path_file_out: PathBuf,
        fmt_header: SpecCellFormat,
        fmt_value: SpecCellFormat,
        write_options: SpecXlsxWriteOptions,
    ) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            fmt_header,
            fmt_value,
            write_options,
            set_sheet_names_existing: BTreeSet::new(),
            report: SpecXlsxReport::default(),
            if_closed: false,
        }
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Return snapshot of the workbook report.
    pub fn report(&self) -> SpecXlsxReport {
        self.report.clone()
    }

    /// Number of sheets written so far.
    pub fn sheet_count(&self) -> usize {
        self.report.sheets.len()
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), XlsxWriteError> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook.save(&self.path_file_out)?;
        self.report.file_out = Some(self.path_file_out.clone());
        self.if_closed = true;
        Ok(())
    }

    /// Lay out one source document and append it as a new sheet.
    ///
    /// Returns the unique sheet name actually used.
    pub fn write_sheet_from_document(
        &mut self,
        document: &Value,
        sheet_name: &str,
    ) -> Result<String, XlsxWriteError> {
        if self.if_closed {
            return Err(XlsxWriteError::Closed);
        }

        let (grid, n_headers, n_values) = plan_sheet_grid(document, &self.write_options)?;
        let sheet_name_unique = self.write_sheet_grid(&grid, sheet_name)?;

        tracing::debug!(
            sheet = %sheet_name_unique,
            n_headers,
            n_values,
            "sheet laid out"
        );
        self.report.sheets.push(SpecSheetSummary {
            sheet_name: sheet_name_unique.clone(),
            n_headers,
            n_values,
            height: grid.height(),
            width: grid.width(),
        });
        Ok(sheet_name_unique)
    }

    /// Append a pre-planned grid as a new sheet.
    pub fn write_sheet_grid(
        &mut self,
        grid: &SpecSheetGrid,
        sheet_name: &str,
    ) -> Result<String, XlsxWriteError> {
        if self.if_closed {
            return Err(XlsxWriteError::Closed);
        }
        validate_grid_limits(grid).map_err(XlsxWriteError::Limit)?;

        let sheet_name_base = sanitize_sheet_name(sheet_name, "_");
        let sheet_name_unique = self.derive_unique_sheet_name(&sheet_name_base);
        if sheet_name_unique != sheet_name_base {
            self.report.warn(format!(
                "Sheet name {sheet_name_base:?} already used; renamed to {sheet_name_unique:?}."
            ));
        }

        let fmt_patch_border = SpecCellFormat {
            border: (!self.write_options.if_border_cells).then_some(false),
            ..Default::default()
        };
        let fmt_header_spec = self.fmt_header.with_(fmt_patch_border);
        let fmt_header = derive_rust_xlsx_format(&fmt_header_spec);
        let fmt_header_plain = derive_rust_xlsx_format(&fmt_header_spec.with_(SpecCellFormat {
            bold: Some(false),
            ..Default::default()
        }));
        let fmt_value = derive_rust_xlsx_format(&self.fmt_value.with_(fmt_patch_border));

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet_name_unique)?;

        for (&(n_row, n_col), cell) in grid.cells() {
            let format = match (n_row, cell.if_bold) {
                (1, true) => &fmt_header,
                (1, false) => &fmt_header_plain,
                _ => &fmt_value,
            };
            write_cell_with_format(worksheet, n_row, n_col, &cell.value, format)?;
        }

        if self.write_options.if_border_cells {
            for n_row in 1..=grid.height() {
                for n_col in 1..=grid.width() {
                    if grid.cell(n_row, n_col).is_some() {
                        continue;
                    }
                    let format = if n_row == 1 {
                        &fmt_header_plain
                    } else {
                        &fmt_value
                    };
                    write_cell_with_format(worksheet, n_row, n_col, &EnumCellValue::None, format)?;
                }
            }
        }

        for (&n_col, &n_width) in grid.column_widths() {
            worksheet.set_column_width(
                cast_col_num(n_col).map_err(XlsxWriteError::Limit)?,
                n_width,
            )?;
        }

        Ok(sheet_name_unique)
    }

    /// Excel compares sheet names case-insensitively, so the used set holds lowercase keys.
    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        if self.set_sheet_names_existing.insert(name.to_lowercase()) {
            return name.to_string();
        }

        let base_name: String = name
            .chars()
            .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
            .collect();

        let mut n_idx = 2usize;
        loop {
            let candidate: String = format!("{base_name}__{n_idx}")
                .chars()
                .take(N_LEN_EXCEL_SHEET_NAME_MAX)
                .collect();
            if self.set_sheet_names_existing.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n_idx += 1;
        }
    }
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    n_row: usize,
    n_col: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), XlsxWriteError> {
    let n_row = cast_row_num(n_row).map_err(XlsxWriteError::Limit)?;
    let n_col = cast_col_num(n_col).map_err(XlsxWriteError::Limit)?;

    match value {
        EnumCellValue::None => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean_with_format(n_row, n_col, *val, format)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.border.unwrap_or(false) {
        format = format.set_border(FormatBorder::Thin);
    }
    format
}
