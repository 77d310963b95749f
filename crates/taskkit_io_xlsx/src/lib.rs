//! `taskkit_io_xlsx` v1:
//! JSON cell-record documents to XLSX workbook converter.
//!
//! Modules:
//! - `conf`    : constants and default presets
//! - `spec`    : specs/models/options/errors
//! - `reshape` : record flatten/sort and header/value grid layout
//! - `util`    : pure helper functions
//! - `writer`  : workbook writer kernel
//! - `convert` : directory batch orchestration
pub mod conf;
pub mod convert;
pub mod reshape;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_FIELD_HEADER_DEFAULT, C_FIELD_VALUE_DEFAULT, C_FILE_OUT_DEFAULT, C_KEY_HEADERS,
    C_KEY_PROPERTIES, C_PATTERN_INPUT_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, N_RATIO_HEADER_WIDTH, TUP_EXCEL_ILLEGAL,
};
pub use convert::convert_json_dir_to_xlsx;
pub use reshape::{
    count_headers, flatten_and_sort, normalize_trailing_minus, render_header_row,
    render_value_grid,
};
pub use spec::{
    ConvertError, EnumCellValue, ReshapeError, SpecCellFormat, SpecCellRecord, SpecConvertOptions,
    SpecSheetCell, SpecSheetGrid, SpecSheetSummary, SpecXlsxReport, SpecXlsxWriteOptions,
    XlsxWriteError,
};
pub use util::{derive_sheet_name_from_file_name, sanitize_sheet_name};
pub use writer::XlsxWriter;
