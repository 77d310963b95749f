//! XLSX constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Group key holding the header cell records.
pub const C_KEY_HEADERS: &str = "headers";
/// Cell record key holding the positioned properties.
pub const C_KEY_PROPERTIES: &str = "properties";
/// Column position key inside `properties`.
pub const C_KEY_X: &str = "X";
/// Row position key inside `properties`.
pub const C_KEY_Y: &str = "Y";

/// Display field read from header records.
pub const C_FIELD_HEADER_DEFAULT: &str = "QuickInfo";
/// Display field read from value records.
pub const C_FIELD_VALUE_DEFAULT: &str = "Text";

/// Header column width = label length * ratio.
pub const N_RATIO_HEADER_WIDTH: f64 = 1.5;

/// Default workbook file name.
pub const C_FILE_OUT_DEFAULT: &str = "converted.xlsx";
/// Default base-name glob for input documents.
pub const C_PATTERN_INPUT_DEFAULT: &str = "*.json";

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFmtKey {
    /// Header row cell format.
    Header,
    /// Value grid cell format.
    Value,
}

impl EnumFmtKey {
    /// Key used in [`derive_default_xlsx_formats`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Value => "value",
        }
    }
}

/// Build default named format presets used by [`crate::writer::XlsxWriter`].
///
/// Every cell gets a thin border; the header preset adds bold.
pub fn derive_default_xlsx_formats() -> BTreeMap<String, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        border: Some(true),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(
        EnumFmtKey::Value.as_str().to_string(),
        cfg_base_fmt_spec,
    );
    dict_fmt.insert(
        EnumFmtKey::Header.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            ..Default::default()
        }),
    );

    dict_fmt
}

/// Look up one default preset by key.
pub fn derive_default_xlsx_format(key: EnumFmtKey) -> SpecCellFormat {
    derive_default_xlsx_formats()
        .remove(key.as_str())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_formats_border_everything_and_bold_header() {
        let fmt_header = derive_default_xlsx_format(EnumFmtKey::Header);
        let fmt_value = derive_default_xlsx_format(EnumFmtKey::Value);

        assert_eq!(fmt_header.border, Some(true));
        assert_eq!(fmt_header.bold, Some(true));
        assert_eq!(fmt_value.border, Some(true));
        assert_eq!(fmt_value.bold, None);
    }
}
