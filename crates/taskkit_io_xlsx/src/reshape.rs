//! Reshape positioned cell records into a header row plus a value grid.
//!
//! A source document maps group names to sequences of cell records:
//!
//! ```json
//! {
//!   "headers": [{"properties": {"X": 1, "Y": 1, "QuickInfo": "Name"}}],
//!   "rows":    [{"properties": {"X": "1", "Y": "2", "Text": "42-"}}]
//! }
//! ```
//!
//! Every group is flattened and sorted row-major by `(Y, X)`. The first
//! `len(headers)` records become row 1, the rest fill the grid below it.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::conf::{C_KEY_HEADERS, C_KEY_PROPERTIES, C_KEY_X, C_KEY_Y, N_RATIO_HEADER_WIDTH};
use crate::spec::{
    EnumCellValue, ReshapeError, SpecCellRecord, SpecSheetGrid, SpecXlsxWriteOptions,
};

////////////////////////////////////////////////////////////////////////////////
// #region RecordExtraction

fn derive_group_map(document: &Value) -> Result<&Map<String, Value>, ReshapeError> {
    document
        .as_object()
        .ok_or_else(|| ReshapeError::Type("document root is not a mapping".to_string()))
}

fn derive_group_entries<'a>(
    group_name: &str,
    group: &'a Value,
) -> Result<&'a [Value], ReshapeError> {
    group
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ReshapeError::Type(format!("group {group_name:?} is not a sequence")))
}

/// Number of entries in the `headers` group.
pub fn count_headers(document: &Value) -> Result<usize, ReshapeError> {
    let dict_groups = derive_group_map(document)?;
    let headers = dict_groups
        .get(C_KEY_HEADERS)
        .ok_or_else(|| ReshapeError::MissingKey {
            key: C_KEY_HEADERS.to_string(),
            context: "document".to_string(),
        })?;
    Ok(derive_group_entries(C_KEY_HEADERS, headers)?.len())
}

fn coerce_coordinate(
    properties: &Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<i64, ReshapeError> {
    let value = properties
        .get(key)
        .ok_or_else(|| ReshapeError::MissingKey {
            key: key.to_string(),
            context: format!("{context}.{C_KEY_PROPERTIES}"),
        })?;

    let n_parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|val| val.is_finite())
                .map(|val| val.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    n_parsed.ok_or_else(|| ReshapeError::Parse {
        key: key.to_string(),
        value: value.to_string(),
        context: context.to_string(),
    })
}

fn derive_cell_record(
    group_name: &str,
    n_idx: usize,
    entry: &Value,
) -> Result<SpecCellRecord, ReshapeError> {
    let c_context = format!("{group_name}[{n_idx}]");

    let dict_entry = entry
        .as_object()
        .ok_or_else(|| ReshapeError::Type(format!("{c_context} is not a mapping")))?;
    let properties = dict_entry
        .get(C_KEY_PROPERTIES)
        .ok_or_else(|| ReshapeError::MissingKey {
            key: C_KEY_PROPERTIES.to_string(),
            context: c_context.clone(),
        })?
        .as_object()
        .ok_or_else(|| {
            ReshapeError::Type(format!("{c_context}.{C_KEY_PROPERTIES} is not a mapping"))
        })?;

    let y = coerce_coordinate(properties, C_KEY_Y, &c_context)?;
    let x = coerce_coordinate(properties, C_KEY_X, &c_context)?;

    Ok(SpecCellRecord {
        group: group_name.to_string(),
        x,
        y,
        properties: properties.clone(),
    })
}

/// Lift every record's `properties` out of all groups and sort row-major.
///
/// All groups are scanned, `headers` included. Ties on `(Y, X)` keep
/// document order.
pub fn flatten_and_sort(document: &Value) -> Result<Vec<SpecCellRecord>, ReshapeError> {
    let dict_groups = derive_group_map(document)?;

    let mut l_records = Vec::new();
    for (c_group, v_group) in dict_groups {
        for (n_idx, entry) in derive_group_entries(c_group, v_group)?.iter().enumerate() {
            l_records.push(derive_cell_record(c_group, n_idx, entry)?);
        }
    }

    l_records.sort_by_key(|record| (record.y, record.x));
    Ok(l_records)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GridLayout

/// Move a trailing minus to the front: `"12-"` -> `"-12"`.
pub fn normalize_trailing_minus(value: &str) -> Cow<'_, str> {
    match value.strip_suffix('-') {
        Some(c_body) => Cow::Owned(format!("-{c_body}")),
        None => Cow::Borrowed(value),
    }
}

/// Write `records[..n_headers]` into row 1, one column each.
///
/// Column width is the label length scaled by [`N_RATIO_HEADER_WIDTH`].
pub fn render_header_row(
    grid: &mut SpecSheetGrid,
    n_headers: usize,
    records: &[SpecCellRecord],
    field: &str,
    if_bold: bool,
) -> Result<(), ReshapeError> {
    if n_headers > records.len() {
        return Err(ReshapeError::Index {
            requested: n_headers,
            available: records.len(),
        });
    }

    for (n_idx, record) in records.iter().take(n_headers).enumerate() {
        let value = EnumCellValue::from_json(record.field(field)?);
        let n_width = (value.to_string().chars().count() as f64 * N_RATIO_HEADER_WIDTH).trunc();

        grid.set_cell(1, n_idx + 1, value, if_bold);
        grid.set_column_width(n_idx + 1, n_width);
    }
    Ok(())
}

/// Lay `records` out row-major under the header, `n_width` cells per row.
///
/// String values go through [`normalize_trailing_minus`]. A short last row
/// is left short.
pub fn render_value_grid(
    grid: &mut SpecSheetGrid,
    n_width: usize,
    records: &[SpecCellRecord],
    field: &str,
) -> Result<(), ReshapeError> {
    if records.is_empty() {
        return Ok(());
    }
    if n_width == 0 {
        return Err(ReshapeError::ZeroWidth);
    }

    for (n_idx, record) in records.iter().enumerate() {
        let value = match record.field(field)? {
            Value::String(s) => EnumCellValue::String(normalize_trailing_minus(s).into_owned()),
            other => EnumCellValue::from_json(other),
        };
        grid.set_cell(n_idx / n_width + 2, n_idx % n_width + 1, value, false);
    }
    Ok(())
}

/// Full document layout: flatten, split at the header count, render both parts.
///
/// Returns the grid with the header and value counts.
pub fn plan_sheet_grid(
    document: &Value,
    options: &SpecXlsxWriteOptions,
) -> Result<(SpecSheetGrid, usize, usize), ReshapeError> {
    let l_records = flatten_and_sort(document)?;
    let n_headers = count_headers(document)?;

    let mut grid = SpecSheetGrid::new();
    render_header_row(
        &mut grid,
        n_headers,
        &l_records,
        &options.field_header,
        options.if_bold_header,
    )?;

    let l_values = &l_records[n_headers..];
    render_value_grid(&mut grid, n_headers, l_values, &options.field_value)?;

    Ok((grid, n_headers, l_values.len()))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
