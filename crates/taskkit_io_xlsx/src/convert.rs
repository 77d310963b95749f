//! Directory batch: every matching JSON document becomes one worksheet.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::conf::{EnumFmtKey, derive_default_xlsx_format};
use crate::spec::{ConvertError, SpecConvertOptions, SpecXlsxReport};
use crate::util::{compile_input_pattern, derive_file_name, derive_sheet_name_from_file_name};
use crate::writer::XlsxWriter;

/// List regular files in `dir_input` whose base name matches `pattern`,
/// sorted by name. Not recursive.
pub fn list_input_documents(
    dir_input: &Path,
    pattern: &str,
) -> Result<Vec<PathBuf>, ConvertError> {
    if !dir_input.is_dir() {
        return Err(ConvertError::InputNotDirectory(dir_input.to_path_buf()));
    }
    let matcher = compile_input_pattern(pattern)?;

    let read_dir = fs::read_dir(dir_input).map_err(|source| ConvertError::Io {
        path: dir_input.to_path_buf(),
        source,
    })?;

    let mut l_paths = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| ConvertError::Io {
            path: dir_input.to_path_buf(),
            source,
        })?;
        let path_entry = entry.path();
        if !path_entry.is_file() {
            continue;
        }
        match derive_file_name(&path_entry) {
            Some(c_name) if matcher.is_match(c_name) => l_paths.push(path_entry),
            Some(_) => {}
            None => tracing::warn!(path = %path_entry.display(), "skipping non UTF-8 file name"),
        }
    }

    l_paths.sort();
    Ok(l_paths)
}

fn read_document(path: &Path) -> Result<Value, ConvertError> {
    let c_text = fs::read_to_string(path).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&c_text).map_err(|source| ConvertError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert every matching document in `options.dir_input` into one workbook.
///
/// Documents are processed one at a time in file-name order. The first
/// failing document aborts the batch and nothing is saved. With no matching
/// documents nothing is written and the report has `file_out == None`.
pub fn convert_json_dir_to_xlsx(
    options: &SpecConvertOptions,
) -> Result<SpecXlsxReport, ConvertError> {
    let l_paths = list_input_documents(&options.dir_input, &options.pattern_input)?;
    if l_paths.is_empty() {
        tracing::warn!(
            dir = %options.dir_input.display(),
            pattern = %options.pattern_input,
            "no input documents found; workbook not written"
        );
        let mut report = SpecXlsxReport::default();
        report.warn("No input documents found.");
        return Ok(report);
    }

    let mut writer = XlsxWriter::new(
        options.file_out.clone(),
        derive_default_xlsx_format(EnumFmtKey::Header),
        derive_default_xlsx_format(EnumFmtKey::Value),
        options.write_options.clone(),
    );

    for path_doc in &l_paths {
        let document = read_document(path_doc)?;
        let c_sheet_name =
            derive_sheet_name_from_file_name(derive_file_name(path_doc).unwrap_or_default());

        let c_sheet_name_unique = writer
            .write_sheet_from_document(&document, &c_sheet_name)
            .map_err(|source| ConvertError::Document {
                path: path_doc.clone(),
                source,
            })?;
        tracing::info!(
            file = %path_doc.display(),
            sheet = %c_sheet_name_unique,
            "document converted"
        );
    }

    writer.close().map_err(|source| ConvertError::Save {
        path: options.file_out.clone(),
        source,
    })?;
    tracing::info!(
        file_out = %writer.file_out(),
        n_sheets = writer.sheet_count(),
        "workbook saved"
    );

    Ok(writer.report())
}

#[cfg(test)]
mod tests {
    use calamine::{Data, Reader, Xlsx, open_workbook};
    use serde_json::json;

    use super::*;

    fn write_json(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), value.to_string()).unwrap();
    }

    fn build_options(dir: &Path) -> SpecConvertOptions {
        SpecConvertOptions {
            dir_input: dir.to_path_buf(),
            file_out: dir.join("converted.xlsx"),
            ..SpecConvertOptions::default()
        }
    }

    #[test]
    fn test_two_documents_make_two_sheets() {
        let tmp = tempfile::tempdir().unwrap();
        write_json(
            tmp.path(),
            "beta.json",
            &json!({
                "headers": [{"properties": {"X": 1, "Y": 1, "QuickInfo": "Name"}}],
                "rows": [{"properties": {"X": 1, "Y": 2, "Text": "42-"}}]
            }),
        );
        write_json(
            tmp.path(),
            "alpha.json",
            &json!({
                "headers": [
                    {"properties": {"X": "2", "Y": "1", "QuickInfo": "B"}},
                    {"properties": {"X": "1", "Y": "1", "QuickInfo": "A"}}
                ],
                "values": [
                    {"properties": {"X": "2", "Y": "2", "Text": 7}},
                    {"properties": {"X": "1", "Y": "2", "Text": "x"}}
                ]
            }),
        );
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let options = build_options(tmp.path());
        let report = convert_json_dir_to_xlsx(&options).unwrap();

        assert_eq!(report.file_out.as_deref(), Some(options.file_out.as_path()));
        assert_eq!(report.sheets.len(), 2);

        let mut workbook: Xlsx<_> = open_workbook(&options.file_out).unwrap();
        assert_eq!(
            workbook.sheet_names(),
            vec!["alpha".to_string(), "beta".to_string()]
        );

        let range = workbook.worksheet_range("beta").unwrap();
        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("Name".to_string()))
        );
        assert_eq!(
            range.get_value((1, 0)),
            Some(&Data::String("-42".to_string()))
        );

        let range = workbook.worksheet_range("alpha").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("A".to_string())));
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("B".to_string())));
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("x".to_string())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Float(7.0)));
    }

    #[test]
    fn test_file_names_excel_would_reject_still_convert() {
        let tmp = tempfile::tempdir().unwrap();
        let document = json!({"headers": [{"properties": {"X": 1, "Y": 1, "QuickInfo": "A"}}]});
        for name in ["Data.json", "data.json", "'q'.json"] {
            write_json(tmp.path(), name, &document);
        }

        let options = build_options(tmp.path());
        let report = convert_json_dir_to_xlsx(&options).unwrap();
        assert_eq!(report.sheets.len(), 3);

        let workbook: Xlsx<_> = open_workbook(&options.file_out).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["q", "Data", "data__2"]);
    }

    #[test]
    fn test_malformed_document_aborts_batch() {
        let tmp = tempfile::tempdir().unwrap();
        write_json(
            tmp.path(),
            "a_ok.json",
            &json!({"headers": [{"properties": {"X": 1, "Y": 1, "QuickInfo": "A"}}]}),
        );
        write_json(
            tmp.path(),
            "b_broken.json",
            &json!({"rows": [{"properties": {"X": 1, "Y": 2, "Text": "1"}}]}),
        );

        let options = build_options(tmp.path());
        let err = convert_json_dir_to_xlsx(&options).unwrap_err();

        assert_eq!(err.category(), "missing-key");
        assert!(matches!(
            err,
            ConvertError::Document { ref path, .. } if path.ends_with("b_broken.json")
        ));
        assert!(!options.file_out.exists());
    }

    #[test]
    fn test_invalid_json_aborts_batch() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("bad.json"), "{not json").unwrap();

        let options = build_options(tmp.path());
        let err = convert_json_dir_to_xlsx(&options).unwrap_err();
        assert!(matches!(err, ConvertError::Json { .. }));
        assert!(!options.file_out.exists());
    }

    #[test]
    fn test_no_documents_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let options = build_options(tmp.path());

        let report = convert_json_dir_to_xlsx(&options).unwrap();
        assert!(report.file_out.is_none());
        assert_eq!(report.warnings.len(), 1);
        assert!(!options.file_out.exists());
    }

    #[test]
    fn test_list_input_documents_filters_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["c.json", "a.json", "b.JSON", "d.json.bak"] {
            fs::write(tmp.path().join(name), "{}").unwrap();
        }
        fs::create_dir(tmp.path().join("dir.json")).unwrap();

        let l_names: Vec<String> = list_input_documents(tmp.path(), "*.json")
            .unwrap()
            .iter()
            .filter_map(|path| derive_file_name(path).map(ToString::to_string))
            .collect();
        assert_eq!(l_names, vec!["a.json", "c.json"]);
    }

    #[test]
    fn test_input_must_be_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let err = list_input_documents(&tmp.path().join("missing"), "*.json").unwrap_err();
        assert!(matches!(err, ConvertError::InputNotDirectory(_)));
        assert_eq!(err.category(), "config");
    }
}
