//! Export of checked documents as result sheets.
//!
//! Each input document yields two sheets, `image_status` and `pdf_status`,
//! with columns `Model_name, URL, Status`. By default both sheets go into
//! one `<source>_results.xlsx` workbook; CSV output writes them as separate
//! files in a `<source>_results` directory instead. The files of a run can
//! then be bundled into `all_results.zip`.

use crate::aggregate::{ResultColumns, StatusTally};
use crate::error::UrlCheckError;
use crate::types::UrlCategory;
use crate::Result;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Column headers shared by both sheets.
pub const SHEET_HEADERS: [&str; 3] = ["Model_name", "URL", "Status"];

/// File name of the archive produced by [`bundle_results`].
pub const BUNDLE_NAME: &str = "all_results.zip";

/// Workbook column widths for label, URL and status.
const COLUMN_WIDTHS: [f64; 3] = [20.0, 60.0, 36.0];

/// Results for one input document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReport {
    /// File stem of the input document
    pub source: String,
    pub image_status: ResultColumns,
    pub pdf_status: ResultColumns,
}

impl DocumentReport {
    pub fn new<S: Into<String>>(source: S) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn sheet(&self, category: UrlCategory) -> &ResultColumns {
        match category {
            UrlCategory::Image => &self.image_status,
            UrlCategory::Attachment => &self.pdf_status,
        }
    }

    pub fn sheet_mut(&mut self, category: UrlCategory) -> &mut ResultColumns {
        match category {
            UrlCategory::Image => &mut self.image_status,
            UrlCategory::Attachment => &mut self.pdf_status,
        }
    }

    /// Combined tally over both sheets.
    pub fn tally(&self) -> StatusTally {
        let mut tally = self.image_status.tally();
        tally.merge(&self.pdf_status.tally());
        tally
    }
}

/// File format for result sheets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One workbook per document with a worksheet per sheet
    #[default]
    Xlsx,
    /// One CSV file per sheet
    Csv,
}

/// Options controlling how sheets are written.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory that receives the results of every document
    pub output_dir: PathBuf,
    /// Write the `Model_name,URL,Status` header row
    pub headers: bool,
    pub format: ExportFormat,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            headers: true,
            format: ExportFormat::Xlsx,
        }
    }
}

/// Write one sheet as CSV.
pub fn write_sheet<W: Write>(
    writer: &mut W,
    columns: &ResultColumns,
    headers: bool,
) -> io::Result<()> {
    if headers {
        writeln!(writer, "{}", SHEET_HEADERS.join(","))?;
    }

    for (label, url, status) in columns.rows() {
        writeln!(
            writer,
            "{},{},{}",
            csv_field(label),
            csv_field(url),
            csv_field(&status.to_string())
        )?;
    }

    Ok(())
}

/// Write both sheets of a report and return the files created.
///
/// # Errors
///
/// Returns `UrlCheckError::FileError` if the output directory, the
/// workbook or a CSV sheet cannot be written.
pub fn save_report(report: &DocumentReport, options: &ExportOptions) -> Result<Vec<PathBuf>> {
    let written = match options.format {
        ExportFormat::Xlsx => {
            create_dir(&options.output_dir)?;
            let path = workbook_path(&options.output_dir, &report.source);
            write_workbook(&path, report, options.headers)?;
            vec![path]
        }
        ExportFormat::Csv => {
            let dir = report_dir(&options.output_dir, &report.source);
            create_dir(&dir)?;

            let mut written = Vec::with_capacity(2);
            for category in [UrlCategory::Image, UrlCategory::Attachment] {
                let path = dir.join(format!("{}.csv", category.sheet_name()));
                write_sheet_file(&path, report.sheet(category), options.headers)?;
                written.push(path);
            }
            written
        }
    };

    tracing::info!(source = %report.source, files = written.len(), "results saved");
    Ok(written)
}

/// Workbook path for one document.
pub fn workbook_path(output_dir: &Path, source: &str) -> PathBuf {
    output_dir.join(format!("{}_results.xlsx", source))
}

/// Directory holding the CSV sheets for one document.
pub fn report_dir(output_dir: &Path, source: &str) -> PathBuf {
    output_dir.join(format!("{}_results", source))
}

/// Write both sheets of a report into one xlsx workbook.
pub fn write_workbook(path: &Path, report: &DocumentReport, headers: bool) -> Result<()> {
    let to_error = |e: XlsxError| {
        UrlCheckError::file_error(path.to_string_lossy(), format!("Failed to write workbook: {}", e))
    };

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for category in [UrlCategory::Image, UrlCategory::Attachment] {
        let worksheet = workbook.add_worksheet();
        fill_worksheet(
            worksheet,
            category.sheet_name(),
            report.sheet(category),
            headers.then_some(&header_format),
        )
        .map_err(to_error)?;
    }

    workbook.save(path).map_err(to_error)
}

fn fill_worksheet(
    worksheet: &mut Worksheet,
    name: &str,
    columns: &ResultColumns,
    header_format: Option<&Format>,
) -> std::result::Result<(), XlsxError> {
    worksheet.set_name(name)?;

    let mut row = 0;
    if let Some(format) = header_format {
        for (col, header) in (0u16..).zip(SHEET_HEADERS) {
            worksheet.write_string_with_format(row, col, header, format)?;
        }
        row += 1;
    }

    for (label, url, status) in columns.rows() {
        // Entities without a model name get an empty cell
        if !label.is_empty() {
            worksheet.write_string(row, 0, label)?;
        }
        worksheet.write_string(row, 1, url)?;
        worksheet.write_string(row, 2, &status.to_string())?;
        row += 1;
    }

    for (col, width) in (0u16..).zip(COLUMN_WIDTHS) {
        worksheet.set_column_width(col, width)?;
    }

    Ok(())
}

/// Pack result files into `<output_dir>/all_results.zip`.
///
/// Entries are named by their path relative to `output_dir`, so CSV sheets
/// keep their `<source>_results/` directory inside the archive.
///
/// # Errors
///
/// Returns `UrlCheckError::FileError` if the archive cannot be created or
/// a result file cannot be read.
pub fn bundle_results(output_dir: &Path, files: &[PathBuf]) -> Result<PathBuf> {
    let archive_path = output_dir.join(BUNDLE_NAME);
    let to_error = |message: String| UrlCheckError::file_error(archive_path.to_string_lossy(), message);

    let archive_file = fs::File::create(&archive_path)
        .map_err(|e| to_error(format!("Failed to create archive: {}", e)))?;
    let mut archive = ZipWriter::new(archive_file);

    for path in files {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        archive
            .start_file(entry_name(output_dir, path), options)
            .map_err(|e| to_error(format!("Failed to add {}: {}", path.display(), e)))?;

        let mut source = fs::File::open(path).map_err(|e| {
            UrlCheckError::file_error(path.to_string_lossy(), format!("Failed to read result file: {}", e))
        })?;
        io::copy(&mut source, &mut archive)
            .map_err(|e| to_error(format!("Failed to add {}: {}", path.display(), e)))?;
    }

    archive
        .finish()
        .map_err(|e| to_error(format!("Failed to finish archive: {}", e)))?;

    tracing::info!(path = %archive_path.display(), files = files.len(), "results bundled");
    Ok(archive_path)
}

/// Archive entry name for a result file, with `/` separators.
fn entry_name(output_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(output_dir).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        UrlCheckError::file_error(
            dir.to_string_lossy(),
            format!("Failed to create output directory: {}", e),
        )
    })
}

fn write_sheet_file(path: &Path, columns: &ResultColumns, headers: bool) -> Result<()> {
    let to_error = |e: io::Error| {
        UrlCheckError::file_error(path.to_string_lossy(), format!("Failed to write sheet: {}", e))
    };

    let file = fs::File::create(path).map_err(to_error)?;
    let mut writer = io::BufWriter::new(file);
    write_sheet(&mut writer, columns, headers).map_err(to_error)?;
    writer.flush().map_err(to_error)
}

/// Quote a field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CheckResult, StatusValue, UrlTask};
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn sample_report() -> DocumentReport {
        let mut report = DocumentReport::new("catalog");
        report.image_status = ResultColumns::collect(vec![
            CheckResult::new(UrlTask::new("http://x/a.jpg", "M1"), StatusValue::Working),
            CheckResult::new(
                UrlTask::new("http://x/b.jpg", "M1"),
                StatusValue::NotWorking(404),
            ),
        ]);
        report.pdf_status = ResultColumns::collect(vec![CheckResult::new(
            UrlTask::new("http://x/c.pdf", "M2, rev \"B\""),
            StatusValue::Failed("error sending request: Connection refused".to_string()),
        )]);
        report
    }

    fn options(dir: &TempDir, format: ExportFormat) -> ExportOptions {
        ExportOptions {
            output_dir: dir.path().to_path_buf(),
            headers: true,
            format,
        }
    }

    fn archive_entry(path: &Path, name: &str) -> String {
        let mut archive = ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        text
    }

    fn archive_names(path: &Path) -> Vec<String> {
        let archive = ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_write_sheet_with_headers() {
        let report = sample_report();
        let mut buffer = Vec::new();
        write_sheet(&mut buffer, &report.image_status, true).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "Model_name,URL,Status\n\
             M1,http://x/a.jpg,Working\n\
             M1,http://x/b.jpg,Not Working - Status Code: 404\n"
        );
    }

    #[test]
    fn test_write_sheet_without_headers() {
        let report = sample_report();
        let mut buffer = Vec::new();
        write_sheet(&mut buffer, &report.pdf_status, false).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "\"M2, rev \"\"B\"\"\",http://x/c.pdf,Failed - error sending request: Connection refused\n"
        );
    }

    #[test]
    fn test_empty_sheet_still_has_header() {
        let mut buffer = Vec::new();
        write_sheet(&mut buffer, &ResultColumns::default(), true).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "Model_name,URL,Status\n");
    }

    #[test]
    fn test_save_report_writes_workbook_with_both_sheets() {
        let dir = TempDir::new().unwrap();

        let written = save_report(&sample_report(), &options(&dir, ExportFormat::Xlsx)).unwrap();
        let workbook = dir.path().join("catalog_results.xlsx");
        assert_eq!(written, vec![workbook.clone()]);

        let sheets = archive_entry(&workbook, "xl/workbook.xml");
        let image_at = sheets.find(r#"name="image_status""#).unwrap();
        let pdf_at = sheets.find(r#"name="pdf_status""#).unwrap();
        assert!(image_at < pdf_at);

        let strings = archive_entry(&workbook, "xl/sharedStrings.xml");
        for expected in ["Model_name", "URL", "Status", "http://x/b.jpg", "Not Working - Status Code: 404"] {
            assert!(strings.contains(expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_workbook_without_headers() {
        let dir = TempDir::new().unwrap();
        let mut options = options(&dir, ExportFormat::Xlsx);
        options.headers = false;

        save_report(&sample_report(), &options).unwrap();

        let strings = archive_entry(&dir.path().join("catalog_results.xlsx"), "xl/sharedStrings.xml");
        assert!(!strings.contains("Model_name"));
        assert!(strings.contains("http://x/a.jpg"));
    }

    #[test]
    fn test_empty_report_still_has_both_sheets() {
        let dir = TempDir::new().unwrap();
        save_report(&DocumentReport::new("empty"), &options(&dir, ExportFormat::Xlsx)).unwrap();

        let sheets = archive_entry(&dir.path().join("empty_results.xlsx"), "xl/workbook.xml");
        assert!(sheets.contains(r#"name="image_status""#));
        assert!(sheets.contains(r#"name="pdf_status""#));
    }

    #[test]
    fn test_save_report_writes_csv_sheets() {
        let dir = TempDir::new().unwrap();

        let written = save_report(&sample_report(), &options(&dir, ExportFormat::Csv)).unwrap();
        assert_eq!(written.len(), 2);

        let images = fs::read_to_string(dir.path().join("catalog_results/image_status.csv")).unwrap();
        assert_eq!(images.lines().count(), 3);

        let pdfs = fs::read_to_string(dir.path().join("catalog_results/pdf_status.csv")).unwrap();
        assert!(pdfs.contains("Failed - error sending request"));
    }

    #[test]
    fn test_save_report_fails_when_output_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("taken");
        fs::write(&blocker, "not a directory").unwrap();

        let options = ExportOptions {
            output_dir: blocker.join("results"),
            ..Default::default()
        };
        let err = save_report(&sample_report(), &options).unwrap_err();
        assert!(matches!(err, UrlCheckError::FileError { .. }));
    }

    #[test]
    fn test_bundle_contains_every_result_file() {
        let dir = TempDir::new().unwrap();
        let mut written = save_report(&sample_report(), &options(&dir, ExportFormat::Xlsx)).unwrap();
        written.extend(save_report(&DocumentReport::new("spares"), &options(&dir, ExportFormat::Csv)).unwrap());

        let archive = bundle_results(dir.path(), &written).unwrap();
        assert_eq!(archive, dir.path().join(BUNDLE_NAME));
        assert_eq!(
            archive_names(&archive),
            vec![
                "catalog_results.xlsx",
                "spares_results/image_status.csv",
                "spares_results/pdf_status.csv",
            ]
        );

        let csv = archive_entry(&archive, "spares_results/pdf_status.csv");
        assert_eq!(csv, "Model_name,URL,Status\n");
    }

    #[test]
    fn test_bundle_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone_results.xlsx");

        let err = bundle_results(dir.path(), &[missing]).unwrap_err();
        assert!(matches!(err, UrlCheckError::FileError { .. }));
    }

    #[test]
    fn test_entry_name_is_relative() {
        let base = Path::new("out");
        assert_eq!(entry_name(base, Path::new("out/a_results.xlsx")), "a_results.xlsx");
        assert_eq!(
            entry_name(base, Path::new("out/a_results/pdf_status.csv")),
            "a_results/pdf_status.csv"
        );
        assert_eq!(entry_name(Path::new("."), Path::new("./b_results.xlsx")), "b_results.xlsx");
    }

    #[test]
    fn test_report_tally_covers_both_sheets() {
        let tally = sample_report().tally();
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.working, 1);
        assert_eq!(tally.failed, 1);
    }

    #[test]
    fn test_report_json_shape() {
        let json = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(json["source"], "catalog");
        assert_eq!(json["image_status"]["labels"][0], "M1");
        assert_eq!(json["image_status"]["statuses"][1]["kind"], "not_working");
        assert_eq!(json["image_status"]["statuses"][1]["detail"], 404);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(serde_json::to_string(&ExportFormat::Xlsx).unwrap(), "\"xlsx\"");
        assert_eq!(
            serde_json::from_str::<ExportFormat>("\"csv\"").unwrap(),
            ExportFormat::Csv
        );
    }
}
