use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde::Deserialize;
use thiserror::Error;

/// One row of an uploaded score sheet, shaped down to the two columns this
/// pipeline consumes. Intake trims surrounding whitespace from every cell
/// (padding is an export artifact, not part of the value); beyond that, values
/// are passed through verbatim — emptiness and malformed content are handled
/// downstream so a bad row never aborts intake, and the beneficiary lookup
/// matches the trimmed identity string exactly as it appears here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoreSheetRow {
    #[serde(
        rename = "National ID",
        alias = "national_id",
        alias = "\u{627}\u{644}\u{631}\u{642}\u{645} \u{627}\u{644}\u{648}\u{637}\u{646}\u{64a}",
        default
    )]
    pub national_id: String,
    #[serde(
        rename = "Result",
        alias = "result",
        alias = "\u{627}\u{644}\u{646}\u{62a}\u{64a}\u{62c}\u{629}",
        default
    )]
    pub raw_score: String,
}

/// Header labels fixed by the external form template. The survey tool exports
/// either the Arabic or the English variant depending on the operator locale.
const NATIONAL_ID_HEADERS: &[&str] = &[
    "national id",
    "national_id",
    "\u{627}\u{644}\u{631}\u{642}\u{645} \u{627}\u{644}\u{648}\u{637}\u{646}\u{64a}",
];
const RESULT_HEADERS: &[&str] = &[
    "result",
    "\u{627}\u{644}\u{646}\u{62a}\u{64a}\u{62c}\u{629}",
];

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to read score sheet: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV score sheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook has no worksheet")]
    NoWorksheet,
    #[error("worksheet has no header row")]
    NoHeaderRow,
}

/// Read every row of a CSV export. The returned vector is the finite,
/// restartable row sequence the import task iterates.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ScoreSheetRow>, SheetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<ScoreSheetRow>() {
        rows.push(record?);
    }

    Ok(rows)
}

/// Read every row of the first worksheet of an `.xlsx` export.
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Vec<ScoreSheetRow>, SheetError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoWorksheet)??;

    let mut row_iter = range.rows();
    let header = row_iter.next().ok_or(SheetError::NoHeaderRow)?;

    let national_id_column = find_column(header, NATIONAL_ID_HEADERS);
    let result_column = find_column(header, RESULT_HEADERS);

    let rows = row_iter
        .map(|cells| ScoreSheetRow {
            national_id: cell_text(cells, national_id_column),
            raw_score: cell_text(cells, result_column),
        })
        .collect();

    Ok(rows)
}

/// Dispatch on the file extension; anything that is not `.xlsx` is treated as
/// CSV, the survey tool's default export format.
pub fn read_path<P: AsRef<Path>>(path: P) -> Result<Vec<ScoreSheetRow>, SheetError> {
    let path = path.as_ref();
    let is_xlsx = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false);

    if is_xlsx {
        read_workbook(path)
    } else {
        let file = std::fs::File::open(path)?;
        read_csv(file)
    }
}

fn find_column(header: &[Data], labels: &[&str]) -> Option<usize> {
    header.iter().position(|cell| {
        let text = cell_to_string(cell);
        let trimmed = text.trim().trim_start_matches('\u{feff}');
        labels
            .iter()
            .any(|label| trimmed.eq_ignore_ascii_case(label))
    })
}

fn cell_text(cells: &[Data], column: Option<usize>) -> String {
    column
        .and_then(|index| cells.get(index))
        .map(cell_to_string)
        .unwrap_or_default()
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.trim().to_string(),
        Data::Int(value) => value.to_string(),
        // Spreadsheet tools coerce numeric-looking identifiers to floats;
        // render whole numbers without a fractional part.
        Data::Float(value) if value.fract() == 0.0 => format!("{}", *value as i64),
        Data::Float(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_rows_with_english_headers() {
        let rows = read_csv(Cursor::new(
            "National ID,Result\n1234567890,35/100\n9876543210,70/100\n",
        ))
        .expect("csv parses");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].national_id, "1234567890");
        assert_eq!(rows[0].raw_score, "35/100");
        assert_eq!(rows[1].raw_score, "70/100");
    }

    #[test]
    fn reads_rows_with_arabic_headers() {
        let csv = format!(
            "{},{}\n1234567890,12/20\n",
            "\u{627}\u{644}\u{631}\u{642}\u{645} \u{627}\u{644}\u{648}\u{637}\u{646}\u{64a}",
            "\u{627}\u{644}\u{646}\u{62a}\u{64a}\u{62c}\u{629}"
        );
        let rows = read_csv(Cursor::new(csv)).expect("csv parses");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].national_id, "1234567890");
        assert_eq!(rows[0].raw_score, "12/20");
    }

    #[test]
    fn intake_trims_padded_cells() {
        let rows = read_csv(Cursor::new(
            "National ID,Result\n 1000000001 , 35/100 \n",
        ))
        .expect("csv parses");

        assert_eq!(rows[0].national_id, "1000000001");
        assert_eq!(rows[0].raw_score, "35/100");
    }

    #[test]
    fn missing_values_pass_through_as_empty_strings() {
        let rows = read_csv(Cursor::new("National ID,Result\n,\n1234567890,\n"))
            .expect("csv parses");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].national_id, "");
        assert_eq!(rows[0].raw_score, "");
        assert_eq!(rows[1].national_id, "1234567890");
        assert_eq!(rows[1].raw_score, "");
    }

    #[test]
    fn missing_columns_pass_through_as_empty_strings() {
        let rows =
            read_csv(Cursor::new("National ID\n1234567890\n")).expect("csv parses");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].national_id, "1234567890");
        assert_eq!(rows[0].raw_score, "");
    }

    #[test]
    fn read_path_propagates_io_errors() {
        let error = read_path("./does-not-exist.csv").expect_err("expected io error");
        assert!(matches!(error, SheetError::Io(_)));
    }
}
