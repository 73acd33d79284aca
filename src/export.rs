// ============================================================================
// Result Export
// ============================================================================
//
// Turns a result set into a spreadsheet-friendly CSV document:
//
//   - UTF-8 with a leading byte-order mark so spreadsheet apps detect the
//     encoding of non-ASCII text
//   - header row "Request,Model,Response", then one row per result in
//     result-set order
//   - fields are quoted whenever they contain a delimiter, quote or newline
//   - file name "summary_YYYYMMDDHHmmss.csv" from the local wall clock
//
// ============================================================================

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::aggregator::ResultSet;
use crate::error::AppResult;
use crate::metrics;

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const HEADER: [&str; 3] = ["Request", "Model", "Response"];
const FILENAME_PREFIX: &str = "summary_";
const FILENAME_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvRow {
    #[serde(rename = "Request")]
    pub request: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Response")]
    pub response: String,
}

/// A rendered export ready to be handed to the user
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// One row per result; the submitted content is repeated on every row
pub fn to_csv_rows(content: &str, results: &ResultSet) -> Vec<CsvRow> {
    results
        .iter()
        .map(|result| CsvRow {
            request: content.to_string(),
            model: result.model.clone(),
            response: result.response_text().to_string(),
        })
        .collect()
}

/// Serialize rows to CSV bytes, BOM first. The header is always present.
pub fn render_csv(rows: &[CsvRow]) -> AppResult<Vec<u8>> {
    let mut buffer = UTF8_BOM.to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buffer);
        writer.write_record(HEADER)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

/// `summary_YYYYMMDDHHmmss.csv` for the given instant, in its own timezone
pub fn export_filename<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}{}.csv", FILENAME_PREFIX, now.format(FILENAME_TIME_FORMAT))
}

/// Render a complete export for `content` and its results
pub fn export<Tz: TimeZone>(
    content: &str,
    results: &ResultSet,
    now: &DateTime<Tz>,
) -> AppResult<CsvExport>
where
    Tz::Offset: std::fmt::Display,
{
    let rows = to_csv_rows(content, results);
    let bytes = render_csv(&rows)?;
    let filename = export_filename(now);

    metrics::EXPORTS_TOTAL.inc();
    tracing::info!(rows = rows.len(), filename = %filename, "CSV export rendered");

    Ok(CsvExport { filename, bytes })
}
