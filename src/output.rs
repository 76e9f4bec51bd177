//! Writing result rows: CSV files and stdout renderings.

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::models::ResultRow;
use crate::utils::truncate_with_ellipsis;

const TITLE_WIDTH: usize = 50;
const LIST_WIDTH: usize = 40;

/// Errors writing or reading result rows
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write rows as CSV.
///
/// The header row is always written, so an empty result set produces a
/// header-only file.
pub fn write_csv<W: Write>(writer: W, rows: &[ResultRow]) -> Result<(), OutputError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(ResultRow::HEADERS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write rows as CSV
pub fn write_csv_file(path: &Path, rows: &[ResultRow]) -> Result<(), OutputError> {
    let file = File::create(path)?;
    write_csv(file, rows)
}

/// Read rows back from CSV written by [`write_csv`]
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ResultRow>, OutputError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let rows = csv_reader
        .deserialize()
        .collect::<Result<Vec<ResultRow>, csv::Error>>()?;
    Ok(rows)
}

/// Pretty-printed JSON array
pub fn render_json(rows: &[ResultRow]) -> Result<String, OutputError> {
    Ok(serde_json::to_string_pretty(rows)?)
}

/// One "Header: value" block per row
pub fn render_plain(rows: &[ResultRow]) -> String {
    let mut out = String::new();
    for row in rows {
        for (header, value) in ResultRow::HEADERS.iter().zip(row.fields()) {
            out.push_str(header);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Human-readable table with long fields truncated
pub fn render_table(rows: &[ResultRow]) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "PMID",
            "Title",
            "Date",
            "Non-academic Author(s)",
            "Affiliation(s)",
            "Email",
        ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.pubmed_id),
            Cell::new(truncate_with_ellipsis(&row.title, TITLE_WIDTH)).add_attribute(Attribute::Bold),
            Cell::new(&row.publication_date),
            Cell::new(truncate_with_ellipsis(&row.non_academic_authors, LIST_WIDTH)),
            Cell::new(truncate_with_ellipsis(&row.company_affiliations, LIST_WIDTH)),
            Cell::new(&row.corresponding_email),
        ]);
    }

    table.to_string()
}
