use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, Xlsx};

use super::model::{Cell, Column, ColumnKind, Table};

/// Raised for an upload whose extension is neither `csv` nor `xlsx`.
#[derive(Debug, thiserror::Error)]
#[error("Unsupported file format: .{extension}")]
pub struct UnsupportedFormat {
    pub extension: String,
}

/// Extensions offered by the uploader.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "xlsx"];

/// Tokens read as a missing cell in CSV input.
const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A", "#NA",
    "<NA>",
];

const TRUE_TOKENS: &[&str] = &["True", "TRUE", "true"];
const FALSE_TOKENS: &[&str] = &["False", "FALSE", "false"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a table from a file on disk.
pub fn load_file(path: &Path) -> Result<Table> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    load_upload(name, &bytes)
}

/// Parse an uploaded blob. Dispatch by the extension of `name`.
///
/// Supported formats:
/// * `.csv`  – header row followed by records
/// * `.xlsx` – first worksheet, first row is the header
///
/// Boolean columns come back as text so later statistics treat them as
/// categorical.
pub fn load_upload(name: &str, bytes: &[u8]) -> Result<Table> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut table = match ext.as_str() {
        "csv" => load_csv(bytes).context("decoding CSV")?,
        "xlsx" => load_xlsx(bytes).context("decoding Excel workbook")?,
        other => {
            return Err(UnsupportedFormat {
                extension: other.to_string(),
            }
            .into());
        }
    };
    table.normalize_bool_columns();
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Rows shorter than the header are padded with missing cells; longer rows
/// are rejected.
fn load_csv(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        bail!("No columns to parse from file");
    }
    let names = unique_column_names(headers);
    let n_cols = names.len();

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); n_cols];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > n_cols {
            let line = record.position().map_or(row_no as u64 + 2, |p| p.line());
            bail!("Expected {n_cols} fields in line {line}, saw {}", record.len());
        }
        for (col_idx, column) in raw.iter_mut().enumerate() {
            let value = record
                .get(col_idx)
                .filter(|v| !MISSING_TOKENS.contains(v))
                .map(str::to_string);
            column.push(value);
        }
    }

    let columns = names
        .into_iter()
        .zip(raw)
        .map(|(name, values)| infer_text_column(name, values))
        .collect();
    Ok(Table::from_columns(columns))
}

/// Pick the narrowest type every present value fits.
fn infer_text_column(name: String, values: Vec<Option<String>>) -> Column {
    let present = || values.iter().flatten().map(|s| s.trim());
    let has_missing = values.iter().any(Option::is_none);

    if present().next().is_none() {
        let cells = vec![Cell::Null; values.len()];
        return Column::new(name, ColumnKind::Float, cells);
    }

    if present().all(|s| s.parse::<i64>().is_ok()) {
        let (kind, cells) = if has_missing {
            let cells = map_present(&values, |s| {
                Cell::Float(s.trim().parse::<f64>().unwrap_or(f64::NAN))
            });
            (ColumnKind::Float, cells)
        } else {
            let cells = map_present(&values, |s| {
                Cell::Integer(s.trim().parse().unwrap_or_default())
            });
            (ColumnKind::Integer, cells)
        };
        return Column::new(name, kind, cells);
    }

    if present().all(|s| s.parse::<f64>().is_ok()) {
        let cells = map_present(&values, |s| Cell::Float(s.trim().parse().unwrap_or(f64::NAN)));
        return Column::new(name, ColumnKind::Float, cells);
    }

    if present().all(|s| TRUE_TOKENS.contains(&s) || FALSE_TOKENS.contains(&s)) {
        let cells = map_present(&values, |s| Cell::Bool(TRUE_TOKENS.contains(&s.trim())));
        return Column::new(name, ColumnKind::Bool, cells);
    }

    let cells = map_present(&values, |s| Cell::Text(s.to_string()));
    Column::new(name, ColumnKind::Text, cells)
}

fn map_present(values: &[Option<String>], f: impl Fn(&str) -> Cell) -> Vec<Cell> {
    values
        .iter()
        .map(|v| v.as_deref().map_or(Cell::Null, &f))
        .collect()
}

// ---------------------------------------------------------------------------
// XLSX loader
// ---------------------------------------------------------------------------

fn load_xlsx(bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        bail!("No columns to parse from file");
    };
    let names = unique_column_names(header_row.iter().map(header_text).collect());

    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (col_idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get(col_idx).map_or(Cell::Null, workbook_cell));
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| infer_cell_column(name, cells))
        .collect();
    Ok(Table::from_columns(columns))
}

fn header_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(d) => d.as_f64().to_string(),
        Data::Error(e) => format!("{e:?}"),
    }
}

fn workbook_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Null,
        Data::String(s) if s.is_empty() => Cell::Null,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Integer(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(d) => match d.as_datetime() {
            Some(dt) => Cell::DateTime(dt.to_string()),
            None => Cell::Float(d.as_f64()),
        },
        Data::DateTimeIso(s) => Cell::DateTime(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Settle the type of a workbook column; mixed columns become text.
fn infer_cell_column(name: String, cells: Vec<Cell>) -> Column {
    let present = || cells.iter().filter(|c| !c.is_null());
    let has_missing = cells.iter().any(Cell::is_null);

    if present().next().is_none() {
        return Column::new(name, ColumnKind::Float, cells);
    }

    if present().all(|c| c.as_f64().is_some()) {
        let integral = present().all(|c| match c {
            Cell::Integer(_) => true,
            Cell::Float(f) => f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64,
            _ => false,
        });
        let (kind, cells) = if integral && !has_missing {
            let cells = cells
                .into_iter()
                .map(|c| match c {
                    Cell::Float(f) => Cell::Integer(f as i64),
                    other => other,
                })
                .collect();
            (ColumnKind::Integer, cells)
        } else {
            let cells = cells
                .into_iter()
                .map(|c| c.as_f64().map_or(Cell::Null, Cell::Float))
                .collect();
            (ColumnKind::Float, cells)
        };
        return Column::new(name, kind, cells);
    }

    if present().all(|c| matches!(c, Cell::Bool(_))) {
        return Column::new(name, ColumnKind::Bool, cells);
    }

    if present().all(|c| matches!(c, Cell::DateTime(_))) {
        return Column::new(name, ColumnKind::DateTime, cells);
    }

    let cells = cells
        .into_iter()
        .map(|c| match c {
            Cell::Null | Cell::Text(_) => c,
            Cell::Float(f) => Cell::Text(f.to_string()),
            other => Cell::Text(other.to_string()),
        })
        .collect();
    Column::new(name, ColumnKind::Text, cells)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Blank names become `column_<n>`; repeats get a `_2`, `_3`, … suffix.
fn unique_column_names(raw: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());
    for (idx, raw_name) in raw.into_iter().enumerate() {
        let mut name = raw_name.trim().to_string();
        if name.is_empty() {
            name = format!("column_{}", idx + 1);
        }
        if used.contains(&name) {
            let base = name.clone();
            let mut suffix = 2usize;
            while used.contains(&format!("{base}_{suffix}")) {
                suffix += 1;
            }
            name = format!("{base}_{suffix}");
        }
        used.insert(name.clone());
        names.push(name);
    }
    names
}
