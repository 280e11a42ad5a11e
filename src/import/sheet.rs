//! Turns an uploaded spreadsheet into header-keyed rows.
//!
//! Workbooks (xlsx/xlsm/xlsb/xls/ods) go through calamine and only the first
//! sheet is read; CSV goes through the `csv` crate. The first row is the header.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("file is empty")]
    Empty,

    #[error("workbook has no sheets")]
    NoSheets,

    #[error("failed to read workbook: {0}")]
    Workbook(String),

    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),
}

/// A single cell as read from the sheet, before any normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text rendering for string-typed fields; integral numbers lose the `.0`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let t = s.trim();
                (!t.is_empty()).then(|| t.to_string())
            }
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            CellValue::Number(n) if n.is_finite() => Some(n.to_string()),
            CellValue::Number(_) => None,
            CellValue::Bool(b) => Some(b.to_string()),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// One data row keyed by trimmed header text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    /// 1-based row number in the source sheet (the header is row 1).
    pub row: usize,
    pub cells: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new(row: usize) -> Self {
        Self {
            row,
            cells: HashMap::new(),
        }
    }

    pub fn with(mut self, header: &str, value: impl Into<CellValue>) -> Self {
        self.cells.insert(header.to_string(), value.into());
        self
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.get(header)
    }

    fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_blank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Workbook,
    Csv,
}

impl SheetFormat {
    /// Picks the reader from the file name first, then the content type.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>) -> Self {
        let ext = file_name
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") | Some("txt") => return SheetFormat::Csv,
            Some("xlsx") | Some("xlsm") | Some("xlsb") | Some("xls") | Some("ods") => {
                return SheetFormat::Workbook
            }
            _ => {}
        }
        match content_type {
            Some(ct) if ct.starts_with("text/csv") || ct.starts_with("text/plain") => {
                SheetFormat::Csv
            }
            _ => SheetFormat::Workbook,
        }
    }
}

pub fn read_sheet(bytes: &[u8], format: SheetFormat) -> Result<Vec<RawRow>, SheetError> {
    if bytes.is_empty() {
        return Err(SheetError::Empty);
    }
    match format {
        SheetFormat::Workbook => read_workbook(bytes),
        SheetFormat::Csv => read_csv(bytes),
    }
}

fn read_workbook(bytes: &[u8]) -> Result<Vec<RawRow>, SheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| SheetError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoSheets)?
        .map_err(|e| SheetError::Workbook(e.to_string()))?;

    // ranges may not start at A1
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (idx, data_row) in rows.enumerate() {
        // header occupies first_row; data starts one below, 1-based
        let mut row = RawRow::new(first_row + idx + 2);
        for (col, cell) in data_row.iter().enumerate() {
            if let Some(header) = headers.get(col).filter(|h| !h.is_empty()) {
                row.cells
                    .entry(header.clone())
                    .or_insert_with(|| CellValue::from(cell));
            }
        }
        if !row.is_blank() {
            records.push(row);
        }
    }
    Ok(records)
}

fn read_csv(bytes: &[u8]) -> Result<Vec<RawRow>, SheetError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let mut row = RawRow::new(idx + 2);
        for (col, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col).filter(|h| !h.is_empty()) {
                let cell = if value.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(value.to_string())
                };
                row.cells.entry(header.clone()).or_insert(cell);
            }
        }
        if !row.is_blank() {
            records.push(row);
        }
    }
    Ok(records)
}
