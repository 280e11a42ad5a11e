//! Numeric cleanup for spreadsheet cells.
//!
//! Source sheets mix real numbers, numbers typed as text with thousands
//! separators, and "no data" glyphs. Everything that is not a finite number
//! comes out as `None`; nothing here fails.

use crate::import::sheet::CellValue;

/// Glyphs that sheets use to mean "not measured".
const SENTINELS: &[&str] = &["-", "—", "–", "−", "―", "N/A", "n/a", "NA"];

pub fn normalize(raw: &CellValue) -> Option<f64> {
    match raw {
        CellValue::Empty | CellValue::Bool(_) => None,
        CellValue::Number(n) => finite(*n),
        CellValue::Text(s) => normalize_text(s),
    }
}

pub fn normalize_text(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if is_sentinel(trimmed) {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().and_then(finite)
}

/// Blank or a known "no data" token.
pub fn is_sentinel(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || SENTINELS.contains(&trimmed)
}

fn finite(n: f64) -> Option<f64> {
    n.is_finite().then_some(n)
}
