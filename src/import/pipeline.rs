use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::foods::repo::FoodStore;
use crate::import::field_mapper::map_row;
use crate::import::sheet::RawRow;

/// One row that mapped to a record but could not be stored.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RowFailure {
    pub row: usize,
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    /// Rows with neither a name nor a code; not records, so not failures.
    pub skipped: usize,
    pub failures: Vec<RowFailure>,
}

/// Maps and stores every row in sheet order.
///
/// A store error on one row is recorded and the run moves on; there is no
/// retry, no dedup against existing records, and no batch transaction.
#[instrument(skip_all, fields(rows = rows.len()))]
pub async fn ingest(store: &dyn FoodStore, rows: &[RawRow]) -> ImportReport {
    let mut report = ImportReport::default();

    for raw in rows {
        let fields = map_row(raw);
        let Some(label) = fields.label().map(str::to_string) else {
            debug!(row = raw.row, "row has no food_name or food_code; skipping");
            report.skipped += 1;
            continue;
        };

        match store.insert(fields).await {
            Ok(record) => {
                debug!(row = raw.row, id = %record.id, "row stored");
                report.inserted += 1;
            }
            Err(e) => {
                let reason = format!("{e:#}");
                warn!(row = raw.row, %label, error = %reason, "row insert failed");
                report.failures.push(RowFailure {
                    row: raw.row,
                    label,
                    reason,
                });
            }
        }
    }

    info!(
        inserted = report.inserted,
        skipped = report.skipped,
        failed = report.failures.len(),
        "import finished"
    );
    report
}
