//! Offline importer: runs the upload pipeline over a spreadsheet on disk.
//!
//! Usage:
//!   EXCEL_PATH=/data/foods.xlsx DATABASE_URL=postgres://... import_data
//!   import_data /data/foods.csv

use anyhow::Context;
use food_nutrient_api::{
    import::{
        pipeline::ingest,
        sheet::{read_sheet, SheetFormat},
    },
    state::AppState,
    telemetry,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init(telemetry::IMPORTER_DIRECTIVES);

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("EXCEL_PATH").ok())
        .context("pass a spreadsheet path or set EXCEL_PATH")?;

    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("read {path}"))?;
    let rows = read_sheet(&bytes, SheetFormat::detect(Some(path.as_str()), None))
        .with_context(|| format!("parse {path}"))?;
    info!(%path, rows = rows.len(), "rows read");

    let state = AppState::init().await?;
    let report = ingest(state.store.as_ref(), &rows).await;
    for failure in &report.failures {
        warn!(row = failure.row, label = %failure.label, reason = %failure.reason, "row not imported");
    }
    state.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
