use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    import::{
        pipeline::{ingest, ImportReport},
        sheet::{read_sheet, SheetError, SheetFormat},
    },
    state::AppState,
};

pub fn import_routes(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/import", post(import_sheet))
        .route("/file/excel", post(import_sheet)) // legacy upload path
        .layer(DefaultBodyLimit::max(max_bytes))
}

struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: bytes::Bytes,
}

/// Takes the `file` field, or the first field that carries a file name.
async fn read_upload(mp: &mut Multipart) -> Result<Option<Upload>, AppError> {
    loop {
        let field = match mp.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(error = %e, "multipart read failed");
                return Err(AppError::BadUpload(e.body_text()));
            }
        };
        let is_file = field.name() == Some("file") || field.file_name().is_some();
        if !is_file {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadUpload(e.body_text()))?;
        return Ok(Some(Upload {
            file_name,
            content_type,
            bytes,
        }));
    }
}

/// POST /import (multipart, field `file`)
#[instrument(skip(state, mp))]
pub async fn import_sheet(
    State(state): State<AppState>,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportReport>, AppError> {
    let mut mp = mp.map_err(|e| AppError::BadUpload(e.body_text()))?;
    let upload = read_upload(&mut mp)
        .await?
        .ok_or_else(|| AppError::invalid("file", "file is required"))?;

    let format = SheetFormat::detect(upload.file_name.as_deref(), upload.content_type.as_deref());
    info!(
        file_name = upload.file_name.as_deref().unwrap_or("-"),
        size = upload.bytes.len(),
        ?format,
        "import upload received"
    );

    let rows = read_sheet(&upload.bytes, format).map_err(|e| match e {
        SheetError::Empty => AppError::EmptyImport,
        other => AppError::BadUpload(other.to_string()),
    })?;
    if rows.is_empty() {
        return Err(AppError::EmptyImport);
    }

    let report = ingest(state.store.as_ref(), &rows).await;
    Ok(Json(report))
}
