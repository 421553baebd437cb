use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info};

use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::imports::reconcile::reconcile;
use crate::imports::sheet::parse_employee_sheet;
use crate::state::AppState;
use crate::store::PgImportStore;

/// POST /admin/users/upload
///
/// Accepts a multipart xlsx upload and runs the bulk import. Structural
/// failures (undecodable file, missing columns) come back as a single
/// 400 `{"error": ...}`; everything else returns the import ledger, with
/// row-level failures inside it.
pub async fn handle_user_upload(
    State(state): State<AppState>,
    _admin: AdminUser,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut file_bytes: Option<bytes::Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() == Some("file") || field.file_name().is_some() {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            file_bytes = Some(bytes);
            break;
        }
    }

    let Some(bytes) = file_bytes else {
        return Err(AppError::Validation(
            "No file field in multipart upload".to_string(),
        ));
    };

    info!("Processing employee upload ({} bytes)", bytes.len());

    let rows = match parse_employee_sheet(&bytes) {
        Ok(rows) => rows,
        Err(e) => {
            error!("Excel processing error: {e}");
            return Ok((StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
                .into_response());
        }
    };

    let store = PgImportStore::new(state.db.clone());
    let ledger = reconcile(&rows, &store).await;
    Ok(Json(ledger).into_response())
}
