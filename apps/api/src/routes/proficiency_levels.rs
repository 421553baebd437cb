//! Admin proficiency tiers: /admin/proficiency-levels
//!
//! Reference data for the import reconciler; `level` must stay unique and
//! cover the rule engine's score range.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::models::catalog::ProficiencyLevel;
use crate::routes::Pagination;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProficiencyLevelCreate {
    pub name: String,
    pub level: i32,
    pub description: Option<String>,
}

/// GET /admin/proficiency-levels
pub async fn list_levels(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<ProficiencyLevel>>, AppError> {
    let levels = sqlx::query_as::<_, ProficiencyLevel>(
        "SELECT * FROM proficiency_levels ORDER BY level OFFSET $1 LIMIT $2",
    )
    .bind(page.skip())
    .bind(page.limit())
    .fetch_all(&state.db)
    .await?;
    Ok(Json(levels))
}

/// POST /admin/proficiency-levels
pub async fn create_level(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<ProficiencyLevelCreate>,
) -> Result<Json<ProficiencyLevel>, AppError> {
    if !(0..=3).contains(&req.level) {
        return Err(AppError::Validation(
            "level must be between 0 and 3".to_string(),
        ));
    }
    let level = sqlx::query_as::<_, ProficiencyLevel>(
        "INSERT INTO proficiency_levels (name, level, description) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&req.name)
    .bind(req.level)
    .bind(&req.description)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(level))
}

/// GET /admin/proficiency-levels/:id
pub async fn get_level(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(level_id): Path<i32>,
) -> Result<Json<ProficiencyLevel>, AppError> {
    let level =
        sqlx::query_as::<_, ProficiencyLevel>("SELECT * FROM proficiency_levels WHERE id = $1")
            .bind(level_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Proficiency level not found".to_string()))?;
    Ok(Json(level))
}

/// DELETE /admin/proficiency-levels/:id
pub async fn delete_level(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(level_id): Path<i32>,
) -> Result<Json<ProficiencyLevel>, AppError> {
    let level = sqlx::query_as::<_, ProficiencyLevel>(
        "DELETE FROM proficiency_levels WHERE id = $1 RETURNING *",
    )
    .bind(level_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Proficiency level not found".to_string()))?;
    Ok(Json(level))
}
