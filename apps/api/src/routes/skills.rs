//! Admin skill catalogue: /admin/skills

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::models::catalog::Skill;
use crate::routes::Pagination;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SkillCreate {
    pub name: String,
    pub description: Option<String>,
}

/// GET /admin/skills
pub async fn list_skills(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Skill>>, AppError> {
    let skills = sqlx::query_as::<_, Skill>("SELECT * FROM skills ORDER BY id OFFSET $1 LIMIT $2")
        .bind(page.skip())
        .bind(page.limit())
        .fetch_all(&state.db)
        .await?;
    Ok(Json(skills))
}

/// POST /admin/skills
pub async fn create_skill(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<SkillCreate>,
) -> Result<Json<Skill>, AppError> {
    let skill = sqlx::query_as::<_, Skill>(
        "INSERT INTO skills (name, description) VALUES ($1, $2) RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.description)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(skill))
}

/// GET /admin/skills/:id
pub async fn get_skill(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(skill_id): Path<i32>,
) -> Result<Json<Skill>, AppError> {
    let skill = sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE id = $1")
        .bind(skill_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Skill not found".to_string()))?;
    Ok(Json(skill))
}

/// DELETE /admin/skills/:id
pub async fn delete_skill(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(skill_id): Path<i32>,
) -> Result<Json<Skill>, AppError> {
    let skill = sqlx::query_as::<_, Skill>("DELETE FROM skills WHERE id = $1 RETURNING *")
        .bind(skill_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Skill not found".to_string()))?;
    Ok(Json(skill))
}
