//! Admin role-skill requirements: /admin/role-skill-requirements

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::models::catalog::RoleSkillRequirement;
use crate::routes::Pagination;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleSkillRequirementCreate {
    pub project_role_id: i32,
    pub skill_id: i32,
    pub min_proficiency_level_id: i32,
    #[serde(default = "default_mandatory")]
    pub is_mandatory: bool,
}

fn default_mandatory() -> bool {
    true
}

/// GET /admin/role-skill-requirements
pub async fn list_requirements(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<RoleSkillRequirement>>, AppError> {
    let requirements = sqlx::query_as::<_, RoleSkillRequirement>(
        "SELECT * FROM role_skill_requirements ORDER BY id OFFSET $1 LIMIT $2",
    )
    .bind(page.skip())
    .bind(page.limit())
    .fetch_all(&state.db)
    .await?;
    Ok(Json(requirements))
}

/// POST /admin/role-skill-requirements
pub async fn create_requirement(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<RoleSkillRequirementCreate>,
) -> Result<Json<RoleSkillRequirement>, AppError> {
    let requirement = sqlx::query_as::<_, RoleSkillRequirement>(
        r#"
        INSERT INTO role_skill_requirements
            (project_role_id, skill_id, min_proficiency_level_id, is_mandatory)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(req.project_role_id)
    .bind(req.skill_id)
    .bind(req.min_proficiency_level_id)
    .bind(req.is_mandatory)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(requirement))
}

/// GET /admin/role-skill-requirements/:id
pub async fn get_requirement(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(requirement_id): Path<i32>,
) -> Result<Json<RoleSkillRequirement>, AppError> {
    let requirement = sqlx::query_as::<_, RoleSkillRequirement>(
        "SELECT * FROM role_skill_requirements WHERE id = $1",
    )
    .bind(requirement_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Role skill requirement not found".to_string()))?;
    Ok(Json(requirement))
}

/// DELETE /admin/role-skill-requirements/:id
pub async fn delete_requirement(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(requirement_id): Path<i32>,
) -> Result<Json<RoleSkillRequirement>, AppError> {
    let requirement = sqlx::query_as::<_, RoleSkillRequirement>(
        "DELETE FROM role_skill_requirements WHERE id = $1 RETURNING *",
    )
    .bind(requirement_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Role skill requirement not found".to_string()))?;
    Ok(Json(requirement))
}
