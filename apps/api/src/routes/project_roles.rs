//! Admin project roles: /admin/project-roles

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::models::catalog::ProjectRole;
use crate::routes::Pagination;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProjectRoleCreate {
    pub name: String,
    pub description: Option<String>,
}

/// GET /admin/project-roles
pub async fn list_roles(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<ProjectRole>>, AppError> {
    let roles = sqlx::query_as::<_, ProjectRole>(
        "SELECT * FROM project_roles ORDER BY id OFFSET $1 LIMIT $2",
    )
    .bind(page.skip())
    .bind(page.limit())
    .fetch_all(&state.db)
    .await?;
    Ok(Json(roles))
}

/// POST /admin/project-roles
pub async fn create_role(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<ProjectRoleCreate>,
) -> Result<Json<ProjectRole>, AppError> {
    let role = sqlx::query_as::<_, ProjectRole>(
        "INSERT INTO project_roles (name, description) VALUES ($1, $2) RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.description)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(role))
}

/// GET /admin/project-roles/:id
pub async fn get_role(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(role_id): Path<i32>,
) -> Result<Json<ProjectRole>, AppError> {
    let role = sqlx::query_as::<_, ProjectRole>("SELECT * FROM project_roles WHERE id = $1")
        .bind(role_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project role not found".to_string()))?;
    Ok(Json(role))
}

/// DELETE /admin/project-roles/:id
pub async fn delete_role(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(role_id): Path<i32>,
) -> Result<Json<ProjectRole>, AppError> {
    let role =
        sqlx::query_as::<_, ProjectRole>("DELETE FROM project_roles WHERE id = $1 RETURNING *")
            .bind(role_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Project role not found".to_string()))?;
    Ok(Json(role))
}
