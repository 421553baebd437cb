//! Admin user management: /admin/users

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::auth::{hash_password, AdminUser};
use crate::errors::AppError;
use crate::models::user::User;
use crate::routes::Pagination;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub sso_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub current_project_role_id: Option<i32>,
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id OFFSET $1 LIMIT $2")
        .bind(page.skip())
        .bind(page.limit())
        .fetch_all(&state.db)
        .await?;
    Ok(Json(users))
}

/// POST /admin/users
pub async fn create_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<UserCreate>,
) -> Result<Json<User>, AppError> {
    let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE sso_id = $1")
        .bind(&req.sso_id)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Validation("SSO ID already registered".to_string()));
    }

    let hashed = hash_password(&req.password)?;
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (sso_id, email, first_name, last_name, hashed_password, role)
        VALUES ($1, $2, $3, $4, $5, 'Developer')
        RETURNING *
        "#,
    )
    .bind(&req.sso_id)
    .bind(&req.email)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(hashed)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(user))
}

/// GET /admin/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<i32>,
) -> Result<Json<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

/// PUT /admin/users/:id — partial update; absent fields keep their value.
pub async fn update_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<i32>,
    Json(req): Json<UserUpdate>,
) -> Result<Json<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET email = COALESCE($2, email),
            first_name = COALESCE($3, first_name),
            last_name = COALESCE($4, last_name),
            role = COALESCE($5, role),
            current_project_role_id = COALESCE($6, current_project_role_id)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(req.email)
    .bind(req.first_name)
    .bind(req.last_name)
    .bind(req.role)
    .bind(req.current_project_role_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

/// DELETE /admin/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<i32>,
) -> Result<Json<User>, AppError> {
    let user = sqlx::query_as::<_, User>("DELETE FROM users WHERE id = $1 RETURNING *")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}
