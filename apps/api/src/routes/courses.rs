//! Course catalogue: /courses

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::learning::Course;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CourseListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CourseCreate {
    pub name: String,
    pub description: Option<String>,
    pub provider: Option<String>,
    pub duration_hours: Option<i32>,
    pub skill_id: Option<i32>,
    pub recommended_proficiency_level_id: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CourseUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub provider: Option<String>,
    pub duration_hours: Option<i32>,
    pub skill_id: Option<i32>,
    pub recommended_proficiency_level_id: Option<i32>,
    pub image_url: Option<String>,
}

/// Sort columns are whitelisted; anything else falls back to id.
fn sort_column(requested: Option<&str>) -> &'static str {
    match requested {
        Some("name") => "name",
        Some("provider") => "provider",
        Some("duration_hours") => "duration_hours",
        _ => "id",
    }
}

fn sort_direction(requested: Option<&str>) -> &'static str {
    match requested {
        Some("desc") => "DESC",
        _ => "ASC",
    }
}

/// GET /courses — list with optional name/description search and sorting.
pub async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseListParams>,
) -> Result<Json<Vec<Course>>, AppError> {
    let sql = format!(
        "SELECT * FROM courses \
         WHERE ($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1) \
         ORDER BY {} {} OFFSET $2 LIMIT $3",
        sort_column(params.sort_by.as_deref()),
        sort_direction(params.sort_order.as_deref()),
    );
    let pattern = params.search.as_ref().map(|s| format!("%{s}%"));
    let courses = sqlx::query_as::<_, Course>(&sql)
        .bind(pattern)
        .bind(params.skip.unwrap_or(0).max(0))
        .bind(params.limit.unwrap_or(100).clamp(1, 500))
        .fetch_all(&state.db)
        .await?;
    Ok(Json(courses))
}

/// POST /courses
pub async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<CourseCreate>,
) -> Result<Json<Course>, AppError> {
    let course = sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses
            (name, description, provider, duration_hours, skill_id,
             recommended_proficiency_level_id, image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(&req.provider)
    .bind(req.duration_hours)
    .bind(req.skill_id)
    .bind(req.recommended_proficiency_level_id)
    .bind(&req.image_url)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(course))
}

/// GET /courses/:id
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<Course>, AppError> {
    let course = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
        .bind(course_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    Ok(Json(course))
}

/// PUT /courses/:id — partial update; absent fields keep their value.
pub async fn update_course(
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    Json(req): Json<CourseUpdate>,
) -> Result<Json<Course>, AppError> {
    let course = sqlx::query_as::<_, Course>(
        r#"
        UPDATE courses
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            provider = COALESCE($4, provider),
            duration_hours = COALESCE($5, duration_hours),
            skill_id = COALESCE($6, skill_id),
            recommended_proficiency_level_id = COALESCE($7, recommended_proficiency_level_id),
            image_url = COALESCE($8, image_url)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(course_id)
    .bind(req.name)
    .bind(req.description)
    .bind(req.provider)
    .bind(req.duration_hours)
    .bind(req.skill_id)
    .bind(req.recommended_proficiency_level_id)
    .bind(req.image_url)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    Ok(Json(course))
}

/// DELETE /courses/:id
pub async fn delete_course(
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<Course>, AppError> {
    let course = sqlx::query_as::<_, Course>("DELETE FROM courses WHERE id = $1 RETURNING *")
        .bind(course_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    Ok(Json(course))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_column_whitelist() {
        assert_eq!(sort_column(Some("name")), "name");
        assert_eq!(sort_column(Some("duration_hours")), "duration_hours");
        // Unknown or hostile input falls back to id.
        assert_eq!(sort_column(Some("name; DROP TABLE courses")), "id");
        assert_eq!(sort_column(None), "id");
    }

    #[test]
    fn test_sort_direction_defaults_to_asc() {
        assert_eq!(sort_direction(Some("desc")), "DESC");
        assert_eq!(sort_direction(Some("asc")), "ASC");
        assert_eq!(sort_direction(Some("sideways")), "ASC");
        assert_eq!(sort_direction(None), "ASC");
    }
}
