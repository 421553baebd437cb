//! Learning paths: /learning-paths
//!
//! A path is a named, ordered sequence of courses. Responses embed the
//! course list; listing is paginated as `{total, items}`.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::learning::{Course, LearningPath, UserLearningPath};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PathListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CourseRef {
    pub course_id: i32,
    pub sequence_order: i32,
}

#[derive(Debug, Deserialize)]
pub struct LearningPathCreate {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub courses: Vec<CourseRef>,
}

#[derive(Debug, Serialize)]
pub struct LearningPathResponse {
    #[serde(flatten)]
    pub path: LearningPath,
    pub courses: Vec<PathCourseResponse>,
}

#[derive(Debug, Serialize)]
pub struct PathCourseResponse {
    pub id: i32,
    pub course_id: i32,
    pub sequence_order: i32,
    pub course: Course,
}

#[derive(Debug, Serialize)]
pub struct PaginatedPaths {
    pub total: i64,
    pub items: Vec<LearningPathResponse>,
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    #[serde(flatten)]
    pub registration: UserLearningPath,
    pub learning_path: LearningPath,
}

#[derive(Debug, FromRow)]
struct PathCourseRow {
    link_id: i32,
    sequence_order: i32,
    #[sqlx(flatten)]
    course: Course,
}

async fn load_path_courses(
    db: &sqlx::PgPool,
    learning_path_id: i32,
) -> Result<Vec<PathCourseResponse>, AppError> {
    let rows = sqlx::query_as::<_, PathCourseRow>(
        r#"
        SELECT lpc.id AS link_id, lpc.sequence_order, c.*
        FROM learning_path_courses lpc
        JOIN courses c ON c.id = lpc.course_id
        WHERE lpc.learning_path_id = $1
        ORDER BY lpc.sequence_order
        "#,
    )
    .bind(learning_path_id)
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| PathCourseResponse {
            id: row.link_id,
            course_id: row.course.id,
            sequence_order: row.sequence_order,
            course: row.course,
        })
        .collect())
}

async fn replace_path_courses(
    db: &sqlx::PgPool,
    learning_path_id: i32,
    courses: &[CourseRef],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM learning_path_courses WHERE learning_path_id = $1")
        .bind(learning_path_id)
        .execute(db)
        .await?;
    for course in courses {
        sqlx::query(
            "INSERT INTO learning_path_courses (learning_path_id, course_id, sequence_order) \
             VALUES ($1, $2, $3)",
        )
        .bind(learning_path_id)
        .bind(course.course_id)
        .bind(course.sequence_order)
        .execute(db)
        .await?;
    }
    Ok(())
}

fn sort_column(requested: Option<&str>) -> &'static str {
    match requested {
        Some("name") => "name",
        _ => "id",
    }
}

fn sort_direction(requested: Option<&str>) -> &'static str {
    match requested {
        Some("desc") => "DESC",
        _ => "ASC",
    }
}

/// GET /learning-paths — paginated `{total, items}` with course details.
pub async fn list_learning_paths(
    State(state): State<AppState>,
    Query(params): Query<PathListParams>,
) -> Result<Json<PaginatedPaths>, AppError> {
    let pattern = params.search.as_ref().map(|s| format!("%{s}%"));

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM learning_paths \
         WHERE ($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1)",
    )
    .bind(&pattern)
    .fetch_one(&state.db)
    .await?;

    let sql = format!(
        "SELECT * FROM learning_paths \
         WHERE ($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1) \
         ORDER BY {} {} OFFSET $2 LIMIT $3",
        sort_column(params.sort_by.as_deref()),
        sort_direction(params.sort_order.as_deref()),
    );
    let paths = sqlx::query_as::<_, LearningPath>(&sql)
        .bind(&pattern)
        .bind(params.skip.unwrap_or(0).max(0))
        .bind(params.limit.unwrap_or(100).clamp(1, 500))
        .fetch_all(&state.db)
        .await?;

    let mut items = Vec::with_capacity(paths.len());
    for path in paths {
        let courses = load_path_courses(&state.db, path.id).await?;
        items.push(LearningPathResponse { path, courses });
    }

    Ok(Json(PaginatedPaths { total, items }))
}

/// POST /learning-paths — creates the path together with its course list.
pub async fn create_learning_path(
    State(state): State<AppState>,
    Json(req): Json<LearningPathCreate>,
) -> Result<Json<LearningPathResponse>, AppError> {
    let path = sqlx::query_as::<_, LearningPath>(
        "INSERT INTO learning_paths (name, description) VALUES ($1, $2) RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.description)
    .fetch_one(&state.db)
    .await?;

    replace_path_courses(&state.db, path.id, &req.courses).await?;
    let courses = load_path_courses(&state.db, path.id).await?;
    Ok(Json(LearningPathResponse { path, courses }))
}

/// GET /learning-paths/:id
pub async fn get_learning_path(
    State(state): State<AppState>,
    Path(learning_path_id): Path<i32>,
) -> Result<Json<LearningPathResponse>, AppError> {
    let path = sqlx::query_as::<_, LearningPath>("SELECT * FROM learning_paths WHERE id = $1")
        .bind(learning_path_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Learning path not found".to_string()))?;
    let courses = load_path_courses(&state.db, path.id).await?;
    Ok(Json(LearningPathResponse { path, courses }))
}

/// PUT /learning-paths/:id — replaces name, description and course list.
pub async fn update_learning_path(
    State(state): State<AppState>,
    Path(learning_path_id): Path<i32>,
    Json(req): Json<LearningPathCreate>,
) -> Result<Json<LearningPathResponse>, AppError> {
    let path = sqlx::query_as::<_, LearningPath>(
        "UPDATE learning_paths SET name = $2, description = $3 WHERE id = $1 RETURNING *",
    )
    .bind(learning_path_id)
    .bind(&req.name)
    .bind(&req.description)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Learning path not found".to_string()))?;

    replace_path_courses(&state.db, path.id, &req.courses).await?;
    let courses = load_path_courses(&state.db, path.id).await?;
    Ok(Json(LearningPathResponse { path, courses }))
}

/// DELETE /learning-paths/:id — course links cascade via FK.
pub async fn delete_learning_path(
    State(state): State<AppState>,
    Path(learning_path_id): Path<i32>,
) -> Result<Json<LearningPath>, AppError> {
    let path = sqlx::query_as::<_, LearningPath>(
        "DELETE FROM learning_paths WHERE id = $1 RETURNING *",
    )
    .bind(learning_path_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Learning path not found".to_string()))?;
    Ok(Json(path))
}

/// POST /learning-paths/:id/register — the current user enrolls themselves.
pub async fn register_to_learning_path(
    State(state): State<AppState>,
    Path(learning_path_id): Path<i32>,
    AuthUser(user): AuthUser,
) -> Result<Json<RegistrationResponse>, AppError> {
    let existing: Option<i32> = sqlx::query_scalar(
        "SELECT id FROM user_learning_paths WHERE user_id = $1 AND learning_path_id = $2",
    )
    .bind(user.id)
    .bind(learning_path_id)
    .fetch_optional(&state.db)
    .await?;
    if existing.is_some() {
        return Err(AppError::Validation(
            "User already registered to this learning path".to_string(),
        ));
    }

    let path = sqlx::query_as::<_, LearningPath>("SELECT * FROM learning_paths WHERE id = $1")
        .bind(learning_path_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Learning path not found".to_string()))?;

    let registration = sqlx::query_as::<_, UserLearningPath>(
        r#"
        INSERT INTO user_learning_paths (user_id, learning_path_id, is_registered_by_developer)
        VALUES ($1, $2, TRUE)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(learning_path_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(RegistrationResponse {
        registration,
        learning_path: path,
    }))
}
