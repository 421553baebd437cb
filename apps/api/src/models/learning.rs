use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Course {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub provider: Option<String>,
    pub duration_hours: Option<i32>,
    pub skill_id: Option<i32>,
    pub recommended_proficiency_level_id: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LearningPath {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LearningPathCourse {
    pub id: i32,
    pub learning_path_id: i32,
    pub course_id: i32,
    pub sequence_order: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserLearningPath {
    pub id: i32,
    pub user_id: i32,
    pub learning_path_id: i32,
    pub assigned_date: DateTime<Utc>,
    pub status: String,
    pub completion_date: Option<DateTime<Utc>>,
    pub is_mandatory_by_system: bool,
    pub is_registered_by_developer: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserCourseProgress {
    pub id: i32,
    pub user_id: i32,
    pub course_id: i32,
    pub status: String,
    pub progress_percentage: i32,
    pub last_accessed: DateTime<Utc>,
    pub completion_date: Option<DateTime<Utc>>,
}
