use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// An employee record. `sso_id` is the immutable external identity key;
/// `role` gates admin access ("Developer" or "Admin").
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub sso_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub role: String,
    pub current_project_role_id: Option<i32>,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Per-user per-skill proficiency. At most one row per (user, skill).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserSkill {
    pub id: i32,
    pub user_id: i32,
    pub skill_id: i32,
    pub proficiency_level_id: i32,
    pub last_updated: DateTime<Utc>,
}
