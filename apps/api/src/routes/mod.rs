pub mod courses;
pub mod health;
pub mod learning_paths;
pub mod proficiency_levels;
pub mod project_roles;
pub mod role_skill_requirements;
pub mod skills;
pub mod users;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::auth;
use crate::chat;
use crate::imports;
use crate::state::AppState;

/// Common `skip`/`limit` query parameters for list endpoints.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn skip(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(100).clamp(1, 500)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/", get(health::root_handler))
        .route("/api-health", get(health::api_health_handler))
        .route("/db-health", get(health::db_health_handler))
        // Auth
        .route("/token", post(auth::handle_login))
        .route("/register", post(auth::handle_register))
        .route("/refresh", post(auth::handle_refresh))
        .route("/users/me", get(auth::handle_me))
        .route("/admin/me", get(auth::handle_admin_me))
        // Admin: users
        .route(
            "/admin/users",
            get(users::list_users).post(users::create_user),
        )
        .route(
            "/admin/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Admin: bulk employee import
        .route("/admin/users/upload", post(imports::handlers::handle_user_upload))
        // Admin: skills
        .route(
            "/admin/skills",
            get(skills::list_skills).post(skills::create_skill),
        )
        .route(
            "/admin/skills/:id",
            get(skills::get_skill).delete(skills::delete_skill),
        )
        // Admin: proficiency levels
        .route(
            "/admin/proficiency-levels",
            get(proficiency_levels::list_levels).post(proficiency_levels::create_level),
        )
        .route(
            "/admin/proficiency-levels/:id",
            get(proficiency_levels::get_level).delete(proficiency_levels::delete_level),
        )
        // Admin: project roles
        .route(
            "/admin/project-roles",
            get(project_roles::list_roles).post(project_roles::create_role),
        )
        .route(
            "/admin/project-roles/:id",
            get(project_roles::get_role).delete(project_roles::delete_role),
        )
        // Admin: role skill requirements
        .route(
            "/admin/role-skill-requirements",
            get(role_skill_requirements::list_requirements)
                .post(role_skill_requirements::create_requirement),
        )
        .route(
            "/admin/role-skill-requirements/:id",
            get(role_skill_requirements::get_requirement)
                .delete(role_skill_requirements::delete_requirement),
        )
        // Courses
        .route(
            "/courses",
            get(courses::list_courses).post(courses::create_course),
        )
        .route(
            "/courses/:id",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
        // Learning paths
        .route(
            "/learning-paths",
            get(learning_paths::list_learning_paths).post(learning_paths::create_learning_path),
        )
        .route(
            "/learning-paths/:id",
            get(learning_paths::get_learning_path)
                .put(learning_paths::update_learning_path)
                .delete(learning_paths::delete_learning_path),
        )
        .route(
            "/learning-paths/:id/register",
            post(learning_paths::register_to_learning_path),
        )
        // AI chat
        .route("/ai/chat", post(chat::handle_chat))
        .with_state(state)
}
