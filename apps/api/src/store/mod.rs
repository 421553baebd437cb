//! Storage port for the bulk import reconciler.
//!
//! The reconciler talks to a narrow `ImportStore` trait instead of the pool
//! directly so that the import workflow can be exercised against an in-memory
//! double. `PgImportStore` is the production adapter: a newtype over `PgPool`
//! with runtime-checked SQL (sqlx::query, not sqlx::query!).

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::catalog::{ProficiencyLevel, ProjectRole, Skill};
use crate::models::user::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// A pending employee assembled from one spreadsheet row, handed to
/// `create_user` as an explicit value object.
#[derive(Debug, Clone)]
pub struct NewEmployee<'a> {
    pub sso_id: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password: &'a str,
    pub project_role_id: i32,
}

/// Everything the import reconciler needs from persistent storage.
///
/// The reconciler never creates project roles, skills, or proficiency
/// levels; those are reference data provisioned out-of-band.
#[async_trait]
pub trait ImportStore: Send + Sync {
    async fn find_role_by_name(&self, name: &str) -> Result<Option<ProjectRole>, StoreError>;

    async fn find_skill_by_name(&self, name: &str) -> Result<Option<Skill>, StoreError>;

    async fn find_proficiency_by_level(
        &self,
        level: i32,
    ) -> Result<Option<ProficiencyLevel>, StoreError>;

    async fn find_user_by_sso_id(&self, sso_id: &str) -> Result<Option<User>, StoreError>;

    async fn create_user(&self, employee: NewEmployee<'_>) -> Result<User, StoreError>;

    async fn update_user_role(&self, user_id: i32, project_role_id: i32)
        -> Result<(), StoreError>;

    async fn upsert_user_skill(
        &self,
        user_id: i32,
        skill_id: i32,
        proficiency_level_id: i32,
    ) -> Result<(), StoreError>;
}

/// Postgres-backed import store. Each mutation commits immediately
/// (autocommit per step): a mid-batch failure leaves the rows already
/// processed in place, which is the documented import contract.
pub struct PgImportStore {
    pool: PgPool,
}

impl PgImportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImportStore for PgImportStore {
    async fn find_role_by_name(&self, name: &str) -> Result<Option<ProjectRole>, StoreError> {
        let role = sqlx::query_as::<_, ProjectRole>("SELECT * FROM project_roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    async fn find_skill_by_name(&self, name: &str) -> Result<Option<Skill>, StoreError> {
        let skill = sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(skill)
    }

    async fn find_proficiency_by_level(
        &self,
        level: i32,
    ) -> Result<Option<ProficiencyLevel>, StoreError> {
        let row = sqlx::query_as::<_, ProficiencyLevel>(
            "SELECT * FROM proficiency_levels WHERE level = $1",
        )
        .bind(level)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_user_by_sso_id(&self, sso_id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE sso_id = $1")
            .bind(sso_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, employee: NewEmployee<'_>) -> Result<User, StoreError> {
        let hashed = bcrypt::hash(employee.password, bcrypt::DEFAULT_COST)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (sso_id, email, first_name, last_name, hashed_password, role,
                 current_project_role_id)
            VALUES ($1, $2, $3, $4, $5, 'Developer', $6)
            RETURNING *
            "#,
        )
        .bind(employee.sso_id)
        .bind(employee.email)
        .bind(employee.first_name)
        .bind(employee.last_name)
        .bind(hashed)
        .bind(employee.project_role_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user_role(
        &self,
        user_id: i32,
        project_role_id: i32,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET current_project_role_id = $2 WHERE id = $1")
            .bind(user_id)
            .bind(project_role_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_user_skill(
        &self,
        user_id: i32,
        skill_id: i32,
        proficiency_level_id: i32,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_skills (user_id, skill_id, proficiency_level_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, skill_id)
            DO UPDATE SET proficiency_level_id = EXCLUDED.proficiency_level_id,
                          last_updated = now()
            "#,
        )
        .bind(user_id)
        .bind(skill_id)
        .bind(proficiency_level_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
