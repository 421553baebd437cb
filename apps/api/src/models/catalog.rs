//! Reference data: skills, proficiency levels, project roles and the
//! per-role skill requirements. Provisioned out-of-band; the bulk import
//! only ever reads these.

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Skill {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

/// A named proficiency tier. `level` is the numeric score (0-3) the rule
/// engine maps onto; unique across rows.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProficiencyLevel {
    pub id: i32,
    pub name: String,
    pub level: i32,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProjectRole {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RoleSkillRequirement {
    pub id: i32,
    pub project_role_id: i32,
    pub skill_id: i32,
    pub min_proficiency_level_id: i32,
    pub is_mandatory: bool,
}
