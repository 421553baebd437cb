//! Bulk import reconciliation.
//!
//! Consumes decoded employee rows and upserts users, role assignments and
//! per-skill proficiencies through the `ImportStore` port. Failures are
//! partitioned: a bad row never aborts the batch, and a bad skill never
//! aborts its row. The outcome of every row is accumulated into an
//! `ImportLedger` that is always returned to the caller.

use serde::Serialize;
use tracing::{info, warn};

use crate::imports::proficiency::infer;
use crate::imports::sheet::EmployeeRow;
use crate::store::{ImportStore, NewEmployee, StoreError};

/// Placeholder credential for users created by bulk import. Imported
/// employees are expected to change it through the normal auth flow.
const IMPORT_DEFAULT_PASSWORD: &str = "password123";

/// Per-call accumulator of import outcomes. Transient; never persisted.
#[derive(Debug, Default, Serialize)]
pub struct ImportLedger {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub errors: Vec<String>,
}

/// Processes rows in source order. Rows are independent, but each row sees
/// the effects of committed earlier rows within the same call, since user
/// creation is immediate.
pub async fn reconcile(rows: &[EmployeeRow], store: &dyn ImportStore) -> ImportLedger {
    let mut ledger = ImportLedger::default();

    for row in rows {
        if let Err(e) = process_row(row, store, &mut ledger).await {
            warn!("Import row failed for {}: {e}", row.sso_id);
            ledger.errors.push(format!("DB error for {}: {e}", row.sso_id));
        }
    }

    info!(
        "Import finished: {} created, {} updated, {} errors",
        ledger.created.len(),
        ledger.updated.len(),
        ledger.errors.len()
    );
    ledger
}

/// One row: resolve the role, resolve or create the user, then associate
/// each named skill. A storage error here aborts only this row.
async fn process_row(
    row: &EmployeeRow,
    store: &dyn ImportStore,
    ledger: &mut ImportLedger,
) -> Result<(), StoreError> {
    let Some(role) = store.find_role_by_name(&row.project_role).await? else {
        ledger.errors.push(format!(
            "Project role '{}' not found for {}",
            row.project_role, row.sso_id
        ));
        return Ok(());
    };

    let user = match store.find_user_by_sso_id(&row.sso_id).await? {
        Some(user) => {
            if user.current_project_role_id != Some(role.id) {
                store.update_user_role(user.id, role.id).await?;
            }
            // Every matched row is reported as updated, changed or not.
            ledger.updated.push(row.sso_id.clone());
            user
        }
        None => {
            let user = store
                .create_user(NewEmployee {
                    sso_id: &row.sso_id,
                    email: &row.email,
                    first_name: &row.first_name,
                    last_name: &row.last_name,
                    password: IMPORT_DEFAULT_PASSWORD,
                    project_role_id: role.id,
                })
                .await?;
            ledger.created.push(row.sso_id.clone());
            user
        }
    };

    // Skills are independent of each other; a storage failure is isolated
    // to the one association it hit.
    for skill_name in &row.skills {
        if let Err(e) = associate_skill(row, skill_name, user.id, store, ledger).await {
            warn!("Skill association failed for {}/{skill_name}: {e}", row.sso_id);
            ledger.errors.push(format!("DB error for {}: {e}", row.sso_id));
        }
    }

    Ok(())
}

/// One skill label: resolve the skill, run the rule engine, map the score
/// onto a proficiency-level record and upsert the association.
async fn associate_skill(
    row: &EmployeeRow,
    skill_name: &str,
    user_id: i32,
    store: &dyn ImportStore,
    ledger: &mut ImportLedger,
) -> Result<(), StoreError> {
    let Some(skill) = store.find_skill_by_name(skill_name).await? else {
        ledger.errors.push(format!(
            "Skill '{skill_name}' not found for {}",
            row.sso_id
        ));
        return Ok(());
    };

    let scores = infer(&row.project_role, skill_name);
    // Only catalogue technologies carry a score. A skill outside the
    // catalogue is deliberately a no-op, not an error.
    let Some(entry) = scores
        .iter()
        .find(|p| p.technology.eq_ignore_ascii_case(skill_name))
    else {
        return Ok(());
    };

    let Some(level) = store.find_proficiency_by_level(entry.level).await? else {
        ledger.errors.push(format!(
            "Proficiency level '{}' not found for {}",
            entry.level, row.sso_id
        ));
        return Ok(());
    };

    store.upsert_user_skill(user_id, skill.id, level.id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::models::catalog::{ProficiencyLevel, ProjectRole, Skill};
    use crate::models::user::User;

    /// In-memory stand-in for the Postgres import store.
    #[derive(Default)]
    struct MockStore {
        roles: Vec<ProjectRole>,
        skills: Vec<Skill>,
        levels: Vec<ProficiencyLevel>,
        users: Mutex<Vec<User>>,
        /// (user_id, skill_id) -> proficiency_level_id
        associations: Mutex<HashMap<(i32, i32), i32>>,
        role_updates: AtomicUsize,
        fail_create: bool,
        fail_upsert: bool,
    }

    fn db_down() -> StoreError {
        StoreError::Database(sqlx::Error::PoolClosed)
    }

    impl MockStore {
        fn seeded() -> Self {
            let role = |id, name: &str| ProjectRole {
                id,
                name: name.to_string(),
                description: None,
            };
            let skill = |id, name: &str| Skill {
                id,
                name: name.to_string(),
                description: None,
            };
            MockStore {
                roles: vec![
                    role(1, "Frontend Developer"),
                    role(2, "Senior Frontend Developer"),
                    role(3, "Fullstack Developer"),
                ],
                skills: vec![skill(10, "React"), skill(11, "SQL"), skill(12, "Kotlin")],
                levels: (0..=3)
                    .map(|level| ProficiencyLevel {
                        id: 100 + level,
                        name: format!("L{level}"),
                        level,
                        description: None,
                    })
                    .collect(),
                ..MockStore::default()
            }
        }

        fn without_level(mut self, level: i32) -> Self {
            self.levels.retain(|l| l.level != level);
            self
        }

        fn association_count(&self) -> usize {
            self.associations.lock().unwrap().len()
        }

        fn seed_user(&self, sso_id: &str, project_role_id: Option<i32>) {
            let mut users = self.users.lock().unwrap();
            let id = users.len() as i32 + 1;
            users.push(User {
                id,
                sso_id: sso_id.to_string(),
                email: format!("{sso_id}@example.com"),
                first_name: "Seed".to_string(),
                last_name: "User".to_string(),
                hashed_password: "x".to_string(),
                role: "Developer".to_string(),
                current_project_role_id: project_role_id,
                date_joined: Utc::now(),
                last_login: None,
            });
        }
    }

    #[async_trait]
    impl ImportStore for MockStore {
        async fn find_role_by_name(&self, name: &str) -> Result<Option<ProjectRole>, StoreError> {
            Ok(self.roles.iter().find(|r| r.name == name).cloned())
        }

        async fn find_skill_by_name(&self, name: &str) -> Result<Option<Skill>, StoreError> {
            Ok(self.skills.iter().find(|s| s.name == name).cloned())
        }

        async fn find_proficiency_by_level(
            &self,
            level: i32,
        ) -> Result<Option<ProficiencyLevel>, StoreError> {
            Ok(self.levels.iter().find(|l| l.level == level).cloned())
        }

        async fn find_user_by_sso_id(&self, sso_id: &str) -> Result<Option<User>, StoreError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.sso_id == sso_id)
                .cloned())
        }

        async fn create_user(&self, employee: NewEmployee<'_>) -> Result<User, StoreError> {
            if self.fail_create {
                return Err(db_down());
            }
            let mut users = self.users.lock().unwrap();
            let user = User {
                id: users.len() as i32 + 1,
                sso_id: employee.sso_id.to_string(),
                email: employee.email.to_string(),
                first_name: employee.first_name.to_string(),
                last_name: employee.last_name.to_string(),
                hashed_password: employee.password.to_string(),
                role: "Developer".to_string(),
                current_project_role_id: Some(employee.project_role_id),
                date_joined: Utc::now(),
                last_login: None,
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn update_user_role(
            &self,
            user_id: i32,
            project_role_id: i32,
        ) -> Result<(), StoreError> {
            self.role_updates.fetch_add(1, Ordering::SeqCst);
            let mut users = self.users.lock().unwrap();
            if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
                user.current_project_role_id = Some(project_role_id);
            }
            Ok(())
        }

        async fn upsert_user_skill(
            &self,
            user_id: i32,
            skill_id: i32,
            proficiency_level_id: i32,
        ) -> Result<(), StoreError> {
            if self.fail_upsert {
                return Err(db_down());
            }
            self.associations
                .lock()
                .unwrap()
                .insert((user_id, skill_id), proficiency_level_id);
            Ok(())
        }
    }

    fn row(sso_id: &str, project_role: &str, skills: &[&str]) -> EmployeeRow {
        EmployeeRow {
            sso_id: sso_id.to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: format!("{sso_id}@example.com"),
            project_role: project_role.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_creates_user_and_upserts_proficiency() {
        let store = MockStore::seeded();
        let rows = vec![row("E1", "Frontend Developer", &["React"])];

        let ledger = reconcile(&rows, &store).await;

        assert_eq!(ledger.created, vec!["E1"]);
        assert!(ledger.updated.is_empty());
        assert!(ledger.errors.is_empty());
        // infer("Frontend Developer", "React") scores React at 3.
        let associations = store.associations.lock().unwrap();
        assert_eq!(associations.get(&(1, 10)), Some(&103));
    }

    #[tokio::test]
    async fn test_unresolvable_role_skips_entire_row() {
        let store = MockStore::seeded();
        let rows = vec![row("E2", "Ghost Role", &["React"])];

        let ledger = reconcile(&rows, &store).await;

        assert_eq!(
            ledger.errors,
            vec!["Project role 'Ghost Role' not found for E2"]
        );
        assert!(ledger.created.is_empty());
        assert!(ledger.updated.is_empty());
        assert!(store.users.lock().unwrap().is_empty());
        assert_eq!(store.association_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_skill_records_error_but_keeps_row() {
        let store = MockStore::seeded();
        let rows = vec![row("E3", "Frontend Developer", &["Cobol", "React"])];

        let ledger = reconcile(&rows, &store).await;

        assert_eq!(ledger.created, vec!["E3"]);
        assert_eq!(ledger.errors, vec!["Skill 'Cobol' not found for E3"]);
        // The sibling skill still got its association.
        assert_eq!(store.association_count(), 1);
    }

    #[tokio::test]
    async fn test_catalogue_miss_is_a_silent_no_op() {
        // Kotlin exists as a skill record but is not a catalogue technology:
        // no proficiency is persisted and no error is recorded.
        let store = MockStore::seeded();
        let rows = vec![row("E4", "Frontend Developer", &["Kotlin"])];

        let ledger = reconcile(&rows, &store).await;

        assert_eq!(ledger.created, vec!["E4"]);
        assert!(ledger.errors.is_empty());
        assert_eq!(store.association_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_proficiency_level_records_error() {
        let store = MockStore::seeded().without_level(3);
        let rows = vec![row("E5", "Frontend Developer", &["React"])];

        let ledger = reconcile(&rows, &store).await;

        assert_eq!(
            ledger.errors,
            vec!["Proficiency level '3' not found for E5"]
        );
        assert_eq!(ledger.created, vec!["E5"]);
        assert_eq!(store.association_count(), 0);
    }

    #[tokio::test]
    async fn test_rerun_reports_updated_without_duplicates() {
        let store = MockStore::seeded();
        let rows = vec![row("E6", "Frontend Developer", &["React", "SQL"])];

        let first = reconcile(&rows, &store).await;
        let second = reconcile(&rows, &store).await;

        assert_eq!(first.created, vec!["E6"]);
        assert!(first.updated.is_empty());
        assert!(second.created.is_empty());
        assert_eq!(second.updated, vec!["E6"]);
        assert!(second.errors.is_empty());
        // Upsert semantics: still one association per (user, skill).
        assert_eq!(store.association_count(), 2);
        assert_eq!(store.users.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_existing_user_with_same_role_still_reported_updated() {
        let store = MockStore::seeded();
        store.seed_user("E7", Some(1));
        let rows = vec![row("E7", "Frontend Developer", &[])];

        let ledger = reconcile(&rows, &store).await;

        // Literal behavior: matched rows count as updated even when
        // nothing changed, and the role write is skipped.
        assert_eq!(ledger.updated, vec!["E7"]);
        assert_eq!(store.role_updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_role_change_is_written_once() {
        let store = MockStore::seeded();
        store.seed_user("E8", Some(1));
        let rows = vec![row("E8", "Senior Frontend Developer", &[])];

        let ledger = reconcile(&rows, &store).await;

        assert_eq!(ledger.updated, vec!["E8"]);
        assert_eq!(store.role_updates.load(Ordering::SeqCst), 1);
        let users = store.users.lock().unwrap();
        assert_eq!(users[0].current_project_role_id, Some(2));
    }

    #[tokio::test]
    async fn test_storage_failure_on_create_does_not_abort_batch() {
        let mut store = MockStore::seeded();
        store.fail_create = true;
        let rows = vec![
            row("E9", "Frontend Developer", &["React"]),
            row("E10", "Ghost Role", &[]),
        ];

        let ledger = reconcile(&rows, &store).await;

        assert!(ledger.created.is_empty());
        assert_eq!(ledger.errors.len(), 2);
        assert!(ledger.errors[0].starts_with("DB error for E9:"));
        assert_eq!(ledger.errors[1], "Project role 'Ghost Role' not found for E10");
    }

    #[tokio::test]
    async fn test_storage_failure_on_upsert_is_isolated_to_the_skill() {
        let mut store = MockStore::seeded();
        store.fail_upsert = true;
        let rows = vec![row("E11", "Frontend Developer", &["React", "Kotlin"])];

        let ledger = reconcile(&rows, &store).await;

        // The row itself was classified before the skill loop ran.
        assert_eq!(ledger.created, vec!["E11"]);
        // React hit the failing upsert; Kotlin is a catalogue miss and
        // never reached the store.
        assert_eq!(ledger.errors.len(), 1);
        assert!(ledger.errors[0].starts_with("DB error for E11:"));
    }

    #[tokio::test]
    async fn test_empty_batch_yields_empty_ledger() {
        let store = MockStore::seeded();
        let ledger = reconcile(&[], &store).await;
        assert!(ledger.created.is_empty());
        assert!(ledger.updated.is_empty());
        assert!(ledger.errors.is_empty());
    }
}
