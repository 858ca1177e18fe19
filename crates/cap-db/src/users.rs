//! User directory repository
//!
//! Table: users. A projection of the external user service, kept current by
//! its sync feed; the core only reads it and records supervised projects.

use async_trait::async_trait;
use cap_core::traits::Id;
use cap_core::types::Role;
use cap_models::DirectoryUser;
use cap_store::{StoreError, StoreResult, UserDirectory};
use sqlx::{FromRow, PgPool};

use crate::db_err;

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    role: String,
    skills: Vec<String>,
    supervised_project_ids: Vec<i64>,
}

impl TryFrom<UserRow> for DirectoryUser {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| StoreError::Database(format!("unknown role {:?}", row.role)))?;
        Ok(DirectoryUser {
            id: row.id,
            name: row.name,
            role,
            skills: row.skills,
            supervised_project_ids: row.supervised_project_ids,
        })
    }
}

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find(&self, id: Id) -> StoreResult<Option<DirectoryUser>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, role, skills, supervised_project_ids
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(DirectoryUser::try_from).transpose()
    }

    async fn students(&self) -> StoreResult<Vec<DirectoryUser>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, role, skills, supervised_project_ids
            FROM users
            WHERE role = 'student'
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DirectoryUser::try_from).collect()
    }

    async fn record_supervised_project(
        &self,
        supervisor_id: Id,
        project_id: Id,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET supervised_project_ids = array_append(supervised_project_ids, $2)
            WHERE id = $1 AND NOT (supervised_project_ids @> ARRAY[$2]::BIGINT[])
            "#,
        )
        .bind(supervisor_id)
        .bind(project_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn upsert(&self, user: DirectoryUser) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, role, skills, supervised_project_ids)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                role = EXCLUDED.role,
                skills = EXCLUDED.skills,
                supervised_project_ids = EXCLUDED.supervised_project_ids
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(&user.skills)
        .bind(&user.supervised_project_ids)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}
