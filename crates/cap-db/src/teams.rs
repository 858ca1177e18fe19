//! Team members repository
//!
//! Table: team_members

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cap_core::traits::Id;
use cap_core::types::{MembershipStatus, TeamRole};
use cap_models::TeamMember;
use cap_store::{StoreError, StoreResult, TeamMemberStore};
use sqlx::{FromRow, PgPool};

use crate::db_err;

#[derive(Debug, Clone, FromRow)]
struct MemberRow {
    id: i64,
    project_id: i64,
    user_id: i64,
    role: String,
    status: String,
    invite_message: Option<String>,
    joined_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role(role: &str) -> Result<TeamRole, StoreError> {
    match role {
        "leader" => Ok(TeamRole::Leader),
        "member" => Ok(TeamRole::Member),
        other => Err(StoreError::Database(format!("unknown team role {:?}", other))),
    }
}

fn parse_status(status: &str) -> Result<MembershipStatus, StoreError> {
    match status {
        "invited" => Ok(MembershipStatus::Invited),
        "active" => Ok(MembershipStatus::Active),
        "left" => Ok(MembershipStatus::Left),
        other => Err(StoreError::Database(format!(
            "unknown membership status {:?}",
            other
        ))),
    }
}

fn role_str(role: TeamRole) -> &'static str {
    match role {
        TeamRole::Leader => "leader",
        TeamRole::Member => "member",
    }
}

impl TryFrom<MemberRow> for TeamMember {
    type Error = StoreError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(TeamMember {
            id: Some(row.id),
            project_id: row.project_id,
            user_id: row.user_id,
            role: parse_role(&row.role)?,
            status: parse_status(&row.status)?,
            invite_message: row.invite_message,
            joined_at: row.joined_at,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

pub struct PgTeamMemberStore {
    pool: PgPool,
}

impl PgTeamMemberStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamMemberStore for PgTeamMemberStore {
    async fn insert(&self, member: TeamMember) -> StoreResult<TeamMember> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            INSERT INTO team_members
                (project_id, user_id, role, status, invite_message, joined_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, project_id, user_id, role, status, invite_message,
                      joined_at, created_at, updated_at
            "#,
        )
        .bind(member.project_id)
        .bind(member.user_id)
        .bind(role_str(member.role))
        .bind(member.status.as_str())
        .bind(&member.invite_message)
        .bind(member.joined_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        row.try_into()
    }

    async fn find(&self, id: Id) -> StoreResult<Option<TeamMember>> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, project_id, user_id, role, status, invite_message,
                   joined_at, created_at, updated_at
            FROM team_members
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(TeamMember::try_from).transpose()
    }

    async fn find_current(
        &self,
        project_id: Id,
        user_id: Id,
    ) -> StoreResult<Option<TeamMember>> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, project_id, user_id, role, status, invite_message,
                   joined_at, created_at, updated_at
            FROM team_members
            WHERE project_id = $1 AND user_id = $2 AND status != 'left'
            LIMIT 1
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(TeamMember::try_from).transpose()
    }

    async fn set_status(
        &self,
        id: Id,
        expected: MembershipStatus,
        next: MembershipStatus,
        joined_at: Option<DateTime<Utc>>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE team_members
            SET status = $3, joined_at = COALESCE($4, joined_at), updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .bind(joined_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: Id) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM team_members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() == 1)
    }
}
