//! Team formation protocol
//!
//! The project leader invites students, guided by skill-matched candidate
//! suggestions; invitees accept or reject; members other than the leader may
//! leave. The suggestion set is a cache replaced wholesale on every matching
//! query.

use std::sync::Arc;

use chrono::Utc;
use cap_core::traits::Id;
use cap_core::types::{MatchLevel, MembershipStatus, Principal, RespondAction};
use cap_core::{CoreError, CoreResult};
use cap_matching::scorer;
use cap_models::{TeamMatchSuggestion, TeamMember};
use cap_notifications::{deliver_best_effort, Notification, NotificationKind, NotificationSink};
use cap_store::{ProjectStore, SuggestionStore, TeamMemberStore, UserDirectory};
use serde::Serialize;

/// Ranked candidates grouped by match level
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupedMatches {
    pub best_fit: Vec<TeamMatchSuggestion>,
    pub good_fit: Vec<TeamMatchSuggestion>,
    pub needs_training: Vec<TeamMatchSuggestion>,
}

/// Result of a matching query: the flat ranked list plus the grouping
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MatchResults {
    pub matches: Vec<TeamMatchSuggestion>,
    pub grouped: GroupedMatches,
}

#[derive(Clone)]
pub struct TeamFormationCoordinator {
    projects: Arc<dyn ProjectStore>,
    members: Arc<dyn TeamMemberStore>,
    suggestions: Arc<dyn SuggestionStore>,
    users: Arc<dyn UserDirectory>,
    sink: Arc<dyn NotificationSink>,
}

impl TeamFormationCoordinator {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        members: Arc<dyn TeamMemberStore>,
        suggestions: Arc<dyn SuggestionStore>,
        users: Arc<dyn UserDirectory>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            projects,
            members,
            suggestions,
            users,
            sink,
        }
    }

    /// Rank candidate students against the project's required skills.
    ///
    /// A project with no required skills yields an empty result and leaves
    /// the cache untouched. Otherwise the filtered, truncated ranking
    /// replaces the project's cached suggestion set.
    pub async fn find_matches(
        &self,
        project_id: Id,
        min_score: u8,
        limit: usize,
    ) -> CoreResult<MatchResults> {
        let project = self
            .projects
            .find(project_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", project_id))?;

        if project.required_skills.is_empty() {
            return Ok(MatchResults::default());
        }

        let mut scored: Vec<TeamMatchSuggestion> = Vec::new();
        for candidate in self.users.students().await? {
            if project.on_team(candidate.id) {
                continue;
            }
            let outcome = scorer::score(&candidate.skills, &project.required_skills);
            if outcome.score < min_score {
                continue;
            }
            scored.push(TeamMatchSuggestion {
                id: None,
                project_id,
                student_id: candidate.id,
                match_score: outcome.score,
                matched_skills: outcome.matched_skills,
                missing_skills: outcome.missing_skills,
                match_level: outcome.match_level,
                created_at: None,
            });
        }

        scored.sort_by(|a, b| {
            b.match_score
                .cmp(&a.match_score)
                .then(a.student_id.cmp(&b.student_id))
        });
        scored.truncate(limit);

        // The truncated ranking, not the full scored set, is what persists.
        self.suggestions
            .replace_for_project(project_id, scored.clone())
            .await?;

        let mut grouped = GroupedMatches::default();
        for suggestion in &scored {
            match suggestion.match_level {
                MatchLevel::BestFit => grouped.best_fit.push(suggestion.clone()),
                MatchLevel::GoodFit => grouped.good_fit.push(suggestion.clone()),
                _ => grouped.needs_training.push(suggestion.clone()),
            }
        }

        Ok(MatchResults {
            matches: scored,
            grouped,
        })
    }

    /// Invite a student to the team. Only the leader (author) invites.
    pub async fn invite(
        &self,
        project_id: Id,
        inviter: &Principal,
        target_user_id: Id,
        message: Option<String>,
    ) -> CoreResult<TeamMember> {
        let project = self
            .projects
            .find(project_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", project_id))?;

        if !project.is_author(inviter.id) {
            return Err(CoreError::forbidden("only the team leader can invite"));
        }
        self.users
            .find(target_user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", target_user_id))?;
        if project.on_team(target_user_id) {
            return Err(CoreError::conflict("user is already on the team"));
        }
        if self
            .members
            .find_current(project_id, target_user_id)
            .await?
            .is_some()
        {
            return Err(CoreError::conflict("user already has a pending invitation"));
        }

        let member = self
            .members
            .insert(TeamMember::invitation(project_id, target_user_id, message))
            .await?;

        deliver_best_effort(
            self.sink.as_ref(),
            Notification::new(
                target_user_id,
                NotificationKind::TeamInviteReceived,
                format!("You were invited to join \"{}\"", project.title),
            ),
        )
        .await;

        tracing::info!(project_id, target_user_id, "team invitation created");
        Ok(member)
    }

    /// Accept or reject an invitation.
    ///
    /// Accepting activates the membership and adds the user to the team
    /// (set-semantic, never duplicated). Rejecting deletes the record
    /// outright; rejected invitations leave no trace.
    pub async fn respond(
        &self,
        invite_id: Id,
        target_user_id: Id,
        action: RespondAction,
    ) -> CoreResult<Option<TeamMember>> {
        let member = self
            .members
            .find(invite_id)
            .await?
            .ok_or_else(|| CoreError::not_found("TeamMember", invite_id))?;

        if member.user_id != target_user_id {
            return Err(CoreError::forbidden(
                "only the invited user can respond to this invitation",
            ));
        }
        if !member.is_invited() {
            return Err(CoreError::precondition("invitation was already handled"));
        }

        match action {
            RespondAction::Approve => {
                if !self
                    .members
                    .set_status(
                        invite_id,
                        MembershipStatus::Invited,
                        MembershipStatus::Active,
                        Some(Utc::now()),
                    )
                    .await?
                {
                    return Err(CoreError::precondition("invitation was already handled"));
                }
                self.projects
                    .add_student(member.project_id, target_user_id)
                    .await?;

                if let Some(project) = self.projects.find(member.project_id).await? {
                    deliver_best_effort(
                        self.sink.as_ref(),
                        Notification::new(
                            project.author_id,
                            NotificationKind::TeamInviteAccepted,
                            format!("Student {} joined \"{}\"", target_user_id, project.title),
                        ),
                    )
                    .await;
                }

                tracing::info!(invite_id, target_user_id, "invitation accepted");
                Ok(self.members.find(invite_id).await?)
            }
            RespondAction::Reject => {
                self.members.delete(invite_id).await?;
                tracing::info!(invite_id, target_user_id, "invitation rejected");
                Ok(None)
            }
        }
    }

    /// Leave the team. The leader can never leave.
    pub async fn leave(&self, membership_id: Id, user_id: Id) -> CoreResult<TeamMember> {
        let member = self
            .members
            .find(membership_id)
            .await?
            .ok_or_else(|| CoreError::not_found("TeamMember", membership_id))?;

        if member.user_id != user_id {
            return Err(CoreError::forbidden("membership belongs to another user"));
        }

        let project = self
            .projects
            .find(member.project_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", member.project_id))?;

        if member.is_leader() || project.is_author(user_id) {
            return Err(CoreError::forbidden("the team leader cannot leave the project"));
        }
        if !member.is_active() {
            return Err(CoreError::precondition("membership is not active"));
        }

        if !self
            .members
            .set_status(
                membership_id,
                MembershipStatus::Active,
                MembershipStatus::Left,
                None,
            )
            .await?
        {
            return Err(CoreError::precondition("membership is not active"));
        }
        self.projects
            .remove_student(member.project_id, user_id)
            .await?;

        deliver_best_effort(
            self.sink.as_ref(),
            Notification::new(
                project.author_id,
                NotificationKind::TeamMemberLeft,
                format!("Student {} left \"{}\"", user_id, project.title),
            ),
        )
        .await;

        tracing::info!(membership_id, user_id, "member left team");
        self.members
            .find(membership_id)
            .await?
            .ok_or_else(|| CoreError::not_found("TeamMember", membership_id))
    }
}
