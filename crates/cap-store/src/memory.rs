//! In-memory store implementations
//!
//! Used by tests and database-less development runs. Locking follows the
//! shape of the Postgres implementations: every trait method is one guarded
//! read or write, so the compare-and-set semantics match.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cap_core::traits::Id;
use cap_core::types::{MembershipStatus, ProjectPhase, RequestStatus};
use cap_models::{
    DirectoryUser, Project, ProjectMilestone, SupervisorRequest, TeamMatchSuggestion, TeamMember,
};
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::{
    MilestoneStore, ProjectStore, SuggestionStore, SupervisorRequestStore, TeamMemberStore,
    UserDirectory,
};

#[derive(Default)]
pub struct MemoryProjectStore {
    projects: RwLock<HashMap<Id, Project>>,
    next_id: AtomicI64,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self {
            projects: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn insert(&self, mut project: Project) -> StoreResult<Project> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        project.id = Some(id);
        project.created_at = Some(now);
        project.updated_at = Some(now);

        self.projects.write().await.insert(id, project.clone());
        Ok(project)
    }

    async fn find(&self, id: Id) -> StoreResult<Option<Project>> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Project>> {
        let mut projects: Vec<Project> = self.projects.read().await.values().cloned().collect();
        projects.sort_by_key(|p| p.id);
        Ok(projects)
    }

    async fn set_phase(
        &self,
        id: Id,
        expected: ProjectPhase,
        next: ProjectPhase,
    ) -> StoreResult<bool> {
        let mut projects = self.projects.write().await;
        match projects.get_mut(&id) {
            Some(project) if project.phase == expected => {
                project.phase = next;
                project.updated_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn assign_supervisor(&self, id: Id, supervisor_id: Id) -> StoreResult<bool> {
        let mut projects = self.projects.write().await;
        match projects.get_mut(&id) {
            Some(project) if project.supervisor_id.is_none() => {
                project.supervisor_id = Some(supervisor_id);
                project.updated_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn add_student(&self, id: Id, user_id: Id) -> StoreResult<()> {
        let mut projects = self.projects.write().await;
        if let Some(project) = projects.get_mut(&id) {
            if project.add_student(user_id) {
                project.updated_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn remove_student(&self, id: Id, user_id: Id) -> StoreResult<()> {
        let mut projects = self.projects.write().await;
        if let Some(project) = projects.get_mut(&id) {
            if project.remove_student(user_id) {
                project.updated_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRequestStore {
    requests: RwLock<HashMap<Id, SupervisorRequest>>,
    next_id: AtomicI64,
}

impl MemoryRequestStore {
    pub fn new() -> Self {
        Self {
            requests: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl SupervisorRequestStore for MemoryRequestStore {
    async fn insert(&self, mut request: SupervisorRequest) -> StoreResult<SupervisorRequest> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        request.id = Some(id);
        request.created_at = Some(Utc::now());

        self.requests.write().await.insert(id, request.clone());
        Ok(request)
    }

    async fn find(&self, id: Id) -> StoreResult<Option<SupervisorRequest>> {
        Ok(self.requests.read().await.get(&id).cloned())
    }

    async fn pending_exists(
        &self,
        student_id: Id,
        supervisor_id: Id,
        project_id: Option<Id>,
    ) -> StoreResult<bool> {
        let requests = self.requests.read().await;
        Ok(requests.values().any(|r| {
            r.is_pending()
                && r.student_id == student_id
                && r.supervisor_id == supervisor_id
                && r.project_id == project_id
        }))
    }

    async fn resolve(
        &self,
        id: Id,
        status: RequestStatus,
        response: Option<String>,
        responded_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut requests = self.requests.write().await;
        match requests.get_mut(&id) {
            Some(request) if request.is_pending() => {
                request.status = status;
                request.supervisor_response = response;
                request.responded_at = Some(responded_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryTeamMemberStore {
    members: RwLock<HashMap<Id, TeamMember>>,
    next_id: AtomicI64,
}

impl MemoryTeamMemberStore {
    pub fn new() -> Self {
        Self {
            members: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl TeamMemberStore for MemoryTeamMemberStore {
    async fn insert(&self, mut member: TeamMember) -> StoreResult<TeamMember> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        member.id = Some(id);
        member.created_at = Some(now);
        member.updated_at = Some(now);

        self.members.write().await.insert(id, member.clone());
        Ok(member)
    }

    async fn find(&self, id: Id) -> StoreResult<Option<TeamMember>> {
        Ok(self.members.read().await.get(&id).cloned())
    }

    async fn find_current(
        &self,
        project_id: Id,
        user_id: Id,
    ) -> StoreResult<Option<TeamMember>> {
        let members = self.members.read().await;
        Ok(members
            .values()
            .find(|m| {
                m.project_id == project_id
                    && m.user_id == user_id
                    && m.status != MembershipStatus::Left
            })
            .cloned())
    }

    async fn set_status(
        &self,
        id: Id,
        expected: MembershipStatus,
        next: MembershipStatus,
        joined_at: Option<DateTime<Utc>>,
    ) -> StoreResult<bool> {
        let mut members = self.members.write().await;
        match members.get_mut(&id) {
            Some(member) if member.status == expected => {
                member.status = next;
                if joined_at.is_some() {
                    member.joined_at = joined_at;
                }
                member.updated_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: Id) -> StoreResult<bool> {
        Ok(self.members.write().await.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct MemorySuggestionStore {
    // Whole-set snapshot per project; replace is one map insert.
    sets: RwLock<HashMap<Id, Vec<TeamMatchSuggestion>>>,
    next_id: AtomicI64,
}

impl MemorySuggestionStore {
    pub fn new() -> Self {
        Self {
            sets: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl SuggestionStore for MemorySuggestionStore {
    async fn replace_for_project(
        &self,
        project_id: Id,
        mut suggestions: Vec<TeamMatchSuggestion>,
    ) -> StoreResult<()> {
        let now = Utc::now();
        for suggestion in &mut suggestions {
            suggestion.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst));
            suggestion.created_at = Some(now);
        }
        self.sets.write().await.insert(project_id, suggestions);
        Ok(())
    }

    async fn list_for_project(&self, project_id: Id) -> StoreResult<Vec<TeamMatchSuggestion>> {
        Ok(self
            .sets
            .read()
            .await
            .get(&project_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MemoryMilestoneStore {
    records: RwLock<HashMap<(Id, ProjectPhase), ProjectMilestone>>,
    next_id: AtomicI64,
}

impl MemoryMilestoneStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl MilestoneStore for MemoryMilestoneStore {
    async fn find(
        &self,
        project_id: Id,
        phase: ProjectPhase,
    ) -> StoreResult<Option<ProjectMilestone>> {
        Ok(self.records.read().await.get(&(project_id, phase)).cloned())
    }

    async fn upsert(&self, mut milestone: ProjectMilestone) -> StoreResult<ProjectMilestone> {
        let key = (milestone.project_id, milestone.phase);
        let now = Utc::now();
        let mut records = self.records.write().await;

        if let Some(existing) = records.get(&key) {
            milestone.id = existing.id;
            milestone.created_at = existing.created_at;
        } else {
            milestone.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst));
            milestone.created_at = Some(now);
        }
        milestone.updated_at = Some(now);

        records.insert(key, milestone.clone());
        Ok(milestone)
    }

    async fn list_for_project(&self, project_id: Id) -> StoreResult<Vec<ProjectMilestone>> {
        let records = self.records.read().await;
        let mut milestones: Vec<ProjectMilestone> = records
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        milestones.sort_by_key(|m| m.id);
        Ok(milestones)
    }
}

#[derive(Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<Id, DirectoryUser>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find(&self, id: Id) -> StoreResult<Option<DirectoryUser>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn students(&self) -> StoreResult<Vec<DirectoryUser>> {
        let users = self.users.read().await;
        let mut students: Vec<DirectoryUser> =
            users.values().filter(|u| u.is_student()).cloned().collect();
        students.sort_by_key(|u| u.id);
        Ok(students)
    }

    async fn record_supervised_project(
        &self,
        supervisor_id: Id,
        project_id: Id,
    ) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.get_mut(&supervisor_id) {
            if !user.supervised_project_ids.contains(&project_id) {
                user.supervised_project_ids.push(project_id);
            }
        }
        Ok(())
    }

    async fn upsert(&self, user: DirectoryUser) -> StoreResult<()> {
        self.users.write().await.insert(user.id, user);
        Ok(())
    }
}

/// Bundle of every in-memory store, wired the way the server and tests use
/// them.
#[derive(Clone)]
pub struct MemoryStores {
    pub projects: Arc<MemoryProjectStore>,
    pub requests: Arc<MemoryRequestStore>,
    pub members: Arc<MemoryTeamMemberStore>,
    pub suggestions: Arc<MemorySuggestionStore>,
    pub milestones: Arc<MemoryMilestoneStore>,
    pub users: Arc<MemoryUserDirectory>,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self {
            projects: Arc::new(MemoryProjectStore::new()),
            requests: Arc::new(MemoryRequestStore::new()),
            members: Arc::new(MemoryTeamMemberStore::new()),
            suggestions: Arc::new(MemorySuggestionStore::new()),
            milestones: Arc::new(MemoryMilestoneStore::new()),
            users: Arc::new(MemoryUserDirectory::new()),
        }
    }
}

impl Default for MemoryStores {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_phase_is_compare_and_set() {
        let store = MemoryProjectStore::new();
        let project = store.insert(Project::new(1, "p")).await.unwrap();
        let id = project.id.unwrap();

        assert!(store
            .set_phase(id, ProjectPhase::Draft, ProjectPhase::SupervisorReview)
            .await
            .unwrap());
        // Second transition from draft loses: the phase already moved.
        assert!(!store
            .set_phase(id, ProjectPhase::Draft, ProjectPhase::SupervisorReview)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_assign_supervisor_only_once() {
        let store = MemoryProjectStore::new();
        let project = store.insert(Project::new(1, "p")).await.unwrap();
        let id = project.id.unwrap();

        assert!(store.assign_supervisor(id, 10).await.unwrap());
        assert!(!store.assign_supervisor(id, 11).await.unwrap());
        let found = store.find(id).await.unwrap().unwrap();
        assert_eq!(found.supervisor_id, Some(10));
    }

    #[tokio::test]
    async fn test_resolve_request_once() {
        let store = MemoryRequestStore::new();
        let request = store
            .insert(SupervisorRequest::new(1, 2, None, "hi"))
            .await
            .unwrap();
        let id = request.id.unwrap();

        assert!(store
            .resolve(id, RequestStatus::Approved, None, Utc::now())
            .await
            .unwrap());
        assert!(!store
            .resolve(id, RequestStatus::Rejected, None, Utc::now())
            .await
            .unwrap());
        let found = store.find(id).await.unwrap().unwrap();
        assert_eq!(found.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_find_current_ignores_left_memberships() {
        let store = MemoryTeamMemberStore::new();
        let member = store.insert(TeamMember::invitation(1, 2, None)).await.unwrap();
        let id = member.id.unwrap();

        assert!(store.find_current(1, 2).await.unwrap().is_some());
        store
            .set_status(id, MembershipStatus::Invited, MembershipStatus::Left, None)
            .await
            .unwrap();
        assert!(store.find_current(1, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_suggestion_replace_swaps_whole_set() {
        let store = MemorySuggestionStore::new();
        let suggestion = |student_id| TeamMatchSuggestion {
            id: None,
            project_id: 1,
            student_id,
            match_score: 50,
            matched_skills: vec![],
            missing_skills: vec![],
            match_level: cap_core::types::MatchLevel::GoodFit,
            created_at: None,
        };

        store.replace_for_project(1, vec![suggestion(10), suggestion(11)]).await.unwrap();
        store.replace_for_project(1, vec![suggestion(12)]).await.unwrap();

        let listed = store.list_for_project(1).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].student_id, 12);
    }

    #[tokio::test]
    async fn test_milestone_upsert_keeps_identity() {
        let store = MemoryMilestoneStore::new();
        let first = store
            .upsert(ProjectMilestone::begin(1, ProjectPhase::SupervisorReview))
            .await
            .unwrap();
        let mut updated = first.clone();
        updated.feedback = Some("solid draft".into());
        let second = store.upsert(updated).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.list_for_project(1).await.unwrap().len(), 1);
    }
}
