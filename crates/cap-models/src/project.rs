//! Project model
//!
//! Table: projects

use chrono::{DateTime, Utc};
use cap_core::traits::{Entity, Id, Identifiable, Timestamped};
use cap_core::types::ProjectPhase;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Academic project/thesis record
///
/// The central entity of the system. Its `phase` is owned by the workflow
/// engine, `supervisor_id` by the supervisor-assignment coordinator and
/// `student_ids` by the team-formation coordinator. Projects are created in
/// `draft` by their author and are never deleted by the core; the terminal
/// phase is `archived`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Option<Id>,

    /// Display title
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    /// Free-text abstract, used for duplicate detection
    #[serde(rename = "abstract")]
    pub abstract_text: String,

    /// The creating student; owner for authorization purposes
    pub author_id: Id,

    /// Students currently on the team (set semantics, author always included)
    pub student_ids: Vec<Id>,

    /// At most one supervisor; empty until assigned
    pub supervisor_id: Option<Id>,

    /// Ordered list of skill tokens used for team matching
    #[serde(default)]
    pub required_skills: Vec<String>,

    /// Lifecycle phase
    #[serde(default)]
    pub phase: ProjectPhase,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Create a new draft project owned by `author_id`.
    pub fn new(author_id: Id, title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            abstract_text: String::new(),
            author_id,
            student_ids: vec![author_id],
            supervisor_id: None,
            required_skills: Vec::new(),
            phase: ProjectPhase::Draft,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn has_supervisor(&self) -> bool {
        self.supervisor_id.is_some()
    }

    pub fn is_author(&self, user_id: Id) -> bool {
        self.author_id == user_id
    }

    pub fn on_team(&self, user_id: Id) -> bool {
        self.student_ids.contains(&user_id)
    }

    /// Set-semantic add; returns false when the id was already present.
    pub fn add_student(&mut self, user_id: Id) -> bool {
        if self.on_team(user_id) {
            return false;
        }
        self.student_ids.push(user_id);
        true
    }

    /// Returns false when the id was not on the team.
    pub fn remove_student(&mut self, user_id: Id) -> bool {
        let before = self.student_ids.len();
        self.student_ids.retain(|id| *id != user_id);
        self.student_ids.len() != before
    }
}

impl Identifiable for Project {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Project {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Project {
    const TABLE_NAME: &'static str = "projects";
    const TYPE_NAME: &'static str = "Project";
}

/// DTO for creating a new project
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectDto {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[serde(rename = "abstract", default)]
    pub abstract_text: String,

    #[serde(default)]
    pub required_skills: Vec<String>,
}

impl CreateProjectDto {
    pub fn into_project(self, author_id: Id) -> Project {
        Project {
            title: self.title,
            abstract_text: self.abstract_text,
            required_skills: self.required_skills,
            ..Project::new(author_id, "")
        }
    }
}
