//! User directory entry
//!
//! The user directory is an external collaborator; the core only reads
//! `{role, skills}` and records supervised project ids on assignment.

use cap_core::traits::Id;
use cap_core::types::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub id: Id,
    pub name: String,
    pub role: Role,
    /// Skill tokens, matched case-insensitively against project requirements
    #[serde(default)]
    pub skills: Vec<String>,
    /// Projects this user supervises (only meaningful for supervisors)
    #[serde(default)]
    pub supervised_project_ids: Vec<Id>,
}

impl DirectoryUser {
    pub fn new(id: Id, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            skills: Vec::new(),
            supervised_project_ids: Vec::new(),
        }
    }

    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    pub fn is_supervisor(&self) -> bool {
        self.role == Role::Supervisor
    }
}
