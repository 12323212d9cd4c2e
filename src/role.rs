// src/role.rs
//! Hiring-role archetypes every source is scored against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Developer,
    SeniorDeveloper,
    SolutionArchitect,
}

impl Role {
    /// All roles in report order.
    pub const ALL: [Role; 3] = [
        Role::Developer,
        Role::SeniorDeveloper,
        Role::SolutionArchitect,
    ];

    /// Human-readable label used in report headings.
    pub fn label(self) -> &'static str {
        match self {
            Role::Developer => "Developer",
            Role::SeniorDeveloper => "Senior Developer",
            Role::SolutionArchitect => "Solution Architect",
        }
    }

    /// Stable machine name (config keys, JSON).
    pub fn slug(self) -> &'static str {
        match self {
            Role::Developer => "developer",
            Role::SeniorDeveloper => "senior-developer",
            Role::SolutionArchitect => "solution-architect",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = PipelineError;

    /// Accepts slugs, labels and snake_case, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect();
        match key.as_str() {
            "developer" | "dev" => Ok(Role::Developer),
            "senior-developer" | "senior" => Ok(Role::SeniorDeveloper),
            "solution-architect" | "architect" => Ok(Role::SolutionArchitect),
            _ => Err(PipelineError::UnknownRole(s.to_string())),
        }
    }
}
