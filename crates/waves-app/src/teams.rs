// League roster: the team names offered as opponents.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{read_json, write_json};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TeamError {
    #[error("team name must not be empty")]
    EmptyName,

    #[error("team {0:?} is already registered")]
    Duplicate(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamRoster {
    teams: Vec<String>,
}

impl TeamRoster {
    /// Roster from a list of names, dropping blanks and repeats.
    pub fn seeded<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roster = TeamRoster::default();
        for name in names {
            let _ = roster.add(name.as_ref());
        }
        roster
    }

    /// Load the stored roster, or seed a new one when none is stored yet.
    pub fn load_or_seed(path: &Path, seed: &[String]) -> Result<Self> {
        match read_json::<TeamRoster>(path)? {
            Some(roster) => Ok(roster),
            None => Ok(TeamRoster::seeded(seed)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    pub fn names(&self) -> &[String] {
        &self.teams
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.teams.iter().any(|t| t == name)
    }

    /// Append a team. Returns the stored (trimmed) name.
    pub fn add(&mut self, name: &str) -> Result<&str, TeamError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TeamError::EmptyName);
        }
        if self.contains(name) {
            return Err(TeamError::Duplicate(name.to_string()));
        }
        self.teams.push(name.to_string());
        Ok(&self.teams[self.teams.len() - 1])
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
