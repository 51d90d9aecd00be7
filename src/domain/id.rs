//! Prefix-typed identifiers for every entity kind
//!
//! ID Format: `{prefix}-{token}`
//! - Area IDs: `a-{token}` (e.g., `a-7f2b4c1`)
//! - Project IDs: `p-{token}`
//! - Task IDs: `t-{token}`
//! - Note IDs: `n-{token}`
//! - Resource IDs: `r-{token}`
//!
//! Minted tokens are 7 hex chars derived from kind, title, creation
//! timestamp and a salt. Tokens from other sources only need to be
//! non-empty ASCII alphanumerics, so the prefix alone decides the kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid ID format: expected '{{prefix}}-{{token}}', got '{0}'")]
    InvalidFormat(String),

    #[error("Unknown ID prefix in '{0}': expected one of a-, p-, t-, n-, r-")]
    UnknownPrefix(String),

    #[error("Unknown entity kind: {0}")]
    UnknownKind(String),
}

/// The five collections an entity can live in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Area,
    Project,
    Task,
    Note,
    Resource,
}

impl EntityKind {
    /// Returns the ID prefix used for this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Area => "a",
            EntityKind::Project => "p",
            EntityKind::Task => "t",
            EntityKind::Note => "n",
            EntityKind::Resource => "r",
        }
    }

    /// Looks up a kind by its ID prefix
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "a" => Some(EntityKind::Area),
            "p" => Some(EntityKind::Project),
            "t" => Some(EntityKind::Task),
            "n" => Some(EntityKind::Note),
            "r" => Some(EntityKind::Resource),
            _ => None,
        }
    }

    /// Returns true for kinds that may own notes and resources
    pub fn can_hold_material(&self) -> bool {
        matches!(self, EntityKind::Area | EntityKind::Project)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Area => write!(f, "area"),
            EntityKind::Project => write!(f, "project"),
            EntityKind::Task => write!(f, "task"),
            EntityKind::Note => write!(f, "note"),
            EntityKind::Resource => write!(f, "resource"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "area" | "areas" => Ok(EntityKind::Area),
            "project" | "projects" => Ok(EntityKind::Project),
            "task" | "tasks" => Ok(EntityKind::Task),
            "note" | "notes" => Ok(EntityKind::Note),
            "resource" | "resources" => Ok(EntityKind::Resource),
            _ => Err(IdError::UnknownKind(s.to_string())),
        }
    }
}

/// Classifies a raw ID string by its prefix.
///
/// Total over all strings: anything that is not `{known-prefix}-{token}`
/// yields `None`.
pub fn classify(id: &str) -> Option<EntityKind> {
    let (prefix, token) = id.split_once('-')?;
    if !is_valid_token(token) {
        return None;
    }
    EntityKind::from_prefix(prefix)
}

fn is_valid_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Generates a 7-character hash from kind, title, timestamp and salt
fn generate_hash(kind: EntityKind, title: &str, timestamp: DateTime<Utc>, salt: u64) -> String {
    let input = format!(
        "{}{}{}{}",
        kind.prefix(),
        title,
        timestamp.timestamp_nanos_opt().unwrap_or(0),
        salt
    );
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

/// Entity ID in the format `{prefix}-{token}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    kind: EntityKind,
    token: String,
}

impl EntityId {
    /// Mints a new ID for the given kind.
    ///
    /// The salt separates entities created with the same title in the
    /// same instant; callers typically pass a running counter.
    pub fn mint(kind: EntityKind, title: &str, timestamp: DateTime<Utc>, salt: u64) -> Self {
        Self {
            kind,
            token: generate_hash(kind, title, timestamp, salt),
        }
    }

    /// Returns the kind encoded in the prefix
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the token portion of the ID
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is(&self, kind: EntityKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.prefix(), self.token)
    }
}

impl FromStr for EntityId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (prefix, token) = s
            .split_once('-')
            .ok_or_else(|| IdError::InvalidFormat(s.to_string()))?;

        if !is_valid_token(token) {
            return Err(IdError::InvalidFormat(s.to_string()));
        }

        let kind =
            EntityKind::from_prefix(prefix).ok_or_else(|| IdError::UnknownPrefix(s.to_string()))?;

        Ok(Self {
            kind,
            token: token.to_string(),
        })
    }
}

impl TryFrom<String> for EntityId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}
