//! Shared plumbing for commands that read or change the store

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};

use crate::domain::{EntityId, EntityKind, Intent, NewEntity, Rejection, Snapshot};
use crate::storage::{FileBackend, Outcome, Store, Workspace};

/// An open workspace and its store
pub struct Session {
    workspace: Workspace,
    store: Store<FileBackend>,
}

impl Session {
    /// Opens the workspace at the current directory or a parent
    pub fn open() -> Result<Self> {
        let workspace = Workspace::open_current()?;
        let store = workspace.store()?;
        Ok(Self { workspace, store })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    pub fn store_mut(&mut self) -> &mut Store<FileBackend> {
        &mut self.store
    }

    /// Dispatches an intent. Returns false if it changed nothing; any other
    /// rejection becomes an error naming the reason.
    pub fn apply(&mut self, intent: Intent) -> Result<bool> {
        match self.store.dispatch(&intent)? {
            Outcome::Applied => Ok(true),
            Outcome::Ignored(Rejection::Unchanged) => Ok(false),
            Outcome::Ignored(reason) => Err(reason.into()),
        }
    }

    /// Looks up an entity title, failing if the entity is missing
    pub fn require(&self, id: &EntityId) -> Result<&str> {
        self.snapshot()
            .title_of(id)
            .ok_or_else(|| anyhow::anyhow!("Not found: {}", id))
    }
}

/// Parses a user-supplied entity ID
pub fn parse_id(raw: &str) -> Result<EntityId> {
    raw.parse()
        .with_context(|| format!("Invalid ID: {}", raw))
}

/// Parses a user-supplied ID and checks its kind
pub fn parse_id_of(raw: &str, kind: EntityKind) -> Result<EntityId> {
    let id = parse_id(raw)?;
    if !id.is(kind) {
        anyhow::bail!("{} is not a {}", id, kind);
    }
    Ok(id)
}

/// Parses an optional list of IDs
pub fn parse_ids(raw: &[String]) -> Result<Vec<EntityId>> {
    raw.iter().map(|r| parse_id(r)).collect()
}

/// Parses a `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {}", raw))
}

/// Starts a draft with a freshly minted ID
pub fn draft(kind: EntityKind, title: &str) -> NewEntity {
    NewEntity::mint(kind, title, Utc::now(), u64::from(std::process::id()))
}

/// Formats an ID with its title for messages
pub fn label(snapshot: &Snapshot, id: &EntityId) -> String {
    match snapshot.title_of(id) {
        Some(title) => format!("{} ({})", id, title),
        None => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_and_dates() {
        assert!(parse_id("t-abc1234").is_ok());
        assert!(parse_id("nope").is_err());
        assert!(parse_id_of("p-1", EntityKind::Project).is_ok());
        assert!(parse_id_of("p-1", EntityKind::Task).is_err());
        assert_eq!(
            parse_date("2026-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
        assert!(parse_date("03/01/2026").is_err());
    }

    #[test]
    fn drafts_get_kind_prefixed_ids() {
        let draft = draft(EntityKind::Note, "Reading list");
        assert!(draft.id.to_string().starts_with("n-"));
        assert_eq!(draft.title, "Reading list");
    }
}
