//! Export and import of whole snapshots
//!
//! An export document is a JSON object carrying a format marker, a
//! version, a timestamp, and the five collections:
//!
//! ```json
//! { "format": "lifeboard", "version": 1, "exported_at": "...",
//!   "areas": [], "projects": [], "tasks": [], "notes": [], "resources": [] }
//! ```
//!
//! Import is all-or-nothing: the document is checked, parsed, and
//! validated in full before a single `ReplaceState` is dispatched.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use crate::domain::{validate, Collection, Intent, Snapshot, Violation};

use super::backend::SnapshotBackend;
use super::store::{Outcome, Store};

pub const FORMAT_MARKER: &str = "lifeboard";
pub const FORMAT_VERSION: u64 = 1;

const COLLECTIONS: [&str; 5] = ["areas", "projects", "tasks", "notes", "resources"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Export document must be a JSON object")]
    NotAnObject,

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Not a lifeboard export: format is {0}")]
    Format(String),

    #[error("Unsupported export version: {0}")]
    Version(String),

    #[error("Invalid {field}: {source}")]
    Collection {
        field: &'static str,
        source: serde_json::Error,
    },

    #[error("Export breaks store invariants: {0}")]
    Invariant(#[from] Violation),
}

/// A snapshot framed for export
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub format: &'static str,
    pub version: u64,
    pub exported_at: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: &'a Snapshot,
}

impl<'a> ExportDocument<'a> {
    pub fn new(snapshot: &'a Snapshot, exported_at: DateTime<Utc>) -> Self {
        Self {
            format: FORMAT_MARKER,
            version: FORMAT_VERSION,
            exported_at,
            snapshot,
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// Parses and validates an export document without touching any store
pub fn parse_import(text: &str) -> Result<Snapshot, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    let object = value.as_object().ok_or(ImportError::NotAnObject)?;

    match object.get("format") {
        None => return Err(ImportError::MissingField("format")),
        Some(Value::String(marker)) if marker == FORMAT_MARKER => {}
        Some(other) => return Err(ImportError::Format(other.to_string())),
    }

    match object.get("version") {
        None => return Err(ImportError::MissingField("version")),
        Some(version) if version.as_u64() == Some(FORMAT_VERSION) => {}
        Some(other) => return Err(ImportError::Version(other.to_string())),
    }

    if let Some(missing) = COLLECTIONS.iter().find(|field| !object.contains_key(**field)) {
        return Err(ImportError::MissingField(*missing));
    }

    let snapshot = Snapshot {
        areas: collection(object, "areas")?,
        projects: collection(object, "projects")?,
        tasks: collection(object, "tasks")?,
        notes: collection(object, "notes")?,
        resources: collection(object, "resources")?,
    };

    validate(&snapshot)?;
    Ok(snapshot)
}

fn collection<T: DeserializeOwned>(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Collection<T>, ImportError> {
    let raw = object
        .get(field)
        .cloned()
        .ok_or(ImportError::MissingField(field))?;
    serde_json::from_value(raw).map_err(|source| ImportError::Collection { field, source })
}

/// Replaces the store's state with an export document's contents
pub fn import_into<B: SnapshotBackend>(store: &mut Store<B>, text: &str) -> Result<Outcome> {
    let snapshot = parse_import(text)?;
    let entities = snapshot.len();

    let outcome = store.dispatch(&Intent::ReplaceState {
        snapshot: Box::new(snapshot),
    })?;
    info!(entities, "imported snapshot");
    Ok(outcome)
}
