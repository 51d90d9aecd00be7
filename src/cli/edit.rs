//! Field edits and lifecycle commands: edit, archive, restore, delete, review

use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::output::Output;
use super::session::{label, parse_date, parse_id, parse_ids, Session};
use crate::domain::{EntityKind, FieldUpdate, Intent, ReviewKind, Stage, Status};

/// Field flags for `edit`; only the given flags change
#[derive(Args, Debug, Default)]
pub struct EditArgs {
    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New description
    #[arg(long, short)]
    pub description: Option<String>,

    /// Replace tags (repeatable)
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,

    /// Remove all tags
    #[arg(long, conflicts_with = "tags")]
    pub clear_tags: bool,

    /// New due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,

    /// Remove the due date
    #[arg(long, conflicts_with = "due")]
    pub no_due: bool,

    /// New stage (tasks only)
    #[arg(long, short)]
    pub stage: Option<Stage>,

    /// New body (notes only)
    #[arg(long, short)]
    pub content: Option<String>,

    /// New link (resources only)
    #[arg(long, short)]
    pub url: Option<String>,

    /// Remove the link (resources only)
    #[arg(long, conflicts_with = "url")]
    pub no_url: bool,
}

impl EditArgs {
    fn into_update(self) -> Result<FieldUpdate> {
        let tags = if self.clear_tags {
            Some(Vec::new())
        } else if self.tags.is_empty() {
            None
        } else {
            Some(self.tags)
        };

        let due_date = match (self.due, self.no_due) {
            (Some(raw), _) => Some(Some(parse_date(&raw)?)),
            (None, true) => Some(None),
            (None, false) => None,
        };

        let url = match (self.url, self.no_url) {
            (Some(url), _) => Some(Some(url)),
            (None, true) => Some(None),
            (None, false) => None,
        };

        Ok(FieldUpdate {
            title: self.title,
            description: self.description,
            tags,
            due_date,
            stage: self.stage,
            content: self.content,
            url,
        })
    }
}

pub fn edit(output: &Output, id: &str, args: EditArgs) -> Result<()> {
    let mut session = Session::open()?;
    let id = parse_id(id)?;
    session.require(&id)?;

    let update = args.into_update()?;
    if update.is_empty() {
        anyhow::bail!("Nothing to edit; pass at least one field flag");
    }

    let changed = session.apply(Intent::UpdateFields {
        id: id.clone(),
        update,
    })?;

    if output.is_json() {
        output.data(&json!({
            "id": id.to_string(),
            "changed": changed,
        }));
    } else {
        output.success(&format!("Updated {}", label(session.snapshot(), &id)));
    }

    Ok(())
}

pub fn set_status(output: &Output, id: &str, status: Status) -> Result<()> {
    let mut session = Session::open()?;
    let id = parse_id(id)?;

    let changed = session.apply(Intent::SetStatus {
        id: id.clone(),
        status,
    })?;

    if output.is_json() {
        output.data(&json!({
            "id": id.to_string(),
            "status": status,
            "changed": changed,
        }));
    } else if changed {
        let verb = match status {
            Status::Active => "Restored",
            Status::Archived => "Archived",
        };
        output.success(&format!("{} {}", verb, label(session.snapshot(), &id)));
    } else {
        output.success(&format!("{} is already {}", id, status));
    }

    Ok(())
}

pub fn delete(output: &Output, id: &str) -> Result<()> {
    let mut session = Session::open()?;
    let id = parse_id(id)?;
    let name = label(session.snapshot(), &id);

    session.apply(Intent::Delete { id: id.clone() })?;

    if output.is_json() {
        output.data(&json!({
            "id": id.to_string(),
            "deleted": true,
        }));
    } else {
        output.success(&format!("Deleted {}", name));
    }

    Ok(())
}

pub fn review(output: &Output, ids: &[String]) -> Result<()> {
    let mut session = Session::open()?;
    let ids = parse_ids(ids)?;

    let kind = match ids.first().map(|id| id.kind()) {
        Some(EntityKind::Area) => ReviewKind::Area,
        Some(EntityKind::Project) => ReviewKind::Project,
        Some(other) => anyhow::bail!("Only areas and projects can be reviewed, not a {}", other),
        None => anyhow::bail!("Nothing to review"),
    };

    let changed = session.apply(Intent::MarkReviewed {
        ids: ids.clone(),
        kind,
    })?;

    let stamped: Vec<String> = ids
        .iter()
        .filter(|id| id.is(kind.entity_kind()) && session.snapshot().contains(id))
        .map(|id| id.to_string())
        .collect();

    if output.is_json() {
        output.data(&json!({
            "reviewed": stamped,
            "changed": changed,
        }));
    } else if changed {
        output.success(&format!("Reviewed {}", stamped.join(", ")));
    } else {
        output.success("Nothing to review");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_args_make_an_empty_update() {
        assert!(EditArgs::default().into_update().unwrap().is_empty());
    }

    #[test]
    fn clearing_flags_produce_explicit_nones() {
        let args = EditArgs {
            no_due: true,
            no_url: true,
            clear_tags: true,
            ..EditArgs::default()
        };
        let update = args.into_update().unwrap();
        assert_eq!(update.due_date, Some(None));
        assert_eq!(update.url, Some(None));
        assert_eq!(update.tags, Some(vec![]));
    }

    #[test]
    fn bad_date_is_an_error() {
        let args = EditArgs {
            due: Some("tomorrow".to_string()),
            ..EditArgs::default()
        };
        assert!(args.into_update().is_err());
    }
}
