//! Core data models for the map notes layer.
//!
//! These types are shared across all mapnotes crates and represent the
//! notes parsed from the feed and the transient commit requests built from
//! user actions.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::defaults;

// =============================================================================
// NOTE TYPES
// =============================================================================

/// One entry in a note's comment thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub date: String,
    pub user: String,
    pub text: String,
}

/// A community-reported issue at a point on the map.
///
/// Records are built by the feed parser or synthesized for a "create note"
/// action (`id == 0`, no comments). Once the description has been derived
/// the record is treated as immutable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Backend-assigned id; 0 until assigned.
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Open (true) or closed.
    pub opened: bool,
    /// Comment thread in server order.
    pub comments: Vec<CommentRecord>,
    /// Headline text taken from the first comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// "{date} {user}" of the first comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// True when the record lives in the local offline store.
    #[serde(default)]
    pub local: bool,
}

impl NoteRecord {
    /// Synthesize an unsaved note at a location, as used by "create note".
    pub fn new_at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            opened: true,
            ..Default::default()
        }
    }

    /// Derive `description` and `type_name` from the first comment.
    ///
    /// A short first comment (under [`defaults::DESCRIPTION_FOLD_CHARS`]
    /// characters) becomes the headline and is removed from the thread.
    /// Runs at most once: a record that already has a description is left
    /// untouched.
    pub fn derive_description(&mut self) {
        if self.description.is_some() {
            return;
        }
        let Some(first) = self.comments.first() else {
            return;
        };
        let description = first.text.clone();
        self.type_name = Some(format!("{} {}", first.date, first.user));
        if description.chars().count() < defaults::DESCRIPTION_FOLD_CHARS {
            self.comments.remove(0);
        }
        self.description = Some(description);
    }

    /// Each remaining comment rendered as `"{date} {user}:\n{text}"`.
    pub fn comment_description_list(&self) -> Vec<String> {
        self.comments
            .iter()
            .map(|comment| {
                let mut line = String::new();
                let mut needs_break = false;
                if !comment.date.is_empty() {
                    line.push_str(&comment.date);
                    line.push(' ');
                    needs_break = true;
                }
                if !comment.user.is_empty() {
                    line.push_str(&comment.user);
                    line.push(':');
                    needs_break = true;
                }
                if needs_break {
                    line.push('\n');
                }
                line.push_str(&comment.text);
                line
            })
            .collect()
    }

    /// The comment trail as a single newline-separated string.
    pub fn comment_description(&self) -> String {
        self.comment_description_list().join("\n")
    }

    /// (type name, name) pair for context menus.
    pub fn point_description(&self) -> PointDescription {
        PointDescription {
            type_name: self
                .type_name
                .clone()
                .unwrap_or_else(|| defaults::NOTE_TYPE_NAME.to_string()),
            name: self.description.clone().unwrap_or_default(),
        }
    }

    /// The note's location as a commit target.
    pub fn target(&self) -> NoteTarget {
        NoteTarget {
            id: self.id,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Display pair for a note in menus and detail views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointDescription {
    pub type_name: String,
    pub name: String,
}

// =============================================================================
// COMMIT TYPES
// =============================================================================

/// Action applied to a note by a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitAction {
    Create,
    /// Add a comment to an existing note.
    Modify,
    Reopen,
    Close,
}

impl CommitAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Reopen => "reopen",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for CommitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which store a commit goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Note identity and location handed to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteTarget {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
}

/// What a commit request does.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitKind {
    /// Create, comment on, reopen, or close a note.
    Note { action: CommitAction, note: NoteRecord },
    /// Replace the text of a record already in the local store.
    ModifyLocal { record: NoteRecord },
}

impl CommitKind {
    /// Log/display name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Note { action, .. } => action.as_str(),
            Self::ModifyLocal { .. } => "modify_local",
        }
    }

    /// The note or local record the request targets.
    pub fn record(&self) -> &NoteRecord {
        match self {
            Self::Note { note, .. } => note,
            Self::ModifyLocal { record } => record,
        }
    }
}

/// A single user-initiated commit, discarded once its outcome is handled.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRequest {
    /// Correlation id for logs.
    pub request_id: Uuid,
    pub kind: CommitKind,
    pub message: String,
    pub backend: BackendKind,
}

impl CommitRequest {
    pub fn note(
        action: CommitAction,
        note: NoteRecord,
        message: impl Into<String>,
        backend: BackendKind,
    ) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            kind: CommitKind::Note { action, note },
            message: message.into(),
            backend,
        }
    }

    /// Edits to local records always go to the local store.
    pub fn modify_local(record: NoteRecord, message: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            kind: CommitKind::ModifyLocal { record },
            message: message.into(),
            backend: BackendKind::Local,
        }
    }
}

/// Result of a backend commit or modify call.
///
/// A present `warning` means the commit failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitOutcome {
    pub warning: Option<String>,
    /// Record created or updated in the local store, if any.
    pub local_record: Option<NoteRecord>,
}

impl CommitOutcome {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn stored_locally(record: NoteRecord) -> Self {
        Self {
            warning: None,
            local_record: Some(record),
        }
    }

    pub fn failed(warning: impl Into<String>) -> Self {
        Self {
            warning: Some(warning.into()),
            local_record: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.warning.is_none()
    }
}
