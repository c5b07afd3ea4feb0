//! The hosting view the layer reports back to.

use mapnotes_core::NoteRecord;

use crate::actions::DialogKind;

/// One-shot, non-blocking user notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Request to show a commit dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitDialog {
    pub kind: DialogKind,
    /// Confirm button label.
    pub title: &'static str,
    /// The note the dialog acts on (a synthesized record for "create").
    pub target: NoteRecord,
    /// Pre-filled message text.
    pub text: String,
    /// The commit will go to the local store; credential fields are hidden.
    pub offline: bool,
}

/// The view hosting the notes layer.
///
/// Calls arrive from whichever task drives [`crate::CommitPipeline`]
/// dispatch; implementations marshal to their UI thread as needed.
pub trait LayerHost: Send + Sync {
    /// False once the view has been torn down; late outcomes are dropped.
    fn is_active(&self) -> bool;

    fn show_notice(&self, notice: Notice);

    fn show_commit_dialog(&self, dialog: CommitDialog);

    /// Open the detail view for a note at a location.
    fn open_detail(&self, latitude: f64, longitude: f64, description: &str, record: &NoteRecord);
}
