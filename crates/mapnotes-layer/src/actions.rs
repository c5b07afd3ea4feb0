//! Dialog kinds and per-operation user messages.
//!
//! Every commit operation maps to exactly one dialog (used both to start
//! it and to retry it after a failure), one success notice, and one
//! failure notice. All mappings are exhaustive matches.

use std::fmt;

use mapnotes_core::{BackendKind, CommitAction, CommitKind};

/// Commit dialog shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    Create,
    Comment,
    Reopen,
    Close,
    /// Edit the text of a record in the local store.
    ModifyLocal,
}

impl DialogKind {
    pub fn for_action(action: CommitAction) -> Self {
        match action {
            CommitAction::Create => DialogKind::Create,
            CommitAction::Modify => DialogKind::Comment,
            CommitAction::Reopen => DialogKind::Reopen,
            CommitAction::Close => DialogKind::Close,
        }
    }

    /// Label of the dialog's confirm button.
    pub fn title(&self) -> &'static str {
        match self {
            DialogKind::Create => "Add note",
            DialogKind::Comment => "Add comment",
            DialogKind::Reopen => "Reopen note",
            DialogKind::Close => "Close note",
            DialogKind::ModifyLocal => "Modify note",
        }
    }

    /// Operation submitted when the dialog is confirmed.
    pub fn operation(&self) -> Operation {
        match self {
            DialogKind::Create => Operation::Note(CommitAction::Create),
            DialogKind::Comment => Operation::Note(CommitAction::Modify),
            DialogKind::Reopen => Operation::Note(CommitAction::Reopen),
            DialogKind::Close => Operation::Note(CommitAction::Close),
            DialogKind::ModifyLocal => Operation::ModifyLocal,
        }
    }
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A commit operation, independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Note(CommitAction),
    ModifyLocal,
}

impl Operation {
    pub fn of(kind: &CommitKind) -> Self {
        match kind {
            CommitKind::Note { action, .. } => Operation::Note(*action),
            CommitKind::ModifyLocal { .. } => Operation::ModifyLocal,
        }
    }

    /// Dialog re-opened when this operation fails.
    pub fn dialog(&self) -> DialogKind {
        match self {
            Operation::Note(action) => DialogKind::for_action(*action),
            Operation::ModifyLocal => DialogKind::ModifyLocal,
        }
    }

    /// Notice shown after a successful commit to `backend`.
    pub fn success_message(&self, backend: BackendKind) -> &'static str {
        if backend == BackendKind::Local {
            return "Changes added to local edits";
        }
        match self {
            Operation::Note(CommitAction::Create) => "Note created",
            Operation::Note(CommitAction::Modify) => "Comment added",
            Operation::Note(CommitAction::Reopen) => "Note reopened",
            Operation::Note(CommitAction::Close) => "Note closed",
            Operation::ModifyLocal => "Changes added to local edits",
        }
    }

    /// Headline of the notice shown when the commit fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Note(CommitAction::Create) => "Could not create note",
            Operation::Note(CommitAction::Modify) => "Could not add comment",
            Operation::Note(CommitAction::Reopen) => "Could not reopen note",
            Operation::Note(CommitAction::Close) => "Could not close note",
            Operation::ModifyLocal => "Could not modify note",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapnotes_core::NoteRecord;

    const ACTIONS: [CommitAction; 4] = [
        CommitAction::Create,
        CommitAction::Modify,
        CommitAction::Reopen,
        CommitAction::Close,
    ];

    #[test]
    fn test_failure_rearms_initiating_dialog() {
        assert_eq!(Operation::Note(CommitAction::Create).dialog(), DialogKind::Create);
        assert_eq!(Operation::Note(CommitAction::Close).dialog(), DialogKind::Close);
        assert_eq!(Operation::Note(CommitAction::Reopen).dialog(), DialogKind::Reopen);
        assert_eq!(Operation::Note(CommitAction::Modify).dialog(), DialogKind::Comment);
        assert_eq!(Operation::ModifyLocal.dialog(), DialogKind::ModifyLocal);
    }

    #[test]
    fn test_dialog_operation_round_trips() {
        for action in ACTIONS {
            let op = Operation::Note(action);
            assert_eq!(op.dialog().operation(), op);
        }
        assert_eq!(DialogKind::ModifyLocal.operation(), Operation::ModifyLocal);
    }

    #[test]
    fn test_operation_of_commit_kind() {
        let note = NoteRecord::new_at(1.0, 1.0);
        let kind = CommitKind::Note {
            action: CommitAction::Reopen,
            note: note.clone(),
        };
        assert_eq!(Operation::of(&kind), Operation::Note(CommitAction::Reopen));
        let local = CommitKind::ModifyLocal { record: note };
        assert_eq!(Operation::of(&local), Operation::ModifyLocal);
    }

    #[test]
    fn test_local_success_message_ignores_action() {
        for action in ACTIONS {
            assert_eq!(
                Operation::Note(action).success_message(BackendKind::Local),
                "Changes added to local edits"
            );
        }
        assert_eq!(
            Operation::Note(CommitAction::Close).success_message(BackendKind::Remote),
            "Note closed"
        );
    }

    #[test]
    fn test_titles_are_distinct() {
        let kinds = [
            DialogKind::Create,
            DialogKind::Comment,
            DialogKind::Reopen,
            DialogKind::Close,
            DialogKind::ModifyLocal,
        ];
        let mut titles: Vec<&str> = kinds.iter().map(|k| k.title()).collect();
        titles.sort_unstable();
        titles.dedup();
        assert_eq!(titles.len(), kinds.len());
    }
}
