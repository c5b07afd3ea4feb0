//! Asynchronous commit pipeline.
//!
//! [`CommitPipeline::submit`] runs the backend call on the runtime and
//! returns immediately. Each finished commit is queued on a completion
//! channel; the owner drains it with [`CommitPipeline::dispatch_completed`]
//! (or [`CommitPipeline::wait_and_dispatch`]) on its own thread, which is
//! where the outcome is handled. Every completion is received once, so each
//! outcome is handled exactly once and only after the commit finished.

use std::sync::Arc;
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use mapnotes_core::{BackendKind, CommitKind, CommitOutcome, CommitRequest, NoteBackend, NoteRecord};
use mapnotes_feed::ViewportCache;

use crate::actions::{DialogKind, Operation};
use crate::host::{CommitDialog, LayerHost, Notice};
use crate::selector::BackendSelector;

/// A finished commit waiting for its outcome to be handled.
#[derive(Debug, Clone)]
pub struct Completion {
    pub request: CommitRequest,
    pub outcome: CommitOutcome,
}

/// Runs commits in the background and handles their outcomes.
pub struct CommitPipeline {
    runtime: Handle,
    local: Arc<dyn NoteBackend>,
    remote: Arc<dyn NoteBackend>,
    cache: Arc<ViewportCache>,
    host: Arc<dyn LayerHost>,
    selector: BackendSelector,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: Mutex<mpsc::UnboundedReceiver<Completion>>,
}

impl CommitPipeline {
    pub fn new(
        runtime: Handle,
        local: Arc<dyn NoteBackend>,
        remote: Arc<dyn NoteBackend>,
        cache: Arc<ViewportCache>,
        host: Arc<dyn LayerHost>,
        selector: BackendSelector,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            local,
            remote,
            cache,
            host,
            selector,
            completion_tx,
            completion_rx: Mutex::new(completion_rx),
        }
    }

    pub fn selector(&self) -> &BackendSelector {
        &self.selector
    }

    /// Start a commit in the background.
    ///
    /// The returned task finishes once the outcome is queued for dispatch,
    /// not once it has been handled.
    pub fn submit(&self, request: CommitRequest) -> JoinHandle<()> {
        let task = CommitTask {
            backend: match request.backend {
                BackendKind::Local => Arc::clone(&self.local),
                BackendKind::Remote => Arc::clone(&self.remote),
            },
            completion_tx: self.completion_tx.clone(),
        };
        debug!(
            request_id = %request.request_id,
            action = request.kind.name(),
            backend = %request.backend,
            "Submitting commit"
        );
        self.runtime.spawn(task.execute(request))
    }

    /// Handle every completion that has arrived so far without waiting.
    ///
    /// Returns the number of outcomes handled.
    pub fn dispatch_completed(&self) -> usize {
        let mut completions = Vec::new();
        {
            // Another caller is draining; it will handle what is queued.
            let Ok(mut rx) = self.completion_rx.try_lock() else {
                return 0;
            };
            while let Ok(completion) = rx.try_recv() {
                completions.push(completion);
            }
        }
        let handled = completions.len();
        for completion in completions {
            self.handle_completion(completion);
        }
        handled
    }

    /// Wait for the next completion and handle it.
    ///
    /// Returns false if the channel is closed.
    pub async fn wait_and_dispatch(&self) -> bool {
        let completion = {
            let mut rx = self.completion_rx.lock().await;
            rx.recv().await
        };
        match completion {
            Some(completion) => {
                self.handle_completion(completion);
                true
            }
            None => false,
        }
    }

    /// Ask the host to show a commit dialog pre-filled with `text`.
    pub fn show_dialog(&self, kind: DialogKind, target: NoteRecord, text: impl Into<String>) {
        let offline = match kind {
            DialogKind::ModifyLocal => true,
            _ => self.selector.select(Some(&target)) == BackendKind::Local,
        };
        self.host.show_commit_dialog(CommitDialog {
            kind,
            title: kind.title(),
            target,
            text: text.into(),
            offline,
        });
    }

    fn handle_completion(&self, completion: Completion) {
        let Completion { request, outcome } = completion;
        let operation = Operation::of(&request.kind);

        if !self.host.is_active() {
            debug!(
                request_id = %request.request_id,
                action = request.kind.name(),
                "Host inactive, discarding commit outcome"
            );
            return;
        }

        match outcome.warning {
            None => {
                self.cache.clear();
                self.host
                    .show_notice(Notice::info(operation.success_message(request.backend)));
                if let Some(record) = outcome.local_record {
                    let description = record.description.clone().unwrap_or_default();
                    self.host
                        .open_detail(record.latitude, record.longitude, &description, &record);
                }
            }
            Some(warning) => {
                self.host.show_notice(Notice::error(format!(
                    "{}\n{}",
                    operation.failure_message(),
                    warning
                )));
                let target = match request.kind {
                    CommitKind::Note { note, .. } => note,
                    CommitKind::ModifyLocal { record } => record,
                };
                self.show_dialog(operation.dialog(), target, request.message);
            }
        }
    }
}

/// Backend reference bundle for a single spawned commit.
struct CommitTask {
    backend: Arc<dyn NoteBackend>,
    completion_tx: mpsc::UnboundedSender<Completion>,
}

impl CommitTask {
    #[instrument(
        skip(self, request),
        fields(
            subsystem = "commit",
            component = "pipeline",
            request_id = %request.request_id,
            action = request.kind.name(),
            backend = %request.backend,
            note_id = request.kind.record().id,
        )
    )]
    async fn execute(self, request: CommitRequest) {
        let start = Instant::now();
        let outcome = match &request.kind {
            CommitKind::Note { action, note } => {
                self.backend
                    .commit(note.target(), &request.message, *action)
                    .await
            }
            CommitKind::ModifyLocal { record } => {
                self.backend.modify(record.id, &request.message).await
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match &outcome.warning {
            None => info!(duration_ms, "Commit succeeded"),
            Some(warning) => warn!(duration_ms, %warning, "Commit failed"),
        }

        if self
            .completion_tx
            .send(Completion { request, outcome })
            .is_err()
        {
            debug!("Commit pipeline dropped, outcome discarded");
        }
    }
}
