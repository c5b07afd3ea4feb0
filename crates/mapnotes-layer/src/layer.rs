//! The notes layer: frame preparation, picking, and note actions.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::trace;

use mapnotes_core::{CommitRequest, LayerSettings, NoteRecord, PixelPoint, Viewport};
use mapnotes_feed::ViewportCache;

use crate::actions::{DialogKind, Operation};
use crate::declutter::{Declutterer, Decluttered, IconFootprint, Placement};
use crate::hit_test;
use crate::host::CommitDialog;
use crate::pipeline::CommitPipeline;

/// Notes and their render tiers for one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Snapshot the layout indexes into.
    pub notes: Arc<Vec<NoteRecord>>,
    pub layout: Decluttered,
}

impl Frame {
    pub fn note(&self, placement: &Placement) -> Option<&NoteRecord> {
        self.notes.get(placement.index)
    }
}

/// True if the layer draws anything at `zoom`.
pub fn draws_at(settings: &dyn LayerSettings, zoom: i32) -> bool {
    zoom >= settings.min_zoom()
}

/// Lay out `notes` for one frame of `viewport`.
///
/// Returns `None` below the minimum zoom.
pub fn layout_frame(
    settings: &dyn LayerSettings,
    notes: Arc<Vec<NoteRecord>>,
    viewport: &dyn Viewport,
) -> Option<Frame> {
    if !draws_at(settings, viewport.zoom()) {
        return None;
    }
    let footprint = IconFootprint::for_display(settings.text_scale(), viewport.density());
    let layout = Declutterer::new(footprint, settings.show_closed_notes()).declutter(&notes, viewport);
    Some(Frame { notes, layout })
}

/// Notes in `notes` under a touch point.
pub fn pick_notes<'a>(
    settings: &dyn LayerSettings,
    notes: &'a [NoteRecord],
    viewport: &dyn Viewport,
    point: PixelPoint,
) -> Vec<&'a NoteRecord> {
    let radius = hit_test::touch_radius(
        viewport.zoom(),
        settings.min_zoom(),
        viewport.density(),
        settings.text_scale(),
    );
    hit_test::notes_at_point(notes, viewport, point, radius, settings.show_closed_notes())
}

/// Map layer showing community notes.
pub struct NotesLayer {
    settings: Arc<dyn LayerSettings>,
    cache: Arc<ViewportCache>,
    pipeline: CommitPipeline,
}

impl NotesLayer {
    pub fn new(
        settings: Arc<dyn LayerSettings>,
        cache: Arc<ViewportCache>,
        pipeline: CommitPipeline,
    ) -> Self {
        Self {
            settings,
            cache,
            pipeline,
        }
    }

    pub fn cache(&self) -> &Arc<ViewportCache> {
        &self.cache
    }

    pub fn pipeline(&self) -> &CommitPipeline {
        &self.pipeline
    }

    /// Lay out the cached notes for a redraw, fetching new data if the
    /// viewport moved out of the cached region.
    ///
    /// Returns `None` below the minimum zoom.
    pub fn prepare_frame(&self, viewport: &dyn Viewport) -> Option<Frame> {
        if !draws_at(self.settings.as_ref(), viewport.zoom()) {
            trace!(zoom = viewport.zoom(), "Below minimum zoom, skipping notes");
            return None;
        }
        // Fetch runs detached; this frame draws whatever is cached now.
        drop(self.cache.query_new_data(viewport));

        let notes = self.cache.results().unwrap_or_default();
        layout_frame(self.settings.as_ref(), notes, viewport)
    }

    /// Notes under a touch point.
    pub fn collect_objects_at(&self, viewport: &dyn Viewport, point: PixelPoint) -> Vec<NoteRecord> {
        let Some(notes) = self.cache.results() else {
            return Vec::new();
        };
        pick_notes(self.settings.as_ref(), &notes, viewport, point)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Show the create dialog for a new note at a location.
    pub fn open_note(&self, latitude: f64, longitude: f64, message: &str) {
        self.pipeline
            .show_dialog(DialogKind::Create, NoteRecord::new_at(latitude, longitude), message);
    }

    /// Create a note at a location without asking.
    pub fn open_note_now(&self, latitude: f64, longitude: f64, message: &str) -> JoinHandle<()> {
        let note = NoteRecord::new_at(latitude, longitude);
        self.submit(DialogKind::Create.operation(), note, message)
    }

    pub fn comment_note(&self, note: &NoteRecord, text: &str) {
        self.pipeline.show_dialog(DialogKind::Comment, note.clone(), text);
    }

    pub fn close_note(&self, note: &NoteRecord, text: &str) {
        self.pipeline.show_dialog(DialogKind::Close, note.clone(), text);
    }

    pub fn reopen_note(&self, note: &NoteRecord, text: &str) {
        self.pipeline.show_dialog(DialogKind::Reopen, note.clone(), text);
    }

    /// Show the edit dialog for a record in the local store, pre-filled
    /// with its current text.
    pub fn modify_local_note(&self, record: &NoteRecord) {
        let text = record.description.clone().unwrap_or_default();
        self.pipeline
            .show_dialog(DialogKind::ModifyLocal, record.clone(), text);
    }

    /// Submit the commit for a confirmed dialog.
    pub fn confirm_dialog(&self, dialog: &CommitDialog, text: &str) -> JoinHandle<()> {
        self.submit(dialog.kind.operation(), dialog.target.clone(), text)
    }

    /// Handle finished commits. Call from the thread that owns the host.
    pub fn dispatch_completed(&self) -> usize {
        self.pipeline.dispatch_completed()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn submit(&self, operation: Operation, note: NoteRecord, text: &str) -> JoinHandle<()> {
        let request = match operation {
            Operation::Note(action) => {
                let backend = self.pipeline.selector().select(Some(&note));
                CommitRequest::note(action, note, text, backend)
            }
            Operation::ModifyLocal => CommitRequest::modify_local(note, text),
        };
        self.pipeline.submit(request)
    }
}
