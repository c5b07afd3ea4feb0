//! Core traits for the map notes layer.
//!
//! These traits are the seams to externally-owned collaborators: the notes
//! feed, the commit backends, connectivity, and user settings.

use async_trait::async_trait;

use crate::geometry::LatLonBounds;
use crate::models::{CommitAction, CommitOutcome, NoteRecord, NoteTarget};

// =============================================================================
// FEED
// =============================================================================

/// Source of notes for a geographic region.
///
/// Implementations are fail-soft: any failure yields an empty list.
#[async_trait]
pub trait NoteSource: Send + Sync {
    async fn fetch_notes(&self, bounds: LatLonBounds) -> Vec<NoteRecord>;
}

// =============================================================================
// COMMIT BACKENDS
// =============================================================================

/// A store that accepts note edits: either the local offline store or the
/// remote notes service.
///
/// Failures are reported through [`CommitOutcome::warning`], never as errors.
#[async_trait]
pub trait NoteBackend: Send + Sync {
    /// Apply `action` with `message` to the note at `target`.
    async fn commit(&self, target: NoteTarget, message: &str, action: CommitAction)
        -> CommitOutcome;

    /// Replace the text of a record already held locally.
    async fn modify(&self, local_record_id: i64, message: &str) -> CommitOutcome;
}

// =============================================================================
// ENVIRONMENT QUERIES
// =============================================================================

/// Network reachability probe.
pub trait ConnectivityProbe: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Read-only view of the user settings the layer consults.
pub trait LayerSettings: Send + Sync {
    /// Commits go to the local store regardless of connectivity.
    fn offline_editing(&self) -> bool;

    /// Draw and hit-test closed notes.
    fn show_closed_notes(&self) -> bool;

    /// Zoom below which the layer fetches and draws nothing.
    fn min_zoom(&self) -> i32;

    /// Text scale applied to icon sizes and touch radii.
    fn text_scale(&self) -> f32;
}
