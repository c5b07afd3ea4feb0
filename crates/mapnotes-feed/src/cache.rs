//! Viewport-keyed cache of the last fetched notes.
//!
//! The render loop calls [`ViewportCache::query_new_data`] on every frame;
//! a background fetch only starts when the viewport leaves the region the
//! cached (or in-flight) data covers, or the zoom drifts past the threshold.
//! Late responses for an older viewport are still stored: their bounds are
//! part of the key, so the next frame refetches if they no longer cover it.
//! Responses for fetches started before a [`ViewportCache::clear`] are
//! dropped.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use mapnotes_core::{defaults, LatLonBounds, NoteRecord, NoteSource, Viewport};

/// Region and zoom a set of results was loaded for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportKey {
    pub bounds: LatLonBounds,
    pub zoom: i32,
}

impl ViewportKey {
    /// Key for a viewport, with its bounds clamped to valid coordinates.
    pub fn of(viewport: &dyn Viewport) -> Self {
        Self {
            bounds: viewport.lat_lon_bounds().clamped(),
            zoom: viewport.zoom(),
        }
    }

    /// True if data loaded for `self` can serve `requested`.
    pub fn covers(&self, requested: &ViewportKey, zoom_threshold: i32) -> bool {
        self.bounds.contains(&requested.bounds)
            && (self.zoom - requested.zoom).abs() <= zoom_threshold
    }
}

#[derive(Debug, Default)]
struct CacheState {
    loaded: Option<ViewportKey>,
    pending: Option<ViewportKey>,
    results: Option<Arc<Vec<NoteRecord>>>,
    /// Bumped by every `clear()`; fetches started before a clear are not stored.
    generation: u64,
}

impl CacheState {
    fn covers(&self, requested: &ViewportKey, zoom_threshold: i32) -> bool {
        self.loaded
            .iter()
            .chain(self.pending.iter())
            .any(|key| key.covers(requested, zoom_threshold))
    }
}

/// Caches the notes for the last loaded viewport.
pub struct ViewportCache {
    source: Arc<dyn NoteSource>,
    runtime: Handle,
    zoom_threshold: i32,
    expand_ratio: f64,
    state: Arc<RwLock<CacheState>>,
}

impl ViewportCache {
    /// Create a cache that fetches from `source` on `runtime`.
    pub fn new(source: Arc<dyn NoteSource>, runtime: Handle) -> Self {
        Self {
            source,
            runtime,
            zoom_threshold: defaults::ZOOM_THRESHOLD,
            expand_ratio: defaults::QUERY_EXPAND_RATIO,
            state: Arc::new(RwLock::new(CacheState::default())),
        }
    }

    pub fn with_zoom_threshold(mut self, threshold: i32) -> Self {
        self.zoom_threshold = threshold;
        self
    }

    /// Fraction of the viewport added on each side of the fetched region.
    pub fn with_expand_ratio(mut self, ratio: f64) -> Self {
        self.expand_ratio = ratio;
        self
    }

    /// Start a background fetch if the viewport is not covered.
    ///
    /// Returns the fetch task when one was started.
    pub fn query_new_data(&self, viewport: &dyn Viewport) -> Option<JoinHandle<()>> {
        let requested = ViewportKey::of(viewport);
        let query = ViewportKey {
            bounds: requested.bounds.expanded(self.expand_ratio),
            zoom: requested.zoom,
        };

        let generation = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.covers(&requested, self.zoom_threshold) {
                trace!(zoom = requested.zoom, "Viewport covered by cached notes");
                return None;
            }
            state.pending = Some(query);
            state.generation
        };

        debug!(zoom = query.zoom, bounds = ?query.bounds, "Viewport changed, fetching notes");

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        Some(self.runtime.spawn(async move {
            let notes = source.fetch_notes(query.bounds).await;
            store_results(&state, query, generation, notes);
        }))
    }

    /// Fetch and store the notes for a viewport, waiting for the result.
    ///
    /// The notes are returned even if a `clear()` during the fetch kept
    /// them out of the cache.
    pub async fn refresh(&self, viewport: &dyn Viewport) -> Arc<Vec<NoteRecord>> {
        let requested = ViewportKey::of(viewport);
        let query = ViewportKey {
            bounds: requested.bounds.expanded(self.expand_ratio),
            zoom: requested.zoom,
        };
        let generation = self.generation();
        let notes = self.source.fetch_notes(query.bounds).await;
        store_results(&self.state, query, generation, notes)
    }

    /// Snapshot of the current results, if any have been loaded.
    pub fn results(&self) -> Option<Arc<Vec<NoteRecord>>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .results
            .clone()
    }

    /// Key the current results were loaded for.
    pub fn loaded_key(&self) -> Option<ViewportKey> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .loaded
    }

    /// Drop the cached results so the next frame refetches.
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.loaded = None;
        state.pending = None;
        state.results = None;
        state.generation += 1;
        debug!(generation = state.generation, "Cleared notes cache");
    }

    /// Number of times the cache has been cleared.
    pub fn generation(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }
}

fn store_results(
    state: &RwLock<CacheState>,
    key: ViewportKey,
    generation: u64,
    notes: Vec<NoteRecord>,
) -> Arc<Vec<NoteRecord>> {
    let notes = Arc::new(notes);
    let mut state = state.write().unwrap_or_else(PoisonError::into_inner);
    if state.generation != generation {
        debug!(
            generation,
            current = state.generation,
            "Cache cleared during fetch, dropping stale notes"
        );
        return notes;
    }
    if state.pending == Some(key) {
        state.pending = None;
    }
    state.loaded = Some(key);
    state.results = Some(Arc::clone(&notes));
    notes
}
