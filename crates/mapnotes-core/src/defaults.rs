//! Centralized default constants for the map notes layer.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Environment overrides are resolved in `LayerConfig` and
//! `FeedConfig`.

// =============================================================================
// FEED
// =============================================================================

/// Default notes service base URL.
pub const API_URL: &str = "https://api.openstreetmap.org";

/// Path of the bounding-box notes query, relative to the base URL.
pub const NOTES_PATH: &str = "api/0.6/notes";

/// Timeout for a single feed request in seconds.
pub const FETCH_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent sent with feed requests.
pub const USER_AGENT: &str = concat!("mapnotes/", env!("CARGO_PKG_VERSION"));

/// First comments shorter than this (in characters) are folded into the
/// note description and removed from the comment trail.
pub const DESCRIPTION_FOLD_CHARS: usize = 100;

// =============================================================================
// VIEWPORT CACHE
// =============================================================================

/// Zoom levels the viewport may drift from the loaded data before a refetch.
pub const ZOOM_THRESHOLD: i32 = 1;

/// Fraction of the viewport width/height added on each side of a query box.
pub const QUERY_EXPAND_RATIO: f64 = 0.5;

// =============================================================================
// LAYER
// =============================================================================

/// Minimum zoom at which notes are fetched and drawn.
pub const MIN_ZOOM: i32 = 8;

/// Base icon edge length in pixels at density 1.0.
pub const ICON_SIZE_PX: f32 = 24.0;

/// Multiplier applied to the icon edge to get the declutter footprint.
pub const ICON_FOOTPRINT_SCALE: f32 = 3.0 / 2.5;

/// Default text scale.
pub const TEXT_SCALE: f32 = 1.0;

/// Type name shown for notes whose first comment gave no type.
pub const NOTE_TYPE_NAME: &str = "OSM Note";

// =============================================================================
// OCCUPANCY INDEX
// =============================================================================

/// Maximum subdivision depth of the per-frame occupancy quadtree.
pub const OCCUPANCY_MAX_DEPTH: usize = 4;

/// Fraction of a node's extent covered by each child quadrant.
pub const OCCUPANCY_CHILD_RATIO: f32 = 0.6;
