//! Structured logging schema and field name constants for the map notes layer.
//!
//! All crates use these constants for consistent structured logging fields.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Invariant broken, state discarded |
//! | WARN  | Recoverable issue, fail-soft fallback applied |
//! | INFO  | Fetch and commit completions |
//! | DEBUG | Decision points (cache coverage, backend choice) |
//! | TRACE | Per-note iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID of a commit request.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "feed", "layer", "commit", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "parser", "fetcher", "viewport_cache", "pipeline"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "fetch", "commit", "modify", "declutter"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Note id being operated on.
pub const NOTE_ID: &str = "note_id";

/// Commit action ("create", "modify", "reopen", "close", "modify_local").
pub const ACTION: &str = "action";

/// Backend chosen for a commit ("local", "remote").
pub const BACKEND: &str = "backend";

/// Request URL.
pub const URL: &str = "url";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of notes returned by a fetch.
pub const RESULT_COUNT: &str = "result_count";

/// Viewport zoom level.
pub const ZOOM: &str = "zoom";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
