//! # mapnotes-layer
//!
//! Presentation and editing logic for the map notes layer.
//!
//! This crate provides:
//! - Two-tier decluttering of notes for each frame
//! - Touch hit testing
//! - Local-vs-remote backend selection
//! - The asynchronous commit pipeline with user-driven retry
//! - An in-memory local note store

pub mod actions;
pub mod declutter;
pub mod host;
pub mod layer;
pub mod occupancy;
pub mod pipeline;
pub mod selector;
pub mod store;

pub use actions::{DialogKind, Operation};
pub use declutter::{Declutterer, Decluttered, IconFootprint, NoteState, Placement};
pub use host::{CommitDialog, LayerHost, Notice};
pub use layer::{draws_at, layout_frame, pick_notes, Frame, NotesLayer};
pub use occupancy::OccupancyIndex;
pub use pipeline::{CommitPipeline, Completion};
pub use selector::{select_backend, BackendSelector};
pub use store::MemoryNoteStore;
