//! Splits the visible notes into full icons and compact markers.
//!
//! One greedy pass over the notes in input order reserves a footprint for
//! every note whose footprint is still free; those notes get the compact
//! marker. Notes that collide are deferred and all drawn as full icons in a
//! second pass, without re-checking the index. Notes are never moved.

use mapnotes_core::{defaults, NoteRecord, PixelPoint, PixelRect, Viewport};
use tracing::trace;

use crate::occupancy::OccupancyIndex;

/// Size of the screen area reserved per note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconFootprint {
    pub width: f32,
    pub height: f32,
}

impl IconFootprint {
    pub fn square(size: f32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }

    /// Footprint of the note icon at the given text scale and density.
    pub fn for_display(text_scale: f32, density: f32) -> Self {
        Self::square(defaults::ICON_SIZE_PX * density * defaults::ICON_FOOTPRINT_SCALE * text_scale)
    }

    fn around(&self, point: PixelPoint) -> PixelRect {
        PixelRect::centered(point.x, point.y, self.width, self.height)
    }
}

/// Open/closed styling of a placed note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    Unresolved,
    Resolved,
}

impl NoteState {
    pub fn of(note: &NoteRecord) -> Self {
        if note.opened {
            NoteState::Unresolved
        } else {
            NoteState::Resolved
        }
    }

    /// Symbol drawn inside a full icon.
    pub fn icon_name(&self) -> &'static str {
        match self {
            NoteState::Unresolved => "mx_special_symbol_remove",
            NoteState::Resolved => "mx_special_symbol_check_mark",
        }
    }
}

/// A note placed on screen this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Index into the note slice passed to [`Declutterer::declutter`].
    pub index: usize,
    pub point: PixelPoint,
    pub state: NoteState,
}

/// Render tiers for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decluttered {
    /// Drawn with the open/closed icon.
    pub full: Vec<Placement>,
    /// Drawn as a small dot.
    pub compact: Vec<Placement>,
}

impl Decluttered {
    pub fn len(&self) -> usize {
        self.full.len() + self.compact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.full.is_empty() && self.compact.is_empty()
    }
}

/// Per-frame declutter pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Declutterer {
    pub footprint: IconFootprint,
    pub show_closed: bool,
}

impl Declutterer {
    pub fn new(footprint: IconFootprint, show_closed: bool) -> Self {
        Self {
            footprint,
            show_closed,
        }
    }

    /// Assign each visible note a render tier for this viewport.
    pub fn declutter(&self, notes: &[NoteRecord], viewport: &dyn Viewport) -> Decluttered {
        let mut index = OccupancyIndex::new(viewport.pixel_bounds());
        let mut result = Decluttered::default();
        let mut deferred = Vec::new();

        for (i, note) in notes.iter().enumerate() {
            if !note.opened && !self.show_closed {
                continue;
            }
            let point = viewport.pixel_from_lat_lon(note.latitude, note.longitude);
            let placement = Placement {
                index: i,
                point,
                state: NoteState::of(note),
            };
            if index.try_reserve(self.footprint.around(point)) {
                result.compact.push(placement);
            } else {
                deferred.push(placement);
            }
        }

        // Crowded notes are upgraded without another collision check.
        result.full.extend(deferred);

        trace!(
            full = result.full.len(),
            compact = result.compact.len(),
            reserved = index.len(),
            "Decluttered notes"
        );
        result
    }
}
