//! Per-frame quadtree of reserved icon footprints.

use mapnotes_core::defaults;
use mapnotes_core::PixelRect;

#[derive(Debug)]
struct Node {
    bounds: PixelRect,
    items: Vec<PixelRect>,
    children: Option<Box<[Node; 4]>>,
}

impl Node {
    fn new(bounds: PixelRect) -> Self {
        Self {
            bounds,
            items: Vec::new(),
            children: None,
        }
    }

    /// Corner-anchored quadrants, each `ratio` of this node's extent.
    /// Neighbouring quadrants overlap.
    fn quadrants(&self, ratio: f32) -> [PixelRect; 4] {
        let b = self.bounds;
        let w = b.width() * ratio;
        let h = b.height() * ratio;
        [
            PixelRect::new(b.left, b.top, b.left + w, b.top + h),
            PixelRect::new(b.right - w, b.top, b.right, b.top + h),
            PixelRect::new(b.left, b.bottom - h, b.left + w, b.bottom),
            PixelRect::new(b.right - w, b.bottom - h, b.right, b.bottom),
        ]
    }

    fn insert(&mut self, rect: PixelRect, depth: usize, max_depth: usize, ratio: f32) {
        if depth < max_depth {
            let quadrants = self.quadrants(ratio);
            if let Some(i) = quadrants.iter().position(|q| q.contains(&rect)) {
                let children = self
                    .children
                    .get_or_insert_with(|| Box::new(quadrants.map(Node::new)));
                children[i].insert(rect, depth + 1, max_depth, ratio);
                return;
            }
        }
        self.items.push(rect);
    }

    fn any_intersecting(&self, rect: &PixelRect) -> bool {
        if self.items.iter().any(|item| item.intersects(rect)) {
            return true;
        }
        match &self.children {
            Some(children) => children
                .iter()
                .filter(|child| child.bounds.intersects(rect))
                .any(|child| child.any_intersecting(rect)),
            None => false,
        }
    }
}

/// Spatial index of rectangles already placed in the current frame.
///
/// Rectangles outside the root bounds are kept at the root, so the index
/// stays correct for icons hanging off the screen edge.
#[derive(Debug)]
pub struct OccupancyIndex {
    root: Node,
    max_depth: usize,
    ratio: f32,
    len: usize,
}

impl OccupancyIndex {
    /// Empty index covering `bounds` (usually the screen).
    pub fn new(bounds: PixelRect) -> Self {
        Self {
            root: Node::new(bounds),
            max_depth: defaults::OCCUPANCY_MAX_DEPTH,
            ratio: defaults::OCCUPANCY_CHILD_RATIO,
            len: 0,
        }
    }

    /// True if `rect` overlaps any reserved rectangle.
    pub fn intersects(&self, rect: &PixelRect) -> bool {
        self.root.any_intersecting(rect)
    }

    pub fn insert(&mut self, rect: PixelRect) {
        self.root.insert(rect, 0, self.max_depth, self.ratio);
        self.len += 1;
    }

    /// Reserve `rect` unless it overlaps an existing reservation.
    ///
    /// Returns false (and reserves nothing) on overlap.
    pub fn try_reserve(&mut self, rect: PixelRect) -> bool {
        if self.intersects(&rect) {
            return false;
        }
        self.insert(rect);
        true
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> PixelRect {
        PixelRect::new(0.0, 0.0, 1000.0, 800.0)
    }

    #[test]
    fn test_try_reserve_rejects_overlap() {
        let mut index = OccupancyIndex::new(screen());
        assert!(index.try_reserve(PixelRect::centered(100.0, 100.0, 20.0, 20.0)));
        assert!(!index.try_reserve(PixelRect::centered(110.0, 105.0, 20.0, 20.0)));
        assert!(index.try_reserve(PixelRect::centered(130.0, 100.0, 20.0, 20.0)));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_edge_touching_rects_do_not_collide() {
        let mut index = OccupancyIndex::new(screen());
        assert!(index.try_reserve(PixelRect::new(0.0, 0.0, 10.0, 10.0)));
        assert!(index.try_reserve(PixelRect::new(10.0, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn test_finds_overlap_across_quadrants() {
        let mut index = OccupancyIndex::new(screen());
        // Deep in the top-left quadrant
        index.insert(PixelRect::centered(50.0, 50.0, 10.0, 10.0));
        // Near the center, inside the overlap of the quadrants
        index.insert(PixelRect::centered(500.0, 400.0, 30.0, 30.0));

        assert!(index.intersects(&PixelRect::centered(55.0, 55.0, 10.0, 10.0)));
        assert!(index.intersects(&PixelRect::centered(510.0, 410.0, 10.0, 10.0)));
        assert!(!index.intersects(&PixelRect::centered(900.0, 700.0, 10.0, 10.0)));
    }

    #[test]
    fn test_rects_outside_root_bounds() {
        let mut index = OccupancyIndex::new(screen());
        assert!(index.try_reserve(PixelRect::centered(-5.0, -5.0, 20.0, 20.0)));
        assert!(!index.try_reserve(PixelRect::centered(0.0, 0.0, 20.0, 20.0)));
    }

    #[test]
    fn test_matches_linear_scan() {
        let mut index = OccupancyIndex::new(screen());
        let mut placed: Vec<PixelRect> = Vec::new();
        for i in 0..200 {
            let x = ((i * 37) % 1000) as f32;
            let y = ((i * 53) % 800) as f32;
            let rect = PixelRect::centered(x, y, 24.0, 24.0);
            let expected = !placed.iter().any(|p| p.intersects(&rect));
            assert_eq!(index.try_reserve(rect), expected, "rect {}", i);
            if expected {
                placed.push(rect);
            }
        }
        assert_eq!(index.len(), placed.len());
    }
}
