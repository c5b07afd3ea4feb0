//! Geographic bounds, pixel-space rectangles, and the viewport transform.
//!
//! The map client owns the real viewport; the layer only consumes it through
//! the [`Viewport`] trait. [`MercatorViewport`] is a plain Web Mercator
//! implementation used by the CLI and tests.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Edge length of a map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web Mercator projection.
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

// =============================================================================
// GEOGRAPHIC BOUNDS
// =============================================================================

/// A latitude/longitude rectangle (degrees). `top >= bottom`, `right >= left`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLonBounds {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl LatLonBounds {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// True if `other` lies entirely inside these bounds.
    pub fn contains(&self, other: &LatLonBounds) -> bool {
        self.left <= other.left
            && self.right >= other.right
            && self.top >= other.top
            && self.bottom <= other.bottom
    }

    /// Grow by `ratio` of the width/height on every side, clamped to valid
    /// coordinates.
    pub fn expanded(&self, ratio: f64) -> LatLonBounds {
        let dx = self.width() * ratio;
        let dy = self.height() * ratio;
        LatLonBounds {
            top: self.top + dy,
            left: self.left - dx,
            bottom: self.bottom - dy,
            right: self.right + dx,
        }
        .clamped()
    }

    /// Limit to ±90° latitude and ±180° longitude.
    ///
    /// A viewport spanning the antimeridian reports longitudes past 180;
    /// clamped bounds compare against clamped query boxes.
    pub fn clamped(&self) -> LatLonBounds {
        LatLonBounds {
            top: self.top.clamp(-90.0, 90.0),
            left: self.left.clamp(-180.0, 180.0),
            bottom: self.bottom.clamp(-90.0, 90.0),
            right: self.right.clamp(-180.0, 180.0),
        }
    }

    /// Parse `left,bottom,right,top` as used by the notes API.
    pub fn from_bbox_str(bbox: &str) -> crate::Result<Self> {
        let parts = bbox
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| crate::Error::InvalidInput(format!("bbox {}: {}", bbox, e)))?;
        match parts.as_slice() {
            [left, bottom, right, top] if top >= bottom && right >= left => {
                Ok(Self::new(*top, *left, *bottom, *right))
            }
            _ => Err(crate::Error::InvalidInput(format!(
                "bbox must be left,bottom,right,top: {}",
                bbox
            ))),
        }
    }
}

// =============================================================================
// PIXEL SPACE
// =============================================================================

/// A point in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in screen pixels (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl PixelRect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// A `width` x `height` rectangle centered on `(x, y)`.
    pub fn centered(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(
            x - width / 2.0,
            y - height / 2.0,
            x + width / 2.0,
            y + height / 2.0,
        )
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Open-interval overlap test: rectangles that only share an edge do not
    /// intersect.
    pub fn intersects(&self, other: &PixelRect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    pub fn contains(&self, other: &PixelRect) -> bool {
        self.left <= other.left
            && self.right >= other.right
            && self.top <= other.top
            && self.bottom >= other.bottom
    }
}

// =============================================================================
// VIEWPORT
// =============================================================================

/// The visible map region and its pixel projection.
pub trait Viewport {
    /// Integer zoom level.
    fn zoom(&self) -> i32;

    /// Geographic bounds of the visible area.
    fn lat_lon_bounds(&self) -> LatLonBounds;

    /// Project a coordinate to screen pixels.
    fn pixel_from_lat_lon(&self, latitude: f64, longitude: f64) -> PixelPoint;

    /// Screen rectangle covered by the viewport.
    fn pixel_bounds(&self) -> PixelRect;

    /// Display density multiplier.
    fn density(&self) -> f32 {
        1.0
    }
}

/// Web Mercator viewport centered on a coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorViewport {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub zoom: i32,
    pub width: u32,
    pub height: u32,
    pub density: f32,
}

impl MercatorViewport {
    pub fn new(center_latitude: f64, center_longitude: f64, zoom: i32, width: u32, height: u32) -> Self {
        Self {
            center_latitude,
            center_longitude,
            zoom,
            width,
            height,
            density: 1.0,
        }
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powi(self.zoom)
    }

    fn world_x(&self, longitude: f64) -> f64 {
        (longitude + 180.0) / 360.0 * self.world_size()
    }

    fn world_y(&self, latitude: f64) -> f64 {
        let lat = latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * self.world_size()
    }

    fn longitude_at(&self, world_x: f64) -> f64 {
        world_x / self.world_size() * 360.0 - 180.0
    }

    fn latitude_at(&self, world_y: f64) -> f64 {
        let n = PI - 2.0 * PI * world_y / self.world_size();
        n.sinh().atan().to_degrees()
    }
}

impl Viewport for MercatorViewport {
    fn zoom(&self) -> i32 {
        self.zoom
    }

    fn lat_lon_bounds(&self) -> LatLonBounds {
        let cx = self.world_x(self.center_longitude);
        let cy = self.world_y(self.center_latitude);
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        LatLonBounds {
            top: self.latitude_at(cy - half_h),
            left: self.longitude_at(cx - half_w),
            bottom: self.latitude_at(cy + half_h),
            right: self.longitude_at(cx + half_w),
        }
    }

    fn pixel_from_lat_lon(&self, latitude: f64, longitude: f64) -> PixelPoint {
        let x = self.world_x(longitude) - self.world_x(self.center_longitude) + self.width as f64 / 2.0;
        let y = self.world_y(latitude) - self.world_y(self.center_latitude) + self.height as f64 / 2.0;
        PixelPoint::new(x as f32, y as f32)
    }

    fn pixel_bounds(&self) -> PixelRect {
        PixelRect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    fn density(&self) -> f32 {
        self.density
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_contains() {
        let outer = LatLonBounds::new(10.0, 0.0, 0.0, 10.0);
        let inner = LatLonBounds::new(8.0, 2.0, 2.0, 8.0);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains(&outer));
    }

    #[test]
    fn test_bounds_expanded_clamps() {
        let b = LatLonBounds::new(80.0, -170.0, 60.0, -150.0);
        let e = b.expanded(0.5);
        assert_eq!(e.top, 90.0);
        assert_eq!(e.left, -180.0);
        assert_eq!(e.bottom, 50.0);
        assert_eq!(e.right, -140.0);
    }

    #[test]
    fn test_bounds_clamped_past_antimeridian() {
        let b = LatLonBounds::new(-16.5, 179.4, -17.5, 180.6).clamped();
        assert_eq!(b.left, 179.4);
        assert_eq!(b.right, 180.0);
        assert!(b.expanded(0.5).contains(&b));
    }

    #[test]
    fn test_bbox_str_round_order() {
        let b = LatLonBounds::from_bbox_str("13.3,52.4,13.5,52.6").unwrap();
        assert_eq!(b.left, 13.3);
        assert_eq!(b.bottom, 52.4);
        assert_eq!(b.right, 13.5);
        assert_eq!(b.top, 52.6);
    }

    #[test]
    fn test_bbox_str_rejects_bad_input() {
        assert!(LatLonBounds::from_bbox_str("1,2,3").is_err());
        assert!(LatLonBounds::from_bbox_str("a,b,c,d").is_err());
        assert!(LatLonBounds::from_bbox_str("10,10,0,0").is_err());
    }

    #[test]
    fn test_rect_intersects_is_open_interval() {
        let a = PixelRect::new(0.0, 0.0, 10.0, 10.0);
        let touching = PixelRect::new(10.0, 0.0, 20.0, 10.0);
        let overlapping = PixelRect::new(9.0, 9.0, 20.0, 20.0);
        assert!(!a.intersects(&touching));
        assert!(a.intersects(&overlapping));
        assert!(overlapping.intersects(&a));
    }

    #[test]
    fn test_rect_centered() {
        let r = PixelRect::centered(50.0, 40.0, 20.0, 10.0);
        assert_eq!(r, PixelRect::new(40.0, 35.0, 60.0, 45.0));
        assert_eq!(r.width(), 20.0);
        assert_eq!(r.height(), 10.0);
    }

    #[test]
    fn test_mercator_center_projects_to_screen_center() {
        let vp = MercatorViewport::new(52.52, 13.405, 14, 800, 600);
        let p = vp.pixel_from_lat_lon(52.52, 13.405);
        assert!((p.x - 400.0).abs() < 0.01);
        assert!((p.y - 300.0).abs() < 0.01);
    }

    #[test]
    fn test_mercator_bounds_contain_center_and_orient() {
        let vp = MercatorViewport::new(52.52, 13.405, 14, 800, 600);
        let b = vp.lat_lon_bounds();
        assert!(b.top > 52.52 && b.bottom < 52.52);
        assert!(b.left < 13.405 && b.right > 13.405);

        let corner = vp.pixel_from_lat_lon(b.top, b.left);
        assert!(corner.x.abs() < 0.5);
        assert!(corner.y.abs() < 0.5);
    }

    #[test]
    fn test_mercator_north_is_up() {
        let vp = MercatorViewport::new(0.0, 0.0, 10, 512, 512);
        let north = vp.pixel_from_lat_lon(0.1, 0.0);
        let east = vp.pixel_from_lat_lon(0.0, 0.1);
        assert!(north.y < 256.0);
        assert!(east.x > 256.0);
    }
}
