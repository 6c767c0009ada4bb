//! Geometry - Integer points and axis-aligned boxes in world units

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// Integer world coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    /// Nearest integer point to a float position.
    pub fn from_vec2(v: Vec2) -> Self {
        Self { x: v.x.round() as i32, y: v.y.round() as i32 }
    }
}

/// Axis-aligned box given by its center and half-extents.
///
/// The box covers the half-open ranges `[pos - hbounds, pos + hbounds)` on
/// both axes, so two boxes sharing an edge neither overlap nor both contain
/// the points on that edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Point,
    pub hbounds: Point,
}

impl Default for Aabb {
    fn default() -> Self {
        Self { pos: Point::ZERO, hbounds: Point::new(1, 1) }
    }
}

impl Aabb {
    pub const fn new(pos: Point, hbounds: Point) -> Self {
        Self { pos, hbounds }
    }

    /// Box centered on `(x, y)` with half-extents `(hw, hh)`.
    pub const fn centered(x: i32, y: i32, hw: i32, hh: i32) -> Self {
        Self { pos: Point::new(x, y), hbounds: Point::new(hw, hh) }
    }

    /// Box covering `[left, right) x [bottom, top)`. Odd spans are widened by one
    /// unit so the result stays representable with an integer center.
    /// Corners near the `i32` limits saturate instead of wrapping.
    pub fn from_corners(left: i32, bottom: i32, right: i32, top: i32) -> Self {
        let hw = right.saturating_sub(left).saturating_add(1) / 2;
        let hh = top.saturating_sub(bottom).saturating_add(1) / 2;
        Self::centered(left.saturating_add(hw), bottom.saturating_add(hh), hw, hh)
    }

    pub fn min(&self) -> Point {
        Point::new(self.pos.x.saturating_sub(self.hbounds.x), self.pos.y.saturating_sub(self.hbounds.y))
    }

    /// Exclusive upper corner, saturating at `i32::MAX`.
    pub fn max(&self) -> Point {
        Point::new(self.pos.x.saturating_add(self.hbounds.x), self.pos.y.saturating_add(self.hbounds.y))
    }

    pub fn width(&self) -> i32 { self.hbounds.x.saturating_mul(2) }
    pub fn height(&self) -> i32 { self.hbounds.y.saturating_mul(2) }

    pub fn is_empty(&self) -> bool {
        self.hbounds.x <= 0 || self.hbounds.y <= 0
    }

    /// Half-open point containment.
    pub fn contains(&self, p: Point) -> bool {
        let (min, max) = (self.min(), self.max());
        p.x >= min.x && p.x < max.x && p.y >= min.y && p.y < max.y
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Aabb) -> bool {
        let (min, max) = (self.min(), self.max());
        let (omin, omax) = (other.min(), other.max());
        omin.x >= min.x && omax.x <= max.x && omin.y >= min.y && omax.y <= max.y
    }

    /// Strict overlap on both axes. Touching edges do not count, and an empty
    /// box intersects nothing.
    pub fn intersects(&self, other: &Aabb) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let (min, max) = (self.min(), self.max());
        let (omin, omax) = (other.min(), other.max());
        min.x < omax.x && omin.x < max.x && min.y < omax.y && omin.y < max.y
    }

    /// The same box moved so it is centered on `pos`.
    pub fn with_pos(self, pos: Point) -> Self {
        Self { pos, hbounds: self.hbounds }
    }

    /// Split into four equal quadrants (SW, SE, NW, NE), or None if the
    /// half-extents are odd and the children would not tile this box exactly.
    pub fn quadrants(&self) -> Option<[Aabb; 4]> {
        let (hx, hy) = (self.hbounds.x, self.hbounds.y);
        if hx < 2 || hy < 2 || hx % 2 != 0 || hy % 2 != 0 {
            return None;
        }
        let (qx, qy) = (hx / 2, hy / 2);
        let (cx, cy) = (self.pos.x, self.pos.y);
        Some([
            Aabb::centered(cx - qx, cy - qy, qx, qy),
            Aabb::centered(cx + qx, cy - qy, qx, qy),
            Aabb::centered(cx - qx, cy + qy, qx, qy),
            Aabb::centered(cx + qx, cy + qy, qx, qy),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let b = Aabb::centered(10, 10, 5, 5);
        assert!(b.contains(Point::new(5, 5)));
        assert!(b.contains(Point::new(14, 14)));
        assert!(!b.contains(Point::new(15, 10)));
        assert!(!b.contains(Point::new(10, 15)));
        assert!(!b.contains(Point::new(4, 10)));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Aabb::centered(0, 0, 5, 5);
        let right = Aabb::centered(10, 0, 5, 5);
        let above = Aabb::centered(0, 10, 5, 5);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&above));
        let overlap = Aabb::centered(9, 0, 5, 5);
        assert!(a.intersects(&overlap));
        assert!(overlap.intersects(&a));
    }

    #[test]
    fn disjoint_on_one_axis_does_not_intersect() {
        let a = Aabb::centered(0, 0, 5, 5);
        let far = Aabb::centered(3, 100, 5, 5);
        assert!(!a.intersects(&far));
    }

    #[test]
    fn empty_box_intersects_nothing() {
        let a = Aabb::centered(0, 0, 5, 5);
        let empty = Aabb::centered(0, 0, 0, 3);
        assert!(!a.intersects(&empty));
        assert!(!empty.intersects(&empty));
    }

    #[test]
    fn box_intersects_itself() {
        let a = Aabb::centered(7, -3, 1, 1);
        assert!(a.intersects(&a));
        assert!(a.contains_box(&a));
    }

    #[test]
    fn quadrants_tile_parent() {
        let parent = Aabb::centered(64, 64, 64, 64);
        let quads = parent.quadrants().unwrap();
        for q in &quads {
            assert!(parent.contains_box(q));
        }
        for (i, a) in quads.iter().enumerate() {
            for b in quads.iter().skip(i + 1) {
                assert!(!a.intersects(b));
            }
        }
        let area: i32 = quads.iter().map(|q| q.width() * q.height()).sum();
        assert_eq!(area, parent.width() * parent.height());
    }

    #[test]
    fn odd_extent_does_not_split() {
        assert!(Aabb::centered(0, 0, 3, 4).quadrants().is_none());
        assert!(Aabb::centered(0, 0, 1, 1).quadrants().is_none());
    }

    #[test]
    fn from_corners_covers_span() {
        let b = Aabb::from_corners(0, 0, 100, 50);
        assert_eq!(b.min(), Point::new(0, 0));
        assert_eq!(b.max(), Point::new(100, 50));
        let odd = Aabb::from_corners(0, 0, 7, 7);
        assert!(odd.contains(Point::new(6, 6)));
    }

    #[test]
    fn corners_at_i32_limits_saturate() {
        let b = Aabb::from_corners(i32::MAX - 10, i32::MIN, i32::MAX, i32::MIN + 4);
        assert_eq!(b.max().x, i32::MAX);
        assert_eq!(b.min().y, i32::MIN);
        assert!(b.contains(Point::new(i32::MAX - 1, i32::MIN + 1)));
        assert!(!b.intersects(&Aabb::centered(0, 0, 100, 100)));
    }
}
