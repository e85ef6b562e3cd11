//! Collision detection for axis-aligned boxes
//!
//! Movement is resolved per axis: the moving box is advanced along X only and
//! along Y only, and each probe is tested on its own. Blocking one axis leaves
//! the other free, so entities slide along wall faces instead of stopping dead
//! when moving diagonally into them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in canvas units (origin top-left, y grows down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap test: boxes sharing only an edge do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// True if `other` lies entirely inside this box (edges may touch)
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.bottom() <= self.bottom()
    }

    /// Copy of this box moved by `delta`
    pub fn translated(&self, delta: Vec2) -> Rect {
        Rect::new(self.x + delta.x, self.y + delta.y, self.w, self.h)
    }

    /// Box of the same centre scaled by `factor`
    pub fn scaled_about_center(&self, factor: f32) -> Rect {
        let w = self.w * factor;
        let h = self.h * factor;
        Rect::new(
            self.x + (self.w - w) / 2.0,
            self.y + (self.h - h) / 2.0,
            w,
            h,
        )
    }
}

/// Which axes of a requested move are blocked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blocked {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Blocked {
    pub const NONE: Blocked = Blocked {
        horizontal: false,
        vertical: false,
    };

    /// Combine results from several obstacle sets
    #[inline]
    pub fn merge(self, other: Blocked) -> Blocked {
        Blocked {
            horizontal: self.horizontal || other.horizontal,
            vertical: self.vertical || other.vertical,
        }
    }

    #[inline]
    pub fn all(&self) -> bool {
        self.horizontal && self.vertical
    }

    /// Zero the blocked components of `delta`
    pub fn apply(&self, delta: Vec2) -> Vec2 {
        Vec2::new(
            if self.horizontal { 0.0 } else { delta.x },
            if self.vertical { 0.0 } else { delta.y },
        )
    }
}

/// Test one moving box against one obstacle.
///
/// A box that already overlaps the obstacle before moving is never blocked by
/// it: it may walk out, and once out the strict test stops it walking back in.
#[inline]
pub fn resolve_one(moving: &Rect, delta: Vec2, obstacle: &Rect) -> Blocked {
    if moving.overlaps(obstacle) {
        return Blocked::NONE;
    }
    Blocked {
        horizontal: moving
            .translated(Vec2::new(delta.x, 0.0))
            .overlaps(obstacle),
        vertical: moving
            .translated(Vec2::new(0.0, delta.y))
            .overlaps(obstacle),
    }
}

/// Fold [`resolve_one`] over a set of obstacles
pub fn resolve<'a, I>(moving: &Rect, delta: Vec2, obstacles: I) -> Blocked
where
    I: IntoIterator<Item = &'a Rect>,
{
    let mut blocked = Blocked::NONE;
    for obstacle in obstacles {
        blocked = blocked.merge(resolve_one(moving, delta, obstacle));
        if blocked.all() {
            break;
        }
    }
    blocked
}

/// True if `target` overlaps any of `hazards`
pub fn hits_any<'a, I>(target: &Rect, hazards: I) -> bool
where
    I: IntoIterator<Item = &'a Rect>,
{
    hazards.into_iter().any(|h| target.overlaps(h))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX: Rect = Rect::new(0.0, 0.0, 10.0, 10.0);
    const RIGHT_NEIGHBOUR: Rect = Rect::new(10.0, 0.0, 10.0, 10.0);

    #[test]
    fn test_no_overlap_far_apart() {
        let far = Rect::new(100.0, 100.0, 10.0, 10.0);
        let blocked = resolve_one(&BOX, Vec2::new(5.0, 5.0), &far);
        assert_eq!(blocked, Blocked::NONE);
    }

    #[test]
    fn test_moving_into_neighbour_blocks_horizontal() {
        let blocked = resolve_one(&BOX, Vec2::new(1.0, 0.0), &RIGHT_NEIGHBOUR);
        assert!(blocked.horizontal);
        assert!(!blocked.vertical);
    }

    #[test]
    fn test_moving_away_from_neighbour_is_free() {
        let blocked = resolve_one(&BOX, Vec2::new(-1.0, 0.0), &RIGHT_NEIGHBOUR);
        assert!(!blocked.horizontal);
    }

    #[test]
    fn test_edge_touch_is_not_collision() {
        assert!(!BOX.overlaps(&RIGHT_NEIGHBOUR));
        // Sliding vertically along the shared edge stays free
        let blocked = resolve_one(&BOX, Vec2::new(0.0, 3.0), &RIGHT_NEIGHBOUR);
        assert_eq!(blocked, Blocked::NONE);
    }

    #[test]
    fn test_diagonal_into_wall_slides() {
        // Moving right+down into a wall on the right: only X is blocked
        let blocked = resolve_one(&BOX, Vec2::new(2.0, 2.0), &RIGHT_NEIGHBOUR);
        assert!(blocked.horizontal);
        assert!(!blocked.vertical);
        assert_eq!(blocked.apply(Vec2::new(2.0, 2.0)), Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_full_overlap_probe_blocks_both_axes() {
        // Obstacle diagonally adjacent and large enough that both probes hit
        let obstacle = Rect::new(5.0, 10.0, 20.0, 20.0);
        let blocked = resolve_one(&Rect::new(0.0, 0.0, 10.0, 10.0), Vec2::new(0.0, 1.0), &obstacle);
        assert!(blocked.vertical);
        let wide = Rect::new(10.0, -5.0, 20.0, 30.0);
        let blocked = resolve(&BOX, Vec2::new(1.0, 1.0), [&wide, &Rect::new(-5.0, 10.0, 30.0, 5.0)]);
        assert!(blocked.all());
    }

    #[test]
    fn test_already_overlapping_can_escape() {
        // Bomb dropped right under the entity
        let bomb = Rect::new(2.0, 2.0, 8.0, 8.0);
        let blocked = resolve_one(&BOX, Vec2::ZERO, &bomb);
        assert_eq!(blocked, Blocked::NONE);
        let blocked = resolve_one(&BOX, Vec2::new(-3.0, 4.0), &bomb);
        assert_eq!(blocked, Blocked::NONE);
    }

    #[test]
    fn test_reentry_after_escape_is_blocked() {
        let bomb = Rect::new(10.0, 0.0, 8.0, 8.0);
        // Now just outside the bomb, moving back in
        let blocked = resolve_one(&BOX, Vec2::new(1.0, 0.0), &bomb);
        assert!(blocked.horizontal);
    }

    #[test]
    fn test_contains() {
        let door = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(door.contains(&Rect::new(1.0, 1.0, 8.0, 8.0)));
        assert!(door.contains(&door));
        assert!(!door.contains(&Rect::new(3.0, 3.0, 8.0, 8.0)));
    }

    #[test]
    fn test_scaled_about_center() {
        let r = Rect::new(0.0, 0.0, 10.0, 20.0).scaled_about_center(0.5);
        assert_eq!(r, Rect::new(2.5, 5.0, 5.0, 10.0));
    }
}
