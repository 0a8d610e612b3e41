//! Collision detection between bottles and the catching box
//!
//! Everything is axis-aligned: the box is a fixed vertical band near the
//! bottom of the play area, centered horizontally on the input position.
//! Bounds are inclusive, so touching edges count as a catch.

use glam::Vec2;

use super::state::Bottle;
use crate::consts::{BOX_BOTTOM_OFFSET, BOX_TOP_OFFSET, WIDE_BOX_FACTOR};
use crate::tuning::GameConfig;

/// Measured play-area size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl PlayArea {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A play area that has not been laid out yet reports zero (or NaN) size
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Convert a horizontal percentage to pixels
    #[inline]
    pub fn percent_to_px(&self, percent: f32) -> f32 {
        percent / 100.0 * self.width
    }
}

/// Axis-aligned box, y grows downward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box of `width` centered on `center_x`, spanning `top..=bottom`
    pub fn from_center_x(center_x: f32, width: f32, top: f32, bottom: f32) -> Self {
        Self {
            min: Vec2::new(center_x - width / 2.0, top),
            max: Vec2::new(center_x + width / 2.0, bottom),
        }
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        (self.min.x + self.max.x) / 2.0
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Vertical spans overlap (inclusive)
    #[inline]
    pub fn overlaps_y(&self, other: &Aabb) -> bool {
        self.max.y >= other.min.y && self.min.y <= other.max.y
    }

    /// Horizontal spans overlap (inclusive)
    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.max.x >= other.min.x && self.min.x <= other.max.x
    }
}

/// Result of testing one bottle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionResult {
    pub hit: bool,
    /// Caught close to the box center
    pub perfect: bool,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self::default()
    }
}

/// Catching box width in pixels, widened while the power-up is active
pub fn box_width(config: &GameConfig, wider_box: bool) -> f32 {
    if wider_box {
        config.box_width * WIDE_BOX_FACTOR
    } else {
        config.box_width
    }
}

/// The catching box for an input position (percent of width, clamped to 0..=100)
pub fn catch_box(box_x: f32, width: f32, area: &PlayArea) -> Aabb {
    let center = area.percent_to_px(box_x.clamp(0.0, 100.0));
    Aabb::from_center_x(
        center,
        width,
        area.height - BOX_TOP_OFFSET,
        area.height - BOX_BOTTOM_OFFSET,
    )
}

/// Bounding box of a bottle
pub fn bottle_bounds(bottle: &Bottle, config: &GameConfig, area: &PlayArea) -> Aabb {
    let center = area.percent_to_px(bottle.x);
    Aabb::from_center_x(
        center,
        config.bottle_width,
        bottle.y,
        bottle.y + config.bottle_height,
    )
}

/// Test one bottle against the box.
///
/// A hit is perfect when the center distance is strictly below a quarter of
/// the (possibly widened) box width. Without a measured play area nothing
/// collides.
pub fn check_collision(
    bottle: &Bottle,
    box_x: f32,
    wider_box: bool,
    config: &GameConfig,
    area: &PlayArea,
) -> CollisionResult {
    if !area.is_measured() {
        return CollisionResult::miss();
    }

    let width = box_width(config, wider_box);
    let catcher = catch_box(box_x, width, area);
    let body = bottle_bounds(bottle, config, area);

    if !body.overlaps_y(&catcher) || !body.overlaps_x(&catcher) {
        return CollisionResult::miss();
    }

    let distance = (catcher.center_x() - body.center_x()).abs();
    CollisionResult {
        hit: true,
        perfect: distance < width / 4.0,
    }
}

/// Test every bottle, removing the caught ones.
///
/// `on_catch` runs once per caught bottle, in id order, with its perfect flag.
/// Bottles that did not collide stay in `bottles` for the next tick.
pub fn check_all_collisions(
    bottles: &mut Vec<Bottle>,
    box_x: f32,
    wider_box: bool,
    config: &GameConfig,
    area: &PlayArea,
    mut on_catch: impl FnMut(&Bottle, bool),
) {
    bottles.retain(|bottle| {
        let result = check_collision(bottle, box_x, wider_box, config, area);
        if result.hit {
            on_catch(bottle, result.perfect);
        }
        !result.hit
    });
}
