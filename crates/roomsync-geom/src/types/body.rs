// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::types::{
    footprint::Footprint,
    mount::{MountType, Origin},
    position::Position,
    rect::Rect,
};

/// Closed vertical interval `[lo, hi]` in meters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Span {
    /// Bottom of the range.
    pub lo: f32,
    /// Top of the range.
    pub hi: f32,
}

impl Span {
    /// Creates a span; callers keep `lo <= hi`.
    #[must_use]
    pub const fn new(lo: f32, hi: f32) -> Self {
        Self { lo, hi }
    }

    /// Strict interior intersection; ranges that merely touch do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.lo < other.hi && other.lo < self.hi
    }
}

/// Everything the kernel needs to know about a placed object.
///
/// `Body` is a borrowed-free value view: the layout model copies its pose
/// fields in, so geometric checks never touch ids or catalog data.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Body {
    /// Origin position.
    pub position: Position,
    /// Yaw in degrees.
    pub rotation_y: f32,
    /// Unrotated extents.
    pub footprint: Footprint,
    /// Mount type (collision domain and vertical rule).
    pub mount: MountType,
    /// Vertical origin convention.
    pub origin: Origin,
}

impl Body {
    /// Extents of the yaw-bounding box.
    #[must_use]
    pub fn rotated_footprint(&self) -> Footprint {
        self.footprint.rotated(self.rotation_y)
    }

    /// XZ rectangle of the rotated footprint around the position.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::centered(self.position, self.rotated_footprint())
    }

    /// Stored vertical range, honoring the origin convention.
    #[must_use]
    pub fn vertical_span(&self) -> Span {
        let h = self.footprint.height;
        let lo = self.origin.bottom(self.position.y, h);
        Span::new(lo, lo + h)
    }
}

/// Returns `true` when the vertical ranges of `a` and `b` intersect.
///
/// Two floor objects both stand on the ground, so they compare `[0, height]`
/// regardless of their stored `y`. Every other pairing compares the stored
/// ranges. Floor and wall objects never share a domain; callers check
/// [`MountType::shares_domain`] first, but this function still answers `false`
/// for that pairing.
#[must_use]
pub fn vertical_overlap(a: &Body, b: &Body) -> bool {
    match (a.mount, b.mount) {
        (MountType::Floor, MountType::Floor) => {
            Span::new(0.0, a.footprint.height).intersects(&Span::new(0.0, b.footprint.height))
        }
        (MountType::Floor, MountType::Wall) | (MountType::Wall, MountType::Floor) => false,
        (MountType::Wall, MountType::Wall)
        | (MountType::Surface, _)
        | (_, MountType::Surface) => a.vertical_span().intersects(&b.vertical_span()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn body(mount: MountType, origin: Origin, y: f32, h: f32) -> Body {
        Body {
            position: Position::new(0.0, y, 0.0),
            rotation_y: 0.0,
            footprint: Footprint::new(1.0, h, 1.0),
            mount,
            origin,
        }
    }

    #[test]
    fn floor_pairs_ignore_stored_height() {
        let a = body(MountType::Floor, Origin::Center, 0.5, 1.0);
        let b = body(MountType::Floor, Origin::Base, 7.0, 1.0);
        assert!(vertical_overlap(&a, &b));
    }

    #[test]
    fn stacked_wall_items_do_not_overlap() {
        let low = body(MountType::Wall, Origin::Center, 1.0, 0.5);
        let high = body(MountType::Wall, Origin::Center, 2.0, 0.5);
        assert!(!vertical_overlap(&low, &high));
    }

    #[test]
    fn base_origin_spans_upward() {
        let shelf = body(MountType::Wall, Origin::Base, 1.0, 0.5);
        assert_eq!(shelf.vertical_span(), Span::new(1.0, 1.5));
        let lamp = body(MountType::Surface, Origin::Center, 1.4, 0.2);
        assert!(vertical_overlap(&shelf, &lamp));
    }

    #[test]
    fn floor_and_wall_never_overlap() {
        let a = body(MountType::Floor, Origin::Center, 1.0, 2.0);
        let b = body(MountType::Wall, Origin::Center, 1.0, 2.0);
        assert!(!vertical_overlap(&a, &b));
    }
}
