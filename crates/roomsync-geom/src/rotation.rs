// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::types::footprint::Footprint;

/// Angles closer than this (degrees) to a multiple of 90° are treated as exact.
pub const RIGHT_ANGLE_TOLERANCE_DEG: f32 = 1.0;

/// Yaw that is an exact (within tolerance) multiple of 90°.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QuarterTurn {
    /// 0°.
    Zero,
    /// 90°.
    Quarter,
    /// 180°.
    Half,
    /// 270°.
    ThreeQuarter,
}

impl QuarterTurn {
    /// Returns `true` when this turn swaps width and depth.
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Quarter | Self::ThreeQuarter)
    }
}

/// Normalizes an angle in degrees to `[0, 360)`.
///
/// Non-finite input is returned unchanged so callers can still reject it.
#[must_use]
pub fn normalize_degrees(deg: f32) -> f32 {
    if !deg.is_finite() {
        return deg;
    }
    let r = deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Classifies `deg` as a quarter turn if it lies within
/// [`RIGHT_ANGLE_TOLERANCE_DEG`] of a multiple of 90°.
#[must_use]
pub fn quarter_turn(deg: f32) -> Option<QuarterTurn> {
    let n = normalize_degrees(deg);
    if !n.is_finite() {
        return None;
    }
    let k = (n / 90.0).round();
    if (n - k * 90.0).abs() > RIGHT_ANGLE_TOLERANCE_DEG {
        return None;
    }
    // k is in 0..=4 here; 4 wraps back to zero
    #[allow(clippy::cast_possible_truncation)]
    let turn = match (k as i32).rem_euclid(4) {
        0 => QuarterTurn::Zero,
        1 => QuarterTurn::Quarter,
        2 => QuarterTurn::Half,
        _ => QuarterTurn::ThreeQuarter,
    };
    Some(turn)
}

/// Footprint of the axis-aligned box bounding `footprint` after `rotation_y_deg` of yaw.
///
/// Right angles swap or keep width/depth exactly; any other angle yields
/// `w·|cos θ| + d·|sin θ|` by `w·|sin θ| + d·|cos θ|`. Height never changes.
#[must_use]
pub fn rotated_footprint(footprint: Footprint, rotation_y_deg: f32) -> Footprint {
    if let Some(turn) = quarter_turn(rotation_y_deg) {
        return if turn.swaps_axes() {
            Footprint::new(footprint.depth, footprint.height, footprint.width)
        } else {
            footprint
        };
    }
    let theta = normalize_degrees(rotation_y_deg).to_radians();
    let c = theta.cos().abs();
    let s = theta.sin().abs();
    Footprint::new(
        footprint.width * c + footprint.depth * s,
        footprint.height,
        footprint.width * s + footprint.depth * c,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_negative_and_large_angles() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(450.0), 90.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-1e-7), 0.0);
    }

    #[test]
    fn near_right_angles_are_exact() {
        assert_eq!(quarter_turn(89.4), Some(QuarterTurn::Quarter));
        assert_eq!(quarter_turn(359.5), Some(QuarterTurn::Zero));
        assert_eq!(quarter_turn(-180.8), Some(QuarterTurn::Half));
        assert_eq!(quarter_turn(45.0), None);
        assert_eq!(quarter_turn(f32::NAN), None);
    }

    #[test]
    fn quarter_turn_swaps_width_and_depth() {
        let fp = Footprint::new(2.0, 1.0, 0.5);
        assert_eq!(rotated_footprint(fp, 90.0), Footprint::new(0.5, 1.0, 2.0));
        assert_eq!(rotated_footprint(fp, 270.3), Footprint::new(0.5, 1.0, 2.0));
        assert_eq!(rotated_footprint(fp, 180.0), fp);
    }

    #[test]
    fn diagonal_yaw_inflates_bounds() {
        let fp = Footprint::new(2.0, 1.0, 2.0);
        let r = rotated_footprint(fp, 45.0);
        let expect = 2.0 * std::f32::consts::SQRT_2;
        assert!((r.width - expect).abs() < 1e-5);
        assert!((r.depth - expect).abs() < 1e-5);
        assert_eq!(r.height, 1.0);
    }
}
