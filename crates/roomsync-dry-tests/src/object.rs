// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ergonomic placed-object construction for tests.
//!
//! # Example
//!
//! ```
//! use roomsync_dry_tests::ObjectBuilder;
//! use roomsync_geom::MountType;
//!
//! let tv = ObjectBuilder::new("tv")
//!     .kind("wall-tv")
//!     .size(1.2, 0.7, 0.1)
//!     .mount(MountType::Wall)
//!     .at(0.0, 1.5, -3.9)
//!     .build();
//! assert_eq!(tv.kind, "wall-tv");
//! ```

use roomsync_core::PlacedObject;
use roomsync_geom::{Footprint, MountType, Origin, Position};

/// Builder for [`PlacedObject`] values.
///
/// Defaults to a 1 m floor cube centered on the origin, resting on the floor.
#[derive(Debug, Clone)]
pub struct ObjectBuilder {
    obj: PlacedObject,
    explicit_y: bool,
}

impl ObjectBuilder {
    /// Starts a builder for `id`.
    pub fn new(id: &str) -> Self {
        Self {
            obj: PlacedObject::new(
                id,
                "box",
                Position::ORIGIN,
                Footprint::new(1.0, 1.0, 1.0),
                MountType::Floor,
            ),
            explicit_y: false,
        }
    }

    /// Sets the catalog type label.
    pub fn kind(mut self, kind: &str) -> Self {
        self.obj.kind = kind.to_owned();
        self
    }

    /// Sets width, height and depth.
    pub fn size(mut self, width: f32, height: f32, depth: f32) -> Self {
        self.obj.footprint = Footprint::new(width, height, depth);
        self
    }

    /// Sets the mount type.
    pub fn mount(mut self, mount: MountType) -> Self {
        self.obj.mount = mount;
        self
    }

    /// Sets the vertical origin convention.
    pub fn origin(mut self, origin: Origin) -> Self {
        self.obj.origin = origin;
        self
    }

    /// Places the object at `(x, y, z)`.
    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.obj.position = Position::new(x, y, z);
        self.explicit_y = true;
        self
    }

    /// Places the object at `(x, z)`, resting on the floor.
    pub fn on_floor(mut self, x: f32, z: f32) -> Self {
        self.obj.position = Position::new(x, 0.0, z);
        self.explicit_y = false;
        self
    }

    /// Sets the yaw in degrees.
    pub fn yaw(mut self, degrees: f32) -> Self {
        self.obj.rotation_y = degrees;
        self
    }

    /// Finishes the object.
    ///
    /// Unless a height was given with [`at`](Self::at), `y` is set so the
    /// object rests on the floor.
    pub fn build(mut self) -> PlacedObject {
        if !self.explicit_y {
            self.obj.position.y = self.obj.origin.ground_y(self.obj.footprint.height);
        }
        self.obj
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn floor_objects_rest_on_the_floor_by_default() {
        let obj = ObjectBuilder::new("a").size(2.0, 0.8, 1.0).on_floor(1.0, 2.0).build();
        assert_eq!(obj.position, Position::new(1.0, 0.4, 2.0));
        let base = ObjectBuilder::new("b").origin(Origin::Base).build();
        assert_eq!(base.position.y, 0.0);
    }
}
