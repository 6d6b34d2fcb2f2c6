use glam::Vec3;

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    pub fn expand_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn half_extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// A box enclosing no volume never participates in collision.
    pub fn is_degenerate(&self) -> bool {
        let size = self.size();
        size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0
    }

    /// Closed-interval overlap test: boxes sharing only a face still
    /// intersect, matching the interchange viewer the editor pairs with.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// The editable room volume: `[-w/2, w/2] x [0, h] x [-l/2, l/2]`.
///
/// Derived once per session from the project configuration; never stored on
/// entities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsVolume {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundsVolume {
    pub fn from_dimensions(width: f32, length: f32, height: f32) -> Self {
        Self {
            min: Vec3::new(-width * 0.5, 0.0, -length * 0.5),
            max: Vec3::new(width * 0.5, height, length * 0.5),
        }
    }

    /// Clamp a position so a box with the given half extents stays inside.
    ///
    /// Each axis projects independently, so an object dragged against a wall
    /// slides along it instead of snapping back. An object larger than the
    /// volume on some axis resolves to the low bound on that axis.
    pub fn clamp_position(&self, position: Vec3, half_extents: Vec3) -> Vec3 {
        Vec3::new(
            clamp_axis(position.x, self.min.x + half_extents.x, self.max.x - half_extents.x),
            clamp_axis(position.y, self.min.y + half_extents.y, self.max.y - half_extents.y),
            clamp_axis(position.z, self.min.z + half_extents.z, self.max.z - half_extents.z),
        )
    }

    pub fn contains(&self, aabb: &Aabb, tolerance: f32) -> bool {
        aabb.min.x >= self.min.x - tolerance
            && aabb.min.y >= self.min.y - tolerance
            && aabb.min.z >= self.min.z - tolerance
            && aabb.max.x <= self.max.x + tolerance
            && aabb.max.y <= self.max.y + tolerance
            && aabb.max.z <= self.max.z + tolerance
    }
}

fn clamp_axis(value: f32, lo: f32, hi: f32) -> f32 {
    value.min(hi).max(lo)
}
