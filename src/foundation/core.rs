use crate::foundation::error::{PrettifierError, PrettifierResult};

pub use kurbo::{Rect, Vec2};

/// World-space 3D vector, Y up.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);
    pub const FORWARD: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, o: Self) -> f32 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    pub fn cross(self, o: Self) -> Self {
        Self {
            x: self.y * o.z - self.z * o.y,
            y: self.z * o.x - self.x * o.z,
            z: self.x * o.y - self.y * o.x,
        }
    }

    pub fn scale(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            return Self::ZERO;
        }
        self.scale(1.0 / len)
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;

    fn add(self, o: Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;

    fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Linear RGB color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Axis-aligned world-space bounds of a terrain.
///
/// X/Z span the heightmap footprint, Y spans the elevation range.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TerrainBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl TerrainBounds {
    pub fn new(min: Vec3, max: Vec3) -> PrettifierResult<Self> {
        let b = Self { min, max };
        b.validate()?;
        Ok(b)
    }

    pub fn from_origin_size(origin: Vec3, size: Vec3) -> PrettifierResult<Self> {
        Self::new(origin, origin + size)
    }

    pub fn validate(&self) -> PrettifierResult<()> {
        for (axis, lo, hi) in [
            ("x", self.min.x, self.max.x),
            ("y", self.min.y, self.max.y),
            ("z", self.min.z, self.max.z),
        ] {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(PrettifierError::validation(format!(
                    "terrain bounds {axis} must be finite"
                )));
            }
            if hi < lo {
                return Err(PrettifierError::validation(format!(
                    "terrain bounds max.{axis} must be >= min.{axis}"
                )));
            }
        }
        if self.max.x == self.min.x || self.max.z == self.min.z {
            return Err(PrettifierError::validation(
                "terrain bounds must have a non-empty x/z footprint",
            ));
        }
        Ok(())
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        self.min + self.size().scale(0.5)
    }

    /// Horizontal footprint as an X/Z rectangle.
    pub fn footprint(&self) -> Rect {
        Rect::new(
            f64::from(self.min.x),
            f64::from(self.min.z),
            f64::from(self.max.x),
            f64::from(self.max.z),
        )
    }
}

impl Default for TerrainBounds {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::new(1000.0, 600.0, 1000.0),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
