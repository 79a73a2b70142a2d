//! Geometry and color primitives.
//!
//! These are plain `f32` records. Each one knows its constructor name and
//! the flat component list it is written as, which is all the parser and
//! writer need.

/// A fixed-arity record of `f32` components.
pub trait Components: Sized {
    /// The constructor name the writer emits.
    const NAME: &'static str;
    /// The exact number of constructor arguments.
    const ARITY: usize;

    /// Build from exactly `ARITY` components.
    fn from_components(c: &[f32]) -> Self;

    /// The components in constructor order.
    fn components(&self) -> Vec<f32>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Components for Vector2 {
    const NAME: &'static str = "Vector2";
    const ARITY: usize = 2;

    fn from_components(c: &[f32]) -> Self {
        Self::new(c[0], c[1])
    }

    fn components(&self) -> Vec<f32> {
        vec![self.x, self.y]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Components for Vector3 {
    const NAME: &'static str = "Vector3";
    const ARITY: usize = 3;

    fn from_components(c: &[f32]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    fn components(&self) -> Vec<f32> {
        vec![self.x, self.y, self.z]
    }
}

/// An axis-aligned rectangle given by corner and extent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect2 {
    pub position: Vector2,
    pub size: Vector2,
}

impl Components for Rect2 {
    const NAME: &'static str = "Rect2";
    const ARITY: usize = 4;

    fn from_components(c: &[f32]) -> Self {
        Self {
            position: Vector2::new(c[0], c[1]),
            size: Vector2::new(c[2], c[3]),
        }
    }

    fn components(&self) -> Vec<f32> {
        vec![self.position.x, self.position.y, self.size.x, self.size.y]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Plane {
    pub normal: Vector3,
    pub d: f32,
}

impl Components for Plane {
    const NAME: &'static str = "Plane";
    const ARITY: usize = 4;

    fn from_components(c: &[f32]) -> Self {
        Self {
            normal: Vector3::new(c[0], c[1], c[2]),
            d: c[3],
        }
    }

    fn components(&self) -> Vec<f32> {
        vec![self.normal.x, self.normal.y, self.normal.z, self.d]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

impl Components for Quat {
    const NAME: &'static str = "Quaternion";
    const ARITY: usize = 4;

    fn from_components(c: &[f32]) -> Self {
        Self {
            x: c[0],
            y: c[1],
            z: c[2],
            w: c[3],
        }
    }

    fn components(&self) -> Vec<f32> {
        vec![self.x, self.y, self.z, self.w]
    }
}

/// An axis-aligned box given by corner and extent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub position: Vector3,
    pub size: Vector3,
}

impl Components for Aabb {
    const NAME: &'static str = "AABB";
    const ARITY: usize = 6;

    fn from_components(c: &[f32]) -> Self {
        Self {
            position: Vector3::new(c[0], c[1], c[2]),
            size: Vector3::new(c[3], c[4], c[5]),
        }
    }

    fn components(&self) -> Vec<f32> {
        vec![
            self.position.x,
            self.position.y,
            self.position.z,
            self.size.x,
            self.size.y,
            self.size.z,
        ]
    }
}

/// A 3x3 matrix stored row by row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Basis {
    pub rows: [Vector3; 3],
}

impl Default for Basis {
    fn default() -> Self {
        Self {
            rows: [
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
            ],
        }
    }
}

impl Components for Basis {
    const NAME: &'static str = "Basis3x3";
    const ARITY: usize = 9;

    fn from_components(c: &[f32]) -> Self {
        Self {
            rows: [
                Vector3::new(c[0], c[1], c[2]),
                Vector3::new(c[3], c[4], c[5]),
                Vector3::new(c[6], c[7], c[8]),
            ],
        }
    }

    fn components(&self) -> Vec<f32> {
        self.rows.iter().flat_map(|r| r.components()).collect()
    }
}

/// A 2D affine transform: two axis columns and an origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub x: Vector2,
    pub y: Vector2,
    pub origin: Vector2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            x: Vector2::new(1.0, 0.0),
            y: Vector2::new(0.0, 1.0),
            origin: Vector2::default(),
        }
    }
}

impl Components for Transform2D {
    const NAME: &'static str = "AffineTransform2D";
    const ARITY: usize = 6;

    fn from_components(c: &[f32]) -> Self {
        Self {
            x: Vector2::new(c[0], c[1]),
            y: Vector2::new(c[2], c[3]),
            origin: Vector2::new(c[4], c[5]),
        }
    }

    fn components(&self) -> Vec<f32> {
        vec![
            self.x.x,
            self.x.y,
            self.y.x,
            self.y.y,
            self.origin.x,
            self.origin.y,
        ]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform3D {
    pub basis: Basis,
    pub origin: Vector3,
}

impl Components for Transform3D {
    const NAME: &'static str = "Transform3D";
    const ARITY: usize = 12;

    fn from_components(c: &[f32]) -> Self {
        Self {
            basis: Basis::from_components(&c[..9]),
            origin: Vector3::new(c[9], c[10], c[11]),
        }
    }

    fn components(&self) -> Vec<f32> {
        let mut c = self.basis.components();
        c.extend(self.origin.components());
        c
    }
}

/// An RGBA color with components nominally in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Decode a hex color code without the leading `#`.
    ///
    /// Accepts `RGB`, `RGBA`, `RRGGBB` and `RRGGBBAA`. Returns `None` for any
    /// other length or a non-hex digit.
    pub fn from_html(code: &str) -> Option<Color> {
        let digits = code
            .chars()
            .map(|c| c.to_digit(16))
            .collect::<Option<Vec<u32>>>()?;
        let channels: Vec<f32> = match digits.len() {
            3 | 4 => digits.iter().map(|d| (d * 17) as f32 / 255.0).collect(),
            6 | 8 => digits
                .chunks(2)
                .map(|p| (p[0] * 16 + p[1]) as f32 / 255.0)
                .collect(),
            _ => return None,
        };
        let a = channels.get(3).copied().unwrap_or(1.0);
        Some(Color::new(channels[0], channels[1], channels[2], a))
    }
}

impl Components for Color {
    const NAME: &'static str = "Color";
    const ARITY: usize = 4;

    fn from_components(c: &[f32]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    fn components(&self) -> Vec<f32> {
        vec![self.r, self.g, self.b, self.a]
    }
}
