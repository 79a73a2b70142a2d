//! Encoders from variant values to other data formats.
//!
//! None of the targets has geometry, images or input bindings, so those are
//! lowered the same way everywhere:
//!   - geometry and numeric typed arrays -> a name plus a list of reals
//!   - node paths, objects, input events -> their canonical variant text
//!
//! Decoding back is not supported; the variant text is the source of truth.

use libvartext::writer::{self, WriteOptions};
use libvartext::{Components, Value};

pub mod toml;
pub mod yaml;

/// Widen a component to f64 without exposing f32 rounding noise, so that
/// `0.1f32` becomes `0.1` rather than `0.10000000149011612`.
pub fn widen(c: f32) -> f64 {
    if c.is_finite() {
        c.to_string().parse().unwrap_or(f64::from(c))
    } else {
        f64::from(c)
    }
}

fn widen_all<T: Components>(v: &T) -> Vec<f64> {
    v.components().into_iter().map(widen).collect()
}

fn widen_each<T: Components>(items: &[T]) -> Vec<Vec<f64>> {
    items.iter().map(widen_all).collect()
}

/// A value lowered to one of the shapes every target can express.
pub enum Lowered<'v> {
    /// A constructor name and its components.
    Reals(&'static str, Vec<f64>),
    /// A typed array of constructor values.
    RealGroups(&'static str, Vec<Vec<f64>>),
    /// A named value only expressible as variant text.
    Text(&'static str, String),
    /// Handled natively by the target.
    Native(&'v Value),
}

/// Lower a value for a target without a native equivalent.
pub fn lower<'v>(value: &'v Value, options: &WriteOptions<'_>) -> Lowered<'v> {
    match value {
        Value::Vector2(v) => Lowered::Reals(value.type_name(), widen_all(v)),
        Value::Rect2(v) => Lowered::Reals(value.type_name(), widen_all(v)),
        Value::Vector3(v) => Lowered::Reals(value.type_name(), widen_all(v)),
        Value::Transform2D(v) => Lowered::Reals(value.type_name(), widen_all(v)),
        Value::Plane(v) => Lowered::Reals(value.type_name(), widen_all(v)),
        Value::Quat(v) => Lowered::Reals(value.type_name(), widen_all(v)),
        Value::Aabb(v) => Lowered::Reals(value.type_name(), widen_all(v)),
        Value::Basis(v) => Lowered::Reals(value.type_name(), widen_all(v)),
        Value::Transform3D(v) => Lowered::Reals(value.type_name(), widen_all(v)),
        Value::Color(v) => Lowered::Reals(value.type_name(), widen_all(v)),
        Value::FloatArray(a) => {
            Lowered::Reals(value.type_name(), a.iter().copied().map(widen).collect())
        }
        Value::Vector2Array(a) => Lowered::RealGroups(value.type_name(), widen_each(a)),
        Value::Vector3Array(a) => Lowered::RealGroups(value.type_name(), widen_each(a)),
        Value::ColorArray(a) => Lowered::RealGroups(value.type_name(), widen_each(a)),
        Value::NodePath(_) | Value::Object(_) | Value::InputEvent(_) => {
            Lowered::Text(value.type_name(), writer::to_string(value, options))
        }
        _ => Lowered::Native(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libvartext::{NodePath, Vector2};

    #[test]
    fn test_widen_keeps_short_decimals() {
        assert_eq!(widen(0.1), 0.1);
        assert_eq!(widen(-2.5), -2.5);
        assert!(widen(f32::NAN).is_nan());
        assert_eq!(widen(f32::NEG_INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    fn test_lower_shapes() {
        let opts = WriteOptions::default();
        match lower(&Value::Vector2(Vector2::new(1.0, 0.5)), &opts) {
            Lowered::Reals(name, reals) => {
                assert_eq!(name, "Vector2");
                assert_eq!(reals, vec![1.0, 0.5]);
            }
            _ => panic!("expected reals"),
        }
        match lower(&Value::NodePath(NodePath::from("a/b")), &opts) {
            Lowered::Text(name, text) => {
                assert_eq!(name, "NodePath");
                assert_eq!(text, "NodePath( \"a/b\" )");
            }
            _ => panic!("expected text"),
        }
        assert!(matches!(lower(&Value::Int(3), &opts), Lowered::Native(_)));
    }
}
