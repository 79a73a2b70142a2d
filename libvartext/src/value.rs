//! Variant value representation.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::image::Image;
use crate::input::InputEvent;
use crate::math::{
    Aabb, Basis, Color, Components, Plane, Quat, Rect2, Transform2D, Transform3D, Vector2,
    Vector3,
};
use crate::object::ObjectRef;

/// A path into a node hierarchy. Never resolved here.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(pub String);

impl NodePath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodePath {
    fn from(s: &str) -> Self {
        NodePath(s.to_string())
    }
}

/// A variant value.
///
/// Values are totally ordered: first by variant (in declaration order), then
/// by payload. Floats compare after mapping `-0.0` to `0.0` and every NaN to
/// one canonical NaN, so equality is reflexive and dictionaries can use any
/// value as a key.
#[derive(Clone, Default)]
pub enum Value {
    /// Nil value.
    #[default]
    Nil,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating-point number.
    Real(f64),
    /// UTF-8 string.
    String(String),
    Vector2(Vector2),
    Rect2(Rect2),
    Vector3(Vector3),
    Transform2D(Transform2D),
    Plane(Plane),
    Quat(Quat),
    Aabb(Aabb),
    Basis(Basis),
    Transform3D(Transform3D),
    Color(Color),
    Image(Image),
    NodePath(NodePath),
    /// Reference to an externally resolved object.
    Object(ObjectRef),
    InputEvent(InputEvent),
    /// Mapping from any value to any value, kept in key order.
    Dictionary(BTreeMap<Value, Value>),
    /// Heterogeneous sequence.
    Array(Vec<Value>),
    ByteArray(Vec<u8>),
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    StringArray(Vec<String>),
    Vector2Array(Vec<Vector2>),
    Vector3Array(Vec<Vector3>),
    ColorArray(Vec<Color>),
}

impl Value {
    /// Returns `true` if this value is nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns the boolean value if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float value if this is a `Real`.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a reference to the array if this is an `Array`.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Returns a reference to the dictionary if this is a `Dictionary`.
    pub fn as_dictionary(&self) -> Option<&BTreeMap<Value, Value>> {
        match self {
            Value::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Returns the object reference if this is an `Object`.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Value::Image(img) => Some(img),
            _ => None,
        }
    }

    pub fn as_input_event(&self) -> Option<&InputEvent> {
        match self {
            Value::InputEvent(ev) => Some(ev),
            _ => None,
        }
    }

    /// The variant name, matching the constructor name where there is one.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::String(_) => "String",
            Value::Vector2(_) => Vector2::NAME,
            Value::Rect2(_) => Rect2::NAME,
            Value::Vector3(_) => Vector3::NAME,
            Value::Transform2D(_) => Transform2D::NAME,
            Value::Plane(_) => Plane::NAME,
            Value::Quat(_) => Quat::NAME,
            Value::Aabb(_) => Aabb::NAME,
            Value::Basis(_) => Basis::NAME,
            Value::Transform3D(_) => Transform3D::NAME,
            Value::Color(_) => Color::NAME,
            Value::Image(_) => "Image",
            Value::NodePath(_) => "NodePath",
            Value::Object(_) => "Object",
            Value::InputEvent(_) => "InputEvent",
            Value::Dictionary(_) => "Dictionary",
            Value::Array(_) => "Array",
            Value::ByteArray(_) => "ByteArray",
            Value::IntArray(_) => "IntArray",
            Value::FloatArray(_) => "FloatArray",
            Value::StringArray(_) => "StringArray",
            Value::Vector2Array(_) => "Vector2Array",
            Value::Vector3Array(_) => "Vector3Array",
            Value::ColorArray(_) => "ColorArray",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Nil => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Real(_) => 3,
            Value::String(_) => 4,
            Value::Vector2(_) => 5,
            Value::Rect2(_) => 6,
            Value::Vector3(_) => 7,
            Value::Transform2D(_) => 8,
            Value::Plane(_) => 9,
            Value::Quat(_) => 10,
            Value::Aabb(_) => 11,
            Value::Basis(_) => 12,
            Value::Transform3D(_) => 13,
            Value::Color(_) => 14,
            Value::Image(_) => 15,
            Value::NodePath(_) => 16,
            Value::Object(_) => 17,
            Value::InputEvent(_) => 18,
            Value::Dictionary(_) => 19,
            Value::Array(_) => 20,
            Value::ByteArray(_) => 21,
            Value::IntArray(_) => 22,
            Value::FloatArray(_) => 23,
            Value::StringArray(_) => 24,
            Value::Vector2Array(_) => 25,
            Value::Vector3Array(_) => 26,
            Value::ColorArray(_) => 27,
        }
    }
}

// =============================================================================
// Ordering
// =============================================================================

fn cmp_f64(a: f64, b: f64) -> Ordering {
    let canon = |x: f64| {
        if x == 0.0 {
            0.0
        } else if x.is_nan() {
            f64::NAN
        } else {
            x
        }
    };
    canon(a).total_cmp(&canon(b))
}

fn cmp_f32(a: f32, b: f32) -> Ordering {
    cmp_f64(f64::from(a), f64::from(b))
}

fn cmp_seq<T>(a: &[T], b: &[T], mut cmp: impl FnMut(&T, &T) -> Ordering) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match cmp(x, y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

fn cmp_components<T: Components>(a: &T, b: &T) -> Ordering {
    cmp_seq(&a.components(), &b.components(), |x, y| cmp_f32(*x, *y))
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        use Value::*;
        match (self, other) {
            (Nil, Nil) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Real(a), Real(b)) => cmp_f64(*a, *b),
            (String(a), String(b)) => a.cmp(b),
            (Vector2(a), Vector2(b)) => cmp_components(a, b),
            (Rect2(a), Rect2(b)) => cmp_components(a, b),
            (Vector3(a), Vector3(b)) => cmp_components(a, b),
            (Transform2D(a), Transform2D(b)) => cmp_components(a, b),
            (Plane(a), Plane(b)) => cmp_components(a, b),
            (Quat(a), Quat(b)) => cmp_components(a, b),
            (Aabb(a), Aabb(b)) => cmp_components(a, b),
            (Basis(a), Basis(b)) => cmp_components(a, b),
            (Transform3D(a), Transform3D(b)) => cmp_components(a, b),
            (Color(a), Color(b)) => cmp_components(a, b),
            (Image(a), Image(b)) => a.cmp(b),
            (NodePath(a), NodePath(b)) => a.cmp(b),
            (Object(a), Object(b)) => a.cmp(b),
            (InputEvent(a), InputEvent(b)) => a.cmp(b),
            (Dictionary(a), Dictionary(b)) => a.iter().cmp(b.iter()),
            (Array(a), Array(b)) => a.cmp(b),
            (ByteArray(a), ByteArray(b)) => a.cmp(b),
            (IntArray(a), IntArray(b)) => a.cmp(b),
            (FloatArray(a), FloatArray(b)) => cmp_seq(a, b, |x, y| cmp_f32(*x, *y)),
            (StringArray(a), StringArray(b)) => a.cmp(b),
            (Vector2Array(a), Vector2Array(b)) => cmp_seq(a, b, cmp_components),
            (Vector3Array(a), Vector3Array(b)) => cmp_seq(a, b, cmp_components),
            (ColorArray(a), ColorArray(b)) => cmp_seq(a, b, cmp_components),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

// =============================================================================
// Debug
// =============================================================================

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Real(n) => {
                if n.is_nan() {
                    write!(f, "nan")
                } else if n.is_infinite() {
                    if *n > 0.0 {
                        write!(f, "inf")
                    } else {
                        write!(f, "inf_neg")
                    }
                } else {
                    write!(f, "{:?}", n)
                }
            }
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(arr) => f.debug_list().entries(arr).finish(),
            Value::Dictionary(d) => f.debug_map().entries(d).finish(),
            Value::NodePath(p) => write!(f, "NodePath({:?})", p.0),
            Value::Object(o) => match o.path() {
                Some(path) => write!(f, "Object({:?})", path),
                None if o.is_null() => write!(f, "Object(null)"),
                None => write!(f, "Object(<anonymous>)"),
            },
            Value::ByteArray(b) => {
                write!(f, "<")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, ">")
            }
            Value::Vector2(v) => write!(f, "{:?}", v),
            Value::Rect2(v) => write!(f, "{:?}", v),
            Value::Vector3(v) => write!(f, "{:?}", v),
            Value::Transform2D(v) => write!(f, "{:?}", v),
            Value::Plane(v) => write!(f, "{:?}", v),
            Value::Quat(v) => write!(f, "{:?}", v),
            Value::Aabb(v) => write!(f, "{:?}", v),
            Value::Basis(v) => write!(f, "{:?}", v),
            Value::Transform3D(v) => write!(f, "{:?}", v),
            Value::Color(v) => write!(f, "{:?}", v),
            Value::Image(img) => write!(
                f,
                "Image({}x{}, {} mipmaps, {}, {} bytes)",
                img.width(),
                img.height(),
                img.mipmaps(),
                img.format(),
                img.data().len()
            ),
            Value::InputEvent(ev) => write!(f, "{:?}", ev),
            Value::IntArray(a) => f.debug_tuple("IntArray").field(a).finish(),
            Value::FloatArray(a) => f.debug_tuple("FloatArray").field(a).finish(),
            Value::StringArray(a) => f.debug_tuple("StringArray").field(a).finish(),
            Value::Vector2Array(a) => f.debug_tuple("Vector2Array").field(a).finish(),
            Value::Vector3Array(a) => f.debug_tuple("Vector3Array").field(a).finish(),
            Value::ColorArray(a) => f.debug_tuple("ColorArray").field(a).finish(),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Real(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

impl From<BTreeMap<Value, Value>> for Value {
    fn from(d: BTreeMap<Value, Value>) -> Self {
        Value::Dictionary(d)
    }
}

macro_rules! impl_from_payload {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$ty(v)
                }
            }
        )*
    };
}

impl_from_payload!(
    Vector2,
    Rect2,
    Vector3,
    Transform2D,
    Plane,
    Quat,
    Aabb,
    Basis,
    Transform3D,
    Color,
    Image,
    NodePath,
    InputEvent,
);

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}
