//! Canonical text writer.
//!
//! Writing is a pure function of the value: dictionaries come out in key
//! order, every constructor uses `Name( a, b )` spacing, and reals are
//! spelled so that parsing the output yields an equal value.

use std::fmt::{self, Write};
use std::sync::Arc;

use crate::hooks::ObjectEncoder;
use crate::image::Image;
use crate::input::InputEvent;
use crate::math::{Color, Components, Vector2, Vector3};
use crate::object::{ObjectRef, Resource};
use crate::value::Value;

/// Writer configuration.
#[derive(Clone, Copy, Default)]
pub struct WriteOptions<'e> {
    /// Spells object handles before the `Resource( "path" )` fallback.
    pub encoder: Option<&'e dyn ObjectEncoder>,
}

impl<'e> WriteOptions<'e> {
    pub fn with_encoder(encoder: &'e dyn ObjectEncoder) -> Self {
        Self {
            encoder: Some(encoder),
        }
    }
}

/// Floats the writer knows how to spell.
pub trait Real: Copy + fmt::Display + fmt::LowerExp {
    fn to_f64(self) -> f64;
}

impl Real for f32 {
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Real for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

/// Format a constructor component or array element.
///
/// Zero of either sign is `0`. Magnitudes in `[1e-5, 1e16)` use plain
/// shortest decimal, others exponent form. Non-finite values use the
/// `nan`, `inf` and `inf_neg` literals.
pub fn format_real<T: Real>(x: T) -> String {
    let f = x.to_f64();
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 {
            "inf".to_string()
        } else {
            "inf_neg".to_string()
        }
    } else if f == 0.0 {
        "0".to_string()
    } else if (1e-5..1e16).contains(&f.abs()) {
        format!("{}", x)
    } else {
        format!("{:e}", x)
    }
}

/// Format a scalar real so it reads back as a real, never as an integer.
pub fn format_scalar_real(f: f64) -> String {
    let s = format_real(f);
    if f.is_finite() && !s.contains('.') && !s.contains('e') {
        s + ".0"
    } else {
        s
    }
}

/// Quote a string. With `multiline`, newlines stay raw.
pub fn quote(s: &str, multiline: bool) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' if multiline => out.push('\n'),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c < ' ' || c == '\u{7f}' => {
                // Infallible: writing to a String.
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Write `Name( e0, e1, ... )`, or `Name()` when empty.
fn write_list<W, I>(out: &mut W, name: &str, items: I) -> fmt::Result
where
    W: Write + ?Sized,
    I: IntoIterator<Item = String>,
{
    let mut items = items.into_iter().peekable();
    if items.peek().is_none() {
        return write!(out, "{}()", name);
    }
    write!(out, "{}( ", name)?;
    let mut first = true;
    for item in items {
        if !first {
            out.write_str(", ")?;
        }
        out.write_str(&item)?;
        first = false;
    }
    out.write_str(" )")
}

fn components<T: Components>(v: &T) -> impl Iterator<Item = String> {
    v.components().into_iter().map(format_real)
}

fn write_construct<W: Write + ?Sized, T: Components>(out: &mut W, v: &T) -> fmt::Result {
    write_list(out, T::NAME, components(v))
}

fn write_image<W: Write + ?Sized>(out: &mut W, img: &Image) -> fmt::Result {
    if img.is_empty() {
        return out.write_str("Image()");
    }
    let header = [
        img.width().to_string(),
        img.height().to_string(),
        img.mipmaps().to_string(),
        img.format().name().to_string(),
    ];
    let bytes = img.data().iter().map(|b| b.to_string());
    write_list(out, "Image", header.into_iter().chain(bytes))
}

fn write_input_event<W: Write + ?Sized>(out: &mut W, ev: &InputEvent) -> fmt::Result {
    let mut fields = vec![ev.tag().to_string()];
    match *ev {
        InputEvent::None => {}
        InputEvent::Key {
            scancode,
            modifiers,
        } => {
            fields.push(scancode.to_string());
            if !modifiers.is_empty() {
                fields.push(modifiers.to_string());
            }
        }
        InputEvent::MouseButton { device, index } | InputEvent::JoystickButton { device, index } => {
            fields.push(index.to_string());
            if device != 0 {
                fields.push(device.to_string());
            }
        }
        InputEvent::JoystickAxis {
            device,
            axis,
            direction,
        } => {
            fields.push(axis.to_string());
            fields.push(direction.sign().to_string());
            if device != 0 {
                fields.push(device.to_string());
            }
        }
    }
    write_list(out, "InputEvent", fields)
}

fn write_object<W: Write + ?Sized>(
    out: &mut W,
    obj: &ObjectRef,
    options: &WriteOptions<'_>,
) -> fmt::Result {
    let resource: &Arc<dyn Resource> = match obj.resource() {
        Some(r) => r,
        None => return out.write_str("null"),
    };
    if let Some(text) = options.encoder.and_then(|e| e.encode(resource)) {
        if !text.is_empty() {
            return out.write_str(&text);
        }
    }
    match resource.path() {
        Some(path) if !path.is_empty() => write!(out, "Resource( {} )", quote(path, false)),
        _ => out.write_str("null"),
    }
}

/// Write a value to a text sink.
pub fn write<W: Write + ?Sized>(
    value: &Value,
    out: &mut W,
    options: &WriteOptions<'_>,
) -> fmt::Result {
    match value {
        Value::Nil => out.write_str("null"),
        Value::Bool(b) => out.write_str(if *b { "true" } else { "false" }),
        Value::Int(n) => write!(out, "{}", n),
        Value::Real(f) => out.write_str(&format_scalar_real(*f)),
        Value::String(s) => out.write_str(&quote(s, true)),

        Value::Vector2(v) => write_construct(out, v),
        Value::Rect2(v) => write_construct(out, v),
        Value::Vector3(v) => write_construct(out, v),
        Value::Transform2D(v) => write_construct(out, v),
        Value::Plane(v) => write_construct(out, v),
        Value::Quat(v) => write_construct(out, v),
        Value::Aabb(v) => write_construct(out, v),
        Value::Basis(v) => write_construct(out, v),
        Value::Transform3D(v) => write_construct(out, v),
        Value::Color(v) => write_construct(out, v),

        Value::Image(img) => write_image(out, img),
        Value::NodePath(p) => write!(out, "NodePath( {} )", quote(p.as_str(), false)),
        Value::Object(obj) => write_object(out, obj, options),
        Value::InputEvent(ev) => write_input_event(out, ev),

        Value::Dictionary(dict) => {
            if dict.is_empty() {
                return out.write_str("{}");
            }
            out.write_str("{\n")?;
            let mut first = true;
            for (k, v) in dict {
                if !first {
                    out.write_str(",\n")?;
                }
                write(k, out, options)?;
                out.write_str(": ")?;
                write(v, out, options)?;
                first = false;
            }
            out.write_str("\n}")
        }
        Value::Array(arr) => {
            if arr.is_empty() {
                return out.write_str("[]");
            }
            out.write_str("[ ")?;
            for (i, v) in arr.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write(v, out, options)?;
            }
            out.write_str(" ]")
        }

        Value::ByteArray(a) => write_list(out, "ByteArray", a.iter().map(|n| n.to_string())),
        Value::IntArray(a) => write_list(out, "IntArray", a.iter().map(|n| n.to_string())),
        Value::FloatArray(a) => write_list(out, "FloatArray", a.iter().map(|f| format_real(*f))),
        Value::StringArray(a) => write_list(out, "StringArray", a.iter().map(|s| quote(s, false))),
        Value::Vector2Array(a) => {
            write_list(out, "Vector2Array", a.iter().flat_map(components::<Vector2>))
        }
        Value::Vector3Array(a) => {
            write_list(out, "Vector3Array", a.iter().flat_map(components::<Vector3>))
        }
        Value::ColorArray(a) => write_list(out, "ColorArray", a.iter().flat_map(components::<Color>)),
    }
}

/// Write a value to a new string.
pub fn to_string(value: &Value, options: &WriteOptions<'_>) -> String {
    let mut s = String::new();
    // Infallible: writing to a String.
    let _ = write(value, &mut s, options);
    s
}
