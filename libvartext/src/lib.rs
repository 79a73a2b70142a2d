//! Variant text parser and writer.
//!
//! Variant text is a textual notation for typed values: scalars, strings,
//! geometry constructors such as `Vector2( 1, 2 )`, images, node paths,
//! resource references, input bindings, dictionaries, arrays and typed
//! arrays. Configuration files built from it are sequences of
//! `[section key=value]` tags and `key = value` assignments.
//!
//! # Parsing Pipeline
//!
//! 1. **Stream**: yields characters from a string or a byte reader.
//!
//! 2. **Tokenizer**: turns characters into tokens, tracking the line number
//!    and a one-character pushback slot.
//!
//! 3. **Parser**: recursive descent over tokens into a [`Value`], calling out
//!    to [`Hooks`] for resource references and key names.
//!
//! 4. **Records**: the character-level driver in [`tag`] frames tags and
//!    assignments and hands values to the parser.
//!
//! The [`writer`] goes the other way and produces canonical text that
//! parses back to an equal value.

mod error;
pub mod hooks;
mod image;
mod input;
pub mod keys;
mod legacy;
mod math;
mod object;
mod parser;
pub mod stream;
pub mod tag;
pub mod tokenizer;
mod value;
pub mod writer;

pub use error::{ErrorKind, ParseContext, ParseError, Result};
pub use hooks::{
    Hooks, KeycodeLookup, NotFound, ObjectEncoder, ReferenceKind, ReferenceResolver,
    ResourceLoader,
};
pub use image::{data_size, Image, ImageFormat};
pub use input::{AxisDirection, InputEvent, KeyModifiers};
pub use math::{
    Aabb, Basis, Color, Components, Plane, Quat, Rect2, Transform2D, Transform3D, Vector2,
    Vector3,
};
pub use object::{ObjectRef, Resource};
pub use parser::Parser;
pub use stream::{CharStream, FileStream, ReaderStream, StrStream};
pub use tag::{Record, Records, Tag};
pub use value::{NodePath, Value};
pub use writer::WriteOptions;

/// Parse a single value from a string.
///
/// # Example
///
/// ```
/// use libvartext::{parse, Value};
///
/// let value = parse("[ 1, true ]").unwrap();
/// assert_eq!(value, Value::Array(vec![Value::Int(1), Value::Bool(true)]));
/// ```
pub fn parse(input: &str) -> Result<Value> {
    parse_with_filename(input, None)
}

/// Parse a single value, naming the source file in error messages.
///
/// Anything but whitespace and comments after the value is an error.
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> Result<Value> {
    parse_with_hooks(input, filename, Hooks::new())
}

/// Parse a single value with collaborators for references and key names.
pub fn parse_with_hooks(input: &str, filename: Option<&str>, hooks: Hooks<'_>) -> Result<Value> {
    let mut stream = StrStream::new(input);
    let mut parser = Parser::new(&mut stream, ParseContext::new(filename), hooks);
    let value = parser.parse()?;
    parser.finish()?;
    Ok(value)
}

/// Read every record of a configuration file held in a string.
///
/// With `simple`, tag bodies are read as plain names.
pub fn parse_records(input: &str, filename: Option<&str>, simple: bool) -> Result<Vec<Record>> {
    let mut stream = StrStream::new(input);
    let mut parser = Parser::new(&mut stream, ParseContext::new(filename), Hooks::new());
    Records::new(&mut parser, simple).collect()
}

/// Write a value as canonical text.
///
/// ```
/// use libvartext::{to_string, Value, Vector2};
///
/// let text = to_string(&Value::Vector2(Vector2::new(1.0, -0.0)));
/// assert_eq!(text, "Vector2( 1, 0 )");
/// ```
pub fn to_string(value: &Value) -> String {
    writer::to_string(value, &WriteOptions::default())
}
