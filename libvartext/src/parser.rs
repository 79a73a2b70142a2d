//! Recursive-descent value parser.
//!
//! The parser pulls tokens from a [`Tokenizer`] and builds exactly one
//! [`Value`] per call, leaving the cursor just past it. Reference constructs
//! are delegated to the injected [`Hooks`].

use std::collections::BTreeMap;

use num_traits::ToPrimitive;

use crate::error::{ErrorKind, ParseContext, ParseError, Result};
use crate::hooks::{Hooks, KeycodeLookup, ReferenceKind};
use crate::image::{data_size, Image, ImageFormat};
use crate::input::{AxisDirection, InputEvent, KeyModifiers};
use crate::keys::StandardKeycodes;
use crate::legacy;
use crate::math::{
    Aabb, Basis, Color, Components, Plane, Quat, Rect2, Transform2D, Transform3D, Vector2,
    Vector3,
};
use crate::object::ObjectRef;
use crate::stream::CharStream;
use crate::tokenizer::{Number, Token, TokenKind, Tokenizer};
use crate::value::{NodePath, Value};

/// Map the non-finite literals to reals.
fn special_real(id: &str) -> Option<f64> {
    match id {
        "nan" => Some(f64::NAN),
        "inf" => Some(f64::INFINITY),
        "inf_neg" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

/// A value parser bound to one stream and one set of hooks.
pub struct Parser<'a, 'h> {
    tokens: Tokenizer<'a>,
    hooks: Hooks<'h>,
}

impl<'a, 'h> Parser<'a, 'h> {
    pub fn new(stream: &'a mut dyn CharStream, ctx: ParseContext, hooks: Hooks<'h>) -> Self {
        Self::from_tokenizer(Tokenizer::new(stream, ctx), hooks)
    }

    pub fn from_tokenizer(tokens: Tokenizer<'a>, hooks: Hooks<'h>) -> Self {
        Self { tokens, hooks }
    }

    /// The underlying cursor.
    pub fn tokenizer(&mut self) -> &mut Tokenizer<'a> {
        &mut self.tokens
    }

    /// The current 1-based line.
    pub fn line(&self) -> usize {
        self.tokens.line()
    }

    /// Parse the next value. Returns [`ParseError::Eof`] if the input holds
    /// nothing but whitespace and comments.
    pub fn parse(&mut self) -> Result<Value> {
        match self.tokens.next_token()? {
            Token::Eof => Err(ParseError::Eof),
            token => self.parse_value(token),
        }
    }

    /// Require that only whitespace and comments remain.
    pub fn finish(&mut self) -> Result<()> {
        match self.tokens.next_token()? {
            Token::Eof => Ok(()),
            token => Err(self.tokens.unexpected("EOF", &token)),
        }
    }

    /// Parse a value whose first token has already been read.
    pub fn parse_value(&mut self, token: Token) -> Result<Value> {
        match token {
            Token::CurlyOpen => self.parse_dictionary(),
            Token::BracketOpen => self.parse_array(),
            Token::Identifier(id) => self.parse_identifier(&id),
            Token::Number(Number::Int(n)) => Ok(Value::Int(n)),
            Token::Number(Number::Real(f)) => Ok(Value::Real(f)),
            Token::Str(s) => Ok(Value::String(s)),
            Token::Color(c) => Ok(Value::Color(c)),
            other => Err(self.tokens.unexpected("value", &other)),
        }
    }

    fn next_in(&mut self, what: &'static str) -> Result<Token> {
        match self.tokens.next_token()? {
            Token::Eof => Err(self.tokens.error(ErrorKind::UnexpectedEof(what))),
            token => Ok(token),
        }
    }

    fn expect_in(&mut self, kind: TokenKind, what: &'static str) -> Result<Token> {
        let token = self.next_in(what)?;
        if token.kind() == kind {
            Ok(token)
        } else {
            Err(self.tokens.unexpected(kind.describe(), &token))
        }
    }

    fn parse_dictionary(&mut self) -> Result<Value> {
        let mut dict = BTreeMap::new();
        loop {
            let token = self.next_in("dictionary")?;
            if token == Token::CurlyClose {
                return Ok(Value::Dictionary(dict));
            }
            let key = self.parse_value(token)?;

            match self.next_in("dictionary")? {
                Token::Colon => {}
                other => return Err(self.tokens.unexpected("':'", &other)),
            }

            let token = self.next_in("dictionary")?;
            let value = self.parse_value(token)?;
            dict.insert(key, value);

            match self.next_in("dictionary")? {
                Token::Comma => {}
                Token::CurlyClose => return Ok(Value::Dictionary(dict)),
                other => return Err(self.tokens.unexpected("',' or '}'", &other)),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value> {
        let mut array = Vec::new();
        loop {
            let token = self.next_in("array")?;
            if token == Token::BracketClose {
                return Ok(Value::Array(array));
            }
            array.push(self.parse_value(token)?);

            match self.next_in("array")? {
                Token::Comma => {}
                Token::BracketClose => return Ok(Value::Array(array)),
                other => return Err(self.tokens.unexpected("',' or ']'", &other)),
            }
        }
    }

    fn parse_identifier(&mut self, id: &str) -> Result<Value> {
        if let Some(f) = special_real(id) {
            return Ok(Value::Real(f));
        }
        let value = match id {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" | "nil" => Value::Nil,

            "Vector2" => Value::Vector2(self.construct::<Vector2>(id)?),
            "Rect2" => Value::Rect2(self.construct::<Rect2>(id)?),
            "Vector3" => Value::Vector3(self.construct::<Vector3>(id)?),
            "AffineTransform2D" | "Matrix32" => {
                Value::Transform2D(self.construct::<Transform2D>(id)?)
            }
            "Plane" => Value::Plane(self.construct::<Plane>(id)?),
            "Quaternion" | "Quat" => Value::Quat(self.construct::<Quat>(id)?),
            "AABB" => Value::Aabb(self.construct::<Aabb>(id)?),
            "Basis3x3" | "Matrix3" => Value::Basis(self.construct::<Basis>(id)?),
            "Transform3D" | "Transform" => Value::Transform3D(self.construct::<Transform3D>(id)?),
            "Color" => Value::Color(self.construct::<Color>(id)?),

            "Image" => Value::Image(self.parse_image()?),
            "NodePath" => Value::NodePath(self.parse_node_path()?),
            "RID" => self.parse_rid()?,
            "InputEvent" => Value::InputEvent(self.parse_input_event()?),

            "ByteArray" => Value::ByteArray(self.int_array("ByteArray", |n| n.to_u8())?),
            "IntArray" => Value::IntArray(self.int_array("IntArray", |n| n.to_i32())?),
            "FloatArray" => Value::FloatArray(self.parse_reals("FloatArray")?),
            "StringArray" => Value::StringArray(self.parse_strings()?),
            "Vector2Array" => Value::Vector2Array(self.typed_array::<Vector2>("Vector2Array")?),
            "Vector3Array" => Value::Vector3Array(self.typed_array::<Vector3>("Vector3Array")?),
            "ColorArray" => Value::ColorArray(self.typed_array::<Color>("ColorArray")?),

            _ => {
                if let Some(kind) = ReferenceKind::from_name(id) {
                    return self.parse_reference(kind);
                }
                if legacy::is_legacy(id) {
                    let keycodes = self.keycodes();
                    return legacy::parse(&mut self.tokens, id, keycodes);
                }
                return Err(self
                    .tokens
                    .error(ErrorKind::UnexpectedIdentifier(id.to_string())));
            }
        };
        Ok(value)
    }

    fn keycodes(&self) -> &'h dyn KeycodeLookup {
        match self.hooks.keycodes {
            Some(keycodes) => keycodes,
            None => &StandardKeycodes,
        }
    }

    // =========================================================================
    // Constructor arguments
    // =========================================================================

    fn number_arg(&self, token: Token) -> Result<Number> {
        match token {
            Token::Number(n) => Ok(n),
            Token::Identifier(ref id) => match special_real(id) {
                Some(f) => Ok(Number::Real(f)),
                None => Err(self.tokens.unexpected("number", &token)),
            },
            other => Err(self.tokens.unexpected("number", &other)),
        }
    }

    /// Parse `( n, n, ... )`, allowing the empty list.
    fn parse_args(&mut self, what: &'static str) -> Result<Vec<Number>> {
        self.expect_in(TokenKind::ParenOpen, what)?;
        let mut args = Vec::new();
        let mut token = self.next_in(what)?;
        if token == Token::ParenClose {
            return Ok(args);
        }
        loop {
            args.push(self.number_arg(token)?);
            match self.next_in(what)? {
                Token::Comma => token = self.next_in(what)?,
                Token::ParenClose => return Ok(args),
                other => return Err(self.tokens.unexpected("',' or ')'", &other)),
            }
        }
    }

    fn parse_reals(&mut self, what: &'static str) -> Result<Vec<f32>> {
        Ok(self
            .parse_args(what)?
            .into_iter()
            .map(|n| n.as_f64() as f32)
            .collect())
    }

    fn construct<T: Components>(&mut self, constructor: &str) -> Result<T> {
        let args = self.parse_reals(T::NAME)?;
        if args.len() != T::ARITY {
            return Err(self.tokens.error(ErrorKind::Arity {
                constructor: constructor.to_string(),
                expected: T::ARITY,
                found: args.len(),
            }));
        }
        Ok(T::from_components(&args))
    }

    fn typed_array<T: Components>(&mut self, constructor: &'static str) -> Result<Vec<T>> {
        let args = self.parse_reals(constructor)?;
        if args.len() % T::ARITY != 0 {
            return Err(self.tokens.error(ErrorKind::ArityMultiple {
                constructor,
                arity: T::ARITY,
                found: args.len(),
            }));
        }
        Ok(args.chunks(T::ARITY).map(T::from_components).collect())
    }

    fn int_value<T>(
        &self,
        n: Number,
        target: &'static str,
        convert: impl Fn(i64) -> Option<T>,
    ) -> Result<T> {
        match n {
            Number::Int(i) => convert(i).ok_or_else(|| {
                self.tokens.error(ErrorKind::OutOfRange {
                    target,
                    value: i.to_string(),
                })
            }),
            Number::Real(f) => Err(self.tokens.error(ErrorKind::Expected {
                expected: "integer".to_string(),
                found: format!("{}", f),
            })),
        }
    }

    fn int_array<T>(
        &mut self,
        constructor: &'static str,
        convert: impl Fn(i64) -> Option<T>,
    ) -> Result<Vec<T>> {
        self.parse_args(constructor)?
            .into_iter()
            .map(|n| self.int_value(n, constructor, &convert))
            .collect()
    }

    fn int_arg(&mut self, what: &'static str) -> Result<i64> {
        let token = self.next_in(what)?;
        let n = self.number_arg(token)?;
        self.int_value(n, "integer", Some)
    }

    fn parse_strings(&mut self) -> Result<Vec<String>> {
        const WHAT: &str = "StringArray";
        self.expect_in(TokenKind::ParenOpen, WHAT)?;
        let mut strings = Vec::new();
        let mut token = self.next_in(WHAT)?;
        if token == Token::ParenClose {
            return Ok(strings);
        }
        loop {
            match token {
                Token::Str(s) => strings.push(s),
                other => return Err(self.tokens.unexpected("string", &other)),
            }
            match self.next_in(WHAT)? {
                Token::Comma => token = self.next_in(WHAT)?,
                Token::ParenClose => return Ok(strings),
                other => return Err(self.tokens.unexpected("',' or ')'", &other)),
            }
        }
    }

    // =========================================================================
    // Special constructors
    // =========================================================================

    fn parse_image(&mut self) -> Result<Image> {
        const WHAT: &str = "Image";
        self.expect_in(TokenKind::ParenOpen, WHAT)?;
        let token = self.next_in(WHAT)?;
        if token == Token::ParenClose {
            return Ok(Image::empty());
        }

        let dim = |p: &Self, token: Token, what: &'static str| -> Result<u32> {
            let n = p.number_arg(token)?;
            p.int_value(n, what, |i| i.to_u32())
        };
        let width = dim(&*self, token, "image width")?;
        self.expect_in(TokenKind::Comma, WHAT)?;
        let token = self.next_in(WHAT)?;
        let height = dim(&*self, token, "image height")?;
        self.expect_in(TokenKind::Comma, WHAT)?;
        let token = self.next_in(WHAT)?;
        let mipmaps = dim(&*self, token, "image mipmaps")?;
        self.expect_in(TokenKind::Comma, WHAT)?;

        let format = match self.next_in(WHAT)? {
            Token::Identifier(name) => ImageFormat::from_name(&name)
                .ok_or_else(|| self.tokens.error(ErrorKind::InvalidImageFormat(name)))?,
            other => return Err(self.tokens.unexpected("identifier", &other)),
        };

        let expected = if width == 0 || height == 0 {
            0
        } else {
            data_size(width, height, mipmaps, format)
                .ok_or_else(|| self.tokens.error(ErrorKind::ImageTooLarge))?
        };

        let mut data = Vec::new();
        loop {
            match self.next_in(WHAT)? {
                Token::ParenClose => break,
                Token::Comma => {}
                other => return Err(self.tokens.unexpected("',' or ')'", &other)),
            }
            if data.len() == expected {
                return Err(self.tokens.error(ErrorKind::ImageDataSize {
                    expected,
                    found: expected + 1,
                }));
            }
            let token = self.next_in(WHAT)?;
            let n = self.number_arg(token)?;
            data.push(self.int_value(n, "image byte", |i| i.to_u8())?);
        }

        Image::new(width, height, mipmaps, format, data).map_err(|kind| self.tokens.error(kind))
    }

    fn parse_node_path(&mut self) -> Result<NodePath> {
        const WHAT: &str = "NodePath";
        self.expect_in(TokenKind::ParenOpen, WHAT)?;
        let path = match self.next_in(WHAT)? {
            Token::Str(s) => s,
            other => return Err(self.tokens.unexpected("string", &other)),
        };
        self.expect_in(TokenKind::ParenClose, WHAT)?;
        Ok(NodePath(path))
    }

    fn parse_rid(&mut self) -> Result<Value> {
        self.expect_in(TokenKind::ParenOpen, "RID")?;
        let token = self.next_in("RID")?;
        let value = match self.number_arg(token)? {
            Number::Int(n) => Value::Int(n),
            Number::Real(f) => Value::Real(f),
        };
        self.expect_in(TokenKind::ParenClose, "RID")?;
        Ok(value)
    }

    fn parse_reference(&mut self, kind: ReferenceKind) -> Result<Value> {
        self.expect_in(TokenKind::ParenOpen, kind.name())?;

        if let Some(resolver) = self.hooks.resolver.as_deref_mut() {
            let handled = match kind {
                ReferenceKind::Resource => resolver.resource(&mut self.tokens),
                ReferenceKind::ExtResource => resolver.ext_resource(&mut self.tokens),
                ReferenceKind::SubResource => resolver.sub_resource(&mut self.tokens),
            };
            if let Some(result) = handled {
                log::debug!("{} resolved at line {}", kind, self.tokens.line());
                return result;
            }
        }

        if kind != ReferenceKind::Resource {
            return Err(self.tokens.error(ErrorKind::NoResolver(kind)));
        }

        let path = match self.next_in(kind.name())? {
            Token::Str(s) => s,
            other => return Err(self.tokens.unexpected("string", &other)),
        };
        let loader = match self.hooks.loader.as_deref_mut() {
            Some(loader) => loader,
            None => return Err(self.tokens.error(ErrorKind::NoResolver(kind))),
        };
        log::debug!("loading resource {:?}", path);
        let resource = loader
            .load(&path)
            .map_err(|err| self.tokens.error(ErrorKind::ResourceNotFound(err.path)))?;
        self.expect_in(TokenKind::ParenClose, kind.name())?;
        Ok(Value::Object(ObjectRef::new(resource)))
    }

    /// After the required fields: `)` or `, device )`.
    fn optional_device(&mut self) -> Result<i64> {
        const WHAT: &str = "InputEvent";
        match self.next_in(WHAT)? {
            Token::ParenClose => Ok(0),
            Token::Comma => {
                let device = self.int_arg(WHAT)?;
                self.expect_in(TokenKind::ParenClose, WHAT)?;
                Ok(device)
            }
            other => Err(self.tokens.unexpected("',' or ')'", &other)),
        }
    }

    fn parse_input_event(&mut self) -> Result<InputEvent> {
        const WHAT: &str = "InputEvent";
        self.expect_in(TokenKind::ParenOpen, WHAT)?;
        let kind = match self.next_in(WHAT)? {
            Token::Identifier(id) => id,
            other => return Err(self.tokens.unexpected("identifier", &other)),
        };

        match kind.as_str() {
            "NONE" => {
                self.expect_in(TokenKind::ParenClose, WHAT)?;
                Ok(InputEvent::None)
            }
            "KEY" => {
                self.expect_in(TokenKind::Comma, WHAT)?;
                let scancode = match self.next_in(WHAT)? {
                    Token::Identifier(name) => self
                        .keycodes()
                        .lookup(&name)
                        .ok_or_else(|| self.tokens.error(ErrorKind::UnknownKey(name)))?,
                    Token::Number(n) => self.int_value(n, "scancode", Some)?,
                    other => return Err(self.tokens.unexpected("identifier or number", &other)),
                };
                let modifiers = match self.next_in(WHAT)? {
                    Token::ParenClose => KeyModifiers::default(),
                    Token::Comma => {
                        let mods = match self.next_in(WHAT)? {
                            Token::Identifier(letters) => KeyModifiers::from_letters(&letters),
                            other => return Err(self.tokens.unexpected("identifier", &other)),
                        };
                        self.expect_in(TokenKind::ParenClose, WHAT)?;
                        mods
                    }
                    other => return Err(self.tokens.unexpected("',' or ')'", &other)),
                };
                Ok(InputEvent::Key {
                    scancode,
                    modifiers,
                })
            }
            "MBUTTON" | "JBUTTON" => {
                self.expect_in(TokenKind::Comma, WHAT)?;
                let index = self.int_arg(WHAT)?;
                let device = self.optional_device()?;
                Ok(if kind == "MBUTTON" {
                    InputEvent::MouseButton { device, index }
                } else {
                    InputEvent::JoystickButton { device, index }
                })
            }
            "JAXIS" => {
                self.expect_in(TokenKind::Comma, WHAT)?;
                let axis = self.int_arg(WHAT)?;
                self.expect_in(TokenKind::Comma, WHAT)?;
                let direction = AxisDirection::from_sign(self.int_arg(WHAT)?);
                let device = self.optional_device()?;
                Ok(InputEvent::JoystickAxis {
                    device,
                    axis,
                    direction,
                })
            }
            _ => Err(self.tokens.error(ErrorKind::InvalidInputEvent(kind))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{NotFound, ReferenceResolver, ResourceLoader};
    use crate::object::Resource;
    use crate::stream::StrStream;
    use std::any::Any;
    use std::sync::Arc;

    fn parse(input: &str) -> Result<Value> {
        let mut stream = StrStream::new(input);
        let mut parser = Parser::new(&mut stream, ParseContext::default(), Hooks::default());
        parser.parse()
    }

    fn message(input: &str) -> String {
        parse(input).unwrap_err().to_string()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse("true").unwrap(), Value::Bool(true));
        assert_eq!(parse("nil").unwrap(), Value::Nil);
        assert_eq!(parse("null").unwrap(), Value::Nil);
        assert_eq!(parse("-12").unwrap(), Value::Int(-12));
        assert_eq!(parse("0.5").unwrap(), Value::Real(0.5));
        assert_eq!(parse("\"hi\"").unwrap(), Value::from("hi"));
        assert_eq!(parse("inf_neg").unwrap(), Value::Real(f64::NEG_INFINITY));
        assert!(parse("nan").unwrap().as_real().unwrap().is_nan());
        assert_eq!(
            parse("#ff000080").unwrap(),
            Value::Color(Color::new(1.0, 0.0, 0.0, 128.0 / 255.0))
        );
    }

    #[test]
    fn test_empty_input_is_eof() {
        assert!(parse("").unwrap_err().is_eof());
        assert!(parse("  ; only a comment\n").unwrap_err().is_eof());
    }

    #[test]
    fn test_geometry_constructors() {
        assert_eq!(
            parse("Vector2( 1, 2 )").unwrap(),
            Value::Vector2(Vector2::new(1.0, 2.0))
        );
        assert_eq!(
            parse("Plane( 0, 1, 0, -2.5 )").unwrap(),
            Value::Plane(Plane {
                normal: Vector3::new(0.0, 1.0, 0.0),
                d: -2.5
            })
        );
        assert_eq!(
            parse("Matrix32( 1, 0, 0, 1, 5, 6 )").unwrap(),
            parse("AffineTransform2D( 1, 0, 0, 1, 5, 6 )").unwrap()
        );
        assert_eq!(
            parse("Quat( 0, 0, 0, 1 )").unwrap(),
            Value::Quat(Quat::default())
        );
        assert_eq!(
            parse("Matrix3( 1, 0, 0, 0, 1, 0, 0, 0, 1 )").unwrap(),
            Value::Basis(Basis::default())
        );
        assert_eq!(
            parse("Transform( 1, 0, 0, 0, 1, 0, 0, 0, 1, 7, 8, 9 )").unwrap(),
            Value::Transform3D(Transform3D {
                basis: Basis::default(),
                origin: Vector3::new(7.0, 8.0, 9.0)
            })
        );
        let v = parse("Vector2( inf, nan )").unwrap();
        match v {
            Value::Vector2(v) => assert!(v.x.is_infinite() && v.y.is_nan()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_arity_enforcement() {
        assert_eq!(
            message("Vector2( 1 )"),
            "Expected 2 arguments for Vector2, got 1 at line 1"
        );
        assert_eq!(
            message("Color( 1, 2, 3 )"),
            "Expected 4 arguments for Color, got 3 at line 1"
        );
        assert_eq!(
            message("AABB( 1,2,3,4,5 )"),
            "Expected 6 arguments for AABB, got 5 at line 1"
        );
        assert_eq!(
            message("Vector3()"),
            "Expected 3 arguments for Vector3, got 0 at line 1"
        );
        assert_eq!(
            message("Vector2( 1, 2, )"),
            "Expected number, got ')' at line 1"
        );
    }

    #[test]
    fn test_typed_arrays() {
        assert_eq!(
            parse("ByteArray( 0, 255 )").unwrap(),
            Value::ByteArray(vec![0, 255])
        );
        assert_eq!(
            parse("IntArray( -1, 2 )").unwrap(),
            Value::IntArray(vec![-1, 2])
        );
        assert_eq!(
            parse("FloatArray( 1, 0.5 )").unwrap(),
            Value::FloatArray(vec![1.0, 0.5])
        );
        assert_eq!(
            parse("StringArray( \"a\", \"b\" )").unwrap(),
            Value::StringArray(vec!["a".into(), "b".into()])
        );
        assert_eq!(
            parse("Vector2Array( 1, 2, 3, 4 )").unwrap(),
            Value::Vector2Array(vec![Vector2::new(1.0, 2.0), Vector2::new(3.0, 4.0)])
        );
        assert_eq!(parse("ColorArray( )").unwrap(), Value::ColorArray(vec![]));
        assert_eq!(
            message("Vector3Array( 1, 2, 3, 4 )"),
            "Expected a multiple of 3 arguments for Vector3Array, got 4 at line 1"
        );
        assert_eq!(
            message("ByteArray( 256 )"),
            "Value 256 out of range for ByteArray at line 1"
        );
        assert_eq!(
            message("IntArray( 1.5 )"),
            "Expected integer, got 1.5 at line 1"
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(parse("Image()").unwrap(), Value::Image(Image::empty()));
        let v = parse("Image( 1, 2, 0, GRAYSCALE, 7, 8 )").unwrap();
        let img = v.as_image().unwrap();
        assert_eq!((img.width(), img.height()), (1, 2));
        assert_eq!(img.data(), &[7, 8]);
        assert_eq!(
            message("Image( 2, 2, 0, RGB, 1, 2, 3 )"),
            "Expected 12 bytes of image data, got 3 at line 1"
        );
        assert_eq!(
            message("Image( 1, 1, 0, GRAYSCALE, 1, 2 )"),
            "Expected 1 bytes of image data, got 2 at line 1"
        );
        assert_eq!(
            message("Image( 1, 1, 0, CUSTOM, 1 )"),
            "Invalid image format 'CUSTOM' at line 1"
        );
    }

    #[test]
    fn test_node_path_and_rid() {
        assert_eq!(
            parse("NodePath( \"a/b:c\" )").unwrap(),
            Value::NodePath(NodePath::from("a/b:c"))
        );
        assert_eq!(parse("RID( 4 )").unwrap(), Value::Int(4));
        assert_eq!(
            message("NodePath( 3 )"),
            "Expected string, got number at line 1"
        );
    }

    #[test]
    fn test_input_events() {
        assert_eq!(
            parse("InputEvent( NONE )").unwrap(),
            Value::InputEvent(InputEvent::None)
        );
        assert_eq!(
            parse("InputEvent( KEY, 65, cs )").unwrap(),
            Value::InputEvent(InputEvent::Key {
                scancode: 65,
                modifiers: KeyModifiers {
                    control: true,
                    shift: true,
                    ..Default::default()
                }
            })
        );
        assert_eq!(
            parse("InputEvent( KEY, a )").unwrap(),
            Value::InputEvent(InputEvent::Key {
                scancode: 65,
                modifiers: KeyModifiers::default()
            })
        );
        assert_eq!(
            parse("InputEvent( MBUTTON, 2 )").unwrap(),
            Value::InputEvent(InputEvent::MouseButton {
                device: 0,
                index: 2
            })
        );
        assert_eq!(
            parse("InputEvent( JBUTTON, 3, 1 )").unwrap(),
            Value::InputEvent(InputEvent::JoystickButton {
                device: 1,
                index: 3
            })
        );
        assert_eq!(
            parse("InputEvent( JAXIS, 1, -1 )").unwrap(),
            Value::InputEvent(InputEvent::JoystickAxis {
                device: 0,
                axis: 1,
                direction: AxisDirection::Negative
            })
        );
        assert_eq!(
            message("InputEvent( TOUCH )"),
            "Invalid input event type 'TOUCH' at line 1"
        );
        assert_eq!(
            message("InputEvent( KEY, Hyper )"),
            "Unknown key name 'Hyper' at line 1"
        );
    }

    #[test]
    fn test_containers() {
        let v = parse("[ { \"x\": [1,2,3] }, Vector2( 0, 0 ) ]").unwrap();
        let arr = v.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        let dict = arr[0].as_dictionary().unwrap();
        assert_eq!(
            dict[&Value::from("x")],
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(arr[1], Value::Vector2(Vector2::new(0.0, 0.0)));

        assert_eq!(parse("[]").unwrap(), Value::Array(vec![]));
        assert_eq!(parse("{}").unwrap(), Value::Dictionary(BTreeMap::new()));
        assert_eq!(parse("[ 1, ]").unwrap(), Value::Array(vec![Value::Int(1)]));
        assert_eq!(
            parse("{ 1: 2, }").unwrap(),
            Value::Dictionary(BTreeMap::from([(Value::Int(1), Value::Int(2))]))
        );
    }

    #[test]
    fn test_dictionary_key_order_independence() {
        assert_eq!(
            parse("{ \"b\": 1, \"a\": 2 }").unwrap(),
            parse("{ \"a\": 2, \"b\": 1 }").unwrap()
        );
    }

    #[test]
    fn test_container_errors() {
        assert_eq!(
            message("[ 1, 2"),
            "Unexpected end of file while parsing array at line 1"
        );
        assert_eq!(
            message("{\n\"a\": 1"),
            "Unexpected end of file while parsing dictionary at line 2"
        );
        assert_eq!(message("[ 1 2 ]"), "Expected ',' or ']', got number at line 1");
        assert_eq!(message("{ 1 2 }"), "Expected ':', got number at line 1");
    }

    #[test]
    fn test_truncated_constructors() {
        let cases = [
            ("Vector2( 1,", "Vector2"),
            ("Matrix32( 1, 0", "AffineTransform2D"),
            ("Vector2", "Vector2"),
            ("FloatArray( 1.5", "FloatArray"),
            ("IntArray(", "IntArray"),
            ("StringArray( \"a\",", "StringArray"),
            ("Image( 2, 2, 0, RGB", "Image"),
            ("NodePath(", "NodePath"),
            ("RID( 3", "RID"),
            ("InputEvent( JAXIS, 1,", "InputEvent"),
            ("InputEvent( MBUTTON, 1", "InputEvent"),
        ];
        for (input, construct) in cases {
            assert_eq!(
                message(input),
                format!("Unexpected end of file while parsing {} at line 1", construct),
                "{}",
                input
            );
        }
        assert_eq!(message("[ , ]"), "Expected value, got ',' at line 1");
        assert_eq!(message("]"), "Expected value, got ']' at line 1");
        assert_eq!(message("Banana"), "Unexpected identifier 'Banana' at line 1");
    }

    #[derive(Debug)]
    struct Sentinel;

    impl Resource for Sentinel {
        fn path(&self) -> Option<&str> {
            None
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct CountingResolver {
        calls: usize,
        sentinel: Arc<dyn Resource>,
    }

    impl ReferenceResolver for CountingResolver {
        fn ext_resource(&mut self, tokens: &mut Tokenizer<'_>) -> Option<Result<Value>> {
            self.calls += 1;
            Some(read_sentinel(tokens, &self.sentinel))
        }
    }

    fn read_sentinel(tokens: &mut Tokenizer<'_>, sentinel: &Arc<dyn Resource>) -> Result<Value> {
        tokens.next_token()?;
        tokens.expect(TokenKind::ParenClose)?;
        Ok(Value::Object(ObjectRef::new(sentinel.clone())))
    }

    #[test]
    fn test_resolver_dispatch() {
        let sentinel: Arc<dyn Resource> = Arc::new(Sentinel);
        let mut resolver = CountingResolver {
            calls: 0,
            sentinel: sentinel.clone(),
        };
        let value = {
            let mut stream = StrStream::new("[ ExtResource( \"x\" ), 1 ]");
            let hooks = Hooks::new().with_resolver(&mut resolver);
            let mut parser = Parser::new(&mut stream, ParseContext::default(), hooks);
            parser.parse().unwrap()
        };
        assert_eq!(resolver.calls, 1);
        let arr = value.as_array().unwrap();
        assert_eq!(arr[0], Value::Object(ObjectRef::new(sentinel)));
        assert_eq!(arr[1], Value::Int(1));
    }

    #[test]
    fn test_missing_resolver_is_an_error() {
        assert_eq!(
            message("ExtResource( \"x\" )"),
            "No resolver registered for ExtResource at line 1"
        );
        assert_eq!(
            message("SubResource( 1 )"),
            "No resolver registered for SubResource at line 1"
        );
        assert_eq!(
            message("Resource( \"res://a\" )"),
            "No resolver registered for Resource at line 1"
        );
    }

    struct OneFile;

    #[derive(Debug)]
    struct Loaded(String);

    impl Resource for Loaded {
        fn path(&self) -> Option<&str> {
            Some(&self.0)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl ResourceLoader for OneFile {
        fn load(&mut self, path: &str) -> std::result::Result<Arc<dyn Resource>, NotFound> {
            if path == "res://icon.png" {
                Ok(Arc::new(Loaded(path.to_string())))
            } else {
                Err(NotFound::new(path))
            }
        }
    }

    #[test]
    fn test_resource_loader_fallback() {
        let mut loader = OneFile;
        let mut stream = StrStream::new("Resource( \"res://icon.png\" ) Resource( \"res://gone\" )");
        let hooks = Hooks::new().with_loader(&mut loader);
        let mut parser = Parser::new(&mut stream, ParseContext::default(), hooks);
        let v = parser.parse().unwrap();
        assert_eq!(v.as_object().unwrap().path(), Some("res://icon.png"));
        assert_eq!(
            parser.parse().unwrap_err().to_string(),
            "Can't load resource at path 'res://gone' at line 1"
        );
    }

    #[test]
    fn test_error_line_numbers() {
        let err = parse("[\n1,\n2,\nVector2( 1 )\n]").unwrap_err();
        assert_eq!(err.line(), Some(4));
    }
}
