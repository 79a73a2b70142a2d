//! Deprecated single-line constructs from old configuration files.
//!
//! `key(...)`, `mbutton(...)`, `jbutton(...)`, `jaxis(...)` and `img(...)`
//! read their arguments as raw text up to the closing `)` instead of going
//! through the tokenizer. Everything about that lexical discipline stays in
//! this module.

use crate::error::{ErrorKind, Result};
use crate::hooks::KeycodeLookup;
use crate::image::Image;
use crate::input::{AxisDirection, InputEvent, KeyModifiers};
use crate::tokenizer::{TokenKind, Tokenizer};
use crate::value::Value;

const LEGACY_NAMES: &[&str] = &["key", "mbutton", "jbutton", "jaxis", "img"];

/// Returns `true` for identifiers handled here.
pub fn is_legacy(id: &str) -> bool {
    LEGACY_NAMES.contains(&id)
}

/// Parse a legacy construct whose name has already been read.
pub fn parse(tokens: &mut Tokenizer<'_>, name: &str, keycodes: &dyn KeycodeLookup) -> Result<Value> {
    log::warn!(
        "deprecated {}() construct at line {}",
        name,
        tokens.line()
    );
    tokens.expect(TokenKind::ParenOpen)?;

    if name == "img" {
        skip_to_close(tokens)?;
        return Ok(Value::Image(Image::empty()));
    }

    let fields = read_fields(tokens)?;
    let event = match name {
        "key" => key_event(tokens, &fields, keycodes)?,
        "mbutton" => {
            let (device, index) = device_pair(tokens, "mbutton", &fields)?;
            InputEvent::MouseButton { device, index }
        }
        "jbutton" => {
            let (device, index) = device_pair(tokens, "jbutton", &fields)?;
            InputEvent::JoystickButton { device, index }
        }
        _ => {
            let (device, axis) = device_pair(tokens, "jaxis", &fields)?;
            let direction = if axis & 1 == 1 {
                AxisDirection::Positive
            } else {
                AxisDirection::Negative
            };
            InputEvent::JoystickAxis {
                device,
                axis: axis >> 1,
                direction,
            }
        }
    };
    Ok(Value::InputEvent(event))
}

/// Read comma-separated raw fields through the closing `)`, trimmed.
fn read_fields(tokens: &mut Tokenizer<'_>) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    loop {
        let c = tokens
            .get_char()
            .ok_or_else(|| tokens.error(ErrorKind::UnexpectedEof("legacy construct")))?;
        match c {
            ',' => fields.push(std::mem::take(&mut field).trim().to_string()),
            ')' => {
                fields.push(field.trim().to_string());
                return Ok(fields);
            }
            '\n' => {
                tokens.newline();
                field.push(c);
            }
            _ => field.push(c),
        }
    }
}

fn skip_to_close(tokens: &mut Tokenizer<'_>) -> Result<()> {
    loop {
        match tokens.get_char() {
            Some(')') => return Ok(()),
            Some('\n') => tokens.newline(),
            Some(_) => {}
            None => return Err(tokens.error(ErrorKind::UnexpectedEof("legacy construct"))),
        }
    }
}

fn number(tokens: &Tokenizer<'_>, field: &str) -> Result<i64> {
    field
        .parse::<i64>()
        .map_err(|_| tokens.error(ErrorKind::InvalidNumber(field.to_string())))
}

fn key_event(
    tokens: &Tokenizer<'_>,
    fields: &[String],
    keycodes: &dyn KeycodeLookup,
) -> Result<InputEvent> {
    if fields.len() != 1 && fields.len() != 2 {
        return Err(tokens.error(ErrorKind::LegacyFieldCount {
            construct: "key",
            expected: "1 or 2",
            found: fields.len(),
        }));
    }
    let name = &fields[0];
    let scancode = match name.parse::<i64>() {
        // Single digits are stored as their digit key.
        Ok(n) if n < 10 => i64::from(b'0') + n,
        Ok(n) => n,
        Err(_) => keycodes
            .lookup(name)
            .ok_or_else(|| tokens.error(ErrorKind::UnknownKey(name.clone())))?,
    };
    let modifiers = fields
        .get(1)
        .map(|m| KeyModifiers::from_letters(m))
        .unwrap_or_default();
    Ok(InputEvent::Key {
        scancode,
        modifiers,
    })
}

fn device_pair(
    tokens: &Tokenizer<'_>,
    construct: &'static str,
    fields: &[String],
) -> Result<(i64, i64)> {
    if fields.len() != 2 {
        return Err(tokens.error(ErrorKind::LegacyFieldCount {
            construct,
            expected: "2",
            found: fields.len(),
        }));
    }
    Ok((number(tokens, &fields[0])?, number(tokens, &fields[1])?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseContext;
    use crate::keys::StandardKeycodes;
    use crate::stream::StrStream;
    use crate::tokenizer::Token;

    fn legacy(input: &str) -> Result<(Value, Token)> {
        let mut stream = StrStream::new(input);
        let mut tokens = Tokenizer::new(&mut stream, ParseContext::default());
        let name = match tokens.next_token()? {
            Token::Identifier(name) => name,
            other => panic!("unexpected {:?}", other),
        };
        let value = parse(&mut tokens, &name, &StandardKeycodes)?;
        Ok((value, tokens.next_token()?))
    }

    #[test]
    fn test_key_digit_and_name() {
        let (v, rest) = legacy("key(3) ,").unwrap();
        assert_eq!(
            v,
            Value::InputEvent(InputEvent::Key {
                scancode: 51,
                modifiers: KeyModifiers::default()
            })
        );
        assert_eq!(rest, Token::Comma);

        let (v, _) = legacy("key( Q , CS )").unwrap();
        assert_eq!(
            v,
            Value::InputEvent(InputEvent::Key {
                scancode: 81,
                modifiers: KeyModifiers {
                    control: true,
                    shift: true,
                    ..Default::default()
                }
            })
        );
    }

    #[test]
    fn test_buttons_and_axis() {
        let (v, _) = legacy("mbutton(0, 2)").unwrap();
        assert_eq!(
            v,
            Value::InputEvent(InputEvent::MouseButton {
                device: 0,
                index: 2
            })
        );
        let (v, _) = legacy("jaxis(1, 3)").unwrap();
        assert_eq!(
            v,
            Value::InputEvent(InputEvent::JoystickAxis {
                device: 1,
                axis: 1,
                direction: AxisDirection::Positive
            })
        );
        let (v, _) = legacy("jaxis(0, 4)").unwrap();
        assert_eq!(
            v,
            Value::InputEvent(InputEvent::JoystickAxis {
                device: 0,
                axis: 2,
                direction: AxisDirection::Negative
            })
        );
    }

    #[test]
    fn test_img_is_empty_image() {
        let (v, rest) = legacy("img(whatever, 1, 2) 5").unwrap();
        assert_eq!(v, Value::Image(Image::empty()));
        assert_eq!(rest, Token::Number(crate::tokenizer::Number::Int(5)));
    }

    #[test]
    fn test_legacy_errors() {
        let err = legacy("jbutton(1)").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected 2 fields in legacy jbutton(), got 1 at line 1"
        );
        let err = legacy("mbutton(0,\n1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected end of file while parsing legacy construct at line 2"
        );
        let err = legacy("key(Nope)").unwrap_err();
        assert_eq!(err.to_string(), "Unknown key name 'Nope' at line 1");
    }
}
