//! Configuration records: `[section key=value]` tags and `key = value`
//! assignments.
//!
//! Record framing is character level. Keys are raw text up to `=`, so they
//! may contain characters that are not valid identifiers; values go through
//! the ordinary value parser.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use crate::error::{ErrorKind, ParseError, Result};
use crate::parser::Parser;
use crate::tokenizer::{Token, TokenKind, Tokenizer};
use crate::value::Value;
use crate::writer::{self, WriteOptions};

/// A bracketed section header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tag {
    /// The name, including any `.` or `:` qualifiers.
    pub name: String,
    pub fields: BTreeMap<String, Value>,
}

/// One top-level record of a configuration file.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Tag(Tag),
    Assign { key: String, value: Value },
}

// ============================================================================
// Reading
// ============================================================================

fn next_in_tag(tokens: &mut Tokenizer<'_>) -> Result<Token> {
    match tokens.next_token()? {
        Token::Eof => Err(tokens.error(ErrorKind::UnexpectedEof("tag"))),
        token => Ok(token),
    }
}

fn identifier(tokens: &Tokenizer<'_>, token: Token) -> Result<String> {
    match token {
        Token::Identifier(id) => Ok(id),
        other => Err(tokens.unexpected("identifier", &other)),
    }
}

/// Read the raw text up to `]` as the tag name.
fn simple_tag(tokens: &mut Tokenizer<'_>) -> Result<Tag> {
    let mut text = tokens.raw_text();
    loop {
        match tokens.get_char() {
            Some(']') => break,
            Some(c) => {
                if c == '\n' {
                    tokens.newline();
                }
                text.push(c);
            }
            None => return Err(tokens.error(ErrorKind::UnexpectedEof("tag"))),
        }
    }
    let name = text.finish(tokens)?.trim().to_string();
    Ok(Tag {
        name,
        fields: BTreeMap::new(),
    })
}

/// Parse a tag. In simple mode the whole bracket body is the name.
///
/// The opening `[` must be the next token. At end of input this returns
/// [`ParseError::Eof`].
pub fn parse_tag(parser: &mut Parser<'_, '_>, simple: bool) -> Result<Tag> {
    let tokens = parser.tokenizer();
    match tokens.next_token()? {
        Token::BracketOpen => {}
        Token::Eof => return Err(ParseError::Eof),
        other => return Err(tokens.unexpected(TokenKind::BracketOpen.describe(), &other)),
    }
    tag_body(parser, simple)
}

fn tag_body(parser: &mut Parser<'_, '_>, simple: bool) -> Result<Tag> {
    if simple {
        return simple_tag(parser.tokenizer());
    }

    let tokens = parser.tokenizer();
    let first = next_in_tag(tokens)?;
    let mut tag = Tag {
        name: identifier(tokens, first)?,
        fields: BTreeMap::new(),
    };
    let mut in_name = true;

    loop {
        let tokens = parser.tokenizer();
        let mut token = next_in_tag(tokens)?;
        if token == Token::BracketClose {
            return Ok(tag);
        }
        if in_name && matches!(token, Token::Period | Token::Colon) {
            tag.name.push(if token == Token::Period { '.' } else { ':' });
            token = next_in_tag(tokens)?;
        } else {
            in_name = false;
        }
        let id = identifier(tokens, token)?;
        if in_name {
            tag.name.push_str(&id);
            continue;
        }

        match next_in_tag(tokens)? {
            Token::Equal => {}
            other => return Err(tokens.unexpected("'='", &other)),
        }
        let token = next_in_tag(tokens)?;
        let value = parser.parse_value(token)?;
        tag.fields.insert(id, value);
    }
}

/// Read the next tag or assignment.
///
/// Returns [`ParseError::Eof`] when only whitespace and comments remain.
pub fn next_record(parser: &mut Parser<'_, '_>, simple: bool) -> Result<Record> {
    let tokens = parser.tokenizer();
    let mut key = tokens.raw_text();

    loop {
        let tokens = parser.tokenizer();
        let c = match tokens.get_char() {
            Some(c) => c,
            None if key.is_empty() => return Err(ParseError::Eof),
            None => return Err(tokens.error(ErrorKind::UnexpectedEof("assignment"))),
        };
        match c {
            ';' => tokens.skip_comment(),
            '\n' => tokens.newline(),
            '[' if key.is_empty() => {
                let tag = tag_body(parser, simple)?;
                log::trace!("tag [{}] with {} fields", tag.name, tag.fields.len());
                return Ok(Record::Tag(tag));
            }
            '"' => {
                tokens.unget(c);
                match tokens.next_token()? {
                    Token::Str(s) => {
                        key = tokens.raw_text();
                        for c in s.chars() {
                            key.push_decoded(c);
                        }
                    }
                    other => return Err(tokens.unexpected("string", &other)),
                }
            }
            '=' => {
                if key.is_empty() {
                    return Err(tokens.unexpected("key", &Token::Equal));
                }
                let key = key.finish(tokens)?;
                let token = match tokens.next_token()? {
                    Token::Eof => {
                        return Err(tokens.error(ErrorKind::UnexpectedEof("assignment")))
                    }
                    token => token,
                };
                let value = parser.parse_value(token)?;
                log::trace!("assignment {} = {:?}", key, value);
                return Ok(Record::Assign { key, value });
            }
            c if c > ' ' => key.push(c),
            _ => {}
        }
    }
}

/// Iterator over the records of a configuration stream.
///
/// Stops after end of input or the first error.
pub struct Records<'p, 'a, 'h> {
    parser: &'p mut Parser<'a, 'h>,
    simple: bool,
    done: bool,
}

impl<'p, 'a, 'h> Records<'p, 'a, 'h> {
    pub fn new(parser: &'p mut Parser<'a, 'h>, simple: bool) -> Self {
        Self {
            parser,
            simple,
            done: false,
        }
    }
}

impl Iterator for Records<'_, '_, '_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match next_record(self.parser, self.simple) {
            Ok(record) => Some(Ok(record)),
            Err(ParseError::Eof) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

// ============================================================================
// Writing
// ============================================================================

fn needs_quotes(key: &str) -> bool {
    key.is_empty()
        || key.starts_with('[')
        || key
            .chars()
            .any(|c| c <= ' ' || c == '\u{7f}' || matches!(c, '=' | '"' | ';'))
}

fn write_key<W: Write + ?Sized>(out: &mut W, key: &str) -> fmt::Result {
    if needs_quotes(key) {
        out.write_str(&writer::quote(key, false))
    } else {
        out.write_str(key)
    }
}

/// Write `[name key=value ...]`.
pub fn write_tag<W: Write + ?Sized>(
    tag: &Tag,
    out: &mut W,
    options: &WriteOptions<'_>,
) -> fmt::Result {
    write!(out, "[{}", tag.name)?;
    for (key, value) in &tag.fields {
        write!(out, " {}=", key)?;
        writer::write(value, out, options)?;
    }
    out.write_str("]")
}

/// Write `key = value`, quoting the key when it would not read back.
pub fn write_assignment<W: Write + ?Sized>(
    key: &str,
    value: &Value,
    out: &mut W,
    options: &WriteOptions<'_>,
) -> fmt::Result {
    write_key(out, key)?;
    out.write_str(" = ")?;
    writer::write(value, out, options)
}

/// Write one record without a trailing newline.
pub fn write_record<W: Write + ?Sized>(
    record: &Record,
    out: &mut W,
    options: &WriteOptions<'_>,
) -> fmt::Result {
    match record {
        Record::Tag(tag) => write_tag(tag, out, options),
        Record::Assign { key, value } => write_assignment(key, value, out, options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseContext;
    use crate::hooks::Hooks;
    use crate::math::Vector2;
    use crate::stream::{ReaderStream, StrStream};

    fn records(input: &str, simple: bool) -> Result<Vec<Record>> {
        let mut stream = StrStream::new(input);
        let mut parser = Parser::new(&mut stream, ParseContext::default(), Hooks::new());
        Records::new(&mut parser, simple).collect()
    }

    fn assign(key: &str, value: Value) -> Record {
        Record::Assign {
            key: key.to_string(),
            value,
        }
    }

    #[test]
    fn test_tags_and_assignments() {
        let recs = records(
            "; header\n[gd_scene load_steps=2 format=2]\n\nname = \"Root\"\nsize=Vector2( 1, 2 )\n",
            false,
        )
        .unwrap();
        let mut fields = BTreeMap::new();
        fields.insert("format".to_string(), Value::Int(2));
        fields.insert("load_steps".to_string(), Value::Int(2));
        assert_eq!(
            recs,
            vec![
                Record::Tag(Tag {
                    name: "gd_scene".to_string(),
                    fields
                }),
                assign("name", Value::from("Root")),
                assign("size", Value::Vector2(Vector2::new(1.0, 2.0))),
            ]
        );
    }

    #[test]
    fn test_qualified_tag_names() {
        let recs = records("[input.ui:accept kind=\"x\"]", false).unwrap();
        match &recs[0] {
            Record::Tag(tag) => {
                assert_eq!(tag.name, "input.ui:accept");
                assert_eq!(tag.fields.get("kind"), Some(&Value::from("x")));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_simple_tags() {
        let recs = records("[ display / window ]\nw=1", true).unwrap();
        assert_eq!(
            recs[0],
            Record::Tag(Tag {
                name: "display / window".to_string(),
                fields: BTreeMap::new()
            })
        );
        assert_eq!(recs[1], assign("w", Value::Int(1)));
    }

    #[test]
    fn test_odd_keys() {
        let recs = records("window/size.x = 3\n\"spaced key\" = true", false).unwrap();
        assert_eq!(
            recs,
            vec![
                assign("window/size.x", Value::Int(3)),
                assign("spaced key", Value::Bool(true)),
            ]
        );
    }

    #[test]
    fn test_byte_stream_keys_are_decoded() {
        let mut stream = ReaderStream::new("é = 1".as_bytes());
        let mut parser = Parser::new(&mut stream, ParseContext::default(), Hooks::new());
        let recs: Result<Vec<_>> = Records::new(&mut parser, false).collect();
        assert_eq!(recs.unwrap(), vec![assign("é", Value::Int(1))]);
    }

    #[test]
    fn test_record_errors() {
        let err = records("a = 1\nb", false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected end of file while parsing assignment at line 2"
        );
        let err = records("[t x]", false).unwrap_err();
        assert_eq!(err.to_string(), "Expected '=', got ']' at line 1");
        let err = records("[t x=1", false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected end of file while parsing tag at line 1"
        );
        let err = records("= 4", false).unwrap_err();
        assert_eq!(err.to_string(), "Expected key, got '=' at line 1");
    }

    #[test]
    fn test_records_stop_after_error() {
        let mut stream = StrStream::new("a = ]\nb = 2");
        let mut parser = Parser::new(&mut stream, ParseContext::default(), Hooks::new());
        let mut it = Records::new(&mut parser, false);
        assert!(it.next().unwrap().is_err());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_parse_tag_at_eof() {
        let mut stream = StrStream::new("  \n");
        let mut parser = Parser::new(&mut stream, ParseContext::default(), Hooks::new());
        assert!(parse_tag(&mut parser, false).unwrap_err().is_eof());
    }

    #[test]
    fn test_write_records() {
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), Value::Int(1));
        fields.insert("path".to_string(), Value::from("res://a.png"));
        let tag = Record::Tag(Tag {
            name: "ext_resource".to_string(),
            fields,
        });
        let mut out = String::new();
        write_record(&tag, &mut out, &WriteOptions::default()).unwrap();
        assert_eq!(out, "[ext_resource id=1 path=\"res://a.png\"]");

        let mut out = String::new();
        write_assignment("a b", &Value::Real(0.5), &mut out, &WriteOptions::default()).unwrap();
        assert_eq!(out, "\"a b\" = 0.5");

        let mut out = String::new();
        write_assignment("x/y", &Value::Nil, &mut out, &WriteOptions::default()).unwrap();
        assert_eq!(out, "x/y = null");
    }
}
