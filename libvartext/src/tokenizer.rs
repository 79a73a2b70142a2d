//! Tokenizer: characters to tokens.
//!
//! The tokenizer owns the parse cursor: the borrowed stream, a single
//! pushback slot and the line counter. Parsers and resolvers share one
//! `Tokenizer` by `&mut`, so every consumer sees the same position and line.

use std::fmt;

use crate::error::{ErrorKind, ParseContext, ParseError, Result};
use crate::math::Color;
use crate::stream::CharStream;

/// A numeric literal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Real(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Real(f) => f,
        }
    }
}

/// A single token.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    CurlyOpen,
    CurlyClose,
    BracketOpen,
    BracketClose,
    ParenOpen,
    ParenClose,
    Colon,
    Comma,
    Period,
    Equal,
    Identifier(String),
    Str(String),
    Number(Number),
    Color(Color),
    Eof,
}

/// Token kinds without payloads, for expectations and messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    CurlyOpen,
    CurlyClose,
    BracketOpen,
    BracketClose,
    ParenOpen,
    ParenClose,
    Colon,
    Comma,
    Period,
    Equal,
    Identifier,
    Str,
    Number,
    Color,
    Eof,
}

impl TokenKind {
    /// How the kind is named in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::CurlyOpen => "'{'",
            TokenKind::CurlyClose => "'}'",
            TokenKind::BracketOpen => "'['",
            TokenKind::BracketClose => "']'",
            TokenKind::ParenOpen => "'('",
            TokenKind::ParenClose => "')'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Period => "'.'",
            TokenKind::Equal => "'='",
            TokenKind::Identifier => "identifier",
            TokenKind::Str => "string",
            TokenKind::Number => "number",
            TokenKind::Color => "color",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::CurlyOpen => TokenKind::CurlyOpen,
            Token::CurlyClose => TokenKind::CurlyClose,
            Token::BracketOpen => TokenKind::BracketOpen,
            Token::BracketClose => TokenKind::BracketClose,
            Token::ParenOpen => TokenKind::ParenOpen,
            Token::ParenClose => TokenKind::ParenClose,
            Token::Colon => TokenKind::Colon,
            Token::Comma => TokenKind::Comma,
            Token::Period => TokenKind::Period,
            Token::Equal => TokenKind::Equal,
            Token::Identifier(_) => TokenKind::Identifier,
            Token::Str(_) => TokenKind::Str,
            Token::Number(_) => TokenKind::Number,
            Token::Color(_) => TokenKind::Color,
            Token::Eof => TokenKind::Eof,
        }
    }

    pub fn describe(&self) -> &'static str {
        self.kind().describe()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum NumberState {
    Int,
    Dec,
    Exp,
}

fn push_utf8(bytes: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

/// Text gathered from raw characters. Over a byte stream each character is
/// one byte, so the bytes are decoded again when the text is finished.
pub struct RawText {
    bytes: Vec<u8>,
    utf8: bool,
}

impl RawText {
    /// Append a raw character as read from the stream.
    pub fn push(&mut self, c: char) {
        if self.utf8 && (c as u32) < 0x100 {
            self.bytes.push(c as u8);
        } else {
            push_utf8(&mut self.bytes, c);
        }
    }

    /// Append an already decoded character, such as a string escape.
    pub fn push_decoded(&mut self, c: char) {
        push_utf8(&mut self.bytes, c);
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the gathered text.
    pub fn finish(self, tokens: &Tokenizer<'_>) -> Result<String> {
        String::from_utf8(self.bytes).map_err(|_| tokens.error(ErrorKind::InvalidUtf8))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// The parse cursor over a character stream.
pub struct Tokenizer<'a> {
    stream: &'a mut dyn CharStream,
    saved: Option<char>,
    line: usize,
    ctx: ParseContext,
}

impl<'a> Tokenizer<'a> {
    pub fn new(stream: &'a mut dyn CharStream, ctx: ParseContext) -> Self {
        Self {
            stream,
            saved: None,
            line: 1,
            ctx,
        }
    }

    /// The current 1-based line.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn context(&self) -> &ParseContext {
        &self.ctx
    }

    /// Returns `true` when nothing is left, including the pushback slot.
    pub fn is_at_end(&self) -> bool {
        self.saved.is_none() && self.stream.is_at_end()
    }

    /// Read one raw character, honoring the pushback slot. Newlines read
    /// this way are not counted; callers reading raw text count their own.
    pub fn get_char(&mut self) -> Option<char> {
        self.saved.take().or_else(|| self.stream.next_char())
    }

    /// Push one character back. The slot holds a single character.
    pub fn unget(&mut self, c: char) {
        self.saved = Some(c);
    }

    /// An empty buffer for raw text read with `get_char`.
    pub fn raw_text(&self) -> RawText {
        RawText {
            bytes: Vec::new(),
            utf8: self.stream.is_utf8(),
        }
    }

    /// Advance the line counter past a newline consumed with `get_char`.
    pub fn newline(&mut self) {
        self.line += 1;
    }

    /// Build an error at the current line.
    pub fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError::at(kind, &self.ctx, self.line)
    }

    /// An "Expected X, got Y" error for `found`.
    pub fn unexpected(&self, expected: &str, found: &Token) -> ParseError {
        self.error(ErrorKind::Expected {
            expected: expected.to_string(),
            found: found.describe().to_string(),
        })
    }

    /// Read the next token and require it to be of `kind`.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        let token = self.next_token()?;
        if token.kind() == kind {
            Ok(token)
        } else {
            Err(self.unexpected(kind.describe(), &token))
        }
    }

    /// Read the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            let c = match self.get_char() {
                Some(c) => c,
                None => return Ok(Token::Eof),
            };
            match c {
                '\n' => self.line += 1,
                '{' => return Ok(Token::CurlyOpen),
                '}' => return Ok(Token::CurlyClose),
                '[' => return Ok(Token::BracketOpen),
                ']' => return Ok(Token::BracketClose),
                '(' => return Ok(Token::ParenOpen),
                ')' => return Ok(Token::ParenClose),
                ':' => return Ok(Token::Colon),
                ',' => return Ok(Token::Comma),
                '.' => return Ok(Token::Period),
                '=' => return Ok(Token::Equal),
                ';' => self.skip_comment(),
                '#' => return self.read_color(),
                '"' => return self.read_string(),
                c if c <= ' ' => {}
                c if c == '-' || c.is_ascii_digit() => return self.read_number(c),
                c if is_ident_start(c) => return Ok(self.read_identifier(c)),
                c => return Err(self.error(ErrorKind::UnexpectedChar(c))),
            }
        }
    }

    /// Skip a `;` comment through its newline.
    pub fn skip_comment(&mut self) {
        while let Some(c) = self.get_char() {
            if c == '\n' {
                self.line += 1;
                break;
            }
        }
    }

    fn read_color(&mut self) -> Result<Token> {
        let mut code = String::new();
        while let Some(c) = self.get_char() {
            if c.is_ascii_hexdigit() {
                code.push(c);
            } else {
                self.unget(c);
                break;
            }
        }
        match Color::from_html(&code) {
            Some(color) => Ok(Token::Color(color)),
            None => Err(self.error(ErrorKind::InvalidColor(code))),
        }
    }

    fn read_string(&mut self) -> Result<Token> {
        let mut text = self.raw_text();
        loop {
            let c = self
                .get_char()
                .ok_or_else(|| self.error(ErrorKind::UnterminatedString))?;
            match c {
                '"' => break,
                '\\' => {
                    let next = self
                        .get_char()
                        .ok_or_else(|| self.error(ErrorKind::UnterminatedString))?;
                    let escaped = match next {
                        'b' => '\u{8}',
                        't' => '\t',
                        'n' => '\n',
                        'f' => '\u{c}',
                        'r' => '\r',
                        'u' => self.read_hex_escape()?,
                        other => other,
                    };
                    text.push_decoded(escaped);
                }
                c => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    text.push(c);
                }
            }
        }
        text.finish(self).map(Token::Str)
    }

    fn read_hex_escape(&mut self) -> Result<char> {
        let mut code: u32 = 0;
        for _ in 0..4 {
            let c = self
                .get_char()
                .ok_or_else(|| self.error(ErrorKind::UnterminatedString))?;
            let digit = c
                .to_digit(16)
                .ok_or_else(|| self.error(ErrorKind::MalformedHex))?;
            code = (code << 4) | digit;
        }
        char::from_u32(code).ok_or_else(|| self.error(ErrorKind::InvalidCodePoint(code)))
    }

    fn read_number(&mut self, first: char) -> Result<Token> {
        let mut text = String::new();
        let mut c = Some(first);
        if first == '-' {
            text.push('-');
            c = self.get_char();
        }

        let mut state = NumberState::Int;
        let mut is_real = false;
        let mut exp_sign = false;
        let mut exp_digits = false;
        while let Some(ch) = c {
            let accept = match state {
                NumberState::Int => match ch {
                    '0'..='9' => true,
                    '.' => {
                        state = NumberState::Dec;
                        is_real = true;
                        true
                    }
                    'e' => {
                        state = NumberState::Exp;
                        is_real = true;
                        true
                    }
                    _ => false,
                },
                NumberState::Dec => match ch {
                    '0'..='9' => true,
                    'e' => {
                        state = NumberState::Exp;
                        true
                    }
                    _ => false,
                },
                NumberState::Exp => match ch {
                    '0'..='9' => {
                        exp_digits = true;
                        true
                    }
                    '+' | '-' if !exp_sign && !exp_digits => {
                        exp_sign = true;
                        true
                    }
                    _ => false,
                },
            };
            if !accept {
                break;
            }
            text.push(ch);
            c = self.get_char();
        }
        if let Some(ch) = c {
            self.unget(ch);
        }

        let number = if is_real {
            text.parse::<f64>().ok().map(Number::Real)
        } else {
            text.parse::<i64>().ok().map(Number::Int)
        };
        number
            .map(Token::Number)
            .ok_or_else(|| self.error(ErrorKind::InvalidNumber(text)))
    }

    fn read_identifier(&mut self, first: char) -> Token {
        let mut id = String::from(first);
        while let Some(c) = self.get_char() {
            if is_ident_char(c) {
                id.push(c);
            } else {
                self.unget(c);
                break;
            }
        }
        Token::Identifier(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{ReaderStream, StrStream};

    fn tokens(input: &str) -> Result<Vec<Token>> {
        let mut stream = StrStream::new(input);
        let mut t = Tokenizer::new(&mut stream, ParseContext::default());
        let mut out = Vec::new();
        loop {
            let token = t.next_token()?;
            if token == Token::Eof {
                return Ok(out);
            }
            out.push(token);
        }
    }

    fn one(input: &str) -> Result<Token> {
        let mut stream = StrStream::new(input);
        let mut t = Tokenizer::new(&mut stream, ParseContext::default());
        t.next_token()
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            tokens("{}[]():,.=").unwrap(),
            vec![
                Token::CurlyOpen,
                Token::CurlyClose,
                Token::BracketOpen,
                Token::BracketClose,
                Token::ParenOpen,
                Token::ParenClose,
                Token::Colon,
                Token::Comma,
                Token::Period,
                Token::Equal,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(one("42").unwrap(), Token::Number(Number::Int(42)));
        assert_eq!(one("-7,").unwrap(), Token::Number(Number::Int(-7)));
        assert_eq!(one("1.5").unwrap(), Token::Number(Number::Real(1.5)));
        assert_eq!(one("-2.5e-3").unwrap(), Token::Number(Number::Real(-2.5e-3)));
        assert_eq!(one("1e10").unwrap(), Token::Number(Number::Real(1e10)));
        assert_eq!(one("3.").unwrap(), Token::Number(Number::Real(3.0)));
    }

    #[test]
    fn test_number_pushes_back_terminator() {
        assert_eq!(
            tokens("1.5)").unwrap(),
            vec![Token::Number(Number::Real(1.5)), Token::ParenClose]
        );
        assert_eq!(
            tokens("2E5").unwrap(),
            vec![
                Token::Number(Number::Int(2)),
                Token::Identifier("E5".into())
            ]
        );
    }

    #[test]
    fn test_invalid_numbers() {
        let err = one("-").unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::InvalidNumber("-".into())));
        let err = one("1e").unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::InvalidNumber("1e".into())));
        assert!(one("99999999999999999999").is_err());
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            tokens("_a1 b2").unwrap(),
            vec![Token::Identifier("_a1".into()), Token::Identifier("b2".into())]
        );
        assert_eq!(
            tokens("Vector2(").unwrap(),
            vec![Token::Identifier("Vector2".into()), Token::ParenOpen]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(one(r#""a\nb""#).unwrap(), Token::Str("a\nb".into()));
        assert_eq!(one(r#""\u0041""#).unwrap(), Token::Str("A".into()));
        assert_eq!(one(r#""\q\"\\""#).unwrap(), Token::Str("q\"\\".into()));
        assert_eq!(
            one(r#""\b\t\f\r""#).unwrap(),
            Token::Str("\u{8}\t\u{c}\r".into())
        );
    }

    #[test]
    fn test_string_errors() {
        let err = one(r#""\u00g1""#).unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::MalformedHex));
        let err = one("\"abc").unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::UnterminatedString));
        let err = one("\"abc\\").unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::UnterminatedString));
        let err = one(r#""\ud800""#).unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::InvalidCodePoint(0xD800)));
    }

    #[test]
    fn test_byte_stream_redecodes_utf8() {
        let mut stream = ReaderStream::new("\"héllo\" \"\\u00e9\"".as_bytes());
        let mut t = Tokenizer::new(&mut stream, ParseContext::default());
        assert_eq!(t.next_token().unwrap(), Token::Str("héllo".into()));
        assert_eq!(t.next_token().unwrap(), Token::Str("é".into()));
    }

    #[test]
    fn test_byte_stream_rejects_bad_utf8() {
        let bytes: &[u8] = b"\"\xff\"";
        let mut stream = ReaderStream::new(bytes);
        let mut t = Tokenizer::new(&mut stream, ParseContext::default());
        let err = t.next_token().unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::InvalidUtf8));
    }

    #[test]
    fn test_colors() {
        assert_eq!(
            tokens("#ff0000 #0f0,").unwrap(),
            vec![
                Token::Color(Color::new(1.0, 0.0, 0.0, 1.0)),
                Token::Color(Color::new(0.0, 1.0, 0.0, 1.0)),
                Token::Comma,
            ]
        );
        let err = one("#12345").unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::InvalidColor("12345".into())));
        let err = one("# ").unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::InvalidColor(String::new())));
    }

    #[test]
    fn test_line_counting() {
        let mut stream = StrStream::new("a ; note\n\"x\ny\"\n\nb");
        let mut t = Tokenizer::new(&mut stream, ParseContext::default());
        assert_eq!(t.line(), 1);
        t.next_token().unwrap();
        t.next_token().unwrap();
        assert_eq!(t.line(), 3);
        assert_eq!(t.next_token().unwrap(), Token::Identifier("b".into()));
        assert_eq!(t.line(), 5);
        assert_eq!(t.next_token().unwrap(), Token::Eof);
        assert!(t.is_at_end());
    }

    #[test]
    fn test_unexpected_character() {
        let mut stream = StrStream::new("\n@");
        let mut t = Tokenizer::new(&mut stream, ParseContext::default());
        let err = t.next_token().unwrap_err();
        assert_eq!(err.to_string(), "Unexpected character '@' at line 2");
    }

    #[test]
    fn test_expect_reports_found_kind() {
        let mut stream = StrStream::new("\"s\"");
        let mut t = Tokenizer::new(&mut stream, ParseContext::default());
        let err = t.expect(TokenKind::ParenOpen).unwrap_err();
        assert_eq!(err.to_string(), "Expected '(', got string at line 1");
    }
}
