//! Error types for variant text parsing.

use thiserror::Error;

use crate::hooks::ReferenceKind;

/// Result type for variant text parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }
}

/// Format the filename part of a location suffix.
fn file_suffix(filename: &Option<String>) -> String {
    match filename {
        Some(name) => format!(" of {}", name),
        None => String::new(),
    }
}

/// What went wrong, independent of where.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// A character that cannot start any token.
    #[error("Unexpected character '{0}'")]
    UnexpectedChar(char),

    /// End of input inside a string literal.
    #[error("Unterminated string")]
    UnterminatedString,

    /// A `\u` escape not followed by four hex digits.
    #[error("Malformed hex constant in string")]
    MalformedHex,

    /// A `\u` escape naming a surrogate.
    #[error("Invalid code point U+{0:04X} in string")]
    InvalidCodePoint(u32),

    /// String bytes read from a byte stream are not UTF-8.
    #[error("Invalid UTF-8 in string")]
    InvalidUtf8,

    /// A `#` color literal of unsupported length.
    #[error("Invalid color code '#{0}'")]
    InvalidColor(String),

    /// Number text the number grammar accepted but could not convert.
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    /// A token of the wrong kind.
    #[error("Expected {expected}, got {found}")]
    Expected { expected: String, found: String },

    /// Input ended in the middle of a construct.
    #[error("Unexpected end of file while parsing {0}")]
    UnexpectedEof(&'static str),

    /// A constructor received the wrong number of arguments.
    #[error("Expected {expected} arguments for {constructor}, got {found}")]
    Arity {
        constructor: String,
        expected: usize,
        found: usize,
    },

    /// A typed array received a flat list not divisible by its element arity.
    #[error("Expected a multiple of {arity} arguments for {constructor}, got {found}")]
    ArityMultiple {
        constructor: &'static str,
        arity: usize,
        found: usize,
    },

    /// A numeric argument does not fit its target type.
    #[error("Value {value} out of range for {target}")]
    OutOfRange { target: &'static str, value: String },

    /// An identifier that names no value or constructor.
    #[error("Unexpected identifier '{0}'")]
    UnexpectedIdentifier(String),

    /// An image format name outside the known set.
    #[error("Invalid image format '{0}'")]
    InvalidImageFormat(String),

    /// Image pixel data does not match the declared shape.
    #[error("Expected {expected} bytes of image data, got {found}")]
    ImageDataSize { expected: usize, found: usize },

    /// Image dimensions whose data size overflows.
    #[error("Image dimensions too large")]
    ImageTooLarge,

    /// The by-path loader could not produce the resource.
    #[error("Can't load resource at path '{0}'")]
    ResourceNotFound(String),

    /// A reference construct with no way to resolve it.
    #[error("No resolver registered for {0}")]
    NoResolver(ReferenceKind),

    /// An `InputEvent` sub-variant outside the known set.
    #[error("Invalid input event type '{0}'")]
    InvalidInputEvent(String),

    /// A symbolic key name the keycode lookup does not know.
    #[error("Unknown key name '{0}'")]
    UnknownKey(String),

    /// A deprecated single-line construct with the wrong field count.
    #[error("Expected {expected} fields in legacy {construct}(), got {found}")]
    LegacyFieldCount {
        construct: &'static str,
        expected: &'static str,
        found: usize,
    },

    /// A message produced by an injected resolver.
    #[error("{0}")]
    Resolver(String),
}

/// Error type for variant text parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A syntax error at a 1-based line.
    #[error("{kind} at line {line}{}", file_suffix(.filename))]
    Syntax {
        kind: ErrorKind,
        line: usize,
        filename: Option<String>,
    },

    /// The input ended cleanly before any further value, tag or assignment.
    #[error("End of file")]
    Eof,
}

impl ParseError {
    /// Create an error with location information.
    pub fn at(kind: ErrorKind, ctx: &ParseContext, line: usize) -> Self {
        ParseError::Syntax {
            kind,
            line,
            filename: ctx.filename.clone(),
        }
    }

    /// Returns `true` for the clean end-of-input condition.
    pub fn is_eof(&self) -> bool {
        matches!(self, ParseError::Eof)
    }

    /// The line of a syntax error.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { line, .. } => Some(*line),
            ParseError::Eof => None,
        }
    }

    /// The kind of a syntax error.
    pub fn kind(&self) -> Option<&ErrorKind> {
        match self {
            ParseError::Syntax { kind, .. } => Some(kind),
            ParseError::Eof => None,
        }
    }
}
