//! Character sources for the tokenizer.
//!
//! A stream hands out one `char` at a time and reports `None` at the end.
//! String-backed streams yield decoded characters. Byte-backed streams yield
//! one `char` per byte (Latin-1 style) and ask the tokenizer to re-decode
//! string literals as UTF-8 once they are assembled.

use std::fs::File;
use std::io::{self, BufReader, Bytes, Read};
use std::path::Path;

/// A source of characters with an end sentinel.
pub trait CharStream {
    /// The next character, or `None` at end of input.
    fn next_char(&mut self) -> Option<char>;

    /// Returns `true` once the source is exhausted.
    fn is_at_end(&self) -> bool;

    /// Returns `true` when characters are raw bytes and string literals must
    /// be re-decoded as UTF-8.
    fn is_utf8(&self) -> bool;
}

/// An in-memory stream over already-decoded text.
#[derive(Debug, Clone)]
pub struct StrStream<'a> {
    rest: &'a str,
}

impl<'a> StrStream<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    /// The unread tail of the input.
    pub fn remaining(&self) -> &'a str {
        self.rest
    }
}

impl CharStream for StrStream<'_> {
    fn next_char(&mut self) -> Option<char> {
        let mut chars = self.rest.chars();
        let c = chars.next()?;
        self.rest = chars.as_str();
        Some(c)
    }

    fn is_at_end(&self) -> bool {
        self.rest.is_empty()
    }

    fn is_utf8(&self) -> bool {
        false
    }
}

/// A byte-oriented stream over any reader.
///
/// The first I/O error ends the stream. It is logged and kept for the caller
/// to collect with [`ReaderStream::take_error`].
pub struct ReaderStream<R: Read> {
    bytes: Bytes<BufReader<R>>,
    at_end: bool,
    error: Option<io::Error>,
}

/// A byte-oriented stream over a file.
pub type FileStream = ReaderStream<File>;

impl<R: Read> ReaderStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
            at_end: false,
            error: None,
        }
    }

    /// Take the I/O error that ended the stream early, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

impl ReaderStream<File> {
    /// Open a file for reading.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> CharStream for ReaderStream<R> {
    fn next_char(&mut self) -> Option<char> {
        if self.at_end {
            return None;
        }
        match self.bytes.next() {
            Some(Ok(b)) => Some(b as char),
            Some(Err(err)) => {
                log::error!("read failed: {}", err);
                self.error = Some(err);
                self.at_end = true;
                None
            }
            None => {
                self.at_end = true;
                None
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.at_end
    }

    fn is_utf8(&self) -> bool {
        true
    }
}
