//! Reference handling for the command-line tool.
//!
//! `Resource( "path" )` is resolved against the directory of the input file.
//! `ExtResource( id )` and `SubResource( id )` only make sense inside the
//! document that declares them, so they are kept as symbolic handles and
//! written back exactly as they were read.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use libvartext::tokenizer::{Number, Token, TokenKind, Tokenizer};
use libvartext::writer;
use libvartext::{
    NotFound, ObjectEncoder, ObjectRef, ReferenceKind, ReferenceResolver, Resource,
    ResourceLoader, Result, Value,
};

/// A file found on disk by [`PathLoader`].
#[derive(Debug)]
pub struct FileResource {
    path: String,
}

impl Resource for FileResource {
    fn path(&self) -> Option<&str> {
        Some(&self.path)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Loads resources by checking that the file exists under a base directory.
/// A leading `res://` is relative to the base directory too.
pub struct PathLoader {
    base: PathBuf,
}

impl PathLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl ResourceLoader for PathLoader {
    fn load(&mut self, path: &str) -> std::result::Result<Arc<dyn Resource>, NotFound> {
        let relative = path.strip_prefix("res://").unwrap_or(path);
        let full = self.base.join(relative);
        log::debug!("looking for resource {:?} at {}", path, full.display());
        if full.is_file() {
            Ok(Arc::new(FileResource {
                path: path.to_string(),
            }))
        } else {
            Err(NotFound::new(path))
        }
    }
}

/// A document-local reference, kept by its id as written.
#[derive(Debug)]
pub struct SymbolicRef {
    kind: ReferenceKind,
    id: String,
}

impl fmt::Display for SymbolicRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}( {} )", self.kind, self.id)
    }
}

impl Resource for SymbolicRef {
    fn path(&self) -> Option<&str> {
        None
    }

    fn sort_key(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn read_symbolic(tokens: &mut Tokenizer<'_>, kind: ReferenceKind) -> Result<Value> {
    let id = match tokens.next_token()? {
        Token::Number(Number::Int(n)) => n.to_string(),
        Token::Str(s) => writer::quote(&s, false),
        other => return Err(tokens.unexpected("string or integer", &other)),
    };
    tokens.expect(TokenKind::ParenClose)?;
    Ok(Value::Object(ObjectRef::new(Arc::new(SymbolicRef { kind, id }))))
}

/// Resolves `ExtResource` and `SubResource` to [`SymbolicRef`] handles.
/// `Resource` is left to the loader.
pub struct SymbolicResolver;

impl ReferenceResolver for SymbolicResolver {
    fn ext_resource(&mut self, tokens: &mut Tokenizer<'_>) -> Option<Result<Value>> {
        Some(read_symbolic(tokens, ReferenceKind::ExtResource))
    }

    fn sub_resource(&mut self, tokens: &mut Tokenizer<'_>) -> Option<Result<Value>> {
        Some(read_symbolic(tokens, ReferenceKind::SubResource))
    }
}

/// Writes [`SymbolicRef`] handles back in their original form.
pub struct SymbolicEncoder;

impl ObjectEncoder for SymbolicEncoder {
    fn encode(&self, object: &Arc<dyn Resource>) -> Option<String> {
        let symbolic = object.as_any().downcast_ref::<SymbolicRef>()?;
        Some(symbolic.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libvartext::writer::{to_string, WriteOptions};
    use libvartext::{Hooks, ParseContext, Parser, StrStream};

    fn round_trip(source: &str) -> String {
        let mut resolver = SymbolicResolver;
        let mut stream = StrStream::new(source);
        let hooks = Hooks::new().with_resolver(&mut resolver);
        let mut parser = Parser::new(&mut stream, ParseContext::default(), hooks);
        let value = parser.parse().unwrap();
        to_string(&value, &WriteOptions::with_encoder(&SymbolicEncoder))
    }

    #[test]
    fn test_symbolic_references_round_trip() {
        assert_eq!(round_trip("ExtResource(3)"), "ExtResource( 3 )");
        assert_eq!(
            round_trip("[ SubResource( \"mesh_1\" ) ]"),
            "[ SubResource( \"mesh_1\" ) ]"
        );
    }

    #[test]
    fn test_symbolic_keys_write_in_stable_order() {
        assert_eq!(
            round_trip(
                "[ { ExtResource( 1 ): 1, ExtResource( 2 ): 2 }, \
                 { ExtResource( 2 ): 2, ExtResource( 1 ): 1 } ]"
            ),
            "[ {\nExtResource( 1 ): 1,\nExtResource( 2 ): 2\n}, \
             {\nExtResource( 1 ): 1,\nExtResource( 2 ): 2\n} ]"
        );
    }

    #[test]
    fn test_symbolic_reference_rejects_other_ids() {
        let mut resolver = SymbolicResolver;
        let mut stream = StrStream::new("ExtResource( 1.5 )");
        let hooks = Hooks::new().with_resolver(&mut resolver);
        let mut parser = Parser::new(&mut stream, ParseContext::default(), hooks);
        assert_eq!(
            parser.parse().unwrap_err().to_string(),
            "Expected string or integer, got number at line 1"
        );
    }

    #[test]
    fn test_path_loader() {
        let dir = std::env::temp_dir().join(format!("vartext-refs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("icon.png"), b"png").unwrap();

        let mut loader = PathLoader::new(&dir);
        let found = loader.load("res://icon.png").unwrap();
        assert_eq!(found.path(), Some("res://icon.png"));
        assert_eq!(loader.load("missing.png").unwrap_err().path, "missing.png");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
