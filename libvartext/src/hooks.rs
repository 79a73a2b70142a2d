//! Collaborator interfaces injected into parsing and writing.
//!
//! The engine never loads anything on its own. Reference constructs are
//! handed to a [`ReferenceResolver`], by-path loads go through a
//! [`ResourceLoader`], symbolic key names through a [`KeycodeLookup`], and the
//! writer asks an [`ObjectEncoder`] how to spell object handles.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::error::Result;
use crate::object::Resource;
use crate::tokenizer::Tokenizer;
use crate::value::Value;

/// The three reference constructs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Resource,
    ExtResource,
    SubResource,
}

impl ReferenceKind {
    pub fn name(self) -> &'static str {
        match self {
            ReferenceKind::Resource => "Resource",
            ReferenceKind::ExtResource => "ExtResource",
            ReferenceKind::SubResource => "SubResource",
        }
    }

    pub fn from_name(name: &str) -> Option<ReferenceKind> {
        match name {
            "Resource" => Some(ReferenceKind::Resource),
            "ExtResource" => Some(ReferenceKind::ExtResource),
            "SubResource" => Some(ReferenceKind::SubResource),
            _ => None,
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves reference constructs into values.
///
/// Each method is called with the cursor positioned just after the opening
/// `(` and must consume everything through the matching `)`. Returning
/// `None` means the resolver does not handle that kind.
pub trait ReferenceResolver {
    fn resource(&mut self, _tokens: &mut Tokenizer<'_>) -> Option<Result<Value>> {
        None
    }

    fn ext_resource(&mut self, _tokens: &mut Tokenizer<'_>) -> Option<Result<Value>> {
        None
    }

    fn sub_resource(&mut self, _tokens: &mut Tokenizer<'_>) -> Option<Result<Value>> {
        None
    }
}

/// A by-path load that found nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("resource not found: {path}")]
pub struct NotFound {
    pub path: String,
}

impl NotFound {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Loads a resource from a path, used for `Resource( "path" )` when no
/// resolver claims it.
pub trait ResourceLoader {
    fn load(&mut self, path: &str) -> std::result::Result<Arc<dyn Resource>, NotFound>;
}

/// Maps symbolic key names to scancodes.
pub trait KeycodeLookup {
    fn lookup(&self, name: &str) -> Option<i64>;
}

/// Spells an object handle for the writer. `None` or an empty string falls
/// back to `Resource( "path" )`.
pub trait ObjectEncoder {
    fn encode(&self, object: &Arc<dyn Resource>) -> Option<String>;
}

/// The collaborators available to one parse.
#[derive(Default)]
pub struct Hooks<'h> {
    pub resolver: Option<&'h mut dyn ReferenceResolver>,
    pub loader: Option<&'h mut dyn ResourceLoader>,
    pub keycodes: Option<&'h dyn KeycodeLookup>,
}

impl<'h> Hooks<'h> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(mut self, resolver: &'h mut dyn ReferenceResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_loader(mut self, loader: &'h mut dyn ResourceLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_keycodes(mut self, keycodes: &'h dyn KeycodeLookup) -> Self {
        self.keycodes = Some(keycodes);
        self
    }
}
