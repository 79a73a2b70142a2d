//! Handles to externally owned objects.

use std::any::Any;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// An object produced by a resolver or loader.
///
/// The engine only ever asks for its path and its sort key.
pub trait Resource: fmt::Debug + Send + Sync {
    /// The path this object was loaded from, if it has one.
    fn path(&self) -> Option<&str>;

    /// The key dictionary keys holding this object are ordered by.
    /// Objects without a path should return something stable here, or
    /// their order falls back to allocation identity.
    fn sort_key(&self) -> Option<Cow<'_, str>> {
        self.path().map(Cow::Borrowed)
    }

    fn as_any(&self) -> &dyn Any;
}

/// A possibly-null reference to a [`Resource`].
#[derive(Clone, Debug, Default)]
pub enum ObjectRef {
    #[default]
    Null,
    Handle(Arc<dyn Resource>),
}

impl ObjectRef {
    pub fn new(resource: Arc<dyn Resource>) -> Self {
        ObjectRef::Handle(resource)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ObjectRef::Null)
    }

    pub fn resource(&self) -> Option<&Arc<dyn Resource>> {
        match self {
            ObjectRef::Null => None,
            ObjectRef::Handle(r) => Some(r),
        }
    }

    /// The referenced object's path, if any.
    pub fn path(&self) -> Option<&str> {
        self.resource().and_then(|r| r.path())
    }

    fn sort_key(&self) -> Option<Cow<'_, str>> {
        self.resource().and_then(|r| r.sort_key())
    }

    /// Downcast the referenced object.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.resource().and_then(|r| r.as_any().downcast_ref::<T>())
    }

    fn identity(&self) -> usize {
        match self {
            ObjectRef::Null => 0,
            ObjectRef::Handle(r) => Arc::as_ptr(r) as *const () as usize,
        }
    }
}

/// Null sorts first; handles sort by sort key and then by identity.
impl Ord for ObjectRef {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ObjectRef::Null, ObjectRef::Null) => Ordering::Equal,
            (ObjectRef::Null, _) => Ordering::Less,
            (_, ObjectRef::Null) => Ordering::Greater,
            _ => self
                .sort_key()
                .cmp(&other.sort_key())
                .then_with(|| self.identity().cmp(&other.identity())),
        }
    }
}

impl PartialOrd for ObjectRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ObjectRef {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::ObjectEncoder;
    use crate::value::Value;
    use crate::writer::{to_string, WriteOptions};
    use std::collections::BTreeMap;

    #[derive(Debug)]
    struct Named(&'static str);

    impl Resource for Named {
        fn path(&self) -> Option<&str> {
            Some(self.0)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_identity_equality() {
        let a: Arc<dyn Resource> = Arc::new(Named("res://a"));
        let same = ObjectRef::new(a.clone());
        let other = ObjectRef::new(Arc::new(Named("res://a")));
        assert_eq!(ObjectRef::new(a), same);
        assert_ne!(same, other);
        assert_eq!(same.path(), Some("res://a"));
        assert!(same.downcast_ref::<Named>().is_some());
    }

    #[derive(Debug)]
    struct Slot(u32);

    impl Resource for Slot {
        fn path(&self) -> Option<&str> {
            None
        }

        fn sort_key(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Owned(format!("slot {:04}", self.0)))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct SlotEncoder;

    impl ObjectEncoder for SlotEncoder {
        fn encode(&self, object: &Arc<dyn Resource>) -> Option<String> {
            let slot = object.as_any().downcast_ref::<Slot>()?;
            Some(format!("Slot( {} )", slot.0))
        }
    }

    #[test]
    fn test_pathless_keys_order_by_sort_key() {
        let slot = |n| Value::Object(ObjectRef::new(Arc::new(Slot(n))));
        let build = |order: &[u32]| {
            order
                .iter()
                .map(|&n| (slot(n), Value::Int(n as i64)))
                .collect::<BTreeMap<_, _>>()
        };
        // Allocation order is the reverse of key order in `backward`.
        let forward = Value::Dictionary(build(&[1, 2, 3]));
        let backward = Value::Dictionary(build(&[3, 2, 1]));

        let options = WriteOptions::with_encoder(&SlotEncoder);
        let expected = "{\nSlot( 1 ): 1,\nSlot( 2 ): 2,\nSlot( 3 ): 3\n}";
        assert_eq!(to_string(&forward, &options), expected);
        assert_eq!(to_string(&backward, &options), expected);
    }

    #[test]
    fn test_null_sorts_first() {
        let handle = ObjectRef::new(Arc::new(Named("res://b")));
        assert!(ObjectRef::Null < handle);
        assert!(ObjectRef::default().is_null());
    }
}
