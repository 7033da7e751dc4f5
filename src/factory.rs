//! WrapperFactory: restore typed wrappers from tag-annotated pointers.
//!
//! A foreign API frequently returns untyped pointers annotated only by a
//! type-tag string. The factory maps each tag to a registered constructor
//! so call sites get back the concrete wrapper for that foreign type. All
//! constructors conform to one canonical shape, checked at registration;
//! there is no signature inspection at wrap time.

use crate::handle::{HandleError, NativeHandle};
use crate::release::ReleaseFn;
use hashbrown::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// Result from the factory.
pub type Result<T> = std::result::Result<T, FactoryError>;

/// Factory-time configuration errors. Surfaced synchronously to the
/// caller; never retried.
#[derive(Clone, Debug, Error)]
pub enum FactoryError {
    /// A wrapper was requested for a resource with no type tag.
    #[error("cannot create a wrapper without a type tag")]
    MissingTypeTag,

    /// Strict mode refuses tags absent from the registry.
    #[error("no wrapper registered for type tag {0:?}")]
    UnknownType(String),

    /// Strict mode refuses tags explicitly marked not-implemented.
    #[error("wrapper for type tag {0:?} is registered as not implemented")]
    NotImplementedType(String),

    /// The requested wrapper needs a release function and none was given.
    #[error("wrapper for type tag {0:?} requires a release function")]
    MissingReleaseFunction(String),

    #[error(transparent)]
    Handle(#[from] HandleError),
}

/// Canonical constructor shape: resource, optional release function, and
/// the tag the factory resolved. Registered closures decide what to do
/// with each; a closure needing a release function fails with
/// `MissingReleaseFunction` when handed `None`.
pub type WrapperCtor<T> =
    Rc<dyn Fn(T, Option<ReleaseFn<T>>, &str) -> Result<NativeHandle<T>>>;

/// What a type tag maps to.
pub enum WrapperEntry<T> {
    /// Known tag, no wrapper yet. Strict mode fails with
    /// `NotImplementedType`; lenient mode falls back to a generic handle.
    NotImplemented,
    Ctor(WrapperCtor<T>),
}

impl<T> Clone for WrapperEntry<T> {
    fn clone(&self) -> Self {
        match self {
            Self::NotImplemented => Self::NotImplemented,
            Self::Ctor(c) => Self::Ctor(c.clone()),
        }
    }
}

/// Registry from type-tag string to wrapper constructor, with a
/// strict/lenient policy for unknown or unimplemented tags.
pub struct WrapperFactory<T> {
    registry: HashMap<String, WrapperEntry<T>>,
    strict: bool,
}

impl<T: 'static> WrapperFactory<T> {
    pub fn new(strict: bool) -> Self {
        Self {
            registry: HashMap::new(),
            strict,
        }
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn is_registered(&self, type_tag: &str) -> bool {
        self.registry.contains_key(type_tag)
    }

    /// Register a constructor for `type_tag`, replacing any prior entry.
    pub fn register(&mut self, type_tag: &str, ctor: WrapperCtor<T>) -> &mut Self {
        self.registry
            .insert(type_tag.to_owned(), WrapperEntry::Ctor(ctor));
        self
    }

    /// Mark `type_tag` as known but not implemented yet.
    pub fn register_not_implemented(&mut self, type_tag: &str) -> &mut Self {
        self.registry
            .insert(type_tag.to_owned(), WrapperEntry::NotImplemented);
        self
    }

    /// Wrap `resource` according to its tag.
    ///
    /// Tag resolution: absent tag fails; an unknown or not-implemented tag
    /// fails in strict mode and falls back to a generic callback-variant
    /// handle (carrying the requested tag) in lenient mode; a registered
    /// constructor is invoked with `(resource, release, tag)`.
    pub fn create_wrapper(
        &self,
        resource: T,
        type_tag: Option<&str>,
        release: Option<ReleaseFn<T>>,
    ) -> Result<NativeHandle<T>> {
        let tag = type_tag.ok_or(FactoryError::MissingTypeTag)?;
        match self.registry.get(tag) {
            Some(WrapperEntry::Ctor(ctor)) => ctor(resource, release, tag),
            Some(WrapperEntry::NotImplemented) if self.strict => {
                Err(FactoryError::NotImplementedType(tag.to_owned()))
            }
            None if self.strict => Err(FactoryError::UnknownType(tag.to_owned())),
            // Lenient fallback: a generic callback-variant wrapper still
            // needs to know how to dispose of the resource.
            _ => match release {
                Some(release) => Ok(NativeHandle::with_callback(resource, release, Some(tag))),
                None => Err(FactoryError::MissingReleaseFunction(tag.to_owned())),
            },
        }
    }
}
