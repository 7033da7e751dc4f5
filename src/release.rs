//! Stock release strategies: owning and callback-based variants.
//!
//! These cover the two common resource categories: resources the foreign
//! side manages completely (the wrapper exists for uniform typing only),
//! and resources disposed through an exported release function bound at
//! construction. Anything richer, e.g. an owner resource that also owns a
//! member resource, implements `ResourceKind` directly.

use crate::handle::{HandleError, NativeHandle, ResourceKind};
use std::rc::Rc;

/// Disposal callback bound to a callback-variant handle.
///
/// The callback is assumed to succeed; it returns nothing and its result
/// is not observable by the handle. A panic inside the callback propagates
/// to the `release()` caller, and the resource is NOT cleared, so the
/// handle stays un-disposed and a later release may retry.
pub type ReleaseFn<T> = Rc<dyn Fn(&T)>;

/// Validity predicate for handles configured per instance rather than per
/// kind. The default accepts every candidate: having produced a `T` at
/// all, the caller vouched for it at the type level.
pub type ValidityFn<T> = Rc<dyn Fn(&T) -> bool>;

/// Strategy for resources the foreign side already manages completely.
/// Physical release is a successful no-op.
pub struct OwningRelease<T> {
    validator: Option<ValidityFn<T>>,
}

impl<T> OwningRelease<T> {
    pub fn new() -> Self {
        Self { validator: None }
    }

    pub fn with_validator(validator: ValidityFn<T>) -> Self {
        Self {
            validator: Some(validator),
        }
    }
}

impl<T> Default for OwningRelease<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResourceKind<T> for OwningRelease<T> {
    fn is_valid_handle(&self, candidate: &T) -> bool {
        match &self.validator {
            Some(v) => v(candidate),
            None => true,
        }
    }

    fn release_resource(&self, _resource: &T) -> bool {
        true
    }
}

/// Strategy holding a release function bound at construction.
///
/// Release fails (returns `false`) when no callback is present; the handle
/// then keeps its resource, matching the contract that the resource is
/// cleared only on successful physical release.
pub struct CallbackRelease<T> {
    release: Option<ReleaseFn<T>>,
    validator: Option<ValidityFn<T>>,
}

impl<T> CallbackRelease<T> {
    pub fn new(release: ReleaseFn<T>) -> Self {
        Self {
            release: Some(release),
            validator: None,
        }
    }

    /// A callback variant with no callback. Releasing such a handle never
    /// succeeds; useful as a placeholder in lenient wrapping paths.
    pub fn without_callback() -> Self {
        Self {
            release: None,
            validator: None,
        }
    }

    pub fn with_validator(release: ReleaseFn<T>, validator: ValidityFn<T>) -> Self {
        Self {
            release: Some(release),
            validator: Some(validator),
        }
    }

    pub(crate) fn from_parts(
        release: Option<ReleaseFn<T>>,
        validator: Option<ValidityFn<T>>,
    ) -> Self {
        Self { release, validator }
    }
}

impl<T> ResourceKind<T> for CallbackRelease<T> {
    fn is_valid_handle(&self, candidate: &T) -> bool {
        match &self.validator {
            Some(v) => v(candidate),
            None => true,
        }
    }

    fn release_resource(&self, resource: &T) -> bool {
        match &self.release {
            Some(release) => {
                release(resource);
                true
            }
            None => false,
        }
    }
}

impl<T: 'static> NativeHandle<T> {
    /// Wrap a resource the foreign side self-manages; release is a no-op.
    pub fn owning(resource: T, type_tag: Option<&str>) -> Self {
        Self::new_unchecked(resource, Box::new(OwningRelease::new()), type_tag, 0)
    }

    /// Wrap a resource disposed through `release` when the count reaches
    /// zero.
    pub fn with_callback(resource: T, release: ReleaseFn<T>, type_tag: Option<&str>) -> Self {
        Self::new_unchecked(resource, Box::new(CallbackRelease::new(release)), type_tag, 0)
    }

    /// Like `with_callback`, tolerating an absent callback (the handle
    /// then never clears its resource on release).
    pub fn with_callback_opt(
        resource: T,
        release: Option<ReleaseFn<T>>,
        type_tag: Option<&str>,
    ) -> Self {
        Self::new_unchecked(
            resource,
            Box::new(CallbackRelease::from_parts(release, None)),
            type_tag,
            0,
        )
    }

    /// A callback-variant handle with a per-instance validity predicate.
    pub fn with_validated_callback(
        resource: T,
        release: ReleaseFn<T>,
        validator: ValidityFn<T>,
        type_tag: Option<&str>,
    ) -> Result<Self, HandleError> {
        Self::new(
            resource,
            Box::new(CallbackRelease::with_validator(release, validator)),
            type_tag,
            0,
        )
    }
}
