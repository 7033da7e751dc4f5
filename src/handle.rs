//! NativeHandle: the reference-counted wrapper around one foreign resource.
//!
//! A handle owns an opaque value created by a foreign library and decides
//! when the library's disposal routine runs. The protocol is a small state
//! machine: `Live(count > 0)` gains owners through `add_ref` and loses them
//! through `release`; when the count first reaches zero or below, the
//! resource kind's physical release runs exactly once and the handle
//! becomes `Disposed`. Disposed is terminal; further releases are no-ops.
//!
//! Explicit `release`/`dispose` is the primary contract. Dropping the last
//! clone of a handle is the safety net: it runs one `release()` with the
//! finalizing flag set, so abandoned handles still reach the foreign
//! disposal call, at whatever time the last clone goes away.

use crate::counter::ReferenceCounter;
use crate::latch::ReentryLatch;
use core::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Error constructing or re-targeting a handle.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum HandleError {
    /// The candidate value failed the resource kind's validity predicate.
    /// The constructor fails with no partial state retained.
    #[error("candidate value is not a valid handle for this resource kind")]
    InvalidHandle,
}

/// One concrete kind of foreign resource: how to recognize a valid
/// instance, and how to physically release one.
///
/// This trait is the single required extension point. Implementing it is
/// what the original design meant by "overriding" the validity and release
/// methods; here the compiler enforces that both exist, so there is no
/// runtime not-overridden failure mode.
///
/// `release_resource` reports whether physical release succeeded; the
/// handle clears its resource only on `true`. A composite kind that owns
/// child handles must route their teardown through `NativeHandle::release`,
/// never direct foreign calls, so the children's own counts stay honest.
pub trait ResourceKind<T> {
    /// Is `candidate` a valid instance of this foreign type?
    fn is_valid_handle(&self, candidate: &T) -> bool;

    /// Physically dispose of `resource`. Returns whether release succeeded.
    fn release_resource(&self, resource: &T) -> bool;
}

/// Shared state behind every clone of a `NativeHandle`.
struct Inner<T> {
    /// The foreign resource; `None` exactly when disposed.
    resource: RefCell<Option<T>>,
    counter: ReferenceCounter,
    /// Logical foreign type carried across the untyped pointer boundary.
    /// Immutable after construction.
    type_tag: Option<String>,
    /// True only while running drop-triggered teardown.
    finalizing: Cell<bool>,
    /// Makes the decrement→release→clear sequence non-reentrant.
    release_latch: ReentryLatch,
    kind: Box<dyn ResourceKind<T>>,
}

impl<T> Inner<T> {
    fn disposed(&self) -> bool {
        self.resource.borrow().is_none()
    }

    /// The whole release sequence, single entry at a time. A reentrant
    /// call from inside `release_resource` observes the held latch and
    /// returns; so does a release on an already-disposed handle.
    fn release_impl(&self) {
        let Some(_guard) = self.release_latch.try_enter() else {
            return;
        };
        if self.disposed() {
            return;
        }
        self.counter.decrement_ref();
        // `<= 0`, not `== 0`: over-release via decrement_ref is tolerated
        // and must still trigger exactly one physical release.
        if self.counter.reference_count() <= 0 {
            let released = {
                let res = self.resource.borrow();
                match res.as_ref() {
                    Some(r) => self.kind.release_resource(r),
                    None => return,
                }
            };
            if released {
                *self.resource.borrow_mut() = None;
            }
        }
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        if self.resource.borrow().is_some() {
            self.finalizing.set(true);
            self.release_impl();
        }
    }
}

/// Reference-counted wrapper around one foreign resource.
///
/// Cloning shares the same logical handle (same count, same resource);
/// it does not add a logical owner. Owners are tracked explicitly through
/// `add_ref`/`release`, mirroring how the foreign side counts them.
pub struct NativeHandle<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for NativeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> NativeHandle<T> {
    /// Wrap `resource`, validating it against `kind`.
    ///
    /// The count starts at `prior_ref_count + 1`: the constructing owner
    /// plus any owners the foreign side already holds.
    pub fn new(
        resource: T,
        kind: Box<dyn ResourceKind<T>>,
        type_tag: Option<&str>,
        prior_ref_count: i64,
    ) -> Result<Self, HandleError> {
        let handle = Self::deferred(kind, type_tag);
        handle.set_handle(resource, prior_ref_count)?;
        Ok(handle)
    }

    /// Create a handle whose resource arrives later via `set_handle`.
    ///
    /// Supports kinds whose foreign constructor needs the partially-built
    /// wrapper (composite owners). Until `set_handle` runs, the handle
    /// reports `disposed()`, and dropping it performs no foreign call.
    pub fn deferred(kind: Box<dyn ResourceKind<T>>, type_tag: Option<&str>) -> Self {
        Self {
            inner: Rc::new(Inner {
                resource: RefCell::new(None),
                counter: ReferenceCounter::new(0),
                type_tag: type_tag.map(str::to_owned),
                finalizing: Cell::new(false),
                release_latch: ReentryLatch::new(),
                kind,
            }),
        }
    }

    /// Construction bypassing validation, for kinds whose predicate
    /// accepts every candidate (owning and default callback variants).
    pub(crate) fn new_unchecked(
        resource: T,
        kind: Box<dyn ResourceKind<T>>,
        type_tag: Option<&str>,
        prior_ref_count: i64,
    ) -> Self {
        let handle = Self::deferred(kind, type_tag);
        *handle.inner.resource.borrow_mut() = Some(resource);
        handle.inner.counter.reset(prior_ref_count);
        handle
    }

    /// Assign the resource of a deferred handle, re-validating it and
    /// re-arming the count at `prior_ref_count + 1`.
    pub fn set_handle(&self, resource: T, prior_ref_count: i64) -> Result<(), HandleError> {
        if !self.inner.kind.is_valid_handle(&resource) {
            return Err(HandleError::InvalidHandle);
        }
        *self.inner.resource.borrow_mut() = Some(resource);
        self.inner.counter.reset(prior_ref_count);
        Ok(())
    }

    /// Current number of logical owners.
    pub fn reference_count(&self) -> i64 {
        self.inner.counter.reference_count()
    }

    /// Add one logical owner. Needed when handles depend on other handles.
    pub fn add_ref(&self) {
        self.inner.counter.add_ref();
    }

    /// Remove one logical owner without triggering release. Prefer
    /// `release`; this is the raw counter operation.
    pub fn decrement_ref(&self) {
        self.inner.counter.decrement_ref();
    }

    /// Has the foreign resource been disposed of?
    pub fn disposed(&self) -> bool {
        self.inner.disposed()
    }

    /// Synonym of `disposed`: is the underlying handle unusable?
    pub fn is_invalid(&self) -> bool {
        self.inner.disposed()
    }

    /// The optional type identifier of the underlying foreign type.
    pub fn type_tag(&self) -> Option<&str> {
        self.inner.type_tag.as_deref()
    }

    /// True only while drop-triggered teardown is running.
    pub fn is_finalizing(&self) -> bool {
        self.inner.finalizing.get()
    }

    /// Remove one logical owner; when the count reaches zero or below,
    /// run the kind's physical release and, on success, clear the
    /// resource. Idempotent once disposed.
    pub fn release(&self) {
        self.inner.release_impl();
    }

    /// Alias of `release` for explicit-disposal call sites.
    pub fn dispose(&self) {
        self.inner.release_impl();
    }
}

impl<T: Clone> NativeHandle<T> {
    /// The current resource, without side effects. `None` once disposed
    /// (or before a deferred handle receives its resource).
    pub fn get_handle(&self) -> Option<T> {
        self.inner.resource.borrow().clone()
    }
}

// Identity semantics: two NativeHandle values are equal when they share
// the same inner state, i.e. they are clones of one logical handle.
impl<T> PartialEq for NativeHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for NativeHandle<T> {}

impl<T> fmt::Display for NativeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_tag() {
            Some(tag) if !tag.is_empty() => {
                write!(f, "native resource handle of type id \"{tag}\"")
            }
            _ => write!(f, "native resource handle"),
        }
    }
}

impl<T> fmt::Debug for NativeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("type_tag", &self.inner.type_tag)
            .field("reference_count", &self.reference_count())
            .field("disposed", &self.disposed())
            .finish_non_exhaustive()
    }
}
