//! Helper functions over values crossing the foreign boundary.
//!
//! Call sites near a foreign API receive a mix of shapes: handles wrapped
//! earlier, raw foreign values fresh out of the library, and plain host
//! values passing through. `BoundaryValue` names that domain explicitly,
//! and the helpers here wrap, test, and unwrap uniformly over it, built
//! only on `NativeHandle`'s public contract.

use crate::handle::NativeHandle;
use crate::release::ReleaseFn;
use std::any::type_name;
use thiserror::Error;

/// Error from strict unwrapping.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum InteropError {
    /// Strict unwrap received a value that is neither a handle nor a raw
    /// foreign value.
    #[error("argument is neither a native resource handle nor a raw foreign value")]
    NotAHandle,
}

/// A value at the foreign boundary: an already-wrapped handle, a raw
/// foreign resource, or some other host value passed through unchanged.
#[derive(Clone, Debug)]
pub enum BoundaryValue<T, V> {
    Handle(NativeHandle<T>),
    Raw(T),
    Host(V),
}

/// Result of unwrapping: the raw foreign resource, or the untouched host
/// value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Unwrapped<T, V> {
    Raw(T),
    Host(V),
}

fn tag_opt(type_tag: &str) -> Option<&str> {
    if type_tag.is_empty() {
        None
    } else {
        Some(type_tag)
    }
}

/// Wrap a raw foreign value into a callback-variant handle; handles and
/// host values pass through unchanged. An empty `type_tag` produces a
/// tagless handle.
pub fn wrap<T: 'static, V>(
    value: BoundaryValue<T, V>,
    type_tag: &str,
    release: Option<ReleaseFn<T>>,
) -> BoundaryValue<T, V> {
    match value {
        BoundaryValue::Raw(resource) => BoundaryValue::Handle(NativeHandle::with_callback_opt(
            resource,
            release,
            tag_opt(type_tag),
        )),
        other => other,
    }
}

/// Is `value` a handle, optionally of the given tag?
///
/// `None` and non-handles are false. The empty tag matches any handle;
/// otherwise the handle's tag must match exactly, so a tagless handle
/// matches only the empty tag.
pub fn is_handle<T, V>(value: Option<&BoundaryValue<T, V>>, type_tag: &str) -> bool {
    match value {
        Some(BoundaryValue::Handle(h)) => {
            type_tag.is_empty() || h.type_tag() == Some(type_tag)
        }
        _ => false,
    }
}

/// Unwrap a boundary value down to the raw foreign resource.
///
/// `None` stays `None`; a handle yields its resource (`None` once
/// disposed); a raw value yields itself. A host value passes through
/// unchanged when lenient and fails with `NotAHandle` when strict.
pub fn unwrap<T: Clone, V>(
    value: Option<BoundaryValue<T, V>>,
    strict: bool,
) -> Result<Option<Unwrapped<T, V>>, InteropError> {
    match value {
        None => Ok(None),
        Some(BoundaryValue::Handle(h)) => Ok(h.get_handle().map(Unwrapped::Raw)),
        Some(BoundaryValue::Raw(resource)) => Ok(Some(Unwrapped::Raw(resource))),
        Some(BoundaryValue::Host(host)) => {
            if strict {
                Err(InteropError::NotAHandle)
            } else {
                Ok(Some(Unwrapped::Host(host)))
            }
        }
    }
}

/// Build a diagnostic message for an argument that should have been a
/// handle of `expected_tag`, distinguishing "not a handle at all" from
/// "handle of the wrong tag". For use by calling code building its own
/// error messages.
pub fn describe_type_mismatch<T, V>(
    value: Option<&BoundaryValue<T, V>>,
    expected_tag: &str,
) -> String {
    match value {
        None => "Expected a 'NativeHandle' but instead got 'None'".to_owned(),
        Some(BoundaryValue::Handle(h)) => format!(
            "Expected a 'NativeHandle' with underlying type id '{}' but instead got one with type id '{}'",
            expected_tag,
            h.type_tag().unwrap_or(""),
        ),
        Some(BoundaryValue::Raw(_)) => format!(
            "Expected a 'NativeHandle' but instead got object of type '{}'",
            type_name::<T>(),
        ),
        Some(BoundaryValue::Host(_)) => format!(
            "Expected a 'NativeHandle' but instead got object of type '{}'",
            type_name::<V>(),
        ),
    }
}
