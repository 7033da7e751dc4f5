//! rc-handle: single-threaded, reference-counted wrappers managing the
//! lifetime of opaque resources owned by a native library.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: guarantee the foreign release routine for a resource runs
//!   exactly once, when the last logical owner lets go, and that the
//!   resource is never used after release; built in safe, verifiable
//!   layers so each piece can be reasoned about independently.
//! - Layers:
//!   - ReferenceCounter: bare count of logical owners; no foreign
//!     awareness, no release decisions.
//!   - NativeHandle<T>: adds the nullable resource, the immutable type
//!     tag, and the decrement→conditionally-release→conditionally-clear
//!     protocol; ResourceKind<T> is the one extension point ("is this a
//!     valid instance of my foreign type" / "how do I release one").
//!   - release: stock ResourceKind implementations: owning (no-op
//!     release, wrapper exists for uniform typing) and callback-based
//!     (release function bound at construction).
//!   - WrapperFactory<T>: registry mapping the type-tag strings a foreign
//!     API annotates its untyped pointers with to concrete constructors,
//!     with strict/lenient policies.
//!   - interop: wrap/is_handle/unwrap/diagnostic helpers over values
//!     crossing the boundary, built purely on NativeHandle's contract.
//!   - libpath: ancillary startup helpers for locating the shared
//!     library; no lifecycle invariants live here.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by design (Cell/RefCell/Rc, no
//!   atomics). Concurrent use would need external locking around the
//!   whole release sequence; a race there means a double physical
//!   release or a leak.
//! - No operation blocks, suspends, or performs I/O; every call is a
//!   synchronous in-memory state transition. (libpath touches the
//!   filesystem, which is why it sits outside the core.)
//! - Disposed is terminal and monotonic: `disposed()` flips to true at
//!   most once and never back.
//! - Over-release is tolerated, not an error: counts may go negative and
//!   the release test is `<= 0`, so surplus decrements cannot trigger a
//!   second physical release.
//!
//! Why this split?
//! - Localize invariants: the counter has arithmetic only; the handle
//!   has the whole lifecycle; strategies have exactly one decision each.
//! - Clear failure boundaries: the handle calls into user code only
//!   through ResourceKind, under a reentry latch, so a strategy calling
//!   back into `release()` is a designed no-op rather than a recursion.
//!
//! Ownership model
//! - Cloning a `NativeHandle` shares the same logical handle; logical
//!   owners are tracked explicitly via `add_ref`/`release`, mirroring
//!   how the foreign side counts them. Explicit `release`/`dispose` is
//!   the primary contract; dropping the last clone is a safety net that
//!   runs one final `release()` with the finalizing flag set, so
//!   abandoned handles still reach the foreign disposal call.
//! - Composite ownership (an owner resource that also owns a member
//!   resource) is composition: the owner's kind holds a clone of the
//!   member handle, `add_ref`s it at construction and `release`s it
//!   during its own teardown, never through a direct foreign call that
//!   would bypass the member's count.
//!
//! Notes and non-goals
//! - Allocation strategy inside the foreign library, thread-safety of
//!   the foreign API, and loading (vs locating) the shared library are
//!   all out of scope.
//! - Release callbacks are assumed to succeed; a panic inside one
//!   propagates to the `release()` caller and the resource is not
//!   cleared.
//! - Public API surface is `NativeHandle` and the modules re-exported
//!   below; `ReferenceCounter` is exposed as a building block.

mod counter;
mod factory;
mod handle;
mod handle_proptest;
pub mod interop;
mod latch;
pub mod libpath;
mod release;

// Public surface
pub use counter::ReferenceCounter;
pub use factory::{FactoryError, WrapperCtor, WrapperEntry, WrapperFactory};
pub use handle::{HandleError, NativeHandle, ResourceKind};
pub use interop::{BoundaryValue, InteropError, Unwrapped};
pub use release::{CallbackRelease, OwningRelease, ReleaseFn, ValidityFn};
