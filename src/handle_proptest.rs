#![cfg(test)]

// Property tests for the handle lifecycle kept inside the crate so they
// can instrument release strategies without public test hooks.

use crate::handle::{NativeHandle, ResourceKind};
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

/// Accept-all kind that counts physical releases.
struct CountingKind {
    releases: Rc<Cell<u32>>,
}

impl ResourceKind<u32> for CountingKind {
    fn is_valid_handle(&self, _: &u32) -> bool {
        true
    }
    fn release_resource(&self, _: &u32) -> bool {
        self.releases.set(self.releases.get() + 1);
        true
    }
}

fn counting_handle(prior: i64) -> (NativeHandle<u32>, Rc<Cell<u32>>) {
    let releases = Rc::new(Cell::new(0));
    let kind = Box::new(CountingKind {
        releases: releases.clone(),
    });
    let handle = NativeHandle::new(0, kind, None, prior).expect("accept-all kind");
    (handle, releases)
}

#[derive(Clone, Debug)]
enum Op {
    AddRef,
    DecrementRef,
    Release,
    Dispose,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::AddRef),
        Just(Op::DecrementRef),
        Just(Op::Release),
        Just(Op::Dispose),
    ]
}

proptest! {
    // Counter algebra: the observed count equals
    // prior + 1 + #add_ref - #decrement_ref for any raw sequence.
    #[test]
    fn prop_count_algebra(prior in -4i64..16, adds in 0usize..32, decs in 0usize..32) {
        let (h, releases) = counting_handle(prior);
        prop_assert_eq!(h.reference_count(), prior + 1);
        for _ in 0..adds {
            h.add_ref();
        }
        for _ in 0..decs {
            h.decrement_ref();
        }
        prop_assert_eq!(
            h.reference_count(),
            prior + 1 + adds as i64 - decs as i64
        );
        // Raw decrements never release by themselves.
        prop_assert_eq!(releases.get(), 0);
        prop_assert!(!h.disposed());
    }

    // At-most-once release and monotonic disposal across arbitrary
    // interleavings of counter and release operations, ending with the
    // drop-based finalizer.
    #[test]
    fn prop_release_fires_at_most_once(ops in proptest::collection::vec(op_strategy(), 0..64)) {
        let (h, releases) = counting_handle(0);
        let mut seen_disposed = false;
        for op in ops {
            match op {
                Op::AddRef => h.add_ref(),
                Op::DecrementRef => h.decrement_ref(),
                Op::Release => h.release(),
                Op::Dispose => h.dispose(),
            }
            // Disposal is monotonic.
            if seen_disposed {
                prop_assert!(h.disposed());
            }
            seen_disposed = h.disposed();
            // Disposed implies the resource is gone and exactly one
            // physical release happened.
            if h.disposed() {
                prop_assert_eq!(h.get_handle(), None);
                prop_assert_eq!(releases.get(), 1);
            } else {
                prop_assert_eq!(releases.get(), 0);
            }
        }
        // Abandoning the handle runs one final release. That disposes
        // exactly when the remaining count allows it; owners that never
        // released keep the resource alive, and in no case does the
        // strategy fire twice.
        let already_disposed = h.disposed();
        let count_before_drop = h.reference_count();
        drop(h);
        if already_disposed || count_before_drop - 1 <= 0 {
            prop_assert_eq!(releases.get(), 1);
        } else {
            prop_assert_eq!(releases.get(), 0);
        }
    }

    // Idempotence: once disposed, any number of further releases and
    // disposes never invoke the strategy again.
    #[test]
    fn prop_disposed_is_terminal(extra in 1usize..16) {
        let (h, releases) = counting_handle(0);
        h.release();
        prop_assert!(h.disposed());
        for _ in 0..extra {
            h.release();
            h.dispose();
        }
        prop_assert_eq!(releases.get(), 1);
    }
}
