// SPDX-License-Identifier: Apache-2.0

//! Property tests for ownership under arbitrary move and reset sequences,
//! version packing and flag algebra.

#![cfg(feature = "sim")]

use ownhandle::sim::{self, Child, Event, RootHandle, SimHandle};
use ownhandle::{DerivedHandle, Flags, Slots, Version};
use proptest::prelude::*;

const SLOTS: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Create(usize, usize),
    FailNext,
    Reset(usize),
    Take(usize, usize),
    ResetFrom(usize, usize),
    Swap(usize, usize),
    Clear(usize),
}

fn op() -> impl Strategy<Value = Op> {
    let slot = || 0..SLOTS;
    prop_oneof![
        3 => (slot(), 2usize..5).prop_map(|(i, size)| Op::Create(i, size)),
        1 => Just(Op::FailNext),
        1 => slot().prop_map(Op::Reset),
        2 => (slot(), slot()).prop_map(|(from, to)| Op::Take(from, to)),
        2 => (slot(), slot()).prop_map(|(from, to)| Op::ResetFrom(from, to)),
        1 => (slot(), slot()).prop_map(|(a, b)| Op::Swap(a, b)),
        1 => slot().prop_map(Op::Clear),
    ]
}

fn apply<S: Slots<SimHandle>>(
    root: &RootHandle,
    handles: &mut [DerivedHandle<Child, S>],
    op: &Op,
    unique: bool,
) {
    match *op {
        Op::Create(i, size) => {
            let size = if unique { 1 } else { size };
            if let Ok(handle) = DerivedHandle::create(root, size, "prop", sim::create_child) {
                handles[i] = handle;
            }
        }
        Op::FailNext => sim::fail_after(0),
        Op::Reset(i) => handles[i].reset(),
        Op::Take(from, to) => {
            let taken = handles[from].take();
            handles[to] = taken;
        }
        Op::ResetFrom(from, to) => {
            let other = handles[from].take();
            handles[to].reset_from(other);
        }
        Op::Swap(a, b) => handles.swap(a, b),
        Op::Clear(i) => handles[i] = DerivedHandle::empty(),
    }
}

fn created() -> usize {
    sim::events()
        .iter()
        .filter(|e| matches!(e, Event::Created { .. }))
        .count()
}

proptest! {
    #[test]
    fn version_round_trips(major in 0u16..=1023, minor in 0u16..=1023, patch in 0u16..=4095) {
        let version = Version::new(major, minor, patch);
        prop_assert_eq!((version.major(), version.minor(), version.patch()), (major, minor, patch));
        prop_assert_eq!(Version::from_packed(version.packed()), version);
        prop_assert_eq!(version.to_string(), format!("{}.{}.{}", major, minor, patch));
    }

    #[test]
    fn versions_out_of_range_are_rejected(major in 1024u16.., minor in 0u16..=1023) {
        prop_assert!(Version::try_new(major, minor, 0).is_err());
    }

    #[test]
    fn flag_algebra(a in any::<u8>(), b in any::<u8>()) {
        let (x, y) = (Flags::<Bit>::from_bits(a), Flags::<Bit>::from_bits(b));
        prop_assert_eq!((x | y).bits(), a | b);
        prop_assert_eq!((x & y).bits(), a & b);
        prop_assert_eq!((!x).bits(), !a);
        prop_assert_eq!(!!x, x);
        prop_assert!((x | y).contains(x));
        prop_assert!(x.contains(x & y));
        prop_assert_eq!(x.intersects(y), a & b != 0);
    }

    #[test]
    fn random_ownership_ops_never_double_free(
        ops in prop::collection::vec((op(), any::<bool>()), 0..40)
    ) {
        sim::reset();
        let root = sim::root("prop").unwrap();
        {
            let mut units: [sim::ChildHandle; SLOTS] = Default::default();
            let mut batches: [sim::ChildBatch; SLOTS] = Default::default();
            for (op, unique) in &ops {
                if *unique {
                    apply(&root, &mut units, op, true);
                } else {
                    apply(&root, &mut batches, op, false);
                }
                prop_assert!(sim::faults().is_empty());
            }
        }

        // everything but the root is gone, each native exactly once
        prop_assert_eq!(sim::live(), 1);
        prop_assert_eq!(sim::deleter_calls(), created() - 1);
        drop(root);
        prop_assert!(sim::faults().is_empty());
        prop_assert_eq!(sim::live(), 0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum Bit {
    Low = 0x01,
    High = 0x80,
}
ownhandle::flag_enum!(Bit: u8);

#[test]
fn enumerators_combine_into_sets() {
    let both = Bit::Low | Bit::High;
    assert_eq!(both.bits(), 0x81);
    assert!(both.contains(Bit::High));
    assert_eq!((both & Bit::Low).bits(), 0x01);
}
