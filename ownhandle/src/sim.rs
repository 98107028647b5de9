// SPDX-License-Identifier: Apache-2.0

//! An in-process stand-in for a C create/destroy API.
//!
//! The simulated API keeps its state per thread and records every creation
//! and destruction, together with misuse it can detect: destroying a handle
//! twice, destroying a handle it never issued, destroying a child against
//! the wrong or an already destroyed parent, and destroying a parent that
//! still has children.

use crate::{
    define_native_handle, DerivedDeleter, Result, SourceDeleter, SourceHandle, Status,
    UniqueHandle, VectorHandle,
};
use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
};

define_native_handle! {
    /// Handle issued by the simulated API.
    pub struct SimHandle(u64) = 0;
}

pub const OUT_OF_MEMORY: Status = Status(-1);
pub const INVALID_PARENT: Status = Status(-2);

// written to the output slot by failing calls
const GARBAGE: SimHandle = SimHandle(0xdead_beef_dead_beef);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Created {
        handle: SimHandle,
        parent: Option<SimHandle>,
    },
    Destroyed {
        handle: SimHandle,
        parent: Option<SimHandle>,
    },
    DoubleFree(SimHandle),
    UnknownHandle(SimHandle),
    StaleParent {
        handle: SimHandle,
        parent: SimHandle,
    },
    OrphanedChildren {
        handle: SimHandle,
        children: usize,
    },
}

impl Event {
    /// Returns `true` for events that indicate misuse of the API.
    pub fn is_fault(&self) -> bool {
        !matches!(self, Event::Created { .. } | Event::Destroyed { .. })
    }
}

#[derive(Default)]
struct State {
    next: u64,
    // live handle -> parent
    live: BTreeMap<SimHandle, Option<SimHandle>>,
    destroyed: BTreeSet<SimHandle>,
    fail_after: Option<usize>,
    events: Vec<Event>,
}

impl State {
    fn should_fail(&mut self) -> bool {
        match self.fail_after {
            Some(0) => {
                self.fail_after = None;
                true
            }
            Some(ref mut remaining) => {
                *remaining -= 1;
                false
            }
            None => false,
        }
    }

    fn issue(&mut self, parent: Option<SimHandle>) -> SimHandle {
        self.next += 1;
        let handle = SimHandle(self.next);
        self.live.insert(handle, parent);
        self.events.push(Event::Created { handle, parent });
        handle
    }

    fn retire(&mut self, handle: SimHandle, parent: Option<SimHandle>) {
        let Some(recorded) = self.live.get(&handle).copied() else {
            if self.destroyed.contains(&handle) {
                self.events.push(Event::DoubleFree(handle));
            } else {
                self.events.push(Event::UnknownHandle(handle));
            }
            return;
        };

        if let Some(parent) = parent {
            if recorded != Some(parent) || !self.live.contains_key(&parent) {
                self.events.push(Event::StaleParent { handle, parent });
            }
        }

        let children = self
            .live
            .values()
            .filter(|p| **p == Some(handle))
            .count();
        if children > 0 {
            self.events
                .push(Event::OrphanedChildren { handle, children });
        }

        self.live.remove(&handle);
        self.destroyed.insert(handle);
        self.events.push(Event::Destroyed { handle, parent });
    }
}

thread_local! {
    static STATE: RefCell<State> = RefCell::new(State::default());
}

fn with_state<R>(f: impl FnOnce(&mut State) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

/// Creates a handle with no parent and writes it to `out`.
pub fn create_root(out: &mut SimHandle) -> Status {
    with_state(|state| {
        if state.should_fail() {
            *out = GARBAGE;
            return OUT_OF_MEMORY;
        }

        *out = state.issue(None);
        Status::SUCCESS
    })
}

/// Creates a handle owned by `parent` and writes it to `out`.
pub fn create_child(parent: SimHandle, out: &mut SimHandle) -> Status {
    with_state(|state| {
        if !state.live.contains_key(&parent) {
            return INVALID_PARENT;
        }

        if state.should_fail() {
            *out = GARBAGE;
            return OUT_OF_MEMORY;
        }

        *out = state.issue(Some(parent));
        Status::SUCCESS
    })
}

pub fn destroy_root(handle: SimHandle) {
    with_state(|state| state.retire(handle, None))
}

pub fn destroy_child(parent: SimHandle, handle: SimHandle) {
    with_state(|state| state.retire(handle, Some(parent)))
}

/// Makes the creation call after the next `n` successful ones fail.
pub fn fail_after(n: usize) {
    with_state(|state| state.fail_after = Some(n))
}

/// Clears all state of the current thread.
pub fn reset() {
    with_state(|state| *state = State::default())
}

pub fn events() -> Vec<Event> {
    with_state(|state| state.events.clone())
}

pub fn faults() -> Vec<Event> {
    with_state(|state| {
        state
            .events
            .iter()
            .filter(|e| e.is_fault())
            .copied()
            .collect()
    })
}

/// Number of handles currently alive.
pub fn live() -> usize {
    with_state(|state| state.live.len())
}

/// Number of successful destroy calls.
pub fn deleter_calls() -> usize {
    with_state(|state| {
        state
            .events
            .iter()
            .filter(|e| matches!(e, Event::Destroyed { .. }))
            .count()
    })
}

/// Deleter binding for handles without a parent.
pub enum Root {}

impl SourceDeleter for Root {
    type Native = SimHandle;
    const OBJECT: &'static str = "sim root";

    fn destroy(native: SimHandle) {
        destroy_root(native)
    }
}

/// Deleter binding for handles created from another handle.
pub enum Child {}

impl DerivedDeleter for Child {
    type Source = SimHandle;
    type Native = SimHandle;
    const OBJECT: &'static str = "sim child";

    fn destroy(source: SimHandle, native: SimHandle) {
        destroy_child(source, native)
    }
}

pub type RootHandle = SourceHandle<Root>;
pub type ChildHandle = UniqueHandle<Child>;
pub type ChildBatch = VectorHandle<Child>;

/// Creates a [`RootHandle`] through the simulated API.
pub fn root(context: &str) -> Result<RootHandle> {
    RootHandle::create(context, create_root)
}
