// SPDX-License-Identifier: Apache-2.0

//! Root, unique child and child batch created through the simulated API,
//! then dropped children first.

use crate::{Error, Result};
use log::{debug, info};
use ownhandle::sim::{self, ChildBatch, ChildHandle, Event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioConfig {
    /// Size of the vector handle.
    pub batch: usize,
    /// Fail the creation call after this many successful ones.
    pub fail_after: Option<usize>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            batch: 3,
            fail_after: None,
        }
    }
}

/// What the simulated API saw during one run.
#[derive(Debug)]
pub struct Report {
    pub events: Vec<Event>,
    pub deleter_calls: usize,
    /// Natives still alive after every handle was dropped.
    pub leaked: usize,
    /// Set if a creation call failed.
    pub failure: Option<ownhandle::Error>,
}

impl Report {
    fn collect(failure: Option<ownhandle::Error>) -> Self {
        Report {
            events: sim::events(),
            deleter_calls: sim::deleter_calls(),
            leaked: sim::live(),
            failure,
        }
    }

    pub fn faults(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.is_fault())
    }

    /// Turns a failed creation or a misbehaving handle into an error.
    pub fn check(&self) -> Result<()> {
        if let Some(err) = &self.failure {
            return Err(Error::HandleError(err.clone()));
        }

        match self.faults().count() + self.leaked {
            0 => Ok(()),
            n => Err(Error::Faults(n)),
        }
    }
}

fn exercise(config: &ScenarioConfig) -> ownhandle::Result<()> {
    let root = sim::root("harness root")?;
    info!("Root {:?}", root.native());

    let child = ChildHandle::create(&root, 1, "harness child", sim::create_child)?;
    info!("Child {:?} of {:?}", child.native(0), child.source_native());

    let batch = ChildBatch::create(&root, config.batch, "harness batch", sim::create_child)?;
    info!("Batch {:?} of {:?}", batch.as_slice(), batch.source_native());

    drop(batch);
    drop(child);
    debug!("Children dropped, dropping root");
    drop(root);
    Ok(())
}

/// Runs the scenario on a fresh simulated API.
///
/// Locals drop in reverse order on early return, so children are destroyed
/// before the root even when a creation fails part way.
pub fn run(config: &ScenarioConfig) -> Report {
    sim::reset();
    if let Some(n) = config.fail_after {
        sim::fail_after(n);
    }

    Report::collect(exercise(config).err())
}
