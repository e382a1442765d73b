//! Test-only helpers shared by unit and integration tests.
//!
//! [`ScriptedSpawner`] never starts a process. It records every request and
//! lets the test decide when output arrives and when the job exits.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crate::process::{JobSink, SpawnRequest, Spawner};

#[derive(Debug, Default)]
struct Script {
    requests: Vec<SpawnRequest>,
    sinks: Vec<JobSink>,
    fail_next: bool,
}

/// Spawner double driven by the test. Clones share the same script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSpawner {
    script: Rc<RefCell<Script>>,
}

impl ScriptedSpawner {
    /// Create an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of processes started so far.
    #[must_use]
    pub fn spawn_count(&self) -> usize {
        self.script.borrow().sinks.len()
    }

    /// Requests seen so far, including failed ones.
    #[must_use]
    pub fn requests(&self) -> Vec<SpawnRequest> {
        self.script.borrow().requests.clone()
    }

    /// Make the next spawn fail with `NotFound`.
    pub fn fail_next_spawn(&self) {
        self.script.borrow_mut().fail_next = true;
    }

    /// Deliver output for the `index`-th started process.
    ///
    /// # Panics
    ///
    /// When no such process was started.
    pub fn emit(&self, index: usize, text: &str) {
        let script = self.script.borrow();
        script.sinks[index].output(text);
    }

    /// Terminate the `index`-th started process.
    ///
    /// # Panics
    ///
    /// When no such process was started.
    pub fn finish(&self, index: usize, code: Option<i32>) {
        let script = self.script.borrow();
        script.sinks[index].exited(code);
    }
}

impl Spawner for ScriptedSpawner {
    fn spawn(&mut self, request: &SpawnRequest, sink: JobSink) -> io::Result<()> {
        let mut script = self.script.borrow_mut();
        script.requests.push(request.clone());
        if script.fail_next {
            script.fail_next = false;
            return Err(io::Error::new(io::ErrorKind::NotFound, "scripted failure"));
        }
        script.sinks.push(sink);
        Ok(())
    }
}
