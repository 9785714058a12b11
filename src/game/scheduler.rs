//! # Concurrent Scheduler
//!
//! A fixed set of named periodic workers sharing one `running` flag and one
//! `paused` flag behind a single mutex and condition variable.
//!
//! Each worker loops: wait while paused, run its unit of work, sleep its
//! cadence. Sleeping and pausing both wait on the condition variable, so
//! `stop` wakes every worker at once. A failing or panicking unit of work is
//! logged and the loop carries on.
//!
//! `stop` waits a bounded time for each worker and abandons the ones that do
//! not exit. It is idempotent and safe to call from inside a worker.

use crate::game::engine::panic_message;
use crate::{ChaseError, ChaseResult};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// One unit of periodic work.
pub type WorkerJob = Box<dyn FnMut() -> ChaseResult<()> + Send + 'static>;

#[derive(Debug, Default)]
struct ControlState {
    started: bool,
    running: bool,
    paused: bool,
}

#[derive(Debug, Default)]
struct Control {
    state: Mutex<ControlState>,
    signal: Condvar,
}

impl Control {
    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct WorkerSpec {
    name: String,
    cadence: Duration,
    job: WorkerJob,
}

struct WorkerHandle {
    name: String,
    thread: JoinHandle<()>,
    exited: Receiver<()>,
}

/// Which workers `stop` saw exit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopReport {
    /// Exited and joined
    pub joined: Vec<String>,
    /// Still running after the join timeout
    pub abandoned: Vec<String>,
    /// The calling worker itself; it exits once its current unit returns
    pub detached: Vec<String>,
}

impl StopReport {
    pub fn is_clean(&self) -> bool {
        self.abandoned.is_empty()
    }
}

/// Periodic worker scheduler.
///
/// # Examples
///
/// ```
/// use mazechase::Scheduler;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let runs = Arc::new(AtomicUsize::new(0));
/// let counter = runs.clone();
///
/// let scheduler = Scheduler::new(Duration::from_secs(1));
/// scheduler.add_worker("counter", Duration::from_millis(5), Box::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
///     Ok(())
/// }));
/// scheduler.start().unwrap();
/// std::thread::sleep(Duration::from_millis(50));
/// let report = scheduler.stop();
///
/// assert!(report.is_clean());
/// assert!(runs.load(Ordering::SeqCst) > 0);
/// ```
pub struct Scheduler {
    control: Arc<Control>,
    pending: Mutex<Vec<WorkerSpec>>,
    workers: Mutex<Vec<WorkerHandle>>,
    join_timeout: Duration,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.control.lock();
        f.debug_struct("Scheduler")
            .field("running", &state.running)
            .field("paused", &state.paused)
            .field("join_timeout", &self.join_timeout)
            .finish()
    }
}

impl Scheduler {
    /// Creates a scheduler whose `stop` waits at most `join_timeout` per worker.
    pub fn new(join_timeout: Duration) -> Self {
        Self {
            control: Arc::new(Control::default()),
            pending: Mutex::new(Vec::new()),
            workers: Mutex::new(Vec::new()),
            join_timeout,
        }
    }

    /// Registers a worker. Workers added after `start` never run.
    pub fn add_worker(&self, name: impl Into<String>, cadence: Duration, job: WorkerJob) {
        let name = name.into();
        if self.control.lock().started {
            warn!("worker {} added after start, ignoring", name);
            return;
        }
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(WorkerSpec { name, cadence, job });
    }

    /// Spawns every registered worker. A scheduler starts at most once.
    pub fn start(&self) -> ChaseResult<()> {
        {
            let mut state = self.control.lock();
            if state.started {
                return Err(ChaseError::InvalidState(
                    "scheduler was already started".to_string(),
                ));
            }
            state.started = true;
            state.running = true;
            state.paused = false;
        }

        let specs: Vec<WorkerSpec> = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);

        for spec in specs {
            let (exit_tx, exit_rx) = bounded(1);
            let control = self.control.clone();
            let name = spec.name.clone();
            let spawned = thread::Builder::new()
                .name(format!("mazechase-{}", spec.name))
                .spawn(move || run_worker(spec, control, exit_tx));
            match spawned {
                Ok(thread) => workers.push(WorkerHandle {
                    name,
                    thread,
                    exited: exit_rx,
                }),
                Err(e) => {
                    drop(workers);
                    self.stop();
                    return Err(e.into());
                }
            }
        }

        info!("scheduler started {} workers", workers.len());
        Ok(())
    }

    /// Suspends every worker before its next unit of work.
    pub fn pause(&self) -> bool {
        let changed = {
            let mut state = self.control.lock();
            let changed = state.running && !state.paused;
            if changed {
                state.paused = true;
            }
            changed
        };
        self.control.signal.notify_all();
        changed
    }

    pub fn resume(&self) -> bool {
        let changed = {
            let mut state = self.control.lock();
            let changed = state.running && state.paused;
            if changed {
                state.paused = false;
            }
            changed
        };
        self.control.signal.notify_all();
        changed
    }

    pub fn is_paused(&self) -> bool {
        self.control.lock().paused
    }

    pub fn is_running(&self) -> bool {
        self.control.lock().running
    }

    pub fn worker_names(&self) -> Vec<String> {
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|worker| worker.name.clone())
            .collect()
    }

    /// Stops every worker and waits for them, at most the join timeout each.
    pub fn stop(&self) -> StopReport {
        {
            let mut state = self.control.lock();
            state.running = false;
            state.paused = false;
        }
        self.control.signal.notify_all();

        let workers: Vec<WorkerHandle> = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        let mut report = StopReport::default();
        if workers.is_empty() {
            return report;
        }

        let current = thread::current().id();
        for worker in workers {
            if worker.thread.thread().id() == current {
                report.detached.push(worker.name);
                continue;
            }
            match worker.exited.recv_timeout(self.join_timeout) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    if worker.thread.join().is_err() {
                        warn!("worker {} ended by panic", worker.name);
                    }
                    report.joined.push(worker.name);
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!(
                        "worker {} did not stop within {:?}, abandoning it",
                        worker.name, self.join_timeout
                    );
                    report.abandoned.push(worker.name);
                }
            }
        }

        info!(
            "scheduler stopped: {} joined, {} abandoned",
            report.joined.len(),
            report.abandoned.len()
        );
        report
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(spec: WorkerSpec, control: Arc<Control>, exited: Sender<()>) {
    let WorkerSpec {
        name,
        cadence,
        mut job,
    } = spec;
    debug!("worker {} running every {:?}", name, cadence);

    loop {
        {
            let state = control.lock();
            let state = control
                .signal
                .wait_while(state, |s| s.running && s.paused)
                .unwrap_or_else(PoisonError::into_inner);
            if !state.running {
                break;
            }
        }

        match panic::catch_unwind(AssertUnwindSafe(|| job())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("worker {} fault: {}", name, e),
            Err(payload) => error!(
                "worker {} panicked: {}",
                name,
                panic_message(payload.as_ref())
            ),
        }

        let state = control.lock();
        let (state, _) = control
            .signal
            .wait_timeout_while(state, cadence, |s| s.running)
            .unwrap_or_else(PoisonError::into_inner);
        if !state.running {
            break;
        }
    }

    // The receiver may already be gone when the worker was abandoned.
    let _ = exited.send(());
    debug!("worker {} exited", name);
}
