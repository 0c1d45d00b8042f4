//! Background instalock worker.
//!
//! One thread polls the screen while the enabled flag is set and reports
//! each lock on a channel. Two atomic flags are the whole control surface:
//! `enabled` gates searching, `stopped` ends the thread.

use crate::error::Result;
use crate::lock::{
    attempt_lock, Attempt, LockOptions, LockPhase, LockTemplates, LockedAt, PhaseCell, Pointer,
};
use instalock_capture::FrameSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

/// Notifications from the worker thread
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// The agent was locked; the worker has disabled itself
    Locked { agent: String, at: LockedAt },
    /// Capture or input failed; the worker has exited
    Failed(String),
}

/// State shared between the handle and the worker thread
struct Shared {
    enabled: AtomicBool,
    stopped: AtomicBool,
    phase: PhaseCell,
    templates: Mutex<Arc<LockTemplates>>,
}

impl Shared {
    fn templates(&self) -> Arc<LockTemplates> {
        let guard = self.templates.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }
}

/// Handle to the background worker
///
/// Dropping the handle stops the worker and joins its thread.
pub struct Instalocker {
    shared: Arc<Shared>,
    events: Option<Receiver<WorkerEvent>>,
    handle: Option<JoinHandle<()>>,
}

impl Instalocker {
    /// Start the worker thread, initially disabled
    pub fn spawn<S, P>(
        screen: S,
        pointer: P,
        templates: LockTemplates,
        options: LockOptions,
    ) -> Result<Self>
    where
        S: FrameSource + Send + 'static,
        P: Pointer + Send + 'static,
    {
        let shared = Arc::new(Shared {
            enabled: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            phase: PhaseCell::new(),
            templates: Mutex::new(Arc::new(templates)),
        });
        let (tx, rx) = mpsc::channel();

        let thread_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("instalock-worker".to_string())
            .spawn(move || run(thread_shared, screen, pointer, options, tx))?;

        Ok(Self {
            shared,
            events: Some(rx),
            handle: Some(handle),
        })
    }

    /// Start searching
    pub fn enable(&self) {
        self.shared.enabled.store(true, Ordering::Release);
    }

    /// Stop searching; the thread stays alive
    pub fn disable(&self) {
        self.shared.enabled.store(false, Ordering::Release);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.shared.enabled.store(enabled, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }

    /// Whether the worker thread is still running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn phase(&self) -> LockPhase {
        self.shared.phase.get()
    }

    /// Title-cased name of the agent being searched for
    pub fn agent(&self) -> String {
        self.shared.templates().agent().to_string()
    }

    /// Switch to another agent; takes effect on the next attempt
    pub fn set_agent(&self, templates: LockTemplates) {
        debug!(agent = %templates.agent(), "Switching agent");
        let mut guard = self.shared.templates.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(templates);
    }

    /// Take the event receiver, e.g. to hand it to a listener thread
    pub fn take_events(&mut self) -> Option<Receiver<WorkerEvent>> {
        self.events.take()
    }

    /// Wait for the next event, unless the receiver was taken
    pub fn next_event(&self, timeout: Duration) -> Option<WorkerEvent> {
        match self.events.as_ref()?.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Signal the worker to exit and wait for it
    pub fn stop(&mut self) {
        self.shared.stopped.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Instalock worker panicked");
            }
        }
    }
}

impl Drop for Instalocker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<S, P>(
    shared: Arc<Shared>,
    mut screen: S,
    mut pointer: P,
    options: LockOptions,
    events: Sender<WorkerEvent>,
) where
    S: FrameSource,
    P: Pointer,
{
    debug!("Instalock worker started");
    loop {
        thread::sleep(options.poll_interval);

        if shared.stopped.load(Ordering::Acquire) {
            break;
        }

        if !shared.enabled.load(Ordering::Acquire) {
            // A completed lock stays visible until searching resumes
            if shared.phase.get() != LockPhase::Locked {
                shared.phase.set(LockPhase::Idle);
            }
            continue;
        }

        let templates = shared.templates();
        match attempt_lock(&mut screen, &mut pointer, &templates, &options, &shared.phase) {
            Ok(Attempt::NotFound(_)) => {}
            Ok(Attempt::Locked(at)) => {
                shared.enabled.store(false, Ordering::Release);
                info!(agent = %templates.agent(), "Locked");
                let _ = events.send(WorkerEvent::Locked {
                    agent: templates.agent().to_string(),
                    at,
                });
            }
            Err(e) => {
                error!(error = %e, "Instalock worker failed");
                shared.enabled.store(false, Ordering::Release);
                shared.phase.set(LockPhase::Idle);
                let _ = events.send(WorkerEvent::Failed(e.to_string()));
                break;
            }
        }
    }
    debug!("Instalock worker stopped");
}
