use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver};
use log::warn;

use crate::board::Board;
use crate::config::SolverConfig;
use crate::path::Solution;
use crate::solver::{OrderExplorer, SolveError};

/// Something that happened on a background solve.
#[derive(Clone, Debug)]
pub enum SolveEvent {
    /// Percentage of orders attempted. Each value is larger than the one before.
    Progress(u8),
    /// The solve is over. Always the last event.
    Finished(Result<Solution, SolveError>),
}

/// A solve running on its own thread, so the caller's thread stays free.
///
/// The board is moved into the worker, so nothing the caller does afterwards can touch it.
/// Dropping the handle cancels the solve.
pub struct SolveHandle {
    events: Receiver<SolveEvent>,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SolveHandle {
    /// Start solving `board` on a new thread.
    pub fn spawn(board: Board, config: SolverConfig) -> Self {
        let (sender, events) = unbounded();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);

        let worker = thread::spawn(move || {
            let result = OrderExplorer::new(&board, config).and_then(|explorer| {
                let mut last = None;
                explorer.with_cancel_flag(flag).solve_with_progress(|percent| {
                    if last.map_or(true, |previous| percent > previous) {
                        last = Some(percent);
                        // the receiver may already be gone; the solve winds down on its own
                        let _ = sender.send(SolveEvent::Progress(percent));
                    }
                })
            });
            let _ = sender.send(SolveEvent::Finished(result));
        });

        Self {
            events,
            cancel,
            worker: Some(worker),
        }
    }

    /// Progress and completion events, in the order they happened.
    pub fn events(&self) -> &Receiver<SolveEvent> {
        &self.events
    }

    /// Stop the solve; the worker still sends [`SolveEvent::Finished`].
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Block until the solve finishes, discarding progress.
    pub fn wait(mut self) -> Result<Solution, SolveError> {
        let outcome = self.events.iter().find_map(|event| match event {
            SolveEvent::Finished(result) => Some(result),
            SolveEvent::Progress(_) => None,
        });

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("solver thread panicked");
            }
        }

        outcome.unwrap_or(Err(SolveError::Cancelled))
    }
}

impl Drop for SolveHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
