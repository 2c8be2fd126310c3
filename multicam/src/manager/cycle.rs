//! Background slot cycling.

use super::Shared;
use crate::error::Result;
use crate::mux::{MuxTarget, Slot};
use logging::Logger;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Handle to a running cycle task
///
/// Dropping the handle without calling [`CycleHandle::stop`] also ends the
/// task at its next tick, but does not wait for it.
pub(crate) struct CycleHandle {
    stop_tx: Sender<()>,
    ack_rx: Receiver<()>,
    thread: JoinHandle<()>,
    interval: Duration,
}

impl CycleHandle {
    pub(crate) fn spawn(shared: Arc<Shared>, interval: Duration) -> Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel();
        let (ack_tx, ack_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("camera-cycle".to_string())
            .spawn(move || {
                run_cycle(&shared, interval, &stop_rx);
                let _ = ack_tx.send(());
            })?;

        Ok(CycleHandle {
            stop_tx,
            ack_rx,
            thread,
            interval,
        })
    }

    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }

    /// Signals the task and blocks until it has exited
    ///
    /// Logs a warning if the acknowledgement takes longer than `warn_after`,
    /// then keeps waiting.
    pub(crate) fn stop(self, warn_after: Duration, logger: &Logger) {
        let _ = self.stop_tx.send(());

        match self.ack_rx.recv_timeout(warn_after) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
            Err(RecvTimeoutError::Timeout) => {
                logger.warn(&format!(
                    "Cycle task did not stop within {} ms, still waiting",
                    warn_after.as_millis()
                ));
                let _ = self.ack_rx.recv();
            }
        }

        if self.thread.join().is_err() {
            logger.error("Cycle task panicked");
        }
    }
}

fn stop_requested(stop_rx: &Receiver<()>) -> bool {
    !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty))
}

/// Slots to visit in order, starting after the current selection
fn rotation(shared: &Shared) -> (Vec<Slot>, usize) {
    let slots: Vec<Slot> = shared
        .config
        .hardware
        .functional_slots()
        .into_iter()
        .map(Slot)
        .collect();

    let start = match shared.current_target() {
        Some(MuxTarget::Slot(current)) => slots
            .iter()
            .position(|&slot| slot == current)
            .map(|i| (i + 1) % slots.len().max(1))
            .unwrap_or(0),
        _ => 0,
    };
    (slots, start)
}

fn run_cycle(shared: &Shared, interval: Duration, stop_rx: &Receiver<()>) {
    let logger = &shared.log.cycle;
    let (slots, mut position) = rotation(shared);
    if slots.is_empty() {
        logger.warn("No functional slots to cycle through");
        return;
    }

    logger.debug(&format!(
        "Cycle task running over {} slot(s)",
        slots.len()
    ));

    loop {
        {
            let mut hardware = shared.lock_hardware();
            // A stop may have arrived while this task waited for the lock.
            if stop_requested(stop_rx) {
                break;
            }
            let Some(hw) = hardware.as_mut() else {
                logger.info("Hardware released, cycle task exiting");
                break;
            };

            let slot = slots[position];
            position = (position + 1) % slots.len();

            if let Err(e) = shared.select_locked(hw, MuxTarget::Slot(slot)) {
                logger.warn(&format!("Cycle tick on slot {} failed: {}", slot, e));
            }
        }

        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    logger.debug("Cycle task stopped");
}
