//! Single-shot delay timer.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

enum Signal {
    Poke,
    Stop,
}

/// Fires a callback once `delay` has passed since the most recent poke.
///
/// Every poke restarts the delay, so a burst of change notifications
/// yields a single firing after the burst settles.
pub struct Debouncer {
    signals: Sender<Signal>,
    worker: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new<F>(delay: Duration, fire: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (signals, rx) = mpsc::channel::<Signal>();

        let worker = thread::spawn(move || {
            let mut deadline: Option<Instant> = None;
            loop {
                let signal = match deadline {
                    Some(at) => {
                        let remaining = at.saturating_duration_since(Instant::now());
                        match rx.recv_timeout(remaining) {
                            Ok(signal) => signal,
                            Err(RecvTimeoutError::Timeout) => {
                                deadline = None;
                                fire();
                                continue;
                            }
                            Err(RecvTimeoutError::Disconnected) => break,
                        }
                    }
                    None => match rx.recv() {
                        Ok(signal) => signal,
                        Err(_) => break,
                    },
                };

                match signal {
                    Signal::Poke => deadline = Some(Instant::now() + delay),
                    Signal::Stop => break,
                }
            }
        });

        Self {
            signals,
            worker: Some(worker),
        }
    }

    /// Starts, or restarts, the delay.
    pub fn poke(&self) {
        let _ = self.signals.send(Signal::Poke);
    }
}

impl Drop for Debouncer {
    /// A pending firing is discarded.
    fn drop(&mut self) {
        let _ = self.signals.send(Signal::Stop);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
