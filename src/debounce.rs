//! Trailing-edge debouncer: of a burst of calls closer together than the
//! quiescence window, only the last value is delivered, strictly after the
//! window elapses.

use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

pub struct Debouncer<T> {
    input_tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the debounce task. `deliver` runs once per quiet burst with the
    /// most recent value.
    pub fn new(window: Duration, mut deliver: impl FnMut(T) + Send + 'static) -> Self {
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<T>();

        tokio::spawn(async move {
            loop {
                let Some(mut pending) = input_rx.recv().await else {
                    return;
                };

                loop {
                    tokio::select! {
                        _ = sleep(window) => {
                            deliver(pending);
                            break;
                        }
                        next = input_rx.recv() => match next {
                            // A newer call resets the timer; only the latest
                            // value survives.
                            Some(value) => pending = value,
                            None => {
                                deliver(pending);
                                return;
                            }
                        }
                    }
                }
            }
        });

        Self { input_tx }
    }

    /// Record a call. Resets the quiescence timer.
    pub fn call(&self, value: T) {
        let _ = self.input_tx.send(value);
    }
}
