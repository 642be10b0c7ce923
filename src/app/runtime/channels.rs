use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::event::Event as CEvent;
use tokio::sync::mpsc;

use super::loader::LoaderMessage;

/// How long the input thread blocks in `poll` before rechecking its cancel flag.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What: Channels connecting the UI loop to the input thread and the loader.
///
/// Details:
/// - Senders are kept here too so the receivers never observe a closed channel while
///   the loop runs.
pub struct Channels {
    pub event_tx: mpsc::UnboundedSender<CEvent>,
    pub event_rx: mpsc::UnboundedReceiver<CEvent>,
    pub event_thread_cancelled: Arc<AtomicBool>,
    pub loader_tx: mpsc::UnboundedSender<LoaderMessage>,
    pub loader_rx: mpsc::UnboundedReceiver<LoaderMessage>,
}

impl Channels {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel::<CEvent>();
        let (loader_tx, loader_rx) = mpsc::unbounded_channel::<LoaderMessage>();
        Self {
            event_tx,
            event_rx,
            event_thread_cancelled: Arc::new(AtomicBool::new(false)),
            loader_tx,
            loader_rx,
        }
    }

    /// Ask the input thread to stop at its next poll.
    pub fn cancel_event_thread(&self) {
        self.event_thread_cancelled.store(true, Ordering::Relaxed);
    }
}

/// What: Spawn the blocking terminal input reader.
///
/// Inputs:
/// - `event_tx`: Where decoded terminal events are sent
/// - `cancelled`: Flag checked between polls; set on exit
///
/// Details:
/// - Polls with a short timeout so the thread notices cancellation promptly.
/// - Exits when the flag is set or the receiver is gone; read errors are skipped.
pub fn spawn_event_thread(event_tx: mpsc::UnboundedSender<CEvent>, cancelled: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        while !cancelled.load(Ordering::Relaxed) {
            match crossterm::event::poll(EVENT_POLL_INTERVAL) {
                Ok(true) => match crossterm::event::read() {
                    Ok(ev) => {
                        if cancelled.load(Ordering::Relaxed) || event_tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::trace!(error = %e, "terminal read failed"),
                },
                Ok(false) => {}
                Err(e) => tracing::trace!(error = %e, "terminal poll failed"),
            }
        }
        tracing::debug!("input thread exiting");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    /// What: Loader messages sent through the handoff arrive intact
    ///
    /// - Input: One `Failed` message on a fresh channel set
    /// - Output: Receiver yields the same message; cancel flag flips on request
    async fn loader_handoff_and_cancel_flag() {
        let mut ch = Channels::new();
        ch.loader_tx
            .send(LoaderMessage::Failed("boom".into()))
            .expect("send");
        match ch.loader_rx.recv().await {
            Some(LoaderMessage::Failed(msg)) => assert_eq!(msg, "boom"),
            _ => panic!("unexpected loader message"),
        }
        assert!(!ch.event_thread_cancelled.load(Ordering::Relaxed));
        ch.cancel_event_thread();
        assert!(ch.event_thread_cancelled.load(Ordering::Relaxed));
    }
}
