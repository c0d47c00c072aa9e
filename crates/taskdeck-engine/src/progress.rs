//! Ordered progress channel from a run to its caller
//!
//! The run owns the sending half. The stream ends exactly once: when the run
//! finishes and drops its sender.

use taskdeck_types::{ProgressEvent, StreamMessage};
use tokio::sync::mpsc;

/// Create a progress channel holding up to `capacity` undelivered events
pub fn progress_channel(capacity: usize) -> (ProgressSender, ProgressStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ProgressSender { tx, last: 0 }, ProgressStream { rx })
}

/// Producer half, owned by the run
#[derive(Debug)]
pub struct ProgressSender {
    tx: mpsc::Sender<StreamMessage>,
    last: usize,
}

impl ProgressSender {
    /// Emit one event.
    ///
    /// Events with a `current` lower than one already emitted are dropped.
    /// A caller that stopped listening does not affect the run.
    pub async fn emit(&mut self, event: ProgressEvent) {
        if event.current < self.last {
            tracing::warn!(
                current = event.current,
                last = self.last,
                "Dropping out-of-order progress event"
            );
            return;
        }
        self.last = event.current;

        if self.tx.send(event.into()).await.is_err() {
            tracing::debug!(
                current = event.current,
                total = event.total,
                "Progress receiver gone, event dropped"
            );
        }
    }

    /// Highest `current` value emitted so far
    pub fn last(&self) -> usize {
        self.last
    }
}

/// Consumer half, handed to the caller that started the run
#[derive(Debug)]
pub struct ProgressStream {
    rx: mpsc::Receiver<StreamMessage>,
}

impl ProgressStream {
    /// Next message, or `None` once the run has ended
    pub async fn next(&mut self) -> Option<StreamMessage> {
        self.rx.recv().await
    }

    /// Drain the stream until the run ends
    pub async fn collect(mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Some(StreamMessage::Progress { progress }) = self.next().await {
            events.push(progress);
        }
        events
    }
}
