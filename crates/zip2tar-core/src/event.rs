//! Notifications emitted while a conversion runs.

use tokio::sync::mpsc;

/// A notification from a running conversion.
///
/// Terminal outcomes are not events: success or failure is delivered once
/// by [`Conversion::finish`](crate::Conversion::finish).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionEvent {
    /// Percentage of entries written, 1 to 100. Only emitted when progress
    /// reporting is enabled, strictly increasing.
    Progress(u8),

    /// An entry has been completely written to the TAR output.
    Named(String),
}

/// Receiving half of the event channel.
///
/// The channel closes once the conversion has finished, successfully or not.
#[derive(Debug)]
pub struct Events {
    rx: mpsc::UnboundedReceiver<ConversionEvent>,
}

impl Events {
    /// Waits for the next event. Returns `None` once the conversion ended.
    pub async fn recv(&mut self) -> Option<ConversionEvent> {
        self.rx.recv().await
    }

    /// Waits for the channel to close and returns every remaining event.
    pub async fn collect(mut self) -> Vec<ConversionEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.rx.recv().await {
            events.push(event);
        }
        events
    }
}

/// Sending half used by the conversion worker.
///
/// Sends never block. A receiver that was dropped is not an error: events
/// are advisory.
#[derive(Debug, Clone)]
pub(crate) struct EventSender {
    tx: mpsc::UnboundedSender<ConversionEvent>,
}

impl EventSender {
    pub(crate) fn named(&self, name: &str) {
        if !self.tx.is_closed() {
            let _ = self.tx.send(ConversionEvent::Named(name.to_owned()));
        }
    }

    pub(crate) fn progress(&self, percent: u8) {
        let _ = self.tx.send(ConversionEvent::Progress(percent));
    }

    /// Resolves once the receiver has been dropped.
    #[cfg(test)]
    pub(crate) async fn closed(&self) {
        self.tx.closed().await;
    }
}

/// Creates a connected event sender and receiver.
pub(crate) fn channel() -> (EventSender, Events) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, Events { rx })
}
