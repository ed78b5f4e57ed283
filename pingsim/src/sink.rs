use pingsim_core::LogEvent;
use tokio::sync::mpsc;

/// Receiving end of a session's event stream.
pub type EventReceiver = mpsc::UnboundedReceiver<LogEvent>;

/// Where a [`ProbeSession`] delivers its [`LogEvent`]s.
///
/// A sink is the sending half of a single consumer channel. The session
/// holds at most one sink at a time and does not keep the receiver alive:
/// once the receiver is dropped, delivery silently stops.
///
/// [`ProbeSession`]: crate::ProbeSession
#[derive(Debug, Clone)]
pub struct Sink(mpsc::UnboundedSender<LogEvent>);

/// create a new [`Sink`] and the [`EventReceiver`] it delivers to
pub fn event_channel() -> (Sink, EventReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Sink(sender), receiver)
}

impl Sink {
    /// Returns `false` if the receiving end is gone.
    pub(crate) fn deliver(&self, event: LogEvent) -> bool {
        self.0.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

impl From<mpsc::UnboundedSender<LogEvent>> for Sink {
    fn from(sender: mpsc::UnboundedSender<LogEvent>) -> Self {
        Self(sender)
    }
}
