//! Link readiness shared between the caller thread and the engine thread

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// State of one connection attempt
///
/// ```text
///  Idle --Started--> Connecting --LinkOpened--> Ready
///                        |                        |
///                        +------Disconnected------+--> Disconnected
/// ```
///
/// `Disconnected` is terminal. A new connection attempt starts from a fresh [`Readiness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No connection has been started
    Idle,

    /// The engine is opening the connection, session and sender link
    Connecting,

    /// The sender link is attached and accepts messages
    Ready,

    /// The connection was closed or the attempt failed
    Disconnected,
}

/// Events driving [`LinkState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The engine was started
    Started,

    /// The remote peer confirmed the sender link
    LinkOpened,

    /// The connection dropped, with an optional reason
    Disconnected(Option<String>),
}

impl LinkState {
    /// Next state after `event`. Events that do not apply leave the state unchanged.
    pub fn on_event(self, event: &LinkEvent) -> LinkState {
        match (self, event) {
            (LinkState::Idle, LinkEvent::Started) => LinkState::Connecting,
            (LinkState::Connecting, LinkEvent::LinkOpened) => LinkState::Ready,
            (LinkState::Disconnected, _) => LinkState::Disconnected,
            (_, LinkEvent::Disconnected(_)) => LinkState::Disconnected,
            (state, _) => state,
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: LinkState,
    reason: Option<String>,
}

/// Thread-safe readiness signal of a single connection attempt
///
/// The engine thread is the only writer. The caller thread reads it and blocks on it with
/// [`Readiness::wait_until_ready`].
#[derive(Debug)]
pub struct Readiness {
    inner: Mutex<Inner>,
    changed: Condvar,
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

impl Readiness {
    /// Creates a new readiness in [`LinkState::Idle`]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: LinkState::Idle,
                reason: None,
            }),
            changed: Condvar::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> LinkState {
        self.inner.lock().state
    }

    /// Reason of the disconnection, if any was reported
    pub fn reason(&self) -> Option<String> {
        self.inner.lock().reason.clone()
    }

    /// Whether the connection is up
    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Ready
    }

    /// Whether the sender link accepts messages
    pub fn is_ready(&self) -> bool {
        self.state() == LinkState::Ready
    }

    /// Applies `event` and wakes up all waiters. Returns the new state.
    pub fn apply(&self, event: LinkEvent) -> LinkState {
        let mut inner = self.inner.lock();
        let next = inner.state.on_event(&event);
        if next != inner.state {
            #[cfg(feature = "tracing")]
            tracing::debug!(from = ?inner.state, to = ?next, ?event, "link state changed");
            #[cfg(feature = "log")]
            log::debug!("link state changed from {:?} to {:?} on {:?}", inner.state, next, event);

            if let LinkEvent::Disconnected(reason) = event {
                inner.reason = reason;
            }
            inner.state = next;
            self.changed.notify_all();
        }
        next
    }

    /// The engine was started
    pub fn on_started(&self) {
        self.apply(LinkEvent::Started);
    }

    /// The sender link was confirmed open by the remote peer
    pub fn on_link_opened(&self) {
        self.apply(LinkEvent::LinkOpened);
    }

    /// The connection dropped
    pub fn on_disconnected(&self, reason: Option<String>) {
        self.apply(LinkEvent::Disconnected(reason));
    }

    /// Blocks for at most `timeout` until the link is ready.
    ///
    /// Returns `false` if the timeout elapses first or if the attempt ends in
    /// [`LinkState::Disconnected`].
    pub fn wait_until_ready(&self, timeout: Duration) -> bool {
        let mut inner = self.inner.lock();
        let _ = self.changed.wait_while_for(
            &mut inner,
            |inner| matches!(inner.state, LinkState::Idle | LinkState::Connecting),
            timeout,
        );
        inner.state == LinkState::Ready
    }
}
