//! Synchronizes a send against the asynchronous opening of the sender link

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{
    endpoint::ConnectionEndpoint,
    error::{ConnectionError, Error, Result},
    message::OutboundMessage,
    state::{LinkState, Readiness},
    transport::{Connector, OutboundLink},
};

struct Client<L> {
    endpoint: ConnectionEndpoint,
    readiness: Arc<Readiness>,
    link: Arc<L>,
}

/// Owns at most one connection attempt and its readiness
///
/// The engine thread started by the [`Connector`] is the only writer of the readiness.
/// The lock around the current client serializes [`Handshake::connect`], so two
/// overlapping calls never start two transport sessions. It is never held while a message
/// is in flight.
pub struct Handshake<C: Connector> {
    connector: C,
    client: Mutex<Option<Client<C::Link>>>,
}

impl<C: Connector> std::fmt::Debug for Handshake<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handshake")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<C: Connector> Handshake<C> {
    /// Creates a handshake without any connection
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            client: Mutex::new(None),
        }
    }

    /// The connector used for every attempt
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Starts a connection to `endpoint` unless one is already connected.
    ///
    /// While connected, `endpoint` is ignored and the current link is kept. Call
    /// [`Handshake::disconnect`] first to switch to another endpoint. A previous attempt that is not connected is discarded and replaced by a new one with
    /// a fresh [`Readiness`]. If the transport cannot be started, the handshake is left
    /// without a client and the error is returned. No retry is made.
    pub fn connect(&self, endpoint: &ConnectionEndpoint) -> Result<()> {
        let mut client = self.client.lock();
        if let Some(current) = client.as_ref() {
            if current.readiness.is_connected() {
                return Ok(());
            }
        }

        // Dropping the stale link stops its engine
        *client = None;

        let readiness = Arc::new(Readiness::new());
        readiness.on_started();

        #[cfg(feature = "tracing")]
        tracing::debug!(?endpoint, "starting connection attempt");
        #[cfg(feature = "log")]
        log::debug!("starting connection attempt to {:?}", endpoint);

        match self.connector.connect(endpoint, readiness.clone()) {
            Ok(link) => {
                *client = Some(Client {
                    endpoint: endpoint.clone(),
                    readiness,
                    link: Arc::new(link),
                });
                Ok(())
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::error!(error = %err, "failed to start connection");
                #[cfg(feature = "log")]
                log::error!("failed to start connection: {}", err);
                Err(err.into())
            }
        }
    }

    /// State of the current attempt, [`LinkState::Idle`] if there is none
    pub fn state(&self) -> LinkState {
        self.readiness()
            .map(|readiness| readiness.state())
            .unwrap_or(LinkState::Idle)
    }

    /// Whether the current attempt is connected
    pub fn is_connected(&self) -> bool {
        self.readiness()
            .map(|readiness| readiness.is_connected())
            .unwrap_or(false)
    }

    /// Whether the current sender link accepts messages
    pub fn is_ready(&self) -> bool {
        self.readiness()
            .map(|readiness| readiness.is_ready())
            .unwrap_or(false)
    }

    /// Blocks for at most `timeout` until the current attempt is ready.
    ///
    /// Returns `false` right away if there is no attempt.
    pub fn wait_until_ready(&self, timeout: Duration) -> bool {
        // The client lock is not held while waiting
        match self.readiness() {
            Some(readiness) => readiness.wait_until_ready(timeout),
            None => false,
        }
    }

    /// Endpoint of the current attempt
    pub fn endpoint(&self) -> Option<ConnectionEndpoint> {
        self.client
            .lock()
            .as_ref()
            .map(|client| client.endpoint.clone())
    }

    /// Sends `message` over the current sender link and returns the endpoint it went to.
    ///
    /// Fails with [`Error::NotReady`] if the link has not been opened yet or has been lost.
    pub fn send(&self, message: OutboundMessage) -> Result<ConnectionEndpoint> {
        let (endpoint, link) = match self.client.lock().as_ref() {
            Some(current) if current.readiness.is_ready() => {
                (current.endpoint.clone(), current.link.clone())
            }
            _ => return Err(Error::NotReady),
        };
        link.send(message)?;
        Ok(endpoint)
    }

    /// Stops the current attempt, if any, and waits for its engine to wind down.
    ///
    /// If a send is still in flight on another thread, the link is closed when that send
    /// returns, without waiting.
    pub fn disconnect(&self) {
        let client = self.client.lock().take();
        if let Some(Client { link, .. }) = client {
            if let Ok(link) = Arc::try_unwrap(link) {
                link.close();
            }
        }
    }

    /// Why the current attempt was disconnected, if known
    pub fn disconnect_reason(&self) -> Option<String> {
        self.readiness().and_then(|readiness| readiness.reason())
    }

    /// Fails with [`ConnectionError::NotEstablished`] unless the link becomes ready in time
    pub(crate) fn ensure_ready(&self, timeout: Duration) -> Result<()> {
        if self.wait_until_ready(timeout) {
            Ok(())
        } else {
            Err(ConnectionError::NotEstablished {
                reason: self.disconnect_reason(),
            }
            .into())
        }
    }

    fn readiness(&self) -> Option<Arc<Readiness>> {
        self.client
            .lock()
            .as_ref()
            .map(|client| client.readiness.clone())
    }
}
