//! Seam between the handshake and the AMQP engine

use std::sync::Arc;

use crate::{
    endpoint::ConnectionEndpoint,
    error::{ConnectionError, Result},
    message::OutboundMessage,
    state::Readiness,
};

mod amqp;

pub use amqp::{AmqpConnector, AmqpLink};

/// Starts a transport session bound to an endpoint
pub trait Connector {
    /// The outbound link handed back to the handshake
    type Link: OutboundLink;

    /// Starts the session in the background and returns immediately.
    ///
    /// The session reports [`Readiness::on_link_opened`] once the sender link is attached
    /// and [`Readiness::on_disconnected`] when it stops. An error is only returned if the
    /// session could not be started at all.
    fn connect(
        &self,
        endpoint: &ConnectionEndpoint,
        readiness: Arc<Readiness>,
    ) -> std::result::Result<Self::Link, ConnectionError>;
}

/// Sending half of a running transport session
pub trait OutboundLink {
    /// Hands `message` to the transport and returns once the transport accepted it
    fn send(&self, message: OutboundMessage) -> Result<()>;

    /// Stops the session and waits for it to wind down
    fn close(self)
    where
        Self: Sized,
    {
    }
}
