//! Builds outbound messages from collected input and sends them

use std::time::Duration;

use uuid::Uuid;

use crate::{
    config::SenderConfig,
    error::{Error, Result},
    event_log::LogSink,
    handshake::Handshake,
    input::{InputSource, SendInput},
    message::OutboundMessage,
    transport::Connector,
};

/// What was sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Queue of the sender link that carried the message
    pub queue: String,

    /// Id of the message
    pub message_id: Uuid,

    /// Creation time of the message
    pub timestamp: String,

    /// Base name of the attached file, if the message carried one
    pub file_name: Option<String>,
}

/// Turns a [`SendInput`] into a delivered message
pub struct Dispatcher<C: Connector, L> {
    handshake: Handshake<C>,
    log: L,
    ready_timeout: Duration,
}

impl<C: Connector, L> std::fmt::Debug for Dispatcher<C, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handshake", &self.handshake)
            .field("ready_timeout", &self.ready_timeout)
            .finish_non_exhaustive()
    }
}

impl<C, L> Dispatcher<C, L>
where
    C: Connector,
    L: LogSink,
{
    /// Creates a dispatcher owning a new [`Handshake`] over `connector`
    pub fn new(connector: C, log: L, config: &SenderConfig) -> Self {
        Self::with_handshake(Handshake::new(connector), log, config.ready_timeout)
    }

    /// Creates a dispatcher around an existing handshake
    pub fn with_handshake(handshake: Handshake<C>, log: L, ready_timeout: Duration) -> Self {
        Self {
            handshake,
            log,
            ready_timeout,
        }
    }

    /// The handshake
    pub fn handshake(&self) -> &Handshake<C> {
        &self.handshake
    }

    /// The event log
    pub fn log(&self) -> &L {
        &self.log
    }

    /// Sends the payload described by `input`, connecting first if needed.
    ///
    /// An attached file takes precedence over the text. The transport is never touched when
    /// the input is invalid. An already connected link is reused as is, so the receipt names
    /// the queue of that link, which may differ from `input.queue`.
    ///
    /// This blocks the calling thread until the engine has taken the message and must not be
    /// called from within an async runtime.
    pub fn dispatch(&self, input: &SendInput) -> Result<Receipt> {
        let endpoint = input.endpoint()?;
        let payload = input.payload()?;
        if payload.is_empty() {
            return Err(Error::EmptyPayload);
        }

        if !self.handshake.is_connected() {
            self.handshake.connect(&endpoint)?;
            self.log.append("Connecting to message broker...");
            self.handshake.ensure_ready(self.ready_timeout)?;
        }

        let message = OutboundMessage::new(payload);
        let message_id = message.message_id();
        let timestamp = message.timestamp().to_string();
        let file_name = message.file_name().map(String::from);
        let sent_to = self.handshake.send(message)?;
        let receipt = Receipt {
            queue: sent_to.queue_address().to_string(),
            message_id,
            timestamp,
            file_name,
        };

        self.log.append(&format!(
            "Message sent to {}\nID: {}\nTimestamp: {}",
            receipt.queue, receipt.message_id, receipt.timestamp
        ));
        Ok(receipt)
    }

    /// Dispatches `input` and logs any error instead of returning it
    pub fn submit(&self, input: &SendInput) -> Option<Receipt> {
        match self.dispatch(input) {
            Ok(receipt) => Some(receipt),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = ?err, "dispatch failed");
                #[cfg(feature = "log")]
                log::debug!("dispatch failed: {:?}", err);
                self.log.append(&format!("Error: {}", err));
                None
            }
        }
    }

    /// Collects input from `source` and submits it
    pub fn submit_from(&self, source: &impl InputSource) -> Option<Receipt> {
        self.submit(&source.collect_input())
    }
}
