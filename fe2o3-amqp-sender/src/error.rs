//! Errors associated with dispatching a message

use std::io;

use fe2o3_amqp::{
    connection::OpenError,
    link::{SendError, SenderAttachError},
    session::BeginError,
};

/// Errors surfaced to the dispatch boundary
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Neither text nor file payload is present
    #[error("Cannot send empty message")]
    EmptyPayload,

    /// The server address is not in `host:port` format
    #[error("Invalid server address {0:?}, enter address in 'host:port' format, e.g., 127.0.0.1:61716")]
    AddressFormat(String),

    /// The connection could not be established
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// A send was attempted before the sender link was opened
    #[error("Connection not ready")]
    NotReady,

    /// IO error while reading the attached file
    #[error("IO Error {0:?}")]
    Io(#[from] io::Error),

    /// The engine failed to deliver the message
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors associated with establishing a connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// The engine runtime or thread could not be started
    #[error("Connection error: {0}")]
    Spawn(#[source] io::Error),

    /// The sender link was not opened within the readiness timeout
    #[error("Failed to establish connection{}", fmt_reason(.reason))]
    NotEstablished {
        /// Reason reported by the engine, if the attempt ended before the timeout
        reason: Option<String>,
    },

    /// The engine thread has stopped
    #[error("Connection closed by the engine")]
    EngineStopped,
}

fn fmt_reason(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {}", reason),
        None => String::new(),
    }
}

/// Errors reported by the `fe2o3-amqp` engine
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Error opening the connection
    #[error(transparent)]
    Open(#[from] OpenError),

    /// Error beginning the session
    #[error(transparent)]
    Begin(#[from] BeginError),

    /// Error attaching the sender link
    #[error(transparent)]
    Attach(#[from] SenderAttachError),

    /// Error sending the message
    #[error(transparent)]
    Send(#[from] SendError),

    /// The broker settled the delivery with an outcome other than accepted
    #[error("Delivery not accepted: {0}")]
    NotAccepted(String),
}

/// A shorthand for [`std::result::Result`] with [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
