#![deny(missing_docs, missing_debug_implementations)]

//! Send a text message or a small file to an AMQP 1.0 broker queue with `fe2o3-amqp`
//!
//! The crate is split into three layers:
//!
//! - [`Handshake`] owns a single outbound connection and sender link. The link runs on a
//!   dedicated engine thread and reports back through a [`Readiness`] state machine.
//! - [`Dispatcher`] turns collected [`SendInput`] into an [`OutboundMessage`], connects on
//!   demand and hands the message to the handshake.
//! - A [`LogSink`] receives the human readable event log.
//!
//! The [`Connector`] trait is the seam between the handshake and the transport. The
//! [`AmqpConnector`] implementation is backed by `fe2o3-amqp`.
//!
//! ```rust,no_run
//! use fe2o3_amqp_sender::{AmqpConnector, Dispatcher, SendInput, SenderConfig, StdoutLog};
//!
//! let config = SenderConfig::default();
//! let dispatcher = Dispatcher::new(AmqpConnector::new(config.clone()), StdoutLog, &config);
//! let input = SendInput::builder()
//!     .address("127.0.0.1:61716")
//!     .queue("test_queue")
//!     .text("hello AMQP")
//!     .build();
//! dispatcher.submit(&input);
//! ```

pub mod config;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod event_log;
pub mod handshake;
pub mod input;
pub mod message;
pub mod state;
pub mod transport;

pub use config::SenderConfig;
pub use dispatcher::{Dispatcher, Receipt};
pub use endpoint::{parse_address, ConnectionEndpoint};
pub use error::{ConnectionError, Error, Result, TransportError};
pub use event_log::{LogSink, MemoryLog, StdoutLog};
pub use handshake::Handshake;
pub use input::{InputSource, SendInput};
pub use message::{OutboundMessage, Payload};
pub use state::{LinkEvent, LinkState, Readiness};
pub use transport::{AmqpConnector, Connector, OutboundLink};
