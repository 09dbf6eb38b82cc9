//! `fe2o3-amqp` backed transport
//!
//! Each connection attempt gets its own OS thread running a current thread tokio runtime.
//! The caller talks to it through a bounded channel and blocks on a oneshot reply, so the
//! caller itself never needs a runtime.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use fe2o3_amqp::{
    connection::ConnectionHandle,
    session::SessionHandle,
    types::{definitions::SenderSettleMode, messaging::Message},
    Connection, Sender, Session,
};
use tokio::sync::{mpsc, oneshot};

use crate::{
    config::SenderConfig,
    endpoint::ConnectionEndpoint,
    error::{ConnectionError, Error, Result, TransportError},
    message::OutboundMessage,
    state::Readiness,
};

use super::{Connector, OutboundLink};

type Reply = oneshot::Sender<std::result::Result<(), TransportError>>;

#[derive(Debug)]
enum Command {
    Send {
        message: OutboundMessage,
        reply: Reply,
    },
}

/// Opens connections with `fe2o3-amqp`
#[derive(Debug, Clone)]
pub struct AmqpConnector {
    config: SenderConfig,
}

impl AmqpConnector {
    /// Creates a new connector
    pub fn new(config: SenderConfig) -> Self {
        Self { config }
    }

    /// The configuration used for every connection
    pub fn config(&self) -> &SenderConfig {
        &self.config
    }
}

impl Connector for AmqpConnector {
    type Link = AmqpLink;

    fn connect(
        &self,
        endpoint: &ConnectionEndpoint,
        readiness: Arc<Readiness>,
    ) -> std::result::Result<Self::Link, ConnectionError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ConnectionError::Spawn)?;

        let (outbox, inbox) = mpsc::channel(self.config.outbox_capacity);
        let (shutdown, shutdown_rx) = oneshot::channel();
        let engine = LinkEngine {
            endpoint: endpoint.clone(),
            config: self.config.clone(),
            readiness,
            inbox,
            shutdown: shutdown_rx,
        };

        let handle = thread::Builder::new()
            .name(String::from("amqp-engine"))
            .spawn(move || runtime.block_on(engine.run()))
            .map_err(ConnectionError::Spawn)?;

        Ok(AmqpLink {
            outbox,
            shutdown,
            handle,
        })
    }
}

/// Handle to a running engine thread
///
/// Dropping the link stops the engine without waiting for it.
#[derive(Debug)]
pub struct AmqpLink {
    outbox: mpsc::Sender<Command>,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl OutboundLink for AmqpLink {
    fn send(&self, message: OutboundMessage) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.outbox
            .blocking_send(Command::Send { message, reply })
            .map_err(|_| ConnectionError::EngineStopped)?;
        response
            .blocking_recv()
            .map_err(|_| ConnectionError::EngineStopped)?
            .map_err(Error::from)
    }

    fn close(self) {
        let AmqpLink {
            outbox,
            shutdown,
            handle,
        } = self;
        drop(outbox);
        drop(shutdown);
        if handle.join().is_err() {
            #[cfg(feature = "tracing")]
            tracing::error!("amqp engine thread panicked");
            #[cfg(feature = "log")]
            log::error!("amqp engine thread panicked");
        }
    }
}

struct LinkEngine {
    endpoint: ConnectionEndpoint,
    config: SenderConfig,
    readiness: Arc<Readiness>,
    inbox: mpsc::Receiver<Command>,
    shutdown: oneshot::Receiver<()>,
}

impl LinkEngine {
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "amqp_engine", skip_all, fields(url = %self.endpoint.url())))]
    async fn run(self) {
        let readiness = self.readiness.clone();
        let reason = match self.event_loop().await {
            Ok(()) => None,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::error!(error = %_err, "amqp engine stopped");
                #[cfg(feature = "log")]
                log::error!("amqp engine stopped: {}", _err);
                Some(_err.to_string())
            }
        };
        readiness.on_disconnected(reason);
    }

    async fn event_loop(self) -> std::result::Result<(), TransportError> {
        let LinkEngine {
            endpoint,
            config,
            readiness,
            mut inbox,
            mut shutdown,
        } = self;

        let (mut connection, mut session, mut sender) = tokio::select! {
            opened = open(&endpoint, &config) => opened?,
            _ = &mut shutdown => return Ok(()),
        };
        readiness.on_link_opened();

        #[cfg(feature = "tracing")]
        tracing::info!(queue = endpoint.queue_address(), "sender link attached");
        #[cfg(feature = "log")]
        log::info!("sender link attached to {}", endpoint.queue_address());

        loop {
            tokio::select! {
                command = inbox.recv() => match command {
                    Some(Command::Send { message, reply }) => {
                        let result = deliver(&mut sender, message).await;
                        // The caller may have given up waiting
                        let _ = reply.send(result);
                    }
                    None => break,
                },
                closed = connection.on_close() => {
                    let reason = match closed {
                        Ok(()) => String::from("Connection closed by remote peer"),
                        Err(err) => err.to_string(),
                    };
                    readiness.on_disconnected(Some(reason));
                    return Ok(());
                }
            }
        }

        // Graceful shutdown requested by the caller
        readiness.on_disconnected(None);
        if let Err(_err) = sender.close().await {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = ?_err, "error closing sender link");
            #[cfg(feature = "log")]
            log::warn!("error closing sender link: {:?}", _err);
        }
        if let Err(_err) = session.end().await {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = ?_err, "error ending session");
            #[cfg(feature = "log")]
            log::warn!("error ending session: {:?}", _err);
        }
        if let Err(_err) = connection.close().await {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = ?_err, "error closing connection");
            #[cfg(feature = "log")]
            log::warn!("error closing connection: {:?}", _err);
        }
        Ok(())
    }
}

async fn open(
    endpoint: &ConnectionEndpoint,
    config: &SenderConfig,
) -> std::result::Result<(ConnectionHandle<()>, SessionHandle<()>, Sender), TransportError> {
    let url = endpoint.url();
    let mut connection = Connection::builder()
        .container_id(config.container_id.clone())
        .sasl_profile(endpoint.sasl_profile())
        .open(url.as_str())
        .await?;
    let mut session = Session::begin(&mut connection).await?;

    let settle_mode = if config.presettled {
        SenderSettleMode::Settled
    } else {
        SenderSettleMode::Unsettled
    };
    let sender = Sender::builder()
        .name(config.link_name.clone())
        .target(endpoint.queue_address())
        .sender_settle_mode(settle_mode)
        .attach(&mut session)
        .await?;

    Ok((connection, session, sender))
}

async fn deliver(
    sender: &mut Sender,
    message: OutboundMessage,
) -> std::result::Result<(), TransportError> {
    let amqp_message = Message::builder()
        .properties(message.properties())
        .application_properties(message.application_properties())
        .value(message.body().into_owned())
        .build();

    let outcome = sender.send(amqp_message).await?;
    outcome.accepted_or_else(|outcome| TransportError::NotAccepted(format!("{:?}", outcome)))?;

    #[cfg(feature = "tracing")]
    tracing::debug!(message_id = %message.message_id(), is_file = message.is_file(), "message sent");
    #[cfg(feature = "log")]
    log::debug!("message {} sent", message.message_id());
    Ok(())
}
