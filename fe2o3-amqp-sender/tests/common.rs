#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use fe2o3_amqp_sender::{
    ConnectionEndpoint, ConnectionError, Connector, OutboundLink, OutboundMessage, Readiness,
};
use parking_lot::Mutex;
use testcontainers::{clients::Cli, core::WaitFor, Container, GenericImage};

/// How the fake engine behaves once started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Opens the link from another thread after a short delay
    Open,
    /// Reports a disconnection instead of opening the link
    Refuse,
    /// Never reports anything
    Hang,
    /// Cannot start the engine at all
    Fail,
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub started: AtomicUsize,
    pub endpoints: Mutex<Vec<ConnectionEndpoint>>,
    pub sent: Mutex<Vec<OutboundMessage>>,
    pub readiness: Mutex<Option<Arc<Readiness>>>,
}

impl Recorded {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }

    /// Simulates the broker dropping the connection
    pub fn drop_connection(&self) {
        if let Some(readiness) = self.readiness.lock().as_ref() {
            readiness.on_disconnected(Some(String::from("connection reset by peer")));
        }
    }
}

/// A connector that records everything instead of talking to a broker
#[derive(Debug, Clone)]
pub struct RecordingConnector {
    pub behavior: Behavior,
    pub recorded: Arc<Recorded>,
}

impl RecordingConnector {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            recorded: Arc::new(Recorded::default()),
        }
    }
}

#[derive(Debug)]
pub struct RecordingLink {
    recorded: Arc<Recorded>,
}

impl OutboundLink for RecordingLink {
    fn send(&self, message: OutboundMessage) -> fe2o3_amqp_sender::Result<()> {
        self.recorded.sent.lock().push(message);
        Ok(())
    }
}

impl Connector for RecordingConnector {
    type Link = RecordingLink;

    fn connect(
        &self,
        endpoint: &ConnectionEndpoint,
        readiness: Arc<Readiness>,
    ) -> Result<Self::Link, ConnectionError> {
        if self.behavior == Behavior::Fail {
            return Err(ConnectionError::Spawn(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no threads left",
            )));
        }
        self.recorded.started.fetch_add(1, Ordering::SeqCst);
        self.recorded.endpoints.lock().push(endpoint.clone());
        *self.recorded.readiness.lock() = Some(readiness.clone());

        match self.behavior {
            Behavior::Open => {
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(10));
                    readiness.on_link_opened();
                });
            }
            Behavior::Refuse => {
                thread::spawn(move || {
                    readiness.on_disconnected(Some(String::from("Connection refused")));
                });
            }
            Behavior::Hang | Behavior::Fail => {}
        }

        Ok(RecordingLink {
            recorded: self.recorded.clone(),
        })
    }
}

pub fn setup_activemq_artemis<'d>(
    docker: &'d Cli,
    username: Option<&str>,
    password: Option<&str>,
) -> (Container<'d, GenericImage>, u16) {
    let image = match (username, password) {
        (Some(username), Some(password)) => {
            GenericImage::new("docker.io/vromero/activemq-artemis", "latest")
                .with_env_var("ARTEMIS_USERNAME", username)
                .with_env_var("ARTEMIS_PASSWORD", password)
                .with_exposed_port(5672)
                .with_wait_for(WaitFor::seconds(5))
        }
        _ => GenericImage::new("docker.io/vromero/activemq-artemis", "latest")
            .with_env_var("DISABLE_SECURITY", "true")
            .with_exposed_port(5672)
            .with_wait_for(WaitFor::seconds(5)),
    };
    let node = docker.run(image);
    let port = node.get_host_port_ipv4(5672);
    (node, port)
}
