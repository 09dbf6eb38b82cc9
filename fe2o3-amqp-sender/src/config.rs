//! Sender configuration

use std::time::Duration;

use uuid::Uuid;

/// Default time to wait for the sender link to open, 10 polls of 100 ms
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_millis(10 * 100);

/// Default name of the sender link
pub const DEFAULT_LINK_NAME: &str = "amqp-sender-link";

/// Default number of messages queued towards the engine thread
pub const DEFAULT_OUTBOX_CAPACITY: usize = 16;

/// Default `host:port` of the broker
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:61716";

/// Default target queue
pub const DEFAULT_QUEUE: &str = "test_queue";

/// Configuration shared by the connector and the dispatcher
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Container id of the connection
    pub container_id: String,

    /// Name of the sender link
    pub link_name: String,

    /// How long a send waits for the sender link to open
    pub ready_timeout: Duration,

    /// Send pre-settled. When `false` the send waits for the broker's outcome.
    pub presettled: bool,

    /// Capacity of the channel towards the engine thread
    pub outbox_capacity: usize,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            container_id: format!("amqp-sender-{}", Uuid::new_v4()),
            link_name: String::from(DEFAULT_LINK_NAME),
            ready_timeout: DEFAULT_READY_TIMEOUT,
            presettled: true,
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
        }
    }
}

impl SenderConfig {
    /// Creates a builder starting from the defaults
    pub fn builder() -> Builder {
        Builder::default()
    }
}

/// Builder for [`SenderConfig`]
#[derive(Debug, Default, Clone)]
pub struct Builder {
    inner: SenderConfig,
}

impl Builder {
    /// Container id of the connection
    pub fn container_id(mut self, id: impl Into<String>) -> Self {
        self.inner.container_id = id.into();
        self
    }

    /// Name of the sender link
    pub fn link_name(mut self, name: impl Into<String>) -> Self {
        self.inner.link_name = name.into();
        self
    }

    /// How long a send waits for the sender link to open
    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.inner.ready_timeout = timeout;
        self
    }

    /// Whether messages are sent pre-settled
    pub fn presettled(mut self, presettled: bool) -> Self {
        self.inner.presettled = presettled;
        self
    }

    /// Capacity of the channel towards the engine thread, at least 1
    pub fn outbox_capacity(mut self, capacity: usize) -> Self {
        self.inner.outbox_capacity = capacity.max(1);
        self
    }

    /// Builds the configuration
    pub fn build(self) -> SenderConfig {
        self.inner
    }
}
