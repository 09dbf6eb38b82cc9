//! Outbound message and its AMQP representation

use std::{borrow::Cow, path::Path};

use base64::{engine::general_purpose::STANDARD, Engine};
use fe2o3_amqp::types::messaging::{ApplicationProperties, MessageId, Properties};
use uuid::Uuid;

/// Format of [`OutboundMessage::timestamp`]
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Application property carrying the base name of an attached file
pub const FILE_NAME: &str = "file_name";

/// Application property telling whether the body is a base64 encoded file
pub const IS_FILE: &str = "is_file";

/// Application property carrying the message id
pub const MESSAGE_ID: &str = "message_id";

/// Application property carrying the creation timestamp
pub const TIMESTAMP: &str = "timestamp";

/// Content of a message. Text and file are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Plain text
    Text(String),

    /// Bytes of an attached file
    File {
        /// Base name of the file
        name: String,

        /// File content
        data: Vec<u8>,
    },
}

impl Payload {
    /// Creates a file payload named after the base name of `path`
    pub fn file(path: impl AsRef<Path>, data: Vec<u8>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self::File { name, data }
    }

    /// Whether there is nothing to send
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Text(text) => text.trim().is_empty(),
            Payload::File { data, .. } => data.is_empty(),
        }
    }
}

/// A message ready to be handed to the transport
///
/// Every message gets a fresh v4 UUID and a local timestamp when it is created. It is
/// consumed by the transport exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    payload: Payload,
    message_id: Uuid,
    timestamp: String,
}

impl OutboundMessage {
    /// Creates a message with a new id and the current local time
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            message_id: Uuid::new_v4(),
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// The payload
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Whether the body is a file
    pub fn is_file(&self) -> bool {
        matches!(self.payload, Payload::File { .. })
    }

    /// Base name of the attached file
    pub fn file_name(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(_) => None,
            Payload::File { name, .. } => Some(name),
        }
    }

    /// The message id
    pub fn message_id(&self) -> Uuid {
        self.message_id
    }

    /// Creation time formatted with [`TIMESTAMP_FORMAT`]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// The text put on the wire. Files are base64 encoded.
    pub fn body(&self) -> Cow<'_, str> {
        match &self.payload {
            Payload::Text(text) => Cow::Borrowed(text),
            Payload::File { data, .. } => Cow::Owned(STANDARD.encode(data)),
        }
    }

    /// Application properties describing the payload
    pub fn application_properties(&self) -> ApplicationProperties {
        let mut builder = ApplicationProperties::builder();
        if let Some(name) = self.file_name() {
            builder = builder.insert(FILE_NAME, name.to_string());
        }
        builder
            .insert(IS_FILE, self.is_file())
            .insert(MESSAGE_ID, self.message_id.to_string())
            .insert(TIMESTAMP, self.timestamp.clone())
            .build()
    }

    /// Bare message properties, the message id is the UUID string
    pub fn properties(&self) -> Properties {
        Properties::builder()
            .message_id(MessageId::String(self.message_id.to_string()))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use fe2o3_amqp::types::primitives::SimpleValue;

    use super::*;

    #[test]
    fn text_message() {
        let message = OutboundMessage::new(Payload::Text("hello AMQP".into()));
        assert!(!message.is_file());
        assert_eq!(message.file_name(), None);
        assert_eq!(message.body(), "hello AMQP");
        assert_eq!(message.message_id().get_version_num(), 4);
    }

    #[test]
    fn file_message_uses_base_name_and_base64() {
        let payload = Payload::file(Path::new("some/dir/report.bin"), b"hello".to_vec());
        let message = OutboundMessage::new(payload);
        assert!(message.is_file());
        assert_eq!(message.file_name(), Some("report.bin"));
        assert_eq!(message.body(), "aGVsbG8=");
    }

    #[test]
    fn every_message_gets_a_new_id() {
        let first = OutboundMessage::new(Payload::Text("a".into()));
        let second = OutboundMessage::new(Payload::Text("a".into()));
        assert_ne!(first.message_id(), second.message_id());
    }

    #[test]
    fn timestamp_format() {
        let message = OutboundMessage::new(Payload::Text("a".into()));
        let parsed =
            chrono::NaiveDateTime::parse_from_str(message.timestamp(), TIMESTAMP_FORMAT);
        assert!(parsed.is_ok());
    }

    fn property(properties: &ApplicationProperties, key: &str) -> Option<SimpleValue> {
        properties.0.get(key).cloned()
    }

    #[test]
    fn text_application_properties() {
        let message = OutboundMessage::new(Payload::Text("hello AMQP".into()));
        let properties = message.application_properties();

        assert_eq!(property(&properties, IS_FILE), Some(SimpleValue::Bool(false)));
        assert_eq!(
            property(&properties, MESSAGE_ID),
            Some(SimpleValue::String(message.message_id().to_string()))
        );
        assert_eq!(
            property(&properties, TIMESTAMP),
            Some(SimpleValue::String(message.timestamp().to_string()))
        );
        assert_eq!(property(&properties, FILE_NAME), None);
        assert_eq!(properties.0.len(), 3);
    }

    #[test]
    fn file_application_properties() {
        let message = OutboundMessage::new(Payload::file("dir/report.bin", b"hello".to_vec()));
        let properties = message.application_properties();

        assert_eq!(property(&properties, IS_FILE), Some(SimpleValue::Bool(true)));
        assert_eq!(
            property(&properties, FILE_NAME),
            Some(SimpleValue::String("report.bin".into()))
        );
        assert_eq!(
            property(&properties, MESSAGE_ID),
            Some(SimpleValue::String(message.message_id().to_string()))
        );
        assert_eq!(
            property(&properties, TIMESTAMP),
            Some(SimpleValue::String(message.timestamp().to_string()))
        );
        assert_eq!(properties.0.len(), 4);
    }

    #[test]
    fn message_id_property_is_the_uuid_string() {
        let message = OutboundMessage::new(Payload::Text("a".into()));
        assert_eq!(
            message.properties().message_id,
            Some(MessageId::String(message.message_id().to_string()))
        );
    }

    #[test]
    fn empty_payloads() {
        assert!(Payload::Text(String::new()).is_empty());
        assert!(Payload::Text(" \n\t".into()).is_empty());
        assert!(Payload::file("empty.txt", Vec::new()).is_empty());
        assert!(!Payload::Text("x".into()).is_empty());
        assert!(!Payload::file("one.txt", vec![0]).is_empty());
    }
}
