//! Input collected from the front end once per send

use std::{fs, path::PathBuf};

use crate::{
    endpoint::{parse_address, ConnectionEndpoint},
    error::{Error, Result},
    message::Payload,
};

/// Everything the user entered for one send
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SendInput {
    /// `host:port` of the broker
    pub address: String,

    /// User name, empty for anonymous access
    pub username: String,

    /// Password
    pub password: String,

    /// Target queue
    pub queue: String,

    /// Message text, ignored when a file is attached
    pub text: String,

    /// Attached file
    pub file: Option<PathBuf>,
}

impl std::fmt::Debug for SendInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendInput")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("queue", &self.queue)
            .field("text", &self.text)
            .field("file", &self.file)
            .finish()
    }
}

impl SendInput {
    /// Creates a builder for [`SendInput`]
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Parses the address and pairs it with queue and credentials
    pub fn endpoint(&self) -> Result<ConnectionEndpoint> {
        let (host, port) = parse_address(&self.address)
            .ok_or_else(|| Error::AddressFormat(self.address.trim().to_string()))?;
        Ok(ConnectionEndpoint::new(
            host,
            port,
            self.queue.clone(),
            self.username.clone(),
            self.password.clone(),
        ))
    }

    /// Reads the attached file, or takes the trimmed text when there is none
    pub fn payload(&self) -> Result<Payload> {
        match &self.file {
            Some(path) => {
                let data = fs::read(path)?;
                Ok(Payload::file(path, data))
            }
            None => Ok(Payload::Text(self.text.trim().to_string())),
        }
    }
}

/// Builder for [`SendInput`]
#[derive(Debug, Default, Clone)]
pub struct Builder {
    inner: SendInput,
}

impl Builder {
    /// `host:port` of the broker
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.inner.address = address.into();
        self
    }

    /// User name and password
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.inner.username = username.into();
        self.inner.password = password.into();
        self
    }

    /// Target queue
    pub fn queue(mut self, queue: impl Into<String>) -> Self {
        self.inner.queue = queue.into();
        self
    }

    /// Message text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.inner.text = text.into();
        self
    }

    /// Attached file
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner.file = Some(path.into());
        self
    }

    /// Builds the input
    pub fn build(self) -> SendInput {
        self.inner
    }
}

/// A front end able to hand over what the user entered
pub trait InputSource {
    /// Collects the current input
    fn collect_input(&self) -> SendInput;
}

impl InputSource for SendInput {
    fn collect_input(&self) -> SendInput {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_from_input() {
        let input = SendInput::builder()
            .address(" 127.0.0.1:61716 ")
            .credentials("guest", "guest")
            .queue("test_queue")
            .build();
        let endpoint = input.endpoint().unwrap();
        assert_eq!(endpoint.host(), "127.0.0.1");
        assert_eq!(endpoint.port(), 61716);
        assert_eq!(endpoint.queue_address(), "test_queue");
        assert_eq!(endpoint.username(), "guest");
    }

    #[test]
    fn bad_address_is_rejected() {
        let input = SendInput::builder().address("bad_address").build();
        assert!(matches!(input.endpoint(), Err(Error::AddressFormat(addr)) if addr == "bad_address"));
    }

    #[test]
    fn text_is_trimmed() {
        let input = SendInput::builder().text("  hello \n").build();
        assert_eq!(input.payload().unwrap(), Payload::Text("hello".into()));
    }

    #[test]
    fn missing_file_is_io_error() {
        let input = SendInput::builder()
            .text("ignored")
            .file("/definitely/not/here.bin")
            .build();
        assert!(matches!(input.payload(), Err(Error::Io(_))));
    }

    #[test]
    fn debug_hides_password() {
        let input = SendInput::builder().credentials("guest", "hunter2").build();
        assert!(!format!("{:?}", input).contains("hunter2"));
    }
}
