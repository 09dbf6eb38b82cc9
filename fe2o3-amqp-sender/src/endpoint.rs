//! Broker endpoint and `host:port` parsing

use fe2o3_amqp::sasl_profile::SaslProfile;

/// Scheme used for the plain TCP transport
pub const SCHEME: &str = "amqp";

/// Address of a broker queue together with the credentials used to reach it
///
/// An endpoint is built fresh for every connection attempt and never modified afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionEndpoint {
    host: String,
    port: u16,
    queue_address: String,
    username: String,
    password: String,
}

impl ConnectionEndpoint {
    /// Creates a new endpoint
    pub fn new(
        host: impl Into<String>,
        port: u16,
        queue_address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            queue_address: queue_address.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Host name or IP address of the broker
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port of the broker
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Target address of the sender link
    pub fn queue_address(&self) -> &str {
        &self.queue_address
    }

    /// User name, empty for anonymous access
    pub fn username(&self) -> &str {
        &self.username
    }

    /// `amqp://host:port`
    ///
    /// Credentials are never part of the url, they are passed through [`Self::sasl_profile`].
    pub fn url(&self) -> String {
        format!("{}://{}:{}", SCHEME, self.host, self.port)
    }

    /// SASL PLAIN when a user name is given, ANONYMOUS otherwise
    pub fn sasl_profile(&self) -> SaslProfile {
        if self.username.is_empty() {
            SaslProfile::Anonymous
        } else {
            SaslProfile::Plain {
                username: self.username.clone(),
                password: self.password.clone(),
            }
        }
    }
}

impl std::fmt::Debug for ConnectionEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionEndpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("queue_address", &self.queue_address)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parses `host:port`
///
/// The host may contain ASCII letters, digits, `.` and `-`. The port must have at most five
/// digits and lie in `1..=65535`. Surrounding whitespace is ignored.
pub fn parse_address(text: &str) -> Option<(String, u16)> {
    let (host, port) = text.trim().split_once(':')?;

    let valid_host = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let valid_port = !port.is_empty() && port.len() <= 5 && port.chars().all(|c| c.is_ascii_digit());
    if !valid_host || !valid_port {
        return None;
    }

    // five digits always fit in u32
    let port: u32 = port.parse().ok()?;
    match u16::try_from(port) {
        Ok(port) if port > 0 => Some((host.to_string(), port)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_address() {
        assert_eq!(
            parse_address("127.0.0.1:61716"),
            Some(("127.0.0.1".to_string(), 61716))
        );
        assert_eq!(
            parse_address("  broker-1.example.com:5672 \n"),
            Some(("broker-1.example.com".to_string(), 5672))
        );
        assert_eq!(parse_address("localhost:65535"), Some(("localhost".to_string(), 65535)));
    }

    #[test]
    fn parse_invalid_address() {
        assert_eq!(parse_address("bad_address"), None);
        assert_eq!(parse_address("host:99999"), None);
        assert_eq!(parse_address("host:0"), None);
        assert_eq!(parse_address("host:123456"), None);
        assert_eq!(parse_address(":5672"), None);
        assert_eq!(parse_address("host:"), None);
        assert_eq!(parse_address("host:+80"), None);
        assert_eq!(parse_address("under_score:5672"), None);
        assert_eq!(parse_address("a:b:5672"), None);
    }

    #[test]
    fn url_does_not_carry_credentials() {
        let endpoint = ConnectionEndpoint::new("localhost", 5672, "q1", "guest", "secret");
        assert_eq!(endpoint.url(), "amqp://localhost:5672");
        assert!(!format!("{:?}", endpoint).contains("secret"));
    }

    #[test]
    fn sasl_profile_follows_username() {
        let anonymous = ConnectionEndpoint::new("localhost", 5672, "q1", "", "");
        assert!(matches!(anonymous.sasl_profile(), SaslProfile::Anonymous));

        let plain = ConnectionEndpoint::new("localhost", 5672, "q1", "guest", "guest");
        match plain.sasl_profile() {
            SaslProfile::Plain { username, password } => {
                assert_eq!(username, "guest");
                assert_eq!(password, "guest");
            }
            _ => panic!("expected SASL PLAIN"),
        }
    }
}
