//! Command-line interface definitions

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use fe2o3_amqp_sender::{
    config::{DEFAULT_ADDRESS, DEFAULT_QUEUE},
    SendInput, SenderConfig,
};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Broker address in host:port format
    #[arg(short, long, global = true, default_value = DEFAULT_ADDRESS)]
    pub server: String,

    /// User name, anonymous if empty
    #[arg(short, long, global = true, default_value = "")]
    pub username: String,

    /// Password
    #[arg(short, long, global = true, default_value = "")]
    pub password: String,

    /// Target queue
    #[arg(short, long, global = true, default_value = DEFAULT_QUEUE)]
    pub queue: String,

    /// How long to wait for the sender link to open, in milliseconds
    #[arg(long, global = true, default_value_t = 1000)]
    pub ready_timeout_ms: u64,

    /// Wait for the broker to settle each delivery
    #[arg(long, global = true)]
    pub unsettled: bool,

    /// Container id of the connection
    #[arg(long, global = true)]
    pub container_id: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Diagnostics level (error, warn, info, debug, trace), overrides --verbose
    #[arg(long, global = true)]
    pub log_level: Option<Level>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send a single message and exit
    Send {
        /// Attach a file instead of sending text
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Message text
        text: Option<String>,
    },

    /// Type messages line by line
    Interactive,
}

impl Cli {
    pub fn sender_config(&self) -> SenderConfig {
        let mut builder = SenderConfig::builder()
            .ready_timeout(Duration::from_millis(self.ready_timeout_ms))
            .presettled(!self.unsettled);
        if let Some(id) = &self.container_id {
            builder = builder.container_id(id.clone());
        }
        builder.build()
    }

    /// Level of the diagnostics written to stderr, WARN unless asked otherwise
    pub fn log_level(&self) -> Level {
        match self.log_level {
            Some(level) => level,
            None if self.verbose => Level::DEBUG,
            None => Level::WARN,
        }
    }

    /// Connection fields shared by both modes
    pub fn base_input(&self) -> SendInput {
        SendInput::builder()
            .address(self.server.clone())
            .credentials(self.username.clone(), self.password.clone())
            .queue(self.queue.clone())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_broker() {
        let cli = Cli::parse_from(["amqp-send", "send", "hello"]);
        assert_eq!(cli.server, "127.0.0.1:61716");
        assert_eq!(cli.queue, "test_queue");
        assert_eq!(cli.sender_config().ready_timeout, Duration::from_secs(1));
        assert!(cli.sender_config().presettled);
        match cli.command {
            Commands::Send { file, text } => {
                assert_eq!(file, None);
                assert_eq!(text.as_deref(), Some("hello"));
            }
            Commands::Interactive => panic!("expected send"),
        }
    }

    #[test]
    fn log_level_selection() {
        let cli = Cli::parse_from(["amqp-send", "interactive"]);
        assert_eq!(cli.log_level(), Level::WARN);

        let cli = Cli::parse_from(["amqp-send", "interactive", "-v"]);
        assert_eq!(cli.log_level(), Level::DEBUG);

        let cli = Cli::parse_from(["amqp-send", "-v", "interactive", "--log-level", "info"]);
        assert_eq!(cli.log_level(), Level::INFO);

        assert!(Cli::try_parse_from(["amqp-send", "interactive", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "amqp-send",
            "send",
            "--file",
            "report.pdf",
            "--server",
            "broker:5672",
            "--unsettled",
            "--ready-timeout-ms",
            "5000",
        ]);
        assert_eq!(cli.server, "broker:5672");
        let config = cli.sender_config();
        assert!(!config.presettled);
        assert_eq!(config.ready_timeout, Duration::from_secs(5));
        assert!(matches!(cli.command, Commands::Send { file: Some(_), text: None }));
    }
}
