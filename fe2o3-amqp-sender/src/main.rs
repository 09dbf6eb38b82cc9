//! `amqp-send`, send a text message or a small file to an AMQP 1.0 queue

use std::{io, process::ExitCode};

use clap::Parser;
use fe2o3_amqp_sender::{AmqpConnector, Dispatcher, StdoutLog};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod cli;
mod interactive;

use cli::{Cli, Commands};
use interactive::Form;

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.log_level());

    let config = cli.sender_config();
    let dispatcher = Dispatcher::new(AmqpConnector::new(config.clone()), StdoutLog, &config);
    let base = cli.base_input();

    let code = match cli.command {
        Commands::Send { file, text } => {
            let mut input = base;
            input.text = text.unwrap_or_default();
            input.file = file;
            match dispatcher.submit(&input) {
                Some(_) => ExitCode::SUCCESS,
                None => ExitCode::FAILURE,
            }
        }
        Commands::Interactive => {
            match interactive::run(&dispatcher, Form::new(base), io::stdin().lock()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    tracing::error!(error = %err, "failed to read stdin");
                    ExitCode::FAILURE
                }
            }
        }
    };

    dispatcher.handshake().disconnect();
    code
}

/// Diagnostics go to stderr so they do not mix with the event log
fn setup_logging(level: Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {}", err);
    }
}
