//! Line oriented front end

use std::{
    io::{self, BufRead},
    path::{Path, PathBuf},
};

use fe2o3_amqp_sender::{Connector, Dispatcher, InputSource, LogSink, SendInput};

const HELP: &str = "\
Type a line to send it as a text message.
  :server HOST:PORT   broker address
  :user NAME          user name
  :password PASS      password
  :queue NAME         target queue
  :attach PATH        attach a file, typed text is not sent while attached
  :detach             remove the attached file
  :send               send the attached file
  :status             show the connection state
  :help               show this help
  :quit               exit";

/// What the loop should do after a line
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Log(String),
    /// A connection field changed, the current link is stale
    Reconnect(String),
    Send,
    Status,
    Quit,
    Nothing,
}

/// Fields the user edits between sends
#[derive(Debug, Clone)]
pub struct Form {
    input: SendInput,
}

impl InputSource for Form {
    fn collect_input(&self) -> SendInput {
        self.input.clone()
    }
}

impl Form {
    pub fn new(input: SendInput) -> Self {
        Self { input }
    }

    pub fn attached(&self) -> Option<&Path> {
        self.input.file.as_deref()
    }

    pub fn apply(&mut self, line: &str) -> Step {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(command) = line.trim_start().strip_prefix(':') else {
            if line.trim().is_empty() {
                return Step::Nothing;
            }
            if self.input.file.is_some() {
                return Step::Log(String::from("Message field disabled when file is attached"));
            }
            self.input.text = line.to_string();
            return Step::Send;
        };

        let (command, arg) = match command.split_once(' ') {
            Some((command, arg)) => (command, arg.trim()),
            None => (command, ""),
        };
        match (command, arg) {
            ("attach", "") => Step::Log(String::from("Usage: :attach PATH")),
            ("attach", path) => {
                let path = PathBuf::from(path);
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.input.file = Some(path);
                self.input.text.clear();
                Step::Log(format!("Attached {}", name))
            }
            ("detach", _) => {
                self.detach();
                Step::Log(String::from("No file selected"))
            }
            ("server", address) => {
                self.input.address = address.to_string();
                Step::Reconnect(format!("Server: {}", address))
            }
            ("user", name) => {
                self.input.username = name.to_string();
                Step::Reconnect(format!("Username: {}", name))
            }
            ("password", password) => {
                self.input.password = password.to_string();
                Step::Reconnect(String::from("Password updated"))
            }
            ("queue", queue) => {
                self.input.queue = queue.to_string();
                Step::Reconnect(format!("Queue: {}", queue))
            }
            ("send", _) => Step::Send,
            ("status", _) => Step::Status,
            ("help", _) => Step::Log(String::from(HELP)),
            ("quit", _) | ("exit", _) => Step::Quit,
            (other, _) => Step::Log(format!("Unknown command :{}, type :help", other)),
        }
    }

    pub fn detach(&mut self) {
        self.input.file = None;
    }
}

/// Reads lines from `reader` until it is exhausted or `:quit` is typed
pub fn run<C, L>(dispatcher: &Dispatcher<C, L>, mut form: Form, reader: impl BufRead) -> io::Result<()>
where
    C: Connector,
    L: LogSink,
{
    dispatcher.log().append(HELP);
    for line in reader.lines() {
        let line = line?;
        match form.apply(&line) {
            Step::Log(message) => dispatcher.log().append(&message),
            Step::Reconnect(message) => {
                dispatcher.handshake().disconnect();
                dispatcher.log().append(&message);
            }
            Step::Send => {
                if dispatcher.submit_from(&form).is_some() && form.attached().is_some() {
                    form.detach();
                }
            }
            Step::Status => dispatcher.log().append(&format!(
                "Connection: {:?}",
                dispatcher.handshake().state()
            )),
            Step::Quit => break,
            Step::Nothing => {}
        }
    }
    Ok(())
}
