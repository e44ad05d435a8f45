// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `prr shell` command implementation.
//!
//! A line-oriented command shell over one in-memory network, with readline
//! history and colored errors. Commands run to completion one at a time;
//! notifications for immediate-delivery clients are printed after the
//! command that produced them.

use std::io::IsTerminal;
use std::path::Path;
use std::str::FromStr;

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use thiserror::Error;
use tracing::debug;

use prr_config::PrrConfig;
use prr_core::{
    ClientKey, CommunicationId, DeliveryMethod, InteractiveKind, Notification, NotificationSink,
    PrrError, StateTag, TerminalKind,
};
use prr_network::{Network, Terminal, import_file};

use crate::display::describe;

const HELP: &str = "\
commands:
  client <key> <taxId> <name...>        register a client
  terminal <key> <basic|fancy> <client> [on|off|silent]
                                         register a terminal
  text <from> <to> <message...>          send a text
  call <from> <to> <voice|video>         start an interactive session
  end <terminal> <units>                 end the session the terminal started
  pay <terminal> <id>                    pay a communication
  state <terminal> <on|off|silent>       change a terminal's state
  friend <terminal> <friend>             add a friend
  unfriend <terminal> <friend>           remove a friend
  notify <client> <on|off>               enable or disable notifications
  delivery <client> <queued|immediate>   choose how notifications arrive
  inbox <client>                         read a client's notifications
  show <client|terminal> [key]           list records, or one record
  unused | positive                      terminals never used / in credit
  debtors | payers                       clients with / without debt
  comms [from|to <client>]               list communications
  balance [client]                       paid and debt totals
  status                                 network summary
  help | quit";

/// A command line that could not be turned into a network operation.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("`{value}` is not a valid {what}")]
    BadArgument { what: &'static str, value: String },
    #[error(transparent)]
    Network(#[from] PrrError),
}

/// What a command produced.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Lines(Vec<String>),
    Quit,
}

/// Collects notifications handed over for immediate delivery.
#[derive(Default)]
struct LineSink(Vec<String>);

impl NotificationSink for LineSink {
    fn deliver(&mut self, client: &ClientKey, notification: &Notification) {
        self.0.push(format!("[{client}] {notification}"));
    }
}

pub struct Shell {
    network: Network,
}

impl Shell {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Run one command line against the network.
    pub fn execute(&mut self, line: &str) -> Result<Outcome, CommandError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            return Ok(Outcome::Lines(Vec::new()));
        };
        debug!(command, "shell command");

        let mut lines: Vec<String> = match command {
            "quit" | "exit" => return Ok(Outcome::Quit),
            "help" => HELP.lines().map(str::to_string).collect(),
            "client" => self.register_client(args)?,
            "terminal" => self.register_terminal(args)?,
            "text" => self.text(args)?,
            "call" => self.call(args)?,
            "end" => self.end(args)?,
            "pay" => self.pay(args)?,
            "state" => self.state(args)?,
            "friend" | "unfriend" => self.friend(command == "friend", args)?,
            "notify" => self.notify(args)?,
            "delivery" => self.delivery(args)?,
            "inbox" => self.inbox(args)?,
            "show" => self.show(args)?,
            "unused" => records(self.network.unused_terminals()),
            "positive" => records(self.network.terminals_with_positive_balance()),
            "debtors" => self.client_records(true),
            "payers" => self.client_records(false),
            "comms" => self.comms(args)?,
            "balance" => self.balance(args)?,
            "status" => vec![self.status()],
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        let mut sink = LineSink::default();
        self.network.flush_notifications(&mut sink);
        lines.extend(sink.0);
        Ok(Outcome::Lines(lines))
    }

    fn register_client(&mut self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        let [key, tax_id, name @ ..] = args else {
            return Err(CommandError::Usage("client <key> <taxId> <name...>"));
        };
        if name.is_empty() {
            return Err(CommandError::Usage("client <key> <taxId> <name...>"));
        }
        let tax_id = parse::<u32>("tax id", tax_id)?;
        self.network.register_client(key, &name.join(" "), tax_id)?;
        Ok(vec![self.network.client_record(key)?])
    }

    fn register_terminal(&mut self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        const USAGE: &str = "terminal <key> <basic|fancy> <client> [on|off|silent]";
        let (key, kind, owner, state) = match args {
            [key, kind, owner] => (*key, *kind, *owner, "on"),
            [key, kind, owner, state] => (*key, *kind, *owner, *state),
            _ => return Err(CommandError::Usage(USAGE)),
        };
        let kind = parse::<TerminalKind>("terminal kind", kind)?;
        let state = parse::<StateTag>("state", state)?;
        self.network.register_terminal(key, kind, owner, state)?;
        Ok(vec![self.network.lookup_terminal(key)?.to_string()])
    }

    fn text(&mut self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        let [from, to, message @ ..] = args else {
            return Err(CommandError::Usage("text <from> <to> <message...>"));
        };
        let result = self.network.send_text(from, to, &message.join(" "));
        let price = self.watch_unavailable(from, result)?;
        Ok(vec![format!("text sent, cost {}", prr_core::types::rounded(price))])
    }

    fn call(&mut self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        let [from, to, kind] = args else {
            return Err(CommandError::Usage("call <from> <to> <voice|video>"));
        };
        let kind = parse::<InteractiveKind>("communication kind", kind)?;
        let result = self.network.send_interactive(from, to, kind);
        let id = self.watch_unavailable(from, result)?;
        Ok(vec![format!("{kind} communication {id} started")])
    }

    /// On an unavailable destination, subscribe the sender's owner so it
    /// hears when the destination frees up.
    fn watch_unavailable<T>(
        &mut self,
        from: &str,
        result: Result<T, PrrError>,
    ) -> Result<T, CommandError> {
        if let Err(PrrError::Unavailable { key, .. }) = &result {
            let owner = self.network.lookup_terminal(from)?.owner().clone();
            let enabled = self
                .network
                .lookup_client(owner.as_str())?
                .notifications_enabled();
            if enabled && key.as_str() != from {
                self.network.subscribe(key.as_str(), owner.as_str())?;
            }
        }
        result.map_err(CommandError::from)
    }

    fn end(&mut self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        let [terminal, units] = args else {
            return Err(CommandError::Usage("end <terminal> <units>"));
        };
        let units = parse::<u32>("duration", units)?;
        let price = self.network.end_active_communication(terminal, units)?;
        Ok(vec![format!("communication ended, cost {price}")])
    }

    fn pay(&mut self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        let [terminal, id] = args else {
            return Err(CommandError::Usage("pay <terminal> <id>"));
        };
        let id = CommunicationId(parse::<u32>("communication id", id)?);
        self.network.pay_communication(terminal, id)?;
        Ok(vec![self.network.lookup_terminal(terminal)?.to_string()])
    }

    fn state(&mut self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        let [terminal, state] = args else {
            return Err(CommandError::Usage("state <terminal> <on|off|silent>"));
        };
        let state = parse::<StateTag>("state", state)?;
        self.network.change_state(terminal, state)?;
        Ok(vec![self.network.lookup_terminal(terminal)?.to_string()])
    }

    fn friend(&mut self, add: bool, args: &[&str]) -> Result<Vec<String>, CommandError> {
        let [terminal, friend] = args else {
            return Err(CommandError::Usage("friend|unfriend <terminal> <friend>"));
        };
        if add {
            self.network.add_friend(terminal, friend)?;
        } else {
            self.network.remove_friend(terminal, friend)?;
        }
        Ok(vec![self.network.lookup_terminal(terminal)?.to_string()])
    }

    fn notify(&mut self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        match args {
            [client, "on"] => self.network.enable_notifications(client)?,
            [client, "off"] => self.network.disable_notifications(client)?,
            _ => return Err(CommandError::Usage("notify <client> <on|off>")),
        }
        Ok(vec![self.network.client_record(args[0])?])
    }

    fn delivery(&mut self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        let [client, method] = args else {
            return Err(CommandError::Usage("delivery <client> <queued|immediate>"));
        };
        let method = parse::<DeliveryMethod>("delivery method", method)?;
        self.network.set_delivery(client, method)?;
        Ok(vec![format!("client {client} now uses {method} delivery")])
    }

    fn inbox(&mut self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        let [client] = args else {
            return Err(CommandError::Usage("inbox <client>"));
        };
        let notifications = self.network.take_notifications(client)?;
        Ok(notifications.iter().map(ToString::to_string).collect())
    }

    fn show(&self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        match args {
            ["client"] => Ok(self
                .network
                .clients()
                .map(|c| self.network.client_record(c.key().as_str()))
                .collect::<Result<Vec<_>, PrrError>>()?),
            ["client", key] => Ok(vec![self.network.client_record(key)?]),
            ["terminal"] => Ok(records(self.network.terminals())),
            ["terminal", key] => Ok(vec![self.network.lookup_terminal(key)?.to_string()]),
            _ => Err(CommandError::Usage("show <client|terminal> [key]")),
        }
    }

    fn client_records(&self, with_debt: bool) -> Vec<String> {
        let clients: Vec<&str> = if with_debt {
            self.network.clients_with_debt().map(|c| c.key().as_str()).collect()
        } else {
            self.network
                .clients_without_debt()
                .map(|c| c.key().as_str())
                .collect()
        };
        clients
            .into_iter()
            .filter_map(|key| self.network.client_record(key).ok())
            .collect()
    }

    fn comms(&self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        let comms = match args {
            [] => self.network.communications(),
            ["from", client] => self.network.communications_from_client(client)?,
            ["to", client] => self.network.communications_to_client(client)?,
            _ => return Err(CommandError::Usage("comms [from|to <client>]")),
        };
        Ok(comms.iter().map(ToString::to_string).collect())
    }

    fn balance(&self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        let balance = match args {
            [] => self.network.global_balance(),
            [client] => self.network.client_balance(client)?,
            _ => return Err(CommandError::Usage("balance [client]")),
        };
        Ok(vec![format!(
            "paid {} | debt {}",
            prr_core::types::rounded(balance.paid),
            prr_core::types::rounded(balance.debt)
        )])
    }

    fn status(&self) -> String {
        format!(
            "{} clients, {} terminals, {} communications, unsaved changes: {}",
            self.network.clients().count(),
            self.network.terminals().count(),
            self.network.communications().len(),
            if self.network.is_dirty() { "yes" } else { "no" }
        )
    }
}

fn records<'a>(terminals: impl Iterator<Item = &'a Terminal>) -> Vec<String> {
    terminals.map(ToString::to_string).collect()
}

fn parse<T: FromStr>(what: &'static str, value: &str) -> Result<T, CommandError> {
    value.parse().map_err(|_| CommandError::BadArgument {
        what,
        value: value.to_string(),
    })
}

/// Runs the `prr shell` interactive loop.
pub fn run_shell(config: &PrrConfig, file: Option<&Path>) -> Result<(), PrrError> {
    let network = match file {
        Some(path) => import_file(path, config)?,
        None => Network::new(config),
    };
    let mut shell = Shell::new(network);

    let mut rl = DefaultEditor::new().map_err(|e| {
        PrrError::Io(std::io::Error::other(format!("failed to initialize readline: {e}")))
    })?;

    let use_color = std::io::stdout().is_terminal();
    if use_color {
        println!("{}", "prr shell".bold().green());
        println!("Type {} for commands, {} to exit.\n", "help".yellow(), "quit".yellow());
    } else {
        println!("prr shell");
    }

    let prompt = if use_color {
        format!("{}> ", "prr".green())
    } else {
        "prr> ".to_string()
    };
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);
                match shell.execute(&line) {
                    Ok(Outcome::Quit) => break,
                    Ok(Outcome::Lines(lines)) => {
                        for line in lines {
                            println!("{line}");
                        }
                    }
                    Err(e) => print_error(&e, use_color),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    if shell.network().is_dirty() {
        println!("{}", "network has unsaved changes".dimmed());
    }
    Ok(())
}

fn print_error(error: &CommandError, use_color: bool) {
    let message = match error {
        CommandError::Network(err) => describe(err),
        other => other.to_string(),
    };
    if use_color {
        eprintln!("{}", message.red());
    } else {
        eprintln!("{message}");
    }
}
