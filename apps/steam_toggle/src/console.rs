use std::{
    io::{self, BufRead},
    path::PathBuf,
    thread,
};

use deck_integration::PressSender;
use shared::domain::ButtonIndex;
use tokio::sync::{mpsc, oneshot};
use toggle_core::ControllerCommand;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `None` presses the bound button.
    Press(Option<u8>),
    Alerts(AlertSwitch),
    Icons { online: PathBuf, invisible: PathBuf },
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSwitch {
    On,
    Off,
    Toggle,
}

pub fn parse_console_line(line: &str) -> Option<ConsoleCommand> {
    let mut words = line.split_whitespace();
    let command = match words.next() {
        None => return Some(ConsoleCommand::Press(None)),
        Some(word) => word.to_ascii_lowercase(),
    };

    let parsed = match command.as_str() {
        "press" | "p" => match words.next() {
            None => ConsoleCommand::Press(None),
            Some(index) => ConsoleCommand::Press(Some(index.parse().ok()?)),
        },
        "alerts" => match words.next()?.to_ascii_lowercase().as_str() {
            "on" => ConsoleCommand::Alerts(AlertSwitch::On),
            "off" => ConsoleCommand::Alerts(AlertSwitch::Off),
            "toggle" => ConsoleCommand::Alerts(AlertSwitch::Toggle),
            _ => return None,
        },
        "icons" => ConsoleCommand::Icons {
            online: PathBuf::from(words.next()?),
            invisible: PathBuf::from(words.next()?),
        },
        "quit" | "exit" => ConsoleCommand::Quit,
        _ => return None,
    };

    if words.next().is_some() {
        return None;
    }
    Some(parsed)
}

/// Reads commands from stdin on a plain thread so a pending read never
/// holds up runtime shutdown. Dropping out of the loop releases both
/// senders, which closes the controller's queue.
pub fn spawn_reader(
    button: ButtonIndex,
    presses: PressSender,
    commands: mpsc::Sender<ControllerCommand>,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                match parse_console_line(&line) {
                    Some(command) => {
                        if !dispatch(command, button, &presses, &commands) {
                            break;
                        }
                    }
                    None => warn!(input = %line.trim(), "unrecognized console command"),
                }
            }
            debug!("console reader finished");
        })
}

/// Returns false when the reader should stop.
fn dispatch(
    command: ConsoleCommand,
    button: ButtonIndex,
    presses: &PressSender,
    commands: &mpsc::Sender<ControllerCommand>,
) -> bool {
    match command {
        ConsoleCommand::Press(index) => presses.press(index.map(ButtonIndex).unwrap_or(button)),
        ConsoleCommand::Alerts(switch) => {
            let command = match switch {
                AlertSwitch::On => ControllerCommand::SetAlertsEnabled(true),
                AlertSwitch::Off => ControllerCommand::SetAlertsEnabled(false),
                AlertSwitch::Toggle => ControllerCommand::ToggleAlerts,
            };
            commands.blocking_send(command).is_ok()
        }
        ConsoleCommand::Icons { online, invisible } => {
            let (reply_tx, reply_rx) = oneshot::channel();
            let request = ControllerCommand::SetIcons {
                online,
                invisible,
                reply: Some(reply_tx),
            };
            if commands.blocking_send(request).is_err() {
                return false;
            }
            match reply_rx.blocking_recv() {
                Ok(Ok(())) => {
                    info!("icons updated");
                    true
                }
                Ok(Err(error)) => {
                    warn!(%error, "icons not changed");
                    true
                }
                Err(_) => false,
            }
        }
        ConsoleCommand::Quit => false,
    }
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
