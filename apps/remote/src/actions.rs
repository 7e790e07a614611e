//! Console input mapped onto controller operations.

use anyhow::{anyhow, bail, Result};
use client_core::Controller;
use shared::domain::{Mode, ReadingKind, TargetTemp};
use tracing::debug;

pub const HELP: &str =
    "commands: auto | open | close | stop | set <5-30> | mode | status | help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    SelectMode(Mode),
    SetTarget(TargetTemp),
    RefreshMode,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn parse_action(line: &str) -> Result<UserAction> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        bail!("empty input");
    };
    let action = match verb.to_ascii_lowercase().as_str() {
        "set" | "set-temp" => {
            let value = words.next().ok_or_else(|| {
                anyhow!(
                    "set needs a temperature between {} and {}",
                    TargetTemp::MIN,
                    TargetTemp::MAX
                )
            })?;
            UserAction::SetTarget(value.parse()?)
        }
        "mode" | "refresh" => UserAction::RefreshMode,
        "status" => UserAction::Status,
        "help" | "?" => UserAction::Help,
        "quit" | "exit" | "q" => UserAction::Quit,
        other => UserAction::SelectMode(
            other
                .parse::<Mode>()
                .map_err(|_| anyhow!("unknown command '{other}'"))?,
        ),
    };
    if let Some(extra) = words.next() {
        bail!("unexpected argument '{extra}'");
    }
    Ok(action)
}

pub fn action_name(action: &UserAction) -> &'static str {
    match action {
        UserAction::SelectMode(_) => "select_mode",
        UserAction::SetTarget(_) => "set_target",
        UserAction::RefreshMode => "refresh_mode",
        UserAction::Status => "status",
        UserAction::Help => "help",
        UserAction::Quit => "quit",
    }
}

/// Applies one action. Commands are fire-and-forget: their outcome shows up
/// on the display, and a later command supersedes an unfinished one.
pub async fn perform(controller: &Controller, action: UserAction) -> Flow {
    debug!(action = action_name(&action), "console action");
    match action {
        UserAction::SelectMode(mode) => {
            controller.select_mode(mode);
        }
        UserAction::SetTarget(temp) => {
            controller.set_target_temperature(temp);
        }
        UserAction::RefreshMode => {
            controller.refresh_mode().await;
        }
        UserAction::Status => println!("{}", status_line(controller)),
        UserAction::Help => println!("{HELP}"),
        UserAction::Quit => return Flow::Quit,
    }
    Flow::Continue
}

pub fn status_line(controller: &Controller) -> String {
    let state = controller.state();
    let mode = state.mode.map(Mode::as_str).unwrap_or("unknown");
    format!(
        "{} | {} | mode: {mode}",
        state.readings.set_temp.render(ReadingKind::SetTemp),
        state.readings.room_temp.render(ReadingKind::RoomTemp),
    )
}
