use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::DomainError, protocol};

/// Operating mode of the device. Each mode has exactly one control on the
/// display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Auto,
    Open,
    Close,
    Stop,
}

impl Mode {
    /// All controls, in display order.
    pub const ALL: [Mode; 4] = [Mode::Auto, Mode::Open, Mode::Close, Mode::Stop];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Auto => "auto",
            Mode::Open => "open",
            Mode::Close => "close",
            Mode::Stop => "stop",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Mode::Auto => protocol::AUTO_ROUTE,
            Mode::Open => protocol::OPEN_ROUTE,
            Mode::Close => protocol::CLOSE_ROUTE,
            Mode::Stop => protocol::STOP_ROUTE,
        }
    }

    /// Parses a `/get-mode` body. The device may pad the name with whitespace;
    /// anything that is not one of the four names yields `None`.
    pub fn from_reported(raw: &str) -> Option<Mode> {
        raw.trim().parse().ok()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| DomainError::UnknownMode(s.to_string()))
    }
}

/// Target temperature in whole degrees Celsius, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TargetTemp(u8);

impl TargetTemp {
    pub const MIN: u8 = 5;
    pub const MAX: u8 = 30;

    pub fn new(value: u8) -> Result<Self, DomainError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::TargetOutOfRange {
                value: i64::from(value),
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    /// Clamps `value` into range instead of rejecting it.
    pub const fn saturating(value: u8) -> Self {
        if value < Self::MIN {
            Self(Self::MIN)
        } else if value > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(value)
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for TargetTemp {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TargetTemp> for u8 {
    fn from(value: TargetTemp) -> Self {
        value.0
    }
}

impl FromStr for TargetTemp {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| DomainError::InvalidTarget(s.to_string()))?;
        let value = u8::try_from(value).map_err(|_| DomainError::TargetOutOfRange {
            value,
            min: Self::MIN,
            max: Self::MAX,
        })?;
        Self::new(value)
    }
}

impl fmt::Display for TargetTemp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user-initiated request to the device. Commands are values; nothing
/// stores them past dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Command {
    Mode(Mode),
    SetTemp(TargetTemp),
}

impl Command {
    pub fn path(&self) -> String {
        match self {
            Command::Mode(mode) => mode.path().to_string(),
            Command::SetTemp(temp) => protocol::set_temp_path(*temp),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Mode(mode) => mode.as_str(),
            Command::SetTemp(_) => "set-temp",
        }
    }
}

impl From<Mode> for Command {
    fn from(mode: Mode) -> Self {
        Command::Mode(mode)
    }
}

impl FromStr for Command {
    type Err = DomainError;

    /// Accepts `auto`, `open`, `close`, `stop` and `set-temp=<value>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(value) = s.strip_prefix("set-temp=") {
            return Ok(Command::SetTemp(value.parse()?));
        }
        s.parse::<Mode>()
            .map(Command::Mode)
            .map_err(|_| DomainError::UnknownCommand(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingKind {
    SetTemp,
    RoomTemp,
}

impl ReadingKind {
    pub fn path(self) -> &'static str {
        match self {
            ReadingKind::SetTemp => protocol::GET_TEMP_ROUTE,
            ReadingKind::RoomTemp => protocol::GET_ROOM_TEMP_ROUTE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReadingKind::SetTemp => "Set Temp",
            ReadingKind::RoomTemp => "Room Temp",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reading {
    Available(String),
    #[default]
    Unavailable,
}

impl Reading {
    pub fn render(&self, kind: ReadingKind) -> String {
        match self {
            Reading::Available(value) => format!("{}: {value}°C", kind.label()),
            Reading::Unavailable => format!("{}: --", kind.label()),
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Reading::Available(value) => Some(value),
            Reading::Unavailable => None,
        }
    }
}
