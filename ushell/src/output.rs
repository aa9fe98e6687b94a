//! Terminal directives and the diagnostic catalog

use core::fmt;

use crate::{
    config::Colors,
    error::{HistoryError, ShellError},
    io::SyncIO,
};

pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const SHOW_CURSOR: &str = "\x1b[?25h";
pub const CLEAR_LINE_END: &str = "\x1b[K";
pub const CURSOR_LEFT: &str = "\x1b[D";
pub const CURSOR_RIGHT: &str = "\x1b[C";
pub const NEWLINE: &str = "\n\r";
/// Red `]` under the cursor when the line is full
pub const OVERFLOW_MARK: &str = "\x1b[91m]\x1b[0m\x1b[D";
/// Erase the character left of the cursor
pub const RUB_OUT: &str = "\x1b[D \x1b[D";

/// Move the cursor `steps` columns left
pub fn move_left(io: &mut impl SyncIO, steps: usize) -> Result<(), ShellError> {
    match steps {
        0 => Ok(()),
        1 => io.write_str(CURSOR_LEFT),
        _ => write!(io, "\x1b[{}D", steps),
    }
}

/// Move the cursor `steps` columns right
pub fn move_right(io: &mut impl SyncIO, steps: usize) -> Result<(), ShellError> {
    match steps {
        0 => Ok(()),
        1 => io.write_str(CURSOR_RIGHT),
        _ => write!(io, "\x1b[{}C", steps),
    }
}

/// Go to column `column` of the current row and clear the rest of it
pub fn clear_from(io: &mut impl SyncIO, column: usize) -> Result<(), ShellError> {
    io.write_str("\r")?;
    move_right(io, column)?;
    io.write_str(CLEAR_LINE_END)
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Feature {
    None,
    Autocomplete,
    Echo,
    History,
    Callback,
    Shortcut,
    SubShortcut,
    Malloc,
    Args,
    Command,
}

impl Feature {
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::None => "",
            Feature::Autocomplete => "autocomplete",
            Feature::Echo => "echo",
            Feature::History => "history",
            Feature::Callback => "callback",
            Feature::Shortcut => "shortcut",
            Feature::SubShortcut => "sub-shortcut",
            Feature::Malloc => "malloc",
            Feature::Args => "args",
            Feature::Command => "command",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Status {
    Off,
    On,
    NotImplemented,
    NoEntry,
    Failed,
    Empty,
    Reset,
    Uninitialized,
    Unsupported,
    Missing,
    NoFile,
    NotRegistered,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Off => "off",
            Status::On => "on",
            Status::NotImplemented => "not implemented",
            Status::NoEntry => "noentry",
            Status::Failed => "failed",
            Status::Empty => "empty",
            Status::Reset => "reset",
            Status::Uninitialized => "uninitialized",
            Status::Unsupported => "unsupported",
            Status::Missing => "missing",
            Status::NoFile => "nofile",
            Status::NotRegistered => "not registered",
        }
    }

    pub fn switch(on: bool) -> Self {
        if on {
            Status::On
        } else {
            Status::Off
        }
    }
}

/// A `(feature, status)` pair from the catalog
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Diagnostic(pub Feature, pub Status);

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Feature::None => write!(f, ": {}", self.1.as_str()),
            feature => write!(f, ": {} {}", feature.as_str(), self.1.as_str()),
        }
    }
}

impl From<HistoryError> for Diagnostic {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::Empty => Diagnostic(Feature::History, Status::Empty),
            HistoryError::NoEntry => Diagnostic(Feature::History, Status::NoEntry),
            HistoryError::OutOfMemory => Diagnostic(Feature::Malloc, Status::Failed),
            HistoryError::Uninitialized => Diagnostic(Feature::History, Status::Uninitialized),
            HistoryError::NoStorage => Diagnostic(Feature::History, Status::NoFile),
            HistoryError::Storage => Diagnostic(Feature::History, Status::Failed),
        }
    }
}

pub fn diagnostic(
    io: &mut impl SyncIO,
    colors: &Colors,
    feature: Feature,
    status: Status,
) -> Result<(), ShellError> {
    write!(
        io,
        "\r{}{}{}\n",
        colors.warning,
        Diagnostic(feature, status),
        colors.reset
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlib::MockIO;
    use std::string::ToString;

    #[test]
    fn catalog() {
        assert_eq!(
            Diagnostic(Feature::History, Status::NoFile).to_string(),
            ": history nofile"
        );
        assert_eq!(
            Diagnostic(Feature::Shortcut, Status::NotRegistered).to_string(),
            ": shortcut not registered"
        );
        assert_eq!(Diagnostic(Feature::None, Status::Empty).to_string(), ": empty");
        assert_eq!(
            Diagnostic::from(HistoryError::OutOfMemory).to_string(),
            ": malloc failed"
        );
    }

    #[test]
    fn colored_diagnostic() {
        let mut io = MockIO::new("");

        diagnostic(&mut io, &Colors::ANSI, Feature::Autocomplete, Status::On).unwrap();
        assert_eq!(io.output(), "\r\x1b[35m: autocomplete on\x1b[0m\n");
    }

    #[test]
    fn cursor_moves() {
        let mut io = MockIO::new("");

        move_left(&mut io, 0).unwrap();
        move_left(&mut io, 1).unwrap();
        move_right(&mut io, 12).unwrap();
        clear_from(&mut io, 7).unwrap();

        assert_eq!(io.output(), "\x1b[D\x1b[12C\r\x1b[7C\x1b[K");
    }
}
