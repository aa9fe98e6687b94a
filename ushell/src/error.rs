//! Error types

use thiserror::Error;

use crate::parser::ParamType;

/// Errors raised by the shell I/O layer
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("input closed")]
    Aborted,
    #[error("read error: {0:?}")]
    ReadError(embedded_io::ErrorKind),
    #[error("write error: {0:?}")]
    WriteError(embedded_io::ErrorKind),
}

impl embedded_io::Error for ShellError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match *self {
            ShellError::Aborted => embedded_io::ErrorKind::Interrupted,
            ShellError::ReadError(e) => e,
            ShellError::WriteError(e) => e,
        }
    }
}

/// Parse and dispatch failures.
///
/// Every variant carries a stable negative code, shared with the
/// executor return convention so that a handler may report one of
/// these failures by returning its code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("command not found")]
    FunctionNotFound,
    #[error("wrong number of arguments")]
    WrongNumberOfArgs,
    #[error("data type not implem/enabled")]
    ParamTypeNotImplemented,
    #[error("params pattern not implem/enabled")]
    ParamsPatternNotImplemented,
    #[error("string not closed")]
    StringNotClosed,
    #[error("too many args of type ")]
    TooManyArgs,
    #[error("invalid ")]
    InvalidNumber,
    #[error("value too big for ")]
    ValueTooBig,
}

impl ParseErrorKind {
    pub const fn code(self) -> i32 {
        match self {
            Self::FunctionNotFound => -2,
            Self::WrongNumberOfArgs => -3,
            Self::ParamTypeNotImplemented => -4,
            Self::ParamsPatternNotImplemented => -5,
            Self::StringNotClosed => -6,
            Self::TooManyArgs => -7,
            Self::InvalidNumber => -8,
            Self::ValueTooBig => -9,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            -2 => Self::FunctionNotFound,
            -3 => Self::WrongNumberOfArgs,
            -4 => Self::ParamTypeNotImplemented,
            -5 => Self::ParamsPatternNotImplemented,
            -6 => Self::StringNotClosed,
            -7 => Self::TooManyArgs,
            -8 => Self::InvalidNumber,
            -9 => Self::ValueTooBig,
            _ => return None,
        })
    }

    /// Argument-level failures name the offending argument and its type.
    pub const fn is_argument_error(self) -> bool {
        matches!(
            self,
            Self::TooManyArgs | Self::InvalidNumber | Self::ValueTooBig
        )
    }
}

/// A parse failure with the context needed for the diagnostic line
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Index into the function table, once the name resolved
    pub function: Option<usize>,
    /// 1-based position of the offending argument
    pub arg: Option<usize>,
    pub param: Option<ParamType>,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind) -> Self {
        Self {
            kind,
            function: None,
            arg: None,
            param: None,
        }
    }

    pub(crate) fn at_arg(kind: ParseErrorKind, arg: usize, param: ParamType) -> Self {
        Self {
            kind,
            function: None,
            arg: Some(arg),
            param: Some(param),
        }
    }

    pub(crate) fn in_function(mut self, function: usize) -> Self {
        self.function = Some(function);
        self
    }
}

impl From<ParseErrorKind> for ParseError {
    fn from(kind: ParseErrorKind) -> Self {
        Self::new(kind)
    }
}

/// History store failures
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum HistoryError {
    #[error("history empty")]
    Empty,
    #[error("history noentry")]
    NoEntry,
    #[error("malloc failed")]
    OutOfMemory,
    #[error("history uninitialized")]
    Uninitialized,
    #[error("history nofile")]
    NoStorage,
    #[error("history failed")]
    Storage,
}
