//! Runtime configuration of a shell instance
//!
//! Every optional subsystem is gated by a flag in [`ShellConfig`]. A
//! disabled subsystem behaves as if it was not present: keys routed to
//! it are ignored and its `#` sub-shortcuts report `not implemented`.

use crate::parser::ParamType;

/// Capacity of each per-type argument array.
///
/// A capacity of 0 disables the type: a signature using it fails with
/// [`ParamTypeNotImplemented`](crate::error::ParseErrorKind::ParamTypeNotImplemented).
/// Capacities above [`MAX_ARGS_PER_TYPE`](crate::parser::MAX_ARGS_PER_TYPE)
/// are clamped.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ParamLimits {
    pub num64: usize,
    pub num32: usize,
    pub num16: usize,
    pub num8: usize,
    pub float: usize,
    pub string: usize,
    pub boolean: usize,
}

impl ParamLimits {
    pub fn limit(&self, param: ParamType) -> usize {
        let limit = match param {
            ParamType::U64 => self.num64,
            ParamType::U32 => self.num32,
            ParamType::U16 => self.num16,
            ParamType::U8 => self.num8,
            ParamType::F32 => self.float,
            ParamType::Str => self.string,
            ParamType::Bool => self.boolean,
        };

        limit.min(crate::parser::MAX_ARGS_PER_TYPE)
    }

    pub fn is_enabled(&self, param: ParamType) -> bool {
        self.limit(param) > 0
    }

    /// Every type enabled at full capacity
    pub fn all() -> Self {
        let max = crate::parser::MAX_ARGS_PER_TYPE;

        Self {
            num64: max,
            num32: max,
            num16: max,
            num8: max,
            float: max,
            string: max,
            boolean: max,
        }
    }
}

impl Default for ParamLimits {
    fn default() -> Self {
        Self {
            num64: 1,
            num32: 5,
            num16: 0,
            num8: 0,
            float: 0,
            string: 5,
            boolean: 1,
        }
    }
}

/// ANSI color escapes used for each class of output
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Colors {
    pub prompt: &'static str,
    pub header: &'static str,
    pub body: &'static str,
    pub list: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub reset: &'static str,
}

impl Colors {
    pub const ANSI: Colors = Colors {
        prompt: "\x1b[96m",
        header: "\x1b[94m",
        body: "\x1b[93m",
        list: "\x1b[95m",
        success: "\x1b[92m",
        warning: "\x1b[35m",
        error: "\x1b[91m",
        reset: "\x1b[0m",
    };

    pub const NONE: Colors = Colors {
        prompt: "",
        header: "",
        body: "",
        list: "",
        success: "",
        warning: "",
        error: "",
        reset: "",
    };
}

impl Default for Colors {
    fn default() -> Self {
        Self::ANSI
    }
}

/// Shell instance configuration
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Instance name, shown in the prompt and used to name the history file
    pub name: &'static str,
    /// Line buffer capacity, including the terminator slot
    pub max_input_len: usize,
    /// Number of history slots, 0 disables history
    pub history_depth: usize,
    pub history: bool,
    pub autocomplete: bool,
    pub edit_mode: bool,
    /// Edit mode is re-entered after every line reset
    pub edit_mode_default: bool,
    pub smart_prompt: bool,
    pub colors: bool,
    pub shell_exit: bool,
    pub confirm_exit: bool,
    pub echo_toggle: bool,
    pub user_shortcuts: bool,
    pub command_help: bool,
    pub bordered_strings: bool,
    pub signed_numbers: bool,
    /// Initial quote character for bordered strings
    pub quote: u8,
    pub limits: ParamLimits,
}

impl ShellConfig {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub(crate) fn colors(&self) -> Colors {
        if self.colors {
            Colors::ANSI
        } else {
            Colors::NONE
        }
    }

    pub(crate) fn history_enabled(&self) -> bool {
        self.history && self.history_depth > 0
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            name: "root",
            max_input_len: 128,
            history_depth: 100,
            history: true,
            autocomplete: true,
            edit_mode: true,
            edit_mode_default: false,
            smart_prompt: true,
            colors: true,
            shell_exit: true,
            confirm_exit: false,
            echo_toggle: false,
            user_shortcuts: true,
            command_help: true,
            bordered_strings: true,
            signed_numbers: false,
            quote: b'"',
            limits: ParamLimits::default(),
        }
    }
}
