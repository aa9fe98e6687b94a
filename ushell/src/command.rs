//! Command execution
//!
//! An [`Executor`] runs parsed commands. [`CommandSet`] is the stock
//! executor: it pairs every function table entry with a typed
//! [`Handler`] closure.
//!
//! ```
//! use ushell::command::{CommandSet, Handler};
//!
//! let commands = CommandSet::new()
//!     .command("add", "add two numbers", Handler::U32U32(Box::new(|a, b| (a + b) as i32)))
//!     .command("echo", "print a string", Handler::Str(Box::new(|s| s.len() as i32)));
//!
//! assert_eq!(commands.functions()[0].signature, "ii");
//! ```

use alloc::{boxed::Box, rc::Rc, vec::Vec};
use core::cell::RefCell;

use crate::{
    engine::Shell,
    error::ParseErrorKind,
    parser::{Command, FunctionDef},
};

/// Runs parsed commands.
///
/// A return value `>= 0` is a success code, negative values are errors.
pub trait Executor {
    fn execute(&mut self, command: &Command<'_>) -> i32;

    /// Shell instance to run nested once the current command returns
    fn take_nested(&mut self) -> Option<Shell> {
        None
    }
}

/// Typed command callbacks, one variant per supported signature
pub enum Handler {
    Void(Box<dyn FnMut() -> i32>),
    U8(Box<dyn FnMut(u8) -> i32>),
    U16(Box<dyn FnMut(u16) -> i32>),
    U32(Box<dyn FnMut(u32) -> i32>),
    U64(Box<dyn FnMut(u64) -> i32>),
    F32(Box<dyn FnMut(f32) -> i32>),
    Str(Box<dyn FnMut(&str) -> i32>),
    Bool(Box<dyn FnMut(bool) -> i32>),
    U32U32(Box<dyn FnMut(u32, u32) -> i32>),
    StrStr(Box<dyn FnMut(&str, &str) -> i32>),
    U32Str(Box<dyn FnMut(u32, &str) -> i32>),
    StrU32(Box<dyn FnMut(&str, u32) -> i32>),
    U64U32Bool(Box<dyn FnMut(u64, u32, bool) -> i32>),
    /// Any signature, arguments are read from the command
    Raw(Box<dyn FnMut(&Command<'_>) -> i32>),
}

const PATTERN_MISMATCH: i32 = ParseErrorKind::ParamsPatternNotImplemented.code();

impl Handler {
    /// Signature served by this handler, `None` for [`Handler::Raw`]
    pub fn pattern(&self) -> Option<&'static str> {
        Some(match self {
            Handler::Void(_) => "v",
            Handler::U8(_) => "b",
            Handler::U16(_) => "w",
            Handler::U32(_) => "i",
            Handler::U64(_) => "l",
            Handler::F32(_) => "f",
            Handler::Str(_) => "s",
            Handler::Bool(_) => "o",
            Handler::U32U32(_) => "ii",
            Handler::StrStr(_) => "ss",
            Handler::U32Str(_) => "is",
            Handler::StrU32(_) => "si",
            Handler::U64U32Bool(_) => "lio",
            Handler::Raw(_) => return None,
        })
    }

    fn call(&mut self, signature: &str, command: &Command<'_>) -> i32 {
        let signature = if signature.is_empty() { "v" } else { signature };

        if self.pattern().is_some_and(|pattern| pattern != signature) {
            return PATTERN_MISMATCH;
        }

        let c = command;

        match self {
            Handler::Void(f) => f(),
            Handler::U8(f) => match c.u8s() {
                [a] => f(*a),
                _ => PATTERN_MISMATCH,
            },
            Handler::U16(f) => match c.u16s() {
                [a] => f(*a),
                _ => PATTERN_MISMATCH,
            },
            Handler::U32(f) => match c.u32s() {
                [a] => f(*a),
                _ => PATTERN_MISMATCH,
            },
            Handler::U64(f) => match c.u64s() {
                [a] => f(*a),
                _ => PATTERN_MISMATCH,
            },
            Handler::F32(f) => match c.f32s() {
                [a] => f(*a),
                _ => PATTERN_MISMATCH,
            },
            Handler::Str(f) => match c.strings() {
                [a] => f(a),
                _ => PATTERN_MISMATCH,
            },
            Handler::Bool(f) => match c.bools() {
                [a] => f(*a),
                _ => PATTERN_MISMATCH,
            },
            Handler::U32U32(f) => match c.u32s() {
                [a, b] => f(*a, *b),
                _ => PATTERN_MISMATCH,
            },
            Handler::StrStr(f) => match c.strings() {
                [a, b] => f(a, b),
                _ => PATTERN_MISMATCH,
            },
            Handler::U32Str(f) => match (c.u32s(), c.strings()) {
                ([a], [b]) => f(*a, b),
                _ => PATTERN_MISMATCH,
            },
            Handler::StrU32(f) => match (c.strings(), c.u32s()) {
                ([a], [b]) => f(a, *b),
                _ => PATTERN_MISMATCH,
            },
            Handler::U64U32Bool(f) => match (c.u64s(), c.u32s(), c.bools()) {
                ([a], [b], [o]) => f(*a, *b, *o),
                _ => PATTERN_MISMATCH,
            },
            Handler::Raw(f) => f(c),
        }
    }
}

/// Slot a command uses to hand a nested shell back to the running one
#[derive(Clone, Default)]
pub struct NestedSlot(Rc<RefCell<Option<Shell>>>);

impl NestedSlot {
    pub fn enter(&self, shell: Shell) {
        *self.0.borrow_mut() = Some(shell);
    }

    fn take(&self) -> Option<Shell> {
        self.0.borrow_mut().take()
    }
}

/// Function table with a handler per entry
#[derive(Default)]
pub struct CommandSet {
    functions: Vec<FunctionDef>,
    handlers: Vec<Handler>,
    nested: NestedSlot,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command whose signature follows from the handler
    pub fn command(self, name: &'static str, help: &'static str, handler: Handler) -> Self {
        let signature = handler.pattern().unwrap_or("v");
        self.command_with_signature(name, signature, help, handler)
    }

    /// Add a command with an explicit signature, required for [`Handler::Raw`]
    pub fn command_with_signature(
        mut self,
        name: &'static str,
        signature: &'static str,
        help: &'static str,
        handler: Handler,
    ) -> Self {
        self.functions
            .push(FunctionDef::new(name, signature).with_help(help));
        self.handlers.push(handler);
        self
    }

    pub fn functions(&self) -> &[FunctionDef] {
        &self.functions
    }

    /// Handle for commands that start a nested shell
    pub fn nested_slot(&self) -> NestedSlot {
        self.nested.clone()
    }
}

impl Executor for CommandSet {
    fn execute(&mut self, command: &Command<'_>) -> i32 {
        let index = command.function();

        match (self.functions.get(index), self.handlers.get_mut(index)) {
            (Some(def), Some(handler)) => handler.call(def.signature, command),
            _ => ParseErrorKind::FunctionNotFound.code(),
        }
    }

    fn take_nested(&mut self) -> Option<Shell> {
        self.nested.take()
    }
}
