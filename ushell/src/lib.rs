//! uShell is an embeddable `#[no_std]` command shell for serial
//! consoles and terminals. It reads one byte at a time, edits the line
//! in place and runs typed commands from a static function table.
//!
//! Features:
//! - IO-agnostic, any [`embedded_io`] reader and writer pair works
//! - Typed arguments: `u8`, `u16`, `u32`, `u64`, `f32`, strings and booleans
//! - Edit mode with cursor movement, insert and delete
//! - Circular line history, optionally persisted
//! - Autocomplete of command names while typing
//! - User shortcuts and the built-in `#` shortcut for help and settings
//! - Nested shell instances
//!
//! Every feature can be switched off in [`ShellConfig`].
//!
//! A function table entry names a command and its signature, one type
//! code per argument (`b` u8, `w` u16, `i` u32, `l` u64, `f` f32, `s`
//! string, `o` bool, `v` none). The line is parsed against the table and
//! handed to an [`Executor`](command::Executor). [`CommandSet`] pairs
//! each entry with a typed closure.
//!
//! # Example
//! ```
//! use ushell::{CommandSet, Handler, Outcome, ShellBuilder, ShellConfig};
//! # use ushell::{error::ShellError, io::SyncIO};
//! # struct Console(std::collections::VecDeque<u8>);
//! # impl SyncIO for Console {
//! #     fn read(&mut self, buf: &mut [u8]) -> Result<usize, ShellError> {
//! #         Ok(self.0.pop_front().map(|b| buf[0] = b).map_or(0, |_| 1))
//! #     }
//! #     fn write(&mut self, _: &[u8]) -> Result<(), ShellError> { Ok(()) }
//! #     fn flush(&mut self) -> Result<(), ShellError> { Ok(()) }
//! # }
//! # let mut io = Console("add 2 3\r".bytes().collect());
//!
//! let commands = CommandSet::new()
//!     .command("add", "add two numbers", Handler::U32U32(Box::new(|a, b| (a + b) as i32)))
//!     .command("say", "print a string", Handler::Str(Box::new(|s| s.len() as i32)));
//!
//! let mut shell = ShellBuilder::from_command_set(commands)
//!     .with_config(ShellConfig {
//!         autocomplete: false,
//!         ..ShellConfig::new("demo")
//!     })
//!     .build();
//!
//! // runs until the input closes or `#q` is entered
//! let _ = shell.run(&mut io);
//!
//! assert_eq!(shell.last_outcome(), Some(Outcome::Executed(5)));
//! ```

#![no_std]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
#[macro_use]
extern crate std;

pub mod builder;
pub mod command;
pub mod complete;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
mod input;
pub mod io;
pub mod line_buffer;
pub mod output;
pub mod parser;
mod prompt;
pub mod session;
pub mod shortcut;

#[cfg(test)]
pub(crate) mod testlib;

pub use builder::ShellBuilder;
pub use command::{CommandSet, Executor, Handler, NestedSlot};
pub use config::ShellConfig;
pub use engine::{Outcome, Shell};
pub use parser::{Command, FunctionDef};
pub use session::ShellStack;

/// Direction of a cursor, history or completion step
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    Backward,
    Forward,
}
