//! Shortcuts
//!
//! A line starting with a registered symbol goes to the shortcut
//! handler instead of the parser, with the rest of the line (leading
//! spaces skipped) as argument. Unregistered symbols from the reserved
//! punctuation ranges are reported and swallowed.
//!
//! `#` is built in and controls the shell itself:
//!
//! | line | action |
//! |---|---|
//! | `##`, `###` | command list, full info |
//! | `##<n>`, `##<name>`, `##<text>` | command details, search |
//! | `#q` | quit |
//! | `#E`, `#e` | echo on, off |
//! | `#A`, `#a` | autocomplete on, off |
//! | `#H`, `#h` | history on, off |
//! | `#l`, `#L`, `#r` | history list, reload, reset |
//! | `#<n>` | run history entry `n` |
//! | `#s<c>` | set the string quote |

use alloc::{boxed::Box, string::String, vec::Vec};

use crate::{
    engine::{Outcome, Shell},
    error::{HistoryError, ShellError},
    history::Deinit,
    io::SyncIO,
    output::{Feature, Status, NEWLINE},
    parser::{parse_number, FunctionDef, ParamType},
};

/// Symbol of the built-in shortcut
pub const BUILTIN: u8 = b'#';

pub type ShortcutHandler = Box<dyn FnMut(&str)>;

struct Shortcut {
    symbol: u8,
    help: &'static str,
    handler: Option<ShortcutHandler>,
}

/// User shortcuts, in registration order
#[derive(Default)]
pub struct ShortcutRegistry {
    shortcuts: Vec<Shortcut>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `symbol`. A `None` handler keeps the slot, using it
    /// reports `callback not implemented`.
    ///
    /// Returns false for `#` and for symbols already registered.
    pub fn register(
        &mut self,
        symbol: u8,
        help: &'static str,
        handler: Option<ShortcutHandler>,
    ) -> bool {
        if symbol == BUILTIN || self.get(symbol).is_some() {
            log::warn!("shortcut {} already registered", symbol as char);
            return false;
        }

        self.shortcuts.push(Shortcut {
            symbol,
            help,
            handler,
        });

        true
    }

    pub fn len(&self) -> usize {
        self.shortcuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = u8> + '_ {
        self.shortcuts.iter().map(|shortcut| shortcut.symbol)
    }

    fn get(&self, symbol: u8) -> Option<&Shortcut> {
        self.shortcuts.iter().find(|shortcut| shortcut.symbol == symbol)
    }

    fn handler_mut(&mut self, symbol: u8) -> Option<&mut ShortcutHandler> {
        self.shortcuts
            .iter_mut()
            .find(|shortcut| shortcut.symbol == symbol)
            .and_then(|shortcut| shortcut.handler.as_mut())
    }
}

/// Punctuation reserved for shortcuts
pub fn is_shortcut_symbol(symbol: u8) -> bool {
    matches!(symbol, 0x21..=0x2F | 0x3A..=0x40 | 0x5B..=0x60 | 0x7B..=0x7E)
}

impl Shell {
    /// Hand the line to a shortcut. `None` when the line is a command.
    pub(crate) fn handle_shortcuts<IO: SyncIO>(
        &mut self,
        io: &mut IO,
    ) -> Result<Option<Outcome>, ShellError> {
        let Some(symbol) = self.line.first() else {
            return Ok(None);
        };

        let line = self.line.as_str();
        let args = String::from(line.get(1..).unwrap_or_default().trim_start_matches(' '));

        if symbol == BUILTIN {
            log::debug!("{}: shortcut #{}", self.config.name, args);

            let outcome = self.builtin(&args, io)?;
            return Ok(Some(outcome.unwrap_or(Outcome::Shortcut)));
        }

        if self.config.user_shortcuts {
            if let Some(shortcut) = self.shortcuts.get(symbol) {
                if shortcut.handler.is_none() {
                    self.report(io, Feature::Callback, Status::NotImplemented)?;
                    return Ok(Some(Outcome::Shortcut));
                }

                log::debug!("{}: shortcut {}{}", self.config.name, symbol as char, args);

                self.record_history(io)?;

                if let Some(handler) = self.shortcuts.handler_mut(symbol) {
                    handler(&args);
                }

                return Ok(Some(Outcome::Shortcut));
            }
        }

        if is_shortcut_symbol(symbol) {
            self.report(io, Feature::Shortcut, Status::NotRegistered)?;
            return Ok(Some(Outcome::Shortcut));
        }

        Ok(None)
    }

    fn builtin<IO: SyncIO>(&mut self, args: &str, io: &mut IO) -> Result<Option<Outcome>, ShellError> {
        let Some(&key) = args.as_bytes().first() else {
            self.report(io, Feature::SubShortcut, Status::Missing)?;
            return Ok(None);
        };

        let rest = args.get(1..).unwrap_or_default();

        match key {
            BUILTIN => return self.help(rest, io).map(|_| None),
            b's' if self.config.bordered_strings => return self.set_quote(rest, io).map(|_| None),
            b'0'..=b'9' => return self.run_history_entry(args, io),
            _ => (),
        }

        let supported = match key {
            b'q' => self.config.shell_exit,
            b'E' | b'e' => self.config.echo_toggle,
            b'A' | b'a' => self.config.autocomplete,
            b'H' | b'h' | b'l' | b'L' | b'r' => self.history.is_some(),
            _ => false,
        };

        if !supported {
            self.report(io, Feature::SubShortcut, Status::NotImplemented)?;
            return Ok(None);
        }

        if !rest.is_empty() {
            self.report(io, Feature::Args, Status::Unsupported)?;
            return Ok(None);
        }

        match key {
            b'q' => self.quit(io)?,
            b'E' | b'e' => {
                self.echo = key == b'E';
                self.report(io, Feature::Echo, Status::switch(self.echo))?;
            }
            b'A' | b'a' => {
                self.autocomplete.set_enabled(key == b'A', &self.functions);
                self.report(io, Feature::Autocomplete, Status::switch(key == b'A'))?;
            }
            b'H' | b'h' => self.enable_history(key == b'H', io)?,
            b'l' => self.list_history(io)?,
            b'L' => self.reload_history(io)?,
            b'r' => self.reset_history(io)?,
            _ => (),
        }

        Ok(None)
    }

    /// Blocking yes/no question
    pub(crate) fn confirm<IO: SyncIO>(&mut self, io: &mut IO) -> Result<bool, ShellError> {
        io.write_str("Are you sure? (y/n): ")?;
        io.flush()?;

        let answer = loop {
            match io.read_byte()? {
                answer @ (b'y' | b'n') => break answer,
                _ => (),
            }
        };

        io.write(&[answer])?;
        io.write_str(NEWLINE)?;

        Ok(answer == b'y')
    }

    fn quit<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        if self.config.confirm_exit && !self.confirm(io)? {
            return Ok(());
        }

        log::debug!("{}: quit", self.config.name);
        self.keep_running = false;

        Ok(())
    }

    fn set_quote<IO: SyncIO>(&mut self, rest: &str, io: &mut IO) -> Result<(), ShellError> {
        match rest.as_bytes() {
            [] => self.quote = b'"',
            [quote] => self.quote = *quote,
            _ => {
                let colors = self.config.colors();
                write!(io, "\r{}: only one symbol expected{}\n", colors.error, colors.reset)?;
            }
        }

        Ok(())
    }

    fn initialized_history<IO: SyncIO>(&self, io: &mut IO) -> Result<bool, ShellError> {
        let initialized = self
            .history
            .as_ref()
            .is_some_and(|history| history.is_initialized());

        if !initialized {
            self.report(io, Feature::History, Status::Uninitialized)?;
        }

        Ok(initialized)
    }

    fn enable_history<IO: SyncIO>(&mut self, on: bool, io: &mut IO) -> Result<(), ShellError> {
        if self.initialized_history(io)? {
            self.history_on = on;
            self.report(io, Feature::History, Status::switch(on))?;
        }

        Ok(())
    }

    fn list_history<IO: SyncIO>(&self, io: &mut IO) -> Result<(), ShellError> {
        if !self.initialized_history(io)? {
            return Ok(());
        }

        if !self.history_on {
            return self.report(io, Feature::History, Status::Off);
        }

        let Some(history) = self.history.as_ref() else {
            return Ok(());
        };

        if history.is_empty() {
            return self.report(io, Feature::History, Status::Empty);
        }

        let colors = self.config.colors();

        for (index, entry) in history.entries() {
            write!(io, "\r{}{}: ", colors.list, index)?;
            io.write(entry)?;
            write!(io, "{}\n", colors.reset)?;
        }

        write!(
            io,
            "\r{}Used {} of {} entries{}\n",
            colors.success,
            history.len(),
            history.depth(),
            colors.reset
        )
    }

    pub(crate) fn reload_history<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        if !self.initialized_history(io)? {
            return Ok(());
        }

        match self.load_history() {
            Ok(()) => Ok(()),
            Err(err) => self.report_history(io, err),
        }
    }

    fn reset_history<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        if !self.initialized_history(io)? {
            return Ok(());
        }

        if self.config.confirm_exit && !self.confirm(io)? {
            return Ok(());
        }

        self.deinit_history(Deinit::Reset);
        self.report(io, Feature::History, Status::Reset)
    }

    fn run_history_entry<IO: SyncIO>(
        &mut self,
        index: &str,
        io: &mut IO,
    ) -> Result<Option<Outcome>, ShellError> {
        let Ok((index, _)) = parse_number(index, false) else {
            self.report(io, Feature::SubShortcut, Status::NotImplemented)?;
            return Ok(None);
        };

        self.clear_line(io)?;
        io.write_str("\r")?;

        let entry = self
            .history
            .as_ref()
            .filter(|_| self.history_on)
            .zip(usize::try_from(index).ok())
            .and_then(|(history, index)| history.get(index))
            .map(|entry| entry.to_vec());

        let entry = match entry {
            Some(entry) if entry.first() == Some(&BUILTIN) => {
                self.report(io, Feature::History, Status::Unsupported)?;
                return Ok(None);
            }
            Some(entry) => entry,
            None => {
                self.report_history(io, HistoryError::NoEntry)?;
                return Ok(None);
            }
        };

        io.write_str("> ")?;
        io.write(&entry)?;
        io.write_str("\n")?;

        self.line.set(&entry);
        self.submit(io).map(Some)
    }

    fn help<IO: SyncIO>(&self, rest: &str, io: &mut IO) -> Result<(), ShellError> {
        if !self.config.command_help {
            return match rest {
                "" => self.list_commands(io),
                _ => self.report(io, Feature::SubShortcut, Status::NotImplemented),
            };
        }

        match rest {
            "" => self.list_commands(io),
            "#" => {
                self.list_commands(io)?;
                self.list_types(io)?;
                self.list_shortcuts(io)
            }
            _ if rest.starts_with('#') => {
                self.report(io, Feature::SubShortcut, Status::NotImplemented)
            }
            _ => self.show_info(rest.trim_start_matches(' '), io),
        }
    }

    fn list_commands<IO: SyncIO>(&self, io: &mut IO) -> Result<(), ShellError> {
        let colors = self.config.colors();

        write!(io, "\r{}COMMANDS{}\n", colors.header, colors.reset)?;

        for (index, def) in self.functions.iter().enumerate() {
            self.list_line(index, def, io)?;
        }

        Ok(())
    }

    fn list_line<IO: SyncIO>(
        &self,
        index: usize,
        def: &FunctionDef,
        io: &mut IO,
    ) -> Result<(), ShellError> {
        let colors = self.config.colors();

        if !self.config.command_help {
            return write!(
                io,
                "\r{}{:3} {:>15} : {}{}\n",
                colors.list, index, def.name, def.signature, colors.reset
            );
        }

        write!(
            io,
            "\r{}{:3} {:>15} : {:<15} | {}{}\n",
            colors.list,
            index,
            def.name,
            def.signature,
            colors.reset,
            def.summary()
        )
    }

    fn show_details<IO: SyncIO>(&self, def: &FunctionDef, io: &mut IO) -> Result<(), ShellError> {
        let colors = self.config.colors();

        write!(
            io,
            "\r{}{} {}| {}\n\rParams: [ {} ]\n\r{}\n",
            colors.list,
            def.name,
            colors.reset,
            def.summary().trim(),
            def.signature,
            def.details().trim()
        )
    }

    fn show_info<IO: SyncIO>(&self, info: &str, io: &mut IO) -> Result<(), ShellError> {
        if info.bytes().next().is_some_and(is_shortcut_symbol) {
            return self.report(io, Feature::SubShortcut, Status::NotImplemented);
        }

        let by_index = parse_number(info, false)
            .ok()
            .and_then(|(index, _)| usize::try_from(index).ok())
            .and_then(|index| self.functions.get(index));
        let by_name = || self.functions.iter().find(|def| def.name == info);

        if let Some(def) = by_index.or_else(by_name) {
            return self.show_details(def, io);
        }

        let mut found = false;

        for (index, def) in self.functions.iter().enumerate() {
            if def.name.contains(info) {
                self.list_line(index, def, io)?;
                found = true;
            }
        }

        if !found {
            self.report(io, Feature::Command, Status::NotRegistered)?;
        }

        Ok(())
    }

    fn list_types<IO: SyncIO>(&self, io: &mut IO) -> Result<(), ShellError> {
        let colors = self.config.colors();

        write!(io, "\r{}DATATYPES{}\n\r\t", colors.header, colors.reset)?;

        for param in ParamType::ALL {
            if self.config.limits.is_enabled(param) {
                write!(io, "{} {}-{} |", colors.body, param.code(), param.name())?;
            }
        }

        write!(io, "{}{}", colors.reset, NEWLINE)
    }

    fn list_shortcuts<IO: SyncIO>(&self, io: &mut IO) -> Result<(), ShellError> {
        let colors = self.config.colors();

        write!(io, "\r{}SHORTCUTS CORE{}\n\r", colors.header, colors.reset)?;
        io.write_str(colors.body)?;
        io.write_str("\t##|#|i|s : info short|all|i|substr s\n\r")?;

        if self.config.shell_exit {
            io.write_str("\t#q : quit\n\r")?;
        }
        if self.config.echo_toggle {
            io.write_str("\t#E|e : echo on|off\n\r")?;
        }
        if self.config.autocomplete {
            io.write_str("\t#A|a : autocomplete on|off\n\r")?;
        }
        if self.history.is_some() {
            io.write_str("\t#H|h|l|L|r|i : history on|off|list|load|reset|exec i\n\r")?;
        }
        if self.config.bordered_strings {
            io.write_str("\t#sD : set string delimiter set D|reset; default \"\n\r")?;
        }

        io.write_str(colors.reset)?;

        if self.config.user_shortcuts && !self.shortcuts.is_empty() {
            write!(io, "{}SHORTCUTS USER{}\n\r", colors.header, colors.reset)?;

            for shortcut in &self.shortcuts.shortcuts {
                write!(io, "{}\t{}\n\r{}", colors.body, shortcut.help, colors.reset)?;
            }
        }

        Ok(())
    }
}
