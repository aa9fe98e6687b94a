//! The shell engine
//!
//! [`Shell`] owns everything an instance keeps between key presses: the
//! input line, history, autocomplete state, the function table and the
//! executor. It is driven one byte at a time through
//! [`Shell::process_byte`], or by the blocking [`Shell::run`] loop.
//!
//! Every key is written between a hide-cursor and a show-cursor
//! directive, and the output is flushed once the key is handled.

use alloc::{boxed::Box, vec::Vec};
use core::fmt::Display;

use heapless::String;

use crate::{
    command::Executor,
    complete::Autocomplete,
    config::ShellConfig,
    error::{HistoryError, ParseError, ParseErrorKind, ShellError},
    history::{CircularHistory, Deinit, HistoryStorage},
    input::{Key, KeyDecoder},
    io::SyncIO,
    line_buffer::LineBuffer,
    output::{
        self, Diagnostic, Feature, Status, CLEAR_LINE_END, CURSOR_LEFT, CURSOR_RIGHT,
        HIDE_CURSOR, NEWLINE, OVERFLOW_MARK, RUB_OUT, SHOW_CURSOR,
    },
    parser::{parse, FunctionDef, ParamType, ParseOptions},
    prompt::{self, PromptState, PROMPT_MAX_LEN},
    shortcut::ShortcutRegistry,
    Direction,
};

/// What became of the last submitted line
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Outcome {
    /// The executor ran and returned this code
    Executed(i32),
    /// The line did not parse, nothing was executed
    Failed(ParseError),
    /// A shortcut consumed the line
    Shortcut,
}

pub struct Shell {
    pub(crate) config: ShellConfig,
    pub(crate) functions: Vec<FunctionDef>,
    pub(crate) executor: Box<dyn Executor>,
    pub(crate) shortcuts: ShortcutRegistry,
    pub(crate) line: LineBuffer,
    decoder: KeyDecoder,
    pub(crate) history: Option<CircularHistory>,
    pub(crate) storage: Option<Box<dyn HistoryStorage>>,
    pub(crate) autocomplete: Autocomplete,
    pub(crate) edit_mode: bool,
    pub(crate) history_on: bool,
    pub(crate) echo: bool,
    pub(crate) quote: u8,
    pub(crate) keep_running: bool,
    last_key: Option<Key>,
    last_outcome: Option<Outcome>,
    nested: Option<Box<Shell>>,
}

impl Shell {
    pub(crate) fn new(
        config: ShellConfig,
        functions: Vec<FunctionDef>,
        executor: Box<dyn Executor>,
        shortcuts: ShortcutRegistry,
        storage: Option<Box<dyn HistoryStorage>>,
    ) -> Self {
        let history = if config.history_enabled() {
            CircularHistory::new(config.history_depth)
                .map_err(|err| log::warn!("{}: history disabled, {}", config.name, err))
                .ok()
        } else {
            None
        };

        let mut autocomplete = Autocomplete::new(config.autocomplete);
        autocomplete.reset(&functions, true);

        let mut shell = Self {
            line: LineBuffer::new(config.max_input_len),
            decoder: KeyDecoder::new(),
            history_on: history.is_some(),
            history,
            storage,
            autocomplete,
            edit_mode: config.edit_mode && config.edit_mode_default,
            echo: true,
            quote: config.quote,
            keep_running: true,
            last_key: None,
            last_outcome: None,
            nested: None,
            functions,
            executor,
            shortcuts,
            config,
        };

        if shell.storage.is_some() {
            if let Err(err) = shell.load_history() {
                log::warn!("{}: history not loaded, {}", shell.config.name, err);
            }
        }

        shell
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn functions(&self) -> &[FunctionDef] {
        &self.functions
    }

    /// Current content of the input line
    pub fn line(&self) -> &str {
        self.line.as_str()
    }

    pub fn history(&self) -> Option<&CircularHistory> {
        self.history.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.keep_running
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// Shell started by the last command, see [`crate::session::ShellStack`]
    pub fn take_nested(&mut self) -> Option<Shell> {
        self.nested.take().map(|shell| *shell)
    }

    pub(crate) fn prompt(&self) -> String<PROMPT_MAX_LEN> {
        let state = self.config.smart_prompt.then(|| PromptState {
            autocomplete: self.autocomplete.is_enabled(),
            history: self.history_on,
            edit: self.edit_mode,
            quote: self.quote,
        });

        prompt::render(self.config.name, state)
    }

    pub fn print_prompt<IO: SyncIO>(&self, io: &mut IO) -> Result<(), ShellError> {
        let colors = self.config.colors();

        write!(io, "\r{}{}{}", colors.prompt, self.prompt(), colors.reset)?;
        io.flush()
    }

    /// Print the prompt, then handle keys until the shell quits.
    ///
    /// A shell started by a command is left pending; use
    /// [`crate::session::ShellStack`] to run nested shells.
    pub fn run<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        self.print_prompt(io)?;

        while self.keep_running {
            let byte = io.read_byte()?;
            self.process_byte(byte, io)?;
        }

        Ok(())
    }

    /// Feed one input byte
    pub fn process_byte<IO: SyncIO>(&mut self, byte: u8, io: &mut IO) -> Result<(), ShellError> {
        let Some(key) = self.decoder.advance(byte) else {
            return Ok(());
        };

        log::trace!("{}: key {:?}", self.config.name, key);

        io.write_str(HIDE_CURSOR)?;
        self.dispatch(key, io)?;
        io.write_str(SHOW_CURSOR)?;
        io.flush()?;

        self.last_key = Some(key);

        Ok(())
    }

    /// Run a command line as if it was typed and entered
    pub fn execute<IO: SyncIO>(
        &mut self,
        line: &str,
        io: &mut IO,
    ) -> Result<Option<Outcome>, ShellError> {
        self.line.set(line.as_bytes());
        self.line.remove_trailing_spaces();

        let outcome = if self.line.is_empty() {
            None
        } else {
            Some(self.submit(io)?)
        };

        self.last_outcome = outcome;
        self.reset_input();

        Ok(outcome)
    }

    fn dispatch<IO: SyncIO>(&mut self, key: Key, io: &mut IO) -> Result<(), ShellError> {
        match key {
            Key::Enter => self.enter(io),
            Key::Backspace => self.backspace(io),
            Key::Tab | Key::Insert => self.toggle_edit_mode(io),
            Key::Delete => self.delete(io),
            Key::DeleteToHome => self.delete_to_home(io),
            Key::DeleteToEnd => self.delete_to_end(io),
            Key::Up => self.vertical(Direction::Backward, io),
            Key::Down => self.vertical(Direction::Forward, io),
            Key::Left => self.horizontal(Direction::Backward, io),
            Key::Right => self.horizontal(Direction::Forward, io),
            Key::Home if self.edit_mode => self.home(io),
            Key::End if self.edit_mode => self.end(io),
            Key::Home | Key::End => Ok(()),
            Key::Char(byte) => self.insert(byte, io),
        }
    }

    fn enter<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        self.line.remove_trailing_spaces();
        io.write_str(NEWLINE)?;

        if !self.line.is_empty() {
            let outcome = self.submit(io)?;
            self.last_outcome = Some(outcome);
        }

        self.reset_input();

        if self.keep_running && self.nested.is_none() {
            self.print_prompt(io)?;
        }

        Ok(())
    }

    pub(crate) fn submit<IO: SyncIO>(&mut self, io: &mut IO) -> Result<Outcome, ShellError> {
        if let Some(outcome) = self.handle_shortcuts(io)? {
            return Ok(outcome);
        }

        self.record_history(io)?;

        let outcome = self.run_line(io)?;

        if self.nested.is_none() {
            self.nested = self.executor.take_nested().map(Box::new);
        }

        Ok(outcome)
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            limits: self.config.limits,
            signed: self.config.signed_numbers,
            quote: self.config.bordered_strings.then_some(self.quote),
        }
    }

    fn run_line<IO: SyncIO>(&mut self, io: &mut IO) -> Result<Outcome, ShellError> {
        let options = self.parse_options();
        let line = self.line.as_str();

        let (outcome, function) = match parse(line, &self.functions, &options) {
            Ok(command) => {
                let function = command.function();

                log::debug!("{}: execute {}", self.config.name, self.functions[function].name);

                (Outcome::Executed(self.executor.execute(&command)), Some(function))
            }
            Err(err) => (Outcome::Failed(err), err.function),
        };

        let colors = self.config.colors();
        let typed = line
            .trim_start_matches(' ')
            .split(' ')
            .next()
            .unwrap_or_default();

        match outcome {
            Outcome::Executed(code) if code >= 0 => write!(
                io,
                "\r{}=> {} (0x{:X}){}\n",
                colors.success, code, code, colors.reset
            )?,
            Outcome::Executed(code) => match ParseErrorKind::from_code(code) {
                Some(kind) => self.render_error(io, &kind, None, function, typed)?,
                None => self.render_error(io, &'?', None, function, typed)?,
            },
            Outcome::Failed(err) => {
                let arg = err
                    .arg
                    .zip(err.param)
                    .filter(|_| err.kind.is_argument_error());

                self.render_error(io, &err.kind, arg, function, typed)?
            }
            Outcome::Shortcut => (),
        }

        Ok(outcome)
    }

    fn render_error<IO: SyncIO>(
        &self,
        io: &mut IO,
        description: &dyn Display,
        arg: Option<(usize, ParamType)>,
        function: Option<usize>,
        typed: &str,
    ) -> Result<(), ShellError> {
        let colors = self.config.colors();

        write!(io, "\r{}: {}", colors.error, description)?;

        if let Some((arg, param)) = arg {
            write!(io, "{} (arg:{})", param.name(), arg)?;
        }

        match function.and_then(|index| self.functions.get(index)) {
            Some(def) => write!(io, " | {}:{}", def.name, def.signature)?,
            None => write!(io, " | {}:?", typed)?,
        }

        write!(io, "{}\n", colors.reset)
    }

    pub(crate) fn report<IO: SyncIO>(
        &self,
        io: &mut IO,
        feature: Feature,
        status: Status,
    ) -> Result<(), ShellError> {
        output::diagnostic(io, &self.config.colors(), feature, status)
    }

    pub(crate) fn report_history<IO: SyncIO>(
        &self,
        io: &mut IO,
        err: HistoryError,
    ) -> Result<(), ShellError> {
        let Diagnostic(feature, status) = err.into();
        self.report(io, feature, status)
    }

    /// Store the current line in history and in the backing storage
    pub(crate) fn record_history<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        if !self.history_on {
            return Ok(());
        }

        let Some(history) = self.history.as_mut() else {
            return Ok(());
        };

        match history.write(self.line.as_slice()) {
            Ok(true) => match self.storage.as_mut().map(|s| s.append(self.line.as_slice())) {
                Some(Err(err)) => {
                    log::warn!("{}: history not saved, {}", self.config.name, err);
                    self.report_history(io, err)
                }
                _ => Ok(()),
            },
            Ok(false) => Ok(()),
            Err(err) => {
                log::warn!("{}: history write failed, {}", self.config.name, err);
                self.report_history(io, err)
            }
        }
    }

    /// Refill history from the backing storage
    pub(crate) fn load_history(&mut self) -> Result<(), HistoryError> {
        let history = self
            .history
            .as_mut()
            .filter(|history| history.is_initialized())
            .ok_or(HistoryError::Uninitialized)?;
        let storage = self.storage.as_mut().ok_or(HistoryError::NoStorage)?;

        history.deinit(Deinit::Partial);

        let mut result = Ok(());
        storage.load(&mut |line| {
            if let Err(err) = history.write(line) {
                result = Err(err);
            }
        })?;

        log::debug!("{}: {} history entries loaded", self.config.name, history.len());

        result
    }

    pub(crate) fn deinit_history(&mut self, mode: Deinit) {
        if let Some(history) = self.history.as_mut() {
            history.deinit(mode);
        }
    }

    fn reset_input(&mut self) {
        self.line.reset();
        self.edit_mode = self.config.edit_mode && self.config.edit_mode_default;
        self.autocomplete.reset(&self.functions, true);
    }

    /// Empty the line and clear it on screen
    pub(crate) fn clear_line<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        self.line.reset();
        output::clear_from(io, self.prompt().len())?;
        self.autocomplete.reset(&self.functions, true);
        Ok(())
    }

    fn redraw_line<IO: SyncIO>(&self, io: &mut IO) -> Result<(), ShellError> {
        output::clear_from(io, self.prompt().len())?;
        io.write(self.line.as_slice())
    }

    fn insert<IO: SyncIO>(&mut self, byte: u8, io: &mut IO) -> Result<(), ShellError> {
        if self.line.is_full() {
            return io.write_str(OVERFLOW_MARK);
        }

        let insert = self.edit_mode && !self.line.cursor_at_end();
        self.line.insert_or_append(byte, insert);

        if insert {
            if self.echo {
                // Everything from the inserted byte on shifts right
                let tail = &self.line.as_slice()[self.line.cursor() - 1..];
                io.write(tail)?;
                output::move_left(io, tail.len() - 1)?;
            }

            return Ok(());
        }

        if self.echo {
            io.write(&[byte])?;
        }

        let appended = self.autocomplete.extend(&self.functions, &mut self.line);

        if appended > 0 && self.echo {
            io.write(&self.line.as_slice()[self.line.len() - appended..])?;
        }

        Ok(())
    }

    fn after_delete(&mut self) {
        if self.line.is_empty() {
            self.autocomplete.reset(&self.functions, true);
        } else {
            self.autocomplete.reinit();
        }
    }

    fn backspace<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        if self.edit_mode {
            if !self.line.delete_backward() {
                return Ok(());
            }

            io.write_str(CURSOR_LEFT)?;
            io.write_str(CLEAR_LINE_END)?;
            io.write(self.line.tail())?;
            output::move_left(io, self.line.tail().len())?;
        } else {
            if self.line.pop().is_none() {
                return Ok(());
            }

            io.write_str(RUB_OUT)?;
        }

        self.after_delete();
        Ok(())
    }

    fn delete<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        if !self.edit_mode {
            return self.clear_line(io);
        }

        if self.line.delete_under_cursor() {
            io.write_str(CLEAR_LINE_END)?;
            io.write(self.line.tail())?;
            output::move_left(io, self.line.tail().len())?;
            self.after_delete();
        }

        Ok(())
    }

    fn delete_to_home<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        self.line.delete_to_home();

        if self.line.is_empty() {
            return self.clear_line(io);
        }

        self.redraw_line(io)?;
        output::move_left(io, self.line.len())?;
        self.autocomplete.reset(&self.functions, false);

        Ok(())
    }

    fn delete_to_end<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        if self.line.cursor() == 0 {
            return self.clear_line(io);
        }

        if self.line.delete_to_end() > 0 {
            io.write_str(CLEAR_LINE_END)?;
            self.autocomplete.reset(&self.functions, false);
        }

        Ok(())
    }

    fn toggle_edit_mode<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        if !self.config.edit_mode {
            return Ok(());
        }

        self.edit_mode = !self.edit_mode;
        self.line.move_to_end();

        log::trace!("{}: edit mode {}", self.config.name, self.edit_mode);

        let colors = self.config.colors();
        write!(io, "\r{}{}{}", colors.prompt, self.prompt(), colors.reset)?;
        output::move_right(io, self.line.len())
    }

    fn home<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        let steps = self.line.move_home();
        output::move_left(io, steps)
    }

    fn end<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        let steps = self.line.move_end();
        output::move_right(io, steps)
    }

    fn vertical<IO: SyncIO>(&mut self, direction: Direction, io: &mut IO) -> Result<(), ShellError> {
        if self.edit_mode {
            return match direction {
                Direction::Backward => self.home(io),
                Direction::Forward => self.end(io),
            };
        }

        if !self.history_on {
            return Ok(());
        }

        let Some(history) = self.history.as_mut() else {
            return Ok(());
        };

        match history.read(direction) {
            Ok(entry) => self.line.set(entry),
            Err(err) => {
                log::trace!("{}: {}", self.config.name, err);
                return Ok(());
            }
        }

        self.autocomplete.reinit();
        self.autocomplete.extend(&self.functions, &mut self.line);

        self.redraw_line(io)
    }

    fn horizontal<IO: SyncIO>(
        &mut self,
        direction: Direction,
        io: &mut IO,
    ) -> Result<(), ShellError> {
        if self.edit_mode && self.line.move_cursor(direction) {
            return io.write_str(match direction {
                Direction::Backward => CURSOR_LEFT,
                Direction::Forward => CURSOR_RIGHT,
            });
        }

        let refresh = self.last_key == Some(Key::Backspace);

        if self
            .autocomplete
            .cycle(&self.functions, &mut self.line, direction, refresh)
        {
            self.redraw_line(io)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ShellBuilder;
    use crate::command::{CommandSet, Handler};
    use crate::testlib::{csi, AsByteVec, Keys, MemoryStorage, MockIO};
    use core::cell::RefCell;
    use std::rc::Rc;
    use std::string::{String, ToString};
    use std::vec::Vec;

    type Calls = Rc<RefCell<Vec<String>>>;

    fn commands(calls: &Calls) -> CommandSet {
        let strings = calls.clone();
        let pairs = calls.clone();

        CommandSet::new()
            .command("vtest", "no arguments", Handler::Void(Box::new(|| 0)))
            .command("itest", "echo a number", Handler::U32(Box::new(|n| n as i32)))
            .command("iitest", "add", Handler::U32U32(Box::new(|a, b| (a + b) as i32)))
            .command(
                "stest",
                "string length",
                Handler::Str(Box::new(move |s| {
                    strings.borrow_mut().push(s.to_string());
                    s.len() as i32
                })),
            )
            .command(
                "sitest",
                "string and number",
                Handler::StrU32(Box::new(move |s, n| {
                    pairs.borrow_mut().push(s.to_string());
                    n as i32
                })),
            )
            .command("fail", "always fails", Handler::Void(Box::new(|| -42)))
    }

    fn config() -> ShellConfig {
        ShellConfig {
            colors: false,
            autocomplete: false,
            ..ShellConfig::new("test")
        }
    }

    fn shell_with(config: ShellConfig) -> (Shell, Calls) {
        let calls = Calls::default();
        let shell = ShellBuilder::from_command_set(commands(&calls))
            .with_config(config)
            .build();

        (shell, calls)
    }

    fn feed(shell: &mut Shell, io: &mut MockIO, input: impl AsByteVec) {
        for byte in input.as_byte_vec() {
            shell.process_byte(byte, io).unwrap();
        }
    }

    #[test]
    fn typed_command_is_executed() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, "iitest 2 0x3\r");

        assert_eq!(shell.last_outcome(), Some(Outcome::Executed(5)));
        assert!(io.screen().contains("\n\r\r=> 5 (0x5)\n"));
        assert!(io.screen().ends_with("\raHe\":test> "));
        assert_eq!(shell.line(), "");
    }

    #[test]
    fn quoted_string_keeps_spaces() {
        let (mut shell, calls) = shell_with(config());
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, "sitest \"a b\" 7\r");

        assert_eq!(shell.last_outcome(), Some(Outcome::Executed(7)));
        assert_eq!(*calls.borrow(), ["a b"]);
    }

    #[test]
    fn unknown_command_names_it() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("");

        let outcome = shell.execute("foo 1", &mut io).unwrap();

        assert!(matches!(
            outcome,
            Some(Outcome::Failed(ParseError {
                kind: ParseErrorKind::FunctionNotFound,
                ..
            }))
        ));
        assert_eq!(io.output(), "\r: command not found | foo:?\n");
    }

    #[test]
    fn too_many_arguments() {
        let (mut shell, calls) = shell_with(config());
        let mut io = MockIO::new("");

        let outcome = shell.execute("stest a b", &mut io).unwrap();

        assert!(matches!(
            outcome,
            Some(Outcome::Failed(ParseError {
                kind: ParseErrorKind::WrongNumberOfArgs,
                ..
            }))
        ));
        assert_eq!(io.output(), "\r: wrong number of arguments | stest:s\n");
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn argument_errors_name_the_argument() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("");

        shell.execute("iitest 1 0xZ", &mut io).unwrap();
        assert_eq!(io.output(), "\r: invalid u32 (arg:2) | iitest:ii\n");

        io.clear_output();
        shell.execute("itest 99999999999", &mut io).unwrap();
        assert_eq!(io.output(), "\r: value too big for u32 (arg:1) | itest:i\n");
    }

    #[test]
    fn executor_errors() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("");

        assert_eq!(
            shell.execute("fail", &mut io).unwrap(),
            Some(Outcome::Executed(-42))
        );
        assert_eq!(io.output(), "\r: ? | fail:v\n");
    }

    #[test]
    fn keys_are_bracketed() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, "v");

        assert_eq!(io.output(), "\x1b[?25lv\x1b[?25h");
    }

    #[test]
    fn empty_enter_reprints_prompt() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, "   \r");

        assert_eq!(io.screen(), "   \n\r\raHe\":test> ");
        assert_eq!(shell.last_outcome(), None);
    }

    #[test]
    fn line_mode_backspace() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, ["itesx", "\x7f", "t 4\r"]);

        assert!(io.screen().starts_with("itesx\x1b[D \x1b[Dt 4"));
        assert_eq!(shell.last_outcome(), Some(Outcome::Executed(4)));
    }

    #[test]
    fn full_line_is_flagged() {
        let (mut shell, _) = shell_with(ShellConfig {
            max_input_len: 4,
            ..config()
        });
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, "abcd");

        assert_eq!(shell.line(), "abc");
        assert_eq!(io.screen(), "abc\x1b[91m]\x1b[0m\x1b[D");
    }

    #[test]
    fn edit_mode_insert() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, Keys::new().add("itst 3").add("\t"));
        assert!(shell.is_edit_mode());
        assert!(io.screen().ends_with("\raHE\":test> \x1b[6C"));

        io.clear_output();
        feed(
            &mut shell,
            &mut io,
            Keys::new().add(csi::HOME).add(csi::RIGHT).add(csi::RIGHT).add("e"),
        );

        assert_eq!(shell.line(), "itest 3");
        assert_eq!(io.screen(), "\x1b[6D\x1b[C\x1b[Cest 3\x1b[4D");

        feed(&mut shell, &mut io, "\r");
        assert_eq!(shell.last_outcome(), Some(Outcome::Executed(3)));
        assert!(!shell.is_edit_mode());
    }

    #[test]
    fn edit_mode_deletes() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, Keys::new().add("abcd").add("\t").add(csi::LEFT).add(csi::LEFT));
        io.clear_output();

        feed(&mut shell, &mut io, "\x7f");
        assert_eq!(shell.line(), "acd");
        assert_eq!(io.screen(), "\x1b[D\x1b[Kcd\x1b[2D");

        io.clear_output();
        feed(&mut shell, &mut io, csi::DELETE);
        assert_eq!(shell.line(), "ad");
        assert_eq!(io.screen(), "\x1b[Kd\x1b[D");
    }

    #[test]
    fn delete_to_home_and_end() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, Keys::new().add("hello world").add("\t"));
        for _ in 0..5 {
            feed(&mut shell, &mut io, csi::LEFT);
        }
        io.clear_output();

        // Ctrl-U
        feed(&mut shell, &mut io, "\x15");
        assert_eq!(shell.line(), "world");
        assert_eq!(io.screen(), "\r\x1b[11C\x1b[Kworld\x1b[5D");

        feed(&mut shell, &mut io, csi::RIGHT);
        io.clear_output();

        // Ctrl-K
        feed(&mut shell, &mut io, "\x0b");
        assert_eq!(shell.line(), "w");
        assert_eq!(io.screen(), "\x1b[K");

        feed(&mut shell, &mut io, csi::HOME);
        io.clear_output();
        feed(&mut shell, &mut io, "\x0b");
        assert_eq!(shell.line(), "");
        assert_eq!(io.screen(), "\r\x1b[11C\x1b[K");
    }

    #[test]
    fn delete_to_home_and_end_in_line_mode() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, "abc");
        io.clear_output();

        // Ctrl-K, nothing after the cursor
        feed(&mut shell, &mut io, "\x0b");
        assert_eq!(shell.line(), "abc");
        assert_eq!(io.screen(), "");

        // Ctrl-U
        feed(&mut shell, &mut io, "\x15");
        assert_eq!(shell.line(), "");
        assert_eq!(io.screen(), "\r\x1b[11C\x1b[K");

        feed(&mut shell, &mut io, "itest 2\r");
        assert_eq!(shell.last_outcome(), Some(Outcome::Executed(2)));
    }

    #[test]
    fn delete_key_in_line_mode_clears() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, "itest 1");
        io.clear_output();
        feed(&mut shell, &mut io, csi::DELETE);

        assert_eq!(shell.line(), "");
        assert_eq!(io.screen(), "\r\x1b[11C\x1b[K");
    }

    #[test]
    fn history_recall() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, ["itest 1\r", "itest 2\r", "vtest\r"]);
        io.clear_output();

        feed(&mut shell, &mut io, csi::UP);
        assert_eq!(shell.line(), "vtest");
        assert_eq!(io.screen(), "\r\x1b[11C\x1b[Kvtest");

        feed(&mut shell, &mut io, csi::UP);
        assert_eq!(shell.line(), "itest 2");
        feed(&mut shell, &mut io, csi::DOWN);
        assert_eq!(shell.line(), "vtest");

        feed(&mut shell, &mut io, "\r");
        assert_eq!(shell.last_outcome(), Some(Outcome::Executed(0)));
        assert_eq!(shell.history().unwrap().len(), 3);
    }

    #[test]
    fn failed_lines_are_remembered() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, "nope\r");

        let history = shell.history().unwrap();
        assert_eq!(history.get(0), Some(&b"nope"[..]));
    }

    #[test]
    fn history_disabled() {
        let (mut shell, _) = shell_with(ShellConfig {
            history_depth: 0,
            ..config()
        });
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, "itest 1\r");
        io.clear_output();
        feed(&mut shell, &mut io, csi::UP);

        assert!(shell.history().is_none());
        assert_eq!(shell.line(), "");
        assert_eq!(io.screen(), "");
    }

    #[test]
    fn history_is_persisted() {
        let storage = MemoryStorage::with_lines(&["itest 7", "vtest"]);
        let calls = Calls::default();
        let mut shell = ShellBuilder::from_command_set(commands(&calls))
            .with_config(config())
            .with_history_storage(storage.clone())
            .build();
        let mut io = MockIO::new("");

        assert_eq!(shell.history().unwrap().len(), 2);

        feed(&mut shell, &mut io, ["itest 8\r", "vtest\r"]);
        assert_eq!(storage.lines(), ["itest 7", "vtest", "itest 8"]);

        feed(&mut shell, &mut io, csi::UP);
        assert_eq!(shell.line(), "itest 8");
    }

    #[test]
    fn recalled_line_is_completed() {
        let storage = MemoryStorage::with_lines(&["sit"]);
        let calls = Calls::default();
        let mut shell = ShellBuilder::from_command_set(commands(&calls))
            .with_config(ShellConfig {
                autocomplete: true,
                ..config()
            })
            .with_history_storage(storage)
            .build();
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, csi::UP);

        assert_eq!(shell.line(), "sitest ");
        assert_eq!(io.screen(), "\r\x1b[11C\x1b[Ksitest ");

        feed(&mut shell, &mut io, "\"x\" 6\r");
        assert_eq!(shell.last_outcome(), Some(Outcome::Executed(6)));
        assert_eq!(*calls.borrow(), ["x"]);
    }

    #[test]
    fn autocomplete_while_typing() {
        let (mut shell, _) = shell_with(ShellConfig {
            autocomplete: true,
            ..config()
        });
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, "i");
        assert_eq!(shell.line(), "i");

        feed(&mut shell, &mut io, "t");
        assert_eq!(shell.line(), "itest ");
        assert_eq!(io.screen(), "itest ");

        feed(&mut shell, &mut io, "9\r");
        assert_eq!(shell.last_outcome(), Some(Outcome::Executed(9)));
    }

    #[test]
    fn autocomplete_cycles_on_arrows() {
        let (mut shell, _) = shell_with(ShellConfig {
            autocomplete: true,
            ..config()
        });
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, "s");
        assert_eq!(shell.line(), "s");
        io.clear_output();

        feed(&mut shell, &mut io, csi::RIGHT);
        assert_eq!(shell.line(), "stest ");
        assert_eq!(io.screen(), "\r\x1b[11C\x1b[Kstest ");

        feed(&mut shell, &mut io, csi::RIGHT);
        assert_eq!(shell.line(), "sitest ");

        feed(&mut shell, &mut io, csi::LEFT);
        assert_eq!(shell.line(), "stest ");
    }

    #[test]
    fn backspace_to_empty_reloads_candidates() {
        let (mut shell, _) = shell_with(ShellConfig {
            autocomplete: true,
            ..config()
        });
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, ["z", "\x7f", "v"]);

        assert_eq!(shell.line(), "vtest ");
    }

    #[test]
    fn toggles_need_configuration() {
        let (mut shell, _) = shell_with(ShellConfig {
            edit_mode: false,
            ..config()
        });
        let mut io = MockIO::new("");

        feed(&mut shell, &mut io, "ab\t");

        assert!(!shell.is_edit_mode());
        assert_eq!(io.screen(), "ab");
    }

    #[test]
    fn colored_output() {
        let (mut shell, _) = shell_with(ShellConfig {
            colors: true,
            smart_prompt: false,
            ..config()
        });
        let mut io = MockIO::new("");

        shell.execute("itest 10", &mut io).unwrap();
        shell.print_prompt(&mut io).unwrap();

        assert_eq!(
            io.output(),
            "\r\x1b[92m=> 10 (0xA)\x1b[0m\n\r\x1b[96mtest> \x1b[0m"
        );
    }

    #[test]
    fn run_until_input_closes() {
        let (mut shell, _) = shell_with(config());
        let mut io = MockIO::new("itest 3\r");

        assert!(matches!(shell.run(&mut io), Err(ShellError::Aborted)));
        assert_eq!(shell.last_outcome(), Some(Outcome::Executed(3)));
        assert!(io.screen().starts_with("\raHe\":test> itest 3"));
    }
}
