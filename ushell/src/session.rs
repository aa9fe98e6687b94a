//! Nested shells
//!
//! A command can start another shell instance (see
//! [`NestedSlot`](crate::command::NestedSlot)). [`ShellStack`] keeps the
//! running instances and feeds input to the innermost one. When it
//! quits, control returns to its parent, which reloads its history and
//! prints its prompt again.

use alloc::vec::Vec;

use crate::{engine::Shell, error::ShellError, history::Deinit, io::SyncIO};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct ShellStack {
    shells: Vec<Shell>,
}

impl ShellStack {
    pub fn new(root: Shell) -> Self {
        let mut shells = Vec::new();
        shells.push(root);

        Self { shells }
    }

    /// Number of running shells
    pub fn depth(&self) -> usize {
        self.shells.len()
    }

    /// The shell receiving input
    pub fn top(&self) -> Option<&Shell> {
        self.shells.last()
    }

    /// Print the banner, then handle input until the root shell quits
    pub fn run<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        let Some(root) = self.shells.first() else {
            return Ok(());
        };

        let colors = root.config().colors();
        write!(io, "{}uShell v{} [info: ###]{}\n", colors.list, VERSION, colors.reset)?;
        root.print_prompt(io)?;

        while let Some(top) = self.shells.last_mut() {
            let byte = io.read_byte()?;
            top.process_byte(byte, io)?;

            if let Some(nested) = top.take_nested() {
                log::info!("{}: enter {}", top.config().name, nested.config().name);

                nested.print_prompt(io)?;
                self.shells.push(nested);
            } else if !top.is_running() {
                self.leave(io)?;
            }
        }

        Ok(())
    }

    fn leave<IO: SyncIO>(&mut self, io: &mut IO) -> Result<(), ShellError> {
        let Some(mut done) = self.shells.pop() else {
            return Ok(());
        };

        done.deinit_history(Deinit::Full);

        let Some(parent) = self.shells.last_mut() else {
            log::info!("{}: exit", done.config().name);
            io.write_str("uShell exit!\n\r")?;
            return io.flush();
        };

        log::info!("{}: back from {}", parent.config().name, done.config().name);

        if let Err(err) = parent.load_history() {
            log::debug!("{}: history not reloaded, {}", parent.config().name, err);
        }

        parent.print_prompt(io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ShellBuilder;
    use crate::command::{CommandSet, Handler};
    use crate::config::ShellConfig;
    use crate::testlib::{channel_io, MemoryStorage, MockIO};
    use core::cell::Cell;
    use alloc::boxed::Box;
    use std::rc::Rc;
    use std::string::String;
    use std::thread;

    fn config(name: &'static str) -> ShellConfig {
        ShellConfig {
            colors: false,
            autocomplete: false,
            ..ShellConfig::new(name)
        }
    }

    fn plugin(pings: Rc<Cell<u32>>) -> Shell {
        let commands = CommandSet::new().command(
            "ping",
            "count pings",
            Handler::Void(Box::new(move || {
                pings.set(pings.get() + 1);
                5
            })),
        );

        ShellBuilder::from_command_set(commands)
            .with_config(ShellConfig {
                smart_prompt: false,
                ..config("plugin")
            })
            .build()
    }

    fn root(pings: Rc<Cell<u32>>) -> Shell {
        let commands = CommandSet::new();
        let slot = commands.nested_slot();

        let commands = commands.command(
            "plugin",
            "start the plugin shell",
            Handler::Void(Box::new(move || {
                slot.enter(plugin(pings.clone()));
                0
            })),
        );

        ShellBuilder::from_command_set(commands)
            .with_config(config("root"))
            .build()
    }

    #[test]
    fn quit_root() {
        let mut stack = ShellStack::new(root(Rc::default()));
        let mut io = MockIO::new("#q\r");

        stack.run(&mut io).unwrap();

        assert_eq!(stack.depth(), 0);
        assert_eq!(
            io.screen(),
            format!("uShell v{} [info: ###]\n\raHe\":root> #q\n\ruShell exit!\n\r", VERSION)
        );
    }

    #[test]
    fn nested_shell_gets_input() {
        let pings = Rc::new(Cell::new(0));
        let mut stack = ShellStack::new(root(pings.clone()));
        let mut io = MockIO::new("plugin\rping\rping\r");

        assert!(matches!(stack.run(&mut io), Err(ShellError::Aborted)));

        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.top().unwrap().config().name, "plugin");
        assert_eq!(pings.get(), 2);
    }

    #[test]
    fn parent_resumes() {
        let mut stack = ShellStack::new(root(Rc::default()));
        let mut io = MockIO::new("plugin\r#q\r#q\r");

        stack.run(&mut io).unwrap();

        let screen: String = io.screen();
        assert_eq!(
            screen,
            format!(
                "uShell v{} [info: ###]\n\
                 \raHe\":root> plugin\n\r\r=> 0 (0x0)\n\
                 \rplugin> #q\n\r\
                 \raHe\":root> #q\n\r\
                 uShell exit!\n\r",
                VERSION
            )
        );
    }

    #[test]
    fn parent_history_is_reloaded() {
        let storage = MemoryStorage::with_lines(&["plugin"]);
        let commands = CommandSet::new();
        let slot = commands.nested_slot();
        let commands = commands.command(
            "plugin",
            "",
            Handler::Void(Box::new(move || {
                slot.enter(plugin(Rc::default()));
                0
            })),
        );
        let shell = ShellBuilder::from_command_set(commands)
            .with_config(config("root"))
            .with_history_storage(storage.clone())
            .build();

        let mut stack = ShellStack::new(shell);
        let mut io = MockIO::new("plugin\r#q\r");

        assert!(matches!(stack.run(&mut io), Err(ShellError::Aborted)));

        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top().unwrap().history().unwrap().len(), 1);

        // an entry stored while the plugin ran shows up in the parent
        storage.0.borrow_mut().push(b"plugin 2".to_vec());
        let mut io = MockIO::new("plugin\r#q\r");
        assert!(matches!(stack.run(&mut io), Err(ShellError::Aborted)));
        assert_eq!(stack.top().unwrap().history().unwrap().len(), 2);
    }

    #[test]
    fn threaded_session() {
        let (input_tx, input_rx) = crossbeam::channel::unbounded();
        let (output_tx, output_rx) = crossbeam::channel::unbounded();

        let handle = thread::spawn(move || {
            let mut io = channel_io(input_rx, output_tx);
            let mut stack = ShellStack::new(root(Rc::default()));

            stack.run(&mut io).map(|_| stack.depth())
        });

        for byte in "plugin\r#q\r#q\r".bytes() {
            input_tx.send(byte).unwrap();
        }

        assert_eq!(handle.join().unwrap().unwrap(), 0);

        let output: std::vec::Vec<u8> = output_rx.try_iter().collect();
        assert!(String::from_utf8_lossy(&output).ends_with("uShell exit!\n\r"));
    }
}
