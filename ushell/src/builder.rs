//! Builder for shells

use alloc::{boxed::Box, vec::Vec};

use crate::{
    command::{CommandSet, Executor},
    config::ShellConfig,
    engine::Shell,
    history::HistoryStorage,
    parser::FunctionDef,
    shortcut::ShortcutRegistry,
};

/// Builder for [`Shell`].
///
/// # Example
/// ```
/// use ushell::builder::ShellBuilder;
/// use ushell::command::{CommandSet, Handler};
/// use ushell::config::ShellConfig;
///
/// let commands = CommandSet::new()
///     .command("led", "switch the led | 0 off, 1 on", Handler::U32(Box::new(|on| on as i32)));
///
/// let shell = ShellBuilder::from_command_set(commands)
///     .with_config(ShellConfig::new("board"))
///     .with_shortcut(b'.', ".<n> : blink n times", |_| ())
///     .build();
///
/// assert_eq!(shell.functions()[0].name, "led");
/// ```
pub struct ShellBuilder {
    config: ShellConfig,
    functions: Vec<FunctionDef>,
    executor: Box<dyn Executor>,
    shortcuts: ShortcutRegistry,
    storage: Option<Box<dyn HistoryStorage>>,
}

impl ShellBuilder {
    /// Create builder for a function table. Commands are not executed
    /// until an executor is set with [`ShellBuilder::with_executor`].
    pub fn new(functions: impl Into<Vec<FunctionDef>>) -> Self {
        Self {
            config: ShellConfig::default(),
            functions: functions.into(),
            executor: Box::new(CommandSet::new()),
            shortcuts: ShortcutRegistry::new(),
            storage: None,
        }
    }

    /// Create builder whose function table and executor come from `commands`
    pub fn from_command_set(commands: CommandSet) -> Self {
        let functions = commands.functions().to_vec();

        Self::new(functions).with_executor(commands)
    }

    pub fn with_config(mut self, config: ShellConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_executor(mut self, executor: impl Executor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    /// Add user shortcut. `help` is shown by `###`.
    pub fn with_shortcut(
        mut self,
        symbol: u8,
        help: &'static str,
        handler: impl FnMut(&str) + 'static,
    ) -> Self {
        self.shortcuts.register(symbol, help, Some(Box::new(handler)));
        self
    }

    /// Reserve a shortcut symbol without a handler
    pub fn with_placeholder_shortcut(mut self, symbol: u8, help: &'static str) -> Self {
        self.shortcuts.register(symbol, help, None);
        self
    }

    /// Load history from `storage` and append accepted lines to it
    pub fn with_history_storage(mut self, storage: impl HistoryStorage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    pub fn build(self) -> Shell {
        log::debug!(
            "{}: {} commands, {} shortcuts",
            self.config.name,
            self.functions.len(),
            self.shortcuts.len()
        );

        Shell::new(
            self.config,
            self.functions,
            self.executor,
            self.shortcuts,
            self.storage,
        )
    }
}
