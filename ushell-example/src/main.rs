use std::cell::Cell;
use std::fs::File;
use std::io::{self, Write};
use std::rc::Rc;

use log::LevelFilter;
use simplelog::{Config, WriteLogger};
use termion::raw::IntoRawMode;
use ushell::{
    config::ParamLimits,
    history::FileHistory,
    io::{
        std_sync::{StdinWrapper, StdoutWrapper},
        IO,
    },
    CommandSet, Handler, Shell, ShellBuilder, ShellConfig, ShellStack,
};

const LOG_FILE: &str = "ushell-demo.log";

/// Handlers print straight to the raw terminal
fn say(text: std::fmt::Arguments<'_>) {
    let mut stdout = io::stdout();
    let _ = write!(stdout, "{}\n\r", text);
    let _ = stdout.flush();
}

fn plugin() -> Shell {
    let pings = Rc::new(Cell::new(0u32));
    let count = pings.clone();

    let commands = CommandSet::new()
        .command(
            "ping",
            "answer with pong | counts the pings of this session",
            Handler::Void(Box::new(move || {
                pings.set(pings.get() + 1);
                say(format_args!("pong"));
                0
            })),
        )
        .command(
            "count",
            "number of pings",
            Handler::Void(Box::new(move || count.get() as i32)),
        );

    ShellBuilder::from_command_set(commands)
        .with_config(ShellConfig {
            history_depth: 10,
            ..ShellConfig::new("plugin")
        })
        .with_history_storage(FileHistory::for_instance("plugin"))
        .build()
}

fn root() -> Shell {
    let commands = CommandSet::new();
    let nested = commands.nested_slot();

    let commands = commands
        .command(
            "led",
            "switch the led | 0 off, 1 on",
            Handler::Bool(Box::new(|on| {
                say(format_args!("led {}", if on { "on" } else { "off" }));
                on as i32
            })),
        )
        .command(
            "add",
            "add two numbers",
            Handler::U32U32(Box::new(|a, b| a.wrapping_add(b) as i32)),
        )
        .command(
            "echo",
            "print a string | quote it to keep spaces: echo \"a b\"",
            Handler::Str(Box::new(|s| {
                say(format_args!("{}", s));
                s.len() as i32
            })),
        )
        .command(
            "repeat",
            "print a string n times",
            Handler::StrU32(Box::new(|s, n| {
                for _ in 0..n {
                    say(format_args!("{}", s));
                }
                n as i32
            })),
        )
        .command(
            "scale",
            "multiply by 2.5",
            Handler::F32(Box::new(|x| {
                say(format_args!("{}", x * 2.5));
                0
            })),
        )
        .command(
            "byte",
            "show a byte in binary",
            Handler::U8(Box::new(|b| {
                say(format_args!("{:08b}", b));
                b.into()
            })),
        )
        .command(
            "peek",
            "read an address | 64 bit address, 32 bit length, verbose flag",
            Handler::U64U32Bool(Box::new(|addr, len, verbose| {
                if verbose {
                    say(format_args!("peek {:#x}+{}", addr, len));
                }
                0
            })),
        )
        .command_with_signature(
            "sum",
            "iiii",
            "add four numbers",
            Handler::Raw(Box::new(|command| {
                command.u32s().iter().fold(0u32, |a, b| a.wrapping_add(*b)) as i32
            })),
        )
        .command(
            "plugin",
            "start the plugin shell | leave it with #q",
            Handler::Void(Box::new(move || {
                nested.enter(plugin());
                0
            })),
        );

    ShellBuilder::from_command_set(commands)
        .with_config(ShellConfig {
            echo_toggle: true,
            confirm_exit: true,
            limits: ParamLimits::all(),
            ..ShellConfig::new("root")
        })
        .with_shortcut(b'.', ".<text> : print text", |args| {
            say(format_args!("shortcut . got '{}'", args))
        })
        .with_placeholder_shortcut(b'/', "/<path> : reserved")
        .with_history_storage(FileHistory::for_instance("root"))
        .build()
}

fn main() {
    match File::create(LOG_FILE) {
        Ok(file) => {
            let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), file);
        }
        Err(err) => eprintln!("no log file {}: {}", LOG_FILE, err),
    }

    let _raw = match io::stdout().into_raw_mode() {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("cannot enter raw mode: {}", err);
            return;
        }
    };

    let mut io: IO<StdinWrapper, StdoutWrapper> = IO::default();
    let mut stack = ShellStack::new(root());

    if let Err(err) = stack.run(&mut io) {
        log::error!("shell stopped: {}", err);
    }
}
