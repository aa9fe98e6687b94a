use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use crossbeam::channel::{Receiver, Sender};

use crate::error::{HistoryError, ShellError};
use crate::history::HistoryStorage;
use crate::input::ControlCharacter;
use crate::io::{SyncIO, IO};
use crate::output::{HIDE_CURSOR, SHOW_CURSOR};

pub mod csi {
    pub const UP: &str = "\x1b[A";
    pub const DOWN: &str = "\x1b[B";
    pub const RIGHT: &str = "\x1b[C";
    pub const LEFT: &str = "\x1b[D";
    pub const HOME: &str = "\x1b[1~";
    pub const INSERT: &str = "\x1b[2~";
    pub const DELETE: &str = "\x1b[3~";
    pub const END: &str = "\x1b[4~";
}

pub trait AsByteVec {
    fn as_byte_vec(self) -> Vec<u8>;
}

impl AsByteVec for &str {
    fn as_byte_vec(self) -> Vec<u8> {
        self.bytes().collect()
    }
}

impl AsByteVec for &[u8] {
    fn as_byte_vec(self) -> Vec<u8> {
        self.to_vec()
    }
}

impl AsByteVec for ControlCharacter {
    fn as_byte_vec(self) -> Vec<u8> {
        vec![self.into()]
    }
}

impl<const N: usize> AsByteVec for [&str; N] {
    fn as_byte_vec(self) -> Vec<u8> {
        self.iter().flat_map(|s| s.bytes()).collect()
    }
}

impl<const N: usize> AsByteVec for [ControlCharacter; N] {
    fn as_byte_vec(self) -> Vec<u8> {
        self.into_iter().map(|c| c.into()).collect()
    }
}

/// Scripted key input
#[derive(Default)]
pub struct Keys {
    bytes: Vec<u8>,
}

impl Keys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, input: impl AsByteVec) -> Self {
        self.bytes.extend(input.as_byte_vec());
        self
    }
}

impl AsByteVec for Keys {
    fn as_byte_vec(self) -> Vec<u8> {
        self.bytes
    }
}

/// In-memory terminal: input is consumed one byte per read, output is
/// collected.
#[derive(Default)]
pub struct MockIO {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl MockIO {
    pub fn new(input: impl AsByteVec) -> Self {
        Self {
            input: input.as_byte_vec().into(),
            output: Vec::new(),
        }
    }

    pub fn push_input(&mut self, input: impl AsByteVec) {
        self.input.extend(input.as_byte_vec());
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Output without the cursor hide/show brackets
    pub fn screen(&self) -> String {
        self.output()
            .replace(HIDE_CURSOR, "")
            .replace(SHOW_CURSOR, "")
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }
}

impl SyncIO for MockIO {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ShellError> {
        match (buf.first_mut(), self.input.pop_front()) {
            (Some(slot), Some(byte)) => {
                *slot = byte;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), ShellError> {
        self.output.extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ShellError> {
        Ok(())
    }
}

pub struct ChannelReader(Receiver<u8>);

impl embedded_io::ErrorType for ChannelReader {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }

        // A closed channel ends the input
        match self.0.recv() {
            Ok(byte) => {
                buf[0] = byte;
                Ok(1)
            }
            Err(_) => Ok(0),
        }
    }
}

pub struct ChannelWriter {
    tx: Sender<u8>,
    buffer: Vec<u8>,
}

impl embedded_io::ErrorType for ChannelWriter {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        for byte in self.buffer.drain(..) {
            self.tx
                .send(byte)
                .map_err(|_| embedded_io::ErrorKind::BrokenPipe)?;
        }

        Ok(())
    }
}

/// Shell I/O over a pair of channels, for running the blocking loop on
/// a separate thread
pub fn channel_io(rx: Receiver<u8>, tx: Sender<u8>) -> IO<ChannelReader, ChannelWriter> {
    IO::new(
        ChannelReader(rx),
        ChannelWriter {
            tx,
            buffer: Vec::new(),
        },
    )
}

/// History storage kept in memory, shared with the test through clones
#[derive(Clone, Default)]
pub struct MemoryStorage(pub Rc<RefCell<Vec<Vec<u8>>>>);

impl MemoryStorage {
    pub fn with_lines(lines: &[&str]) -> Self {
        let storage = Self::default();

        storage
            .0
            .borrow_mut()
            .extend(lines.iter().map(|line| line.as_bytes().to_vec()));
        storage
    }

    pub fn lines(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }
}

impl HistoryStorage for MemoryStorage {
    fn load(&mut self, sink: &mut dyn FnMut(&[u8])) -> Result<(), HistoryError> {
        for line in self.0.borrow().iter() {
            sink(line);
        }

        Ok(())
    }

    fn append(&mut self, line: &[u8]) -> Result<(), HistoryError> {
        self.0.borrow_mut().push(line.to_vec());
        Ok(())
    }
}
