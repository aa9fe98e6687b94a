//! Byte I/O
//!
//! The shell reads one byte at a time and writes through [`SyncIO`].
//! [`IO`] adapts any [`embedded_io::Read`] + [`embedded_io::Write`] pair.

use core::fmt;

use embedded_io::Error;

use crate::error::ShellError;

pub trait SyncIO {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ShellError>;
    fn write(&mut self, buf: &[u8]) -> Result<(), ShellError>;
    fn flush(&mut self) -> Result<(), ShellError>;

    /// Blocking read of a single byte. A closed input yields
    /// [`ShellError::Aborted`].
    fn read_byte(&mut self) -> Result<u8, ShellError> {
        let mut buf = [0];

        match self.read(&mut buf)? {
            0 => Err(ShellError::Aborted),
            _ => Ok(buf[0]),
        }
    }

    fn write_str(&mut self, s: &str) -> Result<(), ShellError> {
        self.write(s.as_bytes())
    }

    /// Formatted output, makes `write!` usable on any `SyncIO`
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), ShellError> {
        let mut adapter = Adapter {
            io: self,
            error: None,
        };

        match fmt::write(&mut adapter, args) {
            Ok(()) => Ok(()),
            Err(_) => Err(adapter
                .error
                .unwrap_or(ShellError::WriteError(embedded_io::ErrorKind::Other))),
        }
    }
}

struct Adapter<'a, T: ?Sized> {
    io: &'a mut T,
    error: Option<ShellError>,
}

impl<T: SyncIO + ?Sized> fmt::Write for Adapter<'_, T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.io.write(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}

impl<T: SyncIO + ?Sized> SyncIO for &mut T {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ShellError> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), ShellError> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> Result<(), ShellError> {
        (**self).flush()
    }
}

pub struct IO<R, W>
where
    R: embedded_io::Read,
    W: embedded_io::Write,
{
    input: R,
    output: W,
}

impl<R, W> IO<R, W>
where
    R: embedded_io::Read,
    W: embedded_io::Write,
{
    /// Create IO wrapper from input and output
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume wrapper and return input and output as tuple
    pub fn take(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R, W> SyncIO for IO<R, W>
where
    R: embedded_io::Read,
    W: embedded_io::Write,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ShellError> {
        self.input
            .read(buf)
            .map_err(|e| ShellError::ReadError(e.kind()))
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), ShellError> {
        self.output
            .write_all(buf)
            .map_err(|e| ShellError::WriteError(e.kind()))
    }

    fn flush(&mut self) -> Result<(), ShellError> {
        self.output
            .flush()
            .map_err(|e| ShellError::WriteError(e.kind()))
    }
}

#[cfg(feature = "std")]
pub mod std_sync {
    //! Wrappers for the process stdin and stdout

    use super::*;
    use std::io::{Read, Stdin, Stdout, Write};

    impl Default for IO<StdinWrapper, StdoutWrapper> {
        fn default() -> Self {
            Self::new(StdinWrapper::new(), StdoutWrapper::new())
        }
    }

    pub struct StdinWrapper(Stdin);

    impl StdinWrapper {
        pub fn new() -> Self {
            Self(std::io::stdin())
        }
    }

    impl Default for StdinWrapper {
        fn default() -> Self {
            Self::new()
        }
    }

    impl embedded_io::ErrorType for StdinWrapper {
        type Error = embedded_io::ErrorKind;
    }

    impl embedded_io::Read for StdinWrapper {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            if buf.is_empty() {
                return Ok(0);
            }

            // Zero bytes signals end of input
            self.0.read(&mut buf[..1]).map_err(|e| e.kind().into())
        }
    }

    pub struct StdoutWrapper(Stdout);

    impl StdoutWrapper {
        pub fn new() -> Self {
            Self(std::io::stdout())
        }
    }

    impl Default for StdoutWrapper {
        fn default() -> Self {
            Self::new()
        }
    }

    impl embedded_io::ErrorType for StdoutWrapper {
        type Error = embedded_io::ErrorKind;
    }

    impl embedded_io::Write for StdoutWrapper {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.0.write(buf).map_err(|e| e.kind().into())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            self.0.flush().map_err(|e| e.kind().into())
        }
    }
}
