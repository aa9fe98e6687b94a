//! Line history
//!
//! [`CircularHistory`] keeps the last `depth` distinct lines in a ring of
//! slots. Each slot owns its bytes and keeps its allocation when it is
//! overwritten, growing it only when a longer line comes in.
//!
//! Lines can be persisted through a [`HistoryStorage`]; with the `std`
//! feature, [`FileHistory`] stores them one per line in a text file.

use alloc::vec::Vec;

use crate::{error::HistoryError, Direction};

const UNSET: isize = -1;

/// How much of the store [`CircularHistory::deinit`] releases
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Deinit {
    /// Clear positions and flags, keep every allocation
    Reset,
    /// Free the slot payloads but keep the slot table, ready to reload
    Partial,
    /// Free everything, the store is unusable afterwards
    Full,
}

pub struct CircularHistory {
    slots: Vec<Vec<u8>>,
    depth: usize,
    write: usize,
    read: isize,
    full: bool,
    empty: bool,
    last_direction: Option<Direction>,
}

impl CircularHistory {
    pub fn new(depth: usize) -> Result<Self, HistoryError> {
        let mut slots = Vec::new();

        slots
            .try_reserve_exact(depth)
            .map_err(|_| HistoryError::OutOfMemory)?;
        slots.resize_with(depth, Vec::new);

        Ok(Self {
            slots,
            depth,
            write: 0,
            read: UNSET,
            full: false,
            empty: true,
            last_direction: None,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of valid entries
    pub fn len(&self) -> usize {
        if self.full {
            self.depth
        } else {
            self.write
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn is_initialized(&self) -> bool {
        self.depth > 0 && self.slots.len() == self.depth
    }

    pub fn read_position(&self) -> Option<usize> {
        usize::try_from(self.read).ok()
    }

    fn contains(&self, bytes: &[u8]) -> bool {
        self.slots[..self.len()]
            .iter()
            .any(|slot| slot.as_slice() == bytes)
    }

    /// Store a line. Returns `Ok(false)` when the line is empty or
    /// already present.
    pub fn write(&mut self, bytes: &[u8]) -> Result<bool, HistoryError> {
        if !self.is_initialized() {
            return Err(HistoryError::Uninitialized);
        }

        if bytes.is_empty() || self.contains(bytes) {
            return Ok(false);
        }

        let slot = &mut self.slots[self.write];

        // Grow first, the old entry stays intact if this fails
        slot.try_reserve(bytes.len().saturating_sub(slot.len()))
            .map_err(|_| HistoryError::OutOfMemory)?;
        slot.clear();
        slot.extend_from_slice(bytes);

        self.read = self.write as isize;
        self.write = (self.write + 1) % self.depth;
        self.empty = false;

        if self.write == 0 {
            self.full = true;
        }

        log::trace!("history write slot {}, {} entries", self.read, self.len());

        Ok(true)
    }

    /// Step through the ring.
    ///
    /// The first read after a write returns the line just written.
    /// Reversing direction jumps two slots so that the entry shown last
    /// is not shown again.
    pub fn read(&mut self, direction: Direction) -> Result<&[u8], HistoryError> {
        if self.empty {
            return Err(HistoryError::Empty);
        }

        let size = self.len() as isize;

        if let Some(last) = self.last_direction {
            if last != direction {
                self.read += match direction {
                    Direction::Backward => -2,
                    Direction::Forward => 2,
                };
            }
        }

        self.read = if self.read == UNSET {
            match direction {
                Direction::Backward => size - 1,
                Direction::Forward => 0,
            }
        } else {
            self.read.rem_euclid(size)
        };

        let index = self.read as usize;

        if self.slots[index].is_empty() {
            return Err(HistoryError::NoEntry);
        }

        self.read += match direction {
            Direction::Backward => -1,
            Direction::Forward => 1,
        };
        self.last_direction = Some(direction);

        log::trace!("history read slot {}, next {}", index, self.read);

        Ok(&self.slots[index])
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        if index < self.len() {
            Some(&self.slots[index])
        } else {
            None
        }
    }

    /// Entries in storage order
    pub fn entries(&self) -> impl Iterator<Item = (usize, &[u8])> {
        self.slots[..self.len()]
            .iter()
            .enumerate()
            .map(|(i, slot)| (i, slot.as_slice()))
    }

    pub fn deinit(&mut self, mode: Deinit) {
        self.write = 0;
        self.read = UNSET;
        self.full = false;
        self.empty = true;
        self.last_direction = None;

        match mode {
            Deinit::Reset => (),
            Deinit::Partial => self.slots.iter_mut().for_each(|slot| *slot = Vec::new()),
            Deinit::Full => self.slots = Vec::new(),
        }
    }
}

/// Backing store for history lines
pub trait HistoryStorage {
    /// Hand every stored line to `sink`, oldest first
    fn load(&mut self, sink: &mut dyn FnMut(&[u8])) -> Result<(), HistoryError>;

    /// Persist one accepted line
    fn append(&mut self, line: &[u8]) -> Result<(), HistoryError>;
}

#[cfg(any(test, feature = "std"))]
mod file {
    use super::*;

    use std::{
        fs::OpenOptions,
        io::{self, BufRead, BufReader, Write},
        path::PathBuf,
        string::String,
    };

    /// Text file with one history line per line
    pub struct FileHistory {
        path: PathBuf,
    }

    impl FileHistory {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// `.hist_<name>` in the working directory
        pub fn for_instance(name: &str) -> Self {
            let mut file = String::from(".hist_");
            file.push_str(name);
            Self::new(file)
        }

        pub fn path(&self) -> &std::path::Path {
            &self.path
        }
    }

    impl HistoryStorage for FileHistory {
        fn load(&mut self, sink: &mut dyn FnMut(&[u8])) -> Result<(), HistoryError> {
            let file = match OpenOptions::new().read(true).open(&self.path) {
                Ok(file) => file,
                Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
                Err(err) => {
                    log::warn!("cannot open {}: {}", self.path.display(), err);
                    return Err(HistoryError::Storage);
                }
            };

            for line in BufReader::new(file).split(b'\n') {
                let mut line = line.map_err(|_| HistoryError::Storage)?;

                if line.last() == Some(&b'\r') {
                    line.pop();
                }

                sink(&line);
            }

            Ok(())
        }

        fn append(&mut self, line: &[u8]) -> Result<(), HistoryError> {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|err| {
                    log::warn!("cannot open {}: {}", self.path.display(), err);
                    HistoryError::Storage
                })?;

            file.write_all(line)
                .and_then(|_| file.write_all(b"\n"))
                .map_err(|_| HistoryError::Storage)
        }
    }
}

#[cfg(any(test, feature = "std"))]
pub use file::FileHistory;
