//! Cursor-aware input line

use alloc::vec::Vec;
use core::str::from_utf8;

use crate::Direction;

/// Input line with a cursor.
///
/// The buffer holds at most `capacity - 1` bytes; `capacity` counts a
/// terminator slot, as configured through
/// [`ShellConfig::max_input_len`](crate::config::ShellConfig::max_input_len).
/// Keys only insert printable ASCII. Lines set from history are taken
/// as stored and read as empty text when they are not UTF-8.
pub struct LineBuffer {
    buf: Vec<u8>,
    cursor: usize,
    capacity: usize,
}

impl LineBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn as_str(&self) -> &str {
        from_utf8(&self.buf).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cursor_at_end(&self) -> bool {
        self.cursor == self.buf.len()
    }

    /// Largest content length
    pub fn max_len(&self) -> usize {
        self.capacity.saturating_sub(1)
    }

    pub fn is_full(&self) -> bool {
        self.buf.len() >= self.max_len()
    }

    /// Bytes from the cursor to the end of the line
    pub fn tail(&self) -> &[u8] {
        &self.buf[self.cursor..]
    }

    pub fn first(&self) -> Option<u8> {
        self.buf.first().copied()
    }

    /// Insert at the cursor when `insert` is set and the cursor is not
    /// at the end, otherwise append. Returns false when the line is full.
    pub fn insert_or_append(&mut self, byte: u8, insert: bool) -> bool {
        if self.is_full() {
            return false;
        }

        if insert && self.cursor < self.buf.len() {
            self.buf.insert(self.cursor, byte);
        } else {
            self.buf.push(byte);
            self.cursor = self.buf.len() - 1;
        }

        self.cursor += 1;
        true
    }

    /// Append as much of `bytes` as fits, moving the cursor to the end.
    pub fn extend(&mut self, bytes: &[u8]) -> usize {
        let room = self.max_len().saturating_sub(self.buf.len());
        let count = bytes.len().min(room);

        self.buf.extend_from_slice(&bytes[..count]);
        self.cursor = self.buf.len();
        count
    }

    /// Replace the whole line, moving the cursor to the end.
    pub fn set(&mut self, bytes: &[u8]) {
        self.buf.clear();
        self.extend(bytes);
    }

    pub fn delete_under_cursor(&mut self) -> bool {
        if self.cursor < self.buf.len() {
            self.buf.remove(self.cursor);
            true
        } else {
            false
        }
    }

    pub fn delete_backward(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.buf.remove(self.cursor);
            true
        } else {
            false
        }
    }

    /// Drop the last byte, line mode backspace
    pub fn pop(&mut self) -> Option<u8> {
        let byte = self.buf.pop();
        self.cursor = self.cursor.min(self.buf.len());
        byte
    }

    /// Remove `[0, cursor)`, returns the number of bytes removed.
    pub fn delete_to_home(&mut self) -> usize {
        let removed = self.cursor;

        self.buf.drain(..removed);
        self.cursor = 0;
        removed
    }

    /// Remove `[cursor, len)`, returns the number of bytes removed.
    pub fn delete_to_end(&mut self) -> usize {
        let removed = self.buf.len() - self.cursor;

        self.buf.truncate(self.cursor);
        removed
    }

    /// Step the cursor one column. False when already at the boundary.
    pub fn move_cursor(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Backward if self.cursor > 0 => {
                self.cursor -= 1;
                true
            }
            Direction::Forward if self.cursor < self.buf.len() => {
                self.cursor += 1;
                true
            }
            _ => false,
        }
    }

    /// Move to column 0, returns the number of columns moved.
    pub fn move_home(&mut self) -> usize {
        core::mem::take(&mut self.cursor)
    }

    /// Move past the last byte, returns the number of columns moved.
    pub fn move_end(&mut self) -> usize {
        let steps = self.buf.len() - self.cursor;
        self.cursor = self.buf.len();
        steps
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.buf.len();
    }

    pub fn remove_trailing_spaces(&mut self) {
        while self.buf.last() == Some(&b' ') {
            self.buf.pop();
        }

        self.cursor = self.cursor.min(self.buf.len());
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.cursor = 0;
    }
}
