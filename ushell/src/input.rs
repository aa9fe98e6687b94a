//! Key decoding
//!
//! Turns raw input bytes into [`Key`]s. Escape sequences are resolved
//! by a small state machine that consumes up to three bytes after the
//! escape lead byte; anything it does not recognize is dropped.

use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Eq, PartialEq, Copy, Clone, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ControlCharacter {
    CtrlH = 0x08,
    Tab = 0x09,
    LineFeed = 0x0A,
    CtrlK = 0x0B,
    CarriageReturn = 0x0D,
    CtrlU = 0x15,
    CtrlV = 0x16,
    Escape = 0x1B,
    Backspace = 0x7F,
}

/// Decoded key press
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Key {
    Enter,
    Backspace,
    Tab,
    Insert,
    Delete,
    /// Ctrl-U
    DeleteToHome,
    /// Ctrl-K
    DeleteToEnd,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Char(u8),
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
enum State {
    Ground,
    Escape,
    Bracket,
    Tilde(u8),
}

pub struct KeyDecoder {
    state: State,
    after_cr: bool,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            after_cr: false,
        }
    }

    pub fn advance(&mut self, byte: u8) -> Option<Key> {
        let after_cr = core::mem::take(&mut self.after_cr);

        match self.state {
            State::Ground => self.ground(byte, after_cr),
            State::Escape => {
                self.state = if byte == b'[' {
                    State::Bracket
                } else {
                    State::Ground
                };
                None
            }
            State::Bracket => {
                self.state = State::Ground;

                match byte {
                    b'A' => Some(Key::Up),
                    b'B' => Some(Key::Down),
                    b'C' => Some(Key::Right),
                    b'D' => Some(Key::Left),
                    b'H' => Some(Key::Home),
                    b'F' | b'K' => Some(Key::End),
                    b'~' => Some(Key::Delete),
                    b'1'..=b'6' => {
                        self.state = State::Tilde(byte);
                        None
                    }
                    _ => None,
                }
            }
            State::Tilde(arg) => {
                self.state = State::Ground;

                if byte != b'~' {
                    return None;
                }

                match arg {
                    b'1' => Some(Key::Home),
                    b'2' => Some(Key::Insert),
                    b'3' => Some(Key::Delete),
                    b'4' => Some(Key::End),
                    // page up / page down
                    _ => None,
                }
            }
        }
    }

    fn ground(&mut self, byte: u8, after_cr: bool) -> Option<Key> {
        use ControlCharacter::*;

        match ControlCharacter::try_from(byte) {
            Ok(CarriageReturn) => {
                self.after_cr = true;
                Some(Key::Enter)
            }
            Ok(LineFeed) if after_cr => None,
            Ok(LineFeed) => Some(Key::Enter),
            Ok(Backspace) | Ok(CtrlH) => Some(Key::Backspace),
            Ok(Tab) => Some(Key::Tab),
            Ok(CtrlU) => Some(Key::DeleteToHome),
            Ok(CtrlK) => Some(Key::DeleteToEnd),
            Ok(CtrlV) => Some(Key::Insert),
            Ok(Escape) => {
                self.state = State::Escape;
                None
            }
            Err(_) => match byte {
                0x20..=0x7e => Some(Key::Char(byte)),
                _ => None,
            },
        }
    }
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self::new()
    }
}
