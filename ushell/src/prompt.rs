//! Prompt rendering
//!
//! The smart prompt shows the state of the switchable features, one
//! letter each, upper case when on:
//!
//! ```text
//! AHe":root>
//! ```
//!
//! `A` autocomplete, `H` history, `E` edit mode, followed by the
//! bordered-string quote character and the instance name. Only letter
//! case and the quote change at runtime, so the prompt width is fixed
//! for an instance.

use core::fmt::Write;

use heapless::String;

pub const PROMPT_MAX_LEN: usize = 32;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PromptState {
    pub autocomplete: bool,
    pub history: bool,
    pub edit: bool,
    pub quote: u8,
}

fn letter(on: bool, c: char) -> char {
    if on {
        c.to_ascii_uppercase()
    } else {
        c.to_ascii_lowercase()
    }
}

/// Render the prompt. `state` is `None` for the plain `name> ` form.
/// Names too long for the prompt are cut.
pub fn render(name: &str, state: Option<PromptState>) -> String<PROMPT_MAX_LEN> {
    let mut prompt = String::new();

    if let Some(state) = state {
        let _ = prompt.push(letter(state.autocomplete, 'a'));
        let _ = prompt.push(letter(state.history, 'h'));
        let _ = prompt.push(letter(state.edit, 'e'));
        let _ = prompt.push(state.quote as char);
        let _ = prompt.push(':');
    }

    let mut room = (PROMPT_MAX_LEN - prompt.len() - 2).min(name.len());
    while !name.is_char_boundary(room) {
        room -= 1;
    }
    let name = &name[..room];
    let _ = write!(prompt, "{}> ", name);

    prompt
}
