//! Command name completion
//!
//! Completion works on the function table. Typing narrows a candidate
//! set to the names starting with the current line; the line is then
//! extended with the prefix all candidates share. When cursor keys have
//! nothing to move over, they cycle through the candidates instead.

use alloc::vec::Vec;

use crate::{line_buffer::LineBuffer, parser::FunctionDef, Direction};

pub struct Autocomplete {
    enabled: bool,
    candidates: Vec<usize>,
    search_pos: usize,
    saved_search_pos: usize,
    index: isize,
    first_filter: bool,
    exact_match: bool,
}

fn name_byte(table: &[FunctionDef], candidate: usize, pos: usize) -> Option<u8> {
    table[candidate].name.as_bytes().get(pos).copied()
}

impl Autocomplete {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            candidates: Vec::new(),
            search_pos: 0,
            saved_search_pos: 0,
            index: 0,
            first_filter: true,
            exact_match: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool, table: &[FunctionDef]) {
        self.enabled = enabled;
        self.reset(table, true);
    }

    /// Indices into the function table, in table order
    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    pub fn is_exact_match(&self) -> bool {
        self.exact_match
    }

    /// Keep the candidates whose name starts with `prefix`. The first
    /// filter after a reset starts from the whole table.
    pub fn filter(&mut self, table: &[FunctionDef], prefix: &[u8]) {
        self.saved_search_pos = prefix.len();

        let matches = |&index: &usize| table[index].name.as_bytes().starts_with(prefix);

        if self.first_filter {
            self.candidates = (0..table.len()).filter(matches).collect();
        } else {
            self.candidates.retain(matches);
        }

        self.first_filter = false;
    }

    /// Extend the line with the prefix shared by every candidate.
    ///
    /// A single remaining candidate completes to its full name followed
    /// by a space. Returns the number of bytes appended.
    pub fn extend(&mut self, table: &[FunctionDef], line: &mut LineBuffer) -> usize {
        if !self.enabled {
            return 0;
        }

        self.filter(table, line.as_slice());

        let Some(&first) = self.candidates.first() else {
            return 0;
        };

        if self.candidates.len() > 1 {
            // Columns before the typed length are shared by construction
            self.search_pos = self.search_pos.min(self.saved_search_pos);

            loop {
                let reference = name_byte(table, first, self.search_pos);
                let mut agree = true;

                for &candidate in &self.candidates[1..] {
                    let byte = name_byte(table, candidate, self.search_pos);

                    if reference.is_none() || byte.is_none() {
                        self.exact_match = true;
                    }

                    if byte != reference {
                        agree = false;
                    }
                }

                if agree && reference.is_some() {
                    self.search_pos += 1;
                } else {
                    break;
                }
            }
        } else {
            self.search_pos = table[first].name.len();
            self.exact_match = true;
        }

        let name = table[first].name.as_bytes();
        let mut appended = 0;

        if self.search_pos > self.saved_search_pos {
            appended += line.extend(&name[self.saved_search_pos..self.search_pos]);
        }

        if self.candidates.len() == 1 && self.exact_match {
            appended += line.extend(b" ");
        }

        appended
    }

    /// Replace the line with the next candidate in `direction`.
    ///
    /// `refresh` restarts filtering from the whole table first, used
    /// when the previous key was a backspace. Returns false when there
    /// is nothing to cycle through.
    pub fn cycle(
        &mut self,
        table: &[FunctionDef],
        line: &mut LineBuffer,
        direction: Direction,
        refresh: bool,
    ) -> bool {
        if !self.enabled {
            return false;
        }

        if refresh {
            self.reset(table, false);
            self.extend(table, line);
        }

        let count = self.candidates.len() as isize;

        if count == 0 {
            return false;
        }

        match direction {
            Direction::Forward if self.exact_match => self.index += 1,
            Direction::Forward => (),
            Direction::Backward => self.index -= 1,
        }

        self.exact_match = true;

        if self.index == -1 {
            self.index = count - 1;
        }
        self.index = self.index.rem_euclid(count);

        let name = table[self.candidates[self.index as usize]].name;

        log::trace!("autocomplete cycle to {}", name);

        line.set(name.as_bytes());
        line.extend(b" ");

        true
    }

    /// Restart filtering from the whole table on the next key
    pub fn reinit(&mut self) {
        self.first_filter = true;
    }

    /// Clear the search state. `reload` seeds the candidates with the
    /// whole table, otherwise the set is left empty until the next filter.
    pub fn reset(&mut self, table: &[FunctionDef], reload: bool) {
        self.candidates.clear();
        self.search_pos = 0;
        self.saved_search_pos = 0;
        self.index = 0;
        self.first_filter = true;
        self.exact_match = false;

        if reload {
            self.candidates.extend(0..table.len());
        }
    }
}
