//! Command parser
//!
//! A command line is `name arg arg ...`, separated by spaces. The
//! function table gives every name a signature, one letter per
//! argument, which selects the type each argument is converted to:
//!
//! | code | type |
//! |------|------|
//! | `v`  | no arguments (whole signature) |
//! | `b`  | `u8` |
//! | `w`  | `u16` |
//! | `i`  | `u32` |
//! | `l`  | `u64` |
//! | `f`  | `f32` |
//! | `s`  | string |
//! | `o`  | bool, `0` or `1` |
//!
//! Numbers may be written in hex (`0x`), binary (`0b`) or octal (`0o`).
//! A string argument enclosed in the quote character may contain spaces.

use heapless::Vec;

use crate::{
    config::ParamLimits,
    error::{ParseError, ParseErrorKind},
};

/// Upper bound of every per-type argument array
pub const MAX_ARGS_PER_TYPE: usize = 8;

const SEPARATOR: char = ' ';

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ParamType {
    U8,
    U16,
    U32,
    U64,
    F32,
    Str,
    Bool,
}

impl ParamType {
    pub const ALL: [ParamType; 7] = [
        ParamType::U64,
        ParamType::U32,
        ParamType::U16,
        ParamType::U8,
        ParamType::F32,
        ParamType::Str,
        ParamType::Bool,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            b'b' => Self::U8,
            b'w' => Self::U16,
            b'i' => Self::U32,
            b'l' => Self::U64,
            b'f' => Self::F32,
            b's' => Self::Str,
            b'o' => Self::Bool,
            _ => return None,
        })
    }

    pub fn code(self) -> char {
        match self {
            Self::U8 => 'b',
            Self::U16 => 'w',
            Self::U32 => 'i',
            Self::U64 => 'l',
            Self::F32 => 'f',
            Self::Str => 's',
            Self::Bool => 'o',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "float",
            Self::Str => "string",
            Self::Bool => "bool",
        }
    }

    fn max(self) -> u64 {
        match self {
            Self::U8 => u8::MAX.into(),
            Self::U16 => u16::MAX.into(),
            Self::U32 => u32::MAX.into(),
            Self::Bool => 1,
            _ => u64::MAX,
        }
    }
}

/// Function table entry
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FunctionDef {
    pub name: &'static str,
    pub signature: &'static str,
    /// `summary | details`
    pub help: Option<&'static str>,
}

impl FunctionDef {
    pub const fn new(name: &'static str, signature: &'static str) -> Self {
        Self {
            name,
            signature,
            help: None,
        }
    }

    pub const fn with_help(self, help: &'static str) -> Self {
        Self {
            help: Some(help),
            ..self
        }
    }

    pub fn is_void(&self) -> bool {
        self.signature.is_empty() || self.signature.starts_with('v')
    }

    /// Expected number of arguments
    pub fn arity(&self) -> usize {
        if self.is_void() {
            0
        } else {
            self.signature.len()
        }
    }

    /// Help text before the `|`
    pub fn summary(&self) -> &'static str {
        let help = self.help.unwrap_or_default();

        help.split_once('|').map_or(help, |(summary, _)| summary)
    }

    /// Help text after the `|`
    pub fn details(&self) -> &'static str {
        self.help
            .and_then(|help| help.split_once('|'))
            .map_or("", |(_, details)| details)
    }
}

/// A successfully parsed command line.
///
/// Arguments are stored per type, in the order they appear on the line.
/// String arguments borrow from the parsed line.
#[derive(Debug, Default, PartialEq)]
pub struct Command<'a> {
    function: usize,
    u8s: Vec<u8, MAX_ARGS_PER_TYPE>,
    u16s: Vec<u16, MAX_ARGS_PER_TYPE>,
    u32s: Vec<u32, MAX_ARGS_PER_TYPE>,
    u64s: Vec<u64, MAX_ARGS_PER_TYPE>,
    f32s: Vec<f32, MAX_ARGS_PER_TYPE>,
    strings: Vec<&'a str, MAX_ARGS_PER_TYPE>,
    bools: Vec<bool, MAX_ARGS_PER_TYPE>,
    type_index: usize,
}

impl<'a> Command<'a> {
    fn new(function: usize) -> Self {
        Self {
            function,
            ..Self::default()
        }
    }

    /// Index of the function in the table
    pub fn function(&self) -> usize {
        self.function
    }

    pub fn u8s(&self) -> &[u8] {
        &self.u8s
    }

    pub fn u16s(&self) -> &[u16] {
        &self.u16s
    }

    pub fn u32s(&self) -> &[u32] {
        &self.u32s
    }

    pub fn u64s(&self) -> &[u64] {
        &self.u64s
    }

    pub fn f32s(&self) -> &[f32] {
        &self.f32s
    }

    pub fn strings(&self) -> &[&'a str] {
        &self.strings
    }

    pub fn bools(&self) -> &[bool] {
        &self.bools
    }

    /// Number of arguments bound
    pub fn len(&self) -> usize {
        self.type_index
    }

    pub fn is_empty(&self) -> bool {
        self.type_index == 0
    }

    fn count(&self, param: ParamType) -> usize {
        match param {
            ParamType::U8 => self.u8s.len(),
            ParamType::U16 => self.u16s.len(),
            ParamType::U32 => self.u32s.len(),
            ParamType::U64 => self.u64s.len(),
            ParamType::F32 => self.f32s.len(),
            ParamType::Str => self.strings.len(),
            ParamType::Bool => self.bools.len(),
        }
    }

    fn bind(
        &mut self,
        token: Token<'a>,
        signature: &[u8],
        options: &ParseOptions,
    ) -> Result<(), ParseError> {
        let index = self.type_index;
        self.type_index += 1;

        let Some(&code) = signature.get(index) else {
            return Err(ParseErrorKind::WrongNumberOfArgs.into());
        };

        let Some(param) =
            ParamType::from_code(code).filter(|&param| options.limits.is_enabled(param))
        else {
            return Err(ParseErrorKind::ParamTypeNotImplemented.into());
        };

        let arg = index + 1;
        let fail = |kind| ParseError::at_arg(kind, arg, param);

        if self.count(param) >= options.limits.limit(param) {
            return Err(fail(ParseErrorKind::TooManyArgs));
        }

        let text = match (token, param) {
            (Token::Word(text) | Token::Quoted(text), ParamType::Str) => {
                // capacity checked above
                let _ = self.strings.push(text);
                return Ok(());
            }
            (Token::Quoted(_), _) => return Err(ParseErrorKind::WrongNumberOfArgs.into()),
            (Token::Word(text), _) => text,
        };

        if param == ParamType::F32 {
            let value = parse_float(text, options.signed).map_err(fail)?;
            let _ = self.f32s.push(value);
            return Ok(());
        }

        let (magnitude, negative) = parse_number(text, options.signed).map_err(fail)?;

        if negative && param == ParamType::Bool {
            return Err(fail(ParseErrorKind::InvalidNumber));
        }

        if magnitude > param.max() {
            return Err(fail(ParseErrorKind::ValueTooBig));
        }

        let value = if negative {
            magnitude.wrapping_neg()
        } else {
            magnitude
        };

        // Truncation keeps the two's complement of negative values
        let _ = match param {
            ParamType::U8 => self.u8s.push(value as u8).map_err(drop),
            ParamType::U16 => self.u16s.push(value as u16).map_err(drop),
            ParamType::U32 => self.u32s.push(value as u32).map_err(drop),
            ParamType::U64 => self.u64s.push(value).map_err(drop),
            ParamType::Bool => self.bools.push(value == 1).map_err(drop),
            ParamType::F32 | ParamType::Str => Ok(()),
        };

        Ok(())
    }
}

/// Parser settings derived from the shell configuration
#[derive(Debug, Copy, Clone)]
pub struct ParseOptions {
    pub limits: ParamLimits,
    pub signed: bool,
    /// Quote character, `None` disables bordered strings
    pub quote: Option<u8>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            limits: ParamLimits::default(),
            signed: false,
            quote: Some(b'"'),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Quoted(&'a str),
}

struct Tokens<'a> {
    rest: &'a str,
    quote: Option<u8>,
}

impl<'a> Tokens<'a> {
    fn new(rest: &'a str, quote: Option<u8>) -> Self {
        Self { rest, quote }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, ParseErrorKind>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest.trim_start_matches(SEPARATOR);

        if rest.is_empty() {
            self.rest = rest;
            return None;
        }

        if let Some(quote) = self.quote.filter(|&q| q.is_ascii() && rest.as_bytes()[0] == q) {
            let body = &rest[1..];

            return match body.bytes().position(|b| b == quote) {
                Some(end) => {
                    self.rest = &body[end + 1..];
                    Some(Ok(Token::Quoted(&body[..end])))
                }
                None => {
                    self.rest = "";
                    Some(Err(ParseErrorKind::StringNotClosed))
                }
            };
        }

        let (word, rest) = rest.split_once(SEPARATOR).unwrap_or((rest, ""));
        self.rest = rest;

        Some(Ok(Token::Word(word)))
    }
}

/// Convert an unsigned literal, returning `(magnitude, negative)`.
///
/// A leading `-` is accepted only when `signed` is set.
pub fn parse_number(text: &str, signed: bool) -> Result<(u64, bool), ParseErrorKind> {
    let (negative, text) = match text.strip_prefix('-') {
        Some(text) if signed => (true, text),
        Some(_) => return Err(ParseErrorKind::InvalidNumber),
        None => (false, text),
    };

    let (radix, digits) = match text.as_bytes() {
        [b'0', b'x' | b'X', ..] => (16, &text[2..]),
        [b'0', b'b' | b'B', ..] => (2, &text[2..]),
        [b'0', b'o' | b'O', ..] => (8, &text[2..]),
        _ => (10, text),
    };

    if digits.is_empty() {
        return Err(ParseErrorKind::InvalidNumber);
    }

    let mut value: u64 = 0;

    for c in digits.chars() {
        let digit = c.to_digit(radix).ok_or(ParseErrorKind::InvalidNumber)?;

        value = value
            .checked_mul(radix.into())
            .and_then(|v| v.checked_add(digit.into()))
            .ok_or(ParseErrorKind::ValueTooBig)?;
    }

    Ok((value, negative))
}

/// Decimal float, digits with at most one `.`
pub fn parse_float(text: &str, signed: bool) -> Result<f32, ParseErrorKind> {
    let digits = match text.strip_prefix('-') {
        Some(digits) if signed => digits,
        Some(_) => return Err(ParseErrorKind::InvalidNumber),
        None => text,
    };

    let dots = digits.bytes().filter(|&b| b == b'.').count();
    let valid = digits.bytes().all(|b| b.is_ascii_digit() || b == b'.');

    if !valid || dots > 1 || digits.len() == dots {
        return Err(ParseErrorKind::InvalidNumber);
    }

    text.parse().map_err(|_| ParseErrorKind::InvalidNumber)
}

/// Parse `line` against `table`.
pub fn parse<'a>(
    line: &'a str,
    table: &[FunctionDef],
    options: &ParseOptions,
) -> Result<Command<'a>, ParseError> {
    let line = line.trim_start_matches(SEPARATOR);
    let (name, rest) = line.split_once(SEPARATOR).unwrap_or((line, ""));
    let rest = rest.trim_start_matches(SEPARATOR);

    let function = table
        .iter()
        .position(|def| def.name == name)
        .ok_or(ParseError::new(ParseErrorKind::FunctionNotFound))?;

    let def = &table[function];
    let fail = |err: ParseError| err.in_function(function);
    let mut command = Command::new(function);

    if def.is_void() || rest.is_empty() {
        return if def.is_void() == rest.is_empty() {
            Ok(command)
        } else {
            Err(fail(ParseErrorKind::WrongNumberOfArgs.into()))
        };
    }

    let signature = def.signature.as_bytes();

    for token in Tokens::new(rest, options.quote) {
        let token = token.map_err(|kind| fail(kind.into()))?;

        command.bind(token, signature, options).map_err(fail)?;
    }

    if command.type_index != signature.len() {
        return Err(fail(ParseErrorKind::WrongNumberOfArgs.into()));
    }

    log::debug!("parsed {} with {} args", def.name, command.len());

    Ok(command)
}
