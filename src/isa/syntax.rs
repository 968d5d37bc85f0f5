//! Operand syntax validators, one lenient and one strict scanner per format.
//!
//! A validator receives the operand text of one line (leading whitespace and the
//! comment already removed) and returns the operand tokens, one per descriptor
//! slot of the format, or `None` when the text does not have that shape.

use serde::{Deserialize, Serialize};

use crate::instructions::Format;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxMode {
    /// Space-separated operands and missing brackets are tolerated.
    #[default]
    Relaxed,
    /// Exact comma and bracket punctuation.
    Strict,
}

pub type Validator = for<'a> fn(&'a str) -> Option<Vec<&'a str>>;

pub fn validator(format: Format, mode: SyntaxMode) -> Validator {
    match mode {
        SyntaxMode::Relaxed => match format {
            Format::S => s_lenient,
            Format::R1 => r1_lenient,
            Format::R2 | Format::R2nw => r2_lenient,
            Format::R3 => r3_lenient,
            Format::B => b_lenient,
            Format::I => i_lenient,
            Format::Fl => fl_lenient,
            Format::Fs => fs_lenient,
            Format::Ls => ls_lenient,
            Format::Lso => lso_lenient,
        },
        SyntaxMode::Strict => match format {
            Format::S => s_strict,
            Format::R1 => r1_strict,
            Format::R2 | Format::R2nw => r2_strict,
            Format::R3 => r3_strict,
            Format::B => b_strict,
            Format::I => i_strict,
            Format::Fl => fl_strict,
            Format::Fs => fs_strict,
            Format::Ls => ls_strict,
            Format::Lso => lso_strict,
        },
    }
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte cursor over operand text. All matched classes are ASCII, so every
/// returned slice starts and ends on a char boundary.
struct Scanner<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skips whitespace; true if any was skipped.
    fn ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn take_while(&mut self, f: impl Fn(u8) -> bool) -> Option<&'a str> {
        let (s, start) = (self.s, self.pos);
        while self.peek().is_some_and(&f) {
            self.pos += 1;
        }
        (self.pos > start).then(|| &s[start..self.pos])
    }

    /// `R<digits>`, any case. Range is checked by the encoder.
    fn register(&mut self) -> Option<&'a str> {
        let (s, start) = (self.s, self.pos);
        if !(self.eat(b'R') || self.eat(b'r')) {
            return None;
        }
        if self.take_while(|b| b.is_ascii_digit()).is_none() {
            self.pos = start;
            return None;
        }
        Some(&s[start..self.pos])
    }

    /// `FLAGS`, any case, not followed by further word characters.
    fn flags(&mut self) -> Option<&'a str> {
        let start = self.pos;
        let word = self.take_while(is_word)?;
        if word.eq_ignore_ascii_case("FLAGS") {
            Some(word)
        } else {
            self.pos = start;
            None
        }
    }

    /// Immediate or label: `[-\w]+`.
    fn value(&mut self) -> Option<&'a str> {
        self.take_while(|b| is_word(b) || b == b'-')
    }

    /// Strict immediate or label: `\w+`, so no negative decimals.
    fn word(&mut self) -> Option<&'a str> {
        self.take_while(is_word)
    }

    /// Whitespace, or a comma with optional surrounding whitespace.
    fn lenient_sep(&mut self) -> Option<()> {
        let spaced = self.ws();
        if self.eat(b',') {
            self.ws();
            Some(())
        } else {
            spaced.then_some(())
        }
    }

    fn strict_sep(&mut self) -> Option<()> {
        self.ws();
        if !self.eat(b',') {
            return None;
        }
        self.ws();
        Some(())
    }

    /// Separator before a memory operand: `,`, `, [`, `[` or whitespace.
    fn lenient_open(&mut self) -> Option<()> {
        let spaced = self.ws();
        if self.eat(b',') {
            self.ws();
            self.eat(b'[');
        } else if !self.eat(b'[') && !spaced {
            return None;
        }
        self.ws();
        Some(())
    }

    fn lenient_close(&mut self) -> Option<()> {
        self.ws();
        self.eat(b']');
        self.lenient_end()
    }

    fn lenient_end(&mut self) -> Option<()> {
        self.ws();
        self.end()
    }

    fn end(&self) -> Option<()> {
        (self.pos == self.s.len()).then_some(())
    }
}

fn s_lenient(s: &str) -> Option<Vec<&str>> {
    Scanner::new(s).lenient_end()?;
    Some(vec![])
}

fn r1_lenient(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let d = sc.register()?;
    sc.lenient_end()?;
    Some(vec![d])
}

fn r2_lenient(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let a = sc.register()?;
    sc.lenient_sep()?;
    let b = sc.register()?;
    sc.lenient_end()?;
    Some(vec![a, b])
}

fn r3_lenient(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let a = sc.register()?;
    sc.lenient_sep()?;
    let b = sc.register()?;
    sc.lenient_sep()?;
    let c = sc.register()?;
    sc.lenient_end()?;
    Some(vec![a, b, c])
}

fn b_lenient(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let v = sc.value()?;
    sc.lenient_end()?;
    Some(vec![v])
}

fn i_lenient(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let d = sc.register()?;
    sc.lenient_sep()?;
    let v = sc.value()?;
    sc.lenient_end()?;
    Some(vec![d, v])
}

fn fl_lenient(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let d = sc.register()?;
    sc.lenient_sep()?;
    let f = sc.flags()?;
    sc.lenient_end()?;
    Some(vec![d, f])
}

fn fs_lenient(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let f = sc.flags()?;
    sc.lenient_sep()?;
    let n = sc.register()?;
    sc.lenient_end()?;
    Some(vec![f, n])
}

fn ls_lenient(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let d = sc.register()?;
    sc.lenient_open()?;
    let n = sc.register()?;
    sc.lenient_close()?;
    Some(vec![d, n])
}

fn lso_lenient(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let d = sc.register()?;
    sc.lenient_open()?;
    let n = sc.register()?;
    sc.lenient_sep()?;
    let m = sc.register()?;
    sc.lenient_close()?;
    Some(vec![d, n, m])
}

fn s_strict(s: &str) -> Option<Vec<&str>> {
    Scanner::new(s).end()?;
    Some(vec![])
}

fn r1_strict(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let d = sc.register()?;
    sc.end()?;
    Some(vec![d])
}

fn r2_strict(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let a = sc.register()?;
    sc.strict_sep()?;
    let b = sc.register()?;
    sc.end()?;
    Some(vec![a, b])
}

fn r3_strict(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let a = sc.register()?;
    sc.strict_sep()?;
    let b = sc.register()?;
    sc.strict_sep()?;
    let c = sc.register()?;
    sc.end()?;
    Some(vec![a, b, c])
}

fn b_strict(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let v = sc.word()?;
    sc.end()?;
    Some(vec![v])
}

fn i_strict(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let d = sc.register()?;
    sc.strict_sep()?;
    let v = sc.word()?;
    sc.end()?;
    Some(vec![d, v])
}

fn fl_strict(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let d = sc.register()?;
    sc.strict_sep()?;
    let f = sc.flags()?;
    sc.end()?;
    Some(vec![d, f])
}

fn fs_strict(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let f = sc.flags()?;
    sc.strict_sep()?;
    let n = sc.register()?;
    sc.end()?;
    Some(vec![f, n])
}

fn ls_strict(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let d = sc.register()?;
    sc.strict_sep()?;
    if !sc.eat(b'[') {
        return None;
    }
    sc.ws();
    let n = sc.register()?;
    sc.ws();
    if !sc.eat(b']') {
        return None;
    }
    sc.end()?;
    Some(vec![d, n])
}

fn lso_strict(s: &str) -> Option<Vec<&str>> {
    let mut sc = Scanner::new(s);
    let d = sc.register()?;
    sc.strict_sep()?;
    if !sc.eat(b'[') {
        return None;
    }
    sc.ws();
    let n = sc.register()?;
    sc.strict_sep()?;
    let m = sc.register()?;
    sc.ws();
    if !sc.eat(b']') {
        return None;
    }
    sc.end()?;
    Some(vec![d, n, m])
}
