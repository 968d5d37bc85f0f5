//! Source excerpts with an underlined span, attached to every [`AsmError`].
//!
//! [`AsmError`]: crate::error::AsmError

use std::fmt;

/// A line of text and the span of it to underline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub text: String,
    /// Byte offset of the span.
    pub start: usize,
    pub len: usize,
}

impl Marker {
    pub fn line(text: &str, start: usize, len: usize) -> Self {
        Self { text: text.to_string(), start, len }
    }

    /// Marks operand `index` of an instruction, where token 0 is the mnemonic.
    /// Empty tokens are skipped when the instruction is rejoined; an index past
    /// the end marks the whole instruction.
    pub fn operand(tokens: &[String], index: usize) -> Self {
        let text = join_tokens(tokens);
        match tokens.get(index) {
            Some(tok) => {
                let start = tokens[..index]
                    .iter()
                    .filter(|t| !t.is_empty())
                    .map(|t| t.len() + 1)
                    .sum();
                Self { start, len: tok.len(), text }
            }
            None => Self { start: 0, len: text.len(), text },
        }
    }

    /// The marked substring.
    pub fn span(&self) -> &str {
        let start = self.start.min(self.text.len());
        let end = (self.start + self.len).min(self.text.len());
        self.text.get(start..end).unwrap_or("")
    }
}

fn join_tokens(tokens: &[String]) -> String {
    let mut out = String::new();
    for t in tokens.iter().filter(|t| !t.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(t);
    }
    out
}

impl fmt::Display for Marker {
    /// ```text
    /// --> ADD R1 R9 R2
    ///            ^~
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--> {}", self.text)?;
        // Keep tabs so the caret lines up under the source text.
        let head: String = self
            .text
            .chars()
            .scan(0usize, |pos, c| {
                let at = *pos;
                *pos += c.len_utf8();
                (at < self.start).then_some(c)
            })
            .map(|c| if c.is_whitespace() { c } else { ' ' })
            .collect();
        write!(f, "    {head}^{}", "~".repeat(self.len.saturating_sub(1)))
    }
}

/// `1st`, `2nd`, `3rd`, `4th`, ...
pub fn ordinal(n: usize) -> String {
    let suffix = match n {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
