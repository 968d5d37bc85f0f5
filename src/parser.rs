use tracing::{debug, trace};

use crate::diag::Marker;
use crate::error::AsmError;
use crate::instructions::Opcode;
use crate::isa::alarm::Isa;
use crate::isa::syntax::SyntaxMode;
use crate::program::{AsmConfig, Label, ParsedInstruction, Program};

/// Largest number of instructions one source may produce.
pub const MAX_INSTRUCTIONS: usize = 65536;

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// One source line split by the generic grammar
/// `(\s* word* ':')* \s* word? \s* operands`. Offsets are byte offsets into the
/// trimmed, comment-free line.
#[derive(Debug, Default, PartialEq, Eq)]
struct LineParts<'a> {
    labels: Vec<(usize, &'a str)>,
    mnemonic: Option<(usize, &'a str)>,
    operands: (usize, &'a str),
}

fn split_line(line: &str) -> LineParts<'_> {
    let b = line.as_bytes();
    let skip_ws = |mut p: usize| {
        while p < b.len() && b[p].is_ascii_whitespace() {
            p += 1;
        }
        p
    };
    let skip_word = |mut p: usize| {
        while p < b.len() && is_word(b[p]) {
            p += 1;
        }
        p
    };

    let mut parts = LineParts::default();
    let mut pos = 0;
    loop {
        let start = skip_ws(pos);
        let end = skip_word(start);
        if b.get(end) != Some(&b':') {
            break;
        }
        parts.labels.push((start, &line[start..end]));
        pos = end + 1;
    }

    let start = skip_ws(pos);
    let end = skip_word(start);
    if end > start {
        parts.mnemonic = Some((start, &line[start..end]));
    }
    let start = skip_ws(end);
    parts.operands = (start, line[start..].trim_end());
    parts
}

/// First pass: labels, mnemonics and operand tokens.
pub struct Parser<'i> {
    isa: &'i Isa,
    mode: SyntaxMode,
}

impl<'i> Parser<'i> {
    pub fn new(isa: &'i Isa, cfg: &AsmConfig) -> Self {
        Self { isa, mode: cfg.syntax }
    }

    pub fn parse(&self, src: &str) -> Result<Program, AsmError> {
        let mut prog = Program::default();
        for (i, line) in src.lines().enumerate() {
            self.parse_line(&mut prog, i + 1, line)?;
        }
        // A label after the last instruction has nothing to point at.
        let count = prog.instructions.len();
        let keep = prog.labels.partition_point(|l| l.address < count);
        prog.labels.truncate(keep);
        debug!(instructions = count, labels = prog.labels.len(), "parsed program");
        Ok(prog)
    }

    fn parse_line(&self, prog: &mut Program, line_no: usize, line: &str) -> Result<(), AsmError> {
        let code = line.split(';').next().unwrap_or_default().trim();
        let parts = split_line(code);

        for &(start, raw) in &parts.labels {
            self.define_label(prog, line_no, code, start, raw)?;
        }

        let (ops_start, operands) = parts.operands;
        let Some((mn_start, mn_raw)) = parts.mnemonic else {
            if !operands.is_empty() {
                return Err(AsmError::MissingMnemonic {
                    line: line_no,
                    marker: Marker::line(code, ops_start, operands.len()),
                });
            }
            return Ok(());
        };

        let mnemonic = mn_raw.to_ascii_uppercase();
        let candidates =
            self.isa
                .candidates_for(&mnemonic)
                .ok_or_else(|| AsmError::UnknownMnemonic {
                    line: line_no,
                    mnemonic: mn_raw.to_string(),
                    marker: Marker::line(code, mn_start, mn_raw.len()),
                })?;

        let Some((opcode, operand_toks)) = self.select(candidates, operands) else {
            let expected = candidates
                .iter()
                .flat_map(|op| self.isa.expected_syntax(op.format()))
                .map(|e| format!("{mn_raw}{e}"))
                .collect();
            return Err(AsmError::OperandFormatMismatch {
                line: line_no,
                mnemonic: mn_raw.to_string(),
                expected,
                candidates: candidates.len(),
                marker: Marker::line(code, ops_start, operands.len()),
            });
        };

        if prog.instructions.len() >= MAX_INSTRUCTIONS {
            return Err(AsmError::InstructionOverflow { line: line_no });
        }

        let mut tokens = Vec::with_capacity(1 + operand_toks.len());
        let mut raw = Vec::with_capacity(1 + operand_toks.len());
        tokens.push(mnemonic);
        raw.push(mn_raw.to_string());
        for t in operand_toks {
            tokens.push(t.to_ascii_uppercase());
            raw.push(t.to_string());
        }
        trace!(line = line_no, ?opcode, ?tokens, "instruction");
        prog.instructions.push(ParsedInstruction { opcode, tokens, raw, line: line_no });
        Ok(())
    }

    /// First candidate whose operand syntax accepts `operands`.
    fn select<'a>(&self, candidates: &[Opcode], operands: &'a str) -> Option<(Opcode, Vec<&'a str>)> {
        candidates.iter().find_map(|&op| {
            let validate = self.isa.validator(self.isa.format_of(op), self.mode);
            validate(operands).map(|toks| (op, toks))
        })
    }

    fn define_label(
        &self,
        prog: &mut Program,
        line_no: usize,
        code: &str,
        start: usize,
        raw: &str,
    ) -> Result<(), AsmError> {
        if raw.is_empty() {
            // Point at the ':' itself.
            return Err(AsmError::EmptyLabel { line: line_no, marker: Marker::line(code, start, 1) });
        }
        let marker = || Marker::line(code, start, raw.len() + 1);
        let name = raw.to_ascii_uppercase();
        if self.isa.is_reserved(&name) {
            return Err(AsmError::ReservedLabel { line: line_no, name: raw.to_string(), marker: marker() });
        }
        if name.as_bytes()[0].is_ascii_digit() {
            return Err(AsmError::DigitLeadingLabel {
                line: line_no,
                name: raw.to_string(),
                marker: marker(),
            });
        }
        if prog.label_lookup.contains_key(&name) {
            return Err(AsmError::DuplicateLabel { line: line_no, name: raw.to_string(), marker: marker() });
        }

        let address = prog.instructions.len();
        debug!(line = line_no, label = %name, address, "label");
        prog.label_lookup.insert(name.clone(), address);
        prog.labels.push(Label { name, address });
        Ok(())
    }
}
