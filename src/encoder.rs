use tracing::{debug, trace};

use crate::diag::Marker;
use crate::error::{AsmError, Radix};
use crate::instructions::{Format, Opcode, OperandWidth};
use crate::isa::alarm::{Isa, MAX_REG};
use crate::program::{ImmediateNote, MachineCode, ParsedInstruction, Program};

pub const IMM_BITS: u32 = OperandWidth::Imm.bits();
pub const IMM_MAX: i64 = (1 << (IMM_BITS - 1)) - 1;
pub const IMM_MIN: i64 = -(1 << (IMM_BITS - 1));
/// Hex digits that fit an immediate field.
pub const IMM_NIBBLES: usize = IMM_BITS.div_ceil(4) as usize;

/// `R0`..`R7`: one letter and exactly one digit.
pub fn encode_register(tok: &str) -> Option<u16> {
    match tok.as_bytes() {
        [r, d] if r.eq_ignore_ascii_case(&b'R') && d.is_ascii_digit() => {
            let n = u16::from(d - b'0');
            (n <= MAX_REG).then_some(n)
        }
        _ => None,
    }
}

/// `-?[0-9]+`. Values too large for `i64` saturate so they fail the range check.
pub fn parse_decimal(tok: &str) -> Option<i64> {
    let digits = tok.strip_prefix('-').unwrap_or(tok);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(tok.parse::<i64>().unwrap_or(if tok.starts_with('-') { i64::MIN } else { i64::MAX }))
}

/// Reads an `IMM_BITS`-wide pattern as two's complement.
fn sign_extend(v: i64) -> i64 {
    if v & (1 << (IMM_BITS - 1)) != 0 {
        v - (1 << IMM_BITS)
    } else {
        v
    }
}

/// `0x`/`0b` prefixed literal of an uppercased token: the digits, if the token
/// has that shape.
fn prefixed<'a>(tok: &'a str, prefix: &str, digit: fn(u8) -> bool) -> Option<&'a str> {
    tok.strip_prefix(prefix)
        .filter(|d| !d.is_empty() && d.bytes().all(digit))
}

enum ImmError {
    Unparsable,
    TooWide(Radix),
    OutOfRange { value: i64, from_label: bool },
}

/// Second pass: packs every parsed instruction into a word.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'i> {
    isa: &'i Isa,
}

impl<'i> Encoder<'i> {
    pub fn new(isa: &'i Isa) -> Self {
        Self { isa }
    }

    /// Stops at the first operand that cannot be encoded; nothing is returned
    /// for the instructions before it.
    pub fn encode(&self, prog: &Program) -> Result<MachineCode, AsmError> {
        let mut out = MachineCode {
            words: Vec::with_capacity(prog.len()),
            notes: Vec::with_capacity(prog.len()),
        };
        for (index, inst) in prog.instructions.iter().enumerate() {
            let (word, notes) = self.encode_instruction(prog, index, inst)?;
            trace!(index, line = inst.line, word = %format!("{word:04X}"), "encoded");
            out.words.push(word);
            out.notes.push(notes);
        }
        debug!(words = out.words.len(), "encoded program");
        Ok(out)
    }

    fn encode_instruction(
        &self,
        prog: &Program,
        index: usize,
        inst: &ParsedInstruction,
    ) -> Result<(u16, Vec<Option<ImmediateNote>>), AsmError> {
        let format = self.isa.format_of(inst.opcode);
        let descriptors = self.isa.descriptors_of(format);
        let mut word = inst.opcode.bits();
        let mut notes = Vec::with_capacity(descriptors.len());

        for (o, desc) in descriptors.iter().enumerate() {
            let tok = inst.operand(o);
            let (field, note) = match desc.width {
                OperandWidth::Reg => {
                    let n = encode_register(tok).ok_or_else(|| AsmError::InvalidRegister {
                        line: inst.line,
                        operand: o + 1,
                        token: tok.to_string(),
                        marker: Marker::operand(&inst.raw, 1 + o),
                    })?;
                    (n, None)
                }
                OperandWidth::Imm => {
                    let (value, label) = self
                        .immediate(prog, index, format, tok)
                        .map_err(|e| imm_error(e, inst, o))?;
                    let field = (value as u16) & desc.width.mask();
                    (field, Some(ImmediateNote { value, field, label }))
                }
                OperandWidth::None => (0, None),
            };
            word |= (field & desc.width.mask()) << desc.offset;
            notes.push(note);
        }
        Ok((word, notes))
    }

    /// Label (branches only), decimal, hex, then binary.
    fn immediate(
        &self,
        prog: &Program,
        index: usize,
        format: Format,
        tok: &str,
    ) -> Result<(i64, Option<String>), ImmError> {
        if format.is_branch() {
            if let Some(target) = prog.label(tok) {
                let value = target as i64 - (index as i64 + 1);
                return check_range(value, true).map(|v| (v, Some(tok.to_string())));
            }
        }
        let value = if let Some(v) = parse_decimal(tok) {
            v
        } else if let Some(digits) = prefixed(tok, "0X", |b| b.is_ascii_hexdigit()) {
            if digits.len() > IMM_NIBBLES {
                return Err(ImmError::TooWide(Radix::Hex));
            }
            sign_extend(i64::from_str_radix(digits, 16).map_err(|_| ImmError::Unparsable)?)
        } else if let Some(digits) = prefixed(tok, "0B", |b| b == b'0' || b == b'1') {
            if digits.len() > IMM_BITS as usize {
                return Err(ImmError::TooWide(Radix::Binary));
            }
            sign_extend(i64::from_str_radix(digits, 2).map_err(|_| ImmError::Unparsable)?)
        } else {
            return Err(ImmError::Unparsable);
        };
        check_range(value, false).map(|v| (v, None))
    }
}

fn check_range(value: i64, from_label: bool) -> Result<i64, ImmError> {
    if (IMM_MIN..=IMM_MAX).contains(&value) {
        Ok(value)
    } else {
        Err(ImmError::OutOfRange { value, from_label })
    }
}

fn imm_error(e: ImmError, inst: &ParsedInstruction, o: usize) -> AsmError {
    let line = inst.line;
    let operand = o + 1;
    let token = inst.operand(o).to_string();
    let marker = Marker::operand(&inst.raw, 1 + o);
    match e {
        ImmError::Unparsable => AsmError::UnparsableImmediate {
            line,
            operand,
            token,
            label_allowed: inst.opcode.format().is_branch(),
            register_allowed: inst.opcode == Opcode::MovIm,
            marker,
        },
        ImmError::TooWide(radix) => AsmError::LiteralTooWide { line, operand, token, radix, marker },
        ImmError::OutOfRange { value, from_label } => {
            AsmError::ImmediateOutOfRange { line, operand, token, value, from_label, marker }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_tokens() {
        for n in 0..=7u16 {
            assert_eq!(encode_register(&format!("R{n}")), Some(n));
        }
        assert_eq!(encode_register("r3"), Some(3));
        assert_eq!(encode_register("R8"), None);
        assert_eq!(encode_register("R9"), None);
        assert_eq!(encode_register("R07"), None);
        assert_eq!(encode_register("X1"), None);
        assert_eq!(encode_register("R"), None);
    }

    #[test]
    fn decimal_literals() {
        assert_eq!(parse_decimal("2047"), Some(2047));
        assert_eq!(parse_decimal("-2048"), Some(-2048));
        assert_eq!(parse_decimal("-"), None);
        assert_eq!(parse_decimal("1-2"), None);
        assert_eq!(parse_decimal("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_decimal("-99999999999999999999"), Some(i64::MIN));
    }

    #[test]
    fn encodes_through_isa_table() {
        let isa = Isa::new();
        let prog = crate::parser::Parser::new(&isa, &crate::program::AsmConfig::default())
            .parse("MOV R1, FLAGS\nB -1")
            .unwrap();
        let code = Encoder::new(&isa).encode(&prog).unwrap();
        assert_eq!(code.words, vec![0x0C08, 0x4FFF]);
        assert_eq!(code.notes[0], vec![None, None]);
        assert_eq!(code.notes[1][0].as_ref().map(|n| n.field), Some(0xFFF));
    }

    #[test]
    fn immediate_limits() {
        assert_eq!(IMM_MAX, 2047);
        assert_eq!(IMM_MIN, -2048);
        assert_eq!(IMM_NIBBLES, 3);
        assert_eq!(sign_extend(0xFFF), -1);
        assert_eq!(sign_extend(0x7FF), 2047);
        assert_eq!(sign_extend(0x800), -2048);
    }
}
