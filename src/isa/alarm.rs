use std::collections::{HashMap, HashSet};

use crate::decoder::{Decoded, Decoder};
use crate::instructions::{Format, Opcode, OperandDesc, MNEMONICS, OPCODES};
use crate::isa::syntax::{self, SyntaxMode, Validator};

/// Status-register keyword; only valid as a `MOV` operand.
pub const FLAGS: &str = "FLAGS";

/// Highest register number.
pub const MAX_REG: u16 = 7;

/// alARM descriptor table.
///
/// Built once and shared read-only by the parser and the encoder. The set of
/// names a label may not take is computed here, eagerly.
#[derive(Debug, Clone)]
pub struct Isa {
    mnemonics: HashMap<&'static str, &'static [Opcode]>,
    reserved: HashSet<String>,
}

impl Default for Isa {
    fn default() -> Self {
        Self::new()
    }
}

impl Isa {
    pub fn new() -> Self {
        let mnemonics: HashMap<_, _> = MNEMONICS.iter().copied().collect();
        let mut reserved: HashSet<String> = mnemonics.keys().map(|m| m.to_string()).collect();
        // R0..=R8: one past the last register is reserved as well.
        reserved.extend((0..=MAX_REG + 1).map(|i| format!("R{i}")));
        reserved.insert(FLAGS.to_string());
        Self { mnemonics, reserved }
    }

    /// Candidate encodings of an uppercased mnemonic, in match order.
    pub fn candidates_for(&self, mnemonic: &str) -> Option<&'static [Opcode]> {
        self.mnemonics.get(mnemonic).copied()
    }

    pub fn format_of(&self, op: Opcode) -> Format {
        op.format()
    }

    pub fn descriptors_of(&self, format: Format) -> &'static [OperandDesc] {
        format.descriptors()
    }

    pub fn validator(&self, format: Format, mode: SyntaxMode) -> Validator {
        syntax::validator(format, mode)
    }

    pub fn expected_syntax(&self, format: Format) -> &'static [&'static str] {
        format.expected_syntax()
    }

    /// `name` must already be uppercased.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }
}

/// Word decoder: the first opcode whose pattern matches every bit outside its
/// operand fields.
pub struct AlarmDecoder;

impl AlarmDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AlarmDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for AlarmDecoder {
    fn decode(&self, word: u16) -> Option<Decoded> {
        let desc = OPCODES
            .iter()
            .find(|d| word & !d.format.field_mask() == d.bits())?;
        let mut fields = [0u16; 3];
        for (slot, od) in fields.iter_mut().zip(desc.format.descriptors()) {
            *slot = (word >> od.offset) & od.width.mask();
        }
        Some(Decoded { op: desc.opcode, fields })
    }
}
