use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::instructions::Opcode;
use crate::isa::syntax::SyntaxMode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsmConfig {
    pub syntax: SyntaxMode,
}

impl AsmConfig {
    pub fn strict() -> Self {
        Self { syntax: SyntaxMode::Strict }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Uppercased.
    pub name: String,
    /// Index of the instruction the label is attached to.
    pub address: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInstruction {
    pub opcode: Opcode,
    /// Uppercased; token 0 is the mnemonic, token `1 + i` is operand `i`.
    pub tokens: Vec<String>,
    /// Same layout as `tokens`, as written in the source.
    pub raw: Vec<String>,
    /// 1-based source line.
    pub line: usize,
}

impl ParsedInstruction {
    pub fn operand(&self, i: usize) -> &str {
        &self.tokens[1 + i]
    }
}

/// Output of the first pass.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub instructions: Vec<ParsedInstruction>,
    /// Uppercased name -> address, every label defined in the source.
    pub label_lookup: HashMap<String, usize>,
    /// Labels in definition order, without those past the last instruction.
    pub labels: Vec<Label>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn label(&self, name: &str) -> Option<usize> {
        self.label_lookup.get(name).copied()
    }
}

/// How an immediate operand was resolved. Listing only; the word is already final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmediateNote {
    pub value: i64,
    /// The 12-bit field as stored in the word.
    pub field: u16,
    /// Set when the operand named a label.
    pub label: Option<String>,
}

impl fmt::Display for ImmediateNote {
    /// `0x005 ; (5)` or `0xFFD     ; (-3 -> START)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(name) => write!(f, "0x{:03X}     ; ({} -> {})", self.field, self.value, name),
            None => write!(f, "0x{:03X} ; ({})", self.field, self.value),
        }
    }
}

/// Output of the second pass, parallel to `Program::instructions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineCode {
    pub words: Vec<u16>,
    /// Per instruction, per operand slot.
    pub notes: Vec<Vec<Option<ImmediateNote>>>,
}
