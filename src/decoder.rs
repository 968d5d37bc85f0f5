use crate::instructions::{OperandWidth, Opcode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub op: Opcode,
    /// Raw field values in operand order; `None`-width slots read as 0.
    pub fields: [u16; 3],
}

impl Decoded {
    /// Immediate field of a branch or `MOV Rd, Imm`, sign-extended from 12 bits.
    pub fn imm(&self) -> Option<i16> {
        let descs = self.op.format().descriptors();
        let pos = descs.iter().position(|d| d.width == OperandWidth::Imm)?;
        Some(((self.fields[pos] << 4) as i16) >> 4)
    }
}

pub trait Decoder {
    fn decode(&self, word: u16) -> Option<Decoded>;
}
