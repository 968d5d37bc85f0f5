use serde::{Deserialize, Serialize};

/// Width class of one operand slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperandWidth {
    /// Syntactic placeholder (the `FLAGS` keyword); contributes no bits.
    None,
    Reg,
    Imm,
}

impl OperandWidth {
    pub const fn bits(self) -> u32 {
        match self {
            OperandWidth::None => 0,
            OperandWidth::Reg => 3,
            OperandWidth::Imm => 12,
        }
    }

    pub const fn mask(self) -> u16 {
        !(u16::MAX << self.bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandDesc {
    pub offset: u32,
    pub width: OperandWidth,
}

const fn reg(offset: u32) -> OperandDesc {
    OperandDesc { offset, width: OperandWidth::Reg }
}

const fn imm(offset: u32) -> OperandDesc {
    OperandDesc { offset, width: OperandWidth::Imm }
}

const NONE: OperandDesc = OperandDesc { offset: 0, width: OperandWidth::None };

const R1_DESC: &[OperandDesc] = &[reg(3)];
const RD_RN_DESC: &[OperandDesc] = &[reg(3), reg(6)];
const R2NW_DESC: &[OperandDesc] = &[reg(6), reg(0)];
const RD_RN_RM_DESC: &[OperandDesc] = &[reg(3), reg(6), reg(0)];
const B_DESC: &[OperandDesc] = &[imm(0)];
const I_DESC: &[OperandDesc] = &[reg(12), imm(0)];
const FL_DESC: &[OperandDesc] = &[reg(3), NONE];
const FS_DESC: &[OperandDesc] = &[NONE, reg(6)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    S,
    R1,
    R2,
    R2nw,
    R3,
    B,
    I,
    Fl,
    Fs,
    Ls,
    Lso,
}

impl Format {
    /// Operand slots in source order.
    pub fn descriptors(self) -> &'static [OperandDesc] {
        match self {
            Format::S => &[],
            Format::R1 => R1_DESC,
            Format::R2 | Format::Ls => RD_RN_DESC,
            Format::R2nw => R2NW_DESC,
            Format::R3 | Format::Lso => RD_RN_RM_DESC,
            Format::B => B_DESC,
            Format::I => I_DESC,
            Format::Fl => FL_DESC,
            Format::Fs => FS_DESC,
        }
    }

    /// Operand syntax shown after the mnemonic in "expected format" hints.
    pub fn expected_syntax(self) -> &'static [&'static str] {
        match self {
            Format::S => &[""],
            Format::R1 => &[" Rd"],
            Format::R2 => &[" Rd, Rn"],
            Format::R2nw => &[" Rn, Rm"],
            Format::R3 => &[" Rd, Rn, Rm"],
            Format::B => &[" Imm", " Label"],
            Format::I => &[" Rd, Imm"],
            Format::Fl => &[" Rd, Flags"],
            Format::Fs => &[" Flags, Rn"],
            Format::Ls => &[" Rd, [Rn]"],
            Format::Lso => &[" Rd, [Rn, Rm]"],
        }
    }

    pub fn is_branch(self) -> bool {
        self == Format::B
    }

    pub fn is_load_store(self) -> bool {
        matches!(self, Format::Ls | Format::Lso)
    }

    /// Bits of the word covered by operand fields.
    pub fn field_mask(self) -> u16 {
        self.descriptors()
            .iter()
            .fold(0, |acc, d| acc | (d.width.mask() << d.offset))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Nop,
    Halt,
    MovRR,
    MovRF,
    MovFR,
    LdrO,
    Ldr,
    StrO,
    Str,
    Add,
    Sub,
    Mul,
    MulU,
    Div,
    Mod,
    And,
    Or,
    Eor,
    Not,
    Lsl,
    Lsr,
    Asr,
    Rol,
    Ror,
    Cmp,
    B,
    Beq,
    Bne,
    MovIm,
}

#[derive(Debug, Clone, Copy)]
pub struct OpcodeDesc {
    pub opcode: Opcode,
    pub mnemonic: &'static str,
    /// 7-bit pattern, placed at bits 15..9.
    pub pattern: u16,
    pub format: Format,
}

impl OpcodeDesc {
    pub const fn bits(&self) -> u16 {
        self.pattern << 9
    }
}

macro_rules! op {
    ($op:ident, $mn:literal, $pat:literal, $fmt:ident) => {
        OpcodeDesc { opcode: Opcode::$op, mnemonic: $mn, pattern: $pat, format: Format::$fmt }
    };
}

/// Indexed by `Opcode as usize`.
pub const OPCODES: &[OpcodeDesc] = &[
    op!(Nop, "NOP", 0b0000000, S),
    op!(Halt, "HALT", 0b0000011, S),
    op!(MovRR, "MOV", 0b0000100, R2),
    op!(MovRF, "MOV", 0b0000110, Fl),
    op!(MovFR, "MOV", 0b0000111, Fs),
    op!(LdrO, "LDR", 0b0001000, Lso),
    op!(Ldr, "LDR", 0b0001011, Ls),
    op!(StrO, "STR", 0b0001100, Lso),
    op!(Str, "STR", 0b0001111, Ls),
    op!(Add, "ADD", 0b0010000, R3),
    op!(Sub, "SUB", 0b0010001, R3),
    op!(Mul, "MUL", 0b0010010, R3),
    op!(MulU, "MULU", 0b0010011, R3),
    op!(Div, "DIV", 0b0010100, R3),
    op!(Mod, "MOD", 0b0010101, R3),
    op!(And, "AND", 0b0010110, R3),
    op!(Or, "OR", 0b0010111, R3),
    op!(Eor, "EOR", 0b0011000, R3),
    op!(Not, "NOT", 0b0011001, R2),
    op!(Lsl, "LSL", 0b0011010, R3),
    op!(Lsr, "LSR", 0b0011011, R3),
    op!(Asr, "ASR", 0b0011100, R3),
    op!(Rol, "ROL", 0b0011101, R3),
    op!(Ror, "ROR", 0b0011110, R3),
    op!(Cmp, "CMP", 0b0011111, R2nw),
    op!(B, "B", 0b0100000, B),
    op!(Beq, "BEQ", 0b0110000, B),
    op!(Bne, "BNE", 0b0111000, B),
    op!(MovIm, "MOV", 0b1000000, I),
];

impl Opcode {
    pub fn desc(self) -> &'static OpcodeDesc {
        &OPCODES[self as usize]
    }

    pub fn format(self) -> Format {
        self.desc().format
    }

    /// Opcode pattern shifted into place, operand bits zero.
    pub fn bits(self) -> u16 {
        self.desc().bits()
    }

    pub fn mnemonic(self) -> &'static str {
        self.desc().mnemonic
    }
}

/// Mnemonic -> candidate encodings. Order is the match order.
pub const MNEMONICS: &[(&str, &[Opcode])] = &[
    ("NOP", &[Opcode::Nop]),
    ("HALT", &[Opcode::Halt]),
    ("MOV", &[Opcode::MovRR, Opcode::MovRF, Opcode::MovFR, Opcode::MovIm]),
    ("LDR", &[Opcode::Ldr, Opcode::LdrO]),
    ("STR", &[Opcode::Str, Opcode::StrO]),
    ("ADD", &[Opcode::Add]),
    ("SUB", &[Opcode::Sub]),
    ("MUL", &[Opcode::Mul]),
    ("MULU", &[Opcode::MulU]),
    ("DIV", &[Opcode::Div]),
    ("MOD", &[Opcode::Mod]),
    ("AND", &[Opcode::And]),
    ("OR", &[Opcode::Or]),
    ("EOR", &[Opcode::Eor]),
    ("NOT", &[Opcode::Not]),
    ("LSL", &[Opcode::Lsl]),
    ("LSR", &[Opcode::Lsr]),
    ("ASR", &[Opcode::Asr]),
    ("ROL", &[Opcode::Rol]),
    ("ROR", &[Opcode::Ror]),
    ("CMP", &[Opcode::Cmp]),
    ("B", &[Opcode::B]),
    ("BEQ", &[Opcode::Beq]),
    ("BNE", &[Opcode::Bne]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_opcode() {
        for (i, d) in OPCODES.iter().enumerate() {
            assert_eq!(d.opcode as usize, i, "{:?}", d.opcode);
        }
    }

    #[test]
    fn every_candidate_belongs_to_its_mnemonic() {
        for (mn, cands) in MNEMONICS {
            for op in cands.iter() {
                assert_eq!(op.mnemonic(), *mn);
            }
        }
    }

    #[test]
    fn descriptor_layouts() {
        let offsets = |f: Format| f.descriptors().iter().map(|d| d.offset).collect::<Vec<_>>();
        assert_eq!(offsets(Format::S), Vec::<u32>::new());
        assert_eq!(offsets(Format::R3), vec![3, 6, 0]);
        assert_eq!(offsets(Format::R2nw), vec![6, 0]);
        assert_eq!(offsets(Format::I), vec![12, 0]);
        assert_eq!(Format::Fl.descriptors()[1].width, OperandWidth::None);
        assert_eq!(Format::B.field_mask(), 0x0FFF);
        assert_eq!(Format::I.field_mask(), 0x7FFF);
    }

    #[test]
    fn fields_never_overlap_opcode_bits() {
        for d in OPCODES {
            assert_eq!(d.bits() & d.format.field_mask(), 0, "{:?}", d.opcode);
        }
    }
}
