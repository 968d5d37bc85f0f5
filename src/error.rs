use std::fmt::Write as _;

use crate::diag::{ordinal, Marker};
use crate::encoder::{IMM_MAX, IMM_MIN};
use crate::isa::alarm::MAX_REG;
use crate::parser::MAX_INSTRUCTIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Hex,
    Binary,
}

/// First failure of a parse or encode pass. `line` is 1-based.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("line[{line}]: could not locate instruction mnemonic")]
    MissingMnemonic { line: usize, marker: Marker },

    #[error("line[{line}]: expected label name before ':', but found empty string")]
    EmptyLabel { line: usize, marker: Marker },

    #[error("line[{line}]: illegal label name '{name}', reserved by ISA")]
    ReservedLabel { line: usize, name: String, marker: Marker },

    #[error("line[{line}]: invalid label name '{name}', can't start with a digit")]
    DigitLeadingLabel { line: usize, name: String, marker: Marker },

    #[error("line[{line}]: repeat instance of label '{name}'")]
    DuplicateLabel { line: usize, name: String, marker: Marker },

    #[error("line[{line}]: invalid mnemonic '{mnemonic}'")]
    UnknownMnemonic { line: usize, mnemonic: String, marker: Marker },

    #[error("line[{line}]: could not match operand format for mnemonic '{mnemonic}'")]
    OperandFormatMismatch {
        line: usize,
        mnemonic: String,
        /// Every accepted syntax of every candidate, e.g. `MOV Rd, Rn`.
        expected: Vec<String>,
        /// Candidate opcodes behind `expected`.
        candidates: usize,
        marker: Marker,
    },

    #[error("line[{line}]: instruction count exceeds limit (max = {})", MAX_INSTRUCTIONS)]
    InstructionOverflow { line: usize },

    #[error(
        "line[{line}]: could not encode {} operand '{token}', expected register between 'r0' and 'r{}'",
        ordinal(*operand),
        MAX_REG
    )]
    InvalidRegister { line: usize, operand: usize, token: String, marker: Marker },

    #[error(
        "line[{line}]: could not encode {} operand '{token}', expected immediate value{}{}",
        ordinal(*operand),
        if *label_allowed { " or valid label" } else { "" },
        if *register_allowed { " or register" } else { "" }
    )]
    UnparsableImmediate {
        line: usize,
        operand: usize,
        token: String,
        label_allowed: bool,
        register_allowed: bool,
        marker: Marker,
    },

    #[error(
        "line[{line}]: could not encode {} operand '{token}', {}",
        ordinal(*operand),
        match radix {
            Radix::Hex => "hex value has too many nibbles (max = 3)",
            Radix::Binary => "binary value has too many bits (max = 12)",
        }
    )]
    LiteralTooWide { line: usize, operand: usize, token: String, radix: Radix, marker: Marker },

    #[error(
        "line[{line}]: could not encode {} operand '{token}'{}, {} out of range [{}, {}]",
        ordinal(*operand),
        if *from_label { format!(" ({value})") } else { String::new() },
        if *from_label { "branch offset from label" } else { "immediate value" },
        IMM_MIN,
        IMM_MAX
    )]
    ImmediateOutOfRange {
        line: usize,
        operand: usize,
        token: String,
        value: i64,
        from_label: bool,
        marker: Marker,
    },
}

impl AsmError {
    pub fn line(&self) -> usize {
        match self {
            AsmError::MissingMnemonic { line, .. }
            | AsmError::EmptyLabel { line, .. }
            | AsmError::ReservedLabel { line, .. }
            | AsmError::DigitLeadingLabel { line, .. }
            | AsmError::DuplicateLabel { line, .. }
            | AsmError::UnknownMnemonic { line, .. }
            | AsmError::OperandFormatMismatch { line, .. }
            | AsmError::InstructionOverflow { line }
            | AsmError::InvalidRegister { line, .. }
            | AsmError::UnparsableImmediate { line, .. }
            | AsmError::LiteralTooWide { line, .. }
            | AsmError::ImmediateOutOfRange { line, .. } => *line,
        }
    }

    pub fn marker(&self) -> Option<&Marker> {
        match self {
            AsmError::InstructionOverflow { .. } => None,
            AsmError::MissingMnemonic { marker, .. }
            | AsmError::EmptyLabel { marker, .. }
            | AsmError::ReservedLabel { marker, .. }
            | AsmError::DigitLeadingLabel { marker, .. }
            | AsmError::DuplicateLabel { marker, .. }
            | AsmError::UnknownMnemonic { marker, .. }
            | AsmError::OperandFormatMismatch { marker, .. }
            | AsmError::InvalidRegister { marker, .. }
            | AsmError::UnparsableImmediate { marker, .. }
            | AsmError::LiteralTooWide { marker, .. }
            | AsmError::ImmediateOutOfRange { marker, .. } => Some(marker),
        }
    }

    /// Raised by the first (parsing) pass rather than the encoder.
    pub fn is_syntax(&self) -> bool {
        !matches!(
            self,
            AsmError::InvalidRegister { .. }
                | AsmError::UnparsableImmediate { .. }
                | AsmError::LiteralTooWide { .. }
                | AsmError::ImmediateOutOfRange { .. }
        )
    }

    /// Full multi-line diagnostic: message, excerpt, and for format mismatches the
    /// list of accepted syntaxes.
    pub fn render(&self) -> String {
        let mut out = format!("Error: {self}");
        if let Some(marker) = self.marker() {
            let _ = write!(out, ":\n{marker}");
        }
        if let AsmError::OperandFormatMismatch { expected, candidates, .. } = self {
            let _ = write!(
                out,
                "\n--- Expected {}",
                if *candidates > 1 {
                    "one of the following formats:"
                } else {
                    "the following format:"
                }
            );
            for e in expected {
                let _ = write!(out, "\n-----> {e}");
            }
        }
        out
    }
}
