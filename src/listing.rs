use std::fmt::Write as _;

use crate::program::{MachineCode, Program};

/// Label table and annotated machine program, as printed by `alarmas -l`.
///
/// Immediates are shown through their [`ImmediateNote`]; every other operand
/// as its uppercased source token.
///
/// [`ImmediateNote`]: crate::program::ImmediateNote
pub fn render(prog: &Program, code: &MachineCode) -> String {
    let mut out = String::from("=== LABEL LIST ===\n");
    let width = prog.labels.iter().map(|l| l.name.len()).max().unwrap_or(0) + 1;
    for l in &prog.labels {
        let _ = writeln!(out, "{:>width$}: 0x{:03X}", l.name, l.address);
    }

    out.push_str("\n====== MACHINE PROGRAM ======\n");
    out.push_str("  ADDR: MCODE  | ASSEMBLY    \n");
    out.push_str("---------------+-------------\n");
    for (i, (inst, word)) in prog.instructions.iter().zip(&code.words).enumerate() {
        let mem = inst.opcode.format().is_load_store();
        let notes = code.notes.get(i);
        let _ = write!(out, " 0x{i:03X}: 0x{word:04X} | {:<4}", inst.tokens[0]);
        for (o, tok) in inst.tokens[1..].iter().enumerate() {
            if o > 0 {
                out.push(',');
            }
            out.push(' ');
            if o == 1 && mem {
                out.push('[');
            }
            match notes.and_then(|n| n.get(o)).and_then(Option::as_ref) {
                Some(note) => {
                    let _ = write!(out, "{note}");
                }
                None => out.push_str(tok),
            }
        }
        if mem {
            out.push(']');
        }
        out.push('\n');
    }
    out
}
