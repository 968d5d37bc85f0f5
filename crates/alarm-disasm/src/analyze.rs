use std::collections::BTreeSet;
use serde::Serialize;

use alarm_asm::decoder::Decoder;
use alarm_asm::instructions::Opcode;
use alarm_asm::AlarmDecoder;

use crate::model::{is_mapped, Image};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind { Fallthrough, Branch, CondBranch }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge { pub from: usize, pub to: usize, pub kind: EdgeKind }

/// `[start, end)` in word addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Block { pub start: usize, pub end: usize }

#[derive(Debug, Clone, Default, Serialize)]
pub struct Analysis {
    pub edges: Vec<Edge>,
    pub blocks: Vec<Block>,
    /// In-image branch destinations.
    pub targets: BTreeSet<usize>,
    /// Words that decode to no instruction.
    pub invalid: Vec<usize>,
}

/// Linear sweep: every word is an instruction, branches are PC-relative to the
/// following word.
pub fn analyze(img: &Image) -> Analysis {
    let dec = AlarmDecoder::new();
    let mut out = Analysis::default();
    let mut starts: BTreeSet<usize> = BTreeSet::new();
    if !img.is_empty() { starts.insert(0); }

    for (pc, &word) in img.words.iter().enumerate() {
        let ft = pc + 1;
        let Some(d) = dec.decode(word) else {
            out.invalid.push(pc);
            continue;
        };
        match d.op {
            Opcode::B | Opcode::Beq | Opcode::Bne => {
                let tgt = ft as i64 + i64::from(d.imm().unwrap_or_default());
                if is_mapped(img, tgt) {
                    let tgt = tgt as usize;
                    let kind = if d.op == Opcode::B { EdgeKind::Branch } else { EdgeKind::CondBranch };
                    out.edges.push(Edge { from: pc, to: tgt, kind });
                    out.targets.insert(tgt);
                    starts.insert(tgt);
                }
                if d.op != Opcode::B && ft < img.len() {
                    out.edges.push(Edge { from: pc, to: ft, kind: EdgeKind::Fallthrough });
                }
                starts.insert(ft);
            }
            Opcode::Halt => { starts.insert(ft); }
            _ => {
                if ft < img.len() {
                    out.edges.push(Edge { from: pc, to: ft, kind: EdgeKind::Fallthrough });
                }
            }
        }
    }

    let starts: Vec<usize> = starts.into_iter().filter(|&s| s < img.len()).collect();
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(img.len());
        out.blocks.push(Block { start, end });
    }
    out
}
