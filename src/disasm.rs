use crate::decoder::Decoded;
use crate::instructions::{Format, OperandWidth};
use crate::isa::alarm::FLAGS;

/// Strict-syntax source for a decoded word. Immediates print as their 12-bit
/// field in hex, which strict mode reads back as the same value.
pub fn fmt_decoded(d: &Decoded) -> String {
    fmt_with_target(d, None)
}

/// Like [`fmt_decoded`], with the branch operand replaced by `target` when given.
pub fn fmt_with_target(d: &Decoded, target: Option<&str>) -> String {
    let format = d.op.format();
    let ops: Vec<String> = format
        .descriptors()
        .iter()
        .zip(d.fields)
        .map(|(desc, field)| match desc.width {
            OperandWidth::Reg => format!("R{field}"),
            OperandWidth::None => FLAGS.to_string(),
            OperandWidth::Imm => match target {
                Some(label) if format.is_branch() => label.to_string(),
                _ => format!("0x{field:03X}"),
            },
        })
        .collect();

    let mn = d.op.mnemonic();
    match (format, ops.as_slice()) {
        (Format::S, _) => mn.to_string(),
        (Format::Ls, [rd, rn]) => format!("{mn} {rd}, [{rn}]"),
        (Format::Lso, [rd, rn, rm]) => format!("{mn} {rd}, [{rn}, {rm}]"),
        _ => format!("{mn} {}", ops.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::Decoder;
    use crate::isa::alarm::AlarmDecoder;

    fn dis(word: u16) -> String {
        fmt_decoded(&AlarmDecoder::new().decode(word).unwrap())
    }

    #[test]
    fn formats_each_shape() {
        assert_eq!(dis(0x0000), "NOP");
        assert_eq!(dis(0x0600), "HALT");
        assert_eq!(dis(0x0800 | (1 << 3) | (2 << 6)), "MOV R1, R2");
        assert_eq!(dis(0x0C00 | (4 << 3)), "MOV R4, FLAGS");
        assert_eq!(dis(0x0E00 | (4 << 6)), "MOV FLAGS, R4");
        assert_eq!(dis(0x1600 | (1 << 3) | (2 << 6)), "LDR R1, [R2]");
        assert_eq!(dis(0x1800 | (1 << 3) | (2 << 6) | 3), "STR R1, [R2, R3]");
        assert_eq!(dis(0x3E00 | (5 << 6) | 6), "CMP R5, R6");
        assert_eq!(dis(0x4FFD), "B 0xFFD");
        assert_eq!(dis(0x8000 | (2 << 12) | 0x800), "MOV R2, 0x800");
        assert_eq!(dis(0x8005), "MOV R0, 0x005");
    }

    #[test]
    fn branch_target_label() {
        let d = AlarmDecoder::new().decode(0x6002).unwrap();
        assert_eq!(fmt_with_target(&d, Some("L_0005")), "BEQ L_0005");
    }
}
