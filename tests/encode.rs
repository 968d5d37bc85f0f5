use alarm_asm::error::Radix;
use alarm_asm::{assemble, AsmConfig, AsmError};
use pretty_assertions::assert_eq;

fn words(src: &str) -> Vec<u16> {
    assemble(src, &AsmConfig::default()).unwrap().1.words
}

fn err(src: &str) -> AsmError {
    assemble(src, &AsmConfig::default()).unwrap_err()
}

#[test]
fn reference_program() {
    let src = "START: MOV R0, 5\n       ADD R1, R0, R0\n       B START\n";
    assert_eq!(words(src), vec![0x8005, 0x2008, 0x4FFD]);
}

#[test]
fn no_operand_opcodes() {
    assert_eq!(words("NOP\nHALT\nnop\n  halt  ; stop"), vec![0x0000, 0x0600, 0x0000, 0x0600]);
}

#[test]
fn every_register_fits_its_field() {
    for n in 0..=7u16 {
        // NOT Rd, Rn: Rd at bit 3, Rn at bit 6
        assert_eq!(words(&format!("NOT R{n}, R0")), vec![0x3200 | (n << 3)]);
        assert_eq!(words(&format!("NOT R0, r{n}")), vec![0x3200 | (n << 6)]);
    }
}

#[test]
fn register_eight_is_rejected_by_the_encoder() {
    match err("ADD R1, R8, R2") {
        AsmError::InvalidRegister { line, operand, token, .. } => {
            assert_eq!((line, operand, token.as_str()), (1, 2, "R8"));
        }
        e => panic!("unexpected {e:?}"),
    }
}

#[test]
fn three_register_layout() {
    // ADD Rd, Rn, Rm: d at 3, n at 6, m at 0
    assert_eq!(words("ADD R1, R2, R3"), vec![0x2000 | (1 << 3) | (2 << 6) | 3]);
    // CMP Rn, Rm: n at 6, m at 0
    assert_eq!(words("CMP R5, R6"), vec![0x3E00 | (5 << 6) | 6]);
}

#[test]
fn mov_picks_encoding_by_operand_shape() {
    assert_eq!(words("MOV R1, R2"), vec![0x0888]);
    assert_eq!(words("MOV R1, FLAGS"), vec![0x0C08]);
    assert_eq!(words("MOV flags, R2"), vec![0x0E80]);
    assert_eq!(words("MOV R1, 7"), vec![0x9007]);
}

#[test]
fn mov_with_garbage_source_mentions_register() {
    let e = err("MOV R1, FLAGSX");
    assert!(matches!(e, AsmError::UnparsableImmediate { register_allowed: true, .. }), "{e:?}");
    assert_eq!(
        e.to_string(),
        "line[1]: could not encode 2nd operand 'FLAGSX', expected immediate value or register"
    );
}

#[test]
fn load_store_with_and_without_offset() {
    assert_eq!(words("LDR R2, [R1]"), vec![0x1600 | (2 << 3) | (1 << 6)]);
    assert_eq!(words("LDR R2, [R1, R3]"), vec![0x1000 | (2 << 3) | (1 << 6) | 3]);
    assert_eq!(words("STR R2 R1"), vec![0x1E00 | (2 << 3) | (1 << 6)]);
    assert_eq!(words("STR R2, [R1 R3]"), vec![0x1800 | (2 << 3) | (1 << 6) | 3]);
}

#[test]
fn decimal_range_limits() {
    assert_eq!(words("MOV R0, 2047"), vec![0x87FF]);
    assert_eq!(words("MOV R0, -2048"), vec![0x8800]);
    assert_eq!(words("MOV R0, -1"), vec![0x8FFF]);

    for (src, value) in [("MOV R0, 2048", 2048), ("MOV R0, -2049", -2049)] {
        match err(src) {
            AsmError::ImmediateOutOfRange { value: v, from_label: false, .. } => assert_eq!(v, value),
            e => panic!("unexpected {e:?}"),
        }
    }
    assert_eq!(
        err("MOV R0, 2048").to_string(),
        "line[1]: could not encode 2nd operand '2048', immediate value out of range [-2048, 2047]"
    );
}

#[test]
fn hex_and_binary_are_twelve_bit_twos_complement() {
    assert_eq!(words("MOV R0, 0x7FF"), vec![0x87FF]);
    assert_eq!(words("MOV R0, 0xfff"), vec![0x8FFF]);
    assert_eq!(words("MOV R0, 0x800"), vec![0x8800]);
    assert_eq!(words("MOV R0, 0b101"), vec![0x8005]);
    assert_eq!(words("MOV R0, 0b111111111111"), vec![0x8FFF]);
    assert_eq!(words("B 0xFFD"), vec![0x4FFD]);
}

#[test]
fn over_wide_literals() {
    assert!(matches!(err("MOV R0, 0x1000"), AsmError::LiteralTooWide { radix: Radix::Hex, .. }));
    assert!(matches!(
        err("MOV R0, 0b1111111111111"),
        AsmError::LiteralTooWide { radix: Radix::Binary, .. }
    ));
    assert_eq!(
        err("MOV R0, 0x0001").to_string(),
        "line[1]: could not encode 2nd operand '0X0001', hex value has too many nibbles (max = 3)"
    );
}

#[test]
fn unparsable_immediates() {
    assert!(matches!(
        err("MOV R0, 0x"),
        AsmError::UnparsableImmediate { label_allowed: false, .. }
    ));
    assert!(matches!(
        err("B nowhere"),
        AsmError::UnparsableImmediate { label_allowed: true, register_allowed: false, .. }
    ));
    assert_eq!(
        err("B nowhere").to_string(),
        "line[1]: could not encode 1st operand 'NOWHERE', expected immediate value or valid label"
    );
}

#[test]
fn encoding_stops_at_first_bad_instruction() {
    let e = err("NOP\nMOV R0, 1\nMOV R9, 1\nMOV R0, 99999");
    assert_eq!(e.line(), 3);
    assert!(!e.is_syntax());
}
