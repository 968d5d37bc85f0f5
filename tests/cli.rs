use std::path::PathBuf;
use std::process::Command;

use alarm_asm::Label;
use pretty_assertions::assert_eq;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("alarmas_cli_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

fn alarmas() -> Command {
    Command::new(env!("CARGO_BIN_EXE_alarmas"))
}

#[test]
fn assembles_to_image_and_labels() {
    let src = scratch("ok.s");
    let out = scratch("ok.hex");
    let labels = scratch("ok.json");
    std::fs::write(&src, "START: MOV R0, 5\nADD R1, R0, R0\nB START\n").unwrap();

    let res = alarmas()
        .arg(&src)
        .arg(&out)
        .arg("-l")
        .arg("--labels-out")
        .arg(&labels)
        .output()
        .unwrap();
    assert!(res.status.success(), "{}", String::from_utf8_lossy(&res.stderr));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "v2.0 raw\n8005\n2008\n4FFD");
    assert!(String::from_utf8_lossy(&res.stderr).contains("=== LABEL LIST ==="));

    let parsed: Vec<Label> = serde_json::from_str(&std::fs::read_to_string(&labels).unwrap()).unwrap();
    assert_eq!(parsed, vec![Label { name: "START".into(), address: 0 }]);
}

#[test]
fn failed_assembly_leaves_no_output() {
    let src = scratch("bad.s");
    let out = scratch("bad.hex");
    std::fs::write(&src, "NOP\nADD R1, R9, R2\n").unwrap();
    let _ = std::fs::remove_file(&out);

    let res = alarmas().arg(&src).arg(&out).output().unwrap();
    assert_eq!(res.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&res.stderr);
    assert!(stderr.contains("line[2]: could not encode 2nd operand 'R9'"), "{stderr}");
    assert!(stderr.contains("failed to encode"), "{stderr}");
    assert!(!out.exists());
}

#[test]
fn strict_flag_switches_syntax() {
    let src = scratch("loose.s");
    let out = scratch("loose.hex");
    std::fs::write(&src, "ADD R1 R2 R3\n").unwrap();

    assert!(alarmas().arg(&src).arg(&out).status().unwrap().success());
    let res = alarmas().arg("-s").arg(&src).arg(&out).output().unwrap();
    assert_eq!(res.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&res.stderr).contains("failed to parse"));
}

#[test]
fn usage_and_missing_source_fail() {
    assert_eq!(alarmas().output().unwrap().status.code(), Some(1));
    let res = alarmas().arg(scratch("absent.s")).arg(scratch("absent.hex")).output().unwrap();
    assert_eq!(res.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&res.stderr).contains("could not open source file"));
}
