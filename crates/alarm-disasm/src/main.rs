use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::path::PathBuf;

use alarm_asm::decoder::Decoder;
use alarm_asm::disasm::fmt_with_target;
use alarm_asm::{AlarmDecoder, Label};
use alarm_disasm::{analyze, load_raw_image, Analysis, Block, Edge, Image};

#[derive(Parser, Debug)]
#[command(author, version, about = "alARM raw image disassembler", long_about = None)]
struct Cli {
    /// Input image (v2.0 raw)
    #[arg(value_name = "IMAGE")]
    input: PathBuf,
    /// Import labels from JSON (Vec<{ name, address }>), as written by `alarmas --labels-out`
    #[arg(long, value_name = "FILE")]
    labels_in: Option<PathBuf>,
    /// Output format: text or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Append address and machine word to every text line
    #[arg(long)]
    show_words: bool,
    /// Write output to file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

#[derive(Debug, Clone, Serialize)]
struct LineOut { addr: usize, word: u16, text: Option<String> }

#[derive(Debug, Clone, Serialize)]
struct Report {
    blocks: Vec<Block>,
    edges: Vec<Edge>,
    labels: Vec<Label>,
    lines: Vec<LineOut>,
}

/// Address -> label name. Imported names win; every other branch target gets
/// `L_<addr>`.
fn build_labels(img: &Image, analysis: &Analysis, imported: Vec<Label>) -> BTreeMap<usize, String> {
    let mut labels: BTreeMap<usize, String> = BTreeMap::new();
    for l in imported {
        if l.address < img.len() {
            labels.entry(l.address).or_insert(l.name);
        }
    }
    let mut used: HashSet<String> = labels.values().cloned().collect();
    for &t in &analysis.targets {
        if labels.contains_key(&t) { continue; }
        let mut name = format!("L_{t:04X}");
        while used.contains(&name) { name.push('_'); }
        used.insert(name.clone());
        labels.insert(t, name);
    }
    labels
}

fn disassemble_word(addr: usize, word: u16, labels: &BTreeMap<usize, String>) -> Option<String> {
    let d = AlarmDecoder::new().decode(word)?;
    let target = d
        .op
        .format()
        .is_branch()
        .then(|| d.imm())
        .flatten()
        .map(|off| addr as i64 + 1 + i64::from(off))
        .and_then(|t| usize::try_from(t).ok())
        .and_then(|t| labels.get(&t))
        .map(String::as_str);
    Some(fmt_with_target(&d, target))
}

/// Source text that re-assembles (strict or relaxed) to the same image, apart
/// from words that decode to nothing, which are kept as comments.
fn render_text(img: &Image, labels: &BTreeMap<usize, String>, show_words: bool) -> String {
    let mut buf = String::new();
    for (addr, &word) in img.words.iter().enumerate() {
        if let Some(name) = labels.get(&addr) {
            let _ = writeln!(buf, "{name}:");
        }
        match disassemble_word(addr, word, labels) {
            Some(text) if show_words => {
                let _ = writeln!(buf, "    {text:<24} ; 0x{addr:04X}: {word:04X}");
            }
            Some(text) => {
                let _ = writeln!(buf, "    {text}");
            }
            None => {
                let _ = writeln!(buf, "    ; 0x{addr:04X}: {word:04X} <invalid>");
            }
        }
    }
    buf
}

fn build_report(img: &Image, analysis: Analysis, labels: &BTreeMap<usize, String>) -> Report {
    let lines = img
        .words
        .iter()
        .enumerate()
        .map(|(addr, &word)| LineOut { addr, word, text: disassemble_word(addr, word, labels) })
        .collect();
    Report {
        blocks: analysis.blocks,
        edges: analysis.edges,
        labels: labels
            .iter()
            .map(|(&address, name)| Label { name: name.clone(), address })
            .collect(),
        lines,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let img = load_raw_image(&cli.input)?;
    let analysis = analyze(&img);
    if !analysis.invalid.is_empty() {
        warn!(count = analysis.invalid.len(), "words that decode to no instruction");
    }

    let imported = match &cli.labels_in {
        Some(path) => {
            let txt = std::fs::read_to_string(path)
                .with_context(|| format!("could not read labels '{}'", path.display()))?;
            serde_json::from_str::<Vec<Label>>(&txt)
                .with_context(|| format!("bad labels file '{}'", path.display()))?
        }
        None => Vec::new(),
    };
    let labels = build_labels(&img, &analysis, imported);
    info!(words = img.len(), labels = labels.len(), blocks = analysis.blocks.len(), "analyzed");

    let output = match cli.format {
        OutputFormat::Text => render_text(&img, &labels, cli.show_words),
        OutputFormat::Json => serde_json::to_string_pretty(&build_report(&img, analysis, &labels))? + "\n",
    };
    if let Some(path) = cli.out { std::fs::write(path, output)?; } else { print!("{}", output); }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alarm_asm::{assemble, AsmConfig};

    const SRC: &str = "\
START: MOV R0, 5
LOOP:  ADD R1, R0, R0
       LDR R2, [R1, R0]
       MOV R4, -7
       MOV R3, FLAGS
       BNE LOOP
       B START
       HALT
";

    fn image_of(src: &str) -> Image {
        let (_, code) = assemble(src, &AsmConfig::default()).unwrap();
        Image { words: code.words }
    }

    #[test]
    fn synthesized_labels_follow_branch_targets() {
        let img = image_of(SRC);
        let labels = build_labels(&img, &analyze(&img), Vec::new());
        assert_eq!(labels.get(&0).map(String::as_str), Some("L_0000"));
        assert_eq!(labels.get(&1).map(String::as_str), Some("L_0001"));
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn imported_labels_take_precedence() {
        let img = image_of(SRC);
        let (prog, _) = assemble(SRC, &AsmConfig::default()).unwrap();
        let labels = build_labels(&img, &analyze(&img), prog.labels);
        assert_eq!(labels.get(&0).map(String::as_str), Some("START"));
        assert_eq!(labels.get(&1).map(String::as_str), Some("LOOP"));
        let text = render_text(&img, &labels, false);
        assert!(text.contains("LOOP:\n    ADD R1, R0, R0\n"));
        assert!(text.contains("    BNE LOOP\n"));
    }

    #[test]
    fn disassembly_reassembles_to_the_same_words() {
        let img = image_of(SRC);
        let labels = build_labels(&img, &analyze(&img), Vec::new());
        let text = render_text(&img, &labels, true);
        assert!(text.contains("    MOV R4, 0xFF9 "), "{text}");
        let (_, again) = assemble(&text, &AsmConfig::strict()).unwrap();
        assert_eq!(again.words, img.words);
    }

    #[test]
    fn invalid_words_become_comments() {
        let img = Image { words: vec![0x0001] };
        let text = render_text(&img, &BTreeMap::new(), false);
        assert_eq!(text, "    ; 0x0000: 0001 <invalid>\n");
    }
}
