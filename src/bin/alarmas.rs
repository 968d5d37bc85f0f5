use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use alarm_asm::image::write_raw_image;
use alarm_asm::{assemble, listing, AsmConfig, SyntaxMode};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Assemble an alARM source file into a Logisim raw memory image"
)]
struct Opts {
    /// Assembly source file
    #[arg(value_name = "SOURCE")]
    source: PathBuf,
    /// Image file to write (v2.0 raw)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
    /// Print the label table and machine program to standard error
    #[arg(short = 'l', long = "listing")]
    listing: bool,
    /// Strict parsing: require commas between operands and [] around memory operands
    #[arg(short, long)]
    strict: bool,
    /// Also write the label table as JSON (Vec<{ name, address }>)
    #[arg(long, value_name = "FILE")]
    labels_out: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures
            return if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(opts: &Opts) -> Result<()> {
    let src = fs::read_to_string(&opts.source)
        .with_context(|| format!("could not open source file '{}'", opts.source.display()))?;

    let cfg = AsmConfig {
        syntax: if opts.strict { SyntaxMode::Strict } else { SyntaxMode::Relaxed },
    };
    let (prog, code) = match assemble(&src, &cfg) {
        Ok(out) => out,
        Err(err) => {
            eprintln!("{}", err.render());
            let pass = if err.is_syntax() { "parse" } else { "encode" };
            bail!("failed to {pass} '{}' into valid program, aborting...", opts.source.display());
        }
    };

    // Only touch the output once both passes have succeeded.
    let file = File::create(&opts.output)
        .with_context(|| format!("could not open destination file '{}'", opts.output.display()))?;

    if opts.listing {
        eprint!("{}", listing::render(&prog, &code));
    }

    write_raw_image(&mut BufWriter::new(file), &code.words)
        .with_context(|| format!("could not write '{}'", opts.output.display()))?;

    if let Some(path) = &opts.labels_out {
        let json = serde_json::to_string_pretty(&prog.labels)?;
        fs::write(path, json).with_context(|| format!("could not write '{}'", path.display()))?;
    }

    info!(
        words = code.words.len(),
        labels = prog.labels.len(),
        output = %opts.output.display(),
        "assembled"
    );
    Ok(())
}
