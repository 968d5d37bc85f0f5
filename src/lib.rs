pub mod decoder;
pub mod diag;
pub mod disasm;
pub mod encoder;
pub mod error;
pub mod image;
pub mod instructions;
pub mod listing;
pub mod parser;
pub mod program;

pub mod isa {
    pub mod alarm; // alARM 16-bit, as run by the Logisim CPU
    pub mod syntax;
}

pub use encoder::Encoder;
pub use error::AsmError;
pub use isa::alarm::{AlarmDecoder, Isa};
pub use isa::syntax::SyntaxMode;
pub use parser::Parser;
pub use program::{AsmConfig, Label, MachineCode, Program};

/// Both passes over one source text.
pub fn assemble(src: &str, cfg: &AsmConfig) -> Result<(Program, MachineCode), AsmError> {
    let isa = Isa::new();
    let prog = Parser::new(&isa, cfg).parse(src)?;
    let code = Encoder::new(&isa).encode(&prog)?;
    Ok((prog, code))
}
