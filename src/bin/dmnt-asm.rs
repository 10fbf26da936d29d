//! Command-line driver: converts one or more `.txt` cheat files to
//! their sibling `.asm` disassembly.
//!
//! Grounded on `original_source/dmnt_asm/__main__.py` for the
//! path-rewriting behavior, and on `19h-isa-classifier/classifier/src/main.rs`
//! for the `clap`/`tracing` CLI shape.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use dmnt_asm::cheatfile::{disassemble_file, Dialect};
use dmnt_asm::disassembler::DecodeOptions;

/// Disassembles Atmosphere `dmnt` cheat machine code into readable assembly.
#[derive(Parser, Debug)]
#[command(name = "dmnt-asm")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input `.txt` cheat files to convert.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Raise log verbosity.
    #[arg(short, long)]
    verbose: bool,

    /// Indent width used for nested `if`/`loop` blocks.
    #[arg(long, default_value_t = 4)]
    indent: usize,

    /// Disable the decoder's whitespace-alignment leniency.
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose { "dmnt_asm=debug" } else { "dmnt_asm=info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let options = DecodeOptions { strict: args.strict };
    let mut success = true;
    for path in &args.files {
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            tracing::debug!(path = %path.display(), "skipping non-.txt input");
            continue;
        }
        if let Err(e) = convert_file(path, &options, args.indent) {
            tracing::error!(path = %path.display(), error = %e, "conversion failed");
            success = false;
        }
    }

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn convert_file(path: &Path, options: &DecodeOptions, indent: usize) -> std::io::Result<()> {
    let content = std::fs::read_to_string(path)?;
    let (file, all_ok) = disassemble_file(&content, *options, |line_no, fragment, e| {
        tracing::warn!(path = %path.display(), line_no, fragment, error = %e, "failed to convert line");
    });
    let dism = file.render(indent, Dialect::Assembly);

    let out_path = path.with_extension("asm");
    std::fs::write(&out_path, dism)?;
    tracing::info!(from = %path.display(), to = %out_path.display(), success = all_ok, "converted");

    if !all_ok {
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "one or more lines failed to convert"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_args() {
        let args = Args::try_parse_from(["dmnt-asm", "cheat.txt"]).unwrap();
        assert_eq!(args.files.len(), 1);
        assert_eq!(args.indent, 4);
        assert!(!args.strict);
    }

    #[test]
    fn parses_strict_and_indent_overrides() {
        let args = Args::try_parse_from(["dmnt-asm", "--strict", "--indent", "2", "cheat.txt"]).unwrap();
        assert!(args.strict);
        assert_eq!(args.indent, 2);
    }
}
