use std::path::Path;

use bpdecomp_lib::{DecompileMode, DecompileOptions, FunctionScript, HexResolver, NameResolver, Opcode, SymbolMap};
use clap::{CommandFactory, Parser};
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::cli::{Cli, DecompileCommand, DecompileModeCli, TopLevel};

mod cli;

fn fail(msg: String) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

fn load_symbols(path: &Path) -> SymbolMap {
    let src = std::fs::read_to_string(path).unwrap_or_else(|e| fail(format!("failed to read {path:?}: {e}")));
    let map = SymbolMap::from_json(&src).unwrap_or_else(|e| fail(format!("{path:?}: {e}")));
    info!(names = map.len(), "loaded symbol map");
    map
}

fn main() {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber).unwrap_or_else(|e| {
        eprintln!("Unable to configure logging: {e}");
        std::process::exit(1);
    });

    match cli.command {
        Some(TopLevel::Decompile { command }) => match command {
            DecompileCommand::File {
                path,
                mode,
                symbols,
                function,
                owner,
                flags,
                json,
            } => {
                let mode = match mode {
                    DecompileModeCli::Pseudo => DecompileMode::Pseudo,
                    DecompileModeCli::Disasm => DecompileMode::Disasm,
                };
                let bytes = std::fs::read(&path).unwrap_or_else(|e| fail(format!("failed to read {path:?}: {e}")));
                debug!(?path, bytes = bytes.len(), "read script");

                let symbols = symbols.as_deref().map(load_symbols);
                let resolver: &dyn NameResolver = match &symbols {
                    Some(map) => map,
                    None => &HexResolver,
                };

                let name = function.unwrap_or_else(|| {
                    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
                });
                let script = FunctionScript {
                    name: &name,
                    owner: &owner,
                    flags: &flags,
                    script_size: u32::try_from(bytes.len()).unwrap_or(u32::MAX),
                    script: &bytes,
                };
                let result = bpdecomp_lib::decompile_with_options(&script, resolver, DecompileOptions { mode });

                if json {
                    match serde_json::to_string_pretty(&result) {
                        Ok(out) => println!("{out}"),
                        Err(e) => fail(format!("failed to encode result: {e}")),
                    }
                } else {
                    print!("{result}");
                }
            }
        },
        Some(TopLevel::Opcodes) => {
            for op in Opcode::iter() {
                println!("0x{:02X}  {op}", op.byte());
            }
        }
        Some(TopLevel::Completion { shell }) => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
        None => {
            if let Err(e) = Cli::command().print_help() {
                fail(format!("failed to print help: {e}"));
            }
        }
    }
}
