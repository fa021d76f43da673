use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, builder::{Styles, styling::{AnsiColor, Effects}}, crate_description, crate_name, crate_version};
use clap_complete::Shell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecompileModeCli {
    Pseudo,
    Disasm,
}

#[derive(Parser)]
#[command(name = crate_name!(),
    version = crate_version!(),
    about = crate_description!(),
    styles = Styles::styled()
        .header(AnsiColor::BrightGreen.on_default() | Effects::BOLD | Effects::UNDERLINE)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default()))]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<TopLevel>,
}

#[derive(Subcommand)]
pub enum TopLevel {
    /// Decompiles a raw script bytecode dump
    Decompile {
        #[command(subcommand)]
        command: DecompileCommand,
    },
    /// Lists the opcode table
    Opcodes,
    /// Generate shell completion
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum DecompileCommand {
    /// Decompiles a file holding one function's script bytes
    File {
        /// Path to the script bytes
        path: PathBuf,

        /// Output mode
        #[arg(long, value_enum, default_value_t = DecompileModeCli::Pseudo)]
        mode: DecompileModeCli,

        /// JSON object mapping references ("0x..." or decimal) to names
        #[arg(long)]
        symbols: Option<PathBuf>,

        /// Function name for the result header (default: file stem)
        #[arg(long)]
        function: Option<String>,

        /// Owning class name for the result header
        #[arg(long, default_value = "Unknown")]
        owner: String,

        /// Function flags for the result header
        #[arg(long, default_value = "")]
        flags: String,

        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    }
}
