use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

mod expr;
mod opcode;
mod reader;
mod resolve;

pub use expr::{ExprParser, MAX_DEPTH, TRUNCATED, Visit};
pub use opcode::{Opcode, Token};
pub use reader::Reader;
pub use resolve::{HexResolver, NameResolver, SymbolMap};

/// Most statements a single script renders before output is cut off.
pub const MAX_STATEMENTS: usize = 2000;

pub const EMPTY_SCRIPT: &str = "// Empty script\n";

const TRUNCATED_STATEMENTS: &str = "  // ... truncated (>2000 statements)\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecompileMode {
    /// One line of pseudocode per top-level statement.
    #[default]
    Pseudo,
    /// Every opcode with its offset, indented by nesting depth.
    Disasm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecompileOptions {
    pub mode: DecompileMode,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid symbol map: {0}")]
    SymbolMap(#[from] serde_json::Error),

    #[error("invalid reference key: {0:?}")]
    InvalidReference(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A script function as captured from the reflection layer: its metadata and
/// a snapshot of its bytecode.
#[derive(Debug, Clone, Copy)]
pub struct FunctionScript<'a> {
    pub name: &'a str,
    pub owner: &'a str,
    pub flags: &'a str,
    /// Script size as reported by the owning function, which need not match
    /// `script.len()` for a stale snapshot.
    pub script_size: u32,
    pub script: &'a [u8],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecompileResult {
    pub function_name: String,
    pub owner_name: String,
    pub flags_text: String,
    pub script_byte_length: u32,
    pub pseudocode: String,
}

impl fmt::Display for DecompileResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "// {}::{}", self.owner_name, self.function_name)?;
        writeln!(f, "// Flags: {}", self.flags_text)?;
        writeln!(f, "// Script size: {} bytes", self.script_byte_length)?;
        f.write_str(&self.pseudocode)
    }
}

/// Renders a whole script, one line per top-level statement.
pub fn decompile_bytes(script: &[u8], resolver: &dyn NameResolver) -> String {
    decompile_bytes_with_options(script, resolver, DecompileOptions::default())
}

pub fn decompile_bytes_with_options(
    script: &[u8],
    resolver: &dyn NameResolver,
    options: DecompileOptions,
) -> String {
    if script.is_empty() {
        return EMPTY_SCRIPT.into();
    }

    let mut parser = match options.mode {
        DecompileMode::Pseudo => ExprParser::new(resolver),
        DecompileMode::Disasm => ExprParser::with_trace(resolver),
    };
    let mut r = Reader::new(script);
    let mut out = String::new();
    let mut lines = 0usize;

    while r.has_more() {
        let token = r.peek_token();
        if token.is(Opcode::EndOfScript) {
            break;
        }
        if token.is(Opcode::Nothing) {
            r.get_token();
            continue;
        }
        if lines == MAX_STATEMENTS {
            warn!(offset = r.position(), size = r.size(), "statement limit reached");
            out.push_str(TRUNCATED_STATEMENTS);
            break;
        }

        let offset = r.position();
        let text = parser.parse_expression(&mut r, 0);
        match options.mode {
            DecompileMode::Pseudo => {
                if text.is_empty() {
                    continue;
                }
                out.push_str(&format!("  {offset:04X}: {text}\n"));
            }
            DecompileMode::Disasm => {
                for visit in parser.take_visits() {
                    let indent = "  ".repeat(visit.depth as usize);
                    out.push_str(&format!("  {:04X}: {indent}{}\n", visit.offset, visit.token));
                }
            }
        }
        lines += 1;
    }

    out
}

/// Decompiles one function into a fresh [`DecompileResult`].
pub fn decompile(function: &FunctionScript<'_>, resolver: &dyn NameResolver) -> DecompileResult {
    decompile_with_options(function, resolver, DecompileOptions::default())
}

pub fn decompile_with_options(
    function: &FunctionScript<'_>,
    resolver: &dyn NameResolver,
    options: DecompileOptions,
) -> DecompileResult {
    debug!(
        function = function.name,
        owner = function.owner,
        bytes = function.script.len(),
        mode = ?options.mode,
        "decompiling"
    );
    DecompileResult {
        function_name: function.name.to_string(),
        owner_name: function.owner.to_string(),
        flags_text: function.flags.to_string(),
        script_byte_length: function.script_size,
        pseudocode: decompile_bytes_with_options(function.script, resolver, options),
    }
}
