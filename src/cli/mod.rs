//! CLI module for dataklass
//!
//! ## Commands
//!
//! - `template <family> <arity>` - Print the generated template source
//! - `disasm <family> <field>...` - Print the specialized code object
//! - `compile <file>` - Compile a template-language file and print its disassembly
//! - `demo` - Declare sample records and exercise the synthesized methods
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use dataklass_core::MethodFamily;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Inspect and exercise dataklass method templates
#[derive(Parser, Debug)]
#[command(name = "dataklass")]
#[command(version = VERSION)]
#[command(about = "Per-arity method templates for record types", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the generated template source for a family and arity
    Template {
        /// Method family (init, repr, eq, iter, hash)
        #[arg(value_parser = parse_family)]
        family: MethodFamily,
        /// Number of fields
        arity: usize,
    },

    /// Print the code object specialized to the given field names
    Disasm {
        #[arg(value_parser = parse_family)]
        family: MethodFamily,
        /// Field names, in order
        #[arg(value_name = "FIELD")]
        fields: Vec<String>,
        /// Show the unspecialized template instead
        #[arg(long)]
        template: bool,
    },

    /// Compile a template-language file and print its disassembly
    Compile {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Print the token stream
        #[arg(long)]
        tokens: bool,
        /// Print the parsed syntax tree
        #[arg(long)]
        ast: bool,
    },

    /// Declare sample records and show the synthesized behavior
    Demo {
        /// Also synthesize __iter__
        #[arg(long)]
        iter: bool,
        /// Also synthesize __hash__
        #[arg(long)]
        hash: bool,
        /// Do not set __match_args__
        #[arg(long)]
        no_match_args: bool,
    },
}

fn parse_family(s: &str) -> Result<MethodFamily, String> {
    MethodFamily::from_str(s).ok_or_else(|| {
        let known: Vec<&str> = dataklass_core::FAMILIES.iter().map(|f| f.as_str()).collect();
        format!("unknown method family '{}' (expected one of: {})", s, known.join(", "))
    })
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Template { family, arity } => commands::print_template(family, arity),
        Command::Disasm {
            family,
            fields,
            template,
        } => commands::disassemble(family, &fields, template),
        Command::Compile { file, tokens, ast } => commands::compile_file(&file, tokens, ast),
        Command::Demo {
            iter,
            hash,
            no_match_args,
        } => commands::demo(iter, hash, !no_match_args),
    }
}

// ============================================================================
// Tests
// ============================================================================
