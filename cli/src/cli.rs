//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Encode, decode and build Metaplex program data.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Extra IDL files to register (repeatable).
    #[arg(long, global = true)]
    pub idl: Vec<PathBuf>,

    /// JSON configuration file with program id overrides.
    #[arg(long, global = true, env = "MPLEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered programs.
    Programs,

    /// List the types, instructions and accounts of a program.
    Types {
        /// Program name.
        program: String,
    },

    /// Encode a JSON value with a named type; prints hex.
    Encode {
        /// Program name.
        program: String,
        /// Type name.
        type_name: String,
        /// Value as JSON.
        json: String,
    },

    /// Decode hex bytes with a named type; prints JSON.
    Decode {
        /// Program name.
        program: String,
        /// Type name.
        type_name: String,
        /// Data as hex.
        hex: String,
        /// Offset to start decoding at.
        #[arg(long, default_value = "0")]
        offset: usize,
    },

    /// Decode account data; the layout is detected from the type tag when omitted.
    DecodeAccount {
        /// Program name.
        program: String,
        /// Account data as hex.
        hex: String,
        /// Account layout name.
        #[arg(long)]
        account: Option<String>,
    },

    /// Build an instruction; prints program id, accounts and hex data as JSON.
    Build {
        /// Program name.
        program: String,
        /// Instruction name.
        instruction: String,
        /// Account as `name=ADDRESS` (repeatable).
        #[arg(long = "account", short = 'a')]
        accounts: Vec<String>,
        /// Trailing account as `ADDRESS[:ws]` (repeatable).
        #[arg(long = "remaining")]
        remaining: Vec<String>,
        /// Arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,
        /// Program id override.
        #[arg(long)]
        program_id: Option<String>,
    },

    /// Identify and decode instruction data.
    DecodeIx {
        /// Program name or program id.
        program: String,
        /// Instruction data as hex.
        hex: String,
    },
}
