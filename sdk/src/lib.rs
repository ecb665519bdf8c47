//! mplex SDK - schema-driven codec and instruction builders for the Metaplex
//! program family on Solana.
//!
//! This crate encodes and decodes account data and instruction arguments for
//! token metadata, candy machine (v2 and core), candy guard, auction house,
//! bubblegum and fixed-price sale, and assembles their instructions.
//!
//! # Modules
//!
//! - [`codec`] - Schema types, the generic encoder/decoder and JSON conversion
//! - [`instructions`] - Instruction descriptors and the generic builder
//! - [`accounts`] - Account layouts with optional type tags
//! - [`programs`] - Built-in program definitions
//! - [`registry`] - Program lookup by name or id
//! - [`idl`] - Program definitions from Anchor/Shank IDL files
//! - [`config`] - Program id overrides
//!
//! # Example
//!
//! ```rust
//! use mplex_sdk::instructions::InstructionBuilder;
//! use mplex_sdk::programs::candy_guard;
//! use mplex_sdk::Registry;
//! use solana_sdk::pubkey::Pubkey;
//!
//! let program = Registry::global().program("candy_guard").unwrap();
//! let wrap = program.instruction("wrap").unwrap();
//!
//! let ix = InstructionBuilder::new(wrap)
//!     .account("candy_guard", Pubkey::new_unique())
//!     .account("authority", Pubkey::new_unique())
//!     .account("candy_machine", Pubkey::new_unique())
//!     .account("candy_machine_program", Pubkey::new_unique())
//!     .account("candy_machine_authority", Pubkey::new_unique())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(ix.program_id, candy_guard::PROGRAM_ID);
//! assert_eq!(ix.data, candy_guard::WRAP.to_vec());
//! ```

pub mod accounts;
pub mod codec;
pub mod config;
pub mod discriminator;
pub mod error;
pub mod idl;
pub mod instructions;
pub mod programs;
pub mod registry;

pub use accounts::{AccountLayout, DecodedAccount};
pub use codec::{Schema, Value};
pub use config::{ConfigError, SdkConfig};
pub use discriminator::Discriminator;
pub use error::SdkError;
pub use instructions::{InstructionBuilder, InstructionDescriptor};
pub use registry::{ProgramDefinition, Registry};
