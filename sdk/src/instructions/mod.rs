//! Instruction descriptors and the generic builder.
//!
//! Every instruction in the registry is an [`InstructionDescriptor`]: a discriminator,
//! an argument schema and an ordered list of account slots. [`InstructionBuilder`]
//! turns a descriptor plus caller accounts and arguments into a Solana instruction,
//! applying the per-slot rules for omitted optional accounts.
//!
//! # Example
//!
//! ```rust
//! use mplex_sdk::codec::Value;
//! use mplex_sdk::instructions::InstructionBuilder;
//! use mplex_sdk::programs::token_metadata;
//! use solana_sdk::pubkey::Pubkey;
//!
//! let descriptor = token_metadata::set_collection_size();
//! let ix = InstructionBuilder::new(&descriptor)
//!     .account("collection_metadata", Pubkey::new_unique())
//!     .account("collection_authority", Pubkey::new_unique())
//!     .account("collection_mint", Pubkey::new_unique())
//!     .args(Value::structure([(
//!         "set_collection_size_args",
//!         Value::structure([("size", Value::U64(100))]),
//!     )]))
//!     .build()
//!     .expect("should build instruction");
//!
//! assert_eq!(ix.data[0], 34);
//! assert_eq!(ix.accounts.len(), 3);
//! ```

pub mod builder;
pub mod descriptor;

pub use builder::InstructionBuilder;
pub use descriptor::{
    AccountSlot, InstructionDescriptor, Presence, ASSOCIATED_TOKEN_PROGRAM_ID,
    INSTRUCTIONS_SYSVAR_ID, RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
