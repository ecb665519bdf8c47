//! Candy Machine v2 program.

use solana_sdk::pubkey::Pubkey;

use crate::discriminator::Discriminator;
use crate::instructions::{AccountSlot, InstructionDescriptor};
use crate::registry::ProgramDefinition;

/// Candy Machine v2 program id.
pub const PROGRAM_ID: Pubkey = solana_sdk::pubkey!("cndy3Z4yapfJBmL3ShUp5exZKqR3z33thTzeNMm2gRZ");

/// Registry name.
pub const NAME: &str = "candy_machine";

/// `remove_collection` discriminator.
pub const REMOVE_COLLECTION: [u8; 8] = [223, 52, 106, 217, 61, 220, 36, 160];

/// Detaches the collection from a candy machine.
#[must_use]
pub fn remove_collection() -> InstructionDescriptor {
    InstructionDescriptor::new(
        "removeCollection",
        Discriminator::Anchor(REMOVE_COLLECTION),
        PROGRAM_ID,
    )
    .accounts(vec![
        AccountSlot::writable("candy_machine"),
        AccountSlot::readonly_signer("authority"),
        AccountSlot::writable("collection_pda"),
        AccountSlot::readonly("metadata"),
        AccountSlot::readonly("mint"),
        AccountSlot::writable("collection_authority_record"),
        AccountSlot::readonly("token_metadata_program"),
    ])
}

/// Program definition for the registry.
#[must_use]
pub fn definition() -> ProgramDefinition {
    ProgramDefinition::new(NAME, PROGRAM_ID).with_instructions([remove_collection()])
}
