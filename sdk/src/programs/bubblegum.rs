//! Bubblegum compressed NFT program.
//!
//! Creator, collection and uses layouts are shared with token metadata.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::codec::{Schema, StructSchema, Variant};
use crate::discriminator::Discriminator;
use crate::instructions::{AccountSlot, InstructionDescriptor, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID};
use crate::programs::token_metadata;
use crate::registry::ProgramDefinition;

/// Bubblegum program id.
pub const PROGRAM_ID: Pubkey = solana_sdk::pubkey!("BGUMAp9Gq7iTEuizy4pqaxsTyUCBK68MDfK752saRPUY");

/// Registry name.
pub const NAME: &str = "bubblegum";

/// `verify_collection` discriminator.
pub const VERIFY_COLLECTION: [u8; 8] = [56, 113, 101, 253, 79, 55, 122, 169];
/// `compress` discriminator.
pub const COMPRESS: [u8; 8] = [82, 193, 176, 117, 176, 21, 115, 253];

/// Token standards a compressed leaf can carry.
#[must_use]
pub fn token_standard() -> Schema {
    Schema::scalar_enum(
        "TokenStandard",
        ["NonFungible", "FungibleAsset", "Fungible", "NonFungibleEdition"],
    )
}

/// SPL token program the leaf was minted against.
#[must_use]
pub fn token_program_version() -> Schema {
    Schema::scalar_enum("TokenProgramVersion", ["Original", "Token2022"])
}

/// Metadata hashed into a leaf.
#[must_use]
pub fn metadata_args() -> Schema {
    Schema::structure(
        "MetadataArgs",
        [
            ("name", Schema::String),
            ("symbol", Schema::String),
            ("uri", Schema::String),
            ("seller_fee_basis_points", Schema::U16),
            ("primary_sale_happened", Schema::Bool),
            ("is_mutable", Schema::Bool),
            ("edition_nonce", Schema::option(Schema::U8)),
            ("token_standard", Schema::option(token_standard())),
            ("collection", Schema::option(token_metadata::collection())),
            ("uses", Schema::option(token_metadata::uses())),
            ("token_program_version", token_program_version()),
            ("creators", Schema::vec(token_metadata::creator())),
        ],
    )
}

/// Leaf contents.
#[must_use]
pub fn leaf_schema() -> Schema {
    Schema::data_enum(
        "LeafSchema",
        vec![Variant::named(
            "V1",
            [
                ("id", Schema::PublicKey),
                ("owner", Schema::PublicKey),
                ("delegate", Schema::PublicKey),
                ("nonce", Schema::U64),
                ("data_hash", Schema::array(Schema::U8, 32)),
                ("creator_hash", Schema::array(Schema::U8, 32)),
            ],
        )],
    )
}

/// Verifies the collection of a compressed leaf.
#[must_use]
pub fn verify_collection() -> InstructionDescriptor {
    InstructionDescriptor::new(
        "verifyCollection",
        Discriminator::Anchor(VERIFY_COLLECTION),
        PROGRAM_ID,
    )
    .args(StructSchema::new(
        "VerifyCollectionInstructionArgs",
        [
            ("root", Schema::array(Schema::U8, 32)),
            ("data_hash", Schema::array(Schema::U8, 32)),
            ("creator_hash", Schema::array(Schema::U8, 32)),
            ("nonce", Schema::U64),
            ("index", Schema::U32),
            ("message", metadata_args()),
        ],
    ))
    .accounts(vec![
        AccountSlot::readonly("tree_authority"),
        AccountSlot::readonly("leaf_owner"),
        AccountSlot::readonly("leaf_delegate"),
        AccountSlot::writable("merkle_tree"),
        AccountSlot::readonly_signer("payer"),
        AccountSlot::readonly("tree_delegate"),
        AccountSlot::readonly_signer("collection_authority"),
        AccountSlot::readonly("collection_authority_record_pda"),
        AccountSlot::readonly("collection_mint"),
        AccountSlot::readonly("collection_metadata"),
        AccountSlot::readonly("edition_account"),
        AccountSlot::readonly("bubblegum_signer"),
        AccountSlot::readonly("log_wrapper"),
        AccountSlot::readonly("compression_program"),
        AccountSlot::readonly("token_metadata_program"),
        AccountSlot::defaulted("system_program", SYSTEM_PROGRAM_ID),
    ])
    .with_remaining_accounts()
}

/// Compresses a token metadata NFT into a tree (legacy builder).
///
/// The program id and the system and token program accounts are hard-wired.
#[must_use]
pub fn compress() -> InstructionDescriptor {
    InstructionDescriptor::new("compress", Discriminator::Anchor(COMPRESS), PROGRAM_ID)
        .accounts(vec![
            AccountSlot::readonly("authority"),
            AccountSlot::readonly("merkle_slab"),
            AccountSlot::readonly_signer("owner"),
            AccountSlot::readonly("delegate"),
            AccountSlot::writable("token_account"),
            AccountSlot::writable("mint"),
            AccountSlot::writable("metadata"),
            AccountSlot::writable("master_edition"),
            AccountSlot::writable_signer("payer"),
            AccountSlot::fixed("system_program", SYSTEM_PROGRAM_ID),
            AccountSlot::readonly("token_metadata_program"),
            AccountSlot::fixed("token_program", TOKEN_PROGRAM_ID),
            AccountSlot::readonly("candy_wrapper"),
            AccountSlot::readonly("gummyroll_program"),
        ])
        .fixed_program_id()
}

/// Program definition for the registry.
#[must_use]
pub fn definition() -> ProgramDefinition {
    ProgramDefinition::new(NAME, PROGRAM_ID)
        .with_types([
            token_metadata::creator(),
            token_metadata::collection(),
            token_metadata::use_method(),
            token_metadata::uses(),
            token_standard(),
            token_program_version(),
            metadata_args(),
            leaf_schema(),
        ])
        .with_instructions([verify_collection(), compress()])
}

/// Borsh mirrors of the argument types.
pub mod args {
    use super::{BorshDeserialize, BorshSerialize};
    use crate::programs::token_metadata::args::{Collection, Creator, Uses};

    /// Token standard.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub enum TokenStandard {
        /// Non-fungible.
        NonFungible,
        /// Fungible with metadata.
        FungibleAsset,
        /// Fungible.
        Fungible,
        /// Print edition.
        NonFungibleEdition,
    }

    /// Token program version.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub enum TokenProgramVersion {
        /// SPL Token.
        Original,
        /// Token-2022.
        Token2022,
    }

    /// Leaf metadata.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct MetadataArgs {
        /// Asset name.
        pub name: String,
        /// Asset symbol.
        pub symbol: String,
        /// Off-chain JSON uri.
        pub uri: String,
        /// Royalty in basis points.
        pub seller_fee_basis_points: u16,
        /// Whether the first sale happened.
        pub primary_sale_happened: bool,
        /// Whether the metadata can change.
        pub is_mutable: bool,
        /// Edition PDA bump.
        pub edition_nonce: Option<u8>,
        /// Token standard.
        pub token_standard: Option<TokenStandard>,
        /// Collection.
        pub collection: Option<Collection>,
        /// Use limits.
        pub uses: Option<Uses>,
        /// Token program version.
        pub token_program_version: TokenProgramVersion,
        /// Creators.
        pub creators: Vec<Creator>,
    }

    /// Arguments of `verifyCollection`.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct VerifyCollectionArgs {
        /// Current tree root.
        pub root: [u8; 32],
        /// Hash of the leaf metadata.
        pub data_hash: [u8; 32],
        /// Hash of the leaf creators.
        pub creator_hash: [u8; 32],
        /// Leaf nonce.
        pub nonce: u64,
        /// Leaf index.
        pub index: u32,
        /// Leaf metadata.
        pub message: MetadataArgs,
    }
}
