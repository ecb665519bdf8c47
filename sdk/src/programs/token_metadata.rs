//! Token Metadata program.
//!
//! Shank program: instructions carry a single-byte discriminator and optional
//! accounts default to the program id.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::codec::{Schema, StructSchema, Variant};
use crate::discriminator::Discriminator;
use crate::instructions::{AccountSlot, InstructionDescriptor, INSTRUCTIONS_SYSVAR_ID, SYSTEM_PROGRAM_ID};
use crate::registry::ProgramDefinition;

/// Token Metadata program id.
pub const PROGRAM_ID: Pubkey = solana_sdk::pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

/// Registry name.
pub const NAME: &str = "token_metadata";

/// Instruction discriminators.
pub mod discriminators {
    /// `UnverifyCollection`.
    pub const UNVERIFY_COLLECTION: u8 = 22;
    /// `VerifySizedCollectionItem`.
    pub const VERIFY_SIZED_COLLECTION_ITEM: u8 = 30;
    /// `CreateMetadataAccountV3`.
    pub const CREATE_METADATA_ACCOUNT_V3: u8 = 33;
    /// `SetCollectionSize`.
    pub const SET_COLLECTION_SIZE: u8 = 34;
    /// `Revoke`.
    pub const REVOKE: u8 = 49;
    /// `Verify`.
    pub const VERIFY: u8 = 52;
}

/// Account type tag stored in the first byte of every metadata account.
#[must_use]
pub fn key() -> Schema {
    Schema::scalar_enum(
        "Key",
        [
            "Uninitialized",
            "EditionV1",
            "MasterEditionV1",
            "ReservationListV1",
            "MetadataV1",
            "ReservationListV2",
            "MasterEditionV2",
            "EditionMarker",
            "UseAuthorityRecord",
            "CollectionAuthorityRecord",
            "TokenOwnedEscrow",
            "TokenRecord",
            "MetadataDelegate",
            "EditionMarkerV2",
            "HolderDelegate",
        ],
    )
}

/// Verified creator with a royalty share.
#[must_use]
pub fn creator() -> Schema {
    Schema::structure(
        "Creator",
        [
            ("address", Schema::PublicKey),
            ("verified", Schema::Bool),
            ("share", Schema::U8),
        ],
    )
}

/// Collection membership.
#[must_use]
pub fn collection() -> Schema {
    Schema::structure(
        "Collection",
        [("verified", Schema::Bool), ("key", Schema::PublicKey)],
    )
}

/// How a use-limited asset is consumed.
#[must_use]
pub fn use_method() -> Schema {
    Schema::scalar_enum("UseMethod", ["Burn", "Multiple", "Single"])
}

/// Use limits.
#[must_use]
pub fn uses() -> Schema {
    Schema::structure(
        "Uses",
        [
            ("use_method", use_method()),
            ("remaining", Schema::U64),
            ("total", Schema::U64),
        ],
    )
}

/// Token standard of a mint.
#[must_use]
pub fn token_standard() -> Schema {
    Schema::scalar_enum(
        "TokenStandard",
        [
            "NonFungible",
            "FungibleAsset",
            "Fungible",
            "NonFungibleEdition",
            "ProgrammableNonFungible",
            "ProgrammableNonFungibleEdition",
        ],
    )
}

/// Sized collection details. Both variants are 8 bytes wide.
#[must_use]
pub fn collection_details() -> Schema {
    Schema::data_enum(
        "CollectionDetails",
        vec![
            Variant::named("V1", [("size", Schema::U64)]),
            Variant::named("V2", [("padding", Schema::FixedBytes(8))]),
        ],
    )
}

/// Mutable metadata fields.
#[must_use]
pub fn data_v2() -> Schema {
    Schema::structure(
        "DataV2",
        [
            ("name", Schema::String),
            ("symbol", Schema::String),
            ("uri", Schema::String),
            ("seller_fee_basis_points", Schema::U16),
            ("creators", Schema::option(Schema::vec(creator()))),
            ("collection", Schema::option(collection())),
            ("uses", Schema::option(uses())),
        ],
    )
}

/// Arguments of `CreateMetadataAccountV3`.
#[must_use]
pub fn create_metadata_account_args_v3() -> Schema {
    Schema::structure(
        "CreateMetadataAccountArgsV3",
        [
            ("data", data_v2()),
            ("is_mutable", Schema::Bool),
            ("collection_details", Schema::option(collection_details())),
        ],
    )
}

/// Arguments of `SetCollectionSize`.
#[must_use]
pub fn set_collection_size_args() -> Schema {
    Schema::structure("SetCollectionSizeArgs", [("size", Schema::U64)])
}

/// Token delegate roles.
#[must_use]
pub fn token_delegate_role() -> Schema {
    Schema::scalar_enum(
        "TokenDelegateRole",
        [
            "Sale",
            "Transfer",
            "Utility",
            "Staking",
            "Standard",
            "LockedTransfer",
            "Migration",
        ],
    )
}

/// Metadata delegate roles.
#[must_use]
pub fn metadata_delegate_role() -> Schema {
    Schema::scalar_enum(
        "MetadataDelegateRole",
        [
            "AuthorityItem",
            "Collection",
            "Use",
            "Data",
            "ProgrammableConfig",
            "DataItem",
            "CollectionItem",
            "ProgrammableConfigItem",
        ],
    )
}

/// Arguments of `Verify`.
#[must_use]
pub fn verification_args() -> Schema {
    Schema::scalar_enum("VerificationArgs", ["CreatorV1", "CollectionV1"])
}

/// Arguments of `Revoke`.
#[must_use]
pub fn revoke_args() -> Schema {
    Schema::scalar_enum(
        "RevokeArgs",
        [
            "CollectionV1",
            "SaleV1",
            "TransferV1",
            "DataV1",
            "UtilityV1",
            "StakingV1",
            "StandardV1",
            "LockedTransferV1",
            "ProgrammableConfigV1",
            "MigrationV1",
            "AuthorityItemV1",
            "DataItemV1",
            "CollectionItemV1",
            "ProgrammableConfigItemV1",
        ],
    )
}

/// Creates the metadata account of a mint.
#[must_use]
pub fn create_metadata_account_v3() -> InstructionDescriptor {
    InstructionDescriptor::new(
        "CreateMetadataAccountV3",
        Discriminator::Byte(discriminators::CREATE_METADATA_ACCOUNT_V3),
        PROGRAM_ID,
    )
    .args(StructSchema::new(
        "CreateMetadataAccountV3InstructionArgs",
        [(
            "create_metadata_account_args_v3",
            create_metadata_account_args_v3(),
        )],
    ))
    .accounts(vec![
        AccountSlot::writable("metadata"),
        AccountSlot::readonly("mint"),
        AccountSlot::readonly_signer("mint_authority"),
        AccountSlot::writable_signer("payer"),
        AccountSlot::readonly("update_authority"),
        AccountSlot::defaulted("system_program", SYSTEM_PROGRAM_ID),
        AccountSlot::readonly("rent").omit_when_absent(),
    ])
}

/// Removes an item from a collection it was verified into.
#[must_use]
pub fn unverify_collection() -> InstructionDescriptor {
    InstructionDescriptor::new(
        "UnverifyCollection",
        Discriminator::Byte(discriminators::UNVERIFY_COLLECTION),
        PROGRAM_ID,
    )
    .accounts(vec![
        AccountSlot::writable("metadata"),
        AccountSlot::writable_signer("collection_authority"),
        AccountSlot::readonly("collection_mint"),
        AccountSlot::readonly("collection"),
        AccountSlot::readonly("collection_master_edition_account"),
        AccountSlot::readonly("collection_authority_record").omit_when_absent(),
    ])
}

/// Verifies an item of a sized collection.
#[must_use]
pub fn verify_sized_collection_item() -> InstructionDescriptor {
    InstructionDescriptor::new(
        "VerifySizedCollectionItem",
        Discriminator::Byte(discriminators::VERIFY_SIZED_COLLECTION_ITEM),
        PROGRAM_ID,
    )
    .accounts(vec![
        AccountSlot::writable("metadata"),
        AccountSlot::readonly_signer("collection_authority"),
        AccountSlot::writable_signer("payer"),
        AccountSlot::readonly("collection_mint"),
        AccountSlot::writable("collection"),
        AccountSlot::readonly("collection_master_edition_account"),
        AccountSlot::readonly("collection_authority_record").omit_when_absent(),
    ])
}

/// Sets the size of a collection created before sized collections existed.
#[must_use]
pub fn set_collection_size() -> InstructionDescriptor {
    InstructionDescriptor::new(
        "SetCollectionSize",
        Discriminator::Byte(discriminators::SET_COLLECTION_SIZE),
        PROGRAM_ID,
    )
    .args(StructSchema::new(
        "SetCollectionSizeInstructionArgs",
        [("set_collection_size_args", set_collection_size_args())],
    ))
    .accounts(vec![
        AccountSlot::writable("collection_metadata"),
        AccountSlot::readonly_signer("collection_authority"),
        AccountSlot::readonly("collection_mint"),
        AccountSlot::readonly("collection_authority_record").omit_when_absent(),
    ])
}

/// Revokes a delegate.
#[must_use]
pub fn revoke() -> InstructionDescriptor {
    InstructionDescriptor::new("Revoke", Discriminator::Byte(discriminators::REVOKE), PROGRAM_ID)
        .args(StructSchema::new(
            "RevokeInstructionArgs",
            [("revoke_args", revoke_args())],
        ))
        .accounts(vec![
            AccountSlot::writable("delegate_record"),
            AccountSlot::readonly("delegate"),
            AccountSlot::writable("metadata"),
            AccountSlot::readonly("master_edition").optional(),
            AccountSlot::readonly("mint"),
            AccountSlot::writable("token").optional(),
            AccountSlot::readonly_signer("approver"),
            AccountSlot::writable_signer("payer"),
            AccountSlot::defaulted("system_program", SYSTEM_PROGRAM_ID),
            AccountSlot::defaulted("sysvar_instructions", INSTRUCTIONS_SYSVAR_ID),
            AccountSlot::readonly("spl_token_program").optional(),
            AccountSlot::readonly("authorization_rules_program").optional(),
            AccountSlot::readonly("authorization_rules").optional(),
        ])
}

/// Verifies a creator or a collection.
#[must_use]
pub fn verify() -> InstructionDescriptor {
    InstructionDescriptor::new("Verify", Discriminator::Byte(discriminators::VERIFY), PROGRAM_ID)
        .args(StructSchema::new(
            "VerifyInstructionArgs",
            [("verify_args", verification_args())],
        ))
        .accounts(vec![
            AccountSlot::readonly_signer("authority"),
            AccountSlot::readonly("delegate_record").optional(),
            AccountSlot::writable("metadata"),
            AccountSlot::readonly("collection_mint").optional(),
            AccountSlot::writable("collection_metadata").optional(),
            AccountSlot::readonly("collection_master_edition").optional(),
            AccountSlot::defaulted("system_program", SYSTEM_PROGRAM_ID),
            AccountSlot::defaulted("sysvar_instructions", INSTRUCTIONS_SYSVAR_ID),
        ])
}

/// Program definition for the registry.
#[must_use]
pub fn definition() -> ProgramDefinition {
    ProgramDefinition::new(NAME, PROGRAM_ID)
        .with_types([
            key(),
            creator(),
            collection(),
            use_method(),
            uses(),
            token_standard(),
            collection_details(),
            data_v2(),
            create_metadata_account_args_v3(),
            set_collection_size_args(),
            token_delegate_role(),
            metadata_delegate_role(),
            verification_args(),
            revoke_args(),
        ])
        .with_instructions([
            create_metadata_account_v3(),
            unverify_collection(),
            verify_sized_collection_item(),
            set_collection_size(),
            revoke(),
            verify(),
        ])
}

/// Borsh mirrors of the argument types.
pub mod args {
    use super::{BorshDeserialize, BorshSerialize};

    /// Creator.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct Creator {
        /// Creator address.
        pub address: [u8; 32],
        /// Whether the creator signed.
        pub verified: bool,
        /// Royalty share in percent.
        pub share: u8,
    }

    /// Collection.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct Collection {
        /// Whether membership is verified.
        pub verified: bool,
        /// Collection mint.
        pub key: [u8; 32],
    }

    /// Use method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub enum UseMethod {
        /// Burn on use.
        Burn,
        /// Multiple uses.
        Multiple,
        /// Single use.
        Single,
    }

    /// Use limits.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct Uses {
        /// Consumption method.
        pub use_method: UseMethod,
        /// Uses left.
        pub remaining: u64,
        /// Total uses.
        pub total: u64,
    }

    /// Mutable metadata fields.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct DataV2 {
        /// Asset name.
        pub name: String,
        /// Asset symbol.
        pub symbol: String,
        /// Off-chain JSON uri.
        pub uri: String,
        /// Royalty in basis points.
        pub seller_fee_basis_points: u16,
        /// Creators.
        pub creators: Option<Vec<Creator>>,
        /// Collection.
        pub collection: Option<Collection>,
        /// Use limits.
        pub uses: Option<Uses>,
    }

    /// Sized collection details.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub enum CollectionDetails {
        /// Collection size.
        V1 {
            /// Number of verified items.
            size: u64,
        },
        /// Reserved layout.
        V2 {
            /// Unused bytes.
            padding: [u8; 8],
        },
    }

    /// Arguments of `CreateMetadataAccountV3`.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct CreateMetadataAccountArgsV3 {
        /// Metadata.
        pub data: DataV2,
        /// Whether the metadata can change later.
        pub is_mutable: bool,
        /// Set for collection parents.
        pub collection_details: Option<CollectionDetails>,
    }

    /// Arguments of `SetCollectionSize`.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct SetCollectionSizeArgs {
        /// New size.
        pub size: u64,
    }

    /// Arguments of `Verify`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub enum VerificationArgs {
        /// Verify a creator.
        CreatorV1,
        /// Verify collection membership.
        CollectionV1,
    }
}
