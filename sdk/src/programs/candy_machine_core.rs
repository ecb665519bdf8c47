//! Candy Machine Core program.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::accounts::AccountLayout;
use crate::codec::{Schema, StructSchema};
use crate::discriminator::Discriminator;
use crate::instructions::{AccountSlot, InstructionDescriptor, INSTRUCTIONS_SYSVAR_ID, SYSTEM_PROGRAM_ID};
use crate::registry::ProgramDefinition;

/// Candy Machine Core program id.
pub const PROGRAM_ID: Pubkey = solana_sdk::pubkey!("CndyV3LdqHUfDLmE5naZjVN8rBZz4tqhdefbAnjHG3JR");

/// Registry name.
pub const NAME: &str = "candy_machine_core";

/// `initialize_v2` discriminator.
pub const INITIALIZE_V2: [u8; 8] = [67, 153, 175, 39, 218, 16, 38, 32];
/// `add_config_lines` discriminator.
pub const ADD_CONFIG_LINES: [u8; 8] = [223, 50, 224, 227, 151, 8, 115, 106];
/// `set_collection` discriminator.
pub const SET_COLLECTION: [u8; 8] = [192, 254, 206, 76, 168, 182, 59, 223];
/// `CandyMachine` account discriminator.
pub const CANDY_MACHINE_ACCOUNT: [u8; 8] = [51, 173, 177, 113, 25, 241, 109, 189];

/// Creator with a percentage share.
#[must_use]
pub fn creator() -> Schema {
    Schema::structure(
        "Creator",
        [
            ("address", Schema::PublicKey),
            ("verified", Schema::Bool),
            ("percentage_share", Schema::U8),
        ],
    )
}

/// Name and uri of one item.
#[must_use]
pub fn config_line() -> Schema {
    Schema::structure(
        "ConfigLine",
        [("name", Schema::String), ("uri", Schema::String)],
    )
}

/// Shared prefixes for config lines.
#[must_use]
pub fn config_line_settings() -> Schema {
    Schema::structure(
        "ConfigLineSettings",
        [
            ("prefix_name", Schema::String),
            ("name_length", Schema::U32),
            ("prefix_uri", Schema::String),
            ("uri_length", Schema::U32),
            ("is_sequential", Schema::Bool),
        ],
    )
}

/// Placeholder metadata for hidden mints.
#[must_use]
pub fn hidden_settings() -> Schema {
    Schema::structure(
        "HiddenSettings",
        [
            ("name", Schema::String),
            ("uri", Schema::String),
            ("hash", Schema::array(Schema::U8, 32)),
        ],
    )
}

/// Candy machine configuration.
#[must_use]
pub fn candy_machine_data() -> Schema {
    Schema::structure(
        "CandyMachineData",
        [
            ("items_available", Schema::U64),
            ("symbol", Schema::String),
            ("seller_fee_basis_points", Schema::U16),
            ("max_supply", Schema::U64),
            ("is_mutable", Schema::Bool),
            ("creators", Schema::vec(creator())),
            ("config_line_settings", Schema::option(config_line_settings())),
            ("hidden_settings", Schema::option(hidden_settings())),
        ],
    )
}

/// Account layout version.
#[must_use]
pub fn account_version() -> Schema {
    Schema::scalar_enum("AccountVersion", ["V1", "V2"])
}

/// `CandyMachine` account.
#[must_use]
pub fn candy_machine() -> AccountLayout {
    AccountLayout::anchor(StructSchema::new(
        "CandyMachine",
        [
            ("version", account_version()),
            ("token_standard", Schema::U8),
            ("features", Schema::array(Schema::U8, 6)),
            ("authority", Schema::PublicKey),
            ("mint_authority", Schema::PublicKey),
            ("collection_mint", Schema::PublicKey),
            ("items_redeemed", Schema::U64),
            ("data", candy_machine_data()),
        ],
    ))
}

/// Creates a candy machine.
#[must_use]
pub fn initialize_v2() -> InstructionDescriptor {
    InstructionDescriptor::new("initializeV2", Discriminator::Anchor(INITIALIZE_V2), PROGRAM_ID)
        .args(StructSchema::new(
            "InitializeV2InstructionArgs",
            [("data", candy_machine_data()), ("token_standard", Schema::U8)],
        ))
        .accounts(vec![
            AccountSlot::writable("candy_machine"),
            AccountSlot::writable("authority_pda"),
            AccountSlot::readonly("authority"),
            AccountSlot::readonly_signer("payer"),
            AccountSlot::readonly("rule_set").optional(),
            AccountSlot::writable("collection_metadata"),
            AccountSlot::readonly("collection_mint"),
            AccountSlot::readonly("collection_master_edition"),
            AccountSlot::writable_signer("collection_update_authority"),
            AccountSlot::writable("collection_delegate_record"),
            AccountSlot::readonly("token_metadata_program"),
            AccountSlot::defaulted("system_program", SYSTEM_PROGRAM_ID),
            AccountSlot::defaulted("sysvar_instructions", INSTRUCTIONS_SYSVAR_ID),
            AccountSlot::readonly("authorization_rules_program").optional(),
            AccountSlot::readonly("authorization_rules").optional(),
        ])
        .with_remaining_accounts()
}

/// Appends config lines starting at `index`.
#[must_use]
pub fn add_config_lines() -> InstructionDescriptor {
    InstructionDescriptor::new(
        "addConfigLines",
        Discriminator::Anchor(ADD_CONFIG_LINES),
        PROGRAM_ID,
    )
    .args(StructSchema::new(
        "AddConfigLinesInstructionArgs",
        [
            ("index", Schema::U32),
            ("config_lines", Schema::vec(config_line())),
        ],
    ))
    .accounts(vec![
        AccountSlot::writable("candy_machine"),
        AccountSlot::readonly_signer("authority"),
    ])
    .with_remaining_accounts()
}

/// Moves the candy machine to another collection.
#[must_use]
pub fn set_collection() -> InstructionDescriptor {
    InstructionDescriptor::new("setCollection", Discriminator::Anchor(SET_COLLECTION), PROGRAM_ID)
        .accounts(vec![
            AccountSlot::writable("candy_machine"),
            AccountSlot::readonly_signer("authority"),
            AccountSlot::writable("authority_pda"),
            AccountSlot::readonly_signer("payer"),
            AccountSlot::readonly("collection_mint"),
            AccountSlot::readonly("collection_metadata"),
            AccountSlot::writable("collection_authority_record"),
            AccountSlot::writable_signer("new_collection_update_authority"),
            AccountSlot::readonly("new_collection_metadata"),
            AccountSlot::readonly("new_collection_mint"),
            AccountSlot::readonly("new_collection_master_edition"),
            AccountSlot::writable("new_collection_authority_record"),
            AccountSlot::readonly("token_metadata_program"),
            AccountSlot::defaulted("system_program", SYSTEM_PROGRAM_ID),
        ])
        .with_remaining_accounts()
}

/// Program definition for the registry.
#[must_use]
pub fn definition() -> ProgramDefinition {
    ProgramDefinition::new(NAME, PROGRAM_ID)
        .with_types([
            creator(),
            config_line(),
            config_line_settings(),
            hidden_settings(),
            candy_machine_data(),
            account_version(),
        ])
        .with_instructions([initialize_v2(), add_config_lines(), set_collection()])
        .with_accounts([candy_machine()])
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
        pub percentage_share: u8,
    }

    /// One config line.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct ConfigLine {
        /// Item name (without the shared prefix).
        pub name: String,
        /// Item uri (without the shared prefix).
        pub uri: String,
    }

    /// Config line settings.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct ConfigLineSettings {
        /// Shared name prefix.
        pub prefix_name: String,
        /// Per-item name length.
        pub name_length: u32,
        /// Shared uri prefix.
        pub prefix_uri: String,
        /// Per-item uri length.
        pub uri_length: u32,
        /// Mint in insertion order.
        pub is_sequential: bool,
    }

    /// Hidden settings.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct HiddenSettings {
        /// Placeholder name.
        pub name: String,
        /// Placeholder uri.
        pub uri: String,
        /// Hash of the reveal mapping.
        pub hash: [u8; 32],
    }

    /// Candy machine configuration.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct CandyMachineData {
        /// Number of mintable items.
        pub items_available: u64,
        /// Collection symbol.
        pub symbol: String,
        /// Royalty in basis points.
        pub seller_fee_basis_points: u16,
        /// Max supply of each item.
        pub max_supply: u64,
        /// Whether minted metadata is mutable.
        pub is_mutable: bool,
        /// Creators.
        pub creators: Vec<Creator>,
        /// Config line settings.
        pub config_line_settings: Option<ConfigLineSettings>,
        /// Hidden settings.
        pub hidden_settings: Option<HiddenSettings>,
    }

    /// Arguments of `initializeV2`.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct InitializeV2Args {
        /// Configuration.
        pub data: CandyMachineData,
        /// Token standard of the minted items.
        pub token_standard: u8,
    }

    /// Arguments of `addConfigLines`.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct AddConfigLinesArgs {
        /// Position of the first line.
        pub index: u32,
        /// Lines to write.
        pub config_lines: Vec<ConfigLine>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Value;
    use crate::discriminator::{anchor_account, anchor_instruction};
    use crate::instructions::InstructionBuilder;
    use solana_sdk::instruction::AccountMeta;

    fn sample_data() -> args::CandyMachineData {
        args::CandyMachineData {
            items_available: 500,
            symbol: "CORE".to_string(),
            seller_fee_basis_points: 500,
            max_supply: 0,
            is_mutable: true,
            creators: vec![args::Creator {
                address: [4; 32],
                verified: true,
                percentage_share: 100,
            }],
            config_line_settings: Some(args::ConfigLineSettings {
                prefix_name: "Item #".to_string(),
                name_length: 4,
                prefix_uri: "https://arweave.net/".to_string(),
                uri_length: 43,
                is_sequential: false,
            }),
            hidden_settings: None,
        }
    }

    #[test]
    fn test_discriminators_match_derivation() {
        assert_eq!(anchor_instruction("initializeV2").as_bytes(), &INITIALIZE_V2);
        assert_eq!(anchor_instruction("addConfigLines").as_bytes(), &ADD_CONFIG_LINES);
        assert_eq!(anchor_instruction("setCollection").as_bytes(), &SET_COLLECTION);
        assert_eq!(anchor_account("CandyMachine"), CANDY_MACHINE_ACCOUNT);
    }

    #[test]
    fn test_initialize_v2_build() {
        let typed = args::InitializeV2Args {
            data: sample_data(),
            token_standard: 4,
        };
        let descriptor = initialize_v2();
        let mut builder = InstructionBuilder::new(&descriptor);
        for name in [
            "candy_machine",
            "authority_pda",
            "authority",
            "payer",
            "collection_metadata",
            "collection_mint",
            "collection_master_edition",
            "collection_update_authority",
            "collection_delegate_record",
            "token_metadata_program",
        ] {
            builder = builder.account(name, Pubkey::new_unique());
        }
        let extra = AccountMeta::new_readonly(Pubkey::new_unique(), false);
        let ix = builder
            .account("sysvar_instructions", INSTRUCTIONS_SYSVAR_ID)
            .remaining_accounts([extra.clone()])
            .borsh_args(&typed)
            .build()
            .expect("should build instruction");

        assert_eq!(&ix.data[..8], &INITIALIZE_V2);
        assert_eq!(&ix.data[8..], &borsh::to_vec(&typed).expect("should serialize")[..]);
        assert_eq!(ix.accounts.len(), 16);
        assert_eq!(ix.accounts[4], AccountMeta::new_readonly(PROGRAM_ID, false));
        assert_eq!(ix.accounts[15], extra);
    }

    #[test]
    fn test_add_config_lines_value_matches_borsh() {
        let typed = args::AddConfigLinesArgs {
            index: 7,
            config_lines: vec![
                args::ConfigLine {
                    name: "0007".to_string(),
                    uri: "abc".to_string(),
                },
                args::ConfigLine {
                    name: "0008".to_string(),
                    uri: "def".to_string(),
                },
            ],
        };
        let value = Value::structure([
            ("index", Value::U32(7)),
            (
                "config_lines",
                Value::Array(vec![
                    Value::structure([("name", Value::from("0007")), ("uri", Value::from("abc"))]),
                    Value::structure([("name", Value::from("0008")), ("uri", Value::from("def"))]),
                ]),
            ),
        ]);
        let descriptor = add_config_lines();
        let candy_machine = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let from_value = InstructionBuilder::new(&descriptor)
            .account("candy_machine", candy_machine)
            .account("authority", authority)
            .args(value.clone())
            .build()
            .expect("should build instruction");
        let from_borsh = InstructionBuilder::new(&descriptor)
            .account("candy_machine", candy_machine)
            .account("authority", authority)
            .borsh_args(&typed)
            .build()
            .expect("should build instruction");
        assert_eq!(from_value, from_borsh);
        assert_eq!(descriptor.decode_data(&from_value.data).expect("should decode"), value);
    }

    #[test]
    fn test_candy_machine_account_decode() {
        #[derive(BorshSerialize)]
        struct CandyMachine {
            version: u8,
            token_standard: u8,
            features: [u8; 6],
            authority: [u8; 32],
            mint_authority: [u8; 32],
            collection_mint: [u8; 32],
            items_redeemed: u64,
            data: args::CandyMachineData,
        }

        let account = CandyMachine {
            version: 1,
            token_standard: 0,
            features: [0; 6],
            authority: [1; 32],
            mint_authority: [2; 32],
            collection_mint: [3; 32],
            items_redeemed: 42,
            data: sample_data(),
        };
        let mut data = CANDY_MACHINE_ACCOUNT.to_vec();
        data.extend(borsh::to_vec(&account).expect("should serialize"));
        let encoded_len = data.len();
        // config line storage follows the struct
        data.extend_from_slice(&[0; 64]);

        let decoded = candy_machine().decode(&data).expect("should decode");
        assert_eq!(decoded.consumed, encoded_len);
        assert_eq!(decoded.value.field("version"), Some(&Value::unit_variant("V2")));
        assert_eq!(decoded.value.field("items_redeemed"), Some(&Value::U64(42)));
        assert_eq!(
            decoded.value.field("features"),
            Some(&Value::Bytes(vec![0; 6]))
        );
    }
}
