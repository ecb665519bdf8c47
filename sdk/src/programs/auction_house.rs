//! Auction House program.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::codec::{Schema, StructSchema};
use crate::discriminator::Discriminator;
use crate::instructions::{
    AccountSlot, InstructionDescriptor, ASSOCIATED_TOKEN_PROGRAM_ID, RENT_SYSVAR_ID,
    SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use crate::registry::ProgramDefinition;

/// Auction House program id.
pub const PROGRAM_ID: Pubkey = solana_sdk::pubkey!("hausS13jsjafwWwGqZTUQRmWyvyxn9EQpqMwV1PBBmk");

/// Registry name.
pub const NAME: &str = "auction_house";

/// `withdraw` discriminator.
pub const WITHDRAW: [u8; 8] = [183, 18, 70, 156, 148, 109, 161, 34];
/// `delegate_auctioneer` discriminator.
pub const DELEGATE_AUCTIONEER: [u8; 8] = [106, 178, 12, 122, 74, 173, 251, 222];

/// Actions an auctioneer may perform on behalf of the house.
#[must_use]
pub fn authority_scope() -> Schema {
    Schema::scalar_enum(
        "AuthorityScope",
        [
            "Deposit",
            "Buy",
            "PublicBuy",
            "ExecuteSale",
            "Sell",
            "Cancel",
            "Withdraw",
        ],
    )
}

/// Withdraws from a buyer escrow.
#[must_use]
pub fn withdraw() -> InstructionDescriptor {
    InstructionDescriptor::new("withdraw", Discriminator::Anchor(WITHDRAW), PROGRAM_ID)
        .args(StructSchema::new(
            "WithdrawInstructionArgs",
            [("escrow_payment_bump", Schema::U8), ("amount", Schema::U64)],
        ))
        .accounts(vec![
            AccountSlot::readonly("wallet"),
            AccountSlot::writable("receipt_account"),
            AccountSlot::writable("escrow_payment_account"),
            AccountSlot::readonly("treasury_mint"),
            AccountSlot::readonly("authority"),
            AccountSlot::readonly("auction_house"),
            AccountSlot::writable("auction_house_fee_account"),
            AccountSlot::defaulted("token_program", TOKEN_PROGRAM_ID),
            AccountSlot::defaulted("system_program", SYSTEM_PROGRAM_ID),
            AccountSlot::defaulted("ata_program", ASSOCIATED_TOKEN_PROGRAM_ID),
            AccountSlot::defaulted("rent", RENT_SYSVAR_ID),
        ])
        .with_remaining_accounts()
}

/// Grants an auctioneer a set of scopes.
#[must_use]
pub fn delegate_auctioneer() -> InstructionDescriptor {
    InstructionDescriptor::new(
        "delegateAuctioneer",
        Discriminator::Anchor(DELEGATE_AUCTIONEER),
        PROGRAM_ID,
    )
    .args(StructSchema::new(
        "DelegateAuctioneerInstructionArgs",
        [("scopes", Schema::vec(authority_scope()))],
    ))
    .accounts(vec![
        AccountSlot::writable("auction_house"),
        AccountSlot::writable_signer("authority"),
        AccountSlot::readonly("auctioneer_authority"),
        AccountSlot::writable("ah_auctioneer_pda"),
        AccountSlot::defaulted("system_program", SYSTEM_PROGRAM_ID),
    ])
    .with_remaining_accounts()
}

/// Program definition for the registry.
#[must_use]
pub fn definition() -> ProgramDefinition {
    ProgramDefinition::new(NAME, PROGRAM_ID)
        .with_types([authority_scope()])
        .with_instructions([withdraw(), delegate_auctioneer()])
}

/// Borsh mirrors of the argument types.
pub mod args {
    use super::{BorshDeserialize, BorshSerialize};

    /// Auctioneer scope.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub enum AuthorityScope {
        /// Deposit into escrow.
        Deposit,
        /// Place bids.
        Buy,
        /// Place public bids.
        PublicBuy,
        /// Execute sales.
        ExecuteSale,
        /// List items.
        Sell,
        /// Cancel orders.
        Cancel,
        /// Withdraw from escrow.
        Withdraw,
    }

    /// Arguments of `withdraw`.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct WithdrawArgs {
        /// Escrow PDA bump.
        pub escrow_payment_bump: u8,
        /// Lamports or tokens to withdraw.
        pub amount: u64,
    }

    /// Arguments of `delegateAuctioneer`.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct DelegateAuctioneerArgs {
        /// Granted scopes.
        pub scopes: Vec<AuthorityScope>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Value;
    use crate::discriminator::anchor_instruction;
    use crate::instructions::InstructionBuilder;
    use solana_sdk::instruction::AccountMeta;

    #[test]
    fn test_discriminators_match_derivation() {
        assert_eq!(anchor_instruction("withdraw").as_bytes(), &WITHDRAW);
        assert_eq!(
            anchor_instruction("delegateAuctioneer").as_bytes(),
            &DELEGATE_AUCTIONEER
        );
    }

    #[test]
    fn test_withdraw_defaults_well_known_programs() {
        let descriptor = withdraw();
        let ix = InstructionBuilder::new(&descriptor)
            .account("wallet", Pubkey::new_unique())
            .account("receipt_account", Pubkey::new_unique())
            .account("escrow_payment_account", Pubkey::new_unique())
            .account("treasury_mint", Pubkey::new_unique())
            .account("authority", Pubkey::new_unique())
            .account("auction_house", Pubkey::new_unique())
            .account("auction_house_fee_account", Pubkey::new_unique())
            .borsh_args(&args::WithdrawArgs {
                escrow_payment_bump: 253,
                amount: 1_500_000_000,
            })
            .build()
            .expect("should build instruction");

        assert_eq!(ix.accounts.len(), 11);
        assert_eq!(
            ix.accounts[7..],
            [
                AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
                AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false),
                AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
            ]
        );
        assert_eq!(ix.data.len(), 8 + 1 + 8);
        assert_eq!(ix.data[8], 253);
    }

    #[test]
    fn test_delegate_auctioneer_scopes() {
        let descriptor = delegate_auctioneer();
        let value = Value::structure([(
            "scopes",
            Value::Array(vec![
                Value::unit_variant("Buy"),
                Value::unit_variant("Sell"),
                Value::unit_variant("Withdraw"),
            ]),
        )]);
        let ix = InstructionBuilder::new(&descriptor)
            .account("auction_house", Pubkey::new_unique())
            .account("authority", Pubkey::new_unique())
            .account("auctioneer_authority", Pubkey::new_unique())
            .account("ah_auctioneer_pda", Pubkey::new_unique())
            .args(value)
            .build()
            .expect("should build instruction");

        assert_eq!(&ix.data[8..], &[3, 0, 0, 0, 1, 4, 6]);
        let typed = args::DelegateAuctioneerArgs {
            scopes: vec![
                args::AuthorityScope::Buy,
                args::AuthorityScope::Sell,
                args::AuthorityScope::Withdraw,
            ],
        };
        assert_eq!(&ix.data[8..], &borsh::to_vec(&typed).expect("should serialize")[..]);
    }

    #[test]
    fn test_delegate_auctioneer_unknown_scope() {
        let descriptor = delegate_auctioneer();
        let err = InstructionBuilder::new(&descriptor)
            .account("auction_house", Pubkey::new_unique())
            .account("authority", Pubkey::new_unique())
            .account("auctioneer_authority", Pubkey::new_unique())
            .account("ah_auctioneer_pda", Pubkey::new_unique())
            .args(Value::structure([(
                "scopes",
                Value::Array(vec![Value::unit_variant("Steal")]),
            )]))
            .build()
            .expect_err("should fail");
        assert!(matches!(err, crate::SdkError::SchemaMismatch { ref path, .. } if path == "scopes[0]"));
    }
}
