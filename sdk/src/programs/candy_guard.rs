//! Candy Guard program.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::accounts::AccountLayout;
use crate::codec::{Schema, StructSchema};
use crate::discriminator::Discriminator;
use crate::instructions::{AccountSlot, InstructionDescriptor};
use crate::registry::ProgramDefinition;

/// Candy Guard program id.
pub const PROGRAM_ID: Pubkey = solana_sdk::pubkey!("Guard1JwRhJkVH6XZhzoYxeBVQe872VH6QggF4BWmS9g");

/// Registry name.
pub const NAME: &str = "candy_guard";

/// `wrap` discriminator.
pub const WRAP: [u8; 8] = [178, 40, 10, 189, 228, 129, 186, 140];
/// `CandyGuard` account discriminator.
pub const CANDY_GUARD_ACCOUNT: [u8; 8] = [44, 207, 199, 184, 112, 103, 34, 181];

/// Charges a penalty instead of failing the transaction.
#[must_use]
pub fn bot_tax() -> Schema {
    Schema::structure(
        "BotTax",
        [("lamports", Schema::U64), ("last_instruction", Schema::Bool)],
    )
}

/// Lamports charged per mint.
#[must_use]
pub fn sol_payment() -> Schema {
    Schema::structure(
        "SolPayment",
        [("lamports", Schema::U64), ("destination", Schema::PublicKey)],
    )
}

/// Mint opens at a unix timestamp.
#[must_use]
pub fn start_date() -> Schema {
    Schema::structure("StartDate", [("date", Schema::I64)])
}

/// Mint closes at a unix timestamp.
#[must_use]
pub fn end_date() -> Schema {
    Schema::structure("EndDate", [("date", Schema::I64)])
}

/// Mints allowed per wallet.
#[must_use]
pub fn mint_limit() -> Schema {
    Schema::structure("MintLimit", [("id", Schema::U8), ("limit", Schema::U16)])
}

/// Guard identifiers, in feature-flag order.
#[must_use]
pub fn guard_type() -> Schema {
    Schema::scalar_enum(
        "GuardType",
        [
            "BotTax",
            "SolPayment",
            "TokenPayment",
            "StartDate",
            "ThirdPartySigner",
            "TokenGate",
            "Gatekeeper",
            "EndDate",
            "AllowList",
            "MintLimit",
            "NftPayment",
            "RedeemedAmount",
            "AddressGate",
            "NftGate",
            "NftBurn",
            "TokenBurn",
            "FreezeSolPayment",
            "FreezeTokenPayment",
            "ProgramGate",
            "Allocation",
            "Token2022Payment",
        ],
    )
}

/// `CandyGuard` account header. Serialized guard sets follow it.
#[must_use]
pub fn candy_guard() -> AccountLayout {
    AccountLayout::anchor(StructSchema::new(
        "CandyGuard",
        [
            ("base", Schema::PublicKey),
            ("bump", Schema::U8),
            ("authority", Schema::PublicKey),
        ],
    ))
}

/// Puts a candy machine behind the guard.
#[must_use]
pub fn wrap() -> InstructionDescriptor {
    InstructionDescriptor::new("wrap", Discriminator::Anchor(WRAP), PROGRAM_ID).accounts(vec![
        AccountSlot::readonly("candy_guard"),
        AccountSlot::readonly_signer("authority"),
        AccountSlot::writable("candy_machine"),
        AccountSlot::readonly("candy_machine_program"),
        AccountSlot::readonly_signer("candy_machine_authority"),
    ])
}

/// Program definition for the registry.
#[must_use]
pub fn definition() -> ProgramDefinition {
    ProgramDefinition::new(NAME, PROGRAM_ID)
        .with_types([
            bot_tax(),
            sol_payment(),
            start_date(),
            end_date(),
            mint_limit(),
            guard_type(),
        ])
        .with_instructions([wrap()])
        .with_accounts([candy_guard()])
}

/// Borsh mirrors of the guard types.
pub mod args {
    use super::{BorshDeserialize, BorshSerialize};

    /// Bot tax guard.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct BotTax {
        /// Penalty in lamports.
        pub lamports: u64,
        /// Require the mint to be the last instruction.
        pub last_instruction: bool,
    }

    /// Sol payment guard.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct SolPayment {
        /// Price in lamports.
        pub lamports: u64,
        /// Receiving wallet.
        pub destination: [u8; 32],
    }

    /// Mint limit guard.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct MintLimit {
        /// Counter id.
        pub id: u8,
        /// Mints per wallet.
        pub limit: u16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{self, Value};
    use crate::discriminator::{anchor_account, anchor_instruction};
    use crate::instructions::InstructionBuilder;
    use crate::programs::candy_machine_core;
    use crate::SdkError;

    #[test]
    fn test_bot_tax_encoding() {
        let value = Value::structure([
            ("lamports", Value::U64(1_000_000)),
            ("last_instruction", Value::Bool(true)),
        ]);
        let bytes = codec::encode(&bot_tax(), &value).expect("should encode");
        assert_eq!(bytes.len(), 9);
        assert_eq!(&bytes[..8], &1_000_000u64.to_le_bytes());
        assert_eq!(bytes[8], 0x01);

        let typed = args::BotTax {
            lamports: 1_000_000,
            last_instruction: true,
        };
        assert_eq!(borsh::to_vec(&typed).expect("should serialize"), bytes);
    }

    #[test]
    fn test_bot_tax_rejects_non_canonical_bool() {
        let mut bytes = 5u64.to_le_bytes().to_vec();
        bytes.push(2);
        let err = codec::decode(&bot_tax(), &bytes, 0).expect_err("should reject");
        assert_eq!(
            err,
            SdkError::InvalidBool {
                path: "last_instruction".to_string(),
                offset: 8,
                byte: 2,
            }
        );
    }

    #[test]
    fn test_guard_fixed_sizes() {
        assert_eq!(sol_payment().byte_size(), Some(40));
        assert_eq!(mint_limit().byte_size(), Some(3));
        assert_eq!(start_date().byte_size(), Some(8));
        assert_eq!(guard_type().byte_size(), Some(1));
    }

    #[test]
    fn test_wrap() {
        assert_eq!(anchor_instruction("wrap"), Discriminator::Anchor(WRAP));
        assert_eq!(anchor_account("CandyGuard"), CANDY_GUARD_ACCOUNT);

        let descriptor = wrap();
        let ix = InstructionBuilder::new(&descriptor)
            .account("candy_guard", Pubkey::new_unique())
            .account("authority", Pubkey::new_unique())
            .account("candy_machine", Pubkey::new_unique())
            .account("candy_machine_program", candy_machine_core::PROGRAM_ID)
            .account("candy_machine_authority", Pubkey::new_unique())
            .build()
            .expect("should build instruction");
        assert_eq!(ix.data, WRAP.to_vec());
        assert_eq!(ix.accounts.len(), 5);
        assert!(ix.accounts[2].is_writable);
        assert!(ix.accounts[4].is_signer);
    }

    #[test]
    fn test_candy_guard_header_with_guard_data() {
        let mut data = CANDY_GUARD_ACCOUNT.to_vec();
        data.extend_from_slice(&[5; 32]);
        data.push(254);
        data.extend_from_slice(&[6; 32]);
        // guard set features follow the header
        data.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0]);

        let layout = candy_guard();
        let decoded = layout.decode(&data).expect("should decode");
        assert_eq!(decoded.consumed, 8 + 65);
        assert_eq!(decoded.value.field("bump"), Some(&Value::U8(254)));
    }
}
