//! Fixed Price Sale program.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use crate::accounts::AccountLayout;
use crate::codec::{Schema, StructSchema};
use crate::discriminator::Discriminator;
use crate::instructions::{
    AccountSlot, InstructionDescriptor, RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use crate::registry::ProgramDefinition;

/// Fixed Price Sale program id.
pub const PROGRAM_ID: Pubkey = solana_sdk::pubkey!("SaLeTjyUa5wXHnGuewUSyJ5JWZaHwz3TxqUntCE9czo");

/// Registry name.
pub const NAME: &str = "fixed_price_sale";

/// `init_selling_resource` discriminator.
pub const INIT_SELLING_RESOURCE: [u8; 8] = [56, 15, 222, 211, 147, 205, 4, 145];
/// `SellingResource` account discriminator.
pub const SELLING_RESOURCE_ACCOUNT: [u8; 8] = [15, 32, 69, 235, 249, 39, 18, 167];

/// Lifecycle of a selling resource.
#[must_use]
pub fn selling_resource_state() -> Schema {
    Schema::scalar_enum(
        "SellingResourceState",
        ["Uninitialized", "Created", "InUse", "Exhausted", "Stopped"],
    )
}

/// `SellingResource` account.
#[must_use]
pub fn selling_resource() -> AccountLayout {
    AccountLayout::anchor(StructSchema::new(
        "SellingResource",
        [
            ("store", Schema::PublicKey),
            ("owner", Schema::PublicKey),
            ("resource", Schema::PublicKey),
            ("vault", Schema::PublicKey),
            ("vault_owner", Schema::PublicKey),
            ("supply", Schema::U64),
            ("max_supply", Schema::option(Schema::U64)),
            ("state", selling_resource_state()),
        ],
    ))
}

/// Creator record. Untagged, with `verified` stored as a raw byte.
#[must_use]
pub fn creator() -> AccountLayout {
    AccountLayout::untagged(StructSchema::new(
        "Creator",
        [
            ("address", Schema::PublicKey),
            ("verified", Schema::U8),
            ("share", Schema::U8),
        ],
    ))
}

/// Puts a master edition up for sale.
#[must_use]
pub fn init_selling_resource() -> InstructionDescriptor {
    InstructionDescriptor::new(
        "initSellingResource",
        Discriminator::Anchor(INIT_SELLING_RESOURCE),
        PROGRAM_ID,
    )
    .args(StructSchema::new(
        "InitSellingResourceInstructionArgs",
        [
            ("master_edition_bump", Schema::U8),
            ("vault_owner_bump", Schema::U8),
            ("max_supply", Schema::option(Schema::U64)),
        ],
    ))
    .accounts(vec![
        AccountSlot::readonly("store"),
        AccountSlot::writable_signer("admin"),
        AccountSlot::writable_signer("selling_resource"),
        AccountSlot::readonly("selling_resource_owner"),
        AccountSlot::readonly("resource_mint"),
        AccountSlot::readonly("master_edition"),
        AccountSlot::readonly("metadata"),
        AccountSlot::writable("vault"),
        AccountSlot::readonly("owner"),
        AccountSlot::writable("resource_token"),
        AccountSlot::defaulted("rent", RENT_SYSVAR_ID),
        AccountSlot::defaulted("token_program", TOKEN_PROGRAM_ID),
        AccountSlot::defaulted("system_program", SYSTEM_PROGRAM_ID),
    ])
    .with_remaining_accounts()
}

/// Program definition for the registry.
#[must_use]
pub fn definition() -> ProgramDefinition {
    let creator = creator();
    ProgramDefinition::new(NAME, PROGRAM_ID)
        .with_types([
            selling_resource_state(),
            Schema::Struct(creator.schema.clone()),
        ])
        .with_instructions([init_selling_resource()])
        .with_accounts([selling_resource(), creator])
}

/// Borsh mirrors of the argument types.
pub mod args {
    use super::{BorshDeserialize, BorshSerialize};

    /// Arguments of `initSellingResource`.
    #[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
    pub struct InitSellingResourceArgs {
        /// Master edition PDA bump.
        pub master_edition_bump: u8,
        /// Vault owner PDA bump.
        pub vault_owner_bump: u8,
        /// Cap on printed editions.
        pub max_supply: Option<u64>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Value;
    use crate::discriminator::{anchor_account, anchor_instruction};
    use crate::instructions::InstructionBuilder;
    use crate::SdkError;

    #[test]
    fn test_discriminators_match_derivation() {
        assert_eq!(
            anchor_instruction("initSellingResource"),
            Discriminator::Anchor(INIT_SELLING_RESOURCE)
        );
        assert_eq!(anchor_account("SellingResource"), SELLING_RESOURCE_ACCOUNT);
    }

    #[test]
    fn test_init_selling_resource_max_supply() {
        let descriptor = init_selling_resource();
        let mut builder = InstructionBuilder::new(&descriptor);
        for slot in descriptor.accounts.iter().filter(|s| !s.is_optional()) {
            builder = builder.account(&slot.name, Pubkey::new_unique());
        }

        let capped = builder
            .clone()
            .borsh_args(&args::InitSellingResourceArgs {
                master_edition_bump: 255,
                vault_owner_bump: 254,
                max_supply: Some(10),
            })
            .build()
            .expect("should build instruction");
        assert_eq!(&capped.data[8..], &[255, 254, 1, 10, 0, 0, 0, 0, 0, 0, 0]);

        let unlimited = builder
            .args(Value::structure([
                ("master_edition_bump", Value::U8(255)),
                ("vault_owner_bump", Value::U8(254)),
                ("max_supply", Value::none()),
            ]))
            .build()
            .expect("should build instruction");
        assert_eq!(&unlimited.data[8..], &[255, 254, 0]);
        assert_eq!(unlimited.accounts.len(), 13);
    }

    #[test]
    fn test_creator_account_byte_size() {
        let layout = creator();
        assert!(layout.has_correct_byte_size(&[0; 34]));
        let mut data = vec![9; 32];
        data.extend_from_slice(&[2, 50]);
        let decoded = layout.decode(&data).expect("should decode");
        assert_eq!(decoded.value.field("verified"), Some(&Value::U8(2)));
    }

    #[test]
    fn test_selling_resource_decode() {
        let mut data = SELLING_RESOURCE_ACCOUNT.to_vec();
        for i in 0..5u8 {
            data.extend_from_slice(&[i; 32]);
        }
        data.extend_from_slice(&3u64.to_le_bytes());
        data.extend_from_slice(&[1, 100, 0, 0, 0, 0, 0, 0, 0]);
        data.push(2);

        let decoded = selling_resource().decode(&data).expect("should decode");
        assert_eq!(decoded.consumed, data.len());
        assert_eq!(
            decoded.value.field("max_supply"),
            Some(&Value::some(Value::U64(100)))
        );
        assert_eq!(decoded.value.field("state"), Some(&Value::unit_variant("InUse")));

        let last = data.len() - 1;
        data[last] = 9;
        let err = selling_resource().decode(&data).expect_err("should reject");
        assert!(matches!(err, SdkError::UnknownVariant { discriminant: 9, .. }));
    }
}
