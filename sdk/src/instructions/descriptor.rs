//! Static instruction descriptors.

use solana_sdk::pubkey::Pubkey;

use crate::codec::{self, StructSchema, Value};
use crate::discriminator::Discriminator;
use crate::error::SdkError;

/// System program id.
pub const SYSTEM_PROGRAM_ID: Pubkey = solana_sdk::pubkey!("11111111111111111111111111111111");

/// SPL Token program id.
pub const TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Associated Token Account program id.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Rent sysvar id.
pub const RENT_SYSVAR_ID: Pubkey =
    solana_sdk::pubkey!("SysvarRent111111111111111111111111111111111");

/// Instructions sysvar id.
pub const INSTRUCTIONS_SYSVAR_ID: Pubkey =
    solana_sdk::pubkey!("Sysvar1nstructions1111111111111111111111111");

/// What happens when the caller leaves an account slot empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Caller must supply the account.
    Required,
    /// Omitted slots carry the program id in use, read-only and not signing.
    ProgramIdSentinel,
    /// Omitted slots carry a well-known id with the declared flags.
    Default(Pubkey),
    /// Omitted slots are left out of the list (legacy trailing optional account).
    OmitWhenAbsent,
    /// Hard-wired id; the caller cannot supply it.
    Fixed(Pubkey),
}

/// One position in an instruction's account list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSlot {
    /// Slot name.
    pub name: String,
    /// Writable flag when the account is supplied.
    pub writable: bool,
    /// Signer flag when the account is supplied.
    pub signer: bool,
    /// Behaviour when the caller omits the account.
    pub presence: Presence,
}

impl AccountSlot {
    fn new(name: &str, writable: bool, signer: bool, presence: Presence) -> Self {
        Self {
            name: name.to_string(),
            writable,
            signer,
            presence,
        }
    }

    /// Required writable account.
    #[must_use]
    pub fn writable(name: &str) -> Self {
        Self::new(name, true, false, Presence::Required)
    }

    /// Required read-only account.
    #[must_use]
    pub fn readonly(name: &str) -> Self {
        Self::new(name, false, false, Presence::Required)
    }

    /// Required writable signer.
    #[must_use]
    pub fn writable_signer(name: &str) -> Self {
        Self::new(name, true, true, Presence::Required)
    }

    /// Required read-only signer.
    #[must_use]
    pub fn readonly_signer(name: &str) -> Self {
        Self::new(name, false, true, Presence::Required)
    }

    /// Read-only account defaulting to a well-known id.
    #[must_use]
    pub fn defaulted(name: &str, default: Pubkey) -> Self {
        Self::new(name, false, false, Presence::Default(default))
    }

    /// Hard-wired read-only account.
    #[must_use]
    pub fn fixed(name: &str, key: Pubkey) -> Self {
        Self::new(name, false, false, Presence::Fixed(key))
    }

    /// Marks the slot optional, replaced by the program id sentinel when omitted.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.presence = Presence::ProgramIdSentinel;
        self
    }

    /// Marks the slot optional, dropped from the list when omitted.
    #[must_use]
    pub fn omit_when_absent(mut self) -> Self {
        self.presence = Presence::OmitWhenAbsent;
        self
    }

    /// True when the caller may leave the slot empty.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        !matches!(self.presence, Presence::Required)
    }
}

/// Immutable description of one instruction kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionDescriptor {
    /// Instruction name.
    pub name: String,
    /// Leading bytes of the instruction data.
    pub discriminator: Discriminator,
    /// Argument struct, empty when the instruction takes none.
    pub args: StructSchema,
    /// Account slots in wire order.
    pub accounts: Vec<AccountSlot>,
    /// Whether trailing caller accounts are accepted.
    pub remaining_accounts: bool,
    /// Program id used when the caller does not override it.
    pub program_id: Pubkey,
    /// Whether the caller may override the program id.
    pub program_id_overridable: bool,
}

impl InstructionDescriptor {
    /// Creates a descriptor with no arguments and no accounts.
    #[must_use]
    pub fn new(name: &str, discriminator: Discriminator, program_id: Pubkey) -> Self {
        Self {
            name: name.to_string(),
            discriminator,
            args: StructSchema::empty(format!("{}Args", name)),
            accounts: Vec::new(),
            remaining_accounts: false,
            program_id,
            program_id_overridable: true,
        }
    }

    /// Sets the argument struct.
    #[must_use]
    pub fn args(mut self, args: StructSchema) -> Self {
        self.args = args;
        self
    }

    /// Sets the account slots.
    #[must_use]
    pub fn accounts(mut self, accounts: Vec<AccountSlot>) -> Self {
        self.accounts = accounts;
        self
    }

    /// Accepts trailing caller accounts.
    #[must_use]
    pub fn with_remaining_accounts(mut self) -> Self {
        self.remaining_accounts = true;
        self
    }

    /// Pins the program id.
    #[must_use]
    pub fn fixed_program_id(mut self) -> Self {
        self.program_id_overridable = false;
        self
    }

    /// Looks up an account slot by name.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&AccountSlot> {
        self.accounts.iter().find(|s| s.name == name)
    }

    /// Size of the instruction data when the arguments are fixed-size.
    #[must_use]
    pub fn data_size(&self) -> Option<usize> {
        Some(self.discriminator.len() + self.args.byte_size()?)
    }

    /// Decodes instruction data back into its argument struct.
    ///
    /// # Errors
    ///
    /// Returns `DiscriminatorMismatch` for data of another instruction,
    /// `TrailingBytes` when the arguments do not span the buffer, and codec
    /// errors otherwise.
    pub fn decode_data(&self, data: &[u8]) -> Result<Value, SdkError> {
        let tag = self.discriminator.as_bytes();
        if !self.discriminator.matches(data) {
            return Err(SdkError::DiscriminatorMismatch {
                name: self.name.clone(),
                expected: tag.to_vec(),
                found: data.iter().take(tag.len()).copied().collect(),
            });
        }
        let (value, consumed) = codec::decode_struct(&self.args, data, tag.len())?;
        if consumed != data.len() {
            return Err(SdkError::TrailingBytes {
                name: self.name.clone(),
                consumed,
                total: data.len(),
            });
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Schema;

    fn set_collection_size() -> InstructionDescriptor {
        InstructionDescriptor::new("SetCollectionSize", Discriminator::Byte(34), SYSTEM_PROGRAM_ID)
            .args(StructSchema::new(
                "SetCollectionSizeInstructionArgs",
                [(
                    "set_collection_size_args",
                    Schema::structure("SetCollectionSizeArgs", [("size", Schema::U64)]),
                )],
            ))
            .accounts(vec![
                AccountSlot::writable("collection_metadata"),
                AccountSlot::readonly_signer("collection_authority"),
                AccountSlot::readonly("collection_mint"),
                AccountSlot::readonly("collection_authority_record").omit_when_absent(),
            ])
    }

    #[test]
    fn test_slot_constructors() {
        let slot = AccountSlot::writable_signer("payer");
        assert!(slot.writable && slot.signer);
        assert!(!slot.is_optional());
        assert!(AccountSlot::readonly("x").optional().is_optional());
        assert_eq!(
            AccountSlot::defaulted("rent", RENT_SYSVAR_ID).presence,
            Presence::Default(RENT_SYSVAR_ID)
        );
    }

    #[test]
    fn test_data_size() {
        assert_eq!(set_collection_size().data_size(), Some(9));
    }

    #[test]
    fn test_decode_data() {
        let ix = set_collection_size();
        let mut data = vec![34];
        data.extend_from_slice(&42u64.to_le_bytes());
        let value = ix.decode_data(&data).expect("should decode");
        assert_eq!(
            value
                .field("set_collection_size_args")
                .and_then(|a| a.field("size")),
            Some(&Value::U64(42))
        );
    }

    #[test]
    fn test_decode_data_wrong_discriminator() {
        let err = set_collection_size()
            .decode_data(&[35, 0, 0, 0, 0, 0, 0, 0, 0])
            .expect_err("should reject");
        assert!(matches!(err, SdkError::DiscriminatorMismatch { .. }));
    }

    #[test]
    fn test_decode_data_trailing() {
        let mut data = vec![34];
        data.extend_from_slice(&[0; 10]);
        let err = set_collection_size().decode_data(&data).expect_err("should reject");
        assert!(matches!(err, SdkError::TrailingBytes { consumed: 9, total: 11, .. }));
    }
}
