//! Generic instruction builder.
//!
//! Builds the instruction described by an [`InstructionDescriptor`] from caller
//! accounts and arguments.

use std::collections::BTreeMap;

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::descriptor::{InstructionDescriptor, Presence};
use crate::codec::{self, Value};
use crate::error::SdkError;

/// Builder for any described instruction.
#[derive(Debug, Clone)]
pub struct InstructionBuilder<'d> {
    descriptor: &'d InstructionDescriptor,
    program_id: Option<Pubkey>,
    accounts: BTreeMap<String, Pubkey>,
    remaining_accounts: Vec<AccountMeta>,
    args: Option<Value>,
    borsh_args: Option<Result<Vec<u8>, String>>,
}

impl<'d> InstructionBuilder<'d> {
    /// Creates a new builder.
    #[must_use]
    pub fn new(descriptor: &'d InstructionDescriptor) -> Self {
        Self {
            descriptor,
            program_id: None,
            accounts: BTreeMap::new(),
            remaining_accounts: Vec::new(),
            args: None,
            borsh_args: None,
        }
    }

    /// Overrides the target program id.
    #[must_use]
    pub fn program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = Some(program_id);
        self
    }

    /// Sets the account for the named slot.
    #[must_use]
    pub fn account(mut self, name: &str, key: Pubkey) -> Self {
        self.accounts.insert(name.to_string(), key);
        self
    }

    /// Sets several accounts at once.
    #[must_use]
    pub fn accounts<I, S>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = (S, Pubkey)>,
        S: Into<String>,
    {
        self.accounts
            .extend(accounts.into_iter().map(|(name, key)| (name.into(), key)));
        self
    }

    /// Appends trailing accounts, kept in the given order.
    #[must_use]
    pub fn remaining_accounts(mut self, metas: impl IntoIterator<Item = AccountMeta>) -> Self {
        self.remaining_accounts.extend(metas);
        self
    }

    /// Sets the arguments as a dynamic value checked against the argument schema.
    #[must_use]
    pub fn args(mut self, args: Value) -> Self {
        self.args = Some(args);
        self.borsh_args = None;
        self
    }

    /// Sets the arguments from a borsh-serializable mirror type.
    ///
    /// The bytes are decoded against the argument schema at build time, so a mirror
    /// that drifts from the schema fails with `SchemaMismatch`.
    #[must_use]
    pub fn borsh_args<T: BorshSerialize>(mut self, args: &T) -> Self {
        self.borsh_args = Some(borsh::to_vec(args).map_err(|e| e.to_string()));
        self.args = None;
        self
    }

    fn resolve_program_id(&self) -> Result<Pubkey, SdkError> {
        match self.program_id {
            Some(_) if !self.descriptor.program_id_overridable => {
                Err(SdkError::FixedProgramId(self.descriptor.name.clone()))
            }
            Some(id) => Ok(id),
            None => Ok(self.descriptor.program_id),
        }
    }

    fn resolve_accounts(&self, program_id: Pubkey) -> Result<Vec<AccountMeta>, SdkError> {
        let descriptor = self.descriptor;
        if let Some(name) = self.accounts.keys().find(|name| {
            descriptor
                .slot(name)
                .map_or(true, |slot| matches!(slot.presence, Presence::Fixed(_)))
        }) {
            return Err(SdkError::UnknownAccount {
                instruction: descriptor.name.clone(),
                account: name.clone(),
            });
        }

        let mut metas = Vec::with_capacity(descriptor.accounts.len() + self.remaining_accounts.len());
        for slot in &descriptor.accounts {
            let resolved = match (self.accounts.get(&slot.name), slot.presence) {
                (Some(key), _) => Some(meta(*key, slot.writable, slot.signer)),
                (None, Presence::Required) => {
                    return Err(SdkError::MissingRequiredAccount {
                        instruction: descriptor.name.clone(),
                        account: slot.name.clone(),
                    })
                }
                (None, Presence::ProgramIdSentinel) => {
                    tracing::trace!(slot = %slot.name, "optional account defaulted to program id");
                    Some(AccountMeta::new_readonly(program_id, false))
                }
                (None, Presence::Default(key) | Presence::Fixed(key)) => {
                    Some(meta(key, slot.writable, slot.signer))
                }
                (None, Presence::OmitWhenAbsent) => None,
            };
            metas.extend(resolved);
        }

        if !self.remaining_accounts.is_empty() {
            if !descriptor.remaining_accounts {
                return Err(SdkError::mismatch(
                    "remaining_accounts",
                    format!("no remaining accounts for `{}`", descriptor.name),
                    format!("{} accounts", self.remaining_accounts.len()),
                ));
            }
            metas.extend(self.remaining_accounts.iter().cloned());
        }
        Ok(metas)
    }

    fn encode_data(&self) -> Result<Vec<u8>, SdkError> {
        let descriptor = self.descriptor;
        let tag = descriptor.discriminator.as_bytes();

        if let Some(raw) = &self.borsh_args {
            let raw = raw.as_ref().map_err(|e| {
                SdkError::mismatch("<args>", descriptor.args.name.clone(), e.clone())
            })?;
            let (_, consumed) = codec::decode_struct(&descriptor.args, raw, 0)?;
            if consumed != raw.len() {
                return Err(SdkError::mismatch(
                    "<args>",
                    format!("{} bytes for {}", consumed, descriptor.args.name),
                    format!("{} bytes", raw.len()),
                ));
            }
            let mut data = Vec::with_capacity(tag.len() + raw.len());
            data.extend_from_slice(tag);
            data.extend_from_slice(raw);
            return Ok(data);
        }

        let empty = Value::Struct(Vec::new());
        let args = match &self.args {
            Some(args) => args,
            None if descriptor.args.fields.is_empty() => &empty,
            None => {
                return Err(SdkError::mismatch(
                    "<args>",
                    descriptor.args.name.clone(),
                    "no arguments",
                ))
            }
        };
        let size = tag.len() + codec::compute_struct_size(&descriptor.args, args)?;
        let mut data = Vec::with_capacity(size);
        data.extend_from_slice(tag);
        codec::encode_struct_into(&descriptor.args, args, &mut data)?;
        Ok(data)
    }

    /// Builds the instruction.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredAccount` when a required slot is empty,
    /// `UnknownAccount` for names the instruction does not declare,
    /// `FixedProgramId` when overriding a pinned program id, and codec errors
    /// when the arguments do not match their schema.
    pub fn build(self) -> Result<Instruction, SdkError> {
        let program_id = self.resolve_program_id()?;
        let accounts = self.resolve_accounts(program_id)?;
        let data = self.encode_data()?;

        tracing::debug!(
            instruction = %self.descriptor.name,
            program_id = %program_id,
            accounts = accounts.len(),
            data_len = data.len(),
            "built instruction"
        );

        Ok(Instruction {
            program_id,
            accounts,
            data,
        })
    }
}

fn meta(key: Pubkey, writable: bool, signer: bool) -> AccountMeta {
    if writable {
        AccountMeta::new(key, signer)
    } else {
        AccountMeta::new_readonly(key, signer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Schema, StructSchema};
    use crate::discriminator::Discriminator;
    use crate::instructions::descriptor::{AccountSlot, SYSTEM_PROGRAM_ID};

    fn test_program_id() -> Pubkey {
        Pubkey::new_unique()
    }

    fn descriptor(program_id: Pubkey) -> InstructionDescriptor {
        InstructionDescriptor::new("Verify", Discriminator::Byte(52), program_id)
            .args(StructSchema::new(
                "VerifyInstructionArgs",
                [(
                    "verification_args",
                    Schema::scalar_enum("VerificationArgs", ["CreatorV1", "CollectionV1"]),
                )],
            ))
            .accounts(vec![
                AccountSlot::readonly_signer("authority"),
                AccountSlot::readonly("delegate_record").optional(),
                AccountSlot::writable("metadata"),
                AccountSlot::writable("collection_metadata").optional(),
                AccountSlot::defaulted("system_program", SYSTEM_PROGRAM_ID),
            ])
    }

    fn args() -> Value {
        Value::structure([("verification_args", Value::unit_variant("CollectionV1"))])
    }

    #[test]
    fn test_builder_build() {
        let program_id = test_program_id();
        let d = descriptor(program_id);
        let authority = Pubkey::new_unique();
        let metadata = Pubkey::new_unique();

        let ix = InstructionBuilder::new(&d)
            .account("authority", authority)
            .account("metadata", metadata)
            .args(args())
            .build()
            .expect("should build instruction");

        assert_eq!(ix.program_id, program_id);
        assert_eq!(ix.accounts.len(), 5);
        assert_eq!(ix.accounts[0], AccountMeta::new_readonly(authority, true));
        assert_eq!(ix.accounts[1], AccountMeta::new_readonly(program_id, false));
        assert_eq!(ix.accounts[2], AccountMeta::new(metadata, false));
        assert_eq!(ix.accounts[3], AccountMeta::new_readonly(program_id, false));
        assert_eq!(ix.accounts[4], AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false));
        assert_eq!(ix.data, vec![52, 1]);
    }

    #[test]
    fn test_builder_supplied_optional_keeps_flags() {
        let d = descriptor(test_program_id());
        let collection_metadata = Pubkey::new_unique();
        let ix = InstructionBuilder::new(&d)
            .account("authority", Pubkey::new_unique())
            .account("metadata", Pubkey::new_unique())
            .account("collection_metadata", collection_metadata)
            .args(args())
            .build()
            .expect("should build instruction");
        assert_eq!(ix.accounts[3], AccountMeta::new(collection_metadata, false));
    }

    #[test]
    fn test_builder_sentinel_follows_override() {
        let d = descriptor(test_program_id());
        let override_id = Pubkey::new_unique();
        let ix = InstructionBuilder::new(&d)
            .program_id(override_id)
            .account("authority", Pubkey::new_unique())
            .account("metadata", Pubkey::new_unique())
            .args(args())
            .build()
            .expect("should build instruction");
        assert_eq!(ix.program_id, override_id);
        assert_eq!(ix.accounts[1].pubkey, override_id);
    }

    #[test]
    fn test_builder_missing_required_account() {
        let d = descriptor(test_program_id());
        let err = InstructionBuilder::new(&d)
            .account("authority", Pubkey::new_unique())
            .args(args())
            .build()
            .expect_err("should fail");
        assert_eq!(
            err,
            SdkError::MissingRequiredAccount {
                instruction: "Verify".to_string(),
                account: "metadata".to_string(),
            }
        );
    }

    #[test]
    fn test_builder_unknown_account() {
        let d = descriptor(test_program_id());
        let err = InstructionBuilder::new(&d)
            .account("authority", Pubkey::new_unique())
            .account("metadata", Pubkey::new_unique())
            .account("mystery", Pubkey::new_unique())
            .args(args())
            .build()
            .expect_err("should fail");
        assert!(matches!(err, SdkError::UnknownAccount { .. }));
    }

    #[test]
    fn test_builder_missing_args() {
        let d = descriptor(test_program_id());
        let err = InstructionBuilder::new(&d)
            .account("authority", Pubkey::new_unique())
            .account("metadata", Pubkey::new_unique())
            .build()
            .expect_err("should fail");
        assert!(matches!(err, SdkError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_builder_remaining_accounts_rejected_when_undeclared() {
        let d = descriptor(test_program_id());
        let err = InstructionBuilder::new(&d)
            .account("authority", Pubkey::new_unique())
            .account("metadata", Pubkey::new_unique())
            .remaining_accounts(vec![AccountMeta::new(Pubkey::new_unique(), false)])
            .args(args())
            .build()
            .expect_err("should fail");
        assert!(matches!(err, SdkError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_builder_remaining_accounts_appended_in_order() {
        let d = descriptor(test_program_id()).with_remaining_accounts();
        let extra: Vec<AccountMeta> = (0..3)
            .map(|_| AccountMeta::new_readonly(Pubkey::new_unique(), false))
            .collect();
        let ix = InstructionBuilder::new(&d)
            .account("authority", Pubkey::new_unique())
            .account("metadata", Pubkey::new_unique())
            .remaining_accounts(extra.clone())
            .args(args())
            .build()
            .expect("should build instruction");
        assert_eq!(ix.accounts[5..], extra[..]);
    }

    #[test]
    fn test_builder_fixed_program_id() {
        let d = descriptor(test_program_id()).fixed_program_id();
        let err = InstructionBuilder::new(&d)
            .program_id(Pubkey::new_unique())
            .account("authority", Pubkey::new_unique())
            .account("metadata", Pubkey::new_unique())
            .args(args())
            .build()
            .expect_err("should fail");
        assert!(matches!(err, SdkError::FixedProgramId(_)));
    }

    #[derive(borsh::BorshSerialize)]
    struct SizeArgs {
        size: u64,
    }

    #[test]
    fn test_builder_borsh_args_checked_against_schema() {
        let d = InstructionDescriptor::new("SetSize", Discriminator::Byte(34), test_program_id())
            .args(StructSchema::new("SetSizeArgs", [("size", Schema::U64)]));
        let ix = InstructionBuilder::new(&d)
            .borsh_args(&SizeArgs { size: 7 })
            .build()
            .expect("should build instruction");
        assert_eq!(ix.data, vec![34, 7, 0, 0, 0, 0, 0, 0, 0]);

        let narrow = InstructionDescriptor::new("SetSize", Discriminator::Byte(34), test_program_id())
            .args(StructSchema::new("SetSizeArgs", [("size", Schema::U32)]));
        let err = InstructionBuilder::new(&narrow)
            .borsh_args(&SizeArgs { size: 7 })
            .build()
            .expect_err("should fail");
        assert!(matches!(err, SdkError::SchemaMismatch { .. }));
    }
}
