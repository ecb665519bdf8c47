//! On-chain account layouts.
//!
//! Anchor accounts start with an 8-byte type tag; legacy accounts are the bare
//! struct encoding.

use crate::codec::{self, StructSchema, Value};
use crate::discriminator::{anchor_account, ANCHOR_DISCRIMINATOR_LEN};
use crate::error::SdkError;

/// Layout of one account type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLayout {
    /// Account type name.
    pub name: String,
    /// Type tag preceding the data, if any.
    pub discriminator: Option<[u8; ANCHOR_DISCRIMINATOR_LEN]>,
    /// Account data schema.
    pub schema: StructSchema,
}

/// Result of decoding an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAccount {
    /// Decoded account data.
    pub value: Value,
    /// Bytes read, including the type tag.
    pub consumed: usize,
}

impl AccountLayout {
    /// Anchor account tagged with `sha256("account:<name>")[..8]`.
    #[must_use]
    pub fn anchor(schema: StructSchema) -> Self {
        Self {
            name: schema.name.clone(),
            discriminator: Some(anchor_account(&schema.name)),
            schema,
        }
    }

    /// Account without a type tag.
    #[must_use]
    pub fn untagged(schema: StructSchema) -> Self {
        Self {
            name: schema.name.clone(),
            discriminator: None,
            schema,
        }
    }

    fn tag_len(&self) -> usize {
        self.discriminator.map_or(0, |d| d.len())
    }

    /// Expected data length when the layout is fixed-size.
    #[must_use]
    pub fn byte_size(&self) -> Option<usize> {
        Some(self.tag_len() + self.schema.byte_size()?)
    }

    /// True when `data` has exactly the size of a fixed layout.
    ///
    /// Variable-size layouts always return `false`.
    #[must_use]
    pub fn has_correct_byte_size(&self, data: &[u8]) -> bool {
        self.byte_size() == Some(data.len())
    }

    /// Decodes account data.
    ///
    /// Trailing bytes are allowed, accounts are often allocated larger than their
    /// contents; `consumed` reports where the data ended.
    ///
    /// # Errors
    ///
    /// Returns `DiscriminatorMismatch` when the type tag differs and codec errors
    /// for malformed data.
    pub fn decode(&self, data: &[u8]) -> Result<DecodedAccount, SdkError> {
        if let Some(expected) = &self.discriminator {
            let found = data.get(..expected.len());
            if found != Some(&expected[..]) {
                return Err(SdkError::DiscriminatorMismatch {
                    name: self.name.clone(),
                    expected: expected.to_vec(),
                    found: data.iter().take(expected.len()).copied().collect(),
                });
            }
        }
        let (value, consumed) = codec::decode_struct(&self.schema, data, self.tag_len())?;
        tracing::trace!(account = %self.name, consumed, total = data.len(), "decoded account");
        Ok(DecodedAccount { value, consumed })
    }

    /// Encodes account data, type tag first.
    ///
    /// # Errors
    ///
    /// Returns codec errors when `value` does not match the schema.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, SdkError> {
        let size = self.tag_len() + codec::compute_struct_size(&self.schema, value)?;
        let mut out = Vec::with_capacity(size);
        if let Some(tag) = &self.discriminator {
            out.extend_from_slice(tag);
        }
        codec::encode_struct_into(&self.schema, value, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Schema;
    use solana_sdk::pubkey::Pubkey;

    fn creator() -> AccountLayout {
        AccountLayout::untagged(StructSchema::new(
            "Creator",
            [
                ("address", Schema::PublicKey),
                ("verified", Schema::U8),
                ("share", Schema::U8),
            ],
        ))
    }

    fn counter() -> AccountLayout {
        AccountLayout::anchor(StructSchema::new(
            "Counter",
            [("authority", Schema::PublicKey), ("label", Schema::String)],
        ))
    }

    #[test]
    fn test_untagged_byte_size() {
        let layout = creator();
        assert_eq!(layout.byte_size(), Some(34));
        assert!(layout.has_correct_byte_size(&[0; 34]));
        assert!(!layout.has_correct_byte_size(&[0; 35]));
    }

    #[test]
    fn test_variable_layout_has_no_fixed_size() {
        assert_eq!(counter().byte_size(), None);
        assert!(!counter().has_correct_byte_size(&[0; 48]));
    }

    #[test]
    fn test_anchor_encode_decode() {
        let layout = counter();
        let value = Value::structure([
            ("authority", Value::PublicKey(Pubkey::new_unique())),
            ("label", Value::from("main")),
        ]);
        let mut data = layout.encode(&value).expect("should encode");
        assert_eq!(&data[..8], &anchor_account("Counter"));
        let encoded_len = data.len();
        data.extend_from_slice(&[0; 16]);

        let decoded = layout.decode(&data).expect("should decode");
        assert_eq!(decoded.value, value);
        assert_eq!(decoded.consumed, encoded_len);
    }

    #[test]
    fn test_anchor_discriminator_mismatch() {
        let err = counter().decode(&[0; 48]).expect_err("should reject");
        assert!(matches!(err, SdkError::DiscriminatorMismatch { .. }));

        let err = counter().decode(&[1, 2]).expect_err("should reject");
        assert!(matches!(
            err,
            SdkError::DiscriminatorMismatch { ref found, .. } if found == &vec![1, 2]
        ));
    }
}
