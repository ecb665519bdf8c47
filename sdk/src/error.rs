//! SDK error types.
//!
//! Every codec error names the field path (`data.creators[1].share`) and, where
//! bytes are involved, the offset at which the violation was detected.

/// SDK errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SdkError {
    /// Decode attempted past the end of the available bytes.
    #[error("buffer underrun at `{path}`: need {needed} bytes at offset {offset}, {remaining} remaining")]
    BufferUnderrun {
        /// Field path being decoded.
        path: String,
        /// Offset where the read started.
        offset: usize,
        /// Bytes required by the read.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// Enum or option discriminant outside the declared set.
    #[error("unknown variant {discriminant} for `{type_name}` at `{path}` (offset {offset})")]
    UnknownVariant {
        /// Field path being decoded.
        path: String,
        /// Name of the enum type.
        type_name: String,
        /// Discriminant that was read.
        discriminant: u64,
        /// Offset of the discriminant.
        offset: usize,
    },

    /// A non-optional account slot was not filled at build time.
    #[error("instruction `{instruction}` is missing required account `{account}`")]
    MissingRequiredAccount {
        /// Instruction name.
        instruction: String,
        /// Account slot name.
        account: String,
    },

    /// A value's shape disagrees with its schema.
    #[error("schema mismatch at `{path}`: expected {expected}, found {found}")]
    SchemaMismatch {
        /// Field path being encoded.
        path: String,
        /// What the schema declares.
        expected: String,
        /// What the value provided.
        found: String,
    },

    /// A length prefix cannot represent the value's length.
    #[error("encoding overflow at `{path}`: length {length} exceeds {max}")]
    EncodingOverflow {
        /// Field path being encoded.
        path: String,
        /// Length that was requested.
        length: usize,
        /// Maximum the prefix can hold.
        max: u64,
    },

    /// Boolean byte other than 0 or 1.
    #[error("invalid bool byte {byte:#04x} at `{path}` (offset {offset})")]
    InvalidBool {
        /// Field path being decoded.
        path: String,
        /// Offset of the byte.
        offset: usize,
        /// The byte that was read.
        byte: u8,
    },

    /// String bytes are not valid UTF-8.
    #[error("invalid utf-8 string at `{path}` (offset {offset})")]
    InvalidUtf8 {
        /// Field path being decoded.
        path: String,
        /// Offset of the string bytes.
        offset: usize,
    },

    /// Non-empty vector whose elements occupy no bytes.
    #[error("vector of {count} zero-sized elements at `{path}` (offset {offset})")]
    ZeroSizedElements {
        /// Field path being decoded.
        path: String,
        /// Element count read from the prefix.
        count: usize,
        /// Offset of the length prefix.
        offset: usize,
    },

    /// Leading type tag or instruction discriminator does not match.
    #[error("discriminator mismatch for `{name}`: expected {expected:?}, found {found:?}")]
    DiscriminatorMismatch {
        /// Account or instruction name.
        name: String,
        /// Declared discriminator bytes.
        expected: Vec<u8>,
        /// Bytes found in the buffer.
        found: Vec<u8>,
    },

    /// Decode finished before the end of the buffer.
    #[error("trailing bytes after `{name}`: consumed {consumed} of {total}")]
    TrailingBytes {
        /// Type or instruction name.
        name: String,
        /// Bytes consumed by the decode.
        consumed: usize,
        /// Total buffer length.
        total: usize,
    },

    /// Account name not declared by the instruction.
    #[error("instruction `{instruction}` has no account named `{account}`")]
    UnknownAccount {
        /// Instruction name.
        instruction: String,
        /// Supplied account name.
        account: String,
    },

    /// Program not present in the registry.
    #[error("unknown program: {0}")]
    UnknownProgram(String),

    /// Instruction not declared by the program.
    #[error("program `{program}` has no instruction `{instruction}`")]
    UnknownInstruction {
        /// Program name.
        program: String,
        /// Instruction name.
        instruction: String,
    },

    /// Type or account layout not declared by the program.
    #[error("program `{program}` has no type `{name}`")]
    UnknownType {
        /// Program name.
        program: String,
        /// Type name.
        name: String,
    },

    /// Invalid address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Program id of a legacy builder cannot be overridden.
    #[error("instruction `{0}` has a fixed program id")]
    FixedProgramId(String),

    /// Malformed interface description.
    #[error("idl error: {0}")]
    Idl(String),
}

impl SdkError {
    /// Shorthand for a [`SdkError::SchemaMismatch`].
    pub(crate) fn mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::SchemaMismatch {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_account() {
        let err = SdkError::MissingRequiredAccount {
            instruction: "verify".to_string(),
            account: "metadata".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "instruction `verify` is missing required account `metadata`"
        );
    }

    #[test]
    fn test_error_display_underrun() {
        let err = SdkError::BufferUnderrun {
            path: "lamports".to_string(),
            offset: 4,
            needed: 8,
            remaining: 2,
        };
        assert_eq!(
            err.to_string(),
            "buffer underrun at `lamports`: need 8 bytes at offset 4, 2 remaining"
        );
    }

    #[test]
    fn test_error_display_invalid_bool() {
        let err = SdkError::InvalidBool {
            path: "is_mutable".to_string(),
            offset: 9,
            byte: 2,
        };
        assert_eq!(
            err.to_string(),
            "invalid bool byte 0x02 at `is_mutable` (offset 9)"
        );
    }

    #[test]
    fn test_mismatch_helper() {
        let err = SdkError::mismatch("hash", "32 elements", "31 elements");
        assert!(matches!(err, SdkError::SchemaMismatch { .. }));
    }
}
