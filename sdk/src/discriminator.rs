//! Instruction and account discriminators.
//!
//! Anchor programs prefix instruction data with the first 8 bytes of
//! `sha256("global:<snake_case_name>")` and account data with the first 8 bytes of
//! `sha256("account:<TypeName>")`. Shank programs (token metadata) use one byte.

use sha2::{Digest, Sha256};

/// Length of an Anchor discriminator.
pub const ANCHOR_DISCRIMINATOR_LEN: usize = 8;

/// Leading bytes that identify an instruction variant or account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discriminator {
    /// Single-byte tag.
    Byte(u8),
    /// Eight-byte Anchor tag.
    Anchor([u8; ANCHOR_DISCRIMINATOR_LEN]),
}

impl Discriminator {
    /// Discriminator bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Byte(b) => std::slice::from_ref(b),
            Self::Anchor(bytes) => bytes,
        }
    }

    /// Number of discriminator bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Byte(_) => 1,
            Self::Anchor(_) => ANCHOR_DISCRIMINATOR_LEN,
        }
    }

    /// True when `data` starts with this discriminator.
    #[must_use]
    pub fn matches(&self, data: &[u8]) -> bool {
        data.starts_with(self.as_bytes())
    }
}

fn hash_prefix(preimage: &str) -> [u8; ANCHOR_DISCRIMINATOR_LEN] {
    let digest = Sha256::digest(preimage.as_bytes());
    let mut out = [0u8; ANCHOR_DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..ANCHOR_DISCRIMINATOR_LEN]);
    out
}

/// Anchor instruction discriminator for `name` (camelCase or snake_case).
#[must_use]
pub fn anchor_instruction(name: &str) -> Discriminator {
    Discriminator::Anchor(hash_prefix(&format!("global:{}", to_snake_case(name))))
}

/// Anchor account discriminator for the account type `name`.
#[must_use]
pub fn anchor_account(name: &str) -> [u8; ANCHOR_DISCRIMINATOR_LEN] {
    hash_prefix(&format!("account:{}", name))
}

/// Converts `initializeV2` / `InitializeV2` to `initialize_v2`.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c.is_uppercase() {
            if matches!(prev, Some(p) if p.is_lowercase() || p.is_ascii_digit()) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("initializeV2"), "initialize_v2");
        assert_eq!(to_snake_case("addConfigLines"), "add_config_lines");
        assert_eq!(to_snake_case("withdraw"), "withdraw");
        assert_eq!(to_snake_case("init_selling_resource"), "init_selling_resource");
    }

    #[test]
    fn test_anchor_instruction_matches_generated_constants() {
        assert_eq!(
            anchor_instruction("initializeV2"),
            Discriminator::Anchor([67, 153, 175, 39, 218, 16, 38, 32])
        );
        assert_eq!(
            anchor_instruction("verifyCollection"),
            Discriminator::Anchor([56, 113, 101, 253, 79, 55, 122, 169])
        );
        assert_eq!(
            anchor_instruction("removeCollection"),
            Discriminator::Anchor([223, 52, 106, 217, 61, 220, 36, 160])
        );
    }

    #[test]
    fn test_anchor_account() {
        assert_eq!(
            anchor_account("CandyMachine"),
            [51, 173, 177, 113, 25, 241, 109, 189]
        );
    }

    #[test]
    fn test_matches() {
        let d = Discriminator::Byte(52);
        assert!(d.matches(&[52, 0]));
        assert!(!d.matches(&[]));
        assert_eq!(d.len(), 1);
        assert_eq!(Discriminator::Anchor([1; 8]).as_bytes(), &[1; 8]);
    }
}
