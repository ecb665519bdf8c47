//! Dynamic values.
//!
//! A [`Value`] is an in-memory instance of a [`super::Schema`]. Struct values keep
//! their fields as an ordered list; decode always produces them in declared order.

use solana_sdk::pubkey::Pubkey;

/// An instance of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `u8`.
    U8(u8),
    /// `u16`.
    U16(u16),
    /// `u32`.
    U32(u32),
    /// `u64`.
    U64(u64),
    /// `u128`.
    U128(u128),
    /// `i8`.
    I8(i8),
    /// `i16`.
    I16(i16),
    /// `i32`.
    I32(i32),
    /// `i64`.
    I64(i64),
    /// `i128`.
    I128(i128),
    /// `bool`.
    Bool(bool),
    /// Account address.
    PublicKey(Pubkey),
    /// Raw bytes for a fixed byte array.
    Bytes(Vec<u8>),
    /// UTF-8 string.
    String(String),
    /// Optional value (both `Option` and `COption` schemas).
    Option(Option<Box<Value>>),
    /// Elements of an array or vector, or a tuple variant payload.
    Array(Vec<Value>),
    /// Named fields.
    Struct(Vec<(String, Value)>),
    /// Selected enum variant with its payload.
    Enum(EnumValue),
}

/// A selected enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Variant name.
    pub variant: String,
    /// `None` for unit variants, `Array` for tuple variants, `Struct` for named ones.
    pub payload: Option<Box<Value>>,
}

impl Value {
    /// Struct value from `(name, value)` pairs.
    #[must_use]
    pub fn structure<N, I>(fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Value)>,
    {
        Self::Struct(fields.into_iter().map(|(n, v)| (n.into(), v)).collect())
    }

    /// Unit enum variant.
    #[must_use]
    pub fn unit_variant(name: impl Into<String>) -> Self {
        Self::Enum(EnumValue {
            variant: name.into(),
            payload: None,
        })
    }

    /// Enum variant carrying a payload.
    #[must_use]
    pub fn variant(name: impl Into<String>, payload: Value) -> Self {
        Self::Enum(EnumValue {
            variant: name.into(),
            payload: Some(Box::new(payload)),
        })
    }

    /// `None`.
    #[must_use]
    pub const fn none() -> Self {
        Self::Option(None)
    }

    /// `Some(inner)`.
    #[must_use]
    pub fn some(inner: Value) -> Self {
        Self::Option(Some(Box::new(inner)))
    }

    /// Looks up a struct field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Short description of the value's kind, used in mismatch errors.
    #[must_use]
    pub fn kind(&self) -> String {
        match self {
            Self::U8(_) => "u8".to_string(),
            Self::U16(_) => "u16".to_string(),
            Self::U32(_) => "u32".to_string(),
            Self::U64(_) => "u64".to_string(),
            Self::U128(_) => "u128".to_string(),
            Self::I8(_) => "i8".to_string(),
            Self::I16(_) => "i16".to_string(),
            Self::I32(_) => "i32".to_string(),
            Self::I64(_) => "i64".to_string(),
            Self::I128(_) => "i128".to_string(),
            Self::Bool(_) => "bool".to_string(),
            Self::PublicKey(_) => "publicKey".to_string(),
            Self::Bytes(b) => format!("{} bytes", b.len()),
            Self::String(_) => "string".to_string(),
            Self::Option(_) => "option".to_string(),
            Self::Array(items) => format!("{} elements", items.len()),
            Self::Struct(_) => "struct".to_string(),
            Self::Enum(e) => format!("variant {}", e.variant),
        }
    }

    /// Numeric content widened to `i128`, for integer values only.
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Self::U8(v) => Some(i128::from(v)),
            Self::U16(v) => Some(i128::from(v)),
            Self::U32(v) => Some(i128::from(v)),
            Self::U64(v) => Some(i128::from(v)),
            Self::I8(v) => Some(i128::from(v)),
            Self::I16(v) => Some(i128::from(v)),
            Self::I32(v) => Some(i128::from(v)),
            Self::I64(v) => Some(i128::from(v)),
            Self::I128(v) => Some(v),
            Self::U128(v) => i128::try_from(v).ok(),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from!(
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    bool => Bool,
    Pubkey => PublicKey,
    String => String,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(v: [u8; N]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        Self::Option(v.map(|inner| Box::new(inner.into())))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}
