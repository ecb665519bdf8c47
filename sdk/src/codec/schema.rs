//! Schema types.
//!
//! A [`Schema`] describes how one logical type is laid out on the wire. Schemas are
//! plain data: program modules build them once and the generic engine in
//! [`super::encode`] and [`super::decode`] interprets them.

use std::fmt;

/// Width of a PublicKey on the wire.
pub const PUBKEY_LEN: usize = 32;

/// Width of the length prefix used by strings and vectors.
pub const LEN_PREFIX: usize = 4;

/// Width of an enum discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TagWidth {
    /// One byte (borsh default).
    #[default]
    U8,
    /// Two bytes, little-endian.
    U16,
    /// Four bytes, little-endian.
    U32,
}

impl TagWidth {
    /// Number of bytes occupied by the tag.
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    /// Largest discriminant representable with this width.
    #[must_use]
    pub const fn max(self) -> u64 {
        match self {
            Self::U8 => u8::MAX as u64,
            Self::U16 => u16::MAX as u64,
            Self::U32 => u32::MAX as u64,
        }
    }
}

/// Wire description of one logical type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Schema {
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned 32-bit integer.
    U32,
    /// Unsigned 64-bit integer.
    U64,
    /// Unsigned 128-bit integer.
    U128,
    /// Signed 8-bit integer.
    I8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Signed 64-bit integer.
    I64,
    /// Signed 128-bit integer.
    I128,
    /// One byte, 0 or 1.
    Bool,
    /// 32-byte account address.
    PublicKey,
    /// Byte array of a declared length, no prefix.
    FixedBytes(usize),
    /// u32 length prefix followed by UTF-8 bytes.
    String,
    /// u8 presence flag followed by the inner value when present.
    Option(Box<Schema>),
    /// u32 presence flag followed by the inner value when present.
    COption(Box<Schema>),
    /// `len` contiguous elements, no prefix.
    Array(Box<Schema>, usize),
    /// u32 element count followed by the elements.
    Vec(Box<Schema>),
    /// Named fields in declared order.
    Struct(StructSchema),
    /// Discriminant followed by the variant payload.
    Enum(EnumSchema),
}

/// A named field bound to a sub-schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field schema.
    pub schema: Schema,
}

impl Field {
    /// Creates a field.
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Ordered list of fields. The order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructSchema {
    /// Type name, used in error messages.
    pub name: String,
    /// Fields in declared order.
    pub fields: Vec<Field>,
}

impl StructSchema {
    /// Creates a struct schema from `(name, schema)` pairs.
    #[must_use]
    pub fn new<N, I>(name: impl Into<String>, fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Schema)>,
    {
        Self {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(n, s)| Field::new(n, s))
                .collect(),
        }
    }

    /// Struct with no fields.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Total width when every field is fixed-size.
    #[must_use]
    pub fn byte_size(&self) -> Option<usize> {
        self.fields
            .iter()
            .try_fold(0usize, |acc, f| Some(acc + f.schema.byte_size()?))
    }
}

/// Payload shape of an enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariantFields {
    /// No payload.
    Unit,
    /// Positional payload.
    Tuple(Vec<Schema>),
    /// Named payload.
    Named(Vec<Field>),
}

impl VariantFields {
    fn byte_size(&self) -> Option<usize> {
        match self {
            Self::Unit => Some(0),
            Self::Tuple(items) => items
                .iter()
                .try_fold(0usize, |acc, s| Some(acc + s.byte_size()?)),
            Self::Named(fields) => fields
                .iter()
                .try_fold(0usize, |acc, f| Some(acc + f.schema.byte_size()?)),
        }
    }
}

/// One enum variant. Its position in [`EnumSchema::variants`] is its discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variant {
    /// Variant name.
    pub name: String,
    /// Payload shape.
    pub fields: VariantFields,
}

impl Variant {
    /// Variant without payload.
    #[must_use]
    pub fn unit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: VariantFields::Unit,
        }
    }

    /// Variant with positional payload.
    #[must_use]
    pub fn tuple(name: impl Into<String>, items: Vec<Schema>) -> Self {
        Self {
            name: name.into(),
            fields: VariantFields::Tuple(items),
        }
    }

    /// Variant with named payload.
    #[must_use]
    pub fn named<N, I>(name: impl Into<String>, fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Schema)>,
    {
        Self {
            name: name.into(),
            fields: VariantFields::Named(
                fields
                    .into_iter()
                    .map(|(n, s)| Field::new(n, s))
                    .collect(),
            ),
        }
    }
}

/// Closed set of variants selected by a leading discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumSchema {
    /// Type name, used in error messages.
    pub name: String,
    /// Discriminant width.
    pub tag: TagWidth,
    /// Variants in discriminant order.
    pub variants: Vec<Variant>,
}

impl EnumSchema {
    /// Creates an enum with a one-byte discriminant.
    #[must_use]
    pub fn new(name: impl Into<String>, variants: Vec<Variant>) -> Self {
        Self {
            name: name.into(),
            tag: TagWidth::U8,
            variants,
        }
    }

    /// Overrides the discriminant width.
    #[must_use]
    pub fn with_tag(mut self, tag: TagWidth) -> Self {
        self.tag = tag;
        self
    }

    /// Finds a variant and its discriminant by name.
    #[must_use]
    pub fn variant(&self, name: &str) -> Option<(usize, &Variant)> {
        self.variants
            .iter()
            .enumerate()
            .find(|(_, v)| v.name == name)
    }

    /// True when no variant carries a payload.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.variants
            .iter()
            .all(|v| matches!(v.fields, VariantFields::Unit))
    }

    /// Width when every variant payload is fixed and equally wide.
    #[must_use]
    pub fn byte_size(&self) -> Option<usize> {
        let mut payload: Option<usize> = None;
        for variant in &self.variants {
            let size = variant.fields.byte_size()?;
            match payload {
                Some(existing) if existing != size => return None,
                _ => payload = Some(size),
            }
        }
        Some(self.tag.len() + payload.unwrap_or(0))
    }
}

impl Schema {
    /// Struct schema from `(name, schema)` pairs.
    #[must_use]
    pub fn structure<N, I>(name: impl Into<String>, fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Schema)>,
    {
        Self::Struct(StructSchema::new(name, fields))
    }

    /// Enum whose variants carry no payload.
    #[must_use]
    pub fn scalar_enum<N, I>(name: impl Into<String>, variants: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = N>,
    {
        Self::Enum(EnumSchema::new(
            name,
            variants.into_iter().map(Variant::unit).collect(),
        ))
    }

    /// Enum with arbitrary variants.
    #[must_use]
    pub fn data_enum(name: impl Into<String>, variants: Vec<Variant>) -> Self {
        Self::Enum(EnumSchema::new(name, variants))
    }

    /// `Option<inner>` with a one-byte flag.
    #[must_use]
    pub fn option(inner: Schema) -> Self {
        Self::Option(Box::new(inner))
    }

    /// `COption<inner>` with a four-byte flag.
    #[must_use]
    pub fn coption(inner: Schema) -> Self {
        Self::COption(Box::new(inner))
    }

    /// Fixed-length array.
    #[must_use]
    pub fn array(element: Schema, len: usize) -> Self {
        Self::Array(Box::new(element), len)
    }

    /// Length-prefixed vector.
    #[must_use]
    pub fn vec(element: Schema) -> Self {
        Self::Vec(Box::new(element))
    }

    /// Serialized width when it does not depend on the value, `None` otherwise.
    #[must_use]
    pub fn byte_size(&self) -> Option<usize> {
        match self {
            Self::U8 | Self::I8 | Self::Bool => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 => Some(4),
            Self::U64 | Self::I64 => Some(8),
            Self::U128 | Self::I128 => Some(16),
            Self::PublicKey => Some(PUBKEY_LEN),
            Self::FixedBytes(len) => Some(*len),
            Self::String | Self::Option(_) | Self::COption(_) | Self::Vec(_) => None,
            Self::Array(element, len) => element.byte_size().map(|w| w * len),
            Self::Struct(s) => s.byte_size(),
            Self::Enum(e) => e.byte_size(),
        }
    }

    /// True when [`Schema::byte_size`] is known without a value.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        self.byte_size().is_some()
    }

    /// Type name for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::U128 => write!(f, "u128"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::I128 => write!(f, "i128"),
            Self::Bool => write!(f, "bool"),
            Self::PublicKey => write!(f, "publicKey"),
            Self::FixedBytes(len) => write!(f, "[u8; {}]", len),
            Self::String => write!(f, "string"),
            Self::Option(inner) => write!(f, "Option<{}>", inner),
            Self::COption(inner) => write!(f, "COption<{}>", inner),
            Self::Array(element, len) => write!(f, "[{}; {}]", element, len),
            Self::Vec(element) => write!(f, "Vec<{}>", element),
            Self::Struct(s) => write!(f, "{}", s.name),
            Self::Enum(e) => write!(f, "{}", e.name),
        }
    }
}
