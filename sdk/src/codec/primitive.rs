//! Primitive codec: fixed-width scalars, public keys and fixed byte arrays.
//!
//! Integers are little-endian two's complement. Integer values are accepted for any
//! integer schema as long as they fit the declared width.

use solana_sdk::pubkey::Pubkey;

use super::path::FieldPath;
use super::schema::{Schema, PUBKEY_LEN};
use super::value::Value;
use crate::error::SdkError;

/// True for schemas handled entirely by this module.
#[must_use]
pub fn is_primitive(schema: &Schema) -> bool {
    matches!(
        schema,
        Schema::U8
            | Schema::U16
            | Schema::U32
            | Schema::U64
            | Schema::U128
            | Schema::I8
            | Schema::I16
            | Schema::I32
            | Schema::I64
            | Schema::I128
            | Schema::Bool
            | Schema::PublicKey
            | Schema::FixedBytes(_)
    )
}

fn int_out_of_range(schema: &Schema, value: &Value, path: &FieldPath) -> SdkError {
    SdkError::mismatch(path.to_string(), schema.to_string(), value.kind())
}

macro_rules! narrow {
    ($ty:ty, $schema:expr, $value:expr, $path:expr) => {{
        let wide = $value
            .as_i128()
            .ok_or_else(|| int_out_of_range($schema, $value, $path))?;
        <$ty>::try_from(wide).map_err(|_| {
            SdkError::mismatch(
                $path.to_string(),
                $schema.to_string(),
                format!("{} (out of range)", wide),
            )
        })?
    }};
}

/// Appends the encoding of a primitive value.
///
/// # Errors
///
/// Returns `SchemaMismatch` when the value kind or range does not fit the schema.
pub fn encode_primitive(
    schema: &Schema,
    value: &Value,
    path: &FieldPath,
    out: &mut Vec<u8>,
) -> Result<(), SdkError> {
    match schema {
        Schema::U8 => out.push(narrow!(u8, schema, value, path)),
        Schema::U16 => out.extend_from_slice(&narrow!(u16, schema, value, path).to_le_bytes()),
        Schema::U32 => out.extend_from_slice(&narrow!(u32, schema, value, path).to_le_bytes()),
        Schema::U64 => out.extend_from_slice(&narrow!(u64, schema, value, path).to_le_bytes()),
        Schema::U128 => {
            let v = match value {
                Value::U128(v) => *v,
                other => narrow!(u128, schema, other, path),
            };
            out.extend_from_slice(&v.to_le_bytes());
        }
        Schema::I8 => out.extend_from_slice(&narrow!(i8, schema, value, path).to_le_bytes()),
        Schema::I16 => out.extend_from_slice(&narrow!(i16, schema, value, path).to_le_bytes()),
        Schema::I32 => out.extend_from_slice(&narrow!(i32, schema, value, path).to_le_bytes()),
        Schema::I64 => out.extend_from_slice(&narrow!(i64, schema, value, path).to_le_bytes()),
        Schema::I128 => out.extend_from_slice(&narrow!(i128, schema, value, path).to_le_bytes()),
        Schema::Bool => match value {
            Value::Bool(b) => out.push(u8::from(*b)),
            other => return Err(SdkError::mismatch(path.to_string(), "bool", other.kind())),
        },
        Schema::PublicKey => match value {
            Value::PublicKey(key) => out.extend_from_slice(key.as_ref()),
            Value::Bytes(bytes) if bytes.len() == PUBKEY_LEN => out.extend_from_slice(bytes),
            other => {
                return Err(SdkError::mismatch(path.to_string(), "publicKey", other.kind()))
            }
        },
        Schema::FixedBytes(len) => match value {
            Value::Bytes(bytes) if bytes.len() == *len => out.extend_from_slice(bytes),
            other => {
                return Err(SdkError::mismatch(
                    path.to_string(),
                    format!("{} bytes", len),
                    other.kind(),
                ))
            }
        },
        other => {
            return Err(SdkError::mismatch(
                path.to_string(),
                "primitive schema",
                other.to_string(),
            ))
        }
    }
    Ok(())
}

/// Borrows `len` bytes at `offset`.
///
/// # Errors
///
/// Returns `BufferUnderrun` when fewer than `len` bytes remain.
pub fn take<'a>(
    data: &'a [u8],
    offset: usize,
    len: usize,
    path: &FieldPath,
) -> Result<&'a [u8], SdkError> {
    let remaining = data.len().saturating_sub(offset);
    if remaining < len {
        return Err(SdkError::BufferUnderrun {
            path: path.to_string(),
            offset,
            needed: len,
            remaining,
        });
    }
    data.get(offset..offset + len)
        .ok_or_else(|| SdkError::BufferUnderrun {
            path: path.to_string(),
            offset,
            needed: len,
            remaining,
        })
}

fn take_array<const N: usize>(
    data: &[u8],
    offset: usize,
    path: &FieldPath,
) -> Result<[u8; N], SdkError> {
    let bytes = take(data, offset, N, path)?;
    let mut arr = [0u8; N];
    arr.copy_from_slice(bytes);
    Ok(arr)
}

/// Reads a little-endian `u32` length or flag.
///
/// # Errors
///
/// Returns `BufferUnderrun` when fewer than four bytes remain.
pub fn read_u32(data: &[u8], offset: usize, path: &FieldPath) -> Result<u32, SdkError> {
    Ok(u32::from_le_bytes(take_array::<4>(data, offset, path)?))
}

/// Decodes a primitive value at `offset`, returning it with the new offset.
///
/// Booleans are strict: only `0x00` and `0x01` are accepted.
///
/// # Errors
///
/// Returns `BufferUnderrun` on short input and `InvalidBool` on a bad bool byte.
pub fn decode_primitive(
    schema: &Schema,
    data: &[u8],
    offset: usize,
    path: &FieldPath,
) -> Result<(Value, usize), SdkError> {
    let value = match schema {
        Schema::U8 => Value::U8(u8::from_le_bytes(take_array(data, offset, path)?)),
        Schema::U16 => Value::U16(u16::from_le_bytes(take_array(data, offset, path)?)),
        Schema::U32 => Value::U32(u32::from_le_bytes(take_array(data, offset, path)?)),
        Schema::U64 => Value::U64(u64::from_le_bytes(take_array(data, offset, path)?)),
        Schema::U128 => Value::U128(u128::from_le_bytes(take_array(data, offset, path)?)),
        Schema::I8 => Value::I8(i8::from_le_bytes(take_array(data, offset, path)?)),
        Schema::I16 => Value::I16(i16::from_le_bytes(take_array(data, offset, path)?)),
        Schema::I32 => Value::I32(i32::from_le_bytes(take_array(data, offset, path)?)),
        Schema::I64 => Value::I64(i64::from_le_bytes(take_array(data, offset, path)?)),
        Schema::I128 => Value::I128(i128::from_le_bytes(take_array(data, offset, path)?)),
        Schema::Bool => {
            let [byte] = take_array::<1>(data, offset, path)?;
            match byte {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                byte => {
                    return Err(SdkError::InvalidBool {
                        path: path.to_string(),
                        offset,
                        byte,
                    })
                }
            }
        }
        Schema::PublicKey => {
            Value::PublicKey(Pubkey::new_from_array(take_array::<PUBKEY_LEN>(data, offset, path)?))
        }
        Schema::FixedBytes(len) => Value::Bytes(take(data, offset, *len, path)?.to_vec()),
        other => {
            return Err(SdkError::mismatch(
                path.to_string(),
                "primitive schema",
                other.to_string(),
            ))
        }
    };
    let width = schema.byte_size().unwrap_or(0);
    Ok((value, offset + width))
}
