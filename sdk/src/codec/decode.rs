//! Composite decoder.

use super::path::FieldPath;
use super::primitive::{decode_primitive, is_primitive, read_u32, take};
use super::schema::{EnumSchema, Field, Schema, StructSchema, TagWidth, VariantFields};
use super::value::{EnumValue, Value};
use crate::error::SdkError;

/// Decodes a value at `offset`, returning it with the offset just past it.
///
/// # Errors
///
/// Returns `BufferUnderrun`, `UnknownVariant`, `InvalidBool` or `InvalidUtf8` naming
/// the field path and offset.
pub fn decode(schema: &Schema, data: &[u8], offset: usize) -> Result<(Value, usize), SdkError> {
    let mut decoder = Decoder {
        data,
        offset,
        path: FieldPath::root(),
    };
    let value = decoder.value(schema)?;
    Ok((value, decoder.offset))
}

/// Decodes a struct at `offset`, returning it with the offset just past it.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_struct(
    schema: &StructSchema,
    data: &[u8],
    offset: usize,
) -> Result<(Value, usize), SdkError> {
    let mut decoder = Decoder {
        data,
        offset,
        path: FieldPath::root(),
    };
    let value = decoder.fields(&schema.fields)?;
    Ok((value, decoder.offset))
}

/// Decodes a value that must span the whole buffer.
///
/// # Errors
///
/// Returns `TrailingBytes` when bytes are left over, otherwise see [`decode`].
pub fn decode_exact(schema: &Schema, data: &[u8]) -> Result<Value, SdkError> {
    let (value, consumed) = decode(schema, data, 0)?;
    if consumed != data.len() {
        return Err(SdkError::TrailingBytes {
            name: schema.to_string(),
            consumed,
            total: data.len(),
        });
    }
    Ok(value)
}

struct Decoder<'a> {
    data: &'a [u8],
    offset: usize,
    path: FieldPath,
}

impl Decoder<'_> {
    fn value(&mut self, schema: &Schema) -> Result<Value, SdkError> {
        if is_primitive(schema) {
            let (value, next) = decode_primitive(schema, self.data, self.offset, &self.path)?;
            self.offset = next;
            return Ok(value);
        }
        match schema {
            Schema::String => self.string(),
            Schema::Option(inner) => {
                let start = self.offset;
                let [flag] = self.array::<1>()?;
                self.optional(u64::from(flag), start, inner, schema)
            }
            Schema::COption(inner) => {
                let start = self.offset;
                let flag = self.u32()?;
                self.optional(u64::from(flag), start, inner, schema)
            }
            Schema::Array(element, len) => self.elements(element, *len),
            Schema::Vec(element) => {
                let start = self.offset;
                let count = self.u32()? as usize;
                if count > 0 && element.byte_size() == Some(0) {
                    return Err(SdkError::ZeroSizedElements {
                        path: self.path.to_string(),
                        count,
                        offset: start,
                    });
                }
                self.elements(element, count)
            }
            Schema::Struct(s) => self.fields(&s.fields),
            Schema::Enum(e) => self.enumeration(e),
            other => Err(SdkError::mismatch(
                self.path.to_string(),
                "decodable schema",
                other.to_string(),
            )),
        }
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], SdkError> {
        let bytes = take(self.data, self.offset, N, &self.path)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(bytes);
        self.offset += N;
        Ok(arr)
    }

    fn u32(&mut self) -> Result<u32, SdkError> {
        let v = read_u32(self.data, self.offset, &self.path)?;
        self.offset += 4;
        Ok(v)
    }

    fn string(&mut self) -> Result<Value, SdkError> {
        let len = self.u32()? as usize;
        let start = self.offset;
        let bytes = take(self.data, start, len, &self.path)?;
        let s = std::str::from_utf8(bytes).map_err(|_| SdkError::InvalidUtf8 {
            path: self.path.to_string(),
            offset: start,
        })?;
        self.offset += len;
        Ok(Value::String(s.to_string()))
    }

    fn optional(
        &mut self,
        flag: u64,
        start: usize,
        inner: &Schema,
        schema: &Schema,
    ) -> Result<Value, SdkError> {
        match flag {
            0 => Ok(Value::none()),
            1 => Ok(Value::some(self.value(inner)?)),
            other => Err(SdkError::UnknownVariant {
                path: self.path.to_string(),
                type_name: schema.to_string(),
                discriminant: other,
                offset: start,
            }),
        }
    }

    fn elements(&mut self, element: &Schema, count: usize) -> Result<Value, SdkError> {
        // Fixed-width runs are bounds-checked before allocating.
        if let Some(width) = element.byte_size() {
            let needed = width.saturating_mul(count);
            let bytes = take(self.data, self.offset, needed, &self.path)?;
            if *element == Schema::U8 {
                self.offset += count;
                return Ok(Value::Bytes(bytes.to_vec()));
            }
        }
        let mut items = Vec::with_capacity(count.min(self.data.len()));
        for i in 0..count {
            self.path.push_index(i);
            items.push(self.value(element)?);
            self.path.pop();
        }
        Ok(Value::Array(items))
    }

    fn fields(&mut self, fields: &[Field]) -> Result<Value, SdkError> {
        let mut out = Vec::with_capacity(fields.len());
        for field in fields {
            self.path.push_field(&field.name);
            let v = self.value(&field.schema)?;
            self.path.pop();
            out.push((field.name.clone(), v));
        }
        Ok(Value::Struct(out))
    }

    fn tag(&mut self, width: TagWidth) -> Result<u64, SdkError> {
        Ok(match width {
            TagWidth::U8 => {
                let [b] = self.array::<1>()?;
                u64::from(b)
            }
            TagWidth::U16 => u64::from(u16::from_le_bytes(self.array::<2>()?)),
            TagWidth::U32 => u64::from(self.u32()?),
        })
    }

    fn enumeration(&mut self, schema: &EnumSchema) -> Result<Value, SdkError> {
        let start = self.offset;
        let discriminant = self.tag(schema.tag)?;
        let variant = usize::try_from(discriminant)
            .ok()
            .and_then(|i| schema.variants.get(i))
            .ok_or_else(|| SdkError::UnknownVariant {
                path: self.path.to_string(),
                type_name: schema.name.clone(),
                discriminant,
                offset: start,
            })?;
        let payload = match &variant.fields {
            VariantFields::Unit => None,
            VariantFields::Tuple(items) => {
                let mut values = Vec::with_capacity(items.len());
                for (i, s) in items.iter().enumerate() {
                    self.path.push_index(i);
                    values.push(self.value(s)?);
                    self.path.pop();
                }
                Some(Box::new(Value::Array(values)))
            }
            VariantFields::Named(fields) => Some(Box::new(self.fields(fields)?)),
        };
        Ok(Value::Enum(EnumValue {
            variant: variant.name.clone(),
            payload,
        }))
    }
}
