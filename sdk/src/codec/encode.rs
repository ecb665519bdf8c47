//! Composite encoder and size pre-computation.

use super::path::FieldPath;
use super::primitive::{encode_primitive, is_primitive};
use super::schema::{EnumSchema, Field, Schema, StructSchema, TagWidth, VariantFields, LEN_PREFIX};
use super::value::{EnumValue, Value};
use crate::error::SdkError;

/// Encodes `value` under `schema` into a freshly allocated buffer.
///
/// The buffer is sized once by [`compute_size`] before anything is written.
///
/// # Errors
///
/// Returns `SchemaMismatch` or `EncodingOverflow` naming the offending field.
pub fn encode(schema: &Schema, value: &Value) -> Result<Vec<u8>, SdkError> {
    let size = compute_size(schema, value)?;
    let mut out = Vec::with_capacity(size);
    encode_into(schema, value, &mut out)?;
    Ok(out)
}

/// Appends the encoding of `value` to `out`.
///
/// # Errors
///
/// Returns `SchemaMismatch` or `EncodingOverflow` naming the offending field.
pub fn encode_into(schema: &Schema, value: &Value, out: &mut Vec<u8>) -> Result<(), SdkError> {
    let mut encoder = Encoder {
        out,
        path: FieldPath::root(),
    };
    encoder.value(schema, value)
}

/// Appends a struct encoding (used for instruction arguments).
///
/// # Errors
///
/// Returns `SchemaMismatch` or `EncodingOverflow` naming the offending field.
pub fn encode_struct_into(
    schema: &StructSchema,
    value: &Value,
    out: &mut Vec<u8>,
) -> Result<(), SdkError> {
    let mut encoder = Encoder {
        out,
        path: FieldPath::root(),
    };
    encoder.structure(&schema.name, &schema.fields, value)
}

/// Number of bytes `value` occupies under `schema`.
///
/// Fixed-size schemas answer without inspecting the value.
///
/// # Errors
///
/// Returns `SchemaMismatch` when the value does not have the schema's shape.
pub fn compute_size(schema: &Schema, value: &Value) -> Result<usize, SdkError> {
    let mut path = FieldPath::root();
    size_of(schema, value, &mut path)
}

/// Size of a struct value, see [`compute_size`].
///
/// # Errors
///
/// Returns `SchemaMismatch` when the value does not have the schema's shape.
pub fn compute_struct_size(schema: &StructSchema, value: &Value) -> Result<usize, SdkError> {
    if let Some(size) = schema.byte_size() {
        return Ok(size);
    }
    let mut path = FieldPath::root();
    fields_size(&schema.name, &schema.fields, value, &mut path)
}

fn size_of(schema: &Schema, value: &Value, path: &mut FieldPath) -> Result<usize, SdkError> {
    if let Some(size) = schema.byte_size() {
        return Ok(size);
    }
    match (schema, value) {
        (Schema::String, Value::String(s)) => Ok(LEN_PREFIX + s.len()),
        (Schema::Option(inner), Value::Option(v)) => Ok(1 + optional_size(inner, v, path)?),
        (Schema::COption(inner), Value::Option(v)) => Ok(4 + optional_size(inner, v, path)?),
        (Schema::Array(element, len), Value::Array(items)) => {
            if items.len() != *len {
                return Err(SdkError::mismatch(
                    path.to_string(),
                    format!("{} elements", len),
                    value.kind(),
                ));
            }
            elements_size(element, items, path)
        }
        (Schema::Vec(element), Value::Array(items)) => {
            Ok(LEN_PREFIX + elements_size(element, items, path)?)
        }
        (Schema::Vec(element), Value::Bytes(bytes)) if **element == Schema::U8 => {
            Ok(LEN_PREFIX + bytes.len())
        }
        (Schema::Struct(s), _) => fields_size(&s.name, &s.fields, value, path),
        (Schema::Enum(e), Value::Enum(v)) => enum_size(e, v, path),
        (schema, value) => Err(SdkError::mismatch(
            path.to_string(),
            schema.to_string(),
            value.kind(),
        )),
    }
}

fn optional_size(
    inner: &Schema,
    value: &Option<Box<Value>>,
    path: &mut FieldPath,
) -> Result<usize, SdkError> {
    match value {
        Some(v) => size_of(inner, v, path),
        None => Ok(0),
    }
}

fn elements_size(element: &Schema, items: &[Value], path: &mut FieldPath) -> Result<usize, SdkError> {
    if let Some(width) = element.byte_size() {
        return Ok(width * items.len());
    }
    let mut total = 0usize;
    for (i, item) in items.iter().enumerate() {
        path.push_index(i);
        total += size_of(element, item, path)?;
        path.pop();
    }
    Ok(total)
}

fn fields_size(
    type_name: &str,
    fields: &[Field],
    value: &Value,
    path: &mut FieldPath,
) -> Result<usize, SdkError> {
    let mut total = 0usize;
    for field in fields {
        let v = struct_field(type_name, field, value, path)?;
        path.push_field(&field.name);
        total += size_of(&field.schema, v, path)?;
        path.pop();
    }
    Ok(total)
}

fn enum_size(schema: &EnumSchema, value: &EnumValue, path: &mut FieldPath) -> Result<usize, SdkError> {
    let (_, variant) = schema.variant(&value.variant).ok_or_else(|| {
        SdkError::mismatch(
            path.to_string(),
            format!("variant of {}", schema.name),
            value.variant.clone(),
        )
    })?;
    let payload = match (&variant.fields, value.payload.as_deref()) {
        (VariantFields::Unit, None) => 0,
        (VariantFields::Tuple(items), Some(Value::Array(values))) if items.len() == values.len() => {
            let mut total = 0usize;
            for (i, (s, v)) in items.iter().zip(values).enumerate() {
                path.push_index(i);
                total += size_of(s, v, path)?;
                path.pop();
            }
            total
        }
        (VariantFields::Named(fields), Some(payload)) => {
            fields_size(&variant.name, fields, payload, path)?
        }
        (_, payload) => {
            return Err(SdkError::mismatch(
                path.to_string(),
                format!("payload of {}::{}", schema.name, variant.name),
                payload.map_or_else(|| "no payload".to_string(), Value::kind),
            ))
        }
    };
    Ok(schema.tag.len() + payload)
}

/// Finds the value bound to `field`, rejecting non-struct values.
fn struct_field<'v>(
    type_name: &str,
    field: &Field,
    value: &'v Value,
    path: &FieldPath,
) -> Result<&'v Value, SdkError> {
    match value {
        Value::Struct(_) => value.field(&field.name).ok_or_else(|| {
            SdkError::mismatch(
                path.to_string(),
                format!("field `{}` of {}", field.name, type_name),
                "missing field",
            )
        }),
        other => Err(SdkError::mismatch(path.to_string(), type_name, other.kind())),
    }
}

struct Encoder<'a> {
    out: &'a mut Vec<u8>,
    path: FieldPath,
}

impl Encoder<'_> {
    fn value(&mut self, schema: &Schema, value: &Value) -> Result<(), SdkError> {
        if is_primitive(schema) {
            return encode_primitive(schema, value, &self.path, self.out);
        }
        match (schema, value) {
            (Schema::String, Value::String(s)) => {
                self.len_prefix(s.len())?;
                self.out.extend_from_slice(s.as_bytes());
                Ok(())
            }
            (Schema::Option(inner), Value::Option(v)) => {
                self.out.push(u8::from(v.is_some()));
                match v {
                    Some(inner_value) => self.value(inner, inner_value),
                    None => Ok(()),
                }
            }
            (Schema::COption(inner), Value::Option(v)) => {
                self.out
                    .extend_from_slice(&u32::from(v.is_some()).to_le_bytes());
                match v {
                    Some(inner_value) => self.value(inner, inner_value),
                    None => Ok(()),
                }
            }
            (Schema::Array(element, len), Value::Array(items)) => {
                if items.len() != *len {
                    return Err(SdkError::mismatch(
                        self.path.to_string(),
                        format!("{} elements", len),
                        value.kind(),
                    ));
                }
                self.elements(element, items)
            }
            (Schema::Array(element, len), Value::Bytes(bytes)) if **element == Schema::U8 => {
                if bytes.len() != *len {
                    return Err(SdkError::mismatch(
                        self.path.to_string(),
                        format!("{} elements", len),
                        value.kind(),
                    ));
                }
                self.out.extend_from_slice(bytes);
                Ok(())
            }
            (Schema::Vec(element), Value::Array(items)) => {
                self.len_prefix(items.len())?;
                self.elements(element, items)
            }
            (Schema::Vec(element), Value::Bytes(bytes)) if **element == Schema::U8 => {
                self.len_prefix(bytes.len())?;
                self.out.extend_from_slice(bytes);
                Ok(())
            }
            (Schema::Struct(s), _) => self.structure(&s.name, &s.fields, value),
            (Schema::Enum(e), Value::Enum(v)) => self.enumeration(e, v),
            (schema, value) => Err(SdkError::mismatch(
                self.path.to_string(),
                schema.to_string(),
                value.kind(),
            )),
        }
    }

    fn len_prefix(&mut self, len: usize) -> Result<(), SdkError> {
        let prefix = u32::try_from(len).map_err(|_| SdkError::EncodingOverflow {
            path: self.path.to_string(),
            length: len,
            max: u64::from(u32::MAX),
        })?;
        self.out.extend_from_slice(&prefix.to_le_bytes());
        Ok(())
    }

    fn elements(&mut self, element: &Schema, items: &[Value]) -> Result<(), SdkError> {
        for (i, item) in items.iter().enumerate() {
            self.path.push_index(i);
            self.value(element, item)?;
            self.path.pop();
        }
        Ok(())
    }

    fn structure(&mut self, type_name: &str, fields: &[Field], value: &Value) -> Result<(), SdkError> {
        if let Value::Struct(given) = value {
            if let Some((extra, _)) = given
                .iter()
                .find(|(name, _)| !fields.iter().any(|f| &f.name == name))
            {
                return Err(SdkError::mismatch(
                    self.path.to_string(),
                    format!("fields of {}", type_name),
                    format!("unexpected field `{}`", extra),
                ));
            }
            if let Some((repeated, _)) = given
                .iter()
                .enumerate()
                .find_map(|(i, (name, _))| given.iter().take(i).find(|(seen, _)| seen == name))
            {
                return Err(SdkError::mismatch(
                    self.path.to_string(),
                    format!("fields of {}", type_name),
                    format!("duplicate field `{}`", repeated),
                ));
            }
        }
        for field in fields {
            let v = struct_field(type_name, field, value, &self.path)?;
            self.path.push_field(&field.name);
            self.value(&field.schema, v)?;
            self.path.pop();
        }
        Ok(())
    }

    fn enumeration(&mut self, schema: &EnumSchema, value: &EnumValue) -> Result<(), SdkError> {
        let (index, variant) = schema.variant(&value.variant).ok_or_else(|| {
            SdkError::mismatch(
                self.path.to_string(),
                format!("variant of {}", schema.name),
                value.variant.clone(),
            )
        })?;
        self.tag(schema.tag, index)?;
        match (&variant.fields, value.payload.as_deref()) {
            (VariantFields::Unit, None) => Ok(()),
            (VariantFields::Tuple(items), Some(Value::Array(values)))
                if items.len() == values.len() =>
            {
                for (i, (s, v)) in items.iter().zip(values).enumerate() {
                    self.path.push_index(i);
                    self.value(s, v)?;
                    self.path.pop();
                }
                Ok(())
            }
            (VariantFields::Named(fields), Some(payload)) => {
                self.structure(&variant.name, fields, payload)
            }
            (_, payload) => Err(SdkError::mismatch(
                self.path.to_string(),
                format!("payload of {}::{}", schema.name, variant.name),
                payload.map_or_else(|| "no payload".to_string(), Value::kind),
            )),
        }
    }

    fn tag(&mut self, width: TagWidth, index: usize) -> Result<(), SdkError> {
        let path = &self.path;
        let overflow = || SdkError::EncodingOverflow {
            path: path.to_string(),
            length: index,
            max: width.max(),
        };
        match width {
            TagWidth::U8 => self.out.push(u8::try_from(index).map_err(|_| overflow())?),
            TagWidth::U16 => self
                .out
                .extend_from_slice(&u16::try_from(index).map_err(|_| overflow())?.to_le_bytes()),
            TagWidth::U32 => self
                .out
                .extend_from_slice(&u32::try_from(index).map_err(|_| overflow())?.to_le_bytes()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::schema::Variant;

    fn bot_tax() -> Schema {
        Schema::structure(
            "BotTax",
            [("lamports", Schema::U64), ("last_instruction", Schema::Bool)],
        )
    }

    #[test]
    fn test_bot_tax_nine_bytes() {
        let value = Value::structure([
            ("lamports", Value::U64(1_000_000)),
            ("last_instruction", Value::Bool(true)),
        ]);
        let bytes = encode(&bot_tax(), &value).expect("should encode");
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[8], 0x01);
        assert_eq!(bytes[..8], 1_000_000u64.to_le_bytes());
    }

    #[test]
    fn test_string_hello() {
        let bytes = encode(&Schema::String, &Value::from("hello")).expect("should encode");
        assert_eq!(bytes, vec![0x05, 0, 0, 0, b'h', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn test_field_order_changes_bytes() {
        let reordered = Schema::structure(
            "BotTax",
            [("last_instruction", Schema::Bool), ("lamports", Schema::U64)],
        );
        let value = Value::structure([
            ("lamports", Value::U64(1_000_000)),
            ("last_instruction", Value::Bool(true)),
        ]);
        let a = encode(&bot_tax(), &value).expect("should encode");
        let b = encode(&reordered, &value).expect("should encode");
        assert_ne!(a, b);
        assert_eq!(b[0], 0x01);
    }

    #[test]
    fn test_option_and_coption_flags() {
        let some = Value::some(Value::U64(5));
        let opt = encode(&Schema::option(Schema::U64), &some).expect("should encode");
        assert_eq!(opt.len(), 9);
        assert_eq!(opt[0], 1);

        let copt = encode(&Schema::coption(Schema::U64), &some).expect("should encode");
        assert_eq!(copt.len(), 12);
        assert_eq!(copt[..4], [1, 0, 0, 0]);

        let none = encode(&Schema::coption(Schema::U64), &Value::none()).expect("should encode");
        assert_eq!(none, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_vec_count_prefix() {
        let bytes = encode(&Schema::vec(Schema::U16), &Value::from(vec![1u16, 2, 3]))
            .expect("should encode");
        assert_eq!(bytes, vec![3, 0, 0, 0, 1, 0, 2, 0, 3, 0]);
    }

    #[test]
    fn test_fixed_array_wrong_length() {
        let err = encode(&Schema::array(Schema::U8, 32), &Value::Bytes(vec![0; 4]))
            .expect_err("should reject");
        assert!(matches!(err, SdkError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_missing_field_names_path() {
        let schema = Schema::structure(
            "Outer",
            [("inner", bot_tax())],
        );
        let value = Value::structure([(
            "inner",
            Value::structure([("lamports", Value::U64(1))]),
        )]);
        let err = encode(&schema, &value).expect_err("should reject");
        match err {
            SdkError::SchemaMismatch { path, expected, .. } => {
                assert_eq!(path, "inner");
                assert!(expected.contains("last_instruction"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_field_rejected() {
        let value = Value::structure([
            ("lamports", Value::U64(1)),
            ("last_instruction", Value::Bool(false)),
            ("extra", Value::U8(0)),
        ]);
        let err = encode(&bot_tax(), &value).expect_err("should reject");
        assert!(matches!(err, SdkError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let schema = Schema::structure("Single", [("a", Schema::U8)]);
        let value = Value::Struct(vec![
            ("a".to_string(), Value::U8(1)),
            ("a".to_string(), Value::U8(2)),
        ]);
        let err = encode(&schema, &value).expect_err("should reject");
        match err {
            SdkError::SchemaMismatch { path, found, .. } => {
                assert_eq!(path, "<root>");
                assert!(found.contains("duplicate field `a`"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_data_enum_encoding() {
        let schema = Schema::data_enum(
            "Payload",
            vec![
                Variant::unit("Empty"),
                Variant::tuple("Amount", vec![Schema::U64]),
                Variant::named("Named", [("flag", Schema::Bool)]),
            ],
        );
        let amount = Value::variant("Amount", Value::Array(vec![Value::U64(9)]));
        assert_eq!(
            encode(&schema, &amount).expect("should encode"),
            vec![1, 9, 0, 0, 0, 0, 0, 0, 0]
        );
        let named = Value::variant("Named", Value::structure([("flag", Value::Bool(true))]));
        assert_eq!(encode(&schema, &named).expect("should encode"), vec![2, 1]);
        assert_eq!(
            encode(&schema, &Value::unit_variant("Empty")).expect("should encode"),
            vec![0]
        );
    }

    #[test]
    fn test_unknown_variant_name_rejected() {
        let schema = Schema::scalar_enum("Side", ["Bid", "Ask"]);
        let err = encode(&schema, &Value::unit_variant("Mid")).expect_err("should reject");
        assert!(matches!(err, SdkError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_compute_size_matches_encoding() {
        let schema = Schema::structure(
            "HiddenSettings",
            [
                ("name", Schema::String),
                ("uri", Schema::String),
                ("hash", Schema::array(Schema::U8, 32)),
            ],
        );
        let value = Value::structure([
            ("name", Value::from("Hidden #")),
            ("uri", Value::from("https://example.com")),
            ("hash", Value::Bytes(vec![7; 32])),
        ]);
        let size = compute_size(&schema, &value).expect("should size");
        let bytes = encode(&schema, &value).expect("should encode");
        assert_eq!(size, bytes.len());
        assert_eq!(size, 4 + 8 + 4 + 19 + 32);
    }

    #[test]
    fn test_nested_index_path() {
        let schema = Schema::vec(bot_tax());
        let value = Value::Array(vec![
            Value::structure([
                ("lamports", Value::U64(1)),
                ("last_instruction", Value::Bool(true)),
            ]),
            Value::structure([
                ("lamports", Value::U64(1)),
                ("last_instruction", Value::U8(1)),
            ]),
        ]);
        let err = encode(&schema, &value).expect_err("should reject");
        match err {
            SdkError::SchemaMismatch { path, .. } => assert_eq!(path, "[1].last_instruction"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
