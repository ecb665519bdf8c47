//! Schema-guided conversion between [`Value`] and JSON.
//!
//! Public keys are base58 strings, byte sequences are hex strings (arrays of
//! numbers are accepted on input), 128-bit integers are decimal strings, and enum
//! values are either `"Variant"` or `{"Variant": payload}`.

use std::str::FromStr;

use serde_json::{Map, Number, Value as Json};
use solana_sdk::pubkey::Pubkey;

use super::path::FieldPath;
use super::schema::{EnumSchema, Field, Schema, VariantFields};
use super::value::{EnumValue, Value};
use crate::error::SdkError;

/// Renders a value as JSON.
///
/// # Errors
///
/// Returns `SchemaMismatch` when the value does not have the schema's shape.
pub fn to_json(schema: &Schema, value: &Value) -> Result<Json, SdkError> {
    let mut path = FieldPath::root();
    render(schema, value, &mut path)
}

/// Parses JSON into a value of the given schema.
///
/// # Errors
///
/// Returns `SchemaMismatch` naming the field whose JSON does not fit.
pub fn from_json(schema: &Schema, json: &Json) -> Result<Value, SdkError> {
    let mut path = FieldPath::root();
    parse(schema, json, &mut path)
}

/// Parses a JSON object into a struct value with the given fields.
///
/// # Errors
///
/// See [`from_json`].
pub fn fields_from_json(fields: &[Field], json: &Json) -> Result<Value, SdkError> {
    let mut path = FieldPath::root();
    parse_fields("arguments", fields, json, &mut path)
}

/// Renders a struct value with the given fields.
///
/// # Errors
///
/// See [`to_json`].
pub fn fields_to_json(fields: &[Field], value: &Value) -> Result<Json, SdkError> {
    let mut path = FieldPath::root();
    render_fields(fields, value, &mut path)
}

fn mismatch(path: &FieldPath, expected: impl Into<String>, found: impl Into<String>) -> SdkError {
    SdkError::mismatch(path.to_string(), expected, found)
}

fn render(schema: &Schema, value: &Value, path: &mut FieldPath) -> Result<Json, SdkError> {
    Ok(match (schema, value) {
        (_, Value::U8(v)) => Json::from(*v),
        (_, Value::U16(v)) => Json::from(*v),
        (_, Value::U32(v)) => Json::from(*v),
        (_, Value::U64(v)) => Json::from(*v),
        (_, Value::I8(v)) => Json::from(*v),
        (_, Value::I16(v)) => Json::from(*v),
        (_, Value::I32(v)) => Json::from(*v),
        (_, Value::I64(v)) => Json::from(*v),
        (_, Value::U128(v)) => Json::String(v.to_string()),
        (_, Value::I128(v)) => Json::String(v.to_string()),
        (_, Value::Bool(v)) => Json::Bool(*v),
        (_, Value::PublicKey(key)) => Json::String(key.to_string()),
        (_, Value::Bytes(bytes)) => Json::String(hex::encode(bytes)),
        (_, Value::String(s)) => Json::String(s.clone()),
        (Schema::Option(inner) | Schema::COption(inner), Value::Option(v)) => match v {
            Some(v) => render(inner, v, path)?,
            None => Json::Null,
        },
        (Schema::Array(element, _) | Schema::Vec(element), Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push_index(i);
                out.push(render(element, item, path)?);
                path.pop();
            }
            Json::Array(out)
        }
        (Schema::Struct(s), Value::Struct(_)) => render_fields(&s.fields, value, path)?,
        (Schema::Enum(e), Value::Enum(v)) => render_enum(e, v, path)?,
        (schema, value) => return Err(mismatch(path, schema.to_string(), value.kind())),
    })
}

fn render_fields(fields: &[Field], value: &Value, path: &mut FieldPath) -> Result<Json, SdkError> {
    let mut map = Map::new();
    for field in fields {
        let v = value
            .field(&field.name)
            .ok_or_else(|| mismatch(path, format!("field `{}`", field.name), "missing field"))?;
        path.push_field(&field.name);
        map.insert(field.name.clone(), render(&field.schema, v, path)?);
        path.pop();
    }
    // Surplus entries are repeats or unknown fields.
    if let Value::Struct(given) = value {
        if given.len() != fields.len() {
            return Err(mismatch(
                path,
                format!("{} fields", fields.len()),
                format!("{} fields", given.len()),
            ));
        }
    }
    Ok(Json::Object(map))
}

fn render_enum(schema: &EnumSchema, value: &EnumValue, path: &mut FieldPath) -> Result<Json, SdkError> {
    let (_, variant) = schema
        .variant(&value.variant)
        .ok_or_else(|| mismatch(path, format!("variant of {}", schema.name), value.variant.clone()))?;
    let payload = match (&variant.fields, value.payload.as_deref()) {
        (VariantFields::Unit, _) => return Ok(Json::String(variant.name.clone())),
        (VariantFields::Tuple(items), Some(Value::Array(values))) => {
            let mut out = Vec::with_capacity(values.len());
            for (i, (s, v)) in items.iter().zip(values).enumerate() {
                path.push_index(i);
                out.push(render(s, v, path)?);
                path.pop();
            }
            Json::Array(out)
        }
        (VariantFields::Named(fields), Some(payload)) => render_fields(fields, payload, path)?,
        (_, other) => {
            return Err(mismatch(
                path,
                format!("payload of {}", variant.name),
                other.map_or_else(|| "no payload".to_string(), Value::kind),
            ))
        }
    };
    let mut map = Map::new();
    map.insert(variant.name.clone(), payload);
    Ok(Json::Object(map))
}

fn integer(json: &Json, path: &FieldPath, schema: &Schema) -> Result<i128, SdkError> {
    let parsed = match json {
        Json::Number(n) => number_to_i128(n),
        Json::String(s) => i128::from_str(s.trim()).ok(),
        _ => None,
    };
    parsed.ok_or_else(|| mismatch(path, schema.to_string(), json.to_string()))
}

fn number_to_i128(n: &Number) -> Option<i128> {
    n.as_u64()
        .map(i128::from)
        .or_else(|| n.as_i64().map(i128::from))
}

macro_rules! int_value {
    ($ty:ty, $variant:ident, $json:expr, $path:expr, $schema:expr) => {{
        let wide = integer($json, $path, $schema)?;
        Value::$variant(<$ty>::try_from(wide).map_err(|_| {
            mismatch($path, $schema.to_string(), format!("{} (out of range)", wide))
        })?)
    }};
}

fn bytes(json: &Json, len: Option<usize>, path: &FieldPath) -> Result<Vec<u8>, SdkError> {
    let expected = || match len {
        Some(n) => format!("{} bytes", n),
        None => "bytes".to_string(),
    };
    let out = match json {
        Json::String(s) => hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| mismatch(path, expected(), format!("invalid hex: {}", e)))?,
        Json::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| mismatch(path, expected(), item.to_string()))
            })
            .collect::<Result<Vec<u8>, SdkError>>()?,
        other => return Err(mismatch(path, expected(), other.to_string())),
    };
    if let Some(n) = len {
        if out.len() != n {
            return Err(mismatch(path, expected(), format!("{} bytes", out.len())));
        }
    }
    Ok(out)
}

fn parse(schema: &Schema, json: &Json, path: &mut FieldPath) -> Result<Value, SdkError> {
    Ok(match schema {
        Schema::U8 => int_value!(u8, U8, json, path, schema),
        Schema::U16 => int_value!(u16, U16, json, path, schema),
        Schema::U32 => int_value!(u32, U32, json, path, schema),
        Schema::U64 => int_value!(u64, U64, json, path, schema),
        Schema::I8 => int_value!(i8, I8, json, path, schema),
        Schema::I16 => int_value!(i16, I16, json, path, schema),
        Schema::I32 => int_value!(i32, I32, json, path, schema),
        Schema::I64 => int_value!(i64, I64, json, path, schema),
        Schema::I128 => int_value!(i128, I128, json, path, schema),
        Schema::U128 => match json {
            Json::String(s) => Value::U128(
                u128::from_str(s.trim()).map_err(|_| mismatch(path, "u128", json.to_string()))?,
            ),
            Json::Number(n) => Value::U128(u128::from(
                n.as_u64().ok_or_else(|| mismatch(path, "u128", json.to_string()))?,
            )),
            other => return Err(mismatch(path, "u128", other.to_string())),
        },
        Schema::Bool => Value::Bool(
            json.as_bool()
                .ok_or_else(|| mismatch(path, "bool", json.to_string()))?,
        ),
        Schema::PublicKey => {
            let s = json
                .as_str()
                .ok_or_else(|| mismatch(path, "base58 publicKey", json.to_string()))?;
            Value::PublicKey(
                Pubkey::from_str(s).map_err(|_| mismatch(path, "base58 publicKey", s))?,
            )
        }
        Schema::FixedBytes(len) => Value::Bytes(bytes(json, Some(*len), path)?),
        Schema::Array(element, len) if **element == Schema::U8 => {
            Value::Bytes(bytes(json, Some(*len), path)?)
        }
        Schema::Vec(element) if **element == Schema::U8 && json.is_string() => {
            Value::Bytes(bytes(json, None, path)?)
        }
        Schema::String => Value::String(
            json.as_str()
                .ok_or_else(|| mismatch(path, "string", json.to_string()))?
                .to_string(),
        ),
        Schema::Option(inner) | Schema::COption(inner) => match json {
            Json::Null => Value::none(),
            other => Value::some(parse(inner, other, path)?),
        },
        Schema::Array(element, len) => {
            let items = json
                .as_array()
                .ok_or_else(|| mismatch(path, format!("{} elements", len), json.to_string()))?;
            if items.len() != *len {
                return Err(mismatch(
                    path,
                    format!("{} elements", len),
                    format!("{} elements", items.len()),
                ));
            }
            parse_elements(element, items, path)?
        }
        Schema::Vec(element) => {
            let items = json
                .as_array()
                .ok_or_else(|| mismatch(path, "array", json.to_string()))?;
            let parsed = parse_elements(element, items, path)?;
            match (&**element, parsed) {
                (Schema::U8, Value::Array(values)) => Value::Bytes(
                    values
                        .into_iter()
                        .filter_map(|v| match v {
                            Value::U8(b) => Some(b),
                            _ => None,
                        })
                        .collect(),
                ),
                (_, parsed) => parsed,
            }
        }
        Schema::Struct(s) => parse_fields(&s.name, &s.fields, json, path)?,
        Schema::Enum(e) => parse_enum(e, json, path)?,
    })
}

fn parse_elements(element: &Schema, items: &[Json], path: &mut FieldPath) -> Result<Value, SdkError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        path.push_index(i);
        out.push(parse(element, item, path)?);
        path.pop();
    }
    Ok(Value::Array(out))
}

fn parse_fields(
    type_name: &str,
    fields: &[Field],
    json: &Json,
    path: &mut FieldPath,
) -> Result<Value, SdkError> {
    let object = json
        .as_object()
        .ok_or_else(|| mismatch(path, format!("object for {}", type_name), json.to_string()))?;
    if let Some(extra) = object.keys().find(|k| !fields.iter().any(|f| &f.name == *k)) {
        return Err(mismatch(
            path,
            format!("fields of {}", type_name),
            format!("unexpected field `{}`", extra),
        ));
    }
    let mut out = Vec::with_capacity(fields.len());
    for field in fields {
        path.push_field(&field.name);
        // Absent optional fields read as None.
        let v = match (object.get(&field.name), &field.schema) {
            (Some(j), schema) => parse(schema, j, path)?,
            (None, Schema::Option(_) | Schema::COption(_)) => Value::none(),
            (None, _) => {
                path.pop();
                return Err(mismatch(
                    path,
                    format!("field `{}` of {}", field.name, type_name),
                    "missing field",
                ));
            }
        };
        path.pop();
        out.push((field.name.clone(), v));
    }
    Ok(Value::Struct(out))
}

fn parse_enum(schema: &EnumSchema, json: &Json, path: &mut FieldPath) -> Result<Value, SdkError> {
    let (name, payload) = match json {
        Json::String(name) => (name.as_str(), None),
        Json::Object(map) if map.len() == 1 => match map.iter().next() {
            Some((name, payload)) => (name.as_str(), Some(payload)),
            None => return Err(mismatch(path, schema.name.clone(), json.to_string())),
        },
        other => return Err(mismatch(path, schema.name.clone(), other.to_string())),
    };
    let (_, variant) = schema
        .variant(name)
        .ok_or_else(|| mismatch(path, format!("variant of {}", schema.name), name))?;
    let payload = match (&variant.fields, payload) {
        (VariantFields::Unit, None | Some(Json::Null)) => None,
        (VariantFields::Tuple(items), Some(Json::Array(values))) if items.len() == values.len() => {
            let mut out = Vec::with_capacity(values.len());
            for (i, (s, v)) in items.iter().zip(values).enumerate() {
                path.push_index(i);
                out.push(parse(s, v, path)?);
                path.pop();
            }
            Some(Box::new(Value::Array(out)))
        }
        (VariantFields::Named(fields), Some(p)) => {
            Some(Box::new(parse_fields(&variant.name, fields, p, path)?))
        }
        (_, other) => {
            return Err(mismatch(
                path,
                format!("payload of {}::{}", schema.name, variant.name),
                other.map_or_else(|| "no payload".to_string(), Json::to_string),
            ))
        }
    };
    Ok(Value::Enum(EnumValue {
        variant: variant.name.clone(),
        payload,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::schema::Variant;
    use serde_json::json;

    fn creator() -> Schema {
        Schema::structure(
            "Creator",
            [
                ("address", Schema::PublicKey),
                ("verified", Schema::Bool),
                ("share", Schema::U8),
            ],
        )
    }

    #[test]
    fn test_struct_roundtrip() {
        let key = Pubkey::new_unique();
        let json = json!({ "address": key.to_string(), "verified": true, "share": 100 });
        let value = from_json(&creator(), &json).expect("should parse");
        assert_eq!(value.field("address"), Some(&Value::PublicKey(key)));
        assert_eq!(to_json(&creator(), &value).expect("should render"), json);
    }

    #[test]
    fn test_enum_forms() {
        let schema = Schema::data_enum(
            "CollectionDetails",
            vec![Variant::named("V1", [("size", Schema::U64)]), Variant::unit("None")],
        );
        let v = from_json(&schema, &json!({ "V1": { "size": 10 } })).expect("should parse");
        assert_eq!(
            v,
            Value::variant("V1", Value::structure([("size", Value::U64(10))]))
        );
        let unit = from_json(&schema, &json!("None")).expect("should parse");
        assert_eq!(to_json(&schema, &unit).expect("should render"), json!("None"));
    }

    #[test]
    fn test_bytes_hex_and_array() {
        let schema = Schema::array(Schema::U8, 3);
        assert_eq!(
            from_json(&schema, &json!("0a0b0c")).expect("should parse"),
            Value::Bytes(vec![10, 11, 12])
        );
        assert_eq!(
            from_json(&schema, &json!([1, 2, 3])).expect("should parse"),
            Value::Bytes(vec![1, 2, 3])
        );
        assert!(from_json(&schema, &json!([1, 2])).is_err());
    }

    #[test]
    fn test_large_integers_as_strings() {
        let v = from_json(&Schema::U128, &json!("340282366920938463463374607431768211455"))
            .expect("should parse");
        assert_eq!(v, Value::U128(u128::MAX));
        assert_eq!(
            from_json(&Schema::U64, &json!("18446744073709551615")).expect("should parse"),
            Value::U64(u64::MAX)
        );
        assert!(from_json(&Schema::U8, &json!(256)).is_err());
    }

    #[test]
    fn test_absent_optional_field_is_none() {
        let schema = Schema::structure(
            "Args",
            [("amount", Schema::U64), ("max", Schema::option(Schema::U64))],
        );
        let v = from_json(&schema, &json!({ "amount": 1 })).expect("should parse");
        assert_eq!(v.field("max"), Some(&Value::none()));
    }

    #[test]
    fn test_render_rejects_repeated_field() {
        let fields = [Field::new("a", Schema::U8)];
        let value = Value::Struct(vec![
            ("a".to_string(), Value::U8(1)),
            ("a".to_string(), Value::U8(2)),
        ]);
        let err = fields_to_json(&fields, &value).expect_err("should reject");
        assert!(matches!(err, SdkError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_missing_field_path() {
        let schema = Schema::structure("Outer", [("inner", creator())]);
        let err = from_json(&schema, &json!({ "inner": { "verified": true, "share": 1 } }))
            .expect_err("should reject");
        match err {
            SdkError::SchemaMismatch { path, .. } => assert_eq!(path, "inner"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
