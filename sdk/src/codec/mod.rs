//! Schema-driven binary codec.
//!
//! One generic engine interprets [`Schema`] tables at runtime:
//!
//! - [`primitive`] - fixed-width scalars, public keys, fixed byte arrays
//! - [`encode`] - composite encoding and the size pre-computation pass
//! - [`decode`] - composite decoding with offset tracking
//! - [`json`] - schema-guided JSON conversion
//!
//! # Example
//!
//! ```rust
//! use mplex_sdk::codec::{self, Schema, Value};
//!
//! let schema = Schema::structure(
//!     "BotTax",
//!     [("lamports", Schema::U64), ("last_instruction", Schema::Bool)],
//! );
//! let value = Value::structure([
//!     ("lamports", Value::U64(1_000_000)),
//!     ("last_instruction", Value::Bool(true)),
//! ]);
//!
//! let bytes = codec::encode(&schema, &value).unwrap();
//! assert_eq!(bytes.len(), 9);
//! let (decoded, consumed) = codec::decode(&schema, &bytes, 0).unwrap();
//! assert_eq!(decoded, value);
//! assert_eq!(consumed, 9);
//! ```

pub mod decode;
pub mod encode;
pub mod json;
pub mod path;
pub mod primitive;
pub mod schema;
pub mod value;

pub use decode::{decode, decode_exact, decode_struct};
pub use encode::{compute_size, compute_struct_size, encode, encode_into, encode_struct_into};
pub use path::FieldPath;
pub use schema::{EnumSchema, Field, Schema, StructSchema, TagWidth, Variant, VariantFields};
pub use value::{EnumValue, Value};
