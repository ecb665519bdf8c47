//! IDL loading.
//!
//! Parses Anchor and Shank IDL documents (the pre-0.30 JSON format emitted by
//! both toolchains) into a [`ProgramDefinition`]. Field, argument and account
//! names are converted to snake_case to match the built-in registry.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;

use crate::accounts::AccountLayout;
use crate::codec::{Schema, StructSchema, Variant};
use crate::discriminator::{anchor_instruction, to_snake_case, Discriminator};
use crate::error::SdkError;
use crate::instructions::{
    AccountSlot, InstructionDescriptor, Presence, ASSOCIATED_TOKEN_PROGRAM_ID,
    INSTRUCTIONS_SYSVAR_ID, RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use crate::registry::ProgramDefinition;

#[derive(Debug, Deserialize)]
struct Idl {
    name: String,
    #[serde(default)]
    instructions: Vec<IdlInstruction>,
    #[serde(default)]
    accounts: Vec<IdlTypeDef>,
    #[serde(default)]
    types: Vec<IdlTypeDef>,
    #[serde(default)]
    metadata: Option<IdlMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct IdlMetadata {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    origin: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdlInstruction {
    name: String,
    #[serde(default)]
    accounts: Vec<IdlAccountItem>,
    #[serde(default)]
    args: Vec<IdlField>,
    #[serde(default)]
    discriminant: Option<IdlDiscriminant>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdlAccountItem {
    Group { accounts: Vec<IdlAccountItem> },
    Account(IdlAccount),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdlAccount {
    name: String,
    #[serde(default)]
    is_mut: bool,
    #[serde(default)]
    is_signer: bool,
    #[serde(default)]
    is_optional: bool,
}

#[derive(Debug, Deserialize)]
struct IdlDiscriminant {
    #[serde(rename = "type")]
    ty: String,
    value: u64,
}

#[derive(Debug, Deserialize)]
struct IdlField {
    name: String,
    #[serde(rename = "type")]
    ty: IdlType,
}

#[derive(Debug, Deserialize)]
struct IdlTypeDef {
    name: String,
    #[serde(rename = "type")]
    ty: IdlTypeDefTy,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum IdlTypeDefTy {
    Struct {
        #[serde(default)]
        fields: Vec<IdlField>,
    },
    Enum {
        variants: Vec<IdlVariant>,
    },
}

#[derive(Debug, Deserialize)]
struct IdlVariant {
    name: String,
    #[serde(default)]
    fields: Option<IdlVariantFields>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdlVariantFields {
    Named(Vec<IdlField>),
    Tuple(Vec<IdlType>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdlType {
    Primitive(String),
    Vec { vec: Box<IdlType> },
    Option { option: Box<IdlType> },
    COption { coption: Box<IdlType> },
    Array { array: (Box<IdlType>, usize) },
    Defined { defined: String },
}

/// Resolves named type references, detecting unknown and cyclic definitions.
struct Resolver<'a> {
    defs: BTreeMap<&'a str, &'a IdlTypeDefTy>,
    resolved: BTreeMap<String, Schema>,
    visiting: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn new(idl: &'a Idl) -> Self {
        let defs = idl
            .types
            .iter()
            .chain(&idl.accounts)
            .map(|def| (def.name.as_str(), &def.ty))
            .collect();
        Self {
            defs,
            resolved: BTreeMap::new(),
            visiting: Vec::new(),
        }
    }

    fn named(&mut self, name: &str) -> Result<Schema, SdkError> {
        if let Some(schema) = self.resolved.get(name) {
            return Ok(schema.clone());
        }
        if self.visiting.iter().any(|n| n == name) {
            return Err(SdkError::Idl(format!(
                "cyclic type definition: {} -> {}",
                self.visiting.join(" -> "),
                name
            )));
        }
        let def = *self
            .defs
            .get(name)
            .ok_or_else(|| SdkError::Idl(format!("unknown type `{}`", name)))?;

        self.visiting.push(name.to_string());
        let schema = match def {
            IdlTypeDefTy::Struct { fields } => Schema::Struct(self.structure(name, fields)?),
            IdlTypeDefTy::Enum { variants } => {
                let variants = variants
                    .iter()
                    .map(|v| self.variant(v))
                    .collect::<Result<Vec<_>, _>>()?;
                Schema::data_enum(name, variants)
            }
        };
        self.visiting.pop();

        self.resolved.insert(name.to_string(), schema.clone());
        Ok(schema)
    }

    fn structure(&mut self, name: &str, fields: &[IdlField]) -> Result<StructSchema, SdkError> {
        let fields = fields
            .iter()
            .map(|f| Ok((to_snake_case(&f.name), self.resolve(&f.ty)?)))
            .collect::<Result<Vec<_>, SdkError>>()?;
        Ok(StructSchema::new(name, fields))
    }

    fn variant(&mut self, variant: &IdlVariant) -> Result<Variant, SdkError> {
        Ok(match &variant.fields {
            None => Variant::unit(&variant.name),
            Some(IdlVariantFields::Named(fields)) if fields.is_empty() => Variant::unit(&variant.name),
            Some(IdlVariantFields::Tuple(items)) if items.is_empty() => Variant::unit(&variant.name),
            Some(IdlVariantFields::Named(fields)) => {
                let fields = self.structure(&variant.name, fields)?.fields;
                Variant::named(
                    &variant.name,
                    fields.into_iter().map(|f| (f.name, f.schema)),
                )
            }
            Some(IdlVariantFields::Tuple(items)) => {
                let items = items
                    .iter()
                    .map(|t| self.resolve(t))
                    .collect::<Result<Vec<_>, _>>()?;
                Variant::tuple(&variant.name, items)
            }
        })
    }

    fn resolve(&mut self, ty: &IdlType) -> Result<Schema, SdkError> {
        Ok(match ty {
            IdlType::Primitive(name) => primitive(name)?,
            IdlType::Vec { vec } => Schema::vec(self.resolve(vec)?),
            IdlType::Option { option } => Schema::option(self.resolve(option)?),
            IdlType::COption { coption } => Schema::coption(self.resolve(coption)?),
            IdlType::Array { array: (element, len) } => Schema::array(self.resolve(element)?, *len),
            IdlType::Defined { defined } => self.named(defined)?,
        })
    }
}

fn primitive(name: &str) -> Result<Schema, SdkError> {
    Ok(match name {
        "u8" => Schema::U8,
        "u16" => Schema::U16,
        "u32" => Schema::U32,
        "u64" => Schema::U64,
        "u128" => Schema::U128,
        "i8" => Schema::I8,
        "i16" => Schema::I16,
        "i32" => Schema::I32,
        "i64" => Schema::I64,
        "i128" => Schema::I128,
        "bool" => Schema::Bool,
        "publicKey" | "pubkey" => Schema::PublicKey,
        "string" => Schema::String,
        "bytes" => Schema::vec(Schema::U8),
        other => return Err(SdkError::Idl(format!("unsupported type `{}`", other))),
    })
}

fn well_known_default(name: &str) -> Option<Pubkey> {
    match name {
        "systemProgram" | "system_program" => Some(SYSTEM_PROGRAM_ID),
        "rent" => Some(RENT_SYSVAR_ID),
        "sysvarInstructions" | "sysvar_instructions" => Some(INSTRUCTIONS_SYSVAR_ID),
        "tokenProgram" | "token_program" => Some(TOKEN_PROGRAM_ID),
        "associatedTokenProgram" | "associated_token_program" => Some(ASSOCIATED_TOKEN_PROGRAM_ID),
        _ => None,
    }
}

fn flatten_accounts(items: &[IdlAccountItem], out: &mut Vec<AccountSlot>) {
    for item in items {
        match item {
            IdlAccountItem::Group { accounts } => flatten_accounts(accounts, out),
            IdlAccountItem::Account(account) => {
                let mut slot = AccountSlot {
                    name: to_snake_case(&account.name),
                    writable: account.is_mut,
                    signer: account.is_signer,
                    presence: Presence::Required,
                };
                if account.is_optional {
                    slot = slot.optional();
                } else if let Some(default) = well_known_default(&account.name) {
                    slot.presence = Presence::Default(default);
                }
                out.push(slot);
            }
        }
    }
}

fn discriminator(
    ix: &IdlInstruction,
    index: usize,
    shank: bool,
) -> Result<Discriminator, SdkError> {
    match &ix.discriminant {
        Some(d) if d.ty == "u8" => u8::try_from(d.value)
            .map(Discriminator::Byte)
            .map_err(|_| SdkError::Idl(format!("discriminant of `{}` out of range", ix.name))),
        Some(d) => Err(SdkError::Idl(format!(
            "unsupported discriminant type `{}` on `{}`",
            d.ty, ix.name
        ))),
        None if shank => u8::try_from(index)
            .map(Discriminator::Byte)
            .map_err(|_| SdkError::Idl(format!("too many instructions for `{}`", ix.name))),
        None => Ok(anchor_instruction(&ix.name)),
    }
}

/// Loads a program definition from IDL JSON. The program id comes from
/// `metadata.address`.
///
/// # Errors
///
/// Returns `Idl` for malformed documents, unknown or cyclic types, and a missing
/// program address.
pub fn load_program(json: &str) -> Result<ProgramDefinition, SdkError> {
    load_program_with_id(json, None)
}

/// Loads a program definition from IDL JSON, with an explicit program id taking
/// precedence over `metadata.address`.
///
/// # Errors
///
/// Returns `Idl` for malformed documents, unknown or cyclic types, and a missing
/// program address.
pub fn load_program_with_id(
    json: &str,
    program_id: Option<Pubkey>,
) -> Result<ProgramDefinition, SdkError> {
    let idl: Idl = serde_json::from_str(json).map_err(|e| SdkError::Idl(e.to_string()))?;
    let metadata = idl.metadata.as_ref();
    let shank = metadata.and_then(|m| m.origin.as_deref()) == Some("shank");

    let program_id = match (program_id, metadata.and_then(|m| m.address.as_deref())) {
        (Some(id), _) => id,
        (None, Some(address)) => {
            Pubkey::from_str(address).map_err(|_| SdkError::InvalidAddress(address.to_string()))?
        }
        (None, None) => {
            return Err(SdkError::Idl(format!(
                "IDL `{}` has no metadata.address",
                idl.name
            )))
        }
    };

    let mut resolver = Resolver::new(&idl);
    let mut types = Vec::with_capacity(idl.types.len());
    for def in &idl.types {
        types.push(resolver.named(&def.name)?);
    }

    let mut accounts = Vec::with_capacity(idl.accounts.len());
    for def in &idl.accounts {
        let schema = match resolver.named(&def.name)? {
            Schema::Struct(schema) => schema,
            other => {
                return Err(SdkError::Idl(format!(
                    "account `{}` is not a struct ({})",
                    def.name, other
                )))
            }
        };
        accounts.push(if shank {
            AccountLayout::untagged(schema)
        } else {
            AccountLayout::anchor(schema)
        });
    }

    let mut instructions = Vec::with_capacity(idl.instructions.len());
    for (index, ix) in idl.instructions.iter().enumerate() {
        let args = resolver.structure(&format!("{}InstructionArgs", ix.name), &ix.args)?;
        let mut slots = Vec::new();
        flatten_accounts(&ix.accounts, &mut slots);
        let descriptor = InstructionDescriptor::new(&ix.name, discriminator(ix, index, shank)?, program_id)
            .args(args)
            .accounts(slots);
        instructions.push(if shank {
            descriptor
        } else {
            descriptor.with_remaining_accounts()
        });
    }

    let name = to_snake_case(&idl.name);
    tracing::debug!(
        program = %name,
        %program_id,
        types = types.len(),
        accounts = accounts.len(),
        instructions = instructions.len(),
        "loaded IDL"
    );

    Ok(ProgramDefinition::new(name, program_id)
        .with_types(types)
        .with_instructions(instructions)
        .with_accounts(accounts))
}
