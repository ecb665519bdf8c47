//! Command implementations. Each command returns the JSON document printed on
//! stdout.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use mplex_sdk::codec::{self, json};
use mplex_sdk::{idl, InstructionBuilder, ProgramDefinition, Registry, SdkConfig};
use serde_json::{json, Value as Json};
use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;

use crate::cli::Commands;

/// Builds the registry: built-in programs, then IDL files from the config and
/// the command line, then program id overrides.
///
/// # Errors
///
/// Returns an error when the config or an IDL file cannot be read or parsed.
pub fn load_registry(config_path: Option<&Path>, idl_paths: &[PathBuf]) -> Result<Registry> {
    let config = SdkConfig::load(config_path).context("failed to load config")?;
    let mut registry = Registry::builtin();

    let paths = config
        .idl_paths
        .iter()
        .map(PathBuf::from)
        .chain(idl_paths.iter().cloned());
    for path in paths {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read IDL {}", path.display()))?;
        let program = idl::load_program(&text)
            .with_context(|| format!("failed to load IDL {}", path.display()))?;
        tracing::info!(program = %program.name, path = %path.display(), "Registered IDL");
        registry.register(program);
    }

    registry
        .with_config(&config)
        .context("invalid program id override")
}

/// Runs one command against a registry.
///
/// # Errors
///
/// Returns an error when the input cannot be parsed or the codec rejects it.
pub fn run(registry: &Registry, command: &Commands) -> Result<Json> {
    match command {
        Commands::Programs => Ok(programs(registry)),
        Commands::Types { program } => types(registry.program(program)?),
        Commands::Encode {
            program,
            type_name,
            json,
        } => encode(registry.program(program)?, type_name, json),
        Commands::Decode {
            program,
            type_name,
            hex,
            offset,
        } => decode(registry.program(program)?, type_name, hex, *offset),
        Commands::DecodeAccount {
            program,
            hex,
            account,
        } => decode_account(registry.program(program)?, account.as_deref(), hex),
        Commands::Build {
            program,
            instruction,
            accounts,
            remaining,
            args,
            program_id,
        } => build(
            registry.program(program)?,
            instruction,
            accounts,
            remaining,
            args,
            program_id.as_deref(),
        ),
        Commands::DecodeIx { program, hex } => decode_ix(registry, program, hex),
    }
}

fn programs(registry: &Registry) -> Json {
    Json::Array(
        registry
            .programs()
            .map(|p| {
                json!({
                    "name": p.name,
                    "program_id": p.program_id.to_string(),
                })
            })
            .collect(),
    )
}

fn types(program: &ProgramDefinition) -> Result<Json> {
    let instructions: Vec<Json> = program
        .instructions
        .iter()
        .map(|ix| {
            json!({
                "name": ix.name,
                "discriminator": hex::encode(ix.discriminator.as_bytes()),
                "accounts": ix.accounts.iter().map(|slot| slot.name.clone()).collect::<Vec<_>>(),
            })
        })
        .collect();
    let accounts: Vec<Json> = program
        .accounts
        .iter()
        .map(|layout| {
            json!({
                "name": layout.name,
                "size": layout.byte_size(),
            })
        })
        .collect();

    Ok(json!({
        "program": program.name,
        "program_id": program.program_id.to_string(),
        "types": program.types.keys().collect::<Vec<_>>(),
        "instructions": instructions,
        "accounts": accounts,
    }))
}

fn encode(program: &ProgramDefinition, type_name: &str, input: &str) -> Result<Json> {
    let schema = program.schema(type_name)?;
    let input: Json = serde_json::from_str(input).context("value is not valid JSON")?;
    let value = json::from_json(schema, &input)?;
    let bytes = codec::encode(schema, &value)?;
    Ok(Json::String(hex::encode(bytes)))
}

fn decode(program: &ProgramDefinition, type_name: &str, input: &str, offset: usize) -> Result<Json> {
    let schema = program.schema(type_name)?;
    let data = parse_hex(input)?;
    let (value, consumed) = codec::decode(schema, &data, offset)?;
    Ok(json!({
        "value": json::to_json(schema, &value)?,
        "consumed": consumed,
    }))
}

fn decode_account(program: &ProgramDefinition, account: Option<&str>, input: &str) -> Result<Json> {
    let data = parse_hex(input)?;
    let layout = match account {
        Some(name) => program.account(name)?,
        None => program
            .find_account(&data)
            .ok_or_else(|| anyhow!("no {} account matches the data", program.name))?,
    };
    let decoded = layout.decode(&data)?;
    Ok(json!({
        "account": layout.name,
        "value": json::fields_to_json(&layout.schema.fields, &decoded.value)?,
        "consumed": decoded.consumed,
    }))
}

fn build(
    program: &ProgramDefinition,
    instruction: &str,
    accounts: &[String],
    remaining: &[String],
    args: &str,
    program_id: Option<&str>,
) -> Result<Json> {
    let descriptor = program.instruction(instruction)?;
    let args: Json = serde_json::from_str(args).context("arguments are not valid JSON")?;

    let mut builder = InstructionBuilder::new(descriptor)
        .args(json::fields_from_json(&descriptor.args.fields, &args)?)
        .remaining_accounts(
            remaining
                .iter()
                .map(|s| parse_remaining(s))
                .collect::<Result<Vec<_>>>()?,
        );
    for entry in accounts {
        let (name, key) = parse_account(entry)?;
        builder = builder.account(name, key);
    }
    if let Some(id) = program_id {
        builder = builder.program_id(parse_pubkey(id)?);
    }

    let ix = builder.build()?;
    let metas: Vec<Json> = ix
        .accounts
        .iter()
        .map(|meta| {
            json!({
                "pubkey": meta.pubkey.to_string(),
                "is_writable": meta.is_writable,
                "is_signer": meta.is_signer,
            })
        })
        .collect();

    Ok(json!({
        "program_id": ix.program_id.to_string(),
        "accounts": metas,
        "data": hex::encode(&ix.data),
    }))
}

fn decode_ix(registry: &Registry, program: &str, input: &str) -> Result<Json> {
    let program = match registry.program(program) {
        Ok(found) => found,
        Err(err) => {
            let id = Pubkey::from_str(program).map_err(|_| err)?;
            registry
                .program_by_id(&id)
                .ok_or_else(|| anyhow!("no registered program has id {}", id))?
        }
    };
    let data = parse_hex(input)?;
    let descriptor = program
        .find_instruction(&data)
        .ok_or_else(|| anyhow!("no {} instruction matches the data", program.name))?;
    let value = descriptor.decode_data(&data)?;

    Ok(json!({
        "program": program.name,
        "instruction": descriptor.name,
        "args": json::fields_to_json(&descriptor.args.fields, &value)?,
    }))
}

/// Parses hex with an optional `0x` prefix.
///
/// # Errors
///
/// Returns an error for non-hex input.
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(digits).with_context(|| format!("invalid hex: {}", input))
}

fn parse_pubkey(input: &str) -> Result<Pubkey> {
    Pubkey::from_str(input.trim()).map_err(|_| anyhow!("invalid address: {}", input))
}

/// Parses `name=ADDRESS`.
fn parse_account(entry: &str) -> Result<(&str, Pubkey)> {
    let (name, key) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=ADDRESS, got {}", entry))?;
    Ok((name.trim(), parse_pubkey(key)?))
}

/// Parses `ADDRESS[:flags]`, where flags contain `w` for writable and `s` for
/// signer.
fn parse_remaining(entry: &str) -> Result<AccountMeta> {
    let (key, flags) = entry.split_once(':').unwrap_or((entry, ""));
    let pubkey = parse_pubkey(key)?;
    if let Some(bad) = flags.chars().find(|c| !matches!(c, 'w' | 's')) {
        bail!("unknown account flag '{}' in {}", bad, entry);
    }
    let is_signer = flags.contains('s');
    Ok(if flags.contains('w') {
        AccountMeta::new(pubkey, is_signer)
    } else {
        AccountMeta::new_readonly(pubkey, is_signer)
    })
}
