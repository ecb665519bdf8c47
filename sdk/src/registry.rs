//! Schema registry.
//!
//! Groups type schemas, instruction descriptors and account layouts by program.
//! The built-in registry covers every program in [`crate::programs`]; IDL files
//! can add more at runtime.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use solana_sdk::pubkey::Pubkey;

use crate::accounts::AccountLayout;
use crate::codec::Schema;
use crate::config::{ConfigError, SdkConfig};
use crate::discriminator::to_snake_case;
use crate::error::SdkError;
use crate::instructions::InstructionDescriptor;
use crate::programs;

static BUILTIN: Lazy<Registry> = Lazy::new(Registry::builtin);

/// Everything the SDK knows about one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDefinition {
    /// Registry name (snake_case).
    pub name: String,
    /// Deployed program id.
    pub program_id: Pubkey,
    /// Named type schemas.
    pub types: BTreeMap<String, Schema>,
    /// Instruction descriptors.
    pub instructions: Vec<InstructionDescriptor>,
    /// Account layouts.
    pub accounts: Vec<AccountLayout>,
}

impl ProgramDefinition {
    /// Creates an empty program definition.
    #[must_use]
    pub fn new(name: impl Into<String>, program_id: Pubkey) -> Self {
        Self {
            name: name.into(),
            program_id,
            types: BTreeMap::new(),
            instructions: Vec::new(),
            accounts: Vec::new(),
        }
    }

    /// Registers named types, keyed by their type name.
    #[must_use]
    pub fn with_types(mut self, types: impl IntoIterator<Item = Schema>) -> Self {
        self.types
            .extend(types.into_iter().map(|schema| (schema.type_name(), schema)));
        self
    }

    /// Registers instructions.
    #[must_use]
    pub fn with_instructions(
        mut self,
        instructions: impl IntoIterator<Item = InstructionDescriptor>,
    ) -> Self {
        self.instructions.extend(instructions);
        self
    }

    /// Registers account layouts.
    #[must_use]
    pub fn with_accounts(mut self, accounts: impl IntoIterator<Item = AccountLayout>) -> Self {
        self.accounts.extend(accounts);
        self
    }

    /// Looks up an instruction by name, camelCase and snake_case alike.
    ///
    /// # Errors
    ///
    /// Returns `UnknownInstruction` if the program has no such instruction.
    pub fn instruction(&self, name: &str) -> Result<&InstructionDescriptor, SdkError> {
        let wanted = to_snake_case(name);
        self.instructions
            .iter()
            .find(|ix| ix.name == name || to_snake_case(&ix.name) == wanted)
            .ok_or_else(|| SdkError::UnknownInstruction {
                program: self.name.clone(),
                instruction: name.to_string(),
            })
    }

    /// Looks up a type schema by name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if the program has no such type.
    pub fn schema(&self, name: &str) -> Result<&Schema, SdkError> {
        self.types.get(name).ok_or_else(|| SdkError::UnknownType {
            program: self.name.clone(),
            name: name.to_string(),
        })
    }

    /// Looks up an account layout by name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if the program has no such account.
    pub fn account(&self, name: &str) -> Result<&AccountLayout, SdkError> {
        self.accounts
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| SdkError::UnknownType {
                program: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Identifies the instruction whose discriminator prefixes `data`.
    #[must_use]
    pub fn find_instruction(&self, data: &[u8]) -> Option<&InstructionDescriptor> {
        self.instructions
            .iter()
            .filter(|ix| ix.discriminator.matches(data))
            .max_by_key(|ix| ix.discriminator.len())
    }

    /// Identifies the account layout whose type tag prefixes `data`.
    #[must_use]
    pub fn find_account(&self, data: &[u8]) -> Option<&AccountLayout> {
        self.accounts
            .iter()
            .find(|a| a.discriminator.is_some_and(|d| data.starts_with(&d)))
    }

    /// Moves the program to another address. Instructions with a pinned program id
    /// keep theirs.
    pub fn set_program_id(&mut self, program_id: Pubkey) {
        self.program_id = program_id;
        for ix in self
            .instructions
            .iter_mut()
            .filter(|ix| ix.program_id_overridable)
        {
            ix.program_id = program_id;
        }
    }
}

/// Collection of program definitions keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    programs: BTreeMap<String, ProgramDefinition>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry holding every built-in program.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for program in programs::all() {
            registry.register(program);
        }
        registry
    }

    /// Shared built-in registry, built on first use.
    #[must_use]
    pub fn global() -> &'static Registry {
        &BUILTIN
    }

    /// Adds or replaces a program.
    pub fn register(&mut self, program: ProgramDefinition) {
        tracing::debug!(
            program = %program.name,
            program_id = %program.program_id,
            instructions = program.instructions.len(),
            "registered program"
        );
        self.programs.insert(program.name.clone(), program);
    }

    /// Looks up a program by name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProgram` if no program has that name.
    pub fn program(&self, name: &str) -> Result<&ProgramDefinition, SdkError> {
        self.programs
            .get(name)
            .ok_or_else(|| SdkError::UnknownProgram(name.to_string()))
    }

    /// Looks up a program by its program id.
    #[must_use]
    pub fn program_by_id(&self, program_id: &Pubkey) -> Option<&ProgramDefinition> {
        self.programs
            .values()
            .find(|p| &p.program_id == program_id)
    }

    /// All programs, ordered by name.
    pub fn programs(&self) -> impl Iterator<Item = &ProgramDefinition> {
        self.programs.values()
    }

    /// Applies the program id overrides of `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is malformed or names an unknown program.
    pub fn with_config(mut self, config: &SdkConfig) -> Result<Self, ConfigError> {
        for (name, program_id) in config.parse_program_ids()? {
            let program = self
                .programs
                .get_mut(&name)
                .ok_or_else(|| ConfigError::UnknownProgram(name.clone()))?;
            tracing::debug!(program = %name, %program_id, "program id override");
            program.set_program_id(program_id);
        }
        Ok(self)
    }
}
