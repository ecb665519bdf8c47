//! Built-in program definitions.
//!
//! One module per program. Each exposes its `PROGRAM_ID`, schema constructors
//! for the program's types, instruction descriptors, account layouts, borsh
//! mirrors under `args`, and a `definition()` for the registry.

pub mod auction_house;
pub mod bubblegum;
pub mod candy_guard;
pub mod candy_machine;
pub mod candy_machine_core;
pub mod fixed_price_sale;
pub mod token_metadata;

use crate::registry::ProgramDefinition;

/// Definitions of every built-in program.
#[must_use]
pub fn all() -> Vec<ProgramDefinition> {
    vec![
        auction_house::definition(),
        bubblegum::definition(),
        candy_guard::definition(),
        candy_machine::definition(),
        candy_machine_core::definition(),
        fixed_price_sale::definition(),
        token_metadata::definition(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_ids_are_distinct() {
        let programs = all();
        for (i, a) in programs.iter().enumerate() {
            for b in &programs[i + 1..] {
                assert_ne!(a.program_id, b.program_id, "{} vs {}", a.name, b.name);
            }
        }
    }

    #[test]
    fn test_instruction_discriminators_unique_per_program() {
        for program in all() {
            for (i, a) in program.instructions.iter().enumerate() {
                for b in &program.instructions[i + 1..] {
                    assert_ne!(a.discriminator, b.discriminator, "{}", program.name);
                }
                assert_eq!(a.program_id, program.program_id);
            }
        }
    }
}
