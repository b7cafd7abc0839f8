//! Command implementations and dispatch.

pub mod check;
pub mod facet;
pub mod load;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands) -> ExitCode {
    match command {
        Commands::Load(cmd) => load::run(&cmd),
        Commands::Facet(cmd) => match CommandContext::load(cmd.config.config.as_deref()) {
            Ok(ctx) => facet::run(&ctx, &cmd),
            Err(code) => code,
        },
        Commands::Check(cmd) => match CommandContext::load(cmd.config.config.as_deref()) {
            Ok(ctx) => check::run(&ctx),
            Err(code) => code,
        },
    }
}
