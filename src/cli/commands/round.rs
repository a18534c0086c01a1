//! Round lifecycle CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::id_resolver::resolve_school_id;
use crate::cli::output::output;
use crate::domain::models::Config;

use super::open_service;
use super::school::SchoolOutput;

#[derive(Args, Debug)]
pub struct RoundArgs {
    #[command(subcommand)]
    pub command: RoundCommands,
}

#[derive(Subcommand, Debug)]
pub enum RoundCommands {
    /// Start the next round for a school whose current round is awarded
    Start {
        /// School ID or unique prefix
        school: String,
    },
}

pub async fn execute(args: RoundArgs, config: &Config, json_mode: bool) -> Result<()> {
    let (service, pool) = open_service(config).await?;

    match args.command {
        RoundCommands::Start { school } => {
            let school_id = resolve_school_id(&pool, &school).await?;
            let school = service.start_new_round(school_id).await?;
            output(&SchoolOutput::from(&school), json_mode);
        }
    }

    Ok(())
}
