//! Administrator override CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::Cell;

use crate::cli::id_resolver::{resolve_requirement_id, resolve_school_id};
use crate::cli::output::{list_table, output, render_list, short_id, CommandOutput};
use crate::domain::models::{AdminEvidenceOverride, Config, Stage};
use crate::services::OverrideToggle;

use super::{open_service, parse_stage};

#[derive(Args, Debug)]
pub struct OverrideArgs {
    #[command(subcommand)]
    pub command: OverrideCommands,
}

#[derive(Subcommand, Debug)]
pub enum OverrideCommands {
    /// Mark a requirement satisfied, or remove an existing mark
    Toggle {
        /// School ID or unique prefix
        school: String,
        /// Requirement ID or unique prefix
        requirement: String,
        /// Stage the requirement belongs to
        #[arg(value_parser = parse_stage)]
        stage: Stage,
        /// Round to toggle in (defaults to the current round)
        #[arg(short, long)]
        round: Option<u32>,
        /// Administrator recording the change
        #[arg(long)]
        admin: String,
    },
    /// List overrides for a school
    List {
        /// School ID or unique prefix
        school: String,
        #[arg(short, long)]
        round: Option<u32>,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct OverrideOutput {
    pub id: String,
    pub school_id: String,
    pub requirement_id: String,
    pub stage: Stage,
    pub round_number: u32,
    pub marked_by: String,
}

impl From<&AdminEvidenceOverride> for OverrideOutput {
    fn from(entry: &AdminEvidenceOverride) -> Self {
        Self {
            id: entry.id.to_string(),
            school_id: entry.school_id.to_string(),
            requirement_id: entry.evidence_requirement_id.to_string(),
            stage: entry.stage,
            round_number: entry.round_number,
            marked_by: entry.marked_by.clone(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ToggleOutput {
    pub created: bool,
    pub entry: OverrideOutput,
}

impl CommandOutput for ToggleOutput {
    fn to_human(&self) -> String {
        let verb = if self.created { "Marked" } else { "Unmarked" };
        format!(
            "{verb} requirement {} ({}) satisfied for round {}",
            self.entry.requirement_id, self.entry.stage, self.entry.round_number
        )
    }
}

#[derive(Debug, serde::Serialize)]
pub struct OverrideListOutput {
    pub overrides: Vec<OverrideOutput>,
    pub total: usize,
}

impl CommandOutput for OverrideListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["requirement", "stage", "round", "marked by"]);
        for entry in &self.overrides {
            table.add_row(vec![
                Cell::new(short_id(&entry.requirement_id)),
                Cell::new(entry.stage),
                Cell::new(entry.round_number),
                Cell::new(&entry.marked_by),
            ]);
        }
        render_list("override", &table, self.total)
    }
}

pub async fn execute(args: OverrideArgs, config: &Config, json_mode: bool) -> Result<()> {
    let (service, pool) = open_service(config).await?;

    match args.command {
        OverrideCommands::Toggle {
            school,
            requirement,
            stage,
            round,
            admin,
        } => {
            let school_id = resolve_school_id(&pool, &school).await?;
            let requirement_id = resolve_requirement_id(&pool, &requirement).await?;
            let round_number = match round {
                Some(round) => round,
                None => service.get_school(school_id).await?.current_round,
            };
            let result = service
                .toggle_override(OverrideToggle {
                    school_id,
                    requirement_id,
                    stage,
                    round_number,
                    admin_id: admin,
                })
                .await?;
            let out = ToggleOutput {
                created: result.created,
                entry: OverrideOutput::from(&result.entry),
            };
            output(&out, json_mode);
        }

        OverrideCommands::List { school, round } => {
            let school_id = resolve_school_id(&pool, &school).await?;
            let overrides: Vec<OverrideOutput> = service
                .list_overrides(school_id, round)
                .await?
                .iter()
                .map(OverrideOutput::from)
                .collect();
            let out = OverrideListOutput {
                total: overrides.len(),
                overrides,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
