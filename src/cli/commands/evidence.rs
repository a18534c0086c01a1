//! Evidence CLI commands.

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use comfy_table::Cell;

use crate::cli::id_resolver::{resolve_evidence_id, resolve_requirement_id, resolve_school_id};
use crate::cli::output::{list_table, output, render_list, short_id, CommandOutput};
use crate::domain::models::{Config, Evidence, EvidenceStatus, Stage};
use crate::services::EvidenceSubmission;

use super::{open_service, parse_stage};

#[derive(Args, Debug)]
pub struct EvidenceArgs {
    #[command(subcommand)]
    pub command: EvidenceCommands,
}

#[derive(Subcommand, Debug)]
pub enum EvidenceCommands {
    /// Submit evidence for the school's current round
    Submit {
        /// School ID or unique prefix
        school: String,
        /// Stage the evidence belongs to
        #[arg(value_parser = parse_stage)]
        stage: Stage,
        /// Catalog requirement ID or unique prefix
        #[arg(short, long)]
        requirement: Option<String>,
        /// Who submitted the evidence
        #[arg(long, default_value = "cli")]
        by: String,
    },
    /// Approve a pending submission
    Approve {
        /// Evidence ID or unique prefix
        id: String,
        #[arg(long)]
        reviewer: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Reject a pending submission
    Reject {
        /// Evidence ID or unique prefix
        id: String,
        #[arg(long)]
        reviewer: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List evidence for a school
    List {
        /// School ID or unique prefix
        school: String,
        /// Only this round
        #[arg(short, long)]
        round: Option<u32>,
        /// Filter by status (pending, approved, rejected)
        #[arg(short, long)]
        status: Option<String>,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct EvidenceOutput {
    pub id: String,
    pub school_id: String,
    pub stage: Stage,
    pub round_number: u32,
    pub status: EvidenceStatus,
    pub requirement_id: Option<String>,
    pub submitted_by: Option<String>,
    pub reviewed_by: Option<String>,
    pub review_notes: Option<String>,
}

impl From<&Evidence> for EvidenceOutput {
    fn from(evidence: &Evidence) -> Self {
        Self {
            id: evidence.id.to_string(),
            school_id: evidence.school_id.to_string(),
            stage: evidence.stage,
            round_number: evidence.round_number,
            status: evidence.status,
            requirement_id: evidence.evidence_requirement_id.map(|id| id.to_string()),
            submitted_by: evidence.submitted_by.clone(),
            reviewed_by: evidence.reviewed_by.clone(),
            review_notes: evidence.review_notes.clone(),
        }
    }
}

impl CommandOutput for EvidenceOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Evidence: {}", self.id),
            format!("School: {}", self.school_id),
            format!("Stage: {} (round {})", self.stage, self.round_number),
            format!("Status: {}", self.status.as_str()),
        ];
        if let Some(requirement) = &self.requirement_id {
            lines.push(format!("Requirement: {requirement}"));
        }
        if let Some(reviewer) = &self.reviewed_by {
            lines.push(format!("Reviewed by: {reviewer}"));
        }
        if let Some(notes) = &self.review_notes {
            lines.push(format!("Notes: {notes}"));
        }
        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct EvidenceListOutput {
    pub evidence: Vec<EvidenceOutput>,
    pub total: usize,
}

impl CommandOutput for EvidenceListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "round", "stage", "status", "requirement"]);
        for item in &self.evidence {
            table.add_row(vec![
                Cell::new(short_id(&item.id)),
                Cell::new(item.round_number),
                Cell::new(item.stage),
                Cell::new(item.status.as_str()),
                Cell::new(item.requirement_id.as_deref().map_or("-", short_id)),
            ]);
        }
        render_list("evidence item", &table, self.total)
    }
}

pub async fn execute(args: EvidenceArgs, config: &Config, json_mode: bool) -> Result<()> {
    let (service, pool) = open_service(config).await?;

    match args.command {
        EvidenceCommands::Submit {
            school,
            stage,
            requirement,
            by,
        } => {
            let school_id = resolve_school_id(&pool, &school).await?;
            let requirement_id = match requirement {
                Some(prefix) => Some(resolve_requirement_id(&pool, &prefix).await?),
                None => None,
            };
            let evidence = service
                .submit_evidence(EvidenceSubmission {
                    school_id,
                    stage,
                    requirement_id,
                    submitted_by: by,
                })
                .await?;
            output(&EvidenceOutput::from(&evidence), json_mode);
        }

        EvidenceCommands::Approve { id, reviewer, notes } => {
            let evidence_id = resolve_evidence_id(&pool, &id).await?;
            let evidence = service
                .review_evidence(evidence_id, EvidenceStatus::Approved, &reviewer, notes)
                .await?;
            output(&EvidenceOutput::from(&evidence), json_mode);
        }

        EvidenceCommands::Reject { id, reviewer, notes } => {
            let evidence_id = resolve_evidence_id(&pool, &id).await?;
            let evidence = service
                .review_evidence(evidence_id, EvidenceStatus::Rejected, &reviewer, notes)
                .await?;
            output(&EvidenceOutput::from(&evidence), json_mode);
        }

        EvidenceCommands::List { school, round, status } => {
            let status = status
                .map(|s| EvidenceStatus::from_str(&s).ok_or_else(|| anyhow!("Invalid status: {s}")))
                .transpose()?;
            let school_id = resolve_school_id(&pool, &school).await?;
            let evidence: Vec<EvidenceOutput> = service
                .list_evidence(school_id, round)
                .await?
                .iter()
                .filter(|e| status.is_none_or(|s| e.status == s))
                .map(EvidenceOutput::from)
                .collect();
            let out = EvidenceListOutput {
                total: evidence.len(),
                evidence,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
