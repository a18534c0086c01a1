//! School CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::Cell;

use crate::cli::id_resolver::resolve_school_id;
use crate::cli::output::{list_table, output, render_list, short_id, truncate, CommandOutput};
use crate::domain::models::{Config, ProgressionCounts, RequirementStatus, Satisfaction, School, Stage};

use super::open_service;

#[derive(Args, Debug)]
pub struct SchoolArgs {
    #[command(subcommand)]
    pub command: SchoolCommands,
}

#[derive(Subcommand, Debug)]
pub enum SchoolCommands {
    /// Register a new school in round 1
    Register {
        /// School name
        name: String,
        /// Primary contact email, used for celebration notifications
        #[arg(short, long)]
        contact: Option<String>,
    },
    /// List all schools
    List,
    /// Show a school's progression state
    Show {
        /// School ID or unique prefix
        id: String,
    },
    /// Show requirement counts per stage
    Counts {
        /// School ID or unique prefix
        id: String,
        /// Round to count (defaults to the current round)
        #[arg(short, long)]
        round: Option<u32>,
    },
    /// Show how each catalog requirement is satisfied
    Requirements {
        /// School ID or unique prefix
        id: String,
        /// Round to inspect (defaults to the current round)
        #[arg(short, long)]
        round: Option<u32>,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct SchoolOutput {
    pub id: String,
    pub name: String,
    pub contact_email: Option<String>,
    pub current_stage: Stage,
    pub current_round: u32,
    pub inspire_completed: bool,
    pub investigate_completed: bool,
    pub act_completed: bool,
    pub award_completed: bool,
    pub audit_quiz_completed: bool,
    pub progress_percentage: u8,
    pub rounds_completed: u32,
}

impl From<&School> for SchoolOutput {
    fn from(school: &School) -> Self {
        Self {
            id: school.id.to_string(),
            name: school.name.clone(),
            contact_email: school.contact_email.clone(),
            current_stage: school.current_stage,
            current_round: school.current_round,
            inspire_completed: school.inspire_completed,
            investigate_completed: school.investigate_completed,
            act_completed: school.act_completed,
            award_completed: school.award_completed,
            audit_quiz_completed: school.audit_quiz_completed,
            progress_percentage: school.progress_percentage,
            rounds_completed: school.rounds_completed,
        }
    }
}

fn tick(done: bool) -> &'static str {
    if done {
        "yes"
    } else {
        "no"
    }
}

impl CommandOutput for SchoolOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("School: {}", self.name),
            format!("ID: {}", self.id),
        ];
        if let Some(contact) = &self.contact_email {
            lines.push(format!("Contact: {contact}"));
        }
        lines.extend([
            format!("Round: {} ({} completed)", self.current_round, self.rounds_completed),
            format!("Stage: {} ({}%)", self.current_stage, self.progress_percentage),
            format!("  Inspire:     {}", tick(self.inspire_completed)),
            format!("  Investigate: {}", tick(self.investigate_completed)),
            format!("  Act:         {}", tick(self.act_completed)),
            format!("  Awarded:     {}", tick(self.award_completed)),
            format!("  Audit quiz:  {}", tick(self.audit_quiz_completed)),
        ]);
        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct SchoolListOutput {
    pub schools: Vec<SchoolOutput>,
    pub total: usize,
}

impl CommandOutput for SchoolListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "round", "stage", "progress"]);
        for school in &self.schools {
            table.add_row(vec![
                Cell::new(short_id(&school.id)),
                Cell::new(truncate(&school.name, 30)),
                Cell::new(school.current_round),
                Cell::new(school.current_stage),
                Cell::new(format!("{}%", school.progress_percentage)),
            ]);
        }
        render_list("school", &table, self.total)
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CountsOutput {
    pub counts: ProgressionCounts,
    pub thresholds: [u32; 3],
}

impl CommandOutput for CountsOutput {
    fn to_human(&self) -> String {
        let c = &self.counts;
        let mut table = list_table(&["stage", "approved", "overrides", "signals", "total", "needed"]);
        table.add_row(vec![
            Cell::new("inspire"),
            Cell::new(c.inspire.approved),
            Cell::new(c.inspire.overrides),
            Cell::new("-"),
            Cell::new(c.inspire.total),
            Cell::new(self.thresholds[0]),
        ]);
        let signals = match (c.investigate.has_quiz, c.investigate.has_action_plan) {
            (true, true) => "quiz, plan",
            (true, false) => "quiz",
            (false, true) => "plan",
            (false, false) => "none",
        };
        table.add_row(vec![
            Cell::new("investigate"),
            Cell::new(c.investigate.approved),
            Cell::new(c.investigate.overrides),
            Cell::new(signals),
            Cell::new(c.investigate.total),
            Cell::new(self.thresholds[1]),
        ]);
        table.add_row(vec![
            Cell::new("act"),
            Cell::new(c.act.approved),
            Cell::new(c.act.overrides),
            Cell::new("-"),
            Cell::new(c.act.total),
            Cell::new(self.thresholds[2]),
        ]);
        format!("Round {} counts:\n{table}", c.round_number)
    }
}

#[derive(Debug, serde::Serialize)]
pub struct RequirementsOutput {
    pub round: Option<u32>,
    pub requirements: Vec<RequirementStatus>,
}

impl CommandOutput for RequirementsOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["stage", "#", "requirement", "satisfied by", "approved", "pending"]);
        for status in &self.requirements {
            let satisfied = match status.satisfaction {
                Satisfaction::Evidence => "evidence",
                Satisfaction::Override => "override",
                Satisfaction::Unsatisfied => "-",
            };
            table.add_row(vec![
                Cell::new(status.requirement.stage),
                Cell::new(status.requirement.order_index),
                Cell::new(truncate(&status.requirement.title, 40)),
                Cell::new(satisfied),
                Cell::new(status.approved_evidence),
                Cell::new(status.pending_evidence),
            ]);
        }
        render_list("requirement", &table, self.requirements.len())
    }
}

pub async fn execute(args: SchoolArgs, config: &Config, json_mode: bool) -> Result<()> {
    let (service, pool) = open_service(config).await?;

    match args.command {
        SchoolCommands::Register { name, contact } => {
            let school = service.register_school(&name, contact).await?;
            output(&SchoolOutput::from(&school), json_mode);
        }

        SchoolCommands::List => {
            let schools = service.list_schools().await?;
            let out = SchoolListOutput {
                total: schools.len(),
                schools: schools.iter().map(SchoolOutput::from).collect(),
            };
            output(&out, json_mode);
        }

        SchoolCommands::Show { id } => {
            let school_id = resolve_school_id(&pool, &id).await?;
            let school = service.get_school(school_id).await?;
            output(&SchoolOutput::from(&school), json_mode);
        }

        SchoolCommands::Counts { id, round } => {
            let school_id = resolve_school_id(&pool, &id).await?;
            let counts = service.get_progression_counts(school_id, round).await?;
            let t = &config.progression.thresholds;
            let out = CountsOutput {
                counts,
                thresholds: [t.inspire, t.investigate, t.act],
            };
            output(&out, json_mode);
        }

        SchoolCommands::Requirements { id, round } => {
            let school_id = resolve_school_id(&pool, &id).await?;
            let requirements = service.requirement_status(school_id, round).await?;
            output(&RequirementsOutput { round, requirements }, json_mode);
        }
    }

    Ok(())
}
