//! `pathway reconcile`: repair drift across all schools.

use anyhow::Result;
use clap::Args;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::services::ReconcileReport;

use super::open_service;

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Report what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct ReconcileOutput(pub ReconcileReport);

impl CommandOutput for ReconcileOutput {
    fn to_human(&self) -> String {
        let report = &self.0;
        let verb = if report.dry_run { "would fix" } else { "fixed" };
        let mut lines = vec![format!(
            "Examined {} schools, {verb} {}",
            report.examined, report.fixed_count
        )];
        for id in &report.school_ids {
            lines.push(format!("  {id}"));
        }
        if !report.failed.is_empty() {
            lines.push(format!("{} failed:", report.failed.len()));
            for failure in &report.failed {
                lines.push(format!("  {}: {}", failure.school_id, failure.error));
            }
        }
        lines.join("\n")
    }
}

pub async fn execute(args: ReconcileArgs, config: &Config, json_mode: bool) -> Result<()> {
    let (service, _pool) = open_service(config).await?;
    let report = service.reconcile_all(args.dry_run).await?;
    output(&ReconcileOutput(report), json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ReconcileFailure;
    use uuid::Uuid;

    #[test]
    fn test_human_output_lists_failures() {
        let id = Uuid::new_v4();
        let out = ReconcileOutput(ReconcileReport {
            examined: 3,
            fixed_count: 1,
            school_ids: vec![Uuid::new_v4()],
            failed: vec![ReconcileFailure {
                school_id: id,
                error: "boom".to_string(),
            }],
            dry_run: true,
        });

        let text = out.to_human();
        assert!(text.starts_with("Examined 3 schools, would fix 1"));
        assert!(text.contains(&format!("{id}: boom")));
    }
}
