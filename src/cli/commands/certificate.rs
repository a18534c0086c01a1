//! Certificate CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::Cell;

use crate::cli::id_resolver::resolve_school_id;
use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::models::{Certificate, Config};

use super::open_service;

#[derive(Args, Debug)]
pub struct CertificateArgs {
    #[command(subcommand)]
    pub command: CertificateCommands,
}

#[derive(Subcommand, Debug)]
pub enum CertificateCommands {
    /// List certificates issued to a school
    List {
        /// School ID or unique prefix
        school: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct CertificateListOutput {
    pub certificates: Vec<Certificate>,
    pub total: usize,
}

impl CommandOutput for CertificateListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["number", "round", "issued", "items (i/i/a)"]);
        for cert in &self.certificates {
            let a = &cert.metadata.achievement;
            table.add_row(vec![
                Cell::new(&cert.certificate_number),
                Cell::new(cert.round_number),
                Cell::new(cert.issued_at.format("%Y-%m-%d")),
                Cell::new(format!("{}/{}/{}", a.inspire_items, a.investigate_items, a.act_items)),
            ]);
        }
        render_list("certificate", &table, self.total)
    }
}

pub async fn execute(args: CertificateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let (service, pool) = open_service(config).await?;

    match args.command {
        CertificateCommands::List { school } => {
            let school_id = resolve_school_id(&pool, &school).await?;
            let certificates = service.list_certificates(school_id).await?;
            let out = CertificateListOutput {
                total: certificates.len(),
                certificates,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
