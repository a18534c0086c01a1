//! Command-line interface.

pub mod commands;
pub mod id_resolver;
pub mod output;

use clap::{Parser, Subcommand};

use commands::{
    certificate::CertificateArgs, evidence::EvidenceArgs, init::InitArgs, override_cmd::OverrideArgs,
    reconcile::ReconcileArgs, round::RoundArgs, school::SchoolArgs,
};

#[derive(Parser, Debug)]
#[command(name = "pathway")]
#[command(about = "Pathway - school programme progression engine", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration and database in a directory
    Init(InitArgs),
    /// School registration and progression state
    School(SchoolArgs),
    /// Evidence submission and review
    Evidence(EvidenceArgs),
    /// Administrator requirement overrides
    Override(OverrideArgs),
    /// Round lifecycle
    Round(RoundArgs),
    /// Re-apply progression rules to every school
    Reconcile(ReconcileArgs),
    /// Issued certificates
    Certificate(CertificateArgs),
}

/// Print the error (as JSON when requested) and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1)
}
