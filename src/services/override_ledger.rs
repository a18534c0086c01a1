//! Admin override ledger.
//!
//! A toggle only records or removes the override row. It never touches the
//! school's flags; callers re-run the progression engine to realise any
//! resulting transition.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AdminEvidenceOverride, Stage};
use crate::domain::ports::{OverrideRepository, RequirementCatalog, SchoolRepository, ToggleResult};

/// Arguments of one toggle request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideToggle {
    pub school_id: Uuid,
    pub requirement_id: Uuid,
    pub stage: Stage,
    pub round_number: u32,
    pub admin_id: String,
}

pub struct OverrideLedger {
    schools: Arc<dyn SchoolRepository>,
    catalog: Arc<dyn RequirementCatalog>,
    overrides: Arc<dyn OverrideRepository>,
}

impl OverrideLedger {
    pub fn new(
        schools: Arc<dyn SchoolRepository>,
        catalog: Arc<dyn RequirementCatalog>,
        overrides: Arc<dyn OverrideRepository>,
    ) -> Self {
        Self {
            schools,
            catalog,
            overrides,
        }
    }

    #[instrument(skip(self), fields(school_id = %request.school_id, requirement_id = %request.requirement_id))]
    pub async fn toggle(&self, request: &OverrideToggle) -> DomainResult<ToggleResult> {
        if request.admin_id.trim().is_empty() {
            return Err(DomainError::ValidationFailed("admin id must not be empty".to_string()));
        }

        let school = self
            .schools
            .get(request.school_id)
            .await?
            .ok_or(DomainError::SchoolNotFound(request.school_id))?;

        let requirement = self
            .catalog
            .get(request.requirement_id)
            .await?
            .ok_or(DomainError::RequirementNotFound(request.requirement_id))?;

        if requirement.stage != request.stage {
            return Err(DomainError::ValidationFailed(format!(
                "requirement {} belongs to {}, not {}",
                requirement.id, requirement.stage, request.stage
            )));
        }

        if request.round_number == 0 || request.round_number > school.current_round {
            return Err(DomainError::ValidationFailed(format!(
                "round {} is outside 1..={}",
                request.round_number, school.current_round
            )));
        }

        let candidate = AdminEvidenceOverride::new(
            request.school_id,
            request.requirement_id,
            request.stage,
            request.round_number,
            request.admin_id.clone(),
        );
        let result = self.overrides.toggle(&candidate).await?;

        info!(
            round = request.round_number,
            stage = %request.stage,
            created = result.created,
            admin = %request.admin_id,
            "override toggled"
        );
        Ok(result)
    }

    pub async fn list_for_round(&self, school_id: Uuid, round_number: u32) -> DomainResult<Vec<AdminEvidenceOverride>> {
        self.overrides.list_for_round(school_id, round_number).await
    }
}
