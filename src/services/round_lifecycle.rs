//! Round lifecycle: the only path that clears progression flags.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::School;
use crate::domain::ports::SchoolRepository;

pub struct RoundLifecycle {
    schools: Arc<dyn SchoolRepository>,
    max_update_attempts: u32,
}

impl RoundLifecycle {
    pub fn new(schools: Arc<dyn SchoolRepository>, max_update_attempts: u32) -> Self {
        Self {
            schools,
            max_update_attempts: max_update_attempts.max(1),
        }
    }

    /// Open the next round for an awarded school.
    ///
    /// Evidence, overrides and certificates of earlier rounds stay keyed by
    /// their round number and are not touched.
    #[instrument(skip(self))]
    pub async fn start_new_round(&self, school_id: Uuid) -> DomainResult<School> {
        for attempt in 1..=self.max_update_attempts {
            let mut school = self
                .schools
                .get(school_id)
                .await?
                .ok_or(DomainError::SchoolNotFound(school_id))?;

            if !school.award_completed {
                return Err(DomainError::InvalidState(format!(
                    "round {} of school {school_id} is not awarded yet",
                    school.current_round
                )));
            }

            school.begin_next_round();
            match self.schools.update_progress(&school).await {
                Ok(stored) => {
                    info!(%school_id, round = stored.current_round, "new round started");
                    return Ok(stored);
                }
                Err(DomainError::ConcurrencyConflict { .. }) => {
                    debug!(%school_id, attempt, "school row changed while starting round, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::ConcurrencyConflict {
            entity: "school".to_string(),
            id: school_id.to_string(),
        })
    }
}
