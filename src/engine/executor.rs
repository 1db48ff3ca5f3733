//! Applies one document plan through its owning target.

use std::path::PathBuf;

use crate::services::ports::{ApplyError, EditorAccess, PersistenceGateway, TextEdit};

use super::planner::DocumentEditPlan;

/// The inverse edit list produced by a successfully applied plan. Replaying
/// it through the same target restores the document exactly.
#[derive(Debug)]
pub struct Compensation {
    pub path: PathBuf,
    pub inverse_edits: Vec<TextEdit>,
    pub owner_is_open: bool,
}

/// An inverse edit failed to apply during the rollback sweep.
#[derive(Debug)]
pub struct CompensationError(pub ApplyError);

impl std::fmt::Display for CompensationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to restore {}: {}", self.0.path.display(), self.0.kind)
    }
}

impl std::error::Error for CompensationError {}

/// Dispatches a plan to the live editor buffer or the persistence gateway.
/// The target was decided at plan time; rollback reuses the recorded
/// decision so compensation flows through the same code path.
pub struct PlanExecutor<'a> {
    editor: &'a mut dyn EditorAccess,
    gateway: &'a mut dyn PersistenceGateway,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(editor: &'a mut dyn EditorAccess, gateway: &'a mut dyn PersistenceGateway) -> Self {
        Self { editor, gateway }
    }

    /// Edits already applied when a later edit of the same plan fails are
    /// not undone here; transaction-level compensation is the coordinator's
    /// job.
    pub fn apply(&mut self, plan: &DocumentEditPlan) -> Result<Compensation, ApplyError> {
        let inverse_edits = if plan.owner_is_open {
            self.editor.apply_in_place(&plan.path, &plan.edits)?
        } else {
            self.gateway.apply_on_disk(&plan.path, &plan.edits)?
        };

        tracing::debug!(
            path = %plan.path.display(),
            edits = plan.edits.len(),
            open = plan.owner_is_open,
            "document plan applied"
        );

        Ok(Compensation {
            path: plan.path.clone(),
            inverse_edits,
            owner_is_open: plan.owner_is_open,
        })
    }

    pub fn compensate(&mut self, compensation: &Compensation) -> Result<(), CompensationError> {
        let result = if compensation.owner_is_open {
            self.editor
                .apply_in_place(&compensation.path, &compensation.inverse_edits)
        } else {
            self.gateway
                .apply_on_disk(&compensation.path, &compensation.inverse_edits)
        };

        match result {
            Ok(_) => Ok(()),
            Err(error) => Err(CompensationError(error)),
        }
    }
}
