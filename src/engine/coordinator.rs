//! Transaction state machine: apply everything, or compensate what applied.

use crate::services::ports::{
    ApplyError, EditorAccess, NotificationSink, PersistenceGateway, ResourceStore,
    WorkspaceTransaction,
};

use super::executor::{Compensation, CompensationError, PlanExecutor};
use super::planner::{self, ConflictError};
use super::resources::{ResourceChangeApplier, ResourceOperationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Applying,
    Committed,
    RolledBack,
    RollbackFailed,
}

#[derive(Debug)]
pub struct TransactionReport {
    pub status: TransactionStatus,
    pub resource_failures: Vec<ResourceOperationError>,
}

#[derive(Debug)]
pub enum TransactionError {
    /// Overlapping or inverted ranges; nothing was applied.
    Conflict(ConflictError),
    /// A document plan failed and every collected compensation applied
    /// cleanly; the workspace matches its pre-transaction state.
    RolledBack { cause: ApplyError },
    /// A document plan failed and at least one compensation failed too; the
    /// workspace is left partially modified.
    RollbackFailed {
        cause: ApplyError,
        failures: Vec<CompensationError>,
    },
}

impl TransactionError {
    pub fn status(&self) -> TransactionStatus {
        match self {
            TransactionError::Conflict(_) => TransactionStatus::Pending,
            TransactionError::RolledBack { .. } => TransactionStatus::RolledBack,
            TransactionError::RollbackFailed { .. } => TransactionStatus::RollbackFailed,
        }
    }
}

impl std::fmt::Display for TransactionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionError::Conflict(e) => write!(f, "conflicting edit set: {}", e),
            TransactionError::RolledBack { cause } => {
                write!(f, "transaction failed and was rolled back: {}", cause)
            }
            TransactionError::RollbackFailed { cause, failures } => write!(
                f,
                "transaction failed and {} document(s) could not be restored: {}",
                failures.len(),
                cause
            ),
        }
    }
}

impl std::error::Error for TransactionError {}

/// Owns the status and the compensation list for exactly one transaction.
/// Borrowing the four ports mutably for the whole of `apply` keeps any other
/// writer away from the touched documents while the transaction runs.
pub struct TransactionCoordinator<'a> {
    editor: &'a mut dyn EditorAccess,
    gateway: &'a mut dyn PersistenceGateway,
    resources: &'a mut dyn ResourceStore,
    sink: &'a mut dyn NotificationSink,
    status: TransactionStatus,
}

impl<'a> TransactionCoordinator<'a> {
    pub fn new(
        editor: &'a mut dyn EditorAccess,
        gateway: &'a mut dyn PersistenceGateway,
        resources: &'a mut dyn ResourceStore,
        sink: &'a mut dyn NotificationSink,
    ) -> Self {
        Self {
            editor,
            gateway,
            resources,
            sink,
            status: TransactionStatus::Pending,
        }
    }

    pub fn apply(
        mut self,
        transaction: &WorkspaceTransaction,
    ) -> Result<TransactionReport, TransactionError> {
        self.sink.progress("applying workspace edit");

        // A conflicted plan fails the transaction before anything mutates;
        // status never leaves Pending.
        let plans = match planner::build_plans(&transaction.changes, &*self.editor) {
            Ok(plans) => plans,
            Err(conflict) => {
                tracing::warn!(error = %conflict, "edit set rejected");
                self.sink.failed(&conflict.to_string());
                return Err(TransactionError::Conflict(conflict));
            }
        };

        self.status = TransactionStatus::Applying;
        tracing::debug!(documents = plans.len(), "transaction applying");

        let mut compensations: Vec<Compensation> = Vec::new();
        let mut failure: Option<ApplyError> = None;
        let mut executor = PlanExecutor::new(&mut *self.editor, &mut *self.gateway);
        for plan in &plans {
            self.sink
                .progress(&format!("modifying {}", plan.path.display()));
            match executor.apply(plan) {
                Ok(compensation) => compensations.push(compensation),
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            }
        }

        if let Some(cause) = failure {
            tracing::warn!(error = %cause, "apply failed, rolling back");
            self.sink.progress("undoing applied changes");

            // Replay in strict reverse of commit order, and keep sweeping on
            // failure: every remaining document still gets its own restore
            // attempt.
            let mut failures: Vec<CompensationError> = Vec::new();
            for compensation in compensations.iter().rev() {
                if let Err(error) = executor.compensate(compensation) {
                    tracing::error!(error = %error, "compensation failed");
                    failures.push(error);
                }
            }
            drop(executor);

            if failures.is_empty() {
                self.status = TransactionStatus::RolledBack;
                self.sink
                    .failed(&format!("workspace edit failed and was undone: {cause}"));
                return Err(TransactionError::RolledBack { cause });
            }

            self.status = TransactionStatus::RollbackFailed;
            let unrestored: Vec<String> = failures
                .iter()
                .map(|f| f.0.path.display().to_string())
                .collect();
            self.sink.restore_failed(&format!(
                "workspace edit failed and could not be undone for: {}",
                unrestored.join(", ")
            ));
            return Err(TransactionError::RollbackFailed { cause, failures });
        }
        drop(executor);

        // Resource changes run only once every document plan has committed;
        // their failures are reported, never compensated.
        let resource_failures = ResourceChangeApplier::new(
            &mut *self.resources,
            &mut *self.editor,
            &mut *self.sink,
        )
        .apply(&transaction.resource_changes);

        self.status = TransactionStatus::Committed;
        tracing::info!(
            documents = plans.len(),
            resource_changes = transaction.resource_changes.len(),
            "transaction committed"
        );

        if resource_failures.is_empty() {
            self.sink.succeeded();
        } else {
            self.sink.failed(&format!(
                "workspace edit applied, but {} resource change(s) failed",
                resource_failures.len()
            ));
        }

        Ok(TransactionReport {
            status: self.status,
            resource_failures,
        })
    }
}
