//! Background provisioning runs

use crate::builder::ProvisionRequest;
use crate::gateway::ResourceGateway;
use crate::orchestrator::{Orchestrator, ProvisionReport};
use crate::tags::TagValidator;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

/// Handle to a provisioning run executing on a background task
///
/// Dropping the handle does not stop the run.
pub struct DetachedProvision {
    handle: JoinHandle<ProvisionReport>,
    cancel: CancellationToken,
}

impl DetachedProvision {
    /// Ask the run to stop at its next phase boundary
    ///
    /// Has no effect once the create call has been submitted.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run to reach a terminal phase
    pub async fn join(self) -> Result<ProvisionReport, JoinError> {
        self.handle.await
    }
}

/// Run `orchestrator` on a new tokio task
pub fn spawn_detached<G, V>(
    orchestrator: Orchestrator<G, V>,
    request: ProvisionRequest,
) -> DetachedProvision
where
    G: ResourceGateway + ?Sized + 'static,
    V: TagValidator + 'static,
{
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let handle = tokio::spawn(async move {
        let report = orchestrator.execute(request, &token).await;
        tracing::debug!("Detached provisioning finished in {}", report.phase());
        report
    });

    DetachedProvision { handle, cancel }
}
