//! Existence check

use crate::gateway::{GatewayError, ResourceGateway};
use crate::identity::ResourceIdentity;
use crate::model::ManagedInstance;

/// Outcome of asking the gateway whether an instance exists
#[derive(Debug, Clone)]
pub enum Probe {
    /// Gateway answered "not found": safe to create
    Absent,
    Present(Box<ManagedInstance>),
    /// Anything else. Neither absence nor presence can be assumed.
    Failed(GatewayError),
}

impl Probe {
    /// Classify a gateway read
    ///
    /// Only an explicit not-found counts as absence.
    pub fn classify(result: Result<ManagedInstance, GatewayError>) -> Self {
        match result {
            Ok(instance) => Probe::Present(Box::new(instance)),
            Err(e) if e.is_not_found() => Probe::Absent,
            Err(e) => Probe::Failed(e),
        }
    }
}

/// Ask `gateway` whether `identity` already exists
pub async fn probe<G>(gateway: &G, identity: &ResourceIdentity) -> Probe
where
    G: ResourceGateway + ?Sized,
{
    tracing::debug!("Probing {} via {}", identity, gateway.name());
    let probe = Probe::classify(gateway.get(identity).await);

    match &probe {
        Probe::Absent => tracing::debug!("{} not found, creation may proceed", identity),
        Probe::Present(existing) => tracing::debug!(
            "{} exists (state: {})",
            identity,
            existing.state.as_deref().unwrap_or("unknown")
        ),
        Probe::Failed(e) => tracing::debug!("Probe of {} failed ({}): {}", identity, e.status, e),
    }

    probe
}
