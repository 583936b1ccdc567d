//! Provisioning state machine
//!
//! ```text
//! Start ─▶ Checking ─┬─▶ Building ─▶ Persisting ─┬─▶ Done
//!   │                ├─▶ AlreadyExists           │
//!   └────────────────┴──────────┴────────────────┴─▶ Failed
//! ```
//!
//! Every run moves forward only. Cancellation is honoured at phase
//! boundaries up to (not including) `Persisting`.

use crate::builder::{DesiredStateBuilder, ProvisionRequest};
use crate::error::{ProvisionError, Result};
use crate::gateway::ResourceGateway;
use crate::identity::ResourceIdentity;
use crate::model::{DesiredState, ManagedInstance};
use crate::probe::{Probe, probe};
use crate::tags::{ArmTagValidator, TagValidator};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Workflow phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Start,
    Checking,
    Building,
    Persisting,
    Done,
    AlreadyExists,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::AlreadyExists | Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Start => write!(f, "start"),
            Phase::Checking => write!(f, "checking"),
            Phase::Building => write!(f, "building"),
            Phase::Persisting => write!(f, "persisting"),
            Phase::Done => write!(f, "done"),
            Phase::AlreadyExists => write!(f, "already-exists"),
            Phase::Failed => write!(f, "failed"),
        }
    }
}

/// Result of one provisioning run
#[derive(Debug)]
pub struct ProvisionReport {
    /// Phases visited, in order; the last one is terminal
    pub trail: Vec<Phase>,

    pub started_at: DateTime<Utc>,

    pub duration_ms: u64,

    pub outcome: Result<ManagedInstance>,
}

impl ProvisionReport {
    /// Terminal phase of the run
    pub fn phase(&self) -> Phase {
        self.trail.last().copied().unwrap_or(Phase::Start)
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_result(self) -> Result<ManagedInstance> {
        self.outcome
    }
}

/// Phase bookkeeping for a single run
struct Run {
    trail: Vec<Phase>,
}

impl Run {
    fn new() -> Self {
        Self {
            trail: vec![Phase::Start],
        }
    }

    fn enter(&mut self, next: Phase) {
        if let Some(current) = self.trail.last() {
            tracing::debug!("phase {} -> {}", current, next);
        }
        self.trail.push(next);
    }

    fn fail<T>(&mut self, error: ProvisionError) -> Result<T> {
        self.enter(Phase::Failed);
        Err(error)
    }

    fn checkpoint(&mut self, cancel: &CancellationToken, next: Phase) -> Result<()> {
        if cancel.is_cancelled() {
            tracing::warn!("Provisioning cancelled before {}", next);
            return self.fail(ProvisionError::Cancelled { phase: next });
        }
        self.enter(next);
        Ok(())
    }
}

/// Sequences probe → build → persist against a [`ResourceGateway`]
pub struct Orchestrator<G: ?Sized, V = ArmTagValidator> {
    builder: DesiredStateBuilder<V>,
    gateway: Arc<G>,
}

impl<G: ?Sized, V: Clone> Clone for Orchestrator<G, V> {
    fn clone(&self) -> Self {
        Self {
            builder: self.builder.clone(),
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G> Orchestrator<G>
where
    G: ResourceGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            builder: DesiredStateBuilder::new(),
            gateway,
        }
    }
}

impl<G, V> Orchestrator<G, V>
where
    G: ResourceGateway + ?Sized,
    V: TagValidator,
{
    pub fn with_builder(gateway: Arc<G>, builder: DesiredStateBuilder<V>) -> Self {
        Self { builder, gateway }
    }

    /// Run the whole workflow
    pub async fn run(&self, request: ProvisionRequest) -> Result<ManagedInstance> {
        self.execute(request, &CancellationToken::new())
            .await
            .into_result()
    }

    /// Check and build without persisting
    ///
    /// Returns the state that [`Orchestrator::run`] would submit.
    pub async fn plan(&self, request: ProvisionRequest) -> Result<DesiredState> {
        let mut run = Run::new();
        self.prepare(request, &CancellationToken::new(), &mut run)
            .await
            .map(|(_, desired)| desired)
    }

    /// Run the whole workflow and report every phase visited
    pub async fn execute(
        &self,
        request: ProvisionRequest,
        cancel: &CancellationToken,
    ) -> ProvisionReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut run = Run::new();

        let outcome = self.drive(request, cancel, &mut run).await;

        match &outcome {
            Ok(instance) => tracing::info!(
                "Managed instance {} created (state: {})",
                instance.name,
                instance.state.as_deref().unwrap_or("unknown")
            ),
            Err(e) => tracing::debug!(
                "Provisioning ended in {}: {}",
                run.trail.last().copied().unwrap_or(Phase::Failed),
                e
            ),
        }

        ProvisionReport {
            trail: run.trail,
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
            outcome,
        }
    }

    async fn drive(
        &self,
        request: ProvisionRequest,
        cancel: &CancellationToken,
        run: &mut Run,
    ) -> Result<ManagedInstance> {
        let (identity, desired) = self.prepare(request, cancel, run).await?;

        run.checkpoint(cancel, Phase::Persisting)?;
        // Not interruptible from here on
        match self.gateway.create(&identity, desired).await {
            Ok(instance) => {
                if !instance.matches(&identity) {
                    tracing::warn!(
                        "Gateway reported instance {} for {}",
                        instance.name,
                        identity
                    );
                }
                run.enter(Phase::Done);
                Ok(instance)
            }
            Err(e) => run.fail(e.into()),
        }
    }

    /// Start → Checking → Building
    async fn prepare(
        &self,
        request: ProvisionRequest,
        cancel: &CancellationToken,
        run: &mut Run,
    ) -> Result<(ResourceIdentity, DesiredState)> {
        let identity = match request.preflight(self.builder.validator()) {
            Ok(identity) => identity,
            Err(e) => return run.fail(e),
        };

        run.checkpoint(cancel, Phase::Checking)?;
        match probe(self.gateway.as_ref(), &identity).await {
            Probe::Absent => {}
            Probe::Present(_) => {
                tracing::warn!("Managed instance {} already exists", identity);
                run.enter(Phase::AlreadyExists);
                return Err(ProvisionError::ResourceAlreadyExists(identity));
            }
            Probe::Failed(e) => return run.fail(e.into()),
        }

        run.checkpoint(cancel, Phase::Building)?;
        match self.builder.build(identity.clone(), request) {
            Ok(desired) => Ok((identity, desired)),
            Err(e) => run.fail(e),
        }
    }
}
