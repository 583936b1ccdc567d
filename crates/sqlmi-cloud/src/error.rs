//! Provisioning error types

use crate::gateway::GatewayError;
use crate::identity::ResourceIdentity;
use crate::orchestrator::Phase;
use thiserror::Error;

/// Provisioning errors
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Invalid resource identity: {0}")]
    InvalidIdentity(String),

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "Managed instance '{}' already exists in resource group '{}'",
        .0.name(),
        .0.resource_group()
    )]
    ResourceAlreadyExists(ResourceIdentity),

    /// Probe or persist failure, passed through untouched
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Provisioning cancelled before {phase}")]
    Cancelled { phase: Phase },
}

impl ProvisionError {
    /// Errors raised from user input, before any remote call is made
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ProvisionError::InvalidIdentity(_)
                | ProvisionError::InvalidTag(_)
                | ProvisionError::InvalidInput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
