//! Control-plane gateway abstraction

use crate::identity::ResourceIdentity;
use crate::model::{DesiredState, ManagedInstance};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Control-plane gateway
///
/// The only component that talks to the remote system of record. Transport,
/// authentication and any retry policy live behind this trait.
#[async_trait]
pub trait ResourceGateway: Send + Sync {
    /// Returns the gateway name (e.g., "az-cli")
    fn name(&self) -> &str;

    /// Read an existing managed instance
    ///
    /// A missing instance must be reported as a [`GatewayStatus::NotFound`] error.
    async fn get(&self, identity: &ResourceIdentity) -> GatewayResult<ManagedInstance>;

    /// Create the managed instance described by `desired`
    async fn create(
        &self,
        identity: &ResourceIdentity,
        desired: DesiredState,
    ) -> GatewayResult<ManagedInstance>;
}

/// Status classification of a failed gateway call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayStatus {
    /// The resource (or its parent scope) does not exist
    NotFound,
    /// No valid credentials
    Unauthorized,
    /// Credentials are valid but lack permission
    Forbidden,
    /// The service reports a conflicting resource or operation
    Conflict,
    /// The service rejected the request (validation, quota)
    Rejected,
    /// Rate limited
    Throttled,
    /// Service-side failure
    Unavailable,
    /// The call never reached the service
    Transport,
    /// The service answered but the response could not be read
    Malformed,
    Unknown,
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GatewayStatus::NotFound => "not-found",
            GatewayStatus::Unauthorized => "unauthorized",
            GatewayStatus::Forbidden => "forbidden",
            GatewayStatus::Conflict => "conflict",
            GatewayStatus::Rejected => "rejected",
            GatewayStatus::Throttled => "throttled",
            GatewayStatus::Unavailable => "unavailable",
            GatewayStatus::Transport => "transport",
            GatewayStatus::Malformed => "malformed",
            GatewayStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Failure reported by a [`ResourceGateway`]
///
/// `Display` is the raw service message so callers see exactly what the
/// control plane said.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GatewayError {
    pub status: GatewayStatus,

    /// Service error code (e.g., "ResourceNotFound") when one was reported
    pub code: Option<String>,

    pub message: String,
}

impl GatewayError {
    pub fn new(status: GatewayStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(GatewayStatus::NotFound, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == GatewayStatus::NotFound
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
