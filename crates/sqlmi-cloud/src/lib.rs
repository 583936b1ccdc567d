//! Idempotent provisioning of Azure SQL Managed Instances
//!
//! This crate holds the control-plane independent part of `sqlmi create`:
//! an existence check, desired-state construction and a single persist call,
//! run as a forward-only state machine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   sqlmi CLI                      │
//! │                 (sqlmi create)                   │
//! └─────────────────┬───────────────────────────────┘
//!                   │ ProvisionRequest
//! ┌─────────────────▼───────────────────────────────┐
//! │                  sqlmi-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │ Orchestrator: probe → build → persist    │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────────────┐     │
//! │  │ Tag / ident. │  │ DesiredStateBuilder  │     │
//! │  └──────────────┘  └──────────────────────┘     │
//! └─────────────────┬───────────────────────────────┘
//!                   │ trait ResourceGateway
//!           ┌───────▼───────┐
//!           │  az CLI       │
//!           │  gateway      │
//!           └───────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sqlmi_cloud::Orchestrator;
//! use std::sync::Arc;
//!
//! let orchestrator = Orchestrator::new(Arc::new(gateway));
//! let instance = orchestrator.run(request).await?;
//! println!("created {}", instance.name);
//! ```

pub mod assignment;
pub mod builder;
pub mod detached;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod model;
pub mod orchestrator;
pub mod probe;
pub mod tags;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports
pub use assignment::IdentityDescriptor;
pub use builder::{DesiredStateBuilder, ProvisionRequest};
pub use detached::{DetachedProvision, spawn_detached};
pub use error::{ProvisionError, Result};
pub use gateway::{GatewayError, GatewayResult, GatewayStatus, ResourceGateway};
pub use identity::ResourceIdentity;
pub use model::{
    AdminPassword, DesiredState, Edition, Generation, InstanceIdentity, InstanceSettings,
    LicenseType, ManagedInstance, ProxyOverride, Sku, SkuInfo,
};
pub use orchestrator::{Orchestrator, Phase, ProvisionReport};
pub use probe::{Probe, probe};
pub use tags::{ArmTagValidator, TagValidator, Tags};
pub use tokio_util::sync::CancellationToken;
