//! Azure CLI gateway for sqlmi
//!
//! This crate implements the `ResourceGateway` trait on top of the `az`
//! CLI, so that `sqlmi` can read and create Azure SQL Managed Instances.
//!
//! # Requirements
//!
//! - `az` CLI must be installed (`https://aka.ms/installazurecli`)
//! - Authentication and subscription selection are managed through
//!   `az login` / `az account set`
//!
//! # Example
//!
//! ```ignore
//! use sqlmi_cloud::{Orchestrator, ResourceGateway};
//! use sqlmi_cloud_azure::AzSqlMiGateway;
//! use std::sync::Arc;
//!
//! let gateway = Arc::new(AzSqlMiGateway::default());
//! let instance = Orchestrator::new(gateway).run(request).await?;
//! ```

pub mod az;
pub mod classify;
pub mod error;
pub mod gateway;

pub use az::{AzArgs, AzCli};
pub use error::{AzureError, Result};
pub use gateway::AzSqlMiGateway;
